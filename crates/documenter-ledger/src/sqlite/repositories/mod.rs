//! Stateless repositories: every method takes `&Connection` and runs one
//! statement (or one read), so each is testable against a bare connection.

pub mod activity;
pub mod budget;
pub mod cost;
pub mod document;
pub mod insight;
pub mod pattern;

use rusqlite::{Params, Row, Statement};

use crate::errors::Result;

/// Run a prepared query and decode every row.
pub(crate) fn query_all<T, P: Params>(
    stmt: &mut Statement<'_>,
    params: P,
    decode: fn(&Row<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    let mut rows = stmt.query(params)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(decode(row)?);
    }
    Ok(out)
}

/// Run a prepared query and decode the first row, if any.
pub(crate) fn query_first<T, P: Params>(
    stmt: &mut Statement<'_>,
    params: P,
    decode: fn(&Row<'_>) -> Result<T>,
) -> Result<Option<T>> {
    let mut rows = stmt.query(params)?;
    match rows.next()? {
        Some(row) => decode(row).map(Some),
        None => Ok(None),
    }
}
