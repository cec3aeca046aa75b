//! Typed row identifiers.
//!
//! Every table uses an `INTEGER PRIMARY KEY`. Wrapping the raw `i64` keeps a
//! document id from being passed where an activity id is expected.

use std::fmt;

use rusqlite::ToSql;
use rusqlite::types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Raw integer key.
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.0))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map(Self)
            }
        }
    };
}

row_id!(
    /// Key of an `activities` row.
    ActivityId
);
row_id!(
    /// Key of a `documents` row.
    DocumentId
);
row_id!(
    /// Key of an `ai_costs` row.
    CostRecordId
);
row_id!(
    /// Key of a `learning_patterns` row.
    PatternId
);
row_id!(
    /// Key of an `insights` row.
    InsightId
);
row_id!(
    /// Key of a `budget_alerts` row.
    AlertId
);
