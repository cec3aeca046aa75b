//! Line-based unified diff.
//!
//! Lines are compared exactly as reviewers left them. Changes are grouped
//! into hunks with `context` unchanged lines on either side; windows that
//! touch are merged into one hunk, as `diff -u` does.

use std::fmt;
use std::ops::Range;

/// One line of a hunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiffLine<'a> {
    /// Present in both texts.
    Context(&'a str),
    /// Only in the original.
    Removed(&'a str),
    /// Only in the revision.
    Added(&'a str),
}

/// A contiguous region of change with surrounding context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hunk<'a> {
    /// 1-based first original line.
    pub old_start: usize,
    /// Original lines covered.
    pub old_count: usize,
    /// 1-based first revised line.
    pub new_start: usize,
    /// Revised lines covered.
    pub new_count: usize,
    /// Hunk body.
    pub lines: Vec<DiffLine<'a>>,
}

impl fmt::Display for Hunk<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_count, self.new_start, self.new_count
        )?;
        for line in &self.lines {
            match line {
                DiffLine::Context(text) => writeln!(f, " {text}")?,
                DiffLine::Removed(text) => writeln!(f, "-{text}")?,
                DiffLine::Added(text) => writeln!(f, "+{text}")?,
            }
        }
        Ok(())
    }
}

/// One step of the edit script, indexing into the split texts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Edit {
    Keep(usize),
    Drop(usize),
    Add(usize),
}

/// Diff two texts line by line.
///
/// Texts are split on `'\n'` exactly, so a trailing newline is a trailing
/// empty line and `""` is one empty line.
pub fn unified_diff<'a>(old: &'a str, new: &'a str, context: usize) -> Vec<Hunk<'a>> {
    if old == new {
        return Vec::new();
    }
    let old_lines: Vec<&str> = old.split('\n').collect();
    let new_lines: Vec<&str> = new.split('\n').collect();
    let edits = edit_script(&old_lines, &new_lines);
    group_hunks(&old_lines, &new_lines, &edits, context)
}

/// Render hunks as unified diff text (without file headers).
pub fn render(hunks: &[Hunk<'_>]) -> String {
    hunks.iter().map(ToString::to_string).collect()
}

/// Shortest edit script between two line slices.
///
/// The shared head and tail are kept as-is; only the differing middle goes
/// through the LCS table. Where two scripts are equally short, drops are
/// emitted before adds.
fn edit_script(old: &[&str], new: &[&str]) -> Vec<Edit> {
    let head = old.iter().zip(new).take_while(|(a, b)| a == b).count();
    let tail = old[head..]
        .iter()
        .rev()
        .zip(new[head..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    let old_mid = &old[head..old.len() - tail];
    let new_mid = &new[head..new.len() - tail];

    // common[i][j]: LCS length of old_mid[i..] and new_mid[j..].
    let (rows, cols) = (old_mid.len(), new_mid.len());
    let mut common = vec![vec![0u32; cols + 1]; rows + 1];
    for i in (0..rows).rev() {
        for j in (0..cols).rev() {
            common[i][j] = if old_mid[i] == new_mid[j] {
                common[i + 1][j + 1] + 1
            } else {
                common[i + 1][j].max(common[i][j + 1])
            };
        }
    }

    let mut edits: Vec<Edit> = (0..head).map(Edit::Keep).collect();
    let (mut i, mut j) = (0, 0);
    while i < rows || j < cols {
        if i < rows && j < cols && old_mid[i] == new_mid[j] {
            edits.push(Edit::Keep(head + i));
            i += 1;
            j += 1;
        } else if i < rows && (j == cols || common[i + 1][j] >= common[i][j + 1]) {
            edits.push(Edit::Drop(head + i));
            i += 1;
        } else {
            edits.push(Edit::Add(head + j));
            j += 1;
        }
    }
    edits.extend((old.len() - tail..old.len()).map(Edit::Keep));
    edits
}

/// Cut the script into hunks: every change plus up to `context` kept lines
/// on each side, with overlapping windows merged.
fn group_hunks<'a>(
    old: &[&'a str],
    new: &[&'a str],
    edits: &[Edit],
    context: usize,
) -> Vec<Hunk<'a>> {
    let mut spans: Vec<Range<usize>> = Vec::new();
    for (idx, _) in edits
        .iter()
        .enumerate()
        .filter(|(_, e)| !matches!(e, Edit::Keep(_)))
    {
        let window = idx.saturating_sub(context)..(idx + 1 + context).min(edits.len());
        match spans.last_mut() {
            Some(span) if window.start <= span.end => span.end = window.end,
            _ => spans.push(window),
        }
    }

    // Line cursors in each text before every edit.
    let mut cursors = Vec::with_capacity(edits.len());
    let (mut old_at, mut new_at) = (0, 0);
    for edit in edits {
        cursors.push((old_at, new_at));
        match edit {
            Edit::Keep(_) => {
                old_at += 1;
                new_at += 1;
            }
            Edit::Drop(_) => old_at += 1,
            Edit::Add(_) => new_at += 1,
        }
    }

    spans
        .into_iter()
        .map(|span| {
            let (old_at, new_at) = cursors[span.start];
            let lines: Vec<DiffLine<'a>> = edits[span]
                .iter()
                .map(|edit| match *edit {
                    Edit::Keep(o) => DiffLine::Context(old[o]),
                    Edit::Drop(o) => DiffLine::Removed(old[o]),
                    Edit::Add(n) => DiffLine::Added(new[n]),
                })
                .collect();
            Hunk {
                old_start: old_at + 1,
                old_count: lines.iter().filter(|l| !matches!(l, DiffLine::Added(_))).count(),
                new_start: new_at + 1,
                new_count: lines.iter().filter(|l| !matches!(l, DiffLine::Removed(_))).count(),
                lines,
            }
        })
        .collect()
}
