//! A1-style range addressing for the grid backend.
//!
//! Data rows are addressed by their 0-based offset below the header. The
//! backend uses 1-based row numbers and the header occupies row 1, so the
//! physical row of offset `n` is `n + 2`.

use std::fmt;

/// Number of columns an event occupies (`A..H`).
pub const EVENT_WIDTH: usize = 8;

/// 0-based offset of a data row, excluding the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowOffset(pub usize);

impl RowOffset {
    /// 1-based row number in the backend's addressing.
    pub fn physical_row(self) -> usize {
        self.0 + 2
    }
}

impl fmt::Display for RowOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rectangular bounds inside a sheet. Columns are 0-based, rows 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSpan {
    pub first_col: usize,
    pub last_col: usize,
    pub first_row: usize,
    pub last_row: usize,
}

impl CellSpan {
    pub fn width(&self) -> usize {
        self.last_col - self.first_col + 1
    }

    pub fn height(&self) -> usize {
        self.last_row - self.first_row + 1
    }
}

/// A sheet name with optional bounds: `work05_sche` or `work05_sche!A5:H5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSpec {
    pub sheet: String,
    pub span: Option<CellSpan>,
}

impl RangeSpec {
    /// The whole sheet.
    pub fn sheet(name: impl Into<String>) -> Self {
        Self {
            sheet: name.into(),
            span: None,
        }
    }

    /// Columns `A..H` of the event row at `offset`.
    pub fn event_row(name: impl Into<String>, offset: RowOffset) -> Self {
        let row = offset.physical_row();
        Self {
            sheet: name.into(),
            span: Some(CellSpan {
                first_col: 0,
                last_col: EVENT_WIDTH - 1,
                first_row: row,
                last_row: row,
            }),
        }
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            None => write!(f, "{}", quoted_sheet(&self.sheet)),
            Some(span) => write!(
                f,
                "{}!{}{}:{}{}",
                quoted_sheet(&self.sheet),
                column_letters(span.first_col),
                span.first_row,
                column_letters(span.last_col),
                span.last_row
            ),
        }
    }
}

/// Sheet name as written in A1 notation: bare when it is only letters, digits
/// and `_`, otherwise wrapped in single quotes with inner quotes doubled.
fn quoted_sheet(name: &str) -> String {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

/// Column letters for a 0-based index: 0 → `A`, 25 → `Z`, 26 → `AA`.
pub fn column_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
