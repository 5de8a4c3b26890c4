//! In-process grid backend with the same observable behaviour as Sheets.
//!
//! Reads drop trailing blank cells and trailing blank rows, appends land after
//! the last non-blank row, clears blank cells but keep the row slot.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::mapper::Grid;
use crate::range::{CellSpan, RangeSpec};
use crate::sheets::GridBackend;
use crate::{Error, Result};

pub struct MemoryGrid {
    sheet: String,
    cells: RwLock<Grid>,
    unavailable: AtomicBool,
}

impl MemoryGrid {
    pub fn new(sheet: impl Into<String>, rows: Grid) -> Self {
        Self {
            sheet: sheet.into(),
            cells: RwLock::new(rows),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail as if the remote service were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Raw cells, including blank slots.
    pub async fn snapshot(&self) -> Grid {
        self.cells.read().await.clone()
    }

    fn check(&self, range: &RangeSpec) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::Backend("Service unavailable".to_string()));
        }
        if range.sheet != self.sheet {
            return Err(Error::Backend(format!("Unable to parse range: {}", range)));
        }
        Ok(())
    }
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(String::is_empty)
}

fn trim_row(row: &[String]) -> Vec<String> {
    let len = row.iter().rposition(|c| !c.is_empty()).map_or(0, |i| i + 1);
    row[..len].to_vec()
}

fn trim_grid(mut rows: Grid) -> Grid {
    while rows.last().is_some_and(|r| is_blank(r)) {
        rows.pop();
    }
    rows
}

/// Ensure `row` (1-based) exists and is at least `width` cells wide.
fn ensure_cell(cells: &mut Grid, row: usize, width: usize) {
    if cells.len() < row {
        cells.resize_with(row, Vec::new);
    }
    let target = &mut cells[row - 1];
    if target.len() < width {
        target.resize(width, String::new());
    }
}

fn whole_sheet(cells: &Grid) -> CellSpan {
    let width = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
    CellSpan {
        first_col: 0,
        last_col: width - 1,
        first_row: 1,
        last_row: cells.len().max(1),
    }
}

#[async_trait]
impl GridBackend for MemoryGrid {
    async fn read_range(&self, range: &RangeSpec) -> Result<Grid> {
        self.check(range)?;
        let cells = self.cells.read().await;
        let span = range.span.unwrap_or_else(|| whole_sheet(&cells));

        let rows = (span.first_row..=span.last_row)
            .map(|r| {
                let row = cells.get(r - 1).map(Vec::as_slice).unwrap_or(&[]);
                let end = row.len().min(span.last_col + 1);
                let start = span.first_col.min(end);
                trim_row(&row[start..end])
            })
            .collect();

        Ok(trim_grid(rows))
    }

    async fn append_rows(&self, range: &RangeSpec, rows: Grid) -> Result<()> {
        self.check(range)?;
        let mut cells = self.cells.write().await;
        let mut next = cells.iter().rposition(|r| !is_blank(r)).map_or(0, |i| i + 1);

        for row in rows {
            if next < cells.len() {
                cells[next] = row;
            } else {
                cells.push(row);
            }
            next += 1;
        }
        Ok(())
    }

    async fn update_range(&self, range: &RangeSpec, rows: Grid) -> Result<()> {
        self.check(range)?;
        let span = range
            .span
            .ok_or_else(|| Error::Backend("Update requires a bounded range".to_string()))?;
        if rows.len() > span.height() || rows.iter().any(|r| r.len() > span.width()) {
            return Err(Error::Backend(format!(
                "Requested writing within range [{}], but tried writing beyond it",
                range
            )));
        }

        let mut cells = self.cells.write().await;
        for (i, row) in rows.into_iter().enumerate() {
            let row_number = span.first_row + i;
            ensure_cell(&mut cells, row_number, span.first_col + row.len());
            for (j, value) in row.into_iter().enumerate() {
                cells[row_number - 1][span.first_col + j] = value;
            }
        }
        Ok(())
    }

    async fn clear_range(&self, range: &RangeSpec) -> Result<()> {
        self.check(range)?;
        let mut cells = self.cells.write().await;
        let span = range.span.unwrap_or_else(|| whole_sheet(&cells));

        for row in cells
            .iter_mut()
            .take(span.last_row)
            .skip(span.first_row - 1)
        {
            let end = row.len().min(span.last_col + 1);
            for cell in row.iter_mut().take(end).skip(span.first_col) {
                cell.clear();
            }
        }
        Ok(())
    }
}
