//! Header-indexed mapping between grid rows and events.
//!
//! Row 0 of the grid names the columns; every later row is a record. Column
//! positions are resolved from the live header on every operation, so a
//! reordered sheet still decodes correctly as long as the field names exist.

use crate::models::{Event, EventRecord, Field};
use crate::range::{RowOffset, EVENT_WIDTH};
use crate::{Error, Result};

/// Raw cell rows as read from the backend, header first.
pub type Grid = Vec<Vec<String>>;

pub const NO_DATA: &str = "No data found";
pub const EVENT_NOT_FOUND: &str = "Event not found";

/// Position of `name` in the header. Exact match, first occurrence wins.
pub fn resolve(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

/// Field → column lookup built once from a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderIndex {
    positions: [Option<usize>; 8],
}

impl HeaderIndex {
    pub fn new(headers: &[String]) -> Self {
        Self {
            positions: Field::ALL.map(|field| resolve(headers, field.name())),
        }
    }

    pub fn position(&self, field: Field) -> Option<usize> {
        self.positions[field.ordinal()]
    }

    /// Read one row into an event; missing columns and short rows read as absent.
    pub fn decode_row(&self, row: &[String]) -> Event {
        let mut event = Event::default();
        for field in Field::ALL {
            let cell = self
                .position(field)
                .and_then(|col| row.get(col))
                .cloned();
            event.set(field, cell);
        }
        event
    }

    /// Fields whose header column lies past the `A..H` write window.
    pub fn beyond_write_window(&self) -> Vec<&'static str> {
        Field::ALL
            .into_iter()
            .filter(|field| matches!(self.position(*field), Some(col) if col >= EVENT_WIDTH))
            .map(Field::name)
            .collect()
    }

    /// Overwrite each resolved field of `row` with the record's value.
    ///
    /// Cells of columns not named by any field are left alone. Fails when a
    /// field sits outside `A..H`, since the write cannot reach it.
    pub fn patch_row(&self, row: &[String], record: &EventRecord) -> Result<Vec<String>> {
        let unreachable = self.beyond_write_window();
        if !unreachable.is_empty() {
            return Err(Error::Backend(format!(
                "Columns outside A:H cannot be written: {}",
                unreachable.join(", ")
            )));
        }

        let mut patched = row.to_vec();
        for field in Field::ALL {
            let Some(col) = self.position(field) else {
                continue;
            };
            if col >= patched.len() {
                patched.resize(col + 1, String::new());
            }
            patched[col] = record.value(field).to_string();
        }
        // Non-schema cells past H are outside the write and stay as they are.
        patched.truncate(EVENT_WIDTH);
        Ok(patched)
    }
}

/// Split a grid into header and data rows, or fail when there is no data.
fn split_grid(grid: &Grid) -> Result<(&[String], &[Vec<String>])> {
    match grid.split_first() {
        Some((header, rows)) if !rows.is_empty() => Ok((header.as_slice(), rows)),
        _ => Err(Error::NotFound(NO_DATA.to_string())),
    }
}

/// Decode every data row, preserving row order.
pub fn decode(grid: &Grid) -> Result<Vec<Event>> {
    let (header, rows) = split_grid(grid)?;
    let index = HeaderIndex::new(header);
    Ok(rows.iter().map(|row| index.decode_row(row)).collect())
}

/// Offset of the first data row whose id cell equals `id`.
pub fn locate(grid: &Grid, id: &str) -> Result<RowOffset> {
    let (header, rows) = split_grid(grid)?;
    let id_col = HeaderIndex::new(header).position(Field::Id);

    id_col
        .and_then(|col| {
            rows.iter()
                .position(|row| row.get(col).map(String::as_str) == Some(id))
        })
        .map(RowOffset)
        .ok_or_else(|| Error::NotFound(EVENT_NOT_FOUND.to_string()))
}

/// Row appended on create, always in canonical field order regardless of
/// the header layout.
pub fn canonical_row(record: &EventRecord) -> Vec<String> {
    Field::ALL
        .iter()
        .map(|field| record.value(*field).to_string())
        .collect()
}

#[cfg(test)]
pub(crate) fn canonical_header() -> Vec<String> {
    Field::ALL.iter().map(|f| f.name().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventPayload;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn standup_grid() -> Grid {
        vec![
            canonical_header(),
            row(&["t1", "Standup", "Mon", "09", "00", "09", "15", "work"]),
        ]
    }

    fn record(id: &str, title: &str) -> EventRecord {
        EventPayload {
            id: Some(id.to_string()),
            title: Some(title.to_string()),
            day: Some("Mon".to_string()),
            h1: Some("09".to_string()),
            m1: Some("00".to_string()),
            h2: Some("09".to_string()),
            m2: Some("15".to_string()),
            category: Some("work".to_string()),
        }
        .into_record()
        .unwrap()
    }

    #[test]
    fn test_resolve_exact_first_match() {
        let header = row(&["id", "Title", "title", "title"]);
        assert_eq!(resolve(&header, "id"), Some(0));
        assert_eq!(resolve(&header, "title"), Some(2));
        assert_eq!(resolve(&header, "TITLE"), None);
        assert_eq!(resolve(&header, "category"), None);
    }

    #[test]
    fn test_decode_single_row() {
        let events = decode(&standup_grid()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0],
            Event {
                id: Some("t1".into()),
                title: Some("Standup".into()),
                day: Some("Mon".into()),
                h1: Some("09".into()),
                m1: Some("00".into()),
                h2: Some("09".into()),
                m2: Some("15".into()),
                category: Some("work".into()),
            }
        );
    }

    #[test]
    fn test_decode_follows_header_order() {
        let grid = vec![
            row(&["category", "notes", "id", "title", "day", "h1", "m1", "h2", "m2"]),
            row(&["home", "bring keys", "a", "Gym", "Tue", "18", "00", "19", "30"]),
            row(&["work", "", "b", "Review", "Wed", "14", "00", "15", "00"]),
        ];
        let events = decode(&grid).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id.as_deref(), Some("a"));
        assert_eq!(events[0].category.as_deref(), Some("home"));
        assert_eq!(events[1].title.as_deref(), Some("Review"));
    }

    #[test]
    fn test_absent_column_and_short_rows_decode_as_missing() {
        let grid = vec![
            row(&["id", "title", "day", "h1", "m1", "h2", "m2"]),
            row(&["a", "Gym", "Tue", "18", "00", "19", "30"]),
            row(&["b", "Read"]),
            vec![],
        ];
        let events = decode(&grid).unwrap();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.category.is_none()));
        assert_eq!(events[1].title.as_deref(), Some("Read"));
        assert_eq!(events[1].day, None);
        assert_eq!(events[2], Event::default());
    }

    #[test]
    fn test_decode_requires_a_data_row() {
        assert!(matches!(decode(&vec![]), Err(Error::NotFound(ref m)) if m == NO_DATA));
        assert!(matches!(
            decode(&vec![canonical_header()]),
            Err(Error::NotFound(ref m)) if m == NO_DATA
        ));
    }

    #[test]
    fn test_locate_first_match_top_down() {
        let mut grid = standup_grid();
        grid.push(row(&["t2", "Lunch"]));
        grid.push(row(&["t1", "Duplicate"]));

        assert_eq!(locate(&grid, "t1").unwrap(), RowOffset(0));
        assert_eq!(locate(&grid, "t2").unwrap(), RowOffset(1));
        assert!(matches!(
            locate(&grid, "t9"),
            Err(Error::NotFound(ref m)) if m == EVENT_NOT_FOUND
        ));
        assert!(matches!(
            locate(&vec![canonical_header()], "t1"),
            Err(Error::NotFound(ref m)) if m == NO_DATA
        ));
    }

    #[test]
    fn test_locate_without_id_column() {
        let grid = vec![row(&["title"]), row(&["t1"])];
        assert!(matches!(locate(&grid, "t1"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_patch_row_uses_header_positions() {
        let header = row(&["title", "id", "day", "h1", "m1", "h2", "m2", "category", "notes"]);
        let index = HeaderIndex::new(&header);
        let existing = row(&["Standup", "t1", "Mon", "09", "00", "09", "15", "work", "keep"]);

        let patched = index.patch_row(&existing, &record("t1", "Sync")).unwrap();
        assert_eq!(
            patched,
            row(&["Sync", "t1", "Mon", "09", "00", "09", "15", "work"])
        );
    }

    #[test]
    fn test_patch_row_rejects_fields_past_h() {
        let header = row(&["id", "notes", "title", "day", "h1", "m1", "h2", "m2", "category"]);
        let index = HeaderIndex::new(&header);
        assert_eq!(index.beyond_write_window(), vec!["category"]);

        let existing = row(&["t1", "", "Standup", "Mon", "09", "00", "09", "15", "work"]);
        let err = index.patch_row(&existing, &record("t1", "Sync")).unwrap_err();
        assert!(err.is_backend_failure());
        assert!(err.to_string().contains("category"));
    }

    #[test]
    fn test_patch_row_pads_short_rows() {
        let index = HeaderIndex::new(&canonical_header());
        assert!(index.beyond_write_window().is_empty());
        let patched = index.patch_row(&row(&["t1"]), &record("t1", "Sync")).unwrap();
        assert_eq!(
            patched,
            row(&["t1", "Sync", "Mon", "09", "00", "09", "15", "work"])
        );
    }

    #[test]
    fn test_canonical_row_is_field_order() {
        assert_eq!(
            canonical_row(&record("t1", "Standup")),
            row(&["t1", "Standup", "Mon", "09", "00", "09", "15", "work"])
        );
    }
}
