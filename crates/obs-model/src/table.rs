//! Untyped table produced by the ingestor.

use serde::{Deserialize, Serialize};

/// Header names as read from the sources and rows of optional text cells.
///
/// Every row has exactly `headers.len()` cells; missing cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding short rows with `None` and dropping extra cells.
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) {
        row.resize(self.headers.len(), None);
        self.rows.push(row);
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column whose header equals `name` exactly.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }

    /// Appends the rows of `other`, matching columns by header name.
    ///
    /// Columns only `other` has are added at the end; existing rows get `None`
    /// for them. Repeated header names inside `other` map to distinct columns.
    pub fn append(&mut self, other: RawTable) {
        let mut claimed = vec![false; self.headers.len()];
        let mut mapping = Vec::with_capacity(other.headers.len());

        for header in other.headers {
            let existing = self
                .headers
                .iter()
                .enumerate()
                .position(|(idx, name)| *name == header && !claimed[idx]);
            let idx = match existing {
                Some(idx) => idx,
                None => {
                    self.headers.push(header);
                    claimed.push(false);
                    self.headers.len() - 1
                }
            };
            claimed[idx] = true;
            mapping.push(idx);
        }

        let width = self.headers.len();
        for row in &mut self.rows {
            row.resize(width, None);
        }

        for row in other.rows {
            let mut aligned = vec![None; width];
            for (src, value) in row.into_iter().enumerate() {
                if let Some(&dst) = mapping.get(src) {
                    aligned[dst] = value;
                }
            }
            self.rows.push(aligned);
        }
    }

    /// Concatenates tables in order.
    pub fn concat(tables: impl IntoIterator<Item = RawTable>) -> RawTable {
        let mut combined = RawTable::default();
        for table in tables {
            combined.append(table);
        }
        combined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| (!v.is_empty()).then(|| (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_push_row_pads() {
        let mut table = RawTable::new(vec!["A".into(), "B".into()]);
        table.push_row(cells(&["1"]));
        assert_eq!(table.rows[0], vec![Some("1".to_string()), None]);
    }

    #[test]
    fn test_append_unions_columns() {
        let mut first = RawTable::new(vec!["A".into(), "B".into()]);
        first.push_row(cells(&["1", "2"]));
        let mut second = RawTable::new(vec!["B".into(), "C".into()]);
        second.push_row(cells(&["3", "4"]));

        let combined = RawTable::concat([first, second]);

        assert_eq!(combined.headers, vec!["A", "B", "C"]);
        assert_eq!(combined.height(), 2);
        assert_eq!(combined.cell(0, 2), None);
        assert_eq!(combined.cell(1, 0), None);
        assert_eq!(combined.cell(1, 1), Some("3"));
        assert_eq!(combined.cell(1, 2), Some("4"));
    }

    #[test]
    fn test_append_keeps_duplicate_headers_apart() {
        let mut table = RawTable::new(vec!["A".into(), "A".into()]);
        table.push_row(cells(&["x", "y"]));
        let combined = RawTable::concat([table]);

        assert_eq!(combined.width(), 2);
        assert_eq!(combined.cell(0, 0), Some("x"));
        assert_eq!(combined.cell(0, 1), Some("y"));
    }
}
