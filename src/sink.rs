//! Output sink receiving decoded rows.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{OutputCell, Schema};

/// Row writer of the downstream engine.
///
/// For each row every column is set exactly once, by value or as NULL,
/// then [`OutputSink::next_row`] advances to the next row.
pub trait OutputSink {
    /// Set the value of `column` in the current row.
    fn set(&mut self, column: usize, cell: OutputCell) -> Result<()>;

    /// Set `column` of the current row to NULL.
    fn set_null(&mut self, column: usize) -> Result<()> {
        self.set(column, OutputCell::Null)
    }

    /// Finish the current row.
    fn next_row(&mut self) -> Result<()>;
}

/// A row held by [`RowCollector`], one cell per schema column.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    cells: Vec<OutputCell>,
    schema: Arc<Schema>,
}

impl OutputRow {
    pub fn get(&self, ordinal: usize) -> Option<&OutputCell> {
        self.cells.get(ordinal)
    }

    /// Cell of the column named `name`, compared case-insensitively.
    pub fn get_by_name(&self, name: &str) -> Option<&OutputCell> {
        self.schema.find_by_name(name).and_then(|i| self.cells.get(i))
    }

    pub fn values(&self) -> &[OutputCell] {
        &self.cells
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OutputCell> {
        self.cells.iter()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

impl fmt::Display for OutputRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{}", cell)?;
        }
        Ok(())
    }
}

/// Sink collecting rows in memory.
#[derive(Debug)]
pub struct RowCollector {
    schema: Arc<Schema>,
    current: Vec<OutputCell>,
    rows: Vec<OutputRow>,
}

impl RowCollector {
    /// Create a collector for rows of `schema`.
    pub fn new(schema: Arc<Schema>) -> Self {
        let width = schema.len();
        Self {
            schema,
            current: vec![OutputCell::Null; width],
            rows: Vec::new(),
        }
    }

    /// Rows written so far.
    pub fn rows(&self) -> &[OutputRow] {
        &self.rows
    }

    /// Take the collected rows.
    pub fn into_rows(self) -> Vec<OutputRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl OutputSink for RowCollector {
    fn set(&mut self, column: usize, cell: OutputCell) -> Result<()> {
        let width = self.current.len();
        let slot = self.current.get_mut(column).ok_or_else(|| {
            Error::sink(format!("column {} out of range ({} columns)", column, width))
        })?;
        *slot = cell;
        Ok(())
    }

    fn next_row(&mut self) -> Result<()> {
        let values = std::mem::replace(&mut self.current, vec![OutputCell::Null; self.schema.len()]);
        self.rows.push(OutputRow {
            cells: values,
            schema: Arc::clone(&self.schema),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_rows() {
        let mut sink = RowCollector::new(Arc::new(Schema::status()));
        sink.set(0, OutputCell::Int64(7)).unwrap();
        sink.next_row().unwrap();
        sink.set_null(0).unwrap();
        sink.next_row().unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.rows()[0].get(0), Some(&OutputCell::Int64(7)));
        assert_eq!(sink.rows()[1].get_by_name("dblink"), Some(&OutputCell::Null));
    }

    #[test]
    fn test_row_lookup_and_display() {
        let descs = vec![
            crate::types::ColumnDescription::new("NAME", crate::driver::constants::SQL_VARCHAR)
                .with_size(100),
            crate::types::ColumnDescription::new("VALUE", crate::driver::constants::SQL_INTEGER),
        ];
        let schema = Schema::compile(&descs, &crate::options::Capabilities::default()).unwrap();
        let mut sink = RowCollector::new(Arc::new(schema));
        sink.set(0, OutputCell::VarString("test".to_string())).unwrap();
        sink.set(1, OutputCell::Int64(42)).unwrap();
        sink.next_row().unwrap();

        let row = &sink.rows()[0];
        assert_eq!(row.get_by_name("value"), Some(&OutputCell::Int64(42)));
        assert_eq!(row.get_by_name("VALUE"), row.get(1));
        assert_eq!(row.get_by_name("missing"), None);
        assert_eq!(row.schema().columns[0].name, "NAME");
        assert_eq!(row.to_string(), format!("test | {}", OutputCell::Int64(42)));
    }

    #[test]
    fn test_column_out_of_range() {
        let mut sink = RowCollector::new(Arc::new(Schema::status()));
        assert!(matches!(
            sink.set(1, OutputCell::Int64(1)),
            Err(Error::Sink { .. })
        ));
    }
}
