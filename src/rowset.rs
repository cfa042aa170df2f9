//! Column-wise row-set buffers.
//!
//! Each result column owns one contiguous arena of `capacity × width` bytes
//! and an indicator array of `capacity` signed lengths. The driver fills
//! both on every fetch; the decoder reads them back. All access goes through
//! bounds-checked `(column, row)` accessors.
//!
//! Arenas are reused across fetches and never cleared, so a slot whose
//! indicator is `SQL_NULL_DATA` may hold bytes from an earlier row-set.

use bytes::BytesMut;
use std::panic::Location;

use crate::driver::ColumnBinding;
use crate::error::{Error, Result};
use crate::options::RowsetSize;
use crate::types::Schema;

/// Buffer and indicator array of one bound column.
#[derive(Debug)]
pub struct ColumnBuffer {
    binding: ColumnBinding,
    data: BytesMut,
    indicators: Vec<i64>,
}

impl ColumnBuffer {
    fn new(binding: ColumnBinding, capacity: usize) -> Self {
        Self {
            binding,
            data: BytesMut::zeroed(binding.element_width * capacity),
            indicators: vec![0; capacity],
        }
    }

    /// Transfer layout this buffer was allocated for.
    pub fn binding(&self) -> ColumnBinding {
        self.binding
    }

    /// Bytes reserved per row.
    pub fn element_width(&self) -> usize {
        self.binding.element_width
    }

    /// Total bytes held by the arena.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}

/// Row-set buffers for every result column.
#[derive(Debug)]
pub struct RowSet {
    columns: Vec<ColumnBuffer>,
    capacity: usize,
}

impl RowSet {
    /// Allocate one buffer per schema column, each holding `rowset_size` rows.
    pub fn allocate(schema: &Schema, rowset_size: RowsetSize) -> Self {
        let capacity = rowset_size.get();
        let columns = schema
            .columns
            .iter()
            .map(|c| ColumnBuffer::new(c.binding, capacity))
            .collect();
        Self { columns, capacity }
    }

    /// Rows per fetch.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of bound columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Get a column buffer.
    pub fn column(&self, column: usize) -> Option<&ColumnBuffer> {
        self.columns.get(column)
    }

    /// Total bytes held across all arenas.
    pub fn byte_len(&self) -> usize {
        self.columns.iter().map(ColumnBuffer::byte_len).sum()
    }

    #[track_caller]
    fn checked(&self, column: usize, row: usize) -> Result<&ColumnBuffer> {
        match self.columns.get(column) {
            Some(buf) if row < self.capacity => Ok(buf),
            _ => Err(Error::SlotOutOfBounds {
                column,
                row,
                capacity: self.capacity,
                location: Location::caller(),
            }),
        }
    }

    /// Bytes of one cell.
    #[track_caller]
    pub fn slot(&self, column: usize, row: usize) -> Result<&[u8]> {
        let buf = self.checked(column, row)?;
        let width = buf.binding.element_width;
        Ok(&buf.data[row * width..(row + 1) * width])
    }

    /// Mutable bytes of one cell, for drivers filling the row-set.
    #[track_caller]
    pub fn slot_mut(&mut self, column: usize, row: usize) -> Result<&mut [u8]> {
        self.checked(column, row)?;
        let buf = &mut self.columns[column];
        let width = buf.binding.element_width;
        Ok(&mut buf.data[row * width..(row + 1) * width])
    }

    /// Indicator of one cell.
    #[track_caller]
    pub fn indicator(&self, column: usize, row: usize) -> Result<i64> {
        let buf = self.checked(column, row)?;
        Ok(buf.indicators[row])
    }

    /// Set the indicator of one cell.
    #[track_caller]
    pub fn set_indicator(&mut self, column: usize, row: usize, value: i64) -> Result<()> {
        self.checked(column, row)?;
        self.columns[column].indicators[row] = value;
        Ok(())
    }
}
