//! Row type
//!
//! A [`Row`] is the staging area for one spreadsheet row: a fixed number of
//! column slots plus a cursor for sequential insertion. The slot count is set
//! once from the column count and never changes afterwards.

use crate::cell::Cell;
use crate::error::{Error, Result};

/// One row of staged cell values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<Cell>,
    cursor: usize,
}

impl Row {
    /// Create a row with `columns` empty slots
    ///
    /// Fails with [`Error::AllocationFailure`] when the slots cannot be
    /// allocated.
    pub fn new(columns: usize) -> Result<Self> {
        let mut cells = Vec::new();
        cells.try_reserve_exact(columns).map_err(|e| {
            Error::AllocationFailure(format!("row with {} columns: {}", columns, e))
        })?;
        cells.resize_with(columns, Cell::new);
        Ok(Self { cells, cursor: 0 })
    }

    /// Number of column slots
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row has no column slots
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Column that receives the next sequential value
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Get a cell by column index
    pub fn cell(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    /// Values of a column (empty for out-of-range columns)
    pub fn values(&self, col: usize) -> &[String] {
        self.cells.get(col).map(Cell::values).unwrap_or(&[])
    }

    /// Iterate over all cells in column order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Check if every slot is empty
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }

    /// Overwrite a column with a single value
    ///
    /// Any previous values of the slot are dropped. Empty values are rejected;
    /// use [`Row::clear`] to blank a cell.
    pub fn set_value(&mut self, col: usize, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        let count = self.cells.len();
        let cell = self
            .cells
            .get_mut(col)
            .ok_or(Error::ColumnOutOfBounds(col, count))?;
        if value.is_empty() {
            return Err(Error::EmptyValue(col));
        }
        cell.set(value);
        Ok(())
    }

    /// Write an ordered sequence of values into one column
    ///
    /// Empty strings in the sequence are skipped. The slot is left untouched
    /// when the column is invalid or no value remains.
    pub fn append_values<I, S>(&mut self, col: usize, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let count = self.cells.len();
        if col >= count {
            return Err(Error::ColumnOutOfBounds(col, count));
        }

        let iter = values.into_iter();
        let mut collected = Vec::new();
        collected
            .try_reserve(iter.size_hint().0)
            .map_err(|e| Error::AllocationFailure(format!("values for column {}: {}", col, e)))?;
        collected.extend(iter.map(Into::<String>::into).filter(|v| !v.is_empty()));

        if collected.is_empty() {
            return Err(Error::EmptySequence(col));
        }

        self.cells[col].replace(collected);
        Ok(())
    }

    /// Blank a column
    pub fn clear(&mut self, col: usize) -> Result<()> {
        let count = self.cells.len();
        self.cells
            .get_mut(col)
            .ok_or(Error::ColumnOutOfBounds(col, count))?
            .clear();
        Ok(())
    }

    /// Blank every column and rewind the cursor
    pub fn clear_all(&mut self) {
        self.cells.iter_mut().for_each(Cell::clear);
        self.cursor = 0;
    }

    /// Write a value at the cursor and advance it by one column
    ///
    /// An empty value leaves the cell blank but still advances the cursor.
    pub fn push_value(&mut self, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        let col = self.checked_cursor()?;
        if value.is_empty() {
            self.cells[col].clear();
        } else {
            self.cells[col].set(value);
        }
        self.cursor += 1;
        Ok(())
    }

    /// Write a value sequence at the cursor and advance it by one column
    pub fn push_values<I, S>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let col = self.checked_cursor()?;
        self.append_values(col, values)?;
        self.cursor += 1;
        Ok(())
    }

    /// Advance the cursor without writing
    pub fn skip(&mut self) -> Result<()> {
        let col = self.checked_cursor()?;
        self.cells[col].clear();
        self.cursor += 1;
        Ok(())
    }

    fn checked_cursor(&self) -> Result<usize> {
        if self.cursor < self.cells.len() {
            Ok(self.cursor)
        } else {
            Err(Error::ColumnOutOfBounds(self.cursor, self.cells.len()))
        }
    }
}
