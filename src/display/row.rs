//! Mapping from logical buffer offsets to the two DDRAM rows of the module.

use core::ops::Range;

use crate::command::consts::*;

/// One of the two rows of the module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Row {
    Top,
    Bottom,
}

impl Row {
    /// The row holding logical `offset`. Offsets at or past the end of the buffer belong to the
    /// bottom row.
    pub fn of(offset: usize) -> Row {
        if offset < ROW_BOUNDARY {
            Row::Top
        } else {
            Row::Bottom
        }
    }

    fn index(self) -> usize {
        match self {
            Row::Top => 0,
            Row::Bottom => 1,
        }
    }

    /// The logical offsets shown on this row.
    pub fn span(self) -> Range<usize> {
        let start = self.index() * NUM_COLS;
        start..start + NUM_COLS
    }

    /// DDRAM address of the first cell of this row.
    pub fn base(self) -> u8 {
        ROW_DDRAM_BASE[self.index()]
    }

    /// The part of `range` that falls on this row. Empty when they do not overlap.
    pub fn clip(self, range: &Range<usize>) -> Range<usize> {
        let span = self.span();
        let start = range.start.max(span.start);
        let end = range.end.min(span.end);
        start..end.max(start)
    }
}

/// DDRAM address of the cell showing logical `offset`, which must be below `BUF_SIZE`.
pub fn ddram_address(offset: usize) -> u8 {
    let row = Row::of(offset);
    row.base() + (offset - row.span().start) as u8
}
