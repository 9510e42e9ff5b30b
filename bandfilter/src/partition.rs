//! Row-band partitioning.
//!
//! Worker `i` owns `[i * lines, (i + 1) * lines)` with `lines = height / n`;
//! the last worker also takes the remainder. When `n > height` every worker
//! but the last owns nothing.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::image::{ImageDesc, RowBuffer};

/// Half-open range of global row indices owned by one participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Owned row ranges for `num_workers` participants, in rank order.
pub fn row_ranges(height: usize, num_workers: usize) -> Result<Vec<RowRange>> {
    if num_workers == 0 {
        return Err(Error::InvalidWorkerCount(num_workers));
    }

    let lines = height / num_workers;
    let ranges = (0..num_workers)
        .map(|rank| {
            let start = rank * lines;
            let end = if rank == num_workers - 1 {
                height
            } else {
                start + lines
            };
            RowRange::new(start, end)
        })
        .collect();

    Ok(ranges)
}

/// Ranks whose partition owns at least one row, in row order. Halo exchange
/// runs along this chain only.
pub fn active_ranks(ranges: &[RowRange]) -> Vec<usize> {
    ranges
        .iter()
        .enumerate()
        .filter(|(_, range)| !range.is_empty())
        .map(|(rank, _)| rank)
        .collect()
}

/// Where a participant's band sits: its owned rows and whether a halo row is
/// kept above and below them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BandLayout {
    pub rank: usize,
    pub owned: RowRange,
    pub halo_top: bool,
    pub halo_bottom: bool,
}

impl BandLayout {
    /// Rows held locally, halos included.
    pub fn local_len(&self) -> usize {
        self.owned.len() + self.halo_top as usize + self.halo_bottom as usize
    }
}

/// Layouts for every rank. Halo flags follow the chain of non-empty
/// partitions, so an empty band never carries halo rows and its non-empty
/// neighbours see past it.
pub fn band_layouts(height: usize, num_workers: usize) -> Result<Vec<BandLayout>> {
    let ranges = row_ranges(height, num_workers)?;
    let active = active_ranks(&ranges);

    let layouts = ranges
        .iter()
        .enumerate()
        .map(|(rank, &owned)| {
            let position = active.iter().position(|&r| r == rank);
            BandLayout {
                rank,
                owned,
                halo_top: position.is_some_and(|p| p > 0),
                halo_bottom: position.is_some_and(|p| p + 1 < active.len()),
            }
        })
        .collect();

    Ok(layouts)
}

/// One participant's band: owned rows plus optional halo rows above/below.
///
/// Halo rows are placeholders until the first exchange fills them; they are
/// never sent back to the coordinator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    layout: BandLayout,
    rows: Vec<RowBuffer>,
    row_len: usize,
}

impl Partition {
    /// Wraps owned rows, adding zeroed halo rows where the layout asks for them.
    pub fn new(layout: BandLayout, owned_rows: Vec<RowBuffer>, row_len: usize) -> Result<Self> {
        if owned_rows.len() != layout.owned.len() {
            return Err(Error::PartitionMismatch {
                rank: layout.rank,
                expected: layout.owned.len(),
                actual: owned_rows.len(),
            });
        }
        if let Some(row) = owned_rows.iter().find(|row| row.len() != row_len) {
            return Err(Error::TruncatedPixels {
                expected: row_len,
                actual: row.len(),
            });
        }

        let mut rows = Vec::with_capacity(layout.local_len());
        if layout.halo_top {
            rows.push(vec![0; row_len]);
        }
        rows.extend(owned_rows);
        if layout.halo_bottom {
            rows.push(vec![0; row_len]);
        }

        Ok(Self {
            layout,
            rows,
            row_len,
        })
    }

    /// Partition for a whole image held by a single participant.
    pub fn whole(desc: &ImageDesc, rows: Vec<RowBuffer>) -> Result<Self> {
        let layout = BandLayout {
            rank: 0,
            owned: RowRange::new(0, desc.height),
            halo_top: false,
            halo_bottom: false,
        };
        Self::new(layout, rows, desc.row_len())
    }

    pub fn layout(&self) -> &BandLayout {
        &self.layout
    }

    pub fn rank(&self) -> usize {
        self.layout.rank
    }

    pub fn owned(&self) -> RowRange {
        self.layout.owned
    }

    pub fn row_len(&self) -> usize {
        self.row_len
    }

    pub fn halo_top(&self) -> bool {
        self.layout.halo_top
    }

    pub fn halo_bottom(&self) -> bool {
        self.layout.halo_bottom
    }

    /// Owned rows plus halo rows.
    pub fn local_rows(&self) -> &[RowBuffer] {
        &self.rows
    }

    pub fn local_rows_mut(&mut self) -> &mut [RowBuffer] {
        &mut self.rows
    }

    pub fn owned_rows(&self) -> &[RowBuffer] {
        let first = self.layout.halo_top as usize;
        &self.rows[first..first + self.layout.owned.len()]
    }

    /// First owned row, sent to the neighbour above.
    pub fn first_owned_row(&self) -> &[u8] {
        debug_assert!(!self.layout.owned.is_empty());
        &self.rows[self.layout.halo_top as usize]
    }

    /// Last owned row, sent to the neighbour below.
    pub fn last_owned_row(&self) -> &[u8] {
        debug_assert!(!self.layout.owned.is_empty());
        &self.rows[self.layout.halo_top as usize + self.layout.owned.len() - 1]
    }

    pub fn set_top_halo(&mut self, row: RowBuffer) {
        debug_assert!(self.layout.halo_top && row.len() == self.row_len);
        self.rows[0] = row;
    }

    pub fn set_bottom_halo(&mut self, row: RowBuffer) {
        debug_assert!(self.layout.halo_bottom && row.len() == self.row_len);
        let last = self.rows.len() - 1;
        self.rows[last] = row;
    }

    /// Drops the halo rows and hands back the owned rows.
    pub fn into_owned_rows(mut self) -> Vec<RowBuffer> {
        if self.layout.halo_bottom {
            self.rows.pop();
        }
        if self.layout.halo_top {
            self.rows.remove(0);
        }
        self.rows
    }
}
