//! 3x3 convolution over a participant's local rows.
//!
//! Only interior cells are written: the first and last local row and the
//! first and last pixel of every row keep their values. On a band with halos
//! the first/last local rows are the halos; on the outermost bands they are
//! the image border rows, which are never filtered.

#[cfg(test)]
mod tests;

use crate::image::{ChannelCount, RowBuffer};
use crate::kernel::Kernel;

#[derive(Debug)]
pub struct ConvolutionEngine {
    stride: usize,
    scratch: Vec<RowBuffer>,
}

impl ConvolutionEngine {
    pub fn new(channels: ChannelCount) -> Self {
        Self {
            stride: channels.stride(),
            scratch: Vec::new(),
        }
    }

    /// Filters `rows` in place. All reads see the pre-pass values because
    /// results land in the scratch rows first.
    pub fn apply(&mut self, rows: &mut [RowBuffer], kernel: &Kernel) {
        let height = rows.len();
        if height < 3 {
            return;
        }
        let row_len = rows[0].len();
        let c = self.stride;
        // Interior columns: every sample of every pixel but the first and last.
        let columns = c..row_len.saturating_sub(c);
        if columns.is_empty() {
            return;
        }

        self.scratch.resize_with(height, Vec::new);
        for row in &mut self.scratch {
            row.resize(row_len, 0);
        }

        for y in 1..height - 1 {
            let (above, center, below) = (&rows[y - 1], &rows[y], &rows[y + 1]);
            let out = &mut self.scratch[y];
            for x in columns.clone() {
                let neighbourhood = [
                    [above[x - c], above[x], above[x + c]],
                    [center[x - c], center[x], center[x + c]],
                    [below[x - c], below[x], below[x + c]],
                ];
                out[x] = kernel.apply(neighbourhood);
            }
        }

        for (row, filtered) in rows[1..height - 1]
            .iter_mut()
            .zip(&self.scratch[1..height - 1])
        {
            row[columns.clone()].copy_from_slice(&filtered[columns.clone()]);
        }
    }
}
