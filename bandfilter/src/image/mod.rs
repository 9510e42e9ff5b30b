//! Per-participant pixel storage: an image is an ordered list of row buffers,
//! each exactly `width * channels` interleaved byte samples long.

pub mod pnm;


use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use pnm::{decode, encode};

/// One row of interleaved samples, `width * channels` bytes.
pub type RowBuffer = Vec<u8>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelCount {
    Gray = 1,
    Rgb = 3,
}

impl ChannelCount {
    #[inline]
    pub fn stride(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageDesc {
    pub channels: ChannelCount,
    pub width: usize,
    pub height: usize,
    pub max_value: u8,
}

impl ImageDesc {
    pub fn new(channels: ChannelCount, width: usize, height: usize, max_value: u8) -> Self {
        Self {
            channels,
            width,
            height,
            max_value,
        }
    }

    /// Number of samples in one row.
    #[inline]
    pub fn row_len(&self) -> usize {
        self.width * self.channels.stride()
    }

    pub fn size_in_bytes(&self) -> usize {
        self.height * self.row_len()
    }
}

impl std::fmt::Display for ImageDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} {:?} max={}",
            self.width, self.height, self.channels, self.max_value
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    desc: ImageDesc,
    rows: Vec<RowBuffer>,
}

impl Image {
    /// Builds an image from rows, checking the row count and every row length.
    pub fn new(desc: ImageDesc, rows: Vec<RowBuffer>) -> Result<Image> {
        if rows.len() != desc.height {
            return Err(Error::PartitionMismatch {
                rank: 0,
                expected: desc.height,
                actual: rows.len(),
            });
        }
        if let Some(row) = rows.iter().find(|row| row.len() != desc.row_len()) {
            return Err(Error::TruncatedPixels {
                expected: desc.row_len(),
                actual: row.len(),
            });
        }

        Ok(Image { desc, rows })
    }

    /// Splits a tightly packed row-major byte buffer into rows.
    pub fn from_bytes(desc: ImageDesc, bytes: &[u8]) -> Result<Image> {
        if bytes.len() != desc.size_in_bytes() {
            return Err(Error::TruncatedPixels {
                expected: desc.size_in_bytes(),
                actual: bytes.len(),
            });
        }

        let rows = if desc.row_len() == 0 {
            vec![RowBuffer::new(); desc.height]
        } else {
            bytes.chunks_exact(desc.row_len()).map(<[u8]>::to_vec).collect()
        };

        Ok(Image { desc, rows })
    }

    pub fn new_filled(desc: ImageDesc, value: u8) -> Image {
        Image {
            desc,
            rows: vec![vec![value; desc.row_len()]; desc.height],
        }
    }

    pub fn desc(&self) -> &ImageDesc {
        &self.desc
    }

    pub fn rows(&self) -> &[RowBuffer] {
        &self.rows
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.rows[y]
    }

    pub fn into_rows(self) -> Vec<RowBuffer> {
        self.rows
    }

    /// Sample at pixel `(x, y)`, channel `c`.
    #[inline]
    pub fn sample(&self, x: usize, y: usize, c: usize) -> u8 {
        self.rows[y][x * self.desc.channels.stride() + c]
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.rows.concat()
    }

    pub fn read_file<P: AsRef<Path>>(filename: P) -> Result<Image> {
        let path = filename.as_ref();
        let data = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        decode(&data)
    }

    pub fn save_file<P: AsRef<Path>>(&self, filename: P) -> Result<()> {
        let path = filename.as_ref();
        let file = std::fs::File::create(path).map_err(|e| Error::io(path, e))?;
        let mut writer = std::io::BufWriter::new(file);
        encode(self, &mut writer).map_err(|e| Error::io(path, e))?;
        std::io::Write::flush(&mut writer).map_err(|e| Error::io(path, e))
    }
}
