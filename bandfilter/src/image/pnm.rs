//! Binary PNM codec: `P5` (gray) and `P6` (interleaved RGB), 8-bit samples.

use std::io::{self, Write};

use super::{ChannelCount, Image, ImageDesc};
use crate::error::{Error, Result};

const GRAY_MAGIC: &str = "P5";
const RGB_MAGIC: &str = "P6";

struct HeaderCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> HeaderCursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&b) = self.data.get(self.pos) {
            if b == b'#' {
                while let Some(&c) = self.data.get(self.pos) {
                    self.pos += 1;
                    if c == b'\n' {
                        break;
                    }
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn token(&mut self, what: &str) -> Result<&'a str> {
        self.skip_whitespace_and_comments();
        let start = self.pos;
        while self
            .data
            .get(self.pos)
            .is_some_and(|b| !b.is_ascii_whitespace())
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(Error::MalformedHeader(format!("missing {what}")));
        }

        let data = self.data;
        std::str::from_utf8(&data[start..self.pos])
            .map_err(|_| Error::MalformedHeader(format!("{what} is not ASCII")))
    }

    fn number(&mut self, what: &str) -> Result<usize> {
        let token = self.token(what)?;
        token
            .parse()
            .map_err(|_| Error::MalformedHeader(format!("invalid {what} '{token}'")))
    }

    /// Consumes the single whitespace byte separating the header from pixels.
    fn end_of_header(&mut self) -> Result<usize> {
        match self.data.get(self.pos) {
            Some(b) if b.is_ascii_whitespace() => Ok(self.pos + 1),
            _ => Err(Error::MalformedHeader(
                "missing separator before pixel data".to_string(),
            )),
        }
    }
}

pub fn decode(data: &[u8]) -> Result<Image> {
    let mut cursor = HeaderCursor::new(data);

    let channels = match cursor.token("magic")? {
        GRAY_MAGIC => ChannelCount::Gray,
        RGB_MAGIC => ChannelCount::Rgb,
        other => {
            return Err(Error::MalformedHeader(format!(
                "unsupported magic '{other}'"
            )))
        }
    };

    let width = cursor.number("width")?;
    let height = cursor.number("height")?;
    if width == 0 || height == 0 {
        return Err(Error::MalformedHeader(format!(
            "empty image {width}x{height}"
        )));
    }

    let max_value = cursor.number("max value")?;
    let max_value = u8::try_from(max_value)
        .ok()
        .filter(|&v| v > 0)
        .ok_or_else(|| {
            Error::MalformedHeader(format!("max value {max_value} outside 1..=255"))
        })?;

    let pixels_start = cursor.end_of_header()?;
    let expected = width
        .checked_mul(channels.stride())
        .and_then(|row_len| row_len.checked_mul(height))
        .ok_or_else(|| {
            Error::MalformedHeader(format!("image size {width}x{height} overflows"))
        })?;
    let desc = ImageDesc::new(channels, width, height, max_value);
    let available = data.len().saturating_sub(pixels_start);
    if available < expected {
        return Err(Error::TruncatedPixels {
            expected,
            actual: available,
        });
    }

    Image::from_bytes(desc, &data[pixels_start..pixels_start + expected])
}

pub fn encode<W: Write>(image: &Image, writer: &mut W) -> io::Result<()> {
    let desc = image.desc();
    let magic = match desc.channels {
        ChannelCount::Gray => GRAY_MAGIC,
        ChannelCount::Rgb => RGB_MAGIC,
    };

    writeln!(writer, "{magic}")?;
    writeln!(writer, "{} {}", desc.width, desc.height)?;
    writeln!(writer, "{}", desc.max_value)?;
    for row in image.rows() {
        writer.write_all(row)?;
    }

    Ok(())
}
