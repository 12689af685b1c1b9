//! Fixed-width big-endian serialization of memory images.
//!
//! Every cell is written independently as a two's-complement integer of
//! `width` bytes, most significant byte first. There is no header: the cell
//! count is the file length divided by the width.

use std::fmt;
use std::io::{self, Read, Write};

use crate::{Cell, MemoryImage};

/// Cell width used when none is configured.
pub const DEFAULT_WIDTH: usize = 4;

const MAX_WIDTH: usize = size_of::<Cell>();

#[derive(Debug)]
pub enum CodecError {
    InvalidWidth { width: usize },
    ValueOutOfRange { address: usize, value: Cell, width: usize },
    TrailingBytes { len: usize, width: usize },
    Io(io::Error),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidWidth { width } => {
                write!(f, "cell width must be 1..={MAX_WIDTH} bytes, got {width}")
            }
            Self::ValueOutOfRange {
                address,
                value,
                width,
            } => write!(
                f,
                "cell {address} holds {value}, which does not fit in {width} bytes"
            ),
            Self::TrailingBytes { len, width } => write!(
                f,
                "image of {len} bytes is not a multiple of the {width}-byte cell width"
            ),
            Self::Io(err) => write!(f, "i/o error: {err}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

fn check_width(width: usize) -> Result<(), CodecError> {
    if width == 0 || width > MAX_WIDTH {
        return Err(CodecError::InvalidWidth { width });
    }
    Ok(())
}

fn fits(value: Cell, width: usize) -> bool {
    if width == MAX_WIDTH {
        return true;
    }
    let bits = (width * 8) as u32;
    let min = -(1i64 << (bits - 1));
    let max = (1i64 << (bits - 1)) - 1;
    (min..=max).contains(&value)
}

/// Serialize `cells` with `width` bytes per cell.
pub fn encode(cells: &[Cell], width: usize) -> Result<Vec<u8>, CodecError> {
    check_width(width)?;
    let mut out = Vec::with_capacity(cells.len() * width);
    for (address, &value) in cells.iter().enumerate() {
        if !fits(value, width) {
            return Err(CodecError::ValueOutOfRange {
                address,
                value,
                width,
            });
        }
        let bytes = value.to_be_bytes();
        out.extend_from_slice(&bytes[MAX_WIDTH - width..]);
    }
    Ok(out)
}

/// Deserialize cells of `width` bytes, sign-extending each one.
pub fn decode(bytes: &[u8], width: usize) -> Result<Vec<Cell>, CodecError> {
    check_width(width)?;
    if bytes.len() % width != 0 {
        return Err(CodecError::TrailingBytes {
            len: bytes.len(),
            width,
        });
    }

    let cells = bytes
        .chunks_exact(width)
        .map(|chunk| {
            let fill = if chunk[0] & 0x80 != 0 { 0xFF } else { 0x00 };
            let mut buf = [fill; MAX_WIDTH];
            buf[MAX_WIDTH - width..].copy_from_slice(chunk);
            Cell::from_be_bytes(buf)
        })
        .collect();
    Ok(cells)
}

pub fn write_image(
    w: &mut dyn Write,
    image: &MemoryImage,
    width: usize,
) -> Result<(), CodecError> {
    let bytes = encode(image.cells(), width)?;
    w.write_all(&bytes)?;
    w.flush()?;
    log::debug!(
        "wrote {} cells ({} bytes, width {width})",
        image.len(),
        bytes.len()
    );
    Ok(())
}

pub fn read_image(
    r: &mut dyn Read,
    width: usize,
) -> Result<MemoryImage, CodecError> {
    let mut bytes = Vec::new();
    r.read_to_end(&mut bytes)?;
    let cells = decode(&bytes, width)?;
    log::debug!("read {} cells (width {width})", cells.len());
    Ok(MemoryImage::from_cells(cells))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_big_endian_signed() {
        let bytes = encode(&[1, -1, 256], 4).unwrap();
        assert_eq!(
            bytes,
            vec![0, 0, 0, 1, 0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 1, 0]
        );
    }

    #[test]
    fn decode_sign_extends_narrow_cells() {
        let cells = decode(&[0xFF, 0xFE, 0x00, 0x7F, 0x80, 0x00], 2).unwrap();
        assert_eq!(cells, vec![-2, 127, -32768]);
    }

    #[test]
    fn full_width_keeps_extremes() {
        let cells = [i64::MIN, i64::MAX, 0, -1];
        let bytes = encode(&cells, 8).unwrap();
        assert_eq!(decode(&bytes, 8).unwrap(), cells.to_vec());
    }

    #[test]
    fn rejects_values_that_do_not_fit() {
        match encode(&[0, 128], 1) {
            Err(CodecError::ValueOutOfRange {
                address: 1,
                value: 128,
                width: 1,
            }) => {}
            other => panic!("expected ValueOutOfRange, got {other:?}"),
        }
        assert!(encode(&[-128, 127], 1).is_ok());
    }

    #[test]
    fn rejects_bad_width_and_trailing_bytes() {
        assert!(matches!(
            encode(&[1], 0),
            Err(CodecError::InvalidWidth { width: 0 })
        ));
        assert!(matches!(
            decode(&[0; 4], 9),
            Err(CodecError::InvalidWidth { width: 9 })
        ));
        assert!(matches!(
            decode(&[0; 5], 4),
            Err(CodecError::TrailingBytes { len: 5, width: 4 })
        ));
    }

    #[test]
    fn write_then_read_through_io() {
        let image = MemoryImage::from_cells(vec![3, 3, 6, 0, 0, 0, -1, -1, 0]);
        let mut buf = Vec::new();
        write_image(&mut buf, &image, 2).unwrap();
        assert_eq!(buf.len(), 18);

        let read = read_image(&mut buf.as_slice(), 2).unwrap();
        assert_eq!(read, image);
    }
}
