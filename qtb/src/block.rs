//! The on-disk layout of a QTB stream.
//!
//! A stream is a [`StreamHeader`] followed by any number of [`BlockRecord`]s,
//! with no count and no padding. All integers are little-endian.
//!
//! ```text
//! header: width  i32
//!         height i32
//! record: x      u16
//!         y      u16
//!         size   u16
//!         value  u8
//! ```

use std::io::{self, Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt, LE};

use crate::{
    error::{QtbError, Result},
    raster::check_dimensions,
    region::Region,
};

/// The header at the beginning of every QTB stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {
    /// Width of the image in pixels.
    pub width: u32,

    /// Height of the image in pixels.
    pub height: u32,
}

impl StreamHeader {
    pub const LEN: usize = 8;

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];

        // Cannot fail, the buffer is exactly one header long
        self.write_into(&mut &mut buf[..]).unwrap();

        buf
    }

    pub fn write_into<T: Write + WriteBytesExt>(&self, output: &mut T) -> Result<usize> {
        output.write_i32::<LE>(self.width as i32)?;
        output.write_i32::<LE>(self.height as i32)?;

        Ok(Self::LEN)
    }

    pub fn read_from<T: Read + ReadBytesExt>(input: &mut T) -> Result<Self> {
        let width = input.read_i32::<LE>().map_err(eof_as_truncated)?;
        let height = input.read_i32::<LE>().map_err(eof_as_truncated)?;

        check_dimensions(width as i64, height as i64)?;

        Ok(Self {
            width: width as u32,
            height: height as u32,
        })
    }
}

/// A uniform square of the image: its position, size, and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRecord {
    pub x: u16,
    pub y: u16,
    pub size: u16,
    pub value: u8,
}

impl BlockRecord {
    pub const LEN: usize = 7;

    /// Create a record for a leaf region, failing if the region's position or
    /// size cannot be represented in 16 bits.
    pub fn from_region(region: &Region, value: u8) -> Result<Self> {
        let overflow = || QtbError::RecordOverflow {
            x: region.x,
            y: region.y,
            size: region.size,
        };

        Ok(Self {
            x: region.x.try_into().map_err(|_| overflow())?,
            y: region.y.try_into().map_err(|_| overflow())?,
            size: region.size.try_into().map_err(|_| overflow())?,
            value,
        })
    }

    /// The area of the image this record paints.
    pub fn region(&self) -> Region {
        Region {
            x: self.x as u32,
            y: self.y as u32,
            size: self.size as u32,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];

        // Cannot fail, the buffer is exactly one record long
        self.write_into(&mut &mut buf[..]).unwrap();

        buf
    }

    pub fn write_into<T: Write + WriteBytesExt>(&self, output: &mut T) -> Result<usize> {
        output.write_u16::<LE>(self.x)?;
        output.write_u16::<LE>(self.y)?;
        output.write_u16::<LE>(self.size)?;
        output.write_u8(self.value)?;

        Ok(Self::LEN)
    }

    /// Read the next record.
    ///
    /// Returns `Ok(None)` at a clean end of stream, and
    /// [`QtbError::TruncatedRecord`] when the stream stops partway through a
    /// record.
    pub fn read_from<T: Read + ReadBytesExt>(input: &mut T) -> Result<Option<Self>> {
        let mut buf = [0u8; Self::LEN];
        let mut filled = 0;

        while filled < Self::LEN {
            match input.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        match filled {
            0 => Ok(None),
            Self::LEN => {
                let mut buf = &buf[..];
                Ok(Some(Self {
                    x: buf.read_u16::<LE>()?,
                    y: buf.read_u16::<LE>()?,
                    size: buf.read_u16::<LE>()?,
                    value: buf.read_u8()?,
                }))
            }
            n => Err(QtbError::TruncatedRecord(n)),
        }
    }
}

fn eof_as_truncated(e: io::Error) -> QtbError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        QtbError::TruncatedHeader
    } else {
        QtbError::Io(e)
    }
}
