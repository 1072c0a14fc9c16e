use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use byteorder::ReadBytesExt;
use log::{debug, warn};

use crate::{
    block::{BlockRecord, StreamHeader},
    error::{QtbError, Result},
    raster::Raster,
};

/// Parameters controlling how strictly a stream is checked while decoding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Fail if the stream ends partway through a record instead of ignoring
    /// the trailing bytes.
    pub strict: bool,

    /// Fail if any pixel of the image was not painted by a block.
    pub verify_coverage: bool,
}

impl DecodeOptions {
    /// Both strict framing and coverage checks.
    pub fn checked() -> Self {
        Self {
            strict: true,
            verify_coverage: true,
        }
    }
}

/// Iterates over the block records of a stream after its header.
pub struct BlockReader<I: Read + ReadBytesExt> {
    input: I,
    header: StreamHeader,
    strict: bool,
    finished: bool,
}

impl<I: Read + ReadBytesExt> BlockReader<I> {
    /// Read the stream header and prepare to read records.
    pub fn new(mut input: I, strict: bool) -> Result<Self> {
        let header = StreamHeader::read_from(&mut input)?;

        Ok(Self {
            input,
            header,
            strict,
            finished: false,
        })
    }

    pub fn header(&self) -> StreamHeader {
        self.header
    }
}

impl<I: Read + ReadBytesExt> Iterator for BlockReader<I> {
    type Item = Result<BlockRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None
        }

        match BlockRecord::read_from(&mut self.input) {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(QtbError::TruncatedRecord(n)) if !self.strict => {
                warn!("ignoring {n} trailing bytes after the last block");
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Decode an image from anything that implements [`Read`].
pub fn decode<I: Read + ReadBytesExt>(input: I, options: DecodeOptions) -> Result<Raster> {
    let records = BlockReader::new(input, options.strict)?;
    let header = records.header();
    debug!("decoding {}×{} image", header.width, header.height);

    let mut raster = Raster::new(header.width, header.height)?;
    let mut painted = options
        .verify_coverage
        .then(|| Raster::new(header.width, header.height))
        .transpose()?;

    let mut count = 0;
    for record in records {
        let record = record?;
        let region = record.region();

        raster.fill_region(&region, record.value);
        if let Some(painted) = painted.as_mut() {
            painted.fill_region(&region, 1);
        }
        count += 1;
    }
    debug!("painted {count} blocks");

    if let Some(painted) = painted {
        let unpainted = painted.as_raw().iter().filter(|&&p| p == 0).count();
        if unpainted > 0 {
            return Err(QtbError::IncompleteCoverage { unpainted })
        }
    }

    Ok(raster)
}

/// Open a QTB file and decode it.
pub fn open<P: AsRef<Path>>(path: P, options: DecodeOptions) -> Result<Raster> {
    let input = BufReader::new(File::open(path)?);
    decode(input, options)
}

/// Decode an image from a byte slice.
pub fn decode_from_slice(bytes: &[u8], options: DecodeOptions) -> Result<Raster> {
    decode(bytes, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(width: i32, height: i32, records: &[BlockRecord]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&width.to_le_bytes());
        bytes.extend_from_slice(&height.to_le_bytes());
        for record in records {
            bytes.extend_from_slice(&record.to_bytes());
        }

        bytes
    }

    #[test]
    fn paints_clipped_blocks() {
        let bytes = stream(3, 2, &[
            BlockRecord { x: 0, y: 0, size: 4, value: 7 },
            BlockRecord { x: 2, y: 0, size: 2, value: 9 },
        ]);
        let raster = decode_from_slice(&bytes, DecodeOptions::default()).unwrap();

        assert_eq!(raster.as_raw(), &[7, 7, 9, 7, 7, 9]);
    }

    #[test]
    fn header_only_stream_is_blank() {
        let bytes = stream(2, 2, &[]);
        let raster = decode_from_slice(&bytes, DecodeOptions::default()).unwrap();
        assert_eq!(raster.as_raw(), &[0; 4]);

        let err = decode_from_slice(&bytes, DecodeOptions::checked()).unwrap_err();
        assert!(matches!(err, QtbError::IncompleteCoverage { unpainted: 4 }));
    }

    #[test]
    fn trailing_bytes() {
        let mut bytes = stream(1, 1, &[BlockRecord { x: 0, y: 0, size: 1, value: 3 }]);
        bytes.extend_from_slice(&[0, 0]);

        let raster = decode_from_slice(&bytes, DecodeOptions::default()).unwrap();
        assert_eq!(raster.get(0, 0), 3);

        let strict = DecodeOptions { strict: true, ..Default::default() };
        let err = decode_from_slice(&bytes, strict).unwrap_err();
        assert!(matches!(err, QtbError::TruncatedRecord(2)));
    }

    #[test]
    fn blocks_outside_image_are_ignored() {
        let bytes = stream(2, 2, &[
            BlockRecord { x: 0, y: 0, size: 2, value: 1 },
            BlockRecord { x: 100, y: 3, size: 64, value: 200 },
        ]);
        let raster = decode_from_slice(&bytes, DecodeOptions::checked()).unwrap();

        assert_eq!(raster.as_raw(), &[1; 4]);
    }

    #[test]
    fn reader_reports_header() {
        let bytes = stream(640, 480, &[BlockRecord { x: 0, y: 0, size: 1024, value: 0 }]);
        let reader = BlockReader::new(&bytes[..], true).unwrap();

        assert_eq!(reader.header(), StreamHeader { width: 640, height: 480 });
        assert_eq!(reader.count(), 1);
    }
}
