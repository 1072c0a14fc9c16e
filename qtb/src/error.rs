use thiserror::Error;

/// Everything that can go wrong while reading, encoding, or decoding an image.
#[derive(Error, Debug)]
pub enum QtbError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid raster tag {0:?}, expected P2 or P5")]
    InvalidTag(String),

    #[error("malformed PGM data: {0}")]
    InvalidPgm(String),

    #[error("invalid image dimensions {width}×{height}")]
    InvalidDimensions { width: i64, height: i64 },

    #[error("raster dimensions differ: {0:?} vs {1:?}")]
    DimensionMismatch((u32, u32), (u32, u32)),

    #[error("traversal stack capacity of {capacity} regions exceeded")]
    StackCapacityExceeded { capacity: usize },

    #[error("region at ({x}, {y}) with size {size} does not fit in a block record")]
    RecordOverflow { x: u32, y: u32, size: u32 },

    #[error("single pixel region at ({x}, {y}) was rejected by the uniformity test")]
    DegenerateLeaf { x: u32, y: u32 },

    #[error("stream ended inside the header")]
    TruncatedHeader,

    #[error("stream ended {0} bytes into a block record")]
    TruncatedRecord(usize),

    #[error("{unpainted} pixels were not covered by any block")]
    IncompleteCoverage { unpainted: usize },
}

pub type Result<T> = std::result::Result<T, QtbError>;
