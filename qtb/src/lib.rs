//! QTB (**Q**uad**T**ree **B**locks) is a compressed format for greyscale
//! images. The image is split into ever smaller squares until each square is a
//! single flat color, and only those squares are stored.
//!
//! Compression is lossless by default. A tolerance can be given to treat
//! nearly flat squares as flat, which gives smaller files at the cost of
//! accuracy.
//!
//! Each stored square takes seven bytes, so QTB works well for images with
//! large flat areas such as diagrams, logos, and test patterns, and badly for
//! photographs.
//!
//! # Example
//! ## Encoding an image
//! ```no_run
//! use qtb::{EncodeOptions, Raster};
//!
//! // A 4×4 image whose top half is dark and bottom half is light.
//! let image = Raster::from_fn(4, 4, |_, y| if y < 2 { 10 } else { 200 })?;
//!
//! let stats = qtb::save(&image, "bands.qtb", EncodeOptions::lossless())?;
//! assert_eq!(stats.leaves, 4);
//! # Ok::<(), qtb::QtbError>(())
//! ```
//!
//! ## Decoding an image
//! ```no_run
//! use qtb::DecodeOptions;
//!
//! let image = qtb::open("bands.qtb", DecodeOptions::default())?;
//! qtb::pgm::save(&image, "bands.pgm")?;
//! # Ok::<(), qtb::QtbError>(())
//! ```

mod error;
mod raster;
mod stack;

pub mod batch;
pub mod block;
pub mod decoder;
pub mod encoder;
pub mod metrics;
pub mod pgm;
pub mod region;
pub mod uniformity;

// ----------------------- //
// INLINED USEFUL FEATURES //
// ----------------------- //
#[doc(inline)]
pub use error::{QtbError, Result};

#[doc(inline)]
pub use raster::{Raster, MAX_DIMENSION};

#[doc(inline)]
pub use stack::{worst_case_depth, TraversalStack};

#[doc(inline)]
pub use encoder::{encode, save, EncodeOptions, EncodeStats};

#[doc(inline)]
pub use decoder::{decode, open, DecodeOptions};
