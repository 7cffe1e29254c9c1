//! Context-modelling compression built on adaptive arithmetic coding.
//!
//! This module provides the pieces of a PPM (Prediction by Partial Matching) compressor:
//! - Frequency tables with cumulative ranges in first-insertion order
//! - A precision-bounded arithmetic encoder and decoder with pending-bit carry handling
//! - A multi-order context model with escape fallback down to order(-1)
//! - Compressor and decompressor drivers that keep both sides in lockstep
//!
//! # Examples
//!
//! ```rust
//! use ppm_coder::compression::{Compression, Ppm, PpmConfig};
//!
//! let codec = Ppm::new(PpmConfig::default().with_model_order(2));
//! let packed = codec.compress(b"BANANA_BANANERA").unwrap();
//! assert_eq!(codec.decompress(&packed).unwrap(), b"BANANA_BANANERA");
//! ```

pub use crate::error::Result;

/// A coding symbol: a raw byte value (0..=255) or one of the reserved control symbols.
pub type Symbol = u16;

/// End-of-stream marker, outside the raw byte range.
pub const EOF_SYMBOL: Symbol = 256;

/// Escape marker: "not seen in this context, descend one order".
pub const ESCAPE_SYMBOL: Symbol = 257;

/// Trait for compression algorithms
pub trait Compression {
    /// Compress the input data
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress the compressed data
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

pub mod arithmetic;
pub mod context_model;
pub mod frequency_table;
pub mod ppm;

pub use arithmetic::{ArithmeticDecoder, ArithmeticEncoder, BitSource};
pub use context_model::PpmModel;
pub use frequency_table::FrequencyTable;
pub use ppm::{ppm_compress, ppm_decompress, Ppm, PpmCompressor, PpmConfig, PpmDecompressor};
