//! Lossless byte compression with an adaptive arithmetic coder and a PPM context model.
//!
//! See [`compression`] for the building blocks and [`compression::ppm`] for the
//! compressor and decompressor drivers.

pub mod compression;
pub mod error;

pub use compression::{ppm_compress, ppm_decompress, Compression, Ppm, PpmConfig};
pub use error::{Error, Result};
