//! Prediction by Partial Matching (PPM) compression.
//!
//! PPM predicts each byte from the bytes right before it. For every context (the last
//! `k` bytes, `k` up to the model order) the model keeps a frequency table, and the
//! arithmetic coder codes each byte against the longest context first:
//!
//! 1. If the byte was seen in the current context, it is coded there and we are done.
//! 2. Otherwise an escape is coded in that context and the next shorter one is tried.
//! 3. Past the empty context the byte is coded in the fixed order(-1) table, which
//!    holds every byte value.
//!
//! Once the real byte is known, both sides update every order with it and slide the
//! history forward, so encoder and decoder see identical tables at every step.
//!
//! The output is a bare bit sequence: no header, no length, no parameters. The model
//! order, precision and reserved symbols must be supplied identically on both sides;
//! a mismatch is not detected and produces garbage rather than an error.

use bitvec::order::Msb0;
use bitvec::slice::BitSlice;
use bitvec::vec::BitVec;
use log::{debug, trace};

use super::arithmetic::{
    ArithmeticDecoder, ArithmeticEncoder, DEFAULT_PRECISION, MAX_PRECISION, MIN_PRECISION,
};
use super::context_model::PpmModel;
use super::{Compression, Symbol, EOF_SYMBOL, ESCAPE_SYMBOL};
use crate::error::{Error, Result};

/// Context order used when none is configured.
pub const DEFAULT_MODEL_ORDER: i32 = 2;

/// Parameters shared out-of-band by compressor and decompressor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PpmConfig {
    /// Longest context in bytes; `-1` disables context modelling and codes every
    /// byte against the fixed order(-1) table.
    pub model_order: i32,
    /// Arithmetic coder register width in bits.
    pub precision: u32,
    /// Symbol that signals a descent to the next lower order.
    pub escape_symbol: Symbol,
    /// Symbol that terminates the stream.
    pub eof_symbol: Symbol,
}

impl Default for PpmConfig {
    fn default() -> Self {
        Self {
            model_order: DEFAULT_MODEL_ORDER,
            precision: DEFAULT_PRECISION,
            escape_symbol: ESCAPE_SYMBOL,
            eof_symbol: EOF_SYMBOL,
        }
    }
}

impl PpmConfig {
    /// Set the context order.
    pub fn with_model_order(mut self, model_order: i32) -> Self {
        self.model_order = model_order;
        self
    }

    /// Set the coder precision.
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Set the reserved escape and end-of-stream symbols.
    pub fn with_reserved_symbols(mut self, escape_symbol: Symbol, eof_symbol: Symbol) -> Self {
        self.escape_symbol = escape_symbol;
        self.eof_symbol = eof_symbol;
        self
    }

    /// Check that the parameters describe a usable coder.
    pub fn validate(&self) -> Result<()> {
        if self.model_order < -1 {
            return Err(Error::InvalidConfig(format!(
                "model order {} is below -1",
                self.model_order
            )));
        }
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&self.precision) {
            return Err(Error::InvalidConfig(format!(
                "precision {} outside {MIN_PRECISION}..={MAX_PRECISION}",
                self.precision
            )));
        }
        if self.escape_symbol <= 0xFF || self.eof_symbol <= 0xFF {
            return Err(Error::InvalidConfig(
                "reserved symbols must lie outside the byte range".to_string(),
            ));
        }
        if self.escape_symbol == self.eof_symbol {
            return Err(Error::InvalidConfig(format!(
                "escape and end-of-stream share symbol {}",
                self.eof_symbol
            )));
        }
        Ok(())
    }

    /// The context order as a length, or `None` when context modelling is off.
    pub fn context_order(&self) -> Option<usize> {
        usize::try_from(self.model_order).ok()
    }
}

/// The last `order` bytes of `bytes`: the context that precedes the next byte.
fn context_window(bytes: &[u8], order: usize) -> &[u8] {
    &bytes[bytes.len().saturating_sub(order)..]
}

/// Encoder side: owns one model and one arithmetic encoder for a single call.
#[derive(Debug, Clone)]
pub struct PpmCompressor {
    config: PpmConfig,
    model: PpmModel,
    coder: ArithmeticEncoder,
    bits: BitVec<u8, Msb0>,
}

impl PpmCompressor {
    /// Create a compressor with fresh model state.
    pub fn new(config: PpmConfig) -> Result<Self> {
        config.validate()?;
        Ok(PpmCompressor {
            model: PpmModel::new(
                config.context_order(),
                config.escape_symbol,
                config.eof_symbol,
            ),
            coder: ArithmeticEncoder::new(config.precision)?,
            bits: BitVec::new(),
            config,
        })
    }

    /// Compress `data` followed by the end-of-stream symbol, returning the bit sequence.
    pub fn compress(mut self, data: &[u8]) -> Result<BitVec<u8, Msb0>> {
        debug!(
            "compressing {} bytes (order {}, precision {})",
            data.len(),
            self.config.model_order,
            self.config.precision
        );
        let window = self.config.context_order().unwrap_or(0);
        for (position, &byte) in data.iter().enumerate() {
            let history = context_window(&data[..position], window);
            self.encode(Symbol::from(byte), history)?;
            self.observe(history, byte);
        }
        self.encode(self.config.eof_symbol, context_window(data, window))?;
        self.coder.finish(&mut self.bits);
        debug!(
            "compressed {} bytes into {} bits using {} contexts",
            data.len(),
            self.bits.len(),
            self.model.context_count()
        );
        Ok(self.bits)
    }

    fn encode(&mut self, symbol: Symbol, history: &[u8]) -> Result<()> {
        if let Some(max_order) = self.config.context_order() {
            let start = history.len().min(max_order);
            for order in (0..=start).rev() {
                let table = self.model.context_table(&history[history.len() - order..]);
                if table.contains(symbol) {
                    return self.coder.encode_symbol(symbol, table, &mut self.bits);
                }
                trace!("escape from order {order} for symbol {symbol}");
                self.coder
                    .encode_symbol(self.config.escape_symbol, table, &mut self.bits)?;
            }
        }

        let fallback = self.model.order_minus_one();
        if !fallback.contains(symbol) {
            return Err(Error::UnencodableSymbol(symbol));
        }
        self.coder.encode_symbol(symbol, fallback, &mut self.bits)
    }

    fn observe(&mut self, history: &[u8], byte: u8) {
        if self.config.context_order().is_some() {
            self.model.update(history, Symbol::from(byte));
        }
    }
}

/// Decoder side: mirrors [`PpmCompressor`] step for step.
#[derive(Debug, Clone)]
pub struct PpmDecompressor {
    config: PpmConfig,
    model: PpmModel,
}

impl PpmDecompressor {
    /// Create a decompressor with fresh model state.
    pub fn new(config: PpmConfig) -> Result<Self> {
        config.validate()?;
        Ok(PpmDecompressor {
            model: PpmModel::new(
                config.context_order(),
                config.escape_symbol,
                config.eof_symbol,
            ),
            config,
        })
    }

    /// Decode `bits` until the end-of-stream symbol.
    ///
    /// Missing trailing bits read as zero. A stream that runs more than `precision`
    /// bits past its end without reaching end-of-stream is rejected.
    pub fn decompress(mut self, bits: &BitSlice<u8, Msb0>) -> Result<Vec<u8>> {
        debug!(
            "decompressing {} bits (order {}, precision {})",
            bits.len(),
            self.config.model_order,
            self.config.precision
        );
        let window = self.config.context_order().unwrap_or(0);
        let mut coder = ArithmeticDecoder::new(self.config.precision, bits)?;
        let mut output = Vec::new();
        loop {
            let history = context_window(&output, window);
            let symbol = self.decode(&mut coder, history)?;
            if symbol == self.config.eof_symbol {
                break;
            }
            let byte = u8::try_from(symbol).map_err(|_| Error::UnencodableSymbol(symbol))?;
            self.observe(history, byte);
            output.push(byte);

            let overrun = coder.overrun();
            if overrun > self.config.precision as usize {
                return Err(Error::StreamExhausted { overrun });
            }
        }
        debug!(
            "decompressed {} bytes using {} contexts",
            output.len(),
            self.model.context_count()
        );
        Ok(output)
    }

    fn decode(&mut self, coder: &mut ArithmeticDecoder<'_>, history: &[u8]) -> Result<Symbol> {
        if let Some(max_order) = self.config.context_order() {
            let start = history.len().min(max_order);
            for order in (0..=start).rev() {
                let table = self.model.context_table(&history[history.len() - order..]);
                let symbol = coder.decode_symbol(table)?;
                if symbol != self.config.escape_symbol {
                    return Ok(symbol);
                }
                trace!("escape from order {order}");
            }
        }
        coder.decode_symbol(self.model.order_minus_one())
    }

    fn observe(&mut self, history: &[u8], byte: u8) {
        if self.config.context_order().is_some() {
            self.model.update(history, Symbol::from(byte));
        }
    }
}

/// Compress `data` into a headerless bit sequence.
///
/// # Example
///
/// ```
/// use ppm_coder::compression::{ppm_compress, ppm_decompress, PpmConfig};
///
/// let config = PpmConfig::default().with_model_order(2);
/// let bits = ppm_compress(b"BANANA_BANANERA", &config).unwrap();
/// let decoded = ppm_decompress(&bits, &config).unwrap();
/// assert_eq!(decoded, b"BANANA_BANANERA");
/// ```
pub fn ppm_compress(data: &[u8], config: &PpmConfig) -> Result<BitVec<u8, Msb0>> {
    PpmCompressor::new(config.clone())?.compress(data)
}

/// Decompress a bit sequence produced by [`ppm_compress`] with the same `config`.
pub fn ppm_decompress(bits: &BitSlice<u8, Msb0>, config: &PpmConfig) -> Result<Vec<u8>> {
    PpmDecompressor::new(config.clone())?.decompress(bits)
}

/// Byte-oriented PPM codec.
///
/// The bit sequence is packed MSB-first into bytes with zero padding, which the
/// decoder reads as harmless trailing zeros.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ppm {
    config: PpmConfig,
}

impl Ppm {
    /// Create a codec with the given parameters.
    pub fn new(config: PpmConfig) -> Self {
        Ppm { config }
    }

    /// The parameters this codec compresses with.
    pub fn config(&self) -> &PpmConfig {
        &self.config
    }
}

impl Compression for Ppm {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut bits = ppm_compress(data, &self.config)?;
        bits.set_uninitialized(false);
        Ok(bits.into_vec())
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        ppm_decompress(BitSlice::from_slice(data), &self.config)
    }
}
