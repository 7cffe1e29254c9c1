//! Precision-bounded binary arithmetic coding.
//!
//! The coder keeps an integer interval `[low, high]` inside `[0, 2^P - 1]`. Coding a
//! symbol narrows the interval to that symbol's share of the table's cumulative
//! range, then renormalizes until none of the three rescaling conditions hold:
//!
//! - **E1** `high < half`: the next bit is 0.
//! - **E2** `low >= half`: the next bit is 1; both bounds drop by `half`.
//! - **E3** `quarter <= low && high < 3 * quarter`: the interval straddles the
//!   midpoint; the bit is deferred as *pending* and both bounds drop by `quarter`.
//!
//! Every rescaling doubles the interval. Pending bits are released as the
//! complement of the next E1/E2 bit. The decoder replays the exact same interval
//! arithmetic, shifting input bits into a `P`-bit code register instead of
//! emitting them.
//!
//! Interval products are computed in `u128` so `width * bound` never wraps for any
//! supported precision.

use std::ops::Range;

use bitvec::order::Msb0;
use bitvec::slice::BitSlice;
use bitvec::vec::BitVec;

use super::frequency_table::FrequencyTable;
use super::Symbol;
use crate::error::{Error, Result};

/// Default register width in bits.
pub const DEFAULT_PRECISION: u32 = 32;

/// Smallest supported register width.
pub const MIN_PRECISION: u32 = 16;

/// Largest supported register width; leaves headroom for the shift in `u64`.
pub const MAX_PRECISION: u32 = 62;

/// Which rescaling condition fired during renormalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rescale {
    /// E1: interval entirely in the lower half.
    Lower,
    /// E2: interval entirely in the upper half.
    Upper,
    /// E3: interval straddles the midpoint within the middle half.
    Middle,
}

/// The `[low, high]` interval shared by the encoder and decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Interval {
    precision: u32,
    max: u64,
    half: u64,
    quarter: u64,
    low: u64,
    high: u64,
}

impl Interval {
    fn new(precision: u32) -> Result<Self> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(Error::InvalidConfig(format!(
                "precision {precision} outside {MIN_PRECISION}..={MAX_PRECISION}"
            )));
        }
        let max = (1u64 << precision) - 1;
        let half = 1u64 << (precision - 1);
        Ok(Interval {
            precision,
            max,
            half,
            quarter: half >> 1,
            low: 0,
            high: max,
        })
    }

    fn width(&self) -> u64 {
        self.high - self.low + 1
    }

    /// A table total the interval can still split without collapsing a range.
    fn check_total(&self, total: u64) -> Result<()> {
        if total > self.quarter {
            return Err(Error::FrequencyOverflow {
                total,
                limit: self.quarter,
            });
        }
        Ok(())
    }

    fn narrow(&mut self, range: &Range<u64>, total: u64) -> Result<()> {
        let width = self.width();
        let high = self.low + scale(width, range.end, total)? - 1;
        let low = self.low + scale(width, range.start, total)?;
        debug_assert!(low <= high, "collapsed interval");
        self.low = low;
        self.high = high;
        Ok(())
    }

    /// Apply one rescaling step, returning which condition fired.
    fn rescale(&mut self) -> Option<Rescale> {
        let step = if self.high < self.half {
            Rescale::Lower
        } else if self.low >= self.half {
            self.low -= self.half;
            self.high -= self.half;
            Rescale::Upper
        } else if self.low >= self.quarter && self.high < 3 * self.quarter {
            self.low -= self.quarter;
            self.high -= self.quarter;
            Rescale::Middle
        } else {
            return None;
        };
        self.low <<= 1;
        self.high = (self.high << 1) | 1;
        Some(step)
    }

    fn offset(&self, step: Rescale) -> u64 {
        match step {
            Rescale::Lower => 0,
            Rescale::Upper => self.half,
            Rescale::Middle => self.quarter,
        }
    }
}

/// `floor(width * bound / total)` with a widened, overflow-checked product.
fn scale(width: u64, bound: u64, total: u64) -> Result<u64> {
    let product = u128::from(width)
        .checked_mul(u128::from(bound))
        .ok_or(Error::ArithmeticOverflow)?;
    u64::try_from(product / u128::from(total)).map_err(|_| Error::ArithmeticOverflow)
}

/// Arithmetic encoder emitting bits MSB-first into a `BitVec`.
#[derive(Debug, Clone)]
pub struct ArithmeticEncoder {
    interval: Interval,
    pending: u64,
}

impl ArithmeticEncoder {
    /// Create an encoder with a `precision`-bit interval.
    pub fn new(precision: u32) -> Result<Self> {
        Ok(ArithmeticEncoder {
            interval: Interval::new(precision)?,
            pending: 0,
        })
    }

    /// Register width in bits.
    pub fn precision(&self) -> u32 {
        self.interval.precision
    }

    /// Number of deferred straddle bits not yet written.
    pub fn pending(&self) -> u64 {
        self.pending
    }

    /// Encode `symbol` against `table`, appending any settled bits to `output`.
    ///
    /// `symbol` must have a range in `table`; callers escape to another table first
    /// when it does not.
    pub fn encode_symbol(
        &mut self,
        symbol: Symbol,
        table: &FrequencyTable,
        output: &mut BitVec<u8, Msb0>,
    ) -> Result<()> {
        let range = table
            .range(symbol)
            .ok_or(Error::SymbolNotInTable(symbol))?;
        let total = table.total();
        self.interval.check_total(total)?;
        self.interval.narrow(&range, total)?;

        while let Some(step) = self.interval.rescale() {
            match step {
                Rescale::Lower => self.emit(false, output),
                Rescale::Upper => self.emit(true, output),
                Rescale::Middle => self.pending += 1,
            }
        }
        Ok(())
    }

    /// Flush enough bits to pin the final interval.
    ///
    /// One bit selecting the quarter that `low` sits in, plus the pending bits,
    /// suffices once the last coded event was the end-of-stream symbol.
    pub fn finish(&mut self, output: &mut BitVec<u8, Msb0>) {
        self.pending += 1;
        let bit = self.interval.low >= self.interval.quarter;
        self.emit(bit, output);
    }

    fn emit(&mut self, bit: bool, output: &mut BitVec<u8, Msb0>) {
        output.push(bit);
        for _ in 0..self.pending {
            output.push(!bit);
        }
        self.pending = 0;
    }
}

/// Reads bits MSB-first, yielding 0 once the input runs out.
#[derive(Debug, Clone)]
pub struct BitSource<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    position: usize,
}

impl<'a> BitSource<'a> {
    /// Wrap a bit slice.
    pub fn new(bits: &'a BitSlice<u8, Msb0>) -> Self {
        BitSource { bits, position: 0 }
    }

    /// The next bit, or `false` past the end.
    pub fn next_bit(&mut self) -> bool {
        let bit = self.bits.get(self.position).is_some_and(|bit| *bit);
        self.position += 1;
        bit
    }

    /// Bits consumed so far, including implicit trailing zeros.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Implicit zero bits consumed past the end of the input.
    pub fn overrun(&self) -> usize {
        self.position.saturating_sub(self.bits.len())
    }
}

/// Arithmetic decoder mirroring [`ArithmeticEncoder`] step for step.
#[derive(Debug, Clone)]
pub struct ArithmeticDecoder<'a> {
    interval: Interval,
    code: u64,
    source: BitSource<'a>,
}

impl<'a> ArithmeticDecoder<'a> {
    /// Create a decoder and prime its code register with the first `precision` bits.
    pub fn new(precision: u32, bits: &'a BitSlice<u8, Msb0>) -> Result<Self> {
        let interval = Interval::new(precision)?;
        let mut source = BitSource::new(bits);
        let mut code = 0u64;
        for _ in 0..precision {
            code = (code << 1) | u64::from(source.next_bit());
        }
        Ok(ArithmeticDecoder {
            interval,
            code,
            source,
        })
    }

    /// Register width in bits.
    pub fn precision(&self) -> u32 {
        self.interval.precision
    }

    /// Implicit zero bits consumed past the end of the input.
    pub fn overrun(&self) -> usize {
        self.source.overrun()
    }

    /// Decode one symbol from `table`, consuming input bits as the interval rescales.
    pub fn decode_symbol(&mut self, table: &FrequencyTable) -> Result<Symbol> {
        let total = table.total();
        debug_assert!(total > 0, "decoding against an empty table");
        if total == 0 {
            return Err(Error::EmptyTable);
        }
        self.interval.check_total(total)?;

        let offset = self
            .code
            .checked_sub(self.interval.low)
            .ok_or(Error::Corrupted {
                value: self.code,
                total,
            })?;
        let value = u64::try_from(
            ((u128::from(offset) + 1) * u128::from(total) - 1)
                / u128::from(self.interval.width()),
        )
        .map_err(|_| Error::ArithmeticOverflow)?;

        let (symbol, range) = table
            .symbol_for(value)
            .ok_or(Error::Corrupted { value, total })?;
        self.interval.narrow(&range, total)?;

        while let Some(step) = self.interval.rescale() {
            let shifted = self
                .code
                .checked_sub(self.interval.offset(step))
                .ok_or(Error::Corrupted { value, total })?
                << 1;
            self.code = (shifted | u64::from(self.source.next_bit())) & self.interval.max;
        }
        Ok(symbol)
    }
}
