//! Error types for PPM compression and arithmetic coding.

use thiserror::Error;

use crate::compression::Symbol;

/// Error variants for compression and decompression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The decoder produced a target value that no cumulative range covers.
    #[error("stream corrupted: value {value} matches no range in a table of total {total}")]
    Corrupted {
        /// The scaled target computed from the code register.
        value: u64,
        /// Total frequency of the table being decoded against.
        total: u64,
    },

    /// A table with no symbols reached the coder. Every model table is seeded at
    /// creation, so this is a defect in the caller rather than a stream problem.
    #[error("frequency table is empty")]
    EmptyTable,

    /// The coder was asked to encode a symbol the selected table does not contain.
    #[error("symbol {0} is not present in the selected frequency table")]
    SymbolNotInTable(Symbol),

    /// Escape descent ran past order(-1) for a symbol outside the alphabet.
    #[error("symbol {0} cannot be encoded at any model order")]
    UnencodableSymbol(Symbol),

    /// A table's total frequency is too large for the configured precision.
    #[error("frequency total {total} exceeds the coder limit {limit}")]
    FrequencyOverflow {
        /// Total frequency of the offending table.
        total: u64,
        /// Largest total the coder can resolve.
        limit: u64,
    },

    /// The widened interval product did not fit.
    #[error("arithmetic overflow while narrowing the coding interval")]
    ArithmeticOverflow,

    /// The decoder ran past the end of the input without meeting EOF.
    #[error("bit stream exhausted: {overrun} bits read past the end without end-of-stream")]
    StreamExhausted {
        /// Number of implicit zero bits consumed past the end.
        overrun: usize,
    },

    /// The coder or model configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A specialized Result type for compression operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::Corrupted {
            value: 12,
            total: 10,
        };
        assert_eq!(
            err.to_string(),
            "stream corrupted: value 12 matches no range in a table of total 10"
        );
        assert_eq!(
            Error::SymbolNotInTable(42).to_string(),
            "symbol 42 is not present in the selected frequency table"
        );
        assert!(Error::InvalidConfig("precision 4".to_string())
            .to_string()
            .contains("precision 4"));
    }
}
