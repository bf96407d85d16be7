use thiserror::Error;

/// Everything that can go wrong while decoding a frame message.
///
/// Every variant carries enough context (column index, offending byte) to
/// log a useful diagnostic without re-scanning the message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty message")]
    EmptyMessage,

    #[error("unknown message marker 0x{marker:02X}")]
    UnknownMarker { marker: u8 },

    #[error("expected line identifier at offset {offset}, found 0x{found:02X}")]
    ExpectedLineId { offset: usize, found: u8 },

    #[error("line identifier for column {column} out of range")]
    LineIdOutOfRange { column: usize },

    #[error("column {column} arrived out of order")]
    OutOfOrderColumn { column: usize },

    #[error("unknown mode byte 0x{mode:02X} for column {column}")]
    UnknownMode { column: usize, mode: u8 },

    #[error("unknown opcode 0x{opcode:02X} in column {column}")]
    UnknownOpcode { column: usize, opcode: u8 },

    #[error("unexpected end of message while decoding column {column}")]
    UnexpectedEnd { column: usize },

    #[error("column {column} wrote past row {row}")]
    RowOverflow { column: usize, row: usize },

    #[error("column {column} only filled {row} of the expected rows")]
    IncompleteColumn { column: usize, row: usize },

    #[error("message declared {declared} columns but only {actual} were present")]
    TruncatedFrame { declared: usize, actual: usize },
}
