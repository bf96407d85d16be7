//! Stateful decoder driver (C7): replays a frame message into pixel-set
//! callbacks without ever materializing an intermediate frame buffer.
//!
//! Callers that do want a full [`crate::Frame`] can fold `on_pixel` calls
//! into one; the driver itself stays allocation-free.

use crate::line::decode_column;
use crate::opcode::{is_line_id, DELTA_FRAME_MARKER, FULL_FRAME_MARKER, LINE_ID_BASE};
use crate::DecodeError;

/// Which of the two message framings was decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Every column present; safe to use as a new baseline.
    Full,
    /// Only changed columns present; must be applied on top of a baseline.
    Delta,
}

/// Decodes frame messages. Holds no per-message state, so one instance can
/// be reused (or shared) across an entire connection's lifetime.
#[derive(Debug, Default)]
pub struct Decoder {
    _private: (),
}

impl Decoder {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Decodes `message`, invoking `on_pixel(column, row, pixel)` for every
    /// pixel the message actually writes.
    ///
    /// For a [`MessageKind::Delta`] message, columns the sender considered
    /// unchanged are simply absent from the callback stream; the caller is
    /// expected to already hold a baseline frame to leave those columns as-is.
    pub fn decode(&self, message: &[u8], mut on_pixel: impl FnMut(usize, usize, u8)) -> Result<MessageKind, DecodeError> {
        let (&marker, rest) = message.split_first().ok_or(DecodeError::EmptyMessage)?;

        let kind = match marker {
            FULL_FRAME_MARKER => MessageKind::Full,
            DELTA_FRAME_MARKER => MessageKind::Delta,
            other => return Err(DecodeError::UnknownMarker { marker: other }),
        };

        let mut pos = 0usize;
        let mut last_column: Option<usize> = None;
        let mut seen = 0usize;

        while pos < rest.len() {
            let line_id = rest[pos];
            if !is_line_id(line_id) {
                return Err(DecodeError::ExpectedLineId { offset: pos, found: line_id });
            }
            let column = usize::from(line_id - LINE_ID_BASE);
            if column >= crate::opcode::COLUMN_COUNT {
                return Err(DecodeError::LineIdOutOfRange { column });
            }
            if let Some(previous) = last_column {
                if column <= previous {
                    return Err(DecodeError::OutOfOrderColumn { column });
                }
            }
            last_column = Some(column);
            seen += 1;
            pos += 1;

            let mode = *rest.get(pos).ok_or(DecodeError::UnexpectedEnd { column })?;
            pos += 1;

            let consumed = decode_column(mode, &rest[pos..], column, |row, pixel| on_pixel(column, row, pixel))?;
            pos += consumed;
        }

        if kind == MessageKind::Full && seen != crate::opcode::COLUMN_COUNT {
            return Err(DecodeError::TruncatedFrame {
                declared: crate::opcode::COLUMN_COUNT,
                actual: seen,
            });
        }

        Ok(kind)
    }
}
