//! Frame assembly (C2): turns whole-frame and baseline/current frame pairs
//! into wire messages built on top of the line codec.

use crate::line::encode_column;
use crate::opcode::{COLUMN_COUNT, DELTA_FRAME_MARKER, FULL_FRAME_MARKER, LINE_ID_BASE, ROW_COUNT, UNCHANGED};
use crate::pixel::Frame;

/// Builds full- and delta-frame messages from [`Frame`] snapshots.
///
/// Stateless: every method takes the frame(s) it needs as arguments rather
/// than holding them, since ownership of the "current" and "previous"
/// snapshots belongs to the frame source, not the assembler.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    _private: (),
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Encodes every column of `frame`, suitable for use as a new baseline
    /// on the receiving end.
    pub fn encode_full(&self, frame: &Frame) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + COLUMN_COUNT * (ROW_COUNT / 4));
        out.push(FULL_FRAME_MARKER);
        for column in 0..COLUMN_COUNT {
            out.push(LINE_ID_BASE + column as u8);
            out.extend(encode_column(frame.column(column)));
        }
        out
    }

    /// Encodes only the columns that differ between `previous` and
    /// `current`. Columns with no changed rows are omitted entirely; a
    /// column with at least one changed row is re-encoded with its
    /// unchanged rows replaced by [`UNCHANGED`] so the run codec can still
    /// compress the untouched stretches.
    pub fn encode_delta(&self, previous: &Frame, current: &Frame) -> Vec<u8> {
        let mut out = Vec::with_capacity(COLUMN_COUNT);
        out.push(DELTA_FRAME_MARKER);

        for column in 0..COLUMN_COUNT {
            let before = previous.column(column);
            let after = current.column(column);
            if before == after {
                continue;
            }

            let mut delta_line = [UNCHANGED; ROW_COUNT];
            for row in 0..ROW_COUNT {
                if before[row] != after[row] {
                    delta_line[row] = after[row];
                }
            }

            out.push(LINE_ID_BASE + column as u8);
            out.extend(encode_column(&delta_line));
        }

        out
    }

    /// True if `current` has any pixel that differs from `previous`.
    pub fn has_changes(&self, previous: &Frame, current: &Frame) -> bool {
        (0..COLUMN_COUNT).any(|column| previous.column(column) != current.column(column))
    }
}
