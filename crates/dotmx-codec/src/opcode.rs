//! Opcode constants for the line codec.
//!
//! The opcode space is deliberately overloaded: the same byte range serves
//! as literal pixel values, line-boundary markers, and run-length prefixes.
//! See the module-level docs on [`crate::line`] for how the ranges are kept
//! disjoint.

/// Width of the framebuffer, in columns. Each column is one encoded line.
pub const COLUMN_COUNT: usize = 160;

/// Height of the framebuffer, in rows. Each column carries exactly this many pixels.
pub const ROW_COUNT: usize = 144;

/// Leading byte of a full-frame message.
pub const FULL_FRAME_MARKER: u8 = 0xFA;

/// Leading byte of a delta-frame message.
pub const DELTA_FRAME_MARKER: u8 = 0xFB;

/// First line-identifier byte (column 0).
pub const LINE_ID_BASE: u8 = 0x04;

/// Last line-identifier byte (column 159).
pub const LINE_ID_MAX: u8 = LINE_ID_BASE + (COLUMN_COUNT as u8 - 1);

/// Sentinel meaning "unchanged from the previous frame" (delta lines) or
/// "unchanged at this row" (run opcodes). Never a valid pixel value.
pub const UNCHANGED: u8 = 0xFF;

/// Mode byte: the rest of the line is exactly [`ROW_COUNT`] literal bytes.
pub const MODE_UNCOMPRESSED: u8 = 0xF0;

/// Mode byte: the rest of the line is a run-length-compressed opcode stream.
pub const MODE_COMPRESSED: u8 = 0xF1;

/// Long-run opcode: next byte is a count, then a literal pixel.
pub const OP_LONG_RUN: u8 = 0xF2;

/// Run-to-end-of-column opcode: the following literal is written through row 143.
pub const OP_RUN_TO_END: u8 = 0xFD;

/// "Ignore this column" marker. The real encoder never emits it (see the
/// open question in the codec's design notes); the decoder still honors it
/// defensively since the wire format reserves it.
pub const OP_SKIP_COLUMN: u8 = 0xFE;

/// Base of the short-run opcode range. `SHORT_RUN_BASE + (length - 1)`
/// encodes a run of `length` identical pixels, `length` in `2..=16`;
/// `SHORT_RUN_BASE` itself (`length == 1`) is never emitted since a run of
/// one pixel isn't a run.
pub const SHORT_RUN_BASE: u8 = 0xD0;

/// Last short-run opcode, encoding a run length of 16.
pub const SHORT_RUN_MAX: u8 = 0xDF;

/// Largest repeat count representable by a short-run opcode.
pub const SHORT_RUN_MAX_COUNT: u8 = SHORT_RUN_MAX - SHORT_RUN_BASE;

/// Highest byte value that can ever be a literal pixel.
pub const MAX_PIXEL_VALUE: u8 = 0x03;

#[inline]
pub(crate) fn is_line_id(byte: u8) -> bool {
    (LINE_ID_BASE..=LINE_ID_MAX).contains(&byte)
}
