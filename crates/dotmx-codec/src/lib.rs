//! Line-oriented run-length codec for a 160x144, four-color framebuffer.
//!
//! This crate implements the wire format described for the "dot-matrix"
//! pixel stream: a byte-oriented run-length encoding for single scanlines
//! (`line`), full- and delta-frame framings built on top of it (`frame`),
//! and a stateful decoder driver (`decoder`) that replays a frame message
//! into pixel-set callbacks. It has no networking or async dependency; the
//! streaming pipeline that drives it lives in `dotmx-server`.

mod decoder;
mod error;
mod frame;
mod line;
mod opcode;
mod pixel;

pub use decoder::{Decoder, MessageKind};
pub use error::DecodeError;
pub use frame::FrameAssembler;
pub use opcode::{
    COLUMN_COUNT, DELTA_FRAME_MARKER, FULL_FRAME_MARKER, LINE_ID_BASE, LINE_ID_MAX, ROW_COUNT, UNCHANGED,
};
pub use pixel::{Frame, Pixel};
