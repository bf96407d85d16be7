use std::sync::Arc;

use dotmx_codec::Frame;
use parking_lot::RwLock;

/// Capability handed to the emulator so it can publish frames without
/// holding a reference back into the dispatch loop.
///
/// This is the "frame sink" half of the cyclic emulator/server reference:
/// the emulator only ever sees this narrow write surface, never the
/// dispatcher or the subscriber registry.
pub trait FrameSink: Send + Sync {
    /// Replaces the entire live frame, e.g. after a full draw pass.
    fn publish(&self, frame: Frame);

    /// Writes a single pixel, for emulators that draw incrementally.
    fn set_pixel(&self, column: usize, row: usize, value: u8);
}

/// The live 160x144 matrix, guarded by a reader/writer lock.
///
/// Readers (the dispatch loop) take a shared lock just long enough to copy
/// the matrix into an owned snapshot; the lock is never held across
/// encoding or fan-out. The emulator takes the exclusive lock during its
/// own drawing phase via the [`FrameSink`] impl below.
#[derive(Clone)]
pub struct FrameSource {
    frame: Arc<RwLock<Frame>>,
}

impl FrameSource {
    pub fn new(initial: Frame) -> Self {
        Self {
            frame: Arc::new(RwLock::new(initial)),
        }
    }

    /// Copies the current matrix out under a shared lock.
    pub fn snapshot(&self) -> Frame {
        self.frame.read().clone()
    }
}

impl Default for FrameSource {
    fn default() -> Self {
        Self::new(Frame::blank())
    }
}

impl FrameSink for FrameSource {
    fn publish(&self, frame: Frame) {
        *self.frame.write() = frame;
    }

    fn set_pixel(&self, column: usize, row: usize, value: u8) {
        self.frame.write().set(column, row, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_independent_of_later_writes() {
        let source = FrameSource::default();
        let before = source.snapshot();
        source.set_pixel(0, 0, 0x02);
        assert_eq!(before.get(0, 0), 0x00);
        assert_eq!(source.snapshot().get(0, 0), 0x02);
    }
}
