use crate::opcode::{COLUMN_COUNT, ROW_COUNT};

/// A 2-bit pixel value in `{0x00, 0x01, 0x02, 0x03}`.
///
/// The server treats this opaquely; the client side indexes it into a
/// four-entry palette. Represented as a plain byte rather than a checked
/// newtype because every producer in this crate (the cluster scanner, the
/// decoder) already guarantees the range invariant at construction time.
pub type Pixel = u8;

/// A full 160x144 framebuffer snapshot.
///
/// Indexing convention matches the wire format: the first index is the
/// column (the "line number" on the wire, `0..COLUMN_COUNT`), the second is
/// the row within that column (`0..ROW_COUNT`).
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    columns: Box<[[Pixel; ROW_COUNT]; COLUMN_COUNT]>,
}

impl Frame {
    /// A frame with every pixel set to `0x00`.
    pub fn blank() -> Self {
        Self {
            columns: Box::new([[0u8; ROW_COUNT]; COLUMN_COUNT]),
        }
    }

    /// Builds a frame from a column-major pixel matrix.
    pub fn from_columns(columns: [[Pixel; ROW_COUNT]; COLUMN_COUNT]) -> Self {
        Self {
            columns: Box::new(columns),
        }
    }

    #[inline]
    #[must_use]
    pub fn get(&self, column: usize, row: usize) -> Pixel {
        self.columns[column][row]
    }

    #[inline]
    pub fn set(&mut self, column: usize, row: usize, value: Pixel) {
        self.columns[column][row] = value;
    }

    #[inline]
    #[must_use]
    pub fn column(&self, column: usize) -> &[Pixel; ROW_COUNT] {
        &self.columns[column]
    }

    pub fn columns(&self) -> impl Iterator<Item = &[Pixel; ROW_COUNT]> {
        self.columns.iter()
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::blank()
    }
}

impl core::fmt::Debug for Frame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Frame").field("columns", &COLUMN_COUNT).finish()
    }
}
