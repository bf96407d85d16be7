//! Single-column encode/decode: the core run-length codec (C1).
//!
//! A column is always exactly [`ROW_COUNT`] bytes. The encoder scans it once
//! for maximal runs of length >= 2, then either emits the column verbatim
//! (mode [`MODE_UNCOMPRESSED`]) or rewrites it in place around run opcodes
//! (mode [`MODE_COMPRESSED`]). Opcode selection mirrors the three run
//! encodings the format provides: a short run for lengths 2..=16, a long run
//! for anything longer, and a dedicated "to end of column" run for runs that
//! reach row 143 (the overwhelmingly common case for delta lines, since an
//! untouched tail of a column decays to one big run of [`UNCHANGED`]).

use crate::opcode::{
    is_line_id, MAX_PIXEL_VALUE, MODE_COMPRESSED, MODE_UNCOMPRESSED, OP_LONG_RUN, OP_RUN_TO_END, OP_SKIP_COLUMN,
    ROW_COUNT, SHORT_RUN_BASE, SHORT_RUN_MAX, SHORT_RUN_MAX_COUNT, UNCHANGED,
};
use crate::DecodeError;

/// A maximal run of length >= 2 found within one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RunCluster {
    pixel: u8,
    start: u8,
    /// True run length, 2..=144.
    length: u8,
}

/// Scans a column for maximal runs of length >= 2.
///
/// Ported from the reference encoder: a single left-to-right pass tracking
/// the current run's start and length, flushing a cluster when the run
/// breaks (or the column ends).
fn find_clusters(column: &[u8; ROW_COUNT]) -> Vec<RunCluster> {
    let mut clusters = Vec::new();
    let mut last_pixel = column[0];
    // `count` mirrors the reference implementation's repetition counter:
    // it equals `length - 1` once a run is open.
    let mut count: u8 = 0;
    let mut start: u8 = 0;

    for index in 1..ROW_COUNT {
        let pixel = column[index];
        if count > 0 {
            if pixel == last_pixel {
                count += 1;
            } else {
                clusters.push(RunCluster {
                    pixel: last_pixel,
                    start,
                    length: count + 1,
                });
                count = 0;
                last_pixel = pixel;
            }
        } else if pixel == last_pixel {
            start = (index - 1) as u8;
            count = 1;
        } else {
            last_pixel = pixel;
        }
    }

    if count > 0 {
        clusters.push(RunCluster {
            pixel: last_pixel,
            start,
            length: count + 1,
        });
    }

    clusters
}

/// Encodes one column (either raw pixels or an already-built delta line)
/// into its wire form, including the leading mode byte.
pub(crate) fn encode_column(column: &[u8; ROW_COUNT]) -> Vec<u8> {
    let clusters = find_clusters(column);

    if clusters.is_empty() {
        let mut out = Vec::with_capacity(1 + ROW_COUNT);
        out.push(MODE_UNCOMPRESSED);
        out.extend_from_slice(column);
        return out;
    }

    let mut work = *column;
    let mut keep = [true; ROW_COUNT];

    for cluster in &clusters {
        let start = usize::from(cluster.start);
        let count = cluster.length - 1;
        let last_index = start + usize::from(count);
        debug_assert!(last_index < ROW_COUNT, "cluster must fit within one column");

        let mut i = start;
        if last_index >= ROW_COUNT - 1 {
            work[i] = OP_RUN_TO_END;
            i += 2;
        } else if count < SHORT_RUN_MAX_COUNT + 1 {
            work[i] = SHORT_RUN_BASE + count;
            i += 2;
        } else {
            work[i] = OP_LONG_RUN;
            work[i + 1] = count;
            i += 3;
        }

        for slot in keep.iter_mut().take(last_index + 1).skip(i) {
            *slot = false;
        }
    }

    let mut out = Vec::with_capacity(ROW_COUNT / 2);
    out.push(MODE_COMPRESSED);
    for (index, &byte) in work.iter().enumerate() {
        if keep[index] {
            out.push(byte);
        }
    }
    out
}

/// Decodes one column's opcode stream (the bytes after the mode byte, up to
/// but not including the next line identifier or end-of-message) by
/// invoking `on_pixel` for every written position.
///
/// Returns the number of bytes consumed from `data`.
pub(crate) fn decode_column(
    mode: u8,
    data: &[u8],
    column: usize,
    mut on_pixel: impl FnMut(usize, u8),
) -> Result<usize, DecodeError> {
    match mode {
        MODE_UNCOMPRESSED => decode_uncompressed(data, column, &mut on_pixel),
        MODE_COMPRESSED => decode_compressed(data, column, &mut on_pixel),
        OP_SKIP_COLUMN => Ok(0),
        other => Err(DecodeError::UnknownMode { column, mode: other }),
    }
}

fn decode_uncompressed(data: &[u8], column: usize, on_pixel: &mut impl FnMut(usize, u8)) -> Result<usize, DecodeError> {
    if data.len() < ROW_COUNT {
        return Err(DecodeError::UnexpectedEnd { column });
    }
    for (row, &byte) in data[..ROW_COUNT].iter().enumerate() {
        if byte != UNCHANGED {
            on_pixel(row, byte);
        }
    }
    Ok(ROW_COUNT)
}

fn decode_compressed(data: &[u8], column: usize, on_pixel: &mut impl FnMut(usize, u8)) -> Result<usize, DecodeError> {
    let mut pos = 0usize;
    let mut row = 0usize;

    while pos < data.len() {
        let byte = data[pos];
        if is_line_id(byte) {
            break;
        }
        pos += 1;

        match byte {
            0x00..=MAX_PIXEL_VALUE => {
                check_row(column, row)?;
                on_pixel(row, byte);
                row += 1;
            }
            UNCHANGED => {
                check_row(column, row)?;
                row += 1;
            }
            OP_LONG_RUN => {
                let count = *data.get(pos).ok_or(DecodeError::UnexpectedEnd { column })?;
                pos += 1;
                let pixel = *data.get(pos).ok_or(DecodeError::UnexpectedEnd { column })?;
                pos += 1;
                row = expand_run(row, usize::from(count) + 1, pixel, column, on_pixel)?;
            }
            OP_RUN_TO_END => {
                let pixel = *data.get(pos).ok_or(DecodeError::UnexpectedEnd { column })?;
                pos += 1;
                check_row(column, row)?;
                row = expand_run(row, ROW_COUNT - row, pixel, column, on_pixel)?;
            }
            SHORT_RUN_BASE..=SHORT_RUN_MAX => {
                let pixel = *data.get(pos).ok_or(DecodeError::UnexpectedEnd { column })?;
                pos += 1;
                let count = usize::from(byte - SHORT_RUN_BASE) + 1;
                row = expand_run(row, count, pixel, column, on_pixel)?;
            }
            other => return Err(DecodeError::UnknownOpcode { column, opcode: other }),
        }
    }

    if row != ROW_COUNT {
        return Err(DecodeError::IncompleteColumn { column, row });
    }

    Ok(pos)
}

fn expand_run(
    row: usize,
    count: usize,
    pixel: u8,
    column: usize,
    on_pixel: &mut impl FnMut(usize, u8),
) -> Result<usize, DecodeError> {
    let end = row + count;
    if end > ROW_COUNT {
        return Err(DecodeError::RowOverflow { column, row: end });
    }
    if pixel != UNCHANGED {
        for r in row..end {
            on_pixel(r, pixel);
        }
    }
    Ok(end)
}

#[inline]
fn check_row(column: usize, row: usize) -> Result<(), DecodeError> {
    if row >= ROW_COUNT {
        Err(DecodeError::RowOverflow { column, row })
    } else {
        Ok(())
    }
}
