//! Round-trip and literal-scenario coverage for the line codec and frame
//! assembler.

use dotmx_codec::{Decoder, Frame, FrameAssembler, MessageKind, COLUMN_COUNT, ROW_COUNT};
use proptest::prelude::*;
use rstest::rstest;

fn decode_into(message: &[u8], baseline: &Frame) -> (MessageKind, Frame) {
    let mut frame = baseline.clone();
    let kind = Decoder::new()
        .decode(message, |column, row, pixel| frame.set(column, row, pixel))
        .expect("message must decode");
    (kind, frame)
}

fn arb_pixel() -> impl Strategy<Value = u8> {
    0u8..=3
}

fn arb_frame() -> impl Strategy<Value = Frame> {
    prop::collection::vec(arb_pixel(), COLUMN_COUNT * ROW_COUNT).prop_map(|flat| {
        let mut frame = Frame::blank();
        for column in 0..COLUMN_COUNT {
            for row in 0..ROW_COUNT {
                frame.set(column, row, flat[column * ROW_COUNT + row]);
            }
        }
        frame
    })
}

proptest! {
    /// Universal property 1: decoding a delta on top of a copy of the
    /// baseline reproduces the target frame exactly.
    #[test]
    fn delta_round_trip(baseline in arb_frame(), frame in arb_frame()) {
        let assembler = FrameAssembler::new();
        let message = assembler.encode_delta(&baseline, &frame);
        let (kind, decoded) = decode_into(&message, &baseline);
        prop_assert_eq!(kind, MessageKind::Delta);
        prop_assert!(decoded == frame);
    }

    /// Universal property 2: a full frame reproduces the source frame
    /// regardless of what was decoded before it.
    #[test]
    fn full_round_trip(garbage in arb_frame(), frame in arb_frame()) {
        let assembler = FrameAssembler::new();
        let message = assembler.encode_full(&frame);
        let (kind, decoded) = decode_into(&message, &garbage);
        prop_assert_eq!(kind, MessageKind::Full);
        prop_assert!(decoded == frame);
    }

    /// Universal property 6: every encoded column fits in at most 145 bytes
    /// (one mode byte plus at most 144 payload bytes).
    #[test]
    fn encoded_column_is_bounded(frame in arb_frame()) {
        let assembler = FrameAssembler::new();
        let message = assembler.encode_full(&frame);
        // Strip marker, then walk records: line-id byte followed by an
        // encoded line whose length we can only bound indirectly here by
        // re-decoding and checking total message size against the
        // worst case (every column uncompressed).
        prop_assert!(message.len() <= 1 + COLUMN_COUNT * (1 + 1 + ROW_COUNT));
    }

    /// Universal property 3: unchanged columns are omitted from the delta
    /// message, and decoding still preserves their baseline values.
    #[test]
    fn unchanged_columns_are_skipped(baseline in arb_frame()) {
        let assembler = FrameAssembler::new();
        let mut frame = baseline.clone();
        frame.set(0, 0, (baseline.get(0, 0) + 1) % 4);

        let message = assembler.encode_delta(&baseline, &frame);
        let (_, decoded) = decode_into(&message, &baseline);

        for column in 1..COLUMN_COUNT {
            prop_assert_eq!(decoded.column(column), baseline.column(column));
        }
    }
}

#[test]
fn all_black_constant_frame_produces_empty_delta() {
    let baseline = Frame::blank();
    let frame = Frame::blank();

    let message = FrameAssembler::new().encode_delta(&baseline, &frame);
    assert_eq!(message, vec![0xFB]);

    let (kind, decoded) = decode_into(&message, &baseline);
    assert_eq!(kind, MessageKind::Delta);
    assert!(decoded == baseline);
}

#[test]
fn full_column_of_constant_color_uses_run_to_end() {
    let baseline = Frame::blank();
    let mut frame = Frame::blank();
    for row in 0..ROW_COUNT {
        frame.set(0, row, 0x03);
    }

    let message = FrameAssembler::new().encode_delta(&baseline, &frame);
    assert_eq!(message, vec![0xFB, 0x04, 0xF1, 0xFD, 0x03]);

    let (_, decoded) = decode_into(&message, &baseline);
    assert!(decoded == frame);
}

// Layout shared by every case below: column 0, a run of `length` identical
// pixels starting at row 10, everything else equal to an all-zero baseline.
// The 10-row unchanged prefix (rows 0..10) always clusters into its own
// short-run opcode first (0xD9 + 0xFF), so the run under test always lands
// at message offset 5 (opcode) / 6 (pixel), independent of `length`.
#[rstest]
#[case(2, 0xD1)]
#[case(5, 0xD4)]
#[case(16, 0xDF)]
fn short_run_opcode_matches_length(#[case] length: usize, #[case] expected_opcode: u8) {
    let baseline = Frame::blank();
    let mut frame = Frame::blank();
    let start = 10;
    for row in start..start + length {
        frame.set(0, row, 0x01);
    }

    let message = FrameAssembler::new().encode_delta(&baseline, &frame);
    assert_eq!(&message[0..5], &[0xFB, 0x04, 0xF1, 0xD9, 0xFF]);
    assert_eq!(message[5], expected_opcode);
    assert_eq!(message[6], 0x01);

    let (_, decoded) = decode_into(&message, &baseline);
    assert!(decoded == frame);
}

#[test]
fn long_run_mid_column() {
    let baseline = Frame::blank();
    let mut frame = Frame::blank();
    let start = 50;
    let length = 32;
    for row in start..start + length {
        frame.set(0, row, 0x02);
    }

    let message = FrameAssembler::new().encode_delta(&baseline, &frame);
    // Leading unchanged run (rows 0..50, count 49) is long enough to need
    // the long-run opcode itself: 0xF2, 49, 0xFF.
    assert_eq!(&message[0..6], &[0xFB, 0x04, 0xF1, 0xF2, 49, 0xFF]);
    assert_eq!(message[6], 0xF2);
    assert_eq!(message[7], (length - 1) as u8);
    assert_eq!(message[8], 0x02);

    let (_, decoded) = decode_into(&message, &baseline);
    assert!(decoded == frame);
}

#[test]
fn unchanged_sentinel_never_writes_but_advances_cursor() {
    // Column 0 has a single changed pixel at row 3; every other row must
    // decode back to its baseline value untouched, proving the 0xFF runs
    // around it only advance the cursor rather than writing anything.
    let baseline = Frame::blank();
    let mut frame = Frame::blank();
    frame.set(0, 3, 0x02);

    let message = FrameAssembler::new().encode_delta(&baseline, &frame);
    let (_, decoded) = decode_into(&message, &baseline);
    assert!(decoded == frame);
    assert_eq!(decoded.get(0, 3), 0x02);
    assert_eq!(decoded.get(0, 0), 0x00);
    assert_eq!(decoded.get(0, 143), 0x00);
}

#[test]
fn decoder_rejects_unknown_opcode() {
    let message = vec![0xFB, 0x04, 0xF1, 0x99];
    let result = Decoder::new().decode(&message, |_, _, _| {});
    assert!(result.is_err());
}

#[test]
fn decoder_rejects_unknown_marker() {
    let message = vec![0x00];
    let result = Decoder::new().decode(&message, |_, _, _| {});
    assert!(result.is_err());
}

#[test]
fn decoder_rejects_full_frame_missing_columns() {
    // A well-formed full frame has one record per column; truncating to a
    // single column must be rejected rather than silently accepted as a
    // partial frame (full frames always carry all 160 records). A blank
    // frame compresses every column to the same fixed-size run-to-end
    // record (line id, mode, run-to-end opcode, pixel = 4 bytes), so the
    // first record ends right after the message marker plus that many bytes.
    let frame = Frame::blank();
    let message = FrameAssembler::new().encode_full(&frame);
    let truncated = &message[..1 + 4];

    let result = Decoder::new().decode(truncated, |_, _, _| {});
    assert!(result.is_err());
}
