use super::*;

const PAYLOAD: &str = r#"[{"bus":0,"device":0,"function":0,"vendorID":"8086","deviceID":"1237"},{"bus":0,"device":1,"function":0,"vendorID":"10DE","deviceID":"1180"}]"#;

fn decoded(outcome: FrameOutcome) -> Vec<DeviceRecord> {
    match outcome {
        FrameOutcome::Decoded(records) => records,
        other => panic!("expected a decoded frame, got {other:?}"),
    }
}

#[test]
fn whole_payload_in_one_chunk_decodes_immediately() {
    let mut frames = FrameAssembler::new();
    let records = decoded(frames.push(PAYLOAD.as_bytes()));
    assert_eq!(records.len(), 2);
    assert_eq!(frames.buffered_len(), 0);
}

#[test]
fn payload_split_across_chunks_waits_for_terminator() {
    let mut frames = FrameAssembler::new();
    let (head, tail) = PAYLOAD.split_at(40);

    assert!(matches!(frames.push(head.as_bytes()), FrameOutcome::Incomplete));
    assert_eq!(frames.buffered_len(), head.len());

    let records = decoded(frames.push(tail.as_bytes()));
    assert_eq!(records[1].vendor_id(), 0x10DE);
}

#[test]
fn byte_at_a_time_delivery_decodes_once_at_the_end() {
    let mut frames = FrameAssembler::new();
    let bytes = PAYLOAD.as_bytes();
    for &b in &bytes[..bytes.len() - 1] {
        assert!(matches!(frames.push(&[b]), FrameOutcome::Incomplete));
    }
    assert_eq!(decoded(frames.push(&bytes[bytes.len() - 1..])).len(), 2);
}

#[test]
fn bytes_after_terminator_are_kept_for_the_next_frame() {
    let mut frames = FrameAssembler::new();
    let chunk = format!("{PAYLOAD}[{{\"bus\":9");

    assert_eq!(decoded(frames.push(chunk.as_bytes())).len(), 2);
    assert_eq!(frames.buffered_len(), "[{\"bus\":9".len());

    let rest = r#","device":0,"function":0,"vendorID":"1022","deviceID":"1456"}]"#;
    let records = decoded(frames.push(rest.as_bytes()));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].bus(), 9);
}

#[test]
fn two_frames_in_one_chunk_are_treated_as_one_message() {
    let mut frames = FrameAssembler::new();
    let chunk = format!("{PAYLOAD}{PAYLOAD}");
    assert!(matches!(frames.push(chunk.as_bytes()), FrameOutcome::Discarded(_)));
    assert_eq!(frames.buffered_len(), 0);
}

#[test]
fn malformed_frame_is_discarded_and_buffer_recovers() {
    let mut frames = FrameAssembler::new();
    assert!(matches!(
        frames.push(b"garbage]"),
        FrameOutcome::Discarded(DecodeError::Json(_))
    ));
    assert_eq!(frames.buffered_len(), 0);
    assert_eq!(decoded(frames.push(PAYLOAD.as_bytes())).len(), 2);
}

#[test]
fn empty_array_is_a_valid_frame() {
    let mut frames = FrameAssembler::new();
    assert!(decoded(frames.push(b"[]")).is_empty());
}
