use bluetune_core::{
    decode_wide, encode_wide, normalize_slider, position_from_raw, volume_from_raw, volume_to_raw,
    CommandKind, DecoderState, Message, MessageKind, PropertyScope, PropertyValue, ProtocolError,
    RawMessage, StreamInfoMask, TimeCode,
};
use proptest::prelude::*;

fn stream_info_frame(mask: StreamInfoMask, size: (i32, i32), duration: (i32, i32)) -> RawMessage {
    RawMessage::new(MessageKind::StreamInfo)
        .int(mask.bits() as i32)
        .int(StreamInfoMask::all().bits() as i32) // valid fields
        .int(1) // stream type
        .int(7) // id
        .ints([128_000, 131_000, 127_500])
        .ints([size.0, size.1, duration.0, duration.1])
        .ints([44_100, 2, 0x01])
        .obj("audio/mpeg")
}

#[test]
fn test_wide_reconstruction_example() {
    assert_eq!(decode_wide(1, 5), 0x7FFF_FFFF + 5);
}

#[test]
fn test_normalization_examples() {
    assert_eq!(volume_from_raw(100), 1.0);
    assert_eq!(volume_from_raw(0), 0.0);
    assert_eq!(volume_from_raw(50), 0.5);
    assert_eq!(position_from_raw(10000), 1.0);
    assert_eq!(position_from_raw(0), 0.0);
    assert_eq!(position_from_raw(2500), 0.25);
}

#[test]
fn test_stream_info_frame() {
    let raw = stream_info_frame(
        StreamInfoMask::SIZE | StreamInfoMask::DURATION | StreamInfoMask::DATA_TYPE,
        (1, 5),
        (0, 215_000),
    );

    let Some(Message::StreamInfo { changed, info }) = Message::decode(&raw).unwrap() else {
        panic!("expected stream info");
    };
    assert!(changed.contains(StreamInfoMask::SIZE));
    assert!(!changed.contains(StreamInfoMask::SAMPLE_RATE));
    assert_eq!(info.mask, StreamInfoMask::all());
    assert_eq!(info.stream_type, 1);
    assert_eq!(info.id, 7);
    assert_eq!(info.nominal_bitrate, 128_000);
    assert_eq!(info.instant_bitrate, 127_500);
    assert_eq!(info.size, 0x7FFF_FFFF + 5);
    assert_eq!(info.duration, 215_000);
    assert_eq!(info.sample_rate, 44_100);
    assert_eq!(info.channel_count, 2);
    assert_eq!(info.data_type.as_deref(), Some("audio/mpeg"));
}

#[test]
fn test_truncated_stream_info_is_malformed() {
    let raw = RawMessage::new(MessageKind::StreamInfo).ints([0, 1, 2]);
    assert!(matches!(
        Message::decode(&raw),
        Err(ProtocolError::MissingArgument { index: 3, .. })
    ));
}

#[test]
fn test_ack_for_unknown_command_is_malformed() {
    let raw = RawMessage::new(MessageKind::Ack).int(14);
    assert_eq!(Message::decode(&raw), Err(ProtocolError::UnknownCommand(14)));
}

#[test]
fn test_decoder_state_relayed_as_sent() {
    for state in [
        DecoderState::Stopped,
        DecoderState::Playing,
        DecoderState::Paused,
        DecoderState::EndOfStream,
        DecoderState::Terminated,
    ] {
        let raw = RawMessage::new(MessageKind::DecoderState).int(state.as_raw());
        assert_eq!(Message::decode(&raw), Ok(Some(Message::DecoderState(state))));
    }
}

#[test]
fn test_property_frames() {
    let integer = RawMessage::new(MessageKind::Property)
        .ints([PropertyScope::Module.as_raw(), 0, 42])
        .obj("mixer")
        .obj("Channels");
    let Some(Message::Property(notification)) = Message::decode(&integer).unwrap() else {
        panic!("expected a property");
    };
    assert_eq!(notification.scope, PropertyScope::Module);
    assert_eq!(notification.source, "mixer");
    assert_eq!(notification.value, Some(PropertyValue::Integer(42)));

    for unknown in [4, 99, -2] {
        let raw = RawMessage::new(MessageKind::Property)
            .ints([0, unknown, 0])
            .obj("core")
            .obj("Anything");
        assert_eq!(Message::decode(&raw), Ok(None));
    }
}

proptest! {
    #[test]
    fn prop_wide_words_round_trip(value in 0u64..(i32::MAX as u64 * 0x7FFF_FFFF)) {
        let (high, low) = encode_wide(value).unwrap();
        prop_assert!(high >= 0);
        prop_assert!(low >= 0);
        prop_assert_eq!(decode_wide(high, low), value);
    }

    #[test]
    fn prop_volume_raw_is_percentage(raw in 0i32..=100) {
        let level = volume_from_raw(raw);
        prop_assert!((0.0..=1.0).contains(&level));
        prop_assert_eq!(volume_to_raw(level), raw);
    }

    #[test]
    fn prop_slider_is_normalized(value in any::<i32>(), max in 1i32..=10_000) {
        let level = normalize_slider(value, max);
        prop_assert!((0.0..=1.0).contains(&level));
    }

    #[test]
    fn prop_timecode_millis_round_trip(h in 0u8..24, m in 0u8..60, s in 0u8..60, f in 0u8..100) {
        let tc = TimeCode::new(h, m, s, f);
        prop_assert_eq!(TimeCode::from_millis(tc.to_millis()), tc);
    }

    #[test]
    fn prop_unknown_message_kinds_are_rejected(kind in 10i32..) {
        let raw = RawMessage::with_raw_kind(kind).int(CommandKind::Play.as_raw());
        prop_assert_eq!(Message::decode(&raw), Err(ProtocolError::UnknownMessageKind(kind)));
    }
}
