//! Player observers

use bluetune_core::{
    CommandKind, DecoderState, Message, PropertyNotification, Status, StreamInfo, StreamInfoMask,
    TimeCode,
};
use tracing::info;

/// Callbacks for engine notifications. Every method defaults to a no-op.
///
/// Callbacks run on the pump thread, or on the dispatch context the player
/// was opened with.
#[allow(unused_variables)]
pub trait PlayerListener: Send + Sync {
    fn on_ack(&self, command: CommandKind) {}

    fn on_nack(&self, command: CommandKind, code: Status) {}

    fn on_pong(&self, cookie: i32) {}

    fn on_decoder_state_changed(&self, state: DecoderState) {}

    fn on_decoder_event(&self, event_type: Option<i32>) {}

    /// `volume` is in [0.0, 1.0]
    fn on_volume_changed(&self, volume: f32) {}

    fn on_stream_timecode(&self, timecode: TimeCode) {}

    /// `position` is a fraction of the stream in [0.0, 1.0]
    fn on_stream_position(&self, position: f32) {}

    fn on_stream_info_changed(&self, changed: StreamInfoMask, info: &StreamInfo) {}

    fn on_property_changed(&self, notification: &PropertyNotification) {}
}

/// Call the listener method matching the message kind
pub fn deliver(message: &Message, listener: &dyn PlayerListener) {
    match message {
        Message::Ack(command) => listener.on_ack(*command),
        Message::Nack { command, code } => listener.on_nack(*command, *code),
        Message::Pong(cookie) => listener.on_pong(*cookie),
        Message::DecoderState(state) => listener.on_decoder_state_changed(*state),
        Message::DecoderEvent { event_type } => listener.on_decoder_event(*event_type),
        Message::Volume(volume) => listener.on_volume_changed(*volume),
        Message::StreamTimeCode(timecode) => listener.on_stream_timecode(*timecode),
        Message::StreamPosition(position) => listener.on_stream_position(*position),
        Message::StreamInfo { changed, info } => listener.on_stream_info_changed(*changed, info),
        Message::Property(notification) => listener.on_property_changed(notification),
    }
}

/// Listener that logs every notification at INFO
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl PlayerListener for LoggingListener {
    fn on_ack(&self, command: CommandKind) {
        info!("ACK {}", command);
    }

    fn on_nack(&self, command: CommandKind, code: Status) {
        info!("NACK {} ({})", command, code);
    }

    fn on_pong(&self, cookie: i32) {
        info!("PONG {}", cookie);
    }

    fn on_decoder_state_changed(&self, state: DecoderState) {
        info!("Decoder state: {}", state);
    }

    fn on_decoder_event(&self, event_type: Option<i32>) {
        info!("Decoder event: {:?}", event_type);
    }

    fn on_volume_changed(&self, volume: f32) {
        info!("Volume: {:.2}", volume);
    }

    fn on_stream_timecode(&self, timecode: TimeCode) {
        info!("Timecode: {}", timecode);
    }

    fn on_stream_position(&self, position: f32) {
        info!("Position: {:.4}", position);
    }

    fn on_stream_info_changed(&self, changed: StreamInfoMask, info: &StreamInfo) {
        info!("Stream info changed ({:?}): {:?}", changed, info);
    }

    fn on_property_changed(&self, notification: &PropertyNotification) {
        if notification.is_clear_all() {
            info!(
                "All {} properties of {} deleted",
                notification.scope, notification.source
            );
        } else {
            info!(
                "Property {}/{} = {:?}",
                notification.scope, notification.name, notification.value
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl PlayerListener for Recorder {
        fn on_ack(&self, command: CommandKind) {
            self.calls.lock().push(format!("ack:{}", command));
        }

        fn on_volume_changed(&self, volume: f32) {
            self.calls.lock().push(format!("volume:{}", volume));
        }
    }

    #[test]
    fn test_deliver_routes_by_kind() {
        let recorder = Recorder::default();
        deliver(&Message::Ack(CommandKind::Stop), &recorder);
        deliver(&Message::Volume(0.5), &recorder);
        // not overridden: default no-op
        deliver(&Message::Pong(3), &recorder);

        assert_eq!(*recorder.calls.lock(), vec!["ack:stop", "volume:0.5"]);
    }
}
