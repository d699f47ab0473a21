//! Console output of player notifications

use bluetune_bridge::PlayerListener;
use bluetune_core::{
    CommandKind, DecoderState, PropertyNotification, Status, StreamInfo, StreamInfoMask, TimeCode,
};
use parking_lot::Mutex;
use std::io::{self, Write};
use tracing::debug;

/// Listener printing notifications as text lines
pub struct ConsoleListener<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleListener<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleListener<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn print(&self, lines: &[String]) {
        let mut out = self.out.lock();
        for line in lines {
            if let Err(e) = writeln!(out, "{}", line) {
                debug!("Console write failed: {}", e);
                return;
            }
        }
        let _ = out.flush();
    }
}

/// Lines describing the fields selected by `changed`
pub fn stream_info_lines(changed: StreamInfoMask, info: &StreamInfo) -> Vec<String> {
    let mut lines = Vec::new();
    if changed.contains(StreamInfoMask::NOMINAL_BITRATE) {
        lines.push(format!("Nominal Bitrate = {}", info.nominal_bitrate));
    }
    if changed.contains(StreamInfoMask::AVERAGE_BITRATE) {
        lines.push(format!("Average Bitrate = {}", info.average_bitrate));
    }
    if changed.contains(StreamInfoMask::INSTANT_BITRATE) {
        lines.push(format!("Instant Bitrate = {}", info.instant_bitrate));
    }
    if changed.contains(StreamInfoMask::SAMPLE_RATE) {
        lines.push(format!("Sample Rate = {}", info.sample_rate));
    }
    if changed.contains(StreamInfoMask::CHANNEL_COUNT) {
        lines.push(format!("Channels = {}", info.channel_count));
    }
    if changed.contains(StreamInfoMask::SIZE) {
        lines.push(format!("Stream Size = {}", info.size));
    }
    if changed.contains(StreamInfoMask::DURATION) {
        lines.push(format!("Duration = {} ms", info.duration));
    }
    if changed.contains(StreamInfoMask::FLAGS) {
        lines.push(format!("Flags = {:?}", info.flags));
    }
    if changed.contains(StreamInfoMask::DATA_TYPE) {
        lines.push(format!(
            "Data Type = {}",
            info.data_type.as_deref().unwrap_or("")
        ));
    }
    lines
}

/// Line describing a property change
pub fn property_line(notification: &PropertyNotification) -> String {
    if notification.is_clear_all() {
        return format!("All properties in '{}' scope deleted", notification.scope);
    }
    match &notification.value {
        Some(value) => format!(
            "Property {} ({}) = {}",
            notification.name, notification.scope, value
        ),
        None => format!(
            "Property {} ({}) deleted",
            notification.name, notification.scope
        ),
    }
}

impl<W: Write + Send> PlayerListener for ConsoleListener<W> {
    fn on_ack(&self, command: CommandKind) {
        debug!("ACK {}", command);
    }

    fn on_nack(&self, command: CommandKind, code: Status) {
        self.print(&[format!("Command {} failed: {} ({})", command, code, code.code())]);
    }

    fn on_pong(&self, cookie: i32) {
        self.print(&[format!("PONG {}", cookie)]);
    }

    fn on_decoder_state_changed(&self, state: DecoderState) {
        self.print(&[format!("Decoder state = [{}]", state)]);
    }

    fn on_decoder_event(&self, event_type: Option<i32>) {
        match event_type {
            Some(event_type) => self.print(&[format!("Decoder event {}", event_type)]),
            None => self.print(&["Decoder event".to_string()]),
        }
    }

    fn on_volume_changed(&self, volume: f32) {
        self.print(&[format!("Volume = {:.0}%", volume * 100.0)]);
    }

    fn on_stream_timecode(&self, timecode: TimeCode) {
        self.print(&[format!("Time code = {}", timecode)]);
    }

    fn on_stream_position(&self, position: f32) {
        self.print(&[format!("Position = {:.4}", position)]);
    }

    fn on_stream_info_changed(&self, changed: StreamInfoMask, info: &StreamInfo) {
        self.print(&stream_info_lines(changed, info));
    }

    fn on_property_changed(&self, notification: &PropertyNotification) {
        self.print(&[property_line(notification)]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bluetune_core::{PropertyScope, PropertyValue};

    fn output(listener: ConsoleListener<Vec<u8>>) -> String {
        String::from_utf8(listener.into_inner()).unwrap()
    }

    #[test]
    fn test_state_and_timecode_lines() {
        let listener = ConsoleListener::new(Vec::new());
        listener.on_decoder_state_changed(DecoderState::EndOfStream);
        listener.on_stream_timecode(TimeCode::new(0, 4, 5, 6));
        assert_eq!(
            output(listener),
            "Decoder state = [END OF STREAM]\nTime code = 00:04:05.06\n"
        );
    }

    #[test]
    fn test_stream_info_prints_masked_fields_only() {
        let info = StreamInfo {
            sample_rate: 44100,
            channel_count: 2,
            duration: 1500,
            ..Default::default()
        };
        let changed = StreamInfoMask::SAMPLE_RATE | StreamInfoMask::DURATION;
        let lines = stream_info_lines(changed, &info);
        assert_eq!(lines, vec!["Sample Rate = 44100", "Duration = 1500 ms"]);
    }

    #[test]
    fn test_property_lines() {
        let mut notification = PropertyNotification {
            scope: PropertyScope::Stream,
            source: "decoder".to_string(),
            name: "Title".to_string(),
            value: Some(PropertyValue::from("Intro")),
        };
        assert_eq!(property_line(&notification), "Property Title (stream) = [S] Intro");

        notification.value = None;
        assert_eq!(property_line(&notification), "Property Title (stream) deleted");

        notification.name.clear();
        assert_eq!(property_line(&notification), "All properties in 'stream' scope deleted");
    }

    #[test]
    fn test_ack_prints_nothing() {
        let listener = ConsoleListener::new(Vec::new());
        listener.on_ack(CommandKind::Play);
        listener.on_nack(CommandKind::Play, Status::INVALID_STATE);
        assert_eq!(output(listener), "Command play failed: invalid state (-4)\n");
    }
}
