//! Playback state tracking
//!
//! [`PlaybackMonitor`] is a listener that folds every notification into a
//! [`PlaybackSnapshot`] and lets other threads wait for a condition on it.

use crate::listener::PlayerListener;
use bluetune_core::{
    CommandKind, DecoderState, PropertyNotification, PropertyScope, PropertyValue, Status,
    StreamInfo, StreamInfoMask, TimeCode,
};
use parking_lot::{Condvar, Mutex};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Latest known playback state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackSnapshot {
    pub state: Option<DecoderState>,
    pub volume: Option<f32>,
    pub position: Option<f32>,
    pub timecode: Option<TimeCode>,
    /// Stream info with every reported change merged in
    pub stream_info: StreamInfo,
    pub acks: BTreeMap<CommandKind, u32>,
    pub nacks: BTreeMap<CommandKind, u32>,
    pub last_nack: Option<(CommandKind, Status)>,
    pub last_pong: Option<i32>,
    pub decoder_events: u32,
    pub properties: BTreeMap<(PropertyScope, String), PropertyValue>,
    /// Notifications received so far
    pub messages: u64,
}

impl PlaybackSnapshot {
    pub fn ack_count(&self, kind: CommandKind) -> u32 {
        self.acks.get(&kind).copied().unwrap_or(0)
    }

    pub fn nack_count(&self, kind: CommandKind) -> u32 {
        self.nacks.get(&kind).copied().unwrap_or(0)
    }

    pub fn property(&self, scope: PropertyScope, name: &str) -> Option<&PropertyValue> {
        self.properties.get(&(scope, name.to_string()))
    }

    fn apply_property(&mut self, notification: &PropertyNotification) {
        if notification.is_clear_all() {
            self.properties.clear();
            return;
        }
        let key = (notification.scope, notification.name.clone());
        match &notification.value {
            Some(value) => {
                self.properties.insert(key, value.clone());
            }
            None => {
                self.properties.remove(&key);
            }
        }
    }
}

/// Listener recording a [`PlaybackSnapshot`]
#[derive(Default)]
pub struct PlaybackMonitor {
    snapshot: Mutex<PlaybackSnapshot>,
    changed: Condvar,
}

impl PlaybackMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshot.lock().clone()
    }

    /// Block until `predicate` holds or `timeout` elapses. Returns the
    /// snapshot that satisfied the predicate.
    pub fn wait_for<F>(&self, mut predicate: F, timeout: Duration) -> Option<PlaybackSnapshot>
    where
        F: FnMut(&PlaybackSnapshot) -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut snapshot = self.snapshot.lock();
        loop {
            if predicate(&snapshot) {
                return Some(snapshot.clone());
            }
            if self.changed.wait_until(&mut snapshot, deadline).timed_out() {
                return predicate(&snapshot).then(|| snapshot.clone());
            }
        }
    }

    fn update(&self, apply: impl FnOnce(&mut PlaybackSnapshot)) {
        let mut snapshot = self.snapshot.lock();
        apply(&mut snapshot);
        snapshot.messages += 1;
        drop(snapshot);
        self.changed.notify_all();
    }
}

impl PlayerListener for PlaybackMonitor {
    fn on_ack(&self, command: CommandKind) {
        self.update(|s| *s.acks.entry(command).or_default() += 1);
    }

    fn on_nack(&self, command: CommandKind, code: Status) {
        self.update(|s| {
            *s.nacks.entry(command).or_default() += 1;
            s.last_nack = Some((command, code));
        });
    }

    fn on_pong(&self, cookie: i32) {
        self.update(|s| s.last_pong = Some(cookie));
    }

    fn on_decoder_state_changed(&self, state: DecoderState) {
        self.update(|s| s.state = Some(state));
    }

    fn on_decoder_event(&self, _event_type: Option<i32>) {
        self.update(|s| s.decoder_events += 1);
    }

    fn on_volume_changed(&self, volume: f32) {
        self.update(|s| s.volume = Some(volume));
    }

    fn on_stream_timecode(&self, timecode: TimeCode) {
        self.update(|s| s.timecode = Some(timecode));
    }

    fn on_stream_position(&self, position: f32) {
        self.update(|s| s.position = Some(position));
    }

    fn on_stream_info_changed(&self, changed: StreamInfoMask, info: &StreamInfo) {
        self.update(|s| s.stream_info.merge(changed, info));
    }

    fn on_property_changed(&self, notification: &PropertyNotification) {
        self.update(|s| s.apply_property(notification));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    fn property(
        scope: PropertyScope,
        name: &str,
        value: Option<PropertyValue>,
    ) -> PropertyNotification {
        PropertyNotification {
            scope,
            source: "test".to_string(),
            name: name.to_string(),
            value,
        }
    }

    #[test]
    fn test_clear_all_resets_every_slot() {
        let monitor = PlaybackMonitor::new();
        monitor.on_property_changed(&property(PropertyScope::Stream, "Title", Some("A".into())));
        monitor.on_property_changed(&property(PropertyScope::Core, "Gain", Some(3.into())));
        assert_eq!(monitor.snapshot().properties.len(), 2);

        monitor.on_property_changed(&property(PropertyScope::Stream, "", None));
        assert!(monitor.snapshot().properties.is_empty());
    }

    #[test]
    fn test_property_without_value_removes_slot() {
        let monitor = PlaybackMonitor::new();
        monitor.on_property_changed(&property(PropertyScope::Module, "Eq", Some(true.into())));
        monitor.on_property_changed(&property(PropertyScope::Module, "Eq", None));
        assert_eq!(monitor.snapshot().property(PropertyScope::Module, "Eq"), None);
    }

    #[test]
    fn test_ack_and_nack_tallies() {
        let monitor = PlaybackMonitor::new();
        monitor.on_ack(CommandKind::Play);
        monitor.on_ack(CommandKind::Play);
        monitor.on_nack(CommandKind::SetInput, Status::INPUT_NOT_FOUND);

        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.ack_count(CommandKind::Play), 2);
        assert_eq!(snapshot.nack_count(CommandKind::SetInput), 1);
        assert_eq!(snapshot.ack_count(CommandKind::Stop), 0);
        assert_eq!(snapshot.last_nack, Some((CommandKind::SetInput, Status::INPUT_NOT_FOUND)));
        assert_eq!(snapshot.messages, 3);
    }

    #[test]
    fn test_wait_for_wakes_on_update() {
        let monitor = Arc::new(PlaybackMonitor::new());
        let writer = {
            let monitor = monitor.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                monitor.on_decoder_state_changed(DecoderState::Playing);
            })
        };

        let snapshot = monitor.wait_for(
            |s| s.state == Some(DecoderState::Playing),
            Duration::from_secs(5),
        );
        writer.join().unwrap();
        assert!(snapshot.is_some());
    }

    #[test]
    fn test_wait_for_times_out() {
        let monitor = PlaybackMonitor::new();
        let result = monitor.wait_for(|s| s.last_pong.is_some(), Duration::from_millis(10));
        assert!(result.is_none());
    }

    proptest! {
        #[test]
        fn prop_clear_all_always_empties(names in proptest::collection::vec("[a-z]{1,8}", 0..20)) {
            let monitor = PlaybackMonitor::new();
            for (i, name) in names.iter().enumerate() {
                let value = Some((i as i32).into());
                monitor.on_property_changed(&property(PropertyScope::Stream, name, value));
            }
            monitor.on_property_changed(&property(PropertyScope::Core, "", None));
            prop_assert!(monitor.snapshot().properties.is_empty());
        }
    }
}
