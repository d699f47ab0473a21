//! In-process reference engine
//!
//! [`LoopbackEngine`] keeps a small decoder model and answers commands the
//! way the BlueTune decoder server does: notifications first, then an Ack,
//! or a Nack carrying the failure status. Decoder state is only reported when
//! it actually changes. Frames and a fatal pump status can be injected to
//! drive listeners directly.

use crate::engine::Engine;
use bluetune_core::{
    Command, CommandKind, DecoderState, InputSource, Message, PropertyNotification,
    PropertyScope, PropertyValue, RawMessage, Status, StreamInfo, StreamInfoMask, TimeCode,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Source name used in property notifications the engine produces itself
pub const LOOPBACK_SOURCE: &str = "loopback";

enum Outbound {
    Frame(RawMessage),
    Fatal(Status),
}

#[derive(Default)]
struct Model {
    state: Option<DecoderState>,
    input: Option<String>,
    output: Option<String>,
    volume: f32,
    stream: StreamInfo,
    position_ms: u64,
    properties: BTreeMap<(PropertyScope, String), PropertyValue>,
    modules: Vec<String>,
    nodes: Vec<String>,
    plugins: Vec<String>,
    failures: HashMap<CommandKind, Status>,
}

impl Model {
    fn state(&self) -> DecoderState {
        self.state.unwrap_or(DecoderState::Stopped)
    }
}

/// Reference engine running entirely in-process
pub struct LoopbackEngine {
    sender: Sender<Outbound>,
    receiver: Receiver<Outbound>,
    model: Mutex<Model>,
    terminated: AtomicBool,
}

impl LoopbackEngine {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            model: Mutex::new(Model {
                volume: 1.0,
                ..Default::default()
            }),
            terminated: AtomicBool::new(false),
        }
    }

    /// Queue a raw frame for the pump
    pub fn inject(&self, raw: RawMessage) {
        let _ = self.sender.send(Outbound::Frame(raw));
    }

    /// Queue a typed message for the pump
    pub fn inject_message(&self, message: &Message) {
        match message.encode() {
            Ok(raw) => self.inject(raw),
            Err(e) => warn!("Cannot encode injected {}: {}", message.kind(), e),
        }
    }

    /// Make the pump fail with `status` once it reaches this point
    pub fn inject_fatal(&self, status: Status) {
        let _ = self.sender.send(Outbound::Fatal(status));
    }

    /// Fail the next command of `kind` with `status`
    pub fn fail_next(&self, kind: CommandKind, status: Status) {
        self.model.lock().failures.insert(kind, status);
    }

    /// Describe the current input's stream and report it
    pub fn set_stream_info(&self, changed: StreamInfoMask, info: StreamInfo) {
        let mut model = self.model.lock();
        let valid = model.stream.mask | changed;
        model.stream.merge(changed, &info);
        model.stream.mask = valid;
        let stream = model.stream.clone();
        drop(model);
        self.emit(Message::StreamInfo {
            changed,
            info: stream,
        });
    }

    /// Reach the end of the current stream
    pub fn finish_stream(&self) {
        let mut model = self.model.lock();
        if model.state() == DecoderState::Playing {
            self.change_state(&mut model, DecoderState::EndOfStream);
        }
    }

    /// Delete every property of `scope` and report it with an empty name
    pub fn clear_properties(&self, scope: PropertyScope) {
        self.model.lock().properties.retain(|(s, _), _| *s != scope);
        self.emit(Message::Property(PropertyNotification {
            scope,
            source: LOOPBACK_SOURCE.to_string(),
            name: String::new(),
            value: None,
        }));
    }

    pub fn state(&self) -> DecoderState {
        self.model.lock().state()
    }

    pub fn volume(&self) -> f32 {
        self.model.lock().volume
    }

    pub fn input(&self) -> Option<String> {
        self.model.lock().input.clone()
    }

    pub fn output(&self) -> Option<String> {
        self.model.lock().output.clone()
    }

    pub fn position_ms(&self) -> u64 {
        self.model.lock().position_ms
    }

    pub fn property(&self, scope: PropertyScope, name: &str) -> Option<PropertyValue> {
        self.model
            .lock()
            .properties
            .get(&(scope, name.to_string()))
            .cloned()
    }

    pub fn modules(&self) -> Vec<String> {
        self.model.lock().modules.clone()
    }

    pub fn nodes(&self) -> Vec<String> {
        self.model.lock().nodes.clone()
    }

    pub fn plugins(&self) -> Vec<String> {
        self.model.lock().plugins.clone()
    }

    fn emit(&self, message: Message) {
        self.inject_message(&message);
    }

    fn change_state(&self, model: &mut Model, state: DecoderState) {
        if model.state != Some(state) {
            model.state = Some(state);
            self.emit(Message::DecoderState(state));
        }
    }

    fn execute(&self, model: &mut Model, command: Command) -> Status {
        match command {
            Command::SetInput { source, mime_type } => {
                let (name, size) = match source {
                    InputSource::Name(name) => (name, None),
                    InputSource::Stream(input) => ("[stream]".to_string(), Some(input.size())),
                };
                if name.is_empty() {
                    return Status::INVALID_PARAMETERS;
                }
                self.change_state(model, DecoderState::Stopped);
                model.input = Some(name);
                model.position_ms = 0;
                let mut changed = StreamInfoMask::DATA_TYPE;
                if size.is_some() {
                    changed |= StreamInfoMask::SIZE;
                }
                model.stream = StreamInfo {
                    mask: changed,
                    data_type: mime_type,
                    size: size.unwrap_or(0),
                    ..Default::default()
                };
                // a new input drops the previous stream's properties
                model.properties.retain(|(s, _), _| *s != PropertyScope::Stream);
                self.emit(Message::Property(PropertyNotification {
                    scope: PropertyScope::Stream,
                    source: LOOPBACK_SOURCE.to_string(),
                    name: String::new(),
                    value: None,
                }));
                self.emit(Message::StreamInfo {
                    changed,
                    info: model.stream.clone(),
                });
                Status::SUCCESS
            }
            Command::SetOutput { name, .. } => {
                if name.is_empty() {
                    return Status::INVALID_PARAMETERS;
                }
                model.output = Some(name);
                Status::SUCCESS
            }
            Command::SetVolume(level) => {
                if !level.is_finite() {
                    return Status::INVALID_PARAMETERS;
                }
                model.volume = level.clamp(0.0, 1.0);
                self.emit(Message::Volume(model.volume));
                Status::SUCCESS
            }
            Command::Play => {
                if model.input.is_none() {
                    return Status::INVALID_STATE;
                }
                self.change_state(model, DecoderState::Playing);
                Status::SUCCESS
            }
            Command::Stop => {
                self.change_state(model, DecoderState::Stopped);
                model.position_ms = 0;
                Status::SUCCESS
            }
            Command::Pause => {
                if model.state() == DecoderState::Playing {
                    self.change_state(model, DecoderState::Paused);
                }
                Status::SUCCESS
            }
            Command::Ping { cookie } => {
                self.emit(Message::Pong(cookie));
                Status::SUCCESS
            }
            Command::SeekToTime { millis } => self.seek_to_millis(model, millis),
            Command::SeekToTimeStamp(timecode) => self.seek_to_millis(model, timecode.to_millis()),
            Command::SeekToPosition { offset, range } => {
                if model.input.is_none() {
                    return Status::INVALID_STATE;
                }
                if range == 0 || offset > range {
                    return Status::INVALID_PARAMETERS;
                }
                let fraction = offset as f64 / range as f64;
                model.position_ms = (model.stream.duration as f64 * fraction) as u64;
                self.emit(Message::StreamPosition(fraction as f32));
                if model.stream.duration > 0 {
                    self.emit(Message::StreamTimeCode(TimeCode::from_millis(model.position_ms)));
                }
                Status::SUCCESS
            }
            Command::RegisterModule { name } => {
                if name.is_empty() {
                    return Status::INVALID_PARAMETERS;
                }
                model.modules.push(name);
                Status::SUCCESS
            }
            Command::AddNode { name } => {
                if name.is_empty() {
                    return Status::INVALID_PARAMETERS;
                }
                model.nodes.push(name);
                Status::SUCCESS
            }
            Command::SetProperty { scope, name, value } => {
                if name.is_empty() {
                    return Status::INVALID_PARAMETERS;
                }
                model.properties.insert((scope, name.clone()), value.clone());
                self.emit(Message::Property(PropertyNotification {
                    scope,
                    source: LOOPBACK_SOURCE.to_string(),
                    name,
                    value: Some(value),
                }));
                Status::SUCCESS
            }
            Command::LoadPlugin { name, .. } => {
                if name.is_empty() {
                    return Status::INVALID_PARAMETERS;
                }
                model.plugins.push(name);
                Status::SUCCESS
            }
            Command::LoadPlugins { directory, .. } => {
                if directory.is_empty() {
                    return Status::INVALID_PARAMETERS;
                }
                Status::SUCCESS
            }
        }
    }

    fn seek_to_millis(&self, model: &mut Model, millis: u64) -> Status {
        if model.input.is_none() {
            return Status::INVALID_STATE;
        }
        let duration = model.stream.duration;
        if duration > 0 && millis > duration {
            return Status::INVALID_PARAMETERS;
        }
        model.position_ms = millis;
        self.emit(Message::StreamTimeCode(TimeCode::from_millis(millis)));
        if duration > 0 {
            self.emit(Message::StreamPosition((millis as f64 / duration as f64) as f32));
        }
        Status::SUCCESS
    }
}

impl Default for LoopbackEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for LoopbackEngine {
    fn pump_message(&self) -> Result<RawMessage, Status> {
        match self.receiver.recv() {
            Ok(Outbound::Frame(raw)) => Ok(raw),
            Ok(Outbound::Fatal(status)) => Err(status),
            Err(_) => Err(Status::TERMINATED),
        }
    }

    fn submit(&self, command: Command) -> Status {
        if self.terminated.load(Ordering::Acquire) {
            return Status::TERMINATED;
        }
        let kind = command.kind();
        let mut model = self.model.lock();
        let status = match model.failures.remove(&kind) {
            Some(status) => status,
            None => self.execute(&mut model, command),
        };
        drop(model);

        debug!("Loopback {} -> {}", kind, status);
        if status.is_success() {
            self.emit(Message::Ack(kind));
        } else {
            self.emit(Message::Nack {
                command: kind,
                code: status,
            });
        }
        status
    }

    fn terminate(&self) {
        if self.terminated.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut model = self.model.lock();
        self.change_state(&mut model, DecoderState::Terminated);
        drop(model);
        self.inject_fatal(Status::TERMINATED);
    }
}
