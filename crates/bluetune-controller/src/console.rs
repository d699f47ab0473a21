//! Console command grammar
//!
//! One command per line, words separated by whitespace. Blank lines and
//! lines starting with `#` are ignored.

use bluetune_bridge::Player;
use bluetune_core::{normalize_slider, PropertyScope, PropertyValue, Status, TimeCode};
use std::time::Duration;
use thiserror::Error;

/// A parsed console command
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    SetInput {
        name: String,
        mime_type: Option<String>,
    },
    SetOutput {
        name: String,
        mime_type: Option<String>,
    },
    Play,
    Pause,
    Stop,
    Ping(i32),
    Seek(Duration),
    SeekTimeStamp(TimeCode),
    SeekPosition { offset: u64, range: u64 },
    /// Volume percentage, 0 to 100
    Volume(i32),
    Property {
        scope: PropertyScope,
        name: String,
        value: PropertyValue,
    },
    RegisterModule(String),
    AddNode(String),
    LoadPlugin(String),
    LoadPlugins {
        directory: String,
        filter: Option<String>,
    },
    Exit,
}

/// Errors raised while parsing a console line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("'{command}' expects {expected}")]
    Usage {
        command: &'static str,
        expected: &'static str,
    },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("invalid time stamp '{0}', expected hh:mm:ss[.ff]")]
    InvalidTimeStamp(String),

    #[error("invalid scope '{0}', expected core, stream or module")]
    InvalidScope(String),
}

fn usage(command: &'static str, expected: &'static str) -> ParseError {
    ParseError::Usage { command, expected }
}

fn number<T: std::str::FromStr>(word: &str) -> Result<T, ParseError> {
    word.parse().map_err(|_| ParseError::InvalidNumber(word.to_string()))
}

fn locator(args: &[&str]) -> Option<(String, Option<String>)> {
    match args {
        [name] => Some((name.to_string(), None)),
        [name, mime] => Some((name.to_string(), Some(mime.to_string()))),
        _ => None,
    }
}

/// Parse one console line. Returns `Ok(None)` for blank lines and comments.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, ParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match verb {
        "set-input" => {
            let (name, mime_type) =
                locator(&args).ok_or(usage("set-input", "<name> [mime-type]"))?;
            ConsoleCommand::SetInput { name, mime_type }
        }
        "set-output" => {
            let (name, mime_type) =
                locator(&args).ok_or(usage("set-output", "<name> [mime-type]"))?;
            ConsoleCommand::SetOutput { name, mime_type }
        }
        "play" => ConsoleCommand::Play,
        "pause" => ConsoleCommand::Pause,
        "stop" => ConsoleCommand::Stop,
        "ping" => match args.as_slice() {
            [] => ConsoleCommand::Ping(0),
            [cookie] => ConsoleCommand::Ping(number(cookie)?),
            _ => return Err(usage("ping", "[cookie]")),
        },
        "seek" => match args.as_slice() {
            [seconds] => {
                let seconds: f64 = number(seconds)?;
                let time = Duration::try_from_secs_f64(seconds)
                    .map_err(|_| ParseError::InvalidNumber(args[0].to_string()))?;
                ConsoleCommand::Seek(time)
            }
            _ => return Err(usage("seek", "<seconds>")),
        },
        "seek-timestamp" | "seek-to-timestamp" => match args.as_slice() {
            [stamp] => ConsoleCommand::SeekTimeStamp(parse_timestamp(stamp)?),
            _ => return Err(usage("seek-timestamp", "<hh:mm:ss[.ff]>")),
        },
        "seek-position" => match args.as_slice() {
            [offset, range] => ConsoleCommand::SeekPosition {
                offset: number(offset)?,
                range: number(range)?,
            },
            _ => return Err(usage("seek-position", "<offset> <range>")),
        },
        "volume" => match args.as_slice() {
            [percent] => ConsoleCommand::Volume(number(percent)?),
            _ => return Err(usage("volume", "<0..100>")),
        },
        "property" => match args.as_slice() {
            [scope, name, value @ ..] if !value.is_empty() => {
                let scope = PropertyScope::from_name(scope)
                    .ok_or_else(|| ParseError::InvalidScope(scope.to_string()))?;
                let text = value.join(" ");
                let value = match text.parse::<i32>() {
                    Ok(integer) => PropertyValue::Integer(integer),
                    Err(_) => PropertyValue::String(text),
                };
                ConsoleCommand::Property {
                    scope,
                    name: name.to_string(),
                    value,
                }
            }
            _ => return Err(usage("property", "<core|stream|module> <name> <value>")),
        },
        "register-module" => match args.as_slice() {
            [name] => ConsoleCommand::RegisterModule(name.to_string()),
            _ => return Err(usage("register-module", "<name>")),
        },
        "add-node" => match args.as_slice() {
            [name] => ConsoleCommand::AddNode(name.to_string()),
            _ => return Err(usage("add-node", "<name>")),
        },
        "load-plugin" => match args.as_slice() {
            [name] => ConsoleCommand::LoadPlugin(name.to_string()),
            _ => return Err(usage("load-plugin", "<name>")),
        },
        "load-plugins" => match args.as_slice() {
            [directory] => ConsoleCommand::LoadPlugins {
                directory: directory.to_string(),
                filter: None,
            },
            [directory, filter] => ConsoleCommand::LoadPlugins {
                directory: directory.to_string(),
                filter: Some(filter.to_string()),
            },
            _ => return Err(usage("load-plugins", "<directory> [filter]")),
        },
        "exit" | "quit" => ConsoleCommand::Exit,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    Ok(Some(command))
}

/// Parse `hh:mm:ss` with an optional `.ff` hundredths suffix
pub fn parse_timestamp(text: &str) -> Result<TimeCode, ParseError> {
    let invalid = || ParseError::InvalidTimeStamp(text.to_string());

    let (clock, fraction) = match text.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (text, None),
    };
    let parts: Vec<u8> = clock
        .split(':')
        .map(|part| part.parse::<u8>().map_err(|_| invalid()))
        .collect::<Result<_, _>>()?;
    let [h, m, s] = parts[..] else {
        return Err(invalid());
    };
    if m >= 60 || s >= 60 {
        return Err(invalid());
    }
    let f = match fraction {
        None => 0,
        Some(fraction) if fraction.len() <= 2 => {
            let value: u8 = fraction.parse().map_err(|_| invalid())?;
            // ".5" means fifty hundredths
            if fraction.len() == 1 {
                value * 10
            } else {
                value
            }
        }
        Some(_) => return Err(invalid()),
    };
    Ok(TimeCode::new(h, m, s, f))
}

/// Submit a parsed command. `Exit` submits nothing.
pub fn execute(command: &ConsoleCommand, player: &Player) -> Status {
    match command {
        ConsoleCommand::SetInput { name, mime_type } => {
            player.set_input(name, mime_type.as_deref())
        }
        ConsoleCommand::SetOutput { name, mime_type } => {
            player.set_output(name, mime_type.as_deref())
        }
        ConsoleCommand::Play => player.play(),
        ConsoleCommand::Pause => player.pause(),
        ConsoleCommand::Stop => player.stop(),
        ConsoleCommand::Ping(cookie) => player.ping(*cookie),
        ConsoleCommand::Seek(time) => player.seek_to_time(*time),
        ConsoleCommand::SeekTimeStamp(tc) => player.seek_to_timestamp(tc.h, tc.m, tc.s, tc.f),
        ConsoleCommand::SeekPosition { offset, range } => player.seek_to_position(*offset, *range),
        ConsoleCommand::Volume(percent) => player.set_volume(normalize_slider(*percent, 100)),
        ConsoleCommand::Property { scope, name, value } => {
            player.set_property(*scope, name, value.clone())
        }
        ConsoleCommand::RegisterModule(name) => player.register_module(name),
        ConsoleCommand::AddNode(name) => player.add_node(name),
        ConsoleCommand::LoadPlugin(name) => player.load_plugin(name, 0),
        ConsoleCommand::LoadPlugins { directory, filter } => {
            player.load_plugins(directory, filter.as_deref())
        }
        ConsoleCommand::Exit => Status::SUCCESS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_line("play"), Ok(Some(ConsoleCommand::Play)));
        assert_eq!(parse_line("  stop  "), Ok(Some(ConsoleCommand::Stop)));
        assert_eq!(parse_line("exit"), Ok(Some(ConsoleCommand::Exit)));
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("# comment"), Ok(None));
    }

    #[test]
    fn test_parse_set_input() {
        assert_eq!(
            parse_line("set-input http://radio/stream audio/mpeg"),
            Ok(Some(ConsoleCommand::SetInput {
                name: "http://radio/stream".to_string(),
                mime_type: Some("audio/mpeg".to_string()),
            }))
        );
        assert_eq!(
            parse_line("set-input"),
            Err(ParseError::Usage {
                command: "set-input",
                expected: "<name> [mime-type]"
            })
        );
    }

    #[test]
    fn test_parse_seek_variants() {
        assert_eq!(
            parse_line("seek 12.5"),
            Ok(Some(ConsoleCommand::Seek(Duration::from_millis(12_500))))
        );
        assert_eq!(
            parse_line("seek-timestamp 00:01:30.25"),
            Ok(Some(ConsoleCommand::SeekTimeStamp(TimeCode::new(0, 1, 30, 25))))
        );
        assert_eq!(
            parse_line("seek-position 1 4"),
            Ok(Some(ConsoleCommand::SeekPosition { offset: 1, range: 4 }))
        );
        assert!(matches!(
            parse_line("seek -3"),
            Err(ParseError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("01:02:03"), Ok(TimeCode::new(1, 2, 3, 0)));
        assert_eq!(parse_timestamp("00:00:10.5"), Ok(TimeCode::new(0, 0, 10, 50)));
        assert!(parse_timestamp("1:2").is_err());
        assert!(parse_timestamp("00:61:00").is_err());
        assert!(parse_timestamp("00:00:00.123").is_err());
    }

    #[test]
    fn test_parse_property_values() {
        assert_eq!(
            parse_line("property core BufferSize 4096"),
            Ok(Some(ConsoleCommand::Property {
                scope: PropertyScope::Core,
                name: "BufferSize".to_string(),
                value: PropertyValue::Integer(4096),
            }))
        );
        assert_eq!(
            parse_line("property stream Title Blue Monday"),
            Ok(Some(ConsoleCommand::Property {
                scope: PropertyScope::Stream,
                name: "Title".to_string(),
                value: PropertyValue::from("Blue Monday"),
            }))
        );
        assert_eq!(
            parse_line("property global X 1"),
            Err(ParseError::InvalidScope("global".to_string()))
        );
    }

    #[test]
    fn test_execute_drives_player() {
        use bluetune_bridge::{runtime, LoggingListener, LoopbackEngine};
        use std::convert::Infallible;
        use std::sync::Arc;

        runtime::initialize("loopback", |_| Ok::<_, Infallible>(None)).unwrap();
        let engine = Arc::new(LoopbackEngine::new());
        let player = Player::open(engine.clone(), Arc::new(LoggingListener)).unwrap();

        for line in ["set-input song.mp3", "volume 40", "play", "add-node Tap"] {
            let command = parse_line(line).unwrap().unwrap();
            assert_eq!(execute(&command, &player), Status::SUCCESS, "{}", line);
        }
        assert_eq!(engine.input().as_deref(), Some("song.mp3"));
        assert_eq!(engine.volume(), 0.4);
        assert_eq!(engine.nodes(), vec!["Tap"]);
        player.close().unwrap();
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_line("rewind"),
            Err(ParseError::UnknownCommand("rewind".to_string()))
        );
    }
}
