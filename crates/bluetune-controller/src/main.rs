//! btcontroller: drive a BlueTune player from the console
//!
//! Reads one command per line from stdin and prints engine notifications to
//! stdout. Logs go to stderr and, optionally, to a log file.

use anyhow::{Context, Result};
use bluetune_bridge::{runtime, DispatchQueue, LoopbackEngine, Player};
use bluetune_core::normalize_slider;
use clap::Parser;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError};
use std::convert::Infallible;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

mod config;
mod console;
mod logging_setup;
mod printer;

use config::ControllerConfig;
use console::ConsoleCommand;
use printer::ConsoleListener;

/// How long the main loop waits for input before servicing the queue again
const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Parser)]
#[command(name = "btcontroller", version, about = "Console controller for a BlueTune player")]
struct Cli {
    /// Configuration file (defaults to <config dir>/bluetune/controller.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long)]
    log_level: Option<String>,

    /// Output to open at startup
    #[arg(long)]
    output: Option<String>,

    /// Deliver notifications on the main thread through a dispatch queue
    #[arg(long)]
    queue: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ControllerConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.log.level = level;
    }
    if cli.output.is_some() {
        config.output = cli.output;
    }
    config.use_dispatch_queue |= cli.queue;

    let _log_guard = logging_setup::init(&config.log)?;
    info!("=== BlueTune controller started ===");

    runtime::initialize("loopback", |_| {
        Ok::<_, Infallible>(Some(env!("CARGO_PKG_VERSION").to_string()))
    })?;

    let engine = Arc::new(LoopbackEngine::new());
    let listener = Arc::new(ConsoleListener::stdout());
    let queue = config.use_dispatch_queue.then(DispatchQueue::new);
    let player = match &queue {
        Some(queue) => Player::open_with_dispatcher(engine, listener, Arc::new(queue.handle()))?,
        None => Player::open(engine, listener)?,
    };

    if let Some(output) = &config.output {
        let status = player.set_output(output, None);
        if status.is_failure() {
            warn!("Failed to set output {}: {}", output, status);
        }
    }
    if let Some(volume) = config.initial_volume {
        let status = player.set_volume(normalize_slider(volume, 100));
        if status.is_failure() {
            warn!("Failed to set initial volume {}: {}", volume, status);
        }
    }

    let lines = spawn_stdin_reader()?;
    run(&player, &lines, queue.as_ref());

    player.close()?;
    if let Some(queue) = &queue {
        queue.run_pending();
    }
    info!("Controller stopped");
    Ok(())
}

fn spawn_stdin_reader() -> Result<Receiver<String>> {
    let (sender, receiver) = unbounded();
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if sender.send(line).is_err() {
                    break;
                }
            }
        })
        .context("Failed to spawn stdin reader")?;
    Ok(receiver)
}

fn run(player: &Player, lines: &Receiver<String>, queue: Option<&DispatchQueue>) {
    loop {
        if let Some(queue) = queue {
            queue.run_pending();
        }
        if !player.is_active() {
            warn!("Engine stopped ({:?})", player.exit_status());
            return;
        }

        let line = match lines.recv_timeout(POLL_INTERVAL) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return,
        };

        match console::parse_line(&line) {
            Ok(Some(ConsoleCommand::Exit)) => return,
            Ok(Some(command)) => {
                let status = console::execute(&command, player);
                if status.is_failure() {
                    eprintln!("ERROR: {} ({})", status, status.code());
                }
            }
            Ok(None) => {}
            Err(e) => eprintln!("ERROR: {}", e),
        }
    }
}
