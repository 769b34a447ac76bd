// SPDX-License-Identifier: MIT OR Apache-2.0
//! `OrdoPlay` Sequence console
//!
//! A line-oriented front end over the sequence player:
//! - Transport control (play, pause, loop, speed, seek)
//! - Track and segment editing through the controllers
//! - Loading and saving shows
//! - Polling the sinks the console registers (`slot.float` .. `slot.vec4`, `events`)
//!
//! Set `ORDOPLAY_SEQUENCE_CONFIG` to point at a player config file and
//! `RUST_LOG` to adjust logging.

mod commands;
mod session;

use commands::Command;
use ordoplay_sequence::PlayerConfig;
use session::{Flow, Session};
use std::io::{BufRead, Write};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["ordoplay_sequence=info", "ordoplay_sequence_cli=info"] {
        if let Ok(directive) = directive.parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting OrdoPlay Sequence v{}", env!("CARGO_PKG_VERSION"));

    let config_path = PlayerConfig::path_from_env();
    let config = match PlayerConfig::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Ignoring config {}: {e}", config_path.display());
            PlayerConfig::default()
        }
    };

    let session = Session::new(config);
    if let Err(e) = session.player().init() {
        tracing::error!("Player failed to start: {e}");
        std::process::exit(1);
    }

    println!("Type 'help' for commands.");
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Input error: {e}");
                break;
            }
        };
        let result = Command::parse(&line)
            .and_then(|command| match command {
                Some(command) => session.execute(command, &mut stdout),
                None => Ok(Flow::Continue),
            });
        match result {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => eprintln!("{e}"),
        }
        let _ = stdout.flush();
    }

    session.player().shutdown();
    tracing::info!("Sequence console closed");
}
