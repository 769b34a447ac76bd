// SPDX-License-Identifier: MIT OR Apache-2.0
//! Line commands understood by the sequence console.
//!
//! Tracks and segments are addressed by their 1-based position as printed by
//! `list`.

use ordoplay_sequence::{CurveKind, SegmentValue, TrackFamily};

/// Error type for command parsing and execution
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Unknown command word
    #[error("Unknown command '{0}', try 'help'")]
    Unknown(String),

    /// Missing or malformed argument
    #[error("Usage: {0}")]
    Usage(&'static str),

    /// Track position out of range
    #[error("No track #{0}")]
    NoTrack(usize),

    /// Segment position out of range
    #[error("No segment #{0}")]
    NoSegment(usize),

    /// The edit was rejected
    #[error("Rejected: {0}")]
    Rejected(&'static str),

    /// Player failure
    #[error(transparent)]
    Player(#[from] ordoplay_sequence::PlayerError),

    /// Output failure
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

/// A parsed console command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the command list
    Help,
    /// Start playback
    Play,
    /// Stop and rewind
    Stop,
    /// Hold playback
    Pause,
    /// Resume playback
    Unpause,
    /// Toggle looping
    Loop(bool),
    /// Set the speed factor
    Speed(f64),
    /// Seek to a time
    Seek(f64),
    /// Advance the manual clock
    Tick(f64),
    /// Print the transport
    Status,
    /// Load a show
    Load(String),
    /// Save the show
    Save(String),
    /// Append a track
    NewTrack(TrackFamily, String),
    /// Remove a track
    DeleteTrack(usize),
    /// Rename a track
    Rename(usize, String),
    /// Insert a segment at a time
    InsertSegment(usize, f64),
    /// Delete a segment
    DeleteSegment(usize, usize),
    /// Add a text event
    Event(usize, f64, String),
    /// Change a segment's duration
    Duration(usize, usize, f64),
    /// Shift a segment's begin or end value
    Value(usize, usize, usize, SegmentValue, f32),
    /// Bind a track to a sink
    Bind(usize, String),
    /// Unbind a track
    Unbind(usize),
    /// Print the tracks
    List,
    /// Print the registered sinks
    Sinks,
    /// Print values and events the sinks received
    Poll,
    /// Leave the console
    Quit,
}

/// Command reference printed by `help`
pub const HELP: &str = "\
play | stop | pause | unpause | loop on|off | speed <factor> | seek <seconds>
tick <seconds>                  advance the manual clock
status | list | sinks | poll
load <show> | save <show>
new-track <float|vec2|vec3|vec4|event> [name]
delete-track <track> | rename <track> <name>
insert-segment <track> <seconds> | delete-segment <track> <segment>
event <track> <seconds> <text>
duration <track> <segment> <delta>
value <track> <segment> <curve> <begin|end> <delta>
bind <track> <sink> | unbind <track>
quit";

fn number<T: std::str::FromStr>(word: Option<&str>, usage: &'static str) -> Result<T, CommandError> {
    word.and_then(|w| w.parse().ok())
        .ok_or(CommandError::Usage(usage))
}

fn rest(words: &[&str]) -> String {
    words.join(" ")
}

impl Command {
    /// Parse one input line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        let arg = |i: usize| words.get(i).copied();

        let command = match words[0] {
            "help" => Self::Help,
            "play" => Self::Play,
            "stop" => Self::Stop,
            "pause" => Self::Pause,
            "unpause" | "resume" => Self::Unpause,
            "loop" => match arg(1) {
                Some("on") => Self::Loop(true),
                Some("off") => Self::Loop(false),
                _ => return Err(CommandError::Usage("loop on|off")),
            },
            "speed" => Self::Speed(number(arg(1), "speed <factor>")?),
            "seek" => Self::Seek(number(arg(1), "seek <seconds>")?),
            "tick" => Self::Tick(number(arg(1), "tick <seconds>")?),
            "status" => Self::Status,
            "load" => Self::Load(arg(1).ok_or(CommandError::Usage("load <show>"))?.to_string()),
            "save" => Self::Save(arg(1).ok_or(CommandError::Usage("save <show>"))?.to_string()),
            "new-track" => {
                const USAGE: &str = "new-track <float|vec2|vec3|vec4|event> [name]";
                let kind = arg(1).ok_or(CommandError::Usage(USAGE))?;
                let family = if kind.eq_ignore_ascii_case("event") {
                    TrackFamily::Event
                } else {
                    TrackFamily::Curve(CurveKind::from_name(kind).ok_or(CommandError::Usage(USAGE))?)
                };
                let name = match rest(&words[2..]) {
                    name if name.is_empty() => family.name().to_string(),
                    name => name,
                };
                Self::NewTrack(family, name)
            }
            "delete-track" => Self::DeleteTrack(number(arg(1), "delete-track <track>")?),
            "rename" => {
                let track = number(arg(1), "rename <track> <name>")?;
                if words.len() < 3 {
                    return Err(CommandError::Usage("rename <track> <name>"));
                }
                Self::Rename(track, rest(&words[2..]))
            }
            "insert-segment" => {
                const USAGE: &str = "insert-segment <track> <seconds>";
                Self::InsertSegment(number(arg(1), USAGE)?, number(arg(2), USAGE)?)
            }
            "delete-segment" => {
                const USAGE: &str = "delete-segment <track> <segment>";
                Self::DeleteSegment(number(arg(1), USAGE)?, number(arg(2), USAGE)?)
            }
            "event" => {
                const USAGE: &str = "event <track> <seconds> <text>";
                Self::Event(number(arg(1), USAGE)?, number(arg(2), USAGE)?, rest(&words[3.min(words.len())..]))
            }
            "duration" => {
                const USAGE: &str = "duration <track> <segment> <delta>";
                Self::Duration(
                    number(arg(1), USAGE)?,
                    number(arg(2), USAGE)?,
                    number(arg(3), USAGE)?,
                )
            }
            "value" => {
                const USAGE: &str = "value <track> <segment> <curve> <begin|end> <delta>";
                let which = match arg(4) {
                    Some("begin") => SegmentValue::Begin,
                    Some("end") => SegmentValue::End,
                    _ => return Err(CommandError::Usage(USAGE)),
                };
                Self::Value(
                    number(arg(1), USAGE)?,
                    number(arg(2), USAGE)?,
                    number(arg(3), USAGE)?,
                    which,
                    number(arg(5), USAGE)?,
                )
            }
            "bind" => {
                const USAGE: &str = "bind <track> <sink>";
                let track = number(arg(1), USAGE)?;
                Self::Bind(track, arg(2).ok_or(CommandError::Usage(USAGE))?.to_string())
            }
            "unbind" => Self::Unbind(number(arg(1), "unbind <track>")?),
            "list" => Self::List,
            "sinks" => Self::Sinks,
            "poll" => Self::Poll,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}
