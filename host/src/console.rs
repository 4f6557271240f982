//! Interactive operator console.
//!
//! Each input line is parsed into a [`ConsoleCommand`] and executed against
//! the [`Session`] before the next line is read.
use std::io::{self, Write};
use std::time::Duration;

use log::{error, info};
use quadruped_link::robot::{Joint, Leg};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use thiserror::Error;

use crate::session::{Session, SessionError};
use crate::transport::PoseSink;

const PROMPT: &str = "pose> ";

const HELP: &str = "\
show                         print the current pose
set <channel> <angle>        set channel 0-7 (0-180 degrees)
set <leg> <joint> <angle>    set a joint, e.g. `set fl knee 120` or `set 3 hip 45`
save <name>                  store the current pose and write the pose file
load <name>                  make a stored pose current (not sent)
delete <name>                remove a stored pose
list                         list stored poses
update                       send the current pose to the controller
stand | sit | wave           play the routine of that name
play <routine>               play any configured routine
routines                     list configured routines
quit                         leave the console";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Channel(usize),
    Joint(Leg, Joint),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Show,
    Set { target: Target, angle: i32 },
    Save(String),
    Load(String),
    Delete(String),
    List,
    Update,
    Play(String),
    Routines,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseConsoleError {
    #[error("Unknown command {0:?}, try `help`")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

impl TryFrom<&str> for ConsoleCommand {
    type Error = ParseConsoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim();
        let (cmd, rest) = value
            .split_once(char::is_whitespace)
            .map(|(cmd, rest)| (cmd, rest.trim()))
            .unwrap_or((value, ""));

        let name = |usage| {
            if rest.is_empty() {
                Err(ParseConsoleError::Usage(usage))
            } else {
                Ok(rest.to_string())
            }
        };

        match cmd {
            "show" | "s" => Ok(ConsoleCommand::Show),
            "set" => parse_set(rest),
            "save" => name("save <name>").map(ConsoleCommand::Save),
            "load" => name("load <name>").map(ConsoleCommand::Load),
            "delete" | "rm" => name("delete <name>").map(ConsoleCommand::Delete),
            "list" | "ls" => Ok(ConsoleCommand::List),
            "update" | "u" => Ok(ConsoleCommand::Update),
            "stand" | "sit" | "wave" => Ok(ConsoleCommand::Play(cmd.to_string())),
            "play" => name("play <routine>").map(ConsoleCommand::Play),
            "routines" => Ok(ConsoleCommand::Routines),
            "help" | "?" => Ok(ConsoleCommand::Help),
            "quit" | "exit" | "q" => Ok(ConsoleCommand::Quit),
            other => Err(ParseConsoleError::Unknown(other.to_string())),
        }
    }
}

fn parse_set(args: &str) -> Result<ConsoleCommand, ParseConsoleError> {
    const USAGE: &str = "set <channel> <angle> | set <leg> <joint> <angle>";

    let tokens: Vec<&str> = args.split_whitespace().collect();
    let (target, angle) = match tokens.as_slice() {
        [channel, angle] => (channel.parse().ok().map(Target::Channel), angle),
        [leg, joint, angle] => {
            let target = match (Leg::try_from(*leg), Joint::try_from(*joint)) {
                (Ok(leg), Ok(joint)) => Some(Target::Joint(leg, joint)),
                _ => None,
            };
            (target, angle)
        }
        _ => (None, &""),
    };

    match (target, angle.parse()) {
        (Some(target), Ok(angle)) => Ok(ConsoleCommand::Set { target, angle }),
        _ => Err(ParseConsoleError::Usage(USAGE)),
    }
}

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Console output failed: {0}")]
    Output(#[from] io::Error),

    #[error("Console input failed: {0}")]
    Input(#[from] ReadlineError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Runs one command, writing operator feedback to `out`.
///
/// `wait` is called with each routine step's hold time.
pub fn execute<S, W, F>(
    session: &mut Session<S>,
    command: ConsoleCommand,
    out: &mut W,
    wait: F,
) -> Result<Flow, ConsoleError>
where
    S: PoseSink,
    W: Write,
    F: FnMut(Duration),
{
    match command {
        ConsoleCommand::Show => write_pose(out, session)?,
        ConsoleCommand::Set { target, angle } => {
            let (label, angle) = match target {
                Target::Channel(channel) => {
                    (format!("channel {channel}"), session.set_channel(channel, angle)?)
                }
                Target::Joint(leg, joint) => {
                    (format!("{leg} {joint}"), session.set_joint(leg, joint, angle))
                }
            };
            writeln!(out, "{label} = {angle}")?;
        }
        ConsoleCommand::Save(name) => {
            session.save(&name)?;
            writeln!(out, "saved {name:?} to {}", session.store_path().display())?;
        }
        ConsoleCommand::Load(name) => {
            let pose = session.load(&name)?;
            writeln!(out, "loaded {name:?}: {pose}")?;
        }
        ConsoleCommand::Delete(name) => {
            session.delete(&name)?;
            writeln!(out, "deleted {name:?}")?;
        }
        ConsoleCommand::List => {
            if session.store().is_empty() {
                writeln!(out, "no stored poses")?;
            }
            for (name, pose) in session.store().iter() {
                writeln!(out, "{name:<16} {pose}")?;
            }
        }
        ConsoleCommand::Update => {
            session.update()?;
            writeln!(out, "sent {}", session.pose())?;
        }
        ConsoleCommand::Play(routine) => {
            let sent = session.play(&routine, wait)?;
            writeln!(out, "{routine}: sent {sent} poses")?;
        }
        ConsoleCommand::Routines => {
            for name in session.routine_names() {
                writeln!(out, "{name}")?;
            }
        }
        ConsoleCommand::Help => writeln!(out, "{HELP}")?,
        ConsoleCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

fn write_pose<S: PoseSink, W: Write>(out: &mut W, session: &Session<S>) -> io::Result<()> {
    let pose = session.pose();
    for leg in Leg::ALL {
        writeln!(
            out,
            "{:<14} knee {:>3}  hip {:>3}",
            leg.to_string(),
            pose[(leg, Joint::Knee)],
            pose[(leg, Joint::Hip)]
        )?;
    }
    writeln!(out, "wire: {pose}")
}

/// Reads operator commands until `quit`, Ctrl-C or Ctrl-D.
///
/// Session errors are reported and the console keeps running.
pub fn run<S: PoseSink>(session: &mut Session<S>) -> Result<(), ConsoleError> {
    let mut editor = DefaultEditor::new()?;
    let mut stdout = io::stdout();
    info!("Console ready, type `help` for commands");

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        if line.trim().is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(line.as_str());

        let command = match ConsoleCommand::try_from(line.as_str()) {
            Ok(command) => command,
            Err(e) => {
                writeln!(stdout, "{e}")?;
                continue;
            }
        };

        match execute(session, command, &mut stdout, std::thread::sleep) {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(ConsoleError::Session(e)) => {
                error!("{e}");
                writeln!(stdout, "error: {e}")?;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{sent_lines, session_in};
    use tempfile::tempdir;

    fn run_line<S: PoseSink>(session: &mut Session<S>, line: &str) -> String {
        let command = ConsoleCommand::try_from(line).unwrap();
        let mut out = Vec::new();
        execute(session, command, &mut out, |_| {}).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parse_commands() {
        assert_eq!(ConsoleCommand::try_from("show"), Ok(ConsoleCommand::Show));
        assert_eq!(
            ConsoleCommand::try_from("set 3 120"),
            Ok(ConsoleCommand::Set {
                target: Target::Channel(3),
                angle: 120
            })
        );
        assert_eq!(
            ConsoleCommand::try_from("set fr hip 45"),
            Ok(ConsoleCommand::Set {
                target: Target::Joint(Leg::FrontRight, Joint::Hip),
                angle: 45
            })
        );
        assert_eq!(
            ConsoleCommand::try_from("  save  high five "),
            Ok(ConsoleCommand::Save("high five".to_string()))
        );
        assert_eq!(
            ConsoleCommand::try_from("wave"),
            Ok(ConsoleCommand::Play("wave".to_string()))
        );
        assert_eq!(ConsoleCommand::try_from("exit"), Ok(ConsoleCommand::Quit));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            ConsoleCommand::try_from("jump"),
            Err(ParseConsoleError::Unknown("jump".to_string()))
        );
        assert!(matches!(
            ConsoleCommand::try_from("save"),
            Err(ParseConsoleError::Usage(_))
        ));
        assert!(matches!(
            ConsoleCommand::try_from("set 1"),
            Err(ParseConsoleError::Usage(_))
        ));
        assert!(matches!(
            ConsoleCommand::try_from("set 9 tail 10"),
            Err(ParseConsoleError::Usage(_))
        ));
        assert!(matches!(
            ConsoleCommand::try_from("set 1 ninety"),
            Err(ParseConsoleError::Usage(_))
        ));
    }

    #[test]
    fn edit_save_and_send() {
        let dir = tempdir().unwrap();
        let mut session = session_in(&dir);

        assert_eq!(run_line(&mut session, "set bl knee 30"), "Bottom left knee = 30\n");
        assert_eq!(run_line(&mut session, "set 0 999"), "channel 0 = 180\n");
        run_line(&mut session, "save stand");
        assert!(run_line(&mut session, "list").starts_with("stand"));

        run_line(&mut session, "update");
        assert_eq!(sent_lines(&session), vec!["180,90,30,90,90,90,90,90"]);
    }

    #[test]
    fn show_prints_every_leg() {
        let dir = tempdir().unwrap();
        let mut session = session_in(&dir);
        let shown = run_line(&mut session, "show");
        assert_eq!(shown.lines().count(), 5);
        assert!(shown.ends_with("wire: 90,90,90,90,90,90,90,90\n"));
    }

    #[test]
    fn missing_pose_is_a_session_error() {
        let dir = tempdir().unwrap();
        let mut session = session_in(&dir);
        let mut out = Vec::<u8>::new();
        let result = execute(
            &mut session,
            ConsoleCommand::Load("ghost".to_string()),
            &mut out,
            |_| {},
        );
        assert!(matches!(
            result,
            Err(ConsoleError::Session(SessionError::PoseNotFound(_)))
        ));
    }

    #[test]
    fn quit_stops_the_loop() {
        let dir = tempdir().unwrap();
        let mut session = session_in(&dir);
        let flow = execute(&mut session, ConsoleCommand::Quit, &mut Vec::<u8>::new(), |_| {});
        assert_eq!(flow.unwrap(), Flow::Quit);
    }
}
