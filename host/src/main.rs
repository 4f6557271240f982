//! Operator tool for the quadruped pose link.
//!
//! - `console`: interactive pose editing (default)
//! - `send`: send one stored pose
//! - `list`: print the stored poses
//! - `play`: run a routine such as `wave`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use quadruped_host::{console, HostConfig, Session, SerialTransport};

/// Quadruped pose link host
#[derive(Parser, Debug)]
#[command(name = "pose_host")]
#[command(about = "Edit, store and send quadruped servo poses")]
#[command(version)]
struct Args {
    /// Host configuration file (TOML)
    #[arg(short, long, global = true, default_value = "quadruped.toml")]
    config: PathBuf,

    /// Serial device, overrides the config file
    #[arg(short, long, global = true)]
    port: Option<String>,

    /// Pose file, overrides the config file
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive pose console
    Console,

    /// Send a stored pose to the controller
    Send {
        /// Pose name
        name: String,
    },

    /// List stored poses
    List,

    /// Play a routine (stand, sit, wave or one from the config file)
    Play {
        /// Routine name
        routine: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = HostConfig::open(&args.config)?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(store) = args.store {
        config.store_path = store;
    }
    info!(
        "Port {} at {} baud, poses in {}",
        config.port,
        config.baud_rate,
        config.store_path.display()
    );

    let transport = SerialTransport::new(&config.port, config.baud_rate);
    let mut session = Session::open(&config.store_path, config.routines, transport)
        .context("Couldn't open the pose store")?;

    match args.command.unwrap_or(Command::Console) {
        Command::Console => console::run(&mut session)?,
        Command::Send { name } => {
            session.load(&name)?;
            session.update()?;
        }
        Command::List => {
            for (name, pose) in session.store().iter() {
                println!("{name:<16} {pose}");
            }
        }
        Command::Play { routine } => {
            let sent = session.play(&routine, std::thread::sleep)?;
            info!("{routine}: sent {sent} poses");
        }
    }
    Ok(())
}
