use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use log::{error, info, warn};

use horde_survival::config::GameConfig;
use horde_survival::game::Game;
use horde_survival::input::ScriptedInput;
use horde_survival::net::{NetSession, UdpLink};
use horde_survival::rendering::{OutputTarget, ScreenBuffer};
use horde_survival::world::World;

#[derive(Parser, Debug)]
#[command(name = "horde-survival", about = "Top-down survival against endless waves")]
struct Args {
    /// Run headless with scripted input, logging the final screen.
    #[arg(long)]
    debug: bool,

    /// Screen width in debug mode.
    #[arg(long, default_value_t = 80)]
    width: u16,

    /// Screen height in debug mode.
    #[arg(long, default_value_t = 24)]
    height: u16,

    /// Stop after this many frames.
    #[arg(long)]
    frames: Option<u64>,

    /// Seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file overriding gameplay tunables.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Local address for the peer link.
    #[arg(long, default_value = "0.0.0.0:0")]
    bind: SocketAddr,

    /// Peer to exchange snapshots with; omit for single-player.
    #[arg(long)]
    peer: Option<SocketAddr>,

    #[arg(long, default_value = "horde-survival.log")]
    log_file: PathBuf,
}

fn load_config(path: Option<&PathBuf>) -> GameConfig {
    let Some(path) = path else {
        return GameConfig::default();
    };
    match GameConfig::load(path) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("Ignoring config {}: {}; using defaults", path.display(), e);
            GameConfig::default()
        }
    }
}

fn connect(args: &Args, local_id: u64, peer_timeout: f64) -> NetSession {
    let Some(peer) = args.peer else {
        return NetSession::offline();
    };
    match UdpLink::connect(args.bind, peer) {
        Ok(link) => {
            info!("Exchanging snapshots with {} as player {}", peer, local_id);
            NetSession::new(Box::new(link), local_id, peer_timeout)
        }
        Err(e) => {
            warn!("Could not open peer link ({}); playing single-player", e);
            NetSession::offline()
        }
    }
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    simple_logging::log_to_file(&args.log_file, log::LevelFilter::Info)?;
    info!("Starting horde-survival.");

    let config = load_config(args.config.as_ref());
    let world = match args.seed {
        Some(seed) => {
            info!("Using seed {}", seed);
            World::new(config.clone(), seed)
        }
        None => World::from_entropy(config.clone()),
    };
    let local_id = u64::from(std::process::id());
    let net = connect(&args, local_id, config.peer_timeout);

    let (terminal_width, terminal_height, mut stdout_target, scripted_input) = if args.debug {
        info!("Debug mode enabled at {}x{}", args.width, args.height);
        (
            args.width,
            args.height,
            OutputTarget::ScreenBuffer(ScreenBuffer::new(args.width, args.height)),
            Some(ScriptedInput::demo()),
        )
    } else {
        enable_raw_mode().map_err(|e| { error!("Failed to enable raw mode: {}", e); e })?;
        let (width, height) = size().map_err(|e| { error!("Failed to get terminal size: {}", e); e })?;
        info!("Terminal size: {}x{}", width, height);
        (width, height, OutputTarget::Stdout(io::stdout()), None)
    };

    stdout_target.execute_other_command(Hide)?;
    stdout_target.flush()?;

    let mut game = Game::new(world, net, terminal_width, terminal_height, stdout_target, scripted_input, args.frames);
    let result = game.run();
    if let Err(e) = &result {
        error!("Game loop failed: {}", e);
    }

    if !args.debug {
        game.stdout_target.execute_other_command(Show)?;
        disable_raw_mode().map_err(|e| { error!("Failed to disable raw mode: {}", e); e })?;
    }
    info!("Exiting horde-survival.");
    result
}
