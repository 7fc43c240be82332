//! Binary entrypoint for the builderport CLI.
//!
//! Commands:
//! - `init` - create a starter `builderport.toml`
//! - `zones` - list zones and builder vocabularies
//! - `room <vnum>` - fetch one room snapshot
//! - `set-name <vnum> <name>` / `set-desc <vnum> <desc>` - transactional patch
//! - `link <from> <dir> <to> [--one-way]` - create or remove an exit
//! - `validate <zones>...` / `export <zones>...` - server-side zone checks
//!
//! See the library crate docs for module-level details: `builderport::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use builderport::client::Session;
use builderport::config::{discover_token, Config};
use builderport::world::{parse_direction, LinkMode, RoomPatch};

#[derive(Parser)]
#[command(name = "builderport")]
#[command(about = "Client for the MikkiMUD builder port world-editing protocol")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "builderport.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new configuration file
    Init,
    /// List zones, sector types, room flags, and special functions
    Zones {
        /// Emit machine-readable JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Fetch one room by vnum
    Room {
        vnum: i32,
        /// Emit machine-readable JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Rename a room (transactional)
    SetName { vnum: i32, name: String },
    /// Replace a room's description (transactional)
    SetDesc { vnum: i32, desc: String },
    /// Create or remove an exit between rooms (transactional)
    Link {
        from: i32,
        /// Direction: 0-9, a compass name, or an abbreviation (n, ne, ...)
        dir: String,
        /// Destination vnum; -1 removes the exit
        to: i32,
        /// Exit flag bitfield
        #[arg(long, default_value_t = 0)]
        flags: i32,
        /// Key object vnum (-1 = no key)
        #[arg(long, default_value_t = -1)]
        key: i32,
        /// Only touch the forward exit (default is bidirectional)
        #[arg(long)]
        one_way: bool,
    },
    /// Run server-side validation over the given zones
    Validate {
        #[arg(required = true)]
        zones: Vec<i32>,
    },
    /// Persist the given zones to disk (refused on validation failure)
    Export {
        #[arg(required = true)]
        zones: Vec<i32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Init => {
            Config::create_default(&cli.config).await?;
            println!("Wrote default configuration to {}", cli.config);
            return Ok(());
        }
        Commands::Zones { json } => {
            let mut session = open_session(&config).await?;
            let catalog = session.list_zones().await?;
            session.disconnect().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            } else {
                for zone in &catalog.zones {
                    println!("{:>5}  {}", zone.vnum, zone.name);
                }
                println!("{} zones", catalog.count);
            }
        }
        Commands::Room { vnum, json } => {
            let mut session = open_session(&config).await?;
            let room = session.get_room(vnum).await?;
            session.disconnect().await;
            match room {
                None => {
                    warn!("room {} not found", vnum);
                    println!("Room {vnum} not found");
                }
                Some(room) if json => println!("{}", serde_json::to_string_pretty(&room)?),
                Some(room) => {
                    println!("[{}] {} (zone {}, sector {})", room.vnum, room.name, room.zone, room.sector);
                    println!("{}", room.description);
                    for exit in &room.exits {
                        println!("  {} -> {}", exit.direction_name, exit.to_vnum);
                    }
                    if let Some(func) = &room.special_function {
                        println!("  specfunc: {func}");
                    }
                }
            }
        }
        Commands::SetName { vnum, name } => {
            let patch = RoomPatch::default().name(name);
            run_patch(&config, vnum, patch).await?;
        }
        Commands::SetDesc { vnum, desc } => {
            let patch = RoomPatch::default().description(desc);
            run_patch(&config, vnum, patch).await?;
        }
        Commands::Link {
            from,
            dir,
            to,
            flags,
            key,
            one_way,
        } => {
            let direction =
                parse_direction(&dir).ok_or_else(|| anyhow!("unknown direction: {dir}"))?;
            let mode = if one_way {
                LinkMode::Oneway
            } else {
                LinkMode::Bidir
            };
            let mut session = open_session(&config).await?;
            let zones = if to >= 0 && !one_way {
                dedup_zones(&[from / 100, to / 100])
            } else {
                vec![from / 100]
            };
            let mut tx = session.transaction(&zones).await?;
            let outcome = tx
                .link_rooms(from, direction, to, flags, key, "", "", mode)
                .await;
            tx.finish(outcome).await?;
            session.disconnect().await;
            info!("linked {} {} {} ({:?})", from, dir, to, mode);
        }
        Commands::Validate { zones } => {
            let mut session = open_session(&config).await?;
            let mut tx = session.transaction(&zones).await?;
            let outcome = tx.validate(&zones).await;
            tx.finish(outcome).await?;
            session.disconnect().await;
            println!("Validation passed for zones {:?}", zones);
        }
        Commands::Export { zones } => {
            let mut session = open_session(&config).await?;
            let mut tx = session.transaction(&zones).await?;
            let outcome = tx.export(&zones).await;
            tx.finish(outcome).await?;
            session.disconnect().await;
            println!("Exported zones {:?}", zones);
        }
    }

    Ok(())
}

/// Connect and authenticate using config plus token discovery.
async fn open_session(config: &Option<Config>) -> Result<Session> {
    let config = config.clone().unwrap_or_default();
    let token = discover_token(&config.auth)
        .ok_or_else(|| anyhow!("no builder port token found (config, env, or token file)"))?;
    let mut session = Session::new(config.server.host, config.server.port, token);
    session.connect().await?;
    Ok(session)
}

async fn run_patch(config: &Option<Config>, vnum: i32, patch: RoomPatch) -> Result<()> {
    let mut session = open_session(config).await?;
    let mut tx = session.transaction(&[vnum / 100]).await?;
    let outcome = tx.room_patch(vnum, &patch).await;
    tx.finish(outcome).await?;
    session.disconnect().await;
    println!("Room {vnum} updated");
    Ok(())
}

fn dedup_zones(zones: &[i32]) -> Vec<i32> {
    let mut out: Vec<i32> = zones.to_vec();
    out.sort_unstable();
    out.dedup();
    out
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // Base level from CLI verbosity overrides config
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);
    if let Some(cfg) = config {
        if let Some(ref file) = cfg.logging.file {
            if let Ok(f) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
            {
                let mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
                let write_mutex = mutex.clone();

                // If stdout is a terminal, mirror log lines to the console
                let is_tty = atty::is(atty::Stream::Stdout);

                builder.format(move |fmt, record| {
                    let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                    let line = format!("{} [{}] {}", ts, record.level(), record.args());

                    if let Ok(mut guard) = write_mutex.lock() {
                        let _ = writeln!(guard, "{}", line);
                    }
                    if is_tty {
                        writeln!(fmt, "{}", line)?;
                    }
                    Ok(())
                });
            }
        }
    }
    let _ = builder.try_init();
}
