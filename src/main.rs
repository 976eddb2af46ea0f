use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use frame_rooms::api::{HttpRoomsBackend, NeynarProfileClient, RoomSummary, RoomsBackend};
use frame_rooms::identity::{self, DesktopIdentity, IdentityProvider};
use frame_rooms::profiles::ProfileCache;
use frame_rooms::shared::config;
use frame_rooms::shared::text::{abbreviate_address, short_room_id};

#[derive(Debug, Clone, Parser)]
#[command(name = "frame-rooms")]
#[command(about = "Browse and share Farcaster audio rooms")]
struct Cli {
    /// Rooms backend; falls back to FRAME_ROOMS_BACKEND_URL.
    #[arg(long, global = true, env = "ROOMS_API_URL")]
    rooms_api_url: Option<String>,

    #[arg(long, global = true, env = "NEYNAR_API_URL", default_value = "https://api.neynar.com")]
    neynar_api_url: String,

    #[arg(long, global = true, env = "NEYNAR_API_KEY", hide_env_values = true)]
    neynar_api_key: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum Command {
    /// List live rooms once (default).
    Rooms,
    /// Keep polling the lobby.
    Watch {
        #[arg(long, default_value_t = 20)]
        interval_secs: u64,
    },
    /// Open the compose sheet for a room link.
    Share {
        room_id: String,
        title: Option<String>,
    },
    /// Show the local identity and its profile.
    Whoami,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    // The backend URL is only required by the lobby commands.
    match cli.command.clone().unwrap_or(Command::Rooms) {
        Command::Rooms => print_lobby(&backend_url(&cli)?),
        Command::Watch { interval_secs } => smol::block_on(watch_lobby(
            backend_url(&cli)?,
            Duration::from_secs(interval_secs.max(1)),
        )),
        Command::Share { room_id, title } => {
            identity::share_room(&DesktopIdentity::from_env(), &room_id, title.as_deref())
                .map_err(|e| anyhow!(e))
        }
        Command::Whoami => whoami(&cli),
    }
}

fn backend_url(cli: &Cli) -> Result<String> {
    match cli.rooms_api_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => Ok(url.to_string()),
        _ => config::rooms_backend_base_url().map_err(|e| anyhow!(e)),
    }
}

fn print_lobby(base_url: &str) -> Result<()> {
    let rooms = HttpRoomsBackend::new(base_url.to_string())
        .list_rooms()
        .map_err(|e| anyhow!(e))?;
    render_rooms(&rooms);
    Ok(())
}

async fn watch_lobby(base_url: String, interval: Duration) -> Result<()> {
    loop {
        let url = base_url.clone();
        let result = smol::unblock(move || HttpRoomsBackend::new(url).list_rooms()).await;
        match result {
            Ok(rooms) => render_rooms(&rooms),
            Err(err) => log::warn!("[Rooms] lobby refresh failed: {err}"),
        }
        smol::Timer::after(interval).await;
    }
}

fn render_rooms(rooms: &[RoomSummary]) {
    let live: Vec<&RoomSummary> = rooms.iter().filter(|room| room.is_live()).collect();
    if live.is_empty() {
        println!("No live rooms.");
        return;
    }
    for room in live {
        let host = room
            .creator_address
            .as_deref()
            .map(abbreviate_address)
            .or_else(|| room.creator_fid.map(|fid| format!("fid:{fid}")))
            .unwrap_or_else(|| "unknown host".to_string());
        println!(
            "{:<12} {:>3} listening  {}  ({})",
            short_room_id(&room.room_id),
            room.participant_count,
            room.title.as_deref().unwrap_or("Untitled room"),
            host
        );
    }
}

fn whoami(cli: &Cli) -> Result<()> {
    let provider = DesktopIdentity::from_env();
    let Some(api_key) = cli
        .neynar_api_key
        .clone()
        .filter(|key| !key.trim().is_empty())
    else {
        println!(
            "fid={:?} address={:?} (set NEYNAR_API_KEY for profile details)",
            provider.fid(),
            provider.wallet_address()
        );
        return Ok(());
    };
    let mut cache = ProfileCache::new(NeynarProfileClient::new(
        cli.neynar_api_url.clone(),
        api_key,
    ));
    let identity = identity::resolve_local_identity(&provider, &mut cache, Instant::now());
    println!("fid={:?} address={:?}", identity.fid, identity.address);
    if let Some(profile) = identity.profile {
        println!(
            "@{} {}",
            profile.username,
            profile.display_name.unwrap_or_default()
        );
    }
    Ok(())
}
