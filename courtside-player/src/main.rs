//! Courtside demo player - main entry point
//!
//! Headless demonstration of the playback controller: stages a commentary
//! payload in a session store the way the host page would, wires simulated
//! primary/secondary streams, and plays the session from the terminal.
//! Lines typed on stdin are routed as keyboard input (`k`, `j`, `l`, `m`,
//! `left`, `right`, `up`, `down`, `home`, `end`, digits).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use courtside_common::events::{PlayerEvent, TransportState};
use courtside_common::{time, SyncTuning};
use courtside_player::input::{InputRouter, Key};
use courtside_player::playback::sim::SimulatedStream;
use courtside_player::playback::{StreamEvent, StreamHandle, StreamRole, SyncEngine};
use courtside_player::session::{keys, CommentaryPayload, MemorySessionStore, SessionSnapshot};
use courtside_player::state::SharedState;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for the demo player
#[derive(Parser, Debug)]
#[command(name = "courtside-player")]
#[command(about = "Headless demo of the courtside dual-stream playback controller")]
#[command(version)]
struct Args {
    /// Commentary text file to parse into a cue timeline
    commentary: PathBuf,

    /// Simulated primary (video) stream duration in seconds
    #[arg(long, default_value = "120")]
    video_secs: f64,

    /// Simulated commentary audio duration in seconds (omit for text-only)
    #[arg(long)]
    audio_secs: Option<f64>,

    /// Tuning parameter file (TOML)
    #[arg(long)]
    tuning: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courtside_player=info,courtside_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let tuning = SyncTuning::resolve(args.tuning.as_deref());

    // Stage the session the way the host page would: keyed blobs written
    // before mount, read back exactly once here.
    let commentary_text = std::fs::read_to_string(&args.commentary)
        .with_context(|| format!("Failed to read {}", args.commentary.display()))?;
    let staged = CommentaryPayload {
        job_id: Some(uuid::Uuid::new_v4()),
        commentary_text,
        audio_url: args.audio_secs.map(|_| "sim://commentary".to_string()),
    };
    let store = MemorySessionStore::new();
    store.insert(keys::PRIMARY_MEDIA_URL, "sim://match-video");
    store.insert(
        keys::COMMENTARY_PAYLOAD,
        &serde_json::to_string(&staged).context("Failed to encode commentary payload")?,
    );

    let snapshot = SessionSnapshot::load(&store);
    let payload = snapshot
        .payload
        .context("Session held no commentary payload")?;
    info!(
        "Session: video={} commentary_audio={}",
        snapshot.primary_media_url.as_deref().unwrap_or("(none)"),
        payload.audio_url.as_deref().unwrap_or("(none)")
    );

    let primary = Arc::new(SimulatedStream::new(args.video_secs));
    let secondary = payload
        .audio_url
        .as_ref()
        .map(|_| Arc::new(SimulatedStream::new(args.audio_secs.unwrap_or(args.video_secs))));

    let state = Arc::new(SharedState::new());
    let engine = Arc::new(SyncEngine::new(
        Arc::clone(&primary),
        secondary,
        Arc::clone(&state),
        tuning,
    ));
    let router = InputRouter::new(Arc::clone(&engine));

    engine.load_commentary(&payload).await;
    engine.start().await;

    // Simulated metadata is available immediately
    engine
        .handle_stream_event(
            StreamRole::Primary,
            StreamEvent::MetadataReady {
                duration_secs: args.video_secs,
            },
        )
        .await;
    engine.toggle_play().await;

    // Forward simulated positions into the engine the way a host media
    // layer would fire timeupdate callbacks
    let mut pump = {
        let engine = Arc::clone(&engine);
        let primary = Arc::clone(&primary);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(Duration::from_millis(250));
            loop {
                tick.tick().await;
                let position_secs = primary.position().await;
                let duration_secs = primary.duration().await;
                engine
                    .handle_stream_event(
                        StreamRole::Primary,
                        StreamEvent::PositionUpdate {
                            position_secs,
                            duration_secs,
                        },
                    )
                    .await;
                if primary.ended().await {
                    engine
                        .handle_stream_event(StreamRole::Primary, StreamEvent::Ended)
                        .await;
                    break;
                }
            }
        })
    };

    let mut events = state.subscribe_events();
    let mut stdin_lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = &mut pump => {
                info!("Primary stream finished");
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
            line = stdin_lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => {
                        match parse_key(&line) {
                            Some(key) => router.handle_key(key, false).await,
                            None if line.trim().is_empty() => {}
                            None => warn!("Unrecognized key: {:?}", line.trim()),
                        }
                    }
                    // Stdin closed; keep playing without interactive input
                    Ok(None) => stdin_open = false,
                    Err(e) => {
                        warn!("stdin error: {}", e);
                        stdin_open = false;
                    }
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => report_event(&engine, event).await,
                    Err(RecvError::Lagged(missed)) => warn!("Dropped {} events", missed),
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    engine.stop().await;
    Ok(())
}

/// Map a typed command to a key event
fn parse_key(input: &str) -> Option<Key> {
    let input = input.trim().to_lowercase();
    match input.as_str() {
        "space" => Some(Key::Space),
        "k" => Some(Key::KeyK),
        "j" => Some(Key::KeyJ),
        "l" => Some(Key::KeyL),
        "m" => Some(Key::KeyM),
        "f" => Some(Key::KeyF),
        "left" => Some(Key::ArrowLeft),
        "right" => Some(Key::ArrowRight),
        "up" => Some(Key::ArrowUp),
        "down" => Some(Key::ArrowDown),
        "home" => Some(Key::Home),
        "end" => Some(Key::End),
        _ => {
            let mut chars = input.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_digit() => Some(Key::Digit(c as u8 - b'0')),
                _ => None,
            }
        }
    }
}

/// Log the events a UI layer would render
async fn report_event(engine: &SyncEngine<SimulatedStream>, event: PlayerEvent) {
    match event {
        PlayerEvent::ActiveCueChanged {
            cue_index: Some(index),
            ..
        } => {
            if let Some(cue) = engine.cue(index).await {
                info!(
                    "[{}] ({}) {}",
                    time::format_clock(cue.timestamp_secs),
                    cue.category,
                    cue.text
                );
            }
        }
        PlayerEvent::TransportChanged { state, .. } => {
            if state == TransportState::Paused {
                let position = engine.state().position().await;
                info!("Paused at {}", time::format_clock(position));
            }
        }
        PlayerEvent::VolumeChanged { volume, muted, .. } => {
            info!("Volume {}%{}", volume, if muted { " (muted)" } else { "" });
        }
        PlayerEvent::MuteChanged { muted, .. } => {
            info!("{}", if muted { "Muted" } else { "Unmuted" });
        }
        PlayerEvent::FullscreenToggleRequested { .. } => {
            info!("Fullscreen toggle requested (no-op in the demo)");
        }
        _ => {}
    }
}
