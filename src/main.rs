//! Gaze keyboard: hands-free typing from a facial landmark stream.

use anyhow::{Context, Result};
use clap::Parser;
use gaze_keyboard::{
    app::{AppState, GazeKeyboardApp, Pacing},
    blink::RearmPolicy,
    chat::{EchoReplyService, HttpReplyService, ReplyService},
    config::{Config, EXAMPLE_CONFIG},
    cursor_control::{CursorSink, NullCursorSink, X11CursorSink},
    landmarks::ReplaySource,
    tracker::Tracker,
};
use log::{info, warn};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Recorded landmark trace to replay (JSON lines)
    #[arg(short, long)]
    replay: Option<String>,

    /// Reply backend base URL
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Echo messages locally instead of calling the backend
    #[arg(long)]
    offline: bool,

    /// Move the X11 pointer along with the gaze cursor
    #[arg(long)]
    x11_cursor: bool,

    /// Re-arm policy after a blink (refractory, reopen)
    #[arg(long)]
    rearm: Option<String>,

    /// Pace replayed frames at the target framerate
    #[arg(long)]
    realtime: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Print an example configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    info!("Gaze Keyboard");

    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    if let Some(endpoint) = args.endpoint {
        config.chat.endpoint = endpoint;
    }
    if args.offline {
        config.chat.offline = true;
    }
    if args.x11_cursor {
        config.cursor.x11_enabled = true;
    }
    if let Some(rearm) = &args.rearm {
        config.blink.rearm = rearm.parse::<RearmPolicy>()?;
    }
    config.validate()?;

    let replay = args
        .replay
        .context("No landmark source given; pass --replay <trace.jsonl>")?;

    let service: Box<dyn ReplyService> = if config.chat.offline {
        info!("Offline mode: replies are echoed locally");
        Box::new(EchoReplyService)
    } else {
        Box::new(HttpReplyService::from_config(&config.chat)?)
    };

    let cursor_sink: Box<dyn CursorSink> = if config.cursor.x11_enabled {
        match X11CursorSink::new(config.keyboard.viewport_width, config.keyboard.viewport_height) {
            Ok(sink) => {
                info!("X11 cursor control initialized");
                Box::new(sink)
            }
            Err(e) => {
                warn!("Failed to initialize cursor control: {}", e);
                Box::new(NullCursorSink)
            }
        }
    } else {
        Box::new(NullCursorSink)
    };

    let active = Arc::new(AtomicBool::new(true));
    {
        let active = Arc::clone(&active);
        ctrlc::set_handler(move || {
            info!("Deactivating hands-free input");
            active.store(false, Ordering::SeqCst);
        })
        .context("Failed to install Ctrl-C handler")?;
    }

    let pacing = if args.realtime { Pacing::Realtime } else { Pacing::Simulated };
    let mut app = GazeKeyboardApp::new(
        Tracker::from_config(&config),
        service,
        cursor_sink,
        config.display.target_fps,
        pacing,
    );

    let mut source = ReplaySource::new(&replay);
    let summary = app.run(&mut source, &active);

    if let AppState::Error(message) = app.state() {
        eprintln!("{message}");
    }
    let summary = summary?;

    for message in app.tracker().conversation().messages() {
        println!("{:?}: {}", message.from, message.text);
    }
    if !app.tracker().text().is_empty() {
        println!("Unsent: {}", app.tracker().text());
    }
    info!("{:?}", summary);

    Ok(())
}
