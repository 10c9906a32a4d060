use anyhow::{Context, Result};
use boomfeed::config::Config;
use boomfeed::controller::Controller;
use boomfeed::feed::load_trigger;
use boomfeed::session::Session;
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

mod app;
mod ui;

use app::{App, AppEvent};

/// Get the config directory path (~/.config/boomfeed/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("boomfeed");
    Ok(config_dir)
}

/// Create the config directory if needed and restrict it to the current user.
fn prepare_config_dir(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir).context("Failed to create config directory")?;
        tracing::info!(path = %config_dir.display(), "Created config directory");
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(config_dir, perms) {
                    tracing::warn!(
                        path = %config_dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_dir.display(),
                    error = %e,
                    "Failed to read config directory metadata"
                );
            }
        }
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(
    name = "boomfeed",
    about = "Terminal client for a paid video feed: browse, buy, gift and comment"
)]
struct Args {
    /// Config file (default: ~/.config/boomfeed/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the service base URL from the config file
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Store a bearer token from the web login and exit
    #[arg(long, value_name = "TOKEN")]
    set_token: Option<String>,

    /// User id stored alongside --set-token; marks your own comments
    #[arg(long, value_name = "ID", requires = "set_token")]
    user_id: Option<String>,

    /// Forget the stored token and exit
    #[arg(long, conflicts_with = "set_token")]
    logout: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    prepare_config_dir(&config_dir)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if let Some(url) = args.api_url {
        config.api_base_url = url;
    }

    let session_path = config_dir.join("session.toml");
    let session = Session::load(&session_path)
        .with_context(|| format!("Failed to load session from {}", session_path.display()))?;

    if let Some(token) = args.set_token.as_deref() {
        let token = token.trim();
        if token.is_empty() {
            anyhow::bail!("--set-token requires a non-empty token");
        }
        session
            .set(token, args.user_id.as_deref())
            .context("Failed to save session")?;
        println!("Logged in. Token saved to {}", session_path.display());
        return Ok(());
    }

    if args.logout {
        session.clear().context("Failed to clear session")?;
        println!("Logged out.");
        return Ok(());
    }

    if !session.is_logged_in() {
        tracing::info!("Starting without a session; purchases, gifts and comments are disabled");
    }

    let controller = Controller::new(&config, session).context("Failed to create API client")?;
    let (trigger, signals) = load_trigger(config.load_ahead);
    let mut app = App::new(controller, trigger);

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, signals, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
