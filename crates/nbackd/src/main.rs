//! N-back Daemon - hosts a timer-driven N-back session for UI clients
//!
//! The daemon owns the session and its round timer; clients (grid renderer,
//! input buttons) talk to it over newline-delimited JSON on TCP:
//! - Configure / Start / Stop / Toggle the session
//! - Declare match / no-match per modality
//! - Read state snapshots for rendering
//!
//! Config location: `$NBACKD_CONFIG`, else `<OS config dir>/nback/config.json`.

use nback::{SessionConfig, Trainer};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::time;
use tracing::{error, info, warn};

mod config;
mod protocol;

use config::DaemonConfig;
use protocol::{handle_request, Request, Response};

async fn handle_client(
    stream: TcpStream,
    trainer: Trainer,
) -> Result<(), Box<dyn std::error::Error>> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let request: Request = match serde_json::from_str(&line) {
            Ok(req) => req,
            Err(e) => {
                let resp = Response::Error {
                    message: format!("Invalid request: {}", e),
                };
                writer
                    .write_all(serde_json::to_string(&resp)?.as_bytes())
                    .await?;
                writer.write_all(b"\n").await?;
                continue;
            }
        };

        let shutdown = matches!(request, Request::Shutdown);
        let response = handle_request(&trainer, request);

        writer
            .write_all(serde_json::to_string(&response)?.as_bytes())
            .await?;
        writer.write_all(b"\n").await?;

        if shutdown {
            tokio::spawn(async {
                // Give the response a moment to flush before exiting.
                time::sleep(Duration::from_millis(50)).await;
                std::process::exit(0);
            });
        }
    }

    Ok(())
}

fn initial_trainer(session: SessionConfig) -> Result<Trainer, nback::NBackError> {
    match Trainer::configure(session) {
        Ok(t) => Ok(t),
        Err(e) => {
            warn!("Configured session rejected ({}); using defaults", e);
            Trainer::configure(SessionConfig::default())
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Main
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = match config::config_path() {
        Ok(path) => DaemonConfig::load(&path),
        Err(e) => {
            warn!("{}; using defaults", e);
            DaemonConfig::default()
        }
    }
    .with_env_overrides();

    let trainer = initial_trainer(config.session.clone())?;

    // Stop the timer cleanly on Ctrl-C.
    {
        let trainer = trainer.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                trainer.stop();
                info!("Ctrl-C: session stopped");
                std::process::exit(0);
            }
        });
    }

    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!("N-back daemon listening on {}", config.listen_addr);

    // Accept client connections
    loop {
        let (stream, addr) = listener.accept().await?;
        info!("Client connected: {}", addr);
        let trainer = trainer.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, trainer).await {
                error!("Client handler error: {}", e);
            }
        });
    }
}
