//! emsprobe: inspection and conformance client for the media-device control
//! protocol (JSON over WebSocket).
//!
//! - `run`     replay fixtures, one PASS/FAIL line each, non-zero exit on failure
//! - `probe`   check that the endpoint accepts a connection
//! - `send`    send one message and dump the event log
//! - `catalog` list the built-in example requests

use std::pin::pin;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use tokio::time::{Duration, Instant};
use tracing_subscriber::{fmt, EnvFilter};

use emsprobe_client::{app_state::AppState, config, Session};
use emsprobe_core::protocol::catalog;
use emsprobe_core::Result;

#[derive(Parser)]
#[command(name = "emsprobe", about = "Inspect and conformance-test a media device control endpoint")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// YAML config file (endpoint, timeouts, fixtures).
    #[arg(long, global = true, env = "EMSPROBE_CONFIG")]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay every fixture and report PASS/FAIL per fixture.
    Run {
        /// Endpoint URL (overrides the config).
        endpoint: Option<String>,
        /// YAML file with a `fixtures:` list (overrides the config).
        #[arg(long)]
        fixtures: Option<String>,
    },
    /// Open a connection and close it again.
    Probe {
        endpoint: Option<String>,
    },
    /// Send one message verbatim and print the event log.
    Send {
        endpoint: String,
        message: String,
        /// How long to collect responses after sending.
        #[arg(long, default_value_t = 2000)]
        wait_ms: u64,
    },
    /// List the built-in example requests.
    Catalog {
        /// Print the pretty request text as well.
        #[arg(long)]
        full: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(code = e.code().as_str(), error = %e, "emsprobe failed");
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

async fn dispatch(cli: Cli) -> Result<ExitCode> {
    let cfg = match &cli.config {
        Some(path) => config::load_from_file(path)?,
        None => config::ProbeConfig::default(),
    };

    match cli.command {
        Commands::Run { endpoint, fixtures } => {
            let app = AppState::new(cfg, endpoint, fixtures)?;
            run_fixtures(&app).await
        }
        Commands::Probe { endpoint } => {
            let app = AppState::new(cfg, endpoint, None)?;
            let mut session = app.session();
            app.runner().probe(&mut session).await?;
            println!("OPEN {}", app.endpoint());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Send {
            endpoint,
            message,
            wait_ms,
        } => {
            let app = AppState::new(cfg, Some(endpoint), None)?;
            send_and_dump(&app, message, Duration::from_millis(wait_ms)).await
        }
        Commands::Catalog { full } => {
            for entry in catalog::builtin() {
                println!("{:>3}  {}", entry.index, entry.label);
                if full {
                    println!("{}", entry.pretty());
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_fixtures(app: &AppState) -> Result<ExitCode> {
    let fixtures = app.fixtures()?;
    let runner = app.runner();
    let mut session = app.session();

    tracing::info!(endpoint = runner.endpoint(), count = fixtures.len(), "running fixtures");

    let mut failed = 0usize;
    let mut results = pin!(runner.run(&mut session, &fixtures));
    while let Some(result) = results.next().await {
        if !result.pass {
            failed += 1;
        }
        println!("{result}");
    }

    println!("{} passed, {failed} failed", fixtures.len() - failed);
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn send_and_dump(app: &AppState, message: String, wait: Duration) -> Result<ExitCode> {
    let mut session: Session = app.session();
    let handle = session.connect(app.endpoint());

    let open_deadline = Instant::now() + app.cfg().timeouts.connect();
    let opened = loop {
        match session.next_event_until(open_deadline, "connection open").await {
            Ok(ev) if ev.connection == handle.id() && ev.state.is_terminal() => break false,
            Ok(ev) if ev.kind == emsprobe_client::EventKind::Connected => break true,
            Ok(_) => continue,
            Err(e) => {
                session.note_error(Some(handle.id()), e.to_string());
                break false;
            }
        }
    };

    // Sending on a closed connection is still attempted so the refusal is logged.
    let sent = match session.send_authored(&handle, &message) {
        Ok(authored) => {
            if let Some(e) = authored.parse_error {
                eprintln!("warning: message sent as-is: {e}");
            }
            true
        }
        Err(_) => false,
    };
    if opened && sent {
        session.drain_until(Instant::now() + wait).await;
    }
    session
        .close(&handle, app.cfg().timeouts.close() * 2)
        .await;

    for entry in session.log().iter() {
        println!("[{}] {:<12} {}", entry.id, entry.kind.as_str(), entry.label);
        println!("{}", entry.pretty());
    }

    Ok(if opened && sent {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
