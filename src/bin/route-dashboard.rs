use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use route_insights::api::client::Client;
use route_insights::dashboard::{Command, Dashboard, Flow, SessionStore};

const SESSION_FILE: &str = ".route-insights-session";

/// Terminal dashboard for planned vs actual route analysis.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// API root of the route analysis service.
    #[arg(long, env = "API_BASE", default_value = "http://localhost:8000/api/v1")]
    api_base: String,

    /// File remembering the logged-in user. Defaults to ~/.route-insights-session.
    #[arg(long, env = "DASHBOARD_SESSION")]
    session: Option<PathBuf>,
}

fn default_session_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(SESSION_FILE)
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run(Args::parse()).await {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()
}

async fn run(args: Args) -> anyhow::Result<()> {
    let client = Client::new(&args.api_base)?;
    if let Err(e) = client.health().await {
        log::warn!("service at {} is not reachable: {e:#}", client.base());
    }

    let session = SessionStore::new(args.session.unwrap_or_else(default_session_path));

    let mut dashboard = Dashboard::new(client, session)?;
    if dashboard.username().is_some() {
        dashboard.load().await;
    }

    println!("{}", dashboard.render());
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            prompt()?;
            continue;
        }

        match line.parse::<Command>() {
            Ok(command) => {
                if dashboard.handle(command).await == Flow::Quit {
                    break;
                }
                println!("{}", dashboard.render());
            }
            Err(e) => println!("{e} (try `help`)"),
        }

        prompt()?;
    }

    Ok(())
}
