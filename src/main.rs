mod client;
mod controller;
mod headless;
mod schedule;
mod ui;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;

use crate::client::HttpScheduleClient;
use crate::controller::PanelController;

#[derive(Parser, Debug)]
#[command(
    name = "teepanel",
    version,
    about = "Operator control panel for the tee-time scraper service"
)]
struct Cli {
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    api_url: String,

    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Fetch and print the current window and scraper status, then exit.
    #[arg(long)]
    probe: bool,

    #[arg(long)]
    toggle_pause: bool,

    #[arg(long)]
    check: bool,

    #[arg(long)]
    run_scraper: bool,

    #[arg(long, value_name = "YYYY-MM-DD")]
    set_date: Option<String>,

    #[arg(long, value_name = "HH:MM")]
    set_start: Option<String>,

    #[arg(long, value_name = "HH:MM")]
    set_end: Option<String>,
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    if cli.timeout_secs == 0 {
        bail!("--timeout-secs must be greater than zero");
    }
    let client = HttpScheduleClient::new(&cli.api_url, Duration::from_secs(cli.timeout_secs))?;

    let set_given = [&cli.set_date, &cli.set_start, &cli.set_end]
        .iter()
        .filter(|value| value.is_some())
        .count();
    if set_given > 0 && set_given < 3 {
        bail!("--set-date, --set-start and --set-end must be provided together");
    }

    let one_shot =
        cli.probe || cli.toggle_pause || cli.check || cli.run_scraper || set_given == 3;
    if one_shot {
        if let (Some(date), Some(start), Some(end)) = (&cli.set_date, &cli.set_start, &cli.set_end)
        {
            headless::submit(&client, date, start, end)?;
        }
        if cli.toggle_pause {
            headless::toggle(&client)?;
        }
        if cli.run_scraper {
            headless::launch(&client)?;
        }
        if cli.check {
            headless::check(&client)?;
        }
        if cli.probe {
            headless::probe(&client)?;
        }
        return Ok(());
    }

    let controller = PanelController::new(Arc::new(client));
    ui::app::run_gui(controller, cli.api_url)
}
