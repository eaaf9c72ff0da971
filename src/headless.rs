use anyhow::{Result, bail};

use crate::client::ScheduleApi;
use crate::schedule::model::{ConfigForm, PauseState, RemoteConfig};

pub fn probe(service: &dyn ScheduleApi) -> Result<()> {
    let config = service.fetch_config()?;
    print_window(&config);
    Ok(())
}

pub fn submit(service: &dyn ScheduleApi, date: &str, start: &str, end: &str) -> Result<()> {
    let form = ConfigForm {
        date: date.to_string(),
        start: start.to_string(),
        end: end.to_string(),
    };
    if !form.is_complete() {
        bail!("date, start and end must all be non-empty");
    }
    let Some(window) = form.to_wire() else {
        bail!("expected a YYYY-MM-DD date and 24-hour HH:MM times");
    };

    let message = service.write_config(&window)?;
    println!(
        "{}",
        message.unwrap_or_else(|| "Configuration updated.".to_string())
    );

    // Re-fetch rather than trusting the write's echo.
    let confirmed = service.fetch_config()?;
    print_window(&confirmed);
    Ok(())
}

pub fn toggle(service: &dyn ScheduleApi) -> Result<()> {
    let outcome = service.toggle_pause()?;
    let fallback = if outcome.is_paused {
        "Scraper paused."
    } else {
        "Scraper resumed."
    };
    println!("{}", outcome.message.unwrap_or_else(|| fallback.to_string()));
    println!(
        "Scraper status: {}",
        PauseState::from_flag(Some(outcome.is_paused)).label()
    );
    Ok(())
}

pub fn check(service: &dyn ScheduleApi) -> Result<()> {
    let results = service.check_results()?;
    println!("Cached results ({}):", results.len());
    if results.is_empty() {
        println!("  (none)");
    }
    for line in results {
        println!("  {line}");
    }
    Ok(())
}

pub fn launch(service: &dyn ScheduleApi) -> Result<()> {
    let message = service.launch_scraper()?;
    println!(
        "{}",
        message.unwrap_or_else(|| "Scraper started in background.".to_string())
    );
    Ok(())
}

fn print_window(config: &RemoteConfig) {
    println!(
        "Current window: {} {} - {}",
        config.date, config.start, config.end
    );
    let form = ConfigForm::from_wire(config);
    println!(
        "Edit form:      {} {} - {}",
        form.date, form.start, form.end
    );
    if let Some(date) = config.window().parsed_date() {
        println!("Target day:     {}", date.format("%A, %B %-d %Y"));
    }
    println!(
        "Scraper status: {}",
        PauseState::from_flag(config.is_paused).label()
    );
}
