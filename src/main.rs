// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{anyhow, Result};
use std::env;
use std::io;

use numerology::{logging, prompt, HistoryFilter, JsonFileStore, NumerologyService, Settings};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let settings = Settings::load().map_err(|e| anyhow!("Failed to load settings: {}", e))?;
    let service = NumerologyService::new(JsonFileStore::new(&settings.history_file));

    match args.get(1).map(String::as_str) {
        Some("calc") => run_calc(service, &settings, &args[2..].join(" ")),
        Some("history") => run_history(service, &settings),
        _ => run_ui_mode(service, &settings),
    }
}

/// `numerology calc <name...>` - one calculation, saved to history
fn run_calc(mut service: NumerologyService<JsonFileStore>, settings: &Settings, name: &str) -> Result<()> {
    logging::init(settings.log_level_or("warn"));

    match service.submit(name) {
        Ok(submission) => {
            prompt::write_submission(&mut io::stdout().lock(), &submission)?;
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}

/// `numerology history` - print saved calculations, newest first
fn run_history(service: NumerologyService<JsonFileStore>, settings: &Settings) -> Result<()> {
    logging::init(settings.log_level_or("warn"));

    match service.history(&HistoryFilter::new()) {
        Ok(records) => {
            prompt::write_history(&mut io::stdout().lock(), &records)?;
            Ok(())
        }
        Err(e) => {
            eprintln!("⚠️  {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(service: NumerologyService<JsonFileStore>, settings: &Settings) -> Result<()> {
    // Log lines would paint over the alternate screen
    logging::init(settings.log_level_or("off"));

    let mut app = ui::App::new(service);
    ui::run_ui(&mut app)?;

    println!("👋 Goodbye! History is saved in {}", settings.history_file.display());

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(mut service: NumerologyService<JsonFileStore>, settings: &Settings) -> Result<()> {
    logging::init(settings.log_level_or("warn"));

    let stdin = io::stdin();
    prompt::run(&mut service, stdin.lock(), io::stdout().lock())?;

    Ok(())
}
