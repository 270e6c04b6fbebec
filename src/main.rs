// quickstart: terminal console for onboarding data into a data hub.

mod app;
mod config;
mod error;
mod hub;
mod logging;
mod state;
mod ui;

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::app::App;
use crate::config::{CliArgs, Config};
use crate::error::Result;
use crate::hub::{DataGateway, HubClient};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("quickstart: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();
    let config = Config::load(&args)?;
    logging::init(&config)?;

    let runtime = tokio::runtime::Runtime::new()?;
    let gateway: Arc<dyn DataGateway> = Arc::new(HubClient::new(&config)?);
    tracing::info!(url = %config.base_url, base_path = %config.base_path, "starting");

    let mut app = App::new(&config, gateway, runtime.handle().clone());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = app.run(&mut terminal);

    // Restore the terminal before reporting any error
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result?;
    tracing::info!("exiting");
    Ok(())
}
