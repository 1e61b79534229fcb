use clap::Parser;
use color_eyre::Result;
use tracing::{error, info};

use transit_analysis_tui::app::{App, AppActions};
use transit_analysis_tui::cli::CliArgs;
use transit_analysis_tui::config::init_app_config;
use transit_analysis_tui::logging::{self, LogTarget};
use transit_analysis_tui::{event, terminal};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CliArgs::parse();
    cli.apply_env_overrides();

    // Setup error handling
    color_eyre::install()?;
    let config = init_app_config()?;

    // Without a terminal there is nothing to draw on
    if cli.wants_headless() || !is_terminal() {
        logging::init(&config.log_level, LogTarget::Stderr)?;
        return event::run_headless(&cli, &config).await;
    }

    logging::init(&config.log_level, LogTarget::File(config.log_file.clone()))?;
    info!(api_url = %config.api_url, "starting terminal UI");

    let actions = AppActions::from_config(&config)?;
    let mut app = App::new(actions);
    app.initialize().await;

    let mut terminal = terminal::setup_terminal()?;
    let result = event::run(&mut terminal, &mut app).await;
    terminal::cleanup_terminal_state(true, true);

    if let Err(e) = &result {
        error!(error = %e, "terminal UI exited with an error");
    }
    result
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
