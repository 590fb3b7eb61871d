use std::fs::File;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cli;
mod controller;
mod domain;
mod filter;
mod inputter;
mod model;
mod record;
mod render;
mod table;
mod ui;

use cli::Args;
use controller::Controller;
use domain::{Message, TableConfig, TableError};
use model::{Model, Status};
use table::Dataset;
use ui::TableUI;

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            error!("Exiting with error: {e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_logging(path: &Path) -> Result<(), TableError> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| TableError::LoadingFailed(format!("tracing init failed: {e}")))
}

fn run() -> Result<(), TableError> {
    let args = Args::parse();
    let config = args.to_config()?;

    if let Err(e) = init_logging(&config.log_file) {
        eprintln!("Logging disabled: {e}");
    }

    let dataset = match &config.data_file {
        Some(path) => Dataset::load(path.clone())?,
        None => Dataset::builtin()?,
    };

    let mut model = Model::init(&config, dataset)?;
    model.set_filters(&args.search, &args.category, &args.kind, &args.status)?;

    if args.html.is_some() {
        model.export_html(&config.export_file)?;
        println!(
            "{} -> {}",
            model.counter(),
            config.export_file.display()
        );
        return Ok(());
    }

    let mut terminal = ratatui::init();
    let result = run_tui(&config, &mut model, &mut terminal);
    ratatui::restore();
    result
}

fn run_tui(
    config: &TableConfig,
    model: &mut Model,
    terminal: &mut ratatui::DefaultTerminal,
) -> Result<(), TableError> {
    info!("Starting terminal ui");
    let mut ui = TableUI::new();
    let controller = Controller::new(config);

    let size = terminal.size()?;
    model.update(Some(Message::Resize(size.width as usize, size.height as usize)))?;

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(model, f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(model)?;
        model.update(message)?;
    }

    Ok(())
}
