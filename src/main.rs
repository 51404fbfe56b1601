pub mod action;
pub mod app;
pub mod assets;
pub mod cli;
pub mod components;
pub mod config;
pub mod constants;
pub mod pages;
pub mod sprite;
pub mod tui;
pub mod utils;

use clap::Parser;
use color_eyre::eyre::Result;

use crate::{
    app::App,
    cli::Cli,
    config::Config,
    utils::{initialize_logging, initialize_panic_handler},
};

async fn tokio_main() -> Result<()> {
    initialize_logging()?;

    initialize_panic_handler()?;

    let args = Cli::parse();
    let config = Config::new()?;
    tracing::info!("Starting with tick rate {} and frame rate {}", args.tick_rate, args.frame_rate);

    let mut app = App::new(config, args.tick_rate, args.frame_rate, args.seed)?;
    app.run().await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = tokio_main().await {
        eprintln!("{} error: Something went wrong", env!("CARGO_PKG_NAME"));
        Err(e)
    } else {
        Ok(())
    }
}
