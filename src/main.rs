mod api;
mod app;
mod config;
mod input;
mod minigame;
mod model;
mod shop;
mod sprite;
mod ui;

use anyhow::Result;
use clap::Parser;

use crate::model::PetKind;

#[derive(Parser, Debug, Clone)]
#[command(name = "hutch")]
#[command(about = "Terminal client for a virtual-pet server")]
struct Cli {
    /// Base URL of the pet server. Example: http://127.0.0.1:5000
    #[arg(long)]
    server: Option<String>,

    /// Which critter to draw (display only; the server does not care)
    #[arg(long, value_enum)]
    pet: Option<PetKind>,

    /// Force monochrome (no colors)
    #[arg(long, default_value_t = false)]
    mono: bool,

    /// Enable the test-action key bindings (F2/F3 stat drains, F6/F7 stage)
    #[arg(long, default_value_t = false)]
    debug_keys: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    app::run(cli).await
}
