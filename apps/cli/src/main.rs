//! sitepages CLI: discover a representative page list for any public website.
//!
//! Tries robots.txt sitemaps, then `/sitemap.xml`, then the homepage's links,
//! and prints the result as a `{ "data": ... }` JSON envelope.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
