//! CLI command definitions, routing, and tracing setup.

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use sitepages_discovery::{DiscoveryOptions, Discoverer, ProgressReporter, SiteUrl, Strategy};
use sitepages_shared::{AppConfig, DiscoveryResult, init_config, load_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// sitepages: find the pages of any public website.
#[derive(Parser)]
#[command(
    name = "sitepages",
    version,
    about = "Discover a representative, de-duplicated page list for a website.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Discover pages and print the JSON response envelope.
    Pages {
        /// Website root, e.g. `example.com` or `https://example.com/`.
        website: Option<String>,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Fetch one page and report its readable-text size.
    Summary {
        /// Page URL.
        url: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
///
/// Logs go to stderr; stdout carries only command output.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "sitepages=warn",
        1 => "sitepages=info",
        2 => "sitepages=debug",
        _ => "sitepages=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Pages { website, pretty } => cmd_pages(website.as_deref(), pretty).await,
        Command::Summary { url } => cmd_summary(&url).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

fn build_discoverer() -> Result<Discoverer> {
    let config = load_config()?;
    Ok(Discoverer::new(DiscoveryOptions::from(&config))?)
}

async fn cmd_pages(website: Option<&str>, pretty: bool) -> Result<()> {
    let discoverer = build_discoverer()?;

    info!(website = website.unwrap_or(""), "discovering pages");

    let reporter = CliProgress::new();
    let envelope = discoverer.handle_request(website, &reporter).await;

    let json = if pretty {
        serde_json::to_string_pretty(&envelope)?
    } else {
        serde_json::to_string(&envelope)?
    };
    println!("{json}");

    Ok(())
}

async fn cmd_summary(url: &str) -> Result<()> {
    let discoverer = build_discoverer()?;
    let page = SiteUrl::parse(url).map_err(|e| eyre!("invalid URL '{url}': {e}"))?;

    let html = discoverer.homepage().fetch_html(page.as_str()).await?;
    let summary = sitepages_markdown::summarize(&html)?;

    println!();
    println!("  URL:        {page}");
    println!("  Title:      {}", summary.title.as_deref().unwrap_or("(none)"));
    println!("  Words:      {}", summary.word_count);
    println!("  Characters: {}", summary.character_count);
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner on stderr.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn strategy(&self, strategy: Strategy) {
        self.spinner.set_message(strategy.label());
    }

    fn done(&self, _result: &DiscoveryResult) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_website_is_optional() {
        let cli = Cli::try_parse_from(["sitepages", "pages"]).unwrap();
        assert!(matches!(cli.command, Command::Pages { website: None, pretty: false }));
    }

    #[test]
    fn pages_accepts_website_and_flags() {
        let cli =
            Cli::try_parse_from(["sitepages", "-vv", "pages", "example.com", "--pretty"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Pages { website, pretty } => {
                assert_eq!(website.as_deref(), Some("example.com"));
                assert!(pretty);
            }
            _ => panic!("expected pages command"),
        }
    }

    #[test]
    fn summary_requires_url() {
        assert!(Cli::try_parse_from(["sitepages", "summary"]).is_err());
    }
}
