use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use podcastr::{
    AppState, NoopReporter, PlaybackQueue, RegenerationEvent, RegenerationReporter, ReqwestClient,
    SharedRegenerationReporter, SiteOptions, TracingReporter, build_static_page, serve,
};

// Emoji with fallback for terminals without Unicode support
static MICROPHONE: Emoji<'_, '_> = Emoji("🎙️  ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static GLOBE: Emoji<'_, '_> = Emoji("🌐 ", "");

/// Generate and serve the Podcastr homepage
#[derive(Parser, Debug)]
#[command(name = "podcastr")]
#[command(about = "Generate and serve the Podcastr homepage")]
#[command(version)]
struct Args {
    /// Base URL of the episodes API
    #[arg(long, env = "PODCASTR_API_BASE", default_value = podcastr::regenerate::DEFAULT_API_BASE)]
    api_base: String,

    /// Number of episodes to request
    #[arg(short, long, default_value = "12")]
    limit: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the homepage, regenerating it at most once per interval
    Serve {
        /// Address to listen on
        #[arg(long, env = "PODCASTR_BIND", default_value = "127.0.0.1:3000")]
        bind: SocketAddr,

        /// Seconds a generated page is served before it is regenerated
        #[arg(long, env = "PODCASTR_REVALIDATE_SECS", default_value = "28800")]
        revalidate_secs: u64,
    },

    /// Generate the homepage once and write it to a file
    Build {
        /// Output file for the rendered page
        #[arg(short, long, default_value = "out/index.html")]
        out: PathBuf,

        /// Quiet mode - suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },
}

/// Spinner-driven reporter for one-shot builds
struct SpinnerReporter {
    bar: ProgressBar,
}

impl SpinnerReporter {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} {wide_msg}")
        {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }
}

impl RegenerationReporter for SpinnerReporter {
    fn report(&self, event: RegenerationEvent) {
        match event {
            RegenerationEvent::FetchingEpisodes { url } => {
                self.bar
                    .set_message(format!("{SEARCH}Fetching episodes: {}", url.cyan()));
            }

            RegenerationEvent::EpisodesFetched { count } => {
                self.bar.set_message(format!(
                    "{HEADPHONES}{} episodes received",
                    count.to_string().cyan()
                ));
            }

            RegenerationEvent::SnapshotRendered {
                latest_count,
                catalog_count,
                ..
            } => {
                self.bar.set_message(format!(
                    "{HEADPHONES}{} latest, {} in catalog",
                    latest_count.to_string().green(),
                    catalog_count.to_string().yellow()
                ));
            }

            RegenerationEvent::PageWritten { path, bytes } => {
                self.bar.finish_and_clear();
                println!(
                    "{SUCCESS}{} {} ({} bytes)",
                    "Page written:".bold().green(),
                    path.cyan(),
                    bytes
                );
            }

            RegenerationEvent::RegenerationFailed { error } => {
                self.bar
                    .abandon_with_message(format!("{FAILURE}{}", error.red()));
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("podcastr=info")),
        )
        .with_target(true)
        .init();

    let client = ReqwestClient::new();

    match args.command {
        Command::Serve {
            bind,
            revalidate_secs,
        } => {
            println!(
                "\n{}{} {}\n",
                MICROPHONE,
                "podcastr".bold().magenta(),
                "- Podcast Homepage".dimmed()
            );
            println!("{GLOBE}http://{}\n", bind.to_string().cyan());

            let options = SiteOptions {
                api_base: args.api_base,
                limit: args.limit,
                revalidate: Duration::from_secs(revalidate_secs),
            };
            let state = AppState::new(
                Arc::new(client),
                options,
                PlaybackQueue::shared(),
                TracingReporter::shared(),
            );

            // Generate the first snapshot before taking traffic
            if let Err(e) = state.home_snapshot().await {
                tracing::warn!(
                    error = %e,
                    "Initial generation failed, will retry on first request"
                );
            }

            serve(bind, state).await.context("Server failed")?;
        }

        Command::Build { out, quiet } => {
            let options = SiteOptions {
                api_base: args.api_base,
                limit: args.limit,
                ..Default::default()
            };

            let reporter: SharedRegenerationReporter = if quiet {
                NoopReporter::shared()
            } else {
                Arc::new(SpinnerReporter::new())
            };

            build_static_page(&client, &options, &out, &reporter)
                .await
                .context("Failed to build homepage")?;
        }
    }

    Ok(())
}
