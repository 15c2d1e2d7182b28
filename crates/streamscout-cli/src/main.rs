use clap::{ArgAction, Parser, Subcommand};
use commands::{clear, config, daemon, scan, show};
use film_scan_config::PathManager;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "streamscout")]
#[command(about = "StreamScout - Find where your Letterboxd watchlist is streaming")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scan cycle
    #[command(
        long_about = "Scrape the configured Letterboxd account, resolve unwatched films, and check streaming availability per configured country. Whether the cycle is full or incremental follows the calendar unless --full is given."
    )]
    Scan {
        /// Force a full scan, ignoring the scan history
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,

        /// Override configured countries (comma-separated ISO codes, e.g. US,ES)
        #[arg(long, value_name = "COUNTRIES")]
        countries: Option<String>,
    },

    /// Show the persisted offer table
    #[command(
        long_about = "Display the availability table produced by previous scans. Rows can be filtered by country, provider, and title substring; films are grouped with all their (country, provider) entries."
    )]
    Show {
        /// Only these countries (comma-separated ISO codes)
        #[arg(long, value_name = "COUNTRIES")]
        country: Option<String>,

        /// Only these providers (comma-separated names)
        #[arg(long, value_name = "PROVIDERS")]
        provider: Option<String>,

        /// Only titles containing this substring (case-insensitive)
        #[arg(long, value_name = "TEXT")]
        title: Option<String>,
    },

    /// Configure account, credentials and scan settings
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },

    /// Clear persisted state
    Clear {
        /// Clear both the offer table and the scan history
        #[arg(long, action = ArgAction::SetTrue, conflicts_with_all = ["history", "offers"])]
        all: bool,

        /// Clear the scan history (forces re-checking every film)
        #[arg(long, action = ArgAction::SetTrue)]
        history: bool,

        /// Clear the offer table
        #[arg(long, action = ArgAction::SetTrue)]
        offers: bool,
    },

    /// Run as daemon with internal scheduler
    #[command(
        long_about = "Run StreamScout in the foreground, scanning on the configured cron schedule. An initial scan runs on startup unless --no-startup-scan is given."
    )]
    Daemon {
        /// Cron schedule expression (e.g. '0 0 6 * * *' for daily at 06:00)
        #[arg(long, value_name = "SCHEDULE")]
        schedule: Option<String>,

        /// Skip the initial scan on startup
        #[arg(long, action = ArgAction::SetTrue)]
        no_startup_scan: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks the TMDB token)
    Show,

    /// Set the Letterboxd account to scan
    Letterboxd {
        /// Username (if not provided, will prompt)
        #[arg(long)]
        username: Option<String>,
    },

    /// Store the TMDB API token used for poster/runtime lookups
    Tmdb {
        /// Token (if not provided, will prompt without echo)
        #[arg(long)]
        token: Option<String>,
    },

    /// Set the countries checked per film
    Countries {
        /// Comma-separated ISO codes, e.g. US,ES,JP
        #[arg(value_name = "CODES")]
        codes: String,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // The daemon logs to a rolling file; interactive commands log to stderr
    match &cli.command {
        Commands::Daemon { .. } => {
            let path_manager = PathManager::default();
            logging::init_logging_with_file(
                cli.verbose,
                cli.quiet,
                Some(path_manager.daemon_log_file()),
            )
            .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
        }
        _ => logging::init_logging(cli.verbose, cli.quiet)
            .map_err(|e| color_eyre::eyre::eyre!("{}", e))?,
    }

    let out = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Scan { full, countries } => scan::run_scan(full, countries, &out).await,
        Commands::Show {
            country,
            provider,
            title,
        } => show::run_show(country, provider, title, &out),
        Commands::Config { cmd } => match cmd {
            None | Some(ConfigCommands::Show) => config::show_config(&out),
            Some(ConfigCommands::Letterboxd { username }) => {
                config::set_letterboxd(username, &out)
            }
            Some(ConfigCommands::Tmdb { token }) => config::set_tmdb(token, &out),
            Some(ConfigCommands::Countries { codes }) => config::set_countries(&codes, &out),
        },
        Commands::Clear {
            all,
            history,
            offers,
        } => clear::run_clear(all, history, offers, &out),
        Commands::Daemon {
            schedule,
            no_startup_scan,
        } => daemon::run_daemon(schedule, no_startup_scan, &out).await,
    }
}
