use clap::{Parser, Subcommand, ValueEnum};
use photoscoop::{Date, DateRange, MediaType, Photoscoop, Settings};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "photoscoop-cli")]
#[command(about = "CLI for Photoscoop - Google Photos summaries and downloads", long_about = None)]
struct Cli {
    /// OAuth client secrets file
    #[arg(long, env = "PHOTOSCOOP_CLIENT_SECRETS", default_value = "client_secret.json")]
    client_secrets: PathBuf,

    /// Where the user's access and refresh tokens are stored
    #[arg(long, env = "PHOTOSCOOP_TOKEN_FILE", default_value = "token.json")]
    token_file: PathBuf,

    /// Local port for the login redirect (0 picks a free port)
    #[arg(long, default_value_t = 0)]
    port: u16,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tabulate the metadata of items taken within a date range
    Summary {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: Date,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        end: Date,

        /// Items per page
        #[arg(long, default_value_t = 100)]
        page_size: u32,

        /// Restrict to one media type
        #[arg(long, value_enum, default_value_t = Kind::All)]
        media_type: Kind,

        /// Rows shown from the top of the table
        #[arg(long, default_value_t = 5)]
        head: usize,

        /// Row printed in full
        #[arg(long, default_value_t = 25)]
        sample: usize,
    },
    /// Download the whole library
    Download {
        /// Output directory for downloads
        #[arg(short, long, default_value = "downloads")]
        output: PathBuf,

        /// Items per page
        #[arg(long, default_value_t = 100)]
        page_size: u32,

        /// Downloads between pauses
        #[arg(long, default_value_t = 10)]
        batch_size: usize,

        /// Pause after each batch, in milliseconds
        #[arg(long, default_value_t = 1000)]
        pause_ms: u64,

        /// Download files that already exist again
        #[arg(long)]
        overwrite: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Kind {
    Photo,
    Video,
    All,
}

impl From<Kind> for MediaType {
    fn from(k: Kind) -> Self {
        match k {
            Kind::Photo => MediaType::Photo,
            Kind::Video => MediaType::Video,
            Kind::All => MediaType::AllMedia,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let settings = Settings::default()
        .with_client_secrets_file(&cli.client_secrets)
        .with_token_file(&cli.token_file)
        .with_redirect_port(cli.port);

    match cli.command {
        Commands::Summary {
            start,
            end,
            page_size,
            media_type,
            head,
            sample,
        } => {
            let range = DateRange::new(start, end)?;
            let scoop = Photoscoop::connect(settings.with_page_size(page_size)).await?;
            println!("Authentication successful!");

            let media_type = match media_type {
                Kind::All => None,
                other => Some(other.into()),
            };
            let listing = scoop.search_by_date(range, media_type).await?;
            if let Some(reason) = &listing.stopped {
                println!("Stopped paging early: {}", reason);
            }

            if listing.is_empty() {
                println!("No media items found for the specified date range");
                return Ok(());
            }

            println!("Found {} media items", listing.len());
            let frame = Photoscoop::summarize(&listing.items);
            println!("{}", frame.head(head));

            println!("\nSample item (index {} if available):", sample);
            if let Some(record) = frame.record(sample) {
                println!("{}", record);
            }
        }
        Commands::Download {
            output,
            page_size,
            batch_size,
            pause_ms,
            overwrite,
        } => {
            let settings = settings
                .with_output_dir(output)
                .with_page_size(page_size)
                .with_batch_size(batch_size)
                .with_batch_pause(Duration::from_millis(pause_ms))
                .with_overwrite(overwrite);
            let scoop = Photoscoop::connect(settings).await?;
            println!("Authentication successful!");

            let listing = scoop.list_library().await?;
            if let Some(reason) = &listing.stopped {
                println!("Stopped paging early: {}", reason);
            }
            println!("Found {} media items", listing.len());

            let result = scoop.download(&listing.items).await?;
            println!("✅ Library downloaded to: {}", result.directory.display());
            println!(
                "   Downloaded: {}, already present: {}, total: {}",
                result.successful.len(),
                result.skipped.len(),
                result.total()
            );
            if !result.failed.is_empty() {
                println!("   Failed items:");
                for (name, err) in result.failed {
                    println!("   - {}: {}", name, err);
                }
            }
        }
    }

    Ok(())
}
