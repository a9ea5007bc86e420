//! CLI entry point for astra-rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use astra_rs::commands::generate::GenerateOptions;

#[derive(Parser)]
#[command(name = "astra-rs")]
#[command(version)]
#[command(about = "A fast static blog generator for headless CMS content", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Fetch posts from the CMS and generate static files
    #[command(alias = "g")]
    Generate {
        /// Regenerate everything, ignoring the cache
        #[arg(short, long)]
        force: bool,

        /// Render draft content against a preview ref
        #[arg(long)]
        preview_ref: Option<String>,
    },

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Poll the CMS for content changes every N seconds
        #[arg(long)]
        poll: Option<u64>,

        /// Enable static mode (no live reload)
        #[arg(long)]
        r#static: bool,
    },

    /// List posts from the CMS
    List,

    /// Clean the public folder and cache
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "astra_rs=debug,info"
    } else {
        "astra_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = cli.cwd.unwrap_or_else(|| std::env::current_dir().unwrap());

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            astra_rs::commands::init::init_site(&target_dir)?;
            println!("Initialized empty Astra site in {:?}", target_dir);
        }

        Commands::Generate { force, preview_ref } => {
            let astra = astra_rs::Astra::new(&base_dir)?;
            tracing::info!("Generating static files...");

            let options = GenerateOptions { force, preview_ref };
            astra_rs::commands::generate::run(&astra, &options).await?;
            println!("Generated successfully!");
        }

        Commands::Server {
            port,
            ip,
            open,
            poll,
            r#static,
        } => {
            let astra = astra_rs::Astra::new(&base_dir)?;

            // Generate first
            tracing::info!("Generating static files...");
            astra_rs::commands::generate::run(&astra, &GenerateOptions::default()).await?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            astra_rs::server::start(&astra, &ip, port, !r#static, open, poll).await?;
        }

        Commands::List => {
            let astra = astra_rs::Astra::new(&base_dir)?;
            astra_rs::commands::list::run(&astra).await?;
        }

        Commands::Clean => {
            let astra = astra_rs::Astra::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            astra.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("astra-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
