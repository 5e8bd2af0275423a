//! Sheetdrop CLI - spreadsheet upload server
//!
//! # Main Commands
//!
//! ```bash
//! sheetdrop serve                  # Start HTTP server (port 3000)
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! sheetdrop inspect report.csv     # Print the summary the server would store
//! sheetdrop list                   # Print the stored upload index
//! ```

use clap::{Parser, Subcommand};
use sheetdrop::{summarize, Config, FileStore, FileType};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sheetdrop")]
#[command(about = "Upload, summarise and manage spreadsheet files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on (overrides UPLOADS_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Storage directory (overrides UPLOADS_STORAGE_DIR)
        #[arg(long)]
        storage_dir: Option<PathBuf>,

        /// Built front end directory (overrides UPLOADS_STATIC_DIR)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Summarise a spreadsheet and print the result as JSON
    Inspect {
        /// Input file (.xlsx, .xls or .csv)
        input: PathBuf,
    },

    /// Print stored uploads
    List {
        /// Storage directory (overrides UPLOADS_STORAGE_DIR)
        #[arg(long)]
        storage_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env before the subscriber so RUST_LOG is honoured
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            port,
            storage_dir,
            static_dir,
        } => cmd_serve(port, storage_dir, static_dir).await,

        Commands::Inspect { input } => cmd_inspect(&input),

        Commands::List { storage_dir } => cmd_list(storage_dir),
    };

    if let Err(e) = result {
        tracing::error!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(
    port: Option<u16>,
    storage_dir: Option<PathBuf>,
    static_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::from_env()?;
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(dir) = storage_dir {
        config.storage_dir = dir;
    }
    if let Some(dir) = static_dir {
        config.static_dir = dir;
    }

    sheetdrop::server::start_server(config).await
}

fn cmd_inspect(input: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    let name = input.to_string_lossy();
    let file_type = FileType::from_filename(&name).ok_or_else(|| {
        format!(
            "Unsupported file type: {} (expected {})",
            input.display(),
            FileType::accepted_list()
        )
    })?;

    let bytes = fs::read(input)?;
    tracing::info!("📄 Inspecting {} ({} bytes)", input.display(), bytes.len());

    let summary = summarize(&bytes, file_type)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn cmd_list(storage_dir: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let dir = match storage_dir {
        Some(dir) => dir,
        None => Config::from_env()?.storage_dir,
    };
    let store = FileStore::open(&dir)?;
    let files = store.list();

    if files.is_empty() {
        eprintln!("📋 No uploads stored in {}", dir.display());
        return Ok(());
    }

    eprintln!("📋 Stored uploads ({}):\n", files.len());
    for f in files {
        println!("  #{} {} [{:?}]", f.id, f.original_filename, f.status);
        if let Some(size) = f.file_size {
            println!("     Size: {} bytes", size);
        }
        if let Some(ref data) = f.processed_data {
            println!("     Rows: {}  Columns: {}", data.total_rows, data.total_columns);
        }
        if let Some(ref err) = f.error_message {
            println!("     Error: {}", err);
        }
        println!("     Created: {}", f.created_at);
    }

    Ok(())
}
