//! Command-line client for the Pinmark API.

mod api_client;

use anyhow::Result;
use api_client::{ApiClient, ImageRecord, SyncResponse};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";

#[derive(Parser)]
#[command(name = "pinmarkctl")]
#[command(about = "Command-line client for Pinmark")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    api: ApiArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct ApiArgs {
    /// Server base URL
    #[arg(long, global = true, env = "PINMARK_SERVER", default_value = DEFAULT_SERVER)]
    server: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server health and version
    Health,
    /// Report an image's dimensions
    Info {
        /// Image file to upload
        file: PathBuf,
    },
    /// Draw the marker on an image and store the result
    Mark {
        /// Image file to upload
        file: PathBuf,
        /// Marker center, x coordinate
        #[arg(long, allow_negative_numbers = true)]
        x: i64,
        /// Marker center, y coordinate
        #[arg(long, allow_negative_numbers = true)]
        y: i64,
    },
    /// List URLs of stored marked images
    List,
    /// Delete a stored marked image
    Delete {
        /// Stored filename, e.g. cat_marked.png
        filename: String,
        /// Also delete the record with the same filename
        #[arg(long, default_value_t = false)]
        with_record: bool,
    },
    /// Image record commands
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Subcommand)]
enum DbCommands {
    /// Record every stored image not yet in the table
    Init,
    /// Record stored images together with their file paths
    Populate,
    /// List all records
    List,
    /// Show one record
    Get { id: i64 },
    /// Create a record
    Create { filename: String },
    /// Rename a record
    Update { id: i64, filename: String },
    /// Delete a record
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let Cli { api, command } = Cli::parse();
    tracing::debug!(server = %api.server, "Using Pinmark server");
    let client = ApiClient::new(&api.server)?;

    match command {
        Commands::Health => handle_health_command(&client).await,
        Commands::Info { file } => {
            let info = client.image_info(&file).await?;
            println!("{}: {}x{}", info.filename, info.width, info.height);
            Ok(())
        }
        Commands::Mark { file, x, y } => {
            let marked = client.mark(&file, x, y).await?;
            println!("{}", marked.message);
            println!("Stored as: {}", marked.filename);
            println!("URL: {}", marked.url);
            Ok(())
        }
        Commands::List => {
            let images = client.list_images().await?;
            if images.is_empty() {
                println!("No marked images found.");
            }
            for url in images {
                println!("{url}");
            }
            Ok(())
        }
        Commands::Delete {
            filename,
            with_record,
        } => handle_delete_command(&client, &filename, with_record).await,
        Commands::Db { command } => handle_db_command(&client, command).await,
    }
}

async fn handle_health_command(client: &ApiClient) -> Result<()> {
    let health = client.health().await?;

    println!("Status: {}", health.status);
    println!("Server version: {}", health.version);
    println!("Client version: {}", env!("CARGO_PKG_VERSION"));

    if health.version != env!("CARGO_PKG_VERSION") {
        eprintln!(
            "Warning: version mismatch (server: {}, client: {})",
            health.version,
            env!("CARGO_PKG_VERSION")
        );
    }
    Ok(())
}

async fn handle_delete_command(client: &ApiClient, filename: &str, with_record: bool) -> Result<()> {
    let response = client.delete_image(filename).await?;
    println!("{}", response.message);

    if with_record {
        tracing::debug!(filename, "Looking up record to delete");
        match client.find_record(filename).await? {
            Some(record) => {
                client.delete_record(record.id).await?;
                println!("Deleted record {} ({})", record.id, record.filename);
            }
            None => println!("No record found for {filename}"),
        }
    }
    Ok(())
}

async fn handle_db_command(client: &ApiClient, command: DbCommands) -> Result<()> {
    match command {
        DbCommands::Init => print_sync(&client.init_records().await?),
        DbCommands::Populate => print_sync(&client.populate_records().await?),
        DbCommands::List => {
            let records = client.list_records().await?;
            if records.is_empty() {
                println!("No records found.");
                return Ok(());
            }
            println!("{:<8} {:<40} FILEPATH", "ID", "FILENAME");
            println!("{}", "-".repeat(80));
            for record in &records {
                print_record_row(record);
            }
        }
        DbCommands::Get { id } => print_record(&client.get_record(id).await?),
        DbCommands::Create { filename } => {
            let record = client.create_record(&filename).await?;
            println!("Record created.");
            print_record(&record);
        }
        DbCommands::Update { id, filename } => {
            let record = client.update_record(id, &filename).await?;
            println!("Record updated.");
            print_record(&record);
        }
        DbCommands::Delete { id } => {
            let record = client.delete_record(id).await?;
            println!("Deleted record {} ({})", record.id, record.filename);
        }
    }
    Ok(())
}

fn print_sync(response: &SyncResponse) {
    println!("{}", response.message);
    for added in &response.added_images {
        println!("  + {} ({})", added.filename, added.id);
    }
}

fn print_record(record: &ImageRecord) {
    println!("ID: {}", record.id);
    println!("Filename: {}", record.filename);
    if let Some(path) = &record.filepath {
        println!("Filepath: {path}");
    }
}

fn print_record_row(record: &ImageRecord) {
    println!(
        "{:<8} {:<40} {}",
        record.id,
        record.filename,
        record.filepath.as_deref().unwrap_or("-")
    );
}
