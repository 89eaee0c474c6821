//! schooldir CLI - School directory server and client
//!
//! This is the entry point for the schooldir command-line tool, which provides:
//! - The HTTP API over the school record store and image upload (`serve`)
//! - A terminal client for browsing and editing the directory (`list`, `add`,
//!   `edit`, `delete`, `upload`)

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use commands::schools::{AddArgs, DeleteArgs, EditArgs, ListArgs, UploadArgs};
use commands::serve::ServeArgs;
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "schooldir",
    author,
    version,
    about = "School directory: HTTP API server and terminal client",
    long_about = "Keep a directory of schools in PostgreSQL with images on an external host. \
                  Run the API with `serve`, then browse and edit it with the client commands."
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// List schools, optionally filtered by search text and state
    List(ListArgs),
    /// Add a school (uploads --image first when given)
    Add(AddArgs),
    /// Replace a school's fields; the image is kept unless --image is given
    Edit(EditArgs),
    /// Delete a school by id
    Delete(DeleteArgs),
    /// Upload an image and print its hosted URL
    Upload(UploadArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment wins
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init(&TracingConfig { debug: cli.debug }).ok();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::List(args) => commands::run_list(args).await?,
        Commands::Add(args) => commands::run_add(args).await?,
        Commands::Edit(args) => commands::run_edit(args).await?,
        Commands::Delete(args) => commands::run_delete(args).await?,
        Commands::Upload(args) => commands::run_upload(args).await?,
    }

    Ok(())
}
