mod commands;
mod handoff;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chronoperates")]
#[command(about = "Extract calendar events from an image and get an ICS file you can import")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image and fetch the generated calendar file
    Process {
        /// Image file (JPEG, PNG, BMP, WebP), or "-" to read from stdin
        image: String,

        /// Media type of image data read from stdin
        #[arg(long, default_value = "image/png")]
        media_type: String,

        /// Open the calendar file in your calendar app instead of saving it
        #[arg(long)]
        open: bool,

        /// Directory to save the calendar file in
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
    /// Show settings location and the resolved API URL
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            image,
            media_type,
            open,
            output,
        } => commands::process::run(&image, &media_type, open, output).await,
        Commands::Config => commands::config::run().await,
    }
}
