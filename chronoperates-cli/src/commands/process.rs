use std::path::PathBuf;

use anyhow::{Context, Result};
use chronoperates_core::ics::preview_events;
use chronoperates_core::{
    ApiClient, ExtractError, ExtractionSessionClient, ProcessOutcome, RetrievalOutcome,
    SelectedImage,
};
use owo_colors::OwoColorize;
use tokio::io::AsyncReadExt;

use super::{load_settings, resolve_api};
use crate::handoff::{DesktopHandoff, download_dir};
use crate::render::Render;
use crate::utils::tui::create_spinner;

pub async fn run(image: &str, media_type: &str, open: bool, output: Option<PathBuf>) -> Result<()> {
    let settings = load_settings()?;
    let client = ExtractionSessionClient::new(ApiClient::new(resolve_api(&settings).await));

    let selected = read_image(image, media_type).await?;
    let label = selected.describe();

    if let Err(e) = client.select(selected).await {
        match e {
            ExtractError::Validation(reason) => anyhow::bail!("{}", reason),
            other => return Err(other.into()),
        }
    }

    let spinner = create_spinner(format!("Processing {}", label));
    let outcome = client.process().await;
    spinner.finish_and_clear();

    let result = match outcome? {
        ProcessOutcome::Completed(result) => result,
        ProcessOutcome::Failed(message) => anyhow::bail!("Processing failed: {}", message),
        ProcessOutcome::Discarded => anyhow::bail!("Processing was cancelled"),
    };

    println!("{}", result.render());
    println!();

    let handoff = DesktopHandoff::new(output.unwrap_or_else(|| download_dir(&settings)));

    let spinner = create_spinner("Downloading calendar file".to_string());
    let retrieval = if open {
        client.open_in_calendar(&handoff).await
    } else {
        client.download(&handoff).await.map(RetrievalOutcome::Saved)
    };
    spinner.finish_and_clear();

    let retrieval = retrieval.context("Could not download the calendar file")?;
    println!("{}", retrieval.render());

    if let RetrievalOutcome::Saved(path) | RetrievalOutcome::SavedAfterOpenFailed { path, .. } =
        &retrieval
    {
        print_preview(path);
    }

    Ok(())
}

async fn read_image(image: &str, media_type: &str) -> Result<SelectedImage> {
    if image != "-" {
        return Ok(SelectedImage::from_path(image));
    }

    let mut bytes = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut bytes)
        .await
        .context("Failed to read image from stdin")?;

    Ok(SelectedImage::from_bytes(bytes, media_type))
}

fn print_preview(path: &std::path::Path) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };

    match preview_events(&content) {
        Some(events) if !events.is_empty() => {
            println!();
            for event in &events {
                println!("{}", event.render());
            }
        }
        _ => println!("{}", "(no event preview available)".dimmed()),
    }
}
