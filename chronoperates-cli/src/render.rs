//! Colored terminal rendering for chronoperates types.

use chronoperates_core::ics::EventPreview;
use chronoperates_core::{ExtractionResult, RetrievalOutcome};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for ExtractionResult {
    fn render(&self) -> String {
        let mut lines = vec![format!("{} {}", "✓".green(), self.summary_line().green())];

        if let Some(text) = self.extracted_text() {
            lines.push(String::new());
            lines.push("Extracted text:".bold().to_string());
            lines.extend(text.lines().map(|l| format!("   {}", l.dimmed())));
        }

        lines.join("\n")
    }
}

impl Render for EventPreview {
    fn render(&self) -> String {
        let mut line = format!("   📅 {}", self.summary);
        if let Some(start) = &self.start {
            line.push_str(&format!(" {}", start.dimmed()));
        }
        if let Some(location) = &self.location {
            line.push_str(&format!(" {}", format!("@ {}", location).dimmed()));
        }
        line
    }
}

impl Render for RetrievalOutcome {
    fn render(&self) -> String {
        match self {
            RetrievalOutcome::Saved(path) => {
                format!("Saved calendar file to {}", path.display().bold())
            }
            RetrievalOutcome::Opened => "Opened calendar file in your calendar app".to_string(),
            RetrievalOutcome::SavedAfterOpenFailed { path, reason } => format!(
                "{}\nSaved calendar file to {} instead",
                format!("Unable to open in calendar app: {}", reason).yellow(),
                path.display().bold()
            ),
        }
    }
}
