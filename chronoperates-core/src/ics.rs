//! Lightweight reading of downloaded calendar files for previews.

use icalendar::parser::{read_calendar, unfold};

/// What a preview shows for one VEVENT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPreview {
    pub summary: String,
    /// Raw DTSTART value, e.g. `20250320T150000Z` or `20250320`.
    pub start: Option<String>,
    pub location: Option<String>,
}

/// List the events in an ICS document. Unparsable content yields `None`.
pub fn preview_events(content: &str) -> Option<Vec<EventPreview>> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).ok()?;

    let events = calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .map(|vevent| EventPreview {
            summary: vevent
                .find_prop("SUMMARY")
                .map(|p| p.val.to_string())
                .unwrap_or_else(|| "(No title)".to_string()),
            start: vevent.find_prop("DTSTART").map(|p| p.val.to_string()),
            location: vevent.find_prop("LOCATION").map(|p| p.val.to_string()),
        })
        .collect();

    Some(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_lists_events() {
        let ics = r#"BEGIN:VCALENDAR
VERSION:2.0
PRODID:-//Calendar Generator//Event Extractor//EN
BEGIN:VEVENT
UID:lunch-1
SUMMARY:Lunch at noon
DTSTART:20250320T120000Z
DTEND:20250320T130000Z
LOCATION:Cafe
END:VEVENT
BEGIN:VEVENT
UID:standup-1
DTSTART;VALUE=DATE:20250321
END:VEVENT
END:VCALENDAR
"#;

        let events = preview_events(ics).expect("Should parse ICS");

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].summary, "Lunch at noon");
        assert_eq!(events[0].start.as_deref(), Some("20250320T120000Z"));
        assert_eq!(events[0].location.as_deref(), Some("Cafe"));
        assert_eq!(events[1].summary, "(No title)");
        assert_eq!(events[1].start.as_deref(), Some("20250321"));
    }

    #[test]
    fn test_preview_of_garbage_has_no_events() {
        let events = preview_events("this is not a calendar");
        assert!(events.is_none_or(|events| events.is_empty()));
    }
}
