use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::OnceLock;

const NOTE_TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// One entry of a ticket's "comments and work notes" journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkNote {
    pub at: NaiveDateTime,
    pub author: String,
    pub update_type: String,
    pub body: String,
}

fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\d{2}-\d{2}-\d{4} \d{2}:\d{2}:\d{2}) - ([\w\s]+) \(([\w\s]+)\)\n")
            .expect("work note header pattern is valid")
    })
}

/// Splits the journal text into entries, oldest first.
///
/// The export lists the newest entry at the top; each entry starts with a
/// `DD-MM-YYYY HH:MM:SS - Name (Update type)` line.
pub fn parse_work_notes(text: &str) -> Vec<WorkNote> {
    let headers: Vec<_> = header_pattern().captures_iter(text).collect();
    let mut notes = Vec::with_capacity(headers.len());

    for (i, caps) in headers.iter().enumerate() {
        let (Some(whole), Some(stamp)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        let at = match NaiveDateTime::parse_from_str(stamp.as_str(), NOTE_TIMESTAMP_FORMAT) {
            Ok(at) => at,
            Err(e) => {
                tracing::warn!("Skipping work note with bad timestamp '{}': {}", stamp.as_str(), e);
                continue;
            }
        };

        let body_end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());

        notes.push(WorkNote {
            at,
            author: caps[2].to_string(),
            update_type: caps[3].to_string(),
            body: text[whole.end()..body_end].trim().to_string(),
        });
    }

    notes.reverse();
    notes
}
