use chrono::NaiveDate;
use std::fmt;

/// Date format used by the upstream cards, e.g. `Sep 15, 2023`.
pub const CARD_DATE_FORMAT: &str = "%b %d, %Y";

/// A recognition post recovered from the listing feed.
///
/// Every string field has been through [`sanitize`]. A `HighFive` handed out by
/// the extractor always carries a message. `communities` may hold blank entries
/// when the card had an empty community element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighFive {
    pub id: String,
    pub date: Option<NaiveDate>,
    pub name: Option<String>,
    pub communities: Vec<String>,
    pub message: Option<String>,
}

impl HighFive {
    pub fn message_text(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    /// Whole days between the post date and `today`. `None` when undated.
    pub fn age_in_days(&self, today: NaiveDate) -> Option<i64> {
        self.date.map(|date| (today - date).num_days())
    }

    /// Human-readable lines; absent values are skipped.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(4);
        if let Some(date) = self.date {
            lines.push(format!("Date: {}", format_date(date)));
        }
        if let Some(name) = &self.name {
            lines.push(format!("From: {name}"));
        }
        let communities: Vec<&str> = self
            .communities
            .iter()
            .map(String::as_str)
            .filter(|c| !c.is_empty())
            .collect();
        if !communities.is_empty() {
            lines.push(format!("Community: {}", communities.join(", ")));
        }
        if let Some(message) = &self.message {
            lines.push(format!("Message: {message}"));
        }
        lines
    }
}

impl fmt::Display for HighFive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

/// Format a date the way the cards show it, without zero-padding the day.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub fn parse_card_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, CARD_DATE_FORMAT).ok()
}

/// Drop everything outside printable ASCII (0x20..=0x7E), then trim.
pub fn sanitize(s: &str) -> String {
    s.chars()
        .filter(|c| (' '..='~').contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}
