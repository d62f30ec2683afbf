pub mod backend;
pub mod email;
pub mod noop;

pub use backend::NotifyBackend;
pub use email::EmailBackend;
pub use noop::NoopBackend;

use highfive_common::{HighFive, SubjectTemplates};

/// Subject and body for one notification about a run's matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighFiveDigest {
    pub subject: String,
    pub body: String,
    pub count: usize,
}

impl HighFiveDigest {
    /// Each high five is rendered on its own lines, separated by a blank line.
    pub fn new(high_fives: &[HighFive], subjects: &SubjectTemplates) -> Self {
        let body = high_fives
            .iter()
            .map(HighFive::to_string)
            .collect::<Vec<_>>()
            .join("\n\n");

        Self {
            subject: subjects.subject(high_fives.len()),
            body,
            count: high_fives.len(),
        }
    }
}
