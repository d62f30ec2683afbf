use std::collections::HashSet;

use tracing::info;

use highfive_common::HighFive;

/// Why a high five was selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterestMatch {
    /// The configured name found in the message (lower-cased).
    pub name: String,
    /// The community that satisfied the scope, `None` for unscoped posts.
    pub community: Option<String>,
}

/// Case-insensitive name/community matcher.
///
/// A high five is interesting when its message contains one of the names. If
/// the post lists communities, at least one of them must also be a community
/// of interest; posts without a community are accepted on the name alone. A
/// blank community still counts as listed and never matches.
#[derive(Debug, Clone)]
pub struct InterestFilter {
    names: Vec<String>,
    communities: HashSet<String>,
}

impl InterestFilter {
    pub fn new<N, C>(names: N, communities: C) -> Self
    where
        N: IntoIterator,
        N::Item: AsRef<str>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
            communities: communities
                .into_iter()
                .map(|c| c.as_ref().to_lowercase())
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }

    pub fn matches(&self, high_five: &HighFive) -> bool {
        self.find_match(high_five).is_some()
    }

    pub fn find_match(&self, high_five: &HighFive) -> Option<InterestMatch> {
        let message = high_five.message_text().to_lowercase();

        for name in &self.names {
            if !message.contains(name.as_str()) {
                continue;
            }

            if high_five.communities.is_empty() {
                info!(id = %high_five.id, name = %name, "Found name in unscoped high five");
                return Some(InterestMatch {
                    name: name.clone(),
                    community: None,
                });
            }

            if let Some(community) = high_five
                .communities
                .iter()
                .find(|c| self.communities.contains(&c.to_lowercase()))
            {
                info!(id = %high_five.id, "Found {name} in {community}");
                return Some(InterestMatch {
                    name: name.clone(),
                    community: Some(community.clone()),
                });
            }
        }

        None
    }
}
