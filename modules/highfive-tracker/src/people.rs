//! Who gets mentioned in high fives, per community.
//!
//! Not part of the notify decision. The tracker only runs this when
//! `person-counts-enabled` is set and logs the tallies.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use highfive_common::HighFive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityLabel {
    Person,
    Organization,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
}

/// Named-entity recognition over a message body.
pub trait EntityRecognizer: Send + Sync {
    fn entities(&self, text: &str) -> Vec<Entity>;
}

/// Distinct person names mentioned in the message, compared case-sensitively.
pub fn extract_people(high_five: &HighFive, recognizer: &dyn EntityRecognizer) -> BTreeSet<String> {
    recognizer
        .entities(high_five.message_text())
        .into_iter()
        .filter(|e| e.label == EntityLabel::Person)
        .map(|e| e.text)
        .collect()
}

// --- Rule-based recognizer ---

/// Runs of capitalised words, e.g. `Samantha`, `Dr Patel`, `Maple Ridge Hospital`.
static CAPITALIZED_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Z][A-Za-z'\-]*(?:[ \t]+[A-Z][A-Za-z'\-]*)*")
        .unwrap_or_else(|e| panic!("invalid name pattern: {e}"))
});

/// Capitalised words that are not names on their own: sentence starters,
/// greetings, titles, calendar words. Stripped from the edges of a run.
const NON_NAME_WORDS: &[&str] = &[
    // pronouns and determiners
    "I", "I'm", "I've", "I'd", "I'll", "Me", "My", "We", "We're", "We've", "Our", "Us", "You",
    "You're", "Your", "He", "His", "Him", "She", "Her", "They", "Their", "Them", "It", "It's",
    "Its", "The", "A", "An", "This", "That", "These", "Those", "Every", "Each", "All", "Some",
    "Any", "Everyone", "Everybody", "Anyone",
    // conjunctions, prepositions, adverbs
    "And", "But", "Or", "So", "If", "When", "While", "After", "Before", "During", "From", "For",
    "To", "At", "In", "On", "Of", "With", "Without", "As", "Because", "Since", "Also", "Then",
    "Not", "Just", "Again", "Once", "Even", "Still", "Today", "Yesterday", "Tonight", "Here",
    "There", "What", "Who", "How", "Why", "Where",
    // verbs that open sentences
    "Is", "Was", "Were", "Are", "Be", "Been", "Have", "Had", "Has", "Do", "Did", "Can", "Could",
    "Would", "Should", "Will", "Please", "Keep", "Let",
    // greetings and praise
    "Thank", "Thanks", "Thankyou", "Hello", "Hi", "Dear", "Kudos", "Shout", "Shoutout", "Big",
    "Special", "Huge", "Great", "Many", "Much", "Very", "Really", "Absolutely", "Happy", "Best",
    "Wonderful", "Amazing", "Awesome", "Excellent", "Fantastic", "Incredible", "Kind", "Sincere",
    "Sincerely", "Gratitude", "Grateful", "Bless", "God", "Cheers", "Wow", "Yes", "No", "Ok",
    // titles and roles
    "Dr", "Doctor", "Mr", "Mrs", "Ms", "Miss", "Nurse", "Nurses", "Physician", "Staff", "Team",
    "Volunteer", "Volunteers", "Manager", "Paramedic", "Paramedics", "Care", "Aide",
    // calendar
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December", "Jan", "Feb", "Mar", "Apr", "Jun", "Jul", "Aug", "Sep",
    "Sept", "Oct", "Nov", "Dec", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday",
    "Saturday", "Sunday", "Christmas", "Easter",
];

/// Words that make a run an organisation or place rather than a person.
const ORGANIZATION_WORDS: &[&str] = &[
    "Hospital", "Centre", "Center", "Clinic", "Health", "Department", "Unit", "Ward",
    "Emergency", "Foundation", "Services", "Program", "Society", "Lodge", "Manor", "Village",
    "Pharmacy", "Lab", "Laboratory", "Institute", "Community", "Street", "Road", "Avenue",
];

/// Heuristic recognizer: capitalised word runs with common non-name words
/// trimmed from both ends. Runs containing an institution word are labelled
/// organisations.
pub struct RuleBasedRecognizer {
    non_names: HashSet<&'static str>,
    organization_words: HashSet<&'static str>,
}

impl RuleBasedRecognizer {
    pub fn new() -> Self {
        Self {
            non_names: NON_NAME_WORDS.iter().copied().collect(),
            organization_words: ORGANIZATION_WORDS.iter().copied().collect(),
        }
    }

    fn is_name_word(&self, word: &str) -> bool {
        // Acronyms like "ER" or "ICU" are units, not people.
        let acronym = word.len() > 1 && word.chars().all(|c| !c.is_ascii_lowercase());
        !acronym && !self.non_names.contains(word)
    }

    fn classify(&self, run: &str) -> Option<Entity> {
        let words: Vec<&str> = run
            .split_whitespace()
            .map(|w| w.trim_end_matches("'s").trim_matches(|c: char| c == '\'' || c == '-'))
            .filter(|w| !w.is_empty())
            .collect();

        if words.iter().any(|w| self.organization_words.contains(*w)) {
            return Some(Entity {
                text: words.join(" "),
                label: EntityLabel::Organization,
            });
        }

        let start = words.iter().position(|w| self.is_name_word(w))?;
        let end = words.iter().rposition(|w| self.is_name_word(w))?;

        Some(Entity {
            text: words[start..=end].join(" "),
            label: EntityLabel::Person,
        })
    }
}

impl Default for RuleBasedRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRecognizer for RuleBasedRecognizer {
    fn entities(&self, text: &str) -> Vec<Entity> {
        CAPITALIZED_RUN
            .find_iter(text)
            .filter_map(|m| self.classify(m.as_str()))
            .collect()
    }
}

// --- Person counts ---

/// community → person → number of high fives mentioning them.
/// Unscoped high fives, and those whose communities are all blank, are
/// tallied under the `None` community.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PersonCounts {
    counts: BTreeMap<Option<String>, BTreeMap<String, usize>>,
}

impl PersonCounts {
    pub fn get(&self, community: Option<&str>, person: &str) -> usize {
        self.counts
            .get(&community.map(str::to_string))
            .and_then(|people| people.get(person))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct (community, person) pairs.
    pub fn len(&self) -> usize {
        self.counts.values().map(BTreeMap::len).sum()
    }

    /// Each community's people, most mentioned first, ties by name.
    pub fn sorted(&self) -> Vec<(Option<String>, Vec<(String, usize)>)> {
        self.counts
            .iter()
            .map(|(community, people)| {
                let mut ranked: Vec<(String, usize)> =
                    people.iter().map(|(p, n)| (p.clone(), *n)).collect();
                ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                (community.clone(), ranked)
            })
            .collect()
    }

    fn record(&mut self, community: Option<&str>, person: &str) {
        *self
            .counts
            .entry(community.map(str::to_string))
            .or_default()
            .entry(person.to_string())
            .or_default() += 1;
    }
}

pub fn person_counts(high_fives: &[HighFive], recognizer: &dyn EntityRecognizer) -> PersonCounts {
    let mut counts = PersonCounts::default();

    for high_five in high_fives {
        let people = extract_people(high_five, recognizer);
        if people.is_empty() {
            continue;
        }

        let communities: Vec<&str> = high_five
            .communities
            .iter()
            .map(String::as_str)
            .filter(|c| !c.is_empty())
            .collect();
        if communities.is_empty() {
            for person in &people {
                counts.record(None, person);
            }
        } else {
            for community in communities {
                for person in &people {
                    counts.record(Some(community), person);
                }
            }
        }
    }

    counts
}
