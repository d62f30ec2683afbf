//! Raw listing record → [`HighFive`].
//!
//! The markup is a small card:
//!
//! ```html
//! <div class="highfive-card">
//!   <span class="field-communityname">Maple Ridge</span>
//!   <div class="field-message">...</div>
//!   <div class="field-highfivedate">Sep 15, 2023</div>
//!   <div class="field-firstname">Samantha</div>
//! </div>
//! ```
//!
//! Each field is looked up independently inside the card. A missing card or
//! element leaves that field empty; only a missing message drops the record.
//! Community spans are kept even when blank, so a post that names a community
//! is never treated as unscoped.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use highfive_client::RawRecord;
use highfive_common::{parse_card_date, sanitize, HighFive};

static CARD: LazyLock<Selector> = LazyLock::new(|| selector("div.highfive-card"));
static COMMUNITY: LazyLock<Selector> = LazyLock::new(|| selector("span.field-communityname"));
static MESSAGE: LazyLock<Selector> = LazyLock::new(|| selector("div.field-message"));
static DATE: LazyLock<Selector> = LazyLock::new(|| selector("div.field-highfivedate"));
static FIRST_NAME: LazyLock<Selector> = LazyLock::new(|| selector("div.field-firstname"));

fn selector(css: &str) -> Selector {
    // Constant selectors; a parse failure is a programming error.
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css}: {e:?}"))
}

/// Parse one record. Returns `None` when the message can't be recovered.
pub fn extract(raw: &RawRecord) -> Option<HighFive> {
    let fragment = Html::parse_fragment(&raw.html);
    let card = fragment.select(&CARD).next();
    if card.is_none() {
        debug!(id = %raw.id, "No high five card in record");
    }

    let message = card.and_then(|c| first_text(c, &MESSAGE));
    let date_text = card.and_then(|c| first_text(c, &DATE));
    let name = card.and_then(|c| first_text(c, &FIRST_NAME));
    let communities = card
        .map(|c| {
            c.select(&COMMUNITY)
                .map(|el| sanitize(&element_text(el)))
                .collect()
        })
        .unwrap_or_default();

    let date = date_text.as_deref().and_then(|text| {
        let parsed = parse_card_date(text);
        if parsed.is_none() {
            info!(id = %raw.id, date = text, "Unparsable high five date, leaving it empty");
        }
        parsed
    });

    let message = message?;

    Some(HighFive {
        id: raw.id.clone(),
        date,
        name,
        communities,
        message: Some(message),
    })
}

/// Extract a batch, keeping upstream order and dropping message-less records.
pub fn extract_all(records: &[RawRecord]) -> Vec<HighFive> {
    let high_fives: Vec<HighFive> = records.iter().filter_map(extract).collect();
    let dropped = records.len() - high_fives.len();
    if dropped > 0 {
        info!(dropped, kept = high_fives.len(), "Dropped records without a message");
    }
    high_fives
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| sanitize(&element_text(el)))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}
