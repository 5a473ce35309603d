//! Headline screening: risk scoring, relevance, and alias seeds.
//!
//! Scoring is keyword based. Each high-risk keyword present in a text adds
//! two points and each medium-risk keyword adds one:
//!
//! | Score | Level  |
//! |-------|--------|
//! | >= 2  | High   |
//! | 1     | Medium |
//! | 0     | Low    |

use crate::models::RiskLevel;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

const HIGH_RISK_KEYWORDS: &[&str] = &[
    "fraud",
    "money laundering",
    "scam",
    "crime",
    "corruption",
    "sanction",
    "arrest",
    "convicted",
    "charged",
];

const MEDIUM_RISK_KEYWORDS: &[&str] = &["investigation", "probe", "regulatory", "lawsuit", "review"];

const ADVERSE_KEYWORDS: &[&str] = &[
    "fraud",
    "sanction",
    "arrest",
    "investigation",
    "scam",
    "money laundering",
    "charged",
    "lawsuit",
    "convicted",
    "corruption",
];

/// Known spellings of frequently screened entities, keyed by lower-cased name.
static ALIAS_SEEDS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    HashMap::from([
        (
            "litasco",
            &["Litasco", "Litasco SA", "LUKOIL Litasco", "Lukoil Litasco"][..],
        ),
        (
            "vijay mallya",
            &[
                "Vijay Mallya",
                "Vijay M. Mallya",
                "Vijay Mallya (businessman)",
                "Kingfisher Airlines Vijay Mallya",
            ][..],
        ),
        ("kubair mullchandi", &["Kubair Mullchandi", "K. Mullchandi"][..]),
        ("lukoil", &["Lukoil", "PJSC Lukoil", "LUKOIL"][..]),
    ])
});

static ADVERSE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let alternatives = ADVERSE_KEYWORDS.iter().map(|k| regex::escape(k)).join("|");
    Regex::new(&alternatives).expect("adverse keyword pattern is valid")
});

/// Score a text against the risk keyword lists.
pub fn risk_level(text: &str) -> RiskLevel {
    let lower = text.to_lowercase();
    let high = HIGH_RISK_KEYWORDS.iter().filter(|k| lower.contains(*k)).count() * 2;
    let medium = MEDIUM_RISK_KEYWORDS.iter().filter(|k| lower.contains(*k)).count();
    match high + medium {
        0 => RiskLevel::Low,
        1 => RiskLevel::Medium,
        _ => RiskLevel::High,
    }
}

/// Cut `text` to at most `max_chars` characters, appending `...` when cut.
pub fn summarize(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
    }
}

/// Normalized Levenshtein similarity at which a title counts as naming an alias.
pub const TITLE_SIMILARITY: f64 = 0.78;

/// Whether a headline concerns the screened entity.
///
/// True when any alias appears as a whole word in title + summary, when the
/// title is a near-spelling of an alias (at least [`TITLE_SIMILARITY`]), or
/// when the text carries an adverse keyword at all.
pub fn is_relevant(aliases: &[String], title: &str, summary: &str) -> bool {
    let text = format!("{title} {summary}").to_lowercase();
    let alias_hit = aliases.iter().any(|alias| {
        let alias = alias.trim().to_lowercase();
        if alias.is_empty() {
            return false;
        }
        Regex::new(&format!(r"\b{}\b", regex::escape(&alias)))
            .map(|re| re.is_match(&text))
            .unwrap_or(false)
    });
    alias_hit || title_resembles_alias(aliases, title) || ADVERSE_PATTERN.is_match(&text)
}

fn title_resembles_alias(aliases: &[String], title: &str) -> bool {
    let title = title.trim().to_lowercase();
    if title.is_empty() {
        return false;
    }
    aliases.iter().any(|alias| {
        let alias = alias.trim().to_lowercase();
        !alias.is_empty() && strsim::normalized_levenshtein(&alias, &title) >= TITLE_SIMILARITY
    })
}

/// The trimmed term followed by its built-in alias seeds, de-duplicated.
pub fn aliases_for(term: &str) -> Vec<String> {
    let term = term.trim();
    let seeds = ALIAS_SEEDS
        .get(term.to_lowercase().as_str())
        .copied()
        .unwrap_or_default();
    std::iter::once(term)
        .chain(seeds.iter().copied())
        .filter(|a| !a.is_empty())
        .unique()
        .map(str::to_string)
        .collect()
}
