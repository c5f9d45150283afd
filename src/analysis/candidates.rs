//! Candidate name extraction
//!
//! Turns the raw OCR fragment list into an ordered list of catalog queries.
//! Card faces present the primary name in all caps and the subtitle in title
//! case, so fragments are classified into those two shapes plus a weak
//! single-word fallback, and queries are emitted most specific first. The
//! whole path is pure: identical fragments always produce identical output.

use crate::vision::TextFragment;

/// Rules reminder phrases that OCR picks up from the card body
const REMINDER_PHRASES: &[&str] = &[
    "when you play this",
    "whenever this character",
    "when this character",
    "chosen character",
    "chosen opposing",
    "at the start of",
    "at the end of",
    "during your turn",
    "draw a card",
    "into your inkwell",
];

/// Bare type-line words
const TYPE_WORDS: &[&str] = &["character", "action", "item", "location", "song"];

/// Classification keywords that appear beside subtitles on the type line
const EXCLUDED_KEYWORDS: &[&str] = &["Storyborn", "Dreamborn", "Floodborn"];

/// Which name presentation a fragment matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FragmentClass {
    /// All-uppercase primary name presentation
    Main,
    /// Title-cased multi-word subtitle presentation
    Sub,
    /// Single capitalized word, weak signal
    Other,
}

/// Build the ordered candidate-query list for a fragment set.
///
/// Order encodes matching confidence: every MAIN x SUB pair in full
/// `"MAIN - Sub"` identity format, then bare MAIN names, then subtitles,
/// then single-word fallbacks. Duplicates keep their first position.
pub fn candidate_queries(fragments: &[TextFragment]) -> Vec<String> {
    let mut mains: Vec<&str> = Vec::new();
    let mut subs: Vec<&str> = Vec::new();
    let mut others: Vec<&str> = Vec::new();

    for fragment in fragments {
        let text = fragment.text.trim();
        if !is_viable(text) || is_boilerplate(text) {
            continue;
        }

        match classify(text) {
            Some(FragmentClass::Main) => mains.push(text),
            Some(FragmentClass::Sub) => subs.push(text),
            Some(FragmentClass::Other) => others.push(text),
            None => {}
        }
    }

    let mut queries: Vec<String> = Vec::new();
    for main in &mains {
        for sub in &subs {
            push_unique(&mut queries, format!("{} - {}", main, sub));
        }
    }
    for main in &mains {
        push_unique(&mut queries, (*main).to_string());
    }
    for sub in &subs {
        push_unique(&mut queries, (*sub).to_string());
    }
    for other in &others {
        push_unique(&mut queries, (*other).to_string());
    }

    queries
}

/// A fragment is worth classifying if it has at least two characters and at
/// least one alphabetic character
fn is_viable(text: &str) -> bool {
    text.chars().count() >= 2 && text.chars().any(|c| c.is_alphabetic())
}

/// Known non-name boilerplate: collector markers, rules reminder phrases,
/// bare type-line words
fn is_boilerplate(text: &str) -> bool {
    if has_set_count_marker(text) {
        return true;
    }

    let lower = text.to_lowercase();
    if REMINDER_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
        return true;
    }

    TYPE_WORDS.iter().any(|word| lower == *word)
}

/// Collector markers look like "12/204"
fn has_set_count_marker(text: &str) -> bool {
    text.as_bytes()
        .windows(2)
        .any(|w| w[0] == b'/' && w[1].is_ascii_digit())
}

fn classify(text: &str) -> Option<FragmentClass> {
    let length = text.chars().count();
    let has_lowercase = text.chars().any(|c| c.is_lowercase());
    let has_uppercase = text.chars().any(|c| c.is_uppercase());
    let starts_uppercase = text.chars().next().is_some_and(|c| c.is_uppercase());
    let has_space = text.contains(' ');

    if !has_lowercase && has_uppercase && length >= 3 {
        return Some(FragmentClass::Main);
    }
    if has_space && starts_uppercase && has_lowercase && length > 5 && !has_excluded_keyword(text) {
        return Some(FragmentClass::Sub);
    }
    if !has_space && starts_uppercase && length > 3 {
        return Some(FragmentClass::Other);
    }

    None
}

fn has_excluded_keyword(text: &str) -> bool {
    text.split_whitespace()
        .any(|word| EXCLUDED_KEYWORDS.iter().any(|kw| word.eq_ignore_ascii_case(kw)))
}

fn push_unique(queries: &mut Vec<String>, query: String) {
    if !queries.contains(&query) {
        queries.push(query);
    }
}
