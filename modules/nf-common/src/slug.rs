//! URL-safe slug generation.
//!
//! `slugify` covers the common case (derive a slug from an article title).
//! `hub_slug` reproduces the country-hub naming convention
//! `{country}-relocation-{diverse-keywords}-guide` so that scenario
//! expectations like `slovakia-relocation-…-guide` hold.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());
static DASH_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

pub fn slugify(input: &str) -> String {
    let lower = input.to_lowercase();
    let dashed = NON_ALNUM.replace_all(&lower, "-");
    let collapsed = DASH_RUN.replace_all(&dashed, "-");
    collapsed.trim_matches('-').to_string()
}

const FILLER_WORDS: &[&str] = &["in", "to", "for", "the", "a", "an", "of", "and", "from", "with"];

fn extract_keyword_terms(keyword: &str, location_name: &str) -> Vec<String> {
    let location_lower = location_name.to_lowercase();
    keyword
        .to_lowercase()
        .split_whitespace()
        .map(|w| NON_ALNUM.replace_all(w, "").to_string())
        .filter(|w| {
            !w.is_empty() && w.len() > 1 && w != &location_lower && !FILLER_WORDS.contains(&w.as_str())
        })
        .collect()
}

/// Builds `{location}-relocation-{keywords}-guide`, capped at `max_words`
/// total words and deduplicating terms across the supplied keyword list.
pub fn hub_slug(location_name: &str, keywords: &[String], max_words: usize) -> String {
    let location_slug = slugify(location_name);
    let location_words = location_slug.split('-').count().max(1);
    let reserved = location_words + 1 /* relocation */ + 1 /* guide */;
    let available = max_words.saturating_sub(reserved);

    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut terms = Vec::new();
    for kw in keywords {
        for term in extract_keyword_terms(kw, location_name) {
            if seen.insert(term.clone()) {
                terms.push(term);
            }
            if terms.len() >= available {
                break;
            }
        }
        if terms.len() >= available {
            break;
        }
    }

    let mut parts = vec![location_slug, "relocation".to_string()];
    parts.extend(terms);
    parts.push("guide".to_string());
    let joined = parts.join("-");
    DASH_RUN.replace_all(&joined, "-").trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_handles_punctuation_and_case() {
        assert_eq!(slugify("Cyprus Digital Nomad Visa 2025"), "cyprus-digital-nomad-visa-2025");
        assert_eq!(slugify("What's New?!  -- Big Deal"), "what-s-new-big-deal");
    }

    #[test]
    fn slugify_is_idempotent() {
        let once = slugify("Hello, World!!");
        assert_eq!(slugify(&once), once);
    }

    #[test]
    fn hub_slug_has_location_relocation_and_guide() {
        let slug = hub_slug(
            "Slovakia",
            &["Slovakia digital nomad visa".to_string(), "Slovakia cost of living".to_string()],
            12,
        );
        assert!(slug.starts_with("slovakia-relocation-"));
        assert!(slug.ends_with("-guide"));
    }
}
