//! Documentation-link heuristics used by the guided crawl.

use serde_json::Value;
use toolscout_core_types::{FactMap, LinkCandidate};

/// Keywords matched against lowercased link text.
pub const TEXT_KEYWORDS: &[&str] = &["doc", "guide", "start", "quick", "install", "api"];
/// Keywords matched against lowercased link hrefs.
pub const HREF_KEYWORDS: &[&str] = &[
    "docs",
    "guide",
    "getting-started",
    "quick-start",
    "install",
    "api",
];
/// Phrases that make a documentation candidate worth following.
pub const FOLLOW_PHRASES: &[&str] = &["quick start", "getting started"];

pub fn is_documentation_candidate(link: &LinkCandidate) -> bool {
    contains_any(link.text.as_deref(), TEXT_KEYWORDS)
        || contains_any(link.href.as_deref(), HREF_KEYWORDS)
}

/// Documentation candidates in observed order.
pub fn documentation_candidates(links: &[LinkCandidate]) -> Vec<&LinkCandidate> {
    links
        .iter()
        .filter(|link| is_documentation_candidate(link))
        .collect()
}

/// First candidate whose text names a quick-start or getting-started page.
///
/// Candidates that only matched on their href are never chosen, even though they pass the filter.
/// The choice ignores the href: a chosen link without one ends the crawl without a hop.
pub fn select_guided_link(links: &[LinkCandidate]) -> Option<&LinkCandidate> {
    documentation_candidates(links)
        .into_iter()
        .find(|link| contains_any(link.text.as_deref(), FOLLOW_PHRASES))
}

/// Read the `links` array of a page observation. Bare strings are treated as hrefs.
pub fn links_from_observation(observation: &FactMap) -> Vec<LinkCandidate> {
    let Some(entries) = observation.get("links").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(href) => Some(LinkCandidate::new(None, Some(href))),
            Value::Object(map) => {
                let text = map.get("text").and_then(Value::as_str);
                let href = map
                    .get("href")
                    .or_else(|| map.get("url"))
                    .and_then(Value::as_str);
                (text.is_some() || href.is_some()).then(|| LinkCandidate::new(text, href))
            }
            _ => None,
        })
        .collect()
}

fn contains_any(haystack: Option<&str>, needles: &[&str]) -> bool {
    let Some(haystack) = haystack else {
        return false;
    };
    let lowered = haystack.to_lowercase();
    needles.iter().any(|needle| lowered.contains(needle))
}
