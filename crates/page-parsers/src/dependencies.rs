//! Package dependency inference from JavaScript-family code samples.

use once_cell::sync::Lazy;
use regex::Regex;
use toolscout_core_types::{CodeExample, DependencySet};
use tracing::trace;

/// Language tags whose examples are scanned. Matching is exact and case-sensitive.
pub const SCANNED_LANGUAGES: &[&str] = &["javascript", "typescript", "jsx", "tsx"];

static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\s+(?:[\w$*{}\s,]+?\s+from\s+)?["'](?P<path>[^"'\n]+)["']"#)
        .expect("import regex")
});
static REQUIRE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\b(?:const|let|var)\s+(?:[\w$]+|\{[^}]*\})\s*=\s*require\s*\(\s*["'](?P<path>[^"'\n]+)["']\s*\)"#,
    )
    .expect("require regex")
});

/// Union of package names imported or required by the scanned examples.
pub fn detect_dependencies(examples: &[CodeExample]) -> DependencySet {
    let mut dependencies = DependencySet::new();
    for example in examples
        .iter()
        .filter(|example| SCANNED_LANGUAGES.contains(&example.language.as_str()))
    {
        let paths = IMPORT_RE
            .captures_iter(&example.code)
            .chain(REQUIRE_RE.captures_iter(&example.code))
            .map(|caps| caps["path"].trim().to_string());
        for path in paths {
            match package_name(&path) {
                Some(package) => {
                    dependencies.insert(package);
                }
                None => trace!(target: "page-parsers", %path, "skipping local import"),
            }
        }
    }
    dependencies
}

/// Normalize a module path to the package that provides it.
///
/// Local paths (leading `.` or `/`) yield `None`. Scoped paths keep `@scope/name`, other paths keep
/// their first segment.
pub fn package_name(path: &str) -> Option<String> {
    if path.is_empty() || path.starts_with('.') || path.starts_with('/') {
        return None;
    }

    let mut segments = path.split('/');
    let first = segments.next()?;
    if first.starts_with('@') {
        return match segments.next() {
            Some(name) if !name.is_empty() => Some(format!("{first}/{name}")),
            _ => Some(first.to_string()),
        };
    }
    Some(first.to_string())
}
