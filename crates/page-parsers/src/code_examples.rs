//! Code block extraction from serialized page markup.
//!
//! A block is a `<pre>` element, optionally wrapping a `<code>` element. Either tag may carry the
//! class that names the language. The patterns below are fixed contracts; `tests/markup_contract.rs`
//! pins them.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use toolscout_core_types::{CodeExample, DEFAULT_LANGUAGE};
use tracing::debug;

static BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<pre\b(?P<outer>[^>]*)>\s*(?:<code\b(?P<inner>[^>]*)>)?(?P<body>.*?)(?:</code\s*>\s*)?</pre\s*>",
    )
    .expect("code block regex")
});
static CLASS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bclass\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^\s"'>]+))"#)
        .expect("class attribute regex")
});
static FILENAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:data-filename|data-title|title)\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#)
        .expect("filename attribute regex")
});
static LANGUAGE_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"\blanguage-(?P<lang>[\w+#]+)").expect("language- regex"),
        Regex::new(r"\blang-(?P<lang>[\w+#]+)").expect("lang- regex"),
        Regex::new(r"\b(?P<lang>[\w+#]+)-code\b").expect("-code regex"),
    ]
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[A-Za-z][^>]*>").expect("tag regex"));
static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(?P<name>lt|gt|amp|quot|#39);").expect("entity regex"));

/// Scan markup for code blocks and return them in document order.
pub fn extract_code_examples(markup: &str) -> Vec<CodeExample> {
    let examples: Vec<CodeExample> = BLOCK_RE
        .captures_iter(markup)
        .map(|caps| {
            let outer = caps.name("outer").map(|m| m.as_str()).unwrap_or_default();
            let inner = caps.name("inner").map(|m| m.as_str()).unwrap_or_default();
            let body = caps.name("body").map(|m| m.as_str()).unwrap_or_default();

            let language = detect_language([inner, outer])
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
            let stripped = TAG_RE.replace_all(body, "");
            let code = decode_entities(&stripped).trim().to_string();

            let mut example = CodeExample::new(language, code);
            if let Some(filename) = attribute_value(&FILENAME_RE, inner)
                .or_else(|| attribute_value(&FILENAME_RE, outer))
                .filter(|name| !name.trim().is_empty())
            {
                example = example.with_filename(decode_entities(filename.trim()));
            }
            example
        })
        .collect();

    debug!(target: "page-parsers", count = examples.len(), "extracted code blocks");
    examples
}

/// Language named by the first class attribute that matches one of the naming conventions.
fn detect_language<'a>(attribute_sets: impl IntoIterator<Item = &'a str>) -> Option<String> {
    attribute_sets.into_iter().find_map(|attrs| {
        let class = attribute_value(&CLASS_RE, attrs)?;
        LANGUAGE_PATTERNS
            .iter()
            .find_map(|pattern| pattern.captures(class).map(|caps| caps["lang"].to_string()))
    })
}

fn attribute_value<'a>(pattern: &Regex, attrs: &'a str) -> Option<&'a str> {
    let caps = pattern.captures(attrs)?;
    caps.name("dq")
        .or_else(|| caps.name("sq"))
        .or_else(|| caps.name("bare"))
        .map(|m| m.as_str())
}

/// Decode the five handled entities until none remain, so `&amp;lt;` ends up as `<`.
pub fn decode_entities(input: &str) -> String {
    let mut decoded = input.to_string();
    while ENTITY_RE.is_match(&decoded) {
        decoded = ENTITY_RE
            .replace_all(&decoded, |caps: &Captures| match &caps["name"] {
                "lt" => "<",
                "gt" => ">",
                "amp" => "&",
                "quot" => "\"",
                _ => "'",
            })
            .into_owned();
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_language_from_inner_code_class() {
        let markup = r#"<pre><code class="hljs language-typescript">const x: number = 1;</code></pre>"#;
        let examples = extract_code_examples(markup);
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].language, "typescript");
        assert_eq!(examples[0].code, "const x: number = 1;");
    }

    #[test]
    fn reads_language_from_outer_pre_class() {
        let markup = "<pre class='lang-rust'>\n<code>fn main() {}</code>\n</pre>";
        let examples = extract_code_examples(markup);
        assert_eq!(examples[0].language, "rust");
    }

    #[test]
    fn recognizes_suffix_convention() {
        let markup = r#"<pre class="block python-code">print("hi")</pre>"#;
        let examples = extract_code_examples(markup);
        assert_eq!(examples[0].language, "python");
        assert_eq!(examples[0].code, "print(\"hi\")");
    }

    #[test]
    fn defaults_to_javascript() {
        let markup = r#"<pre class="snippet"><code>let a = 1;</code></pre>"#;
        let examples = extract_code_examples(markup);
        assert_eq!(examples[0].language, DEFAULT_LANGUAGE);
    }

    #[test]
    fn decodes_entities_and_trims() {
        let markup = "<pre><code>\n  if (a &lt; b &amp;&amp; c &gt; d) { s = &quot;it&#39;s&quot;; }\n</code></pre>";
        let examples = extract_code_examples(markup);
        assert_eq!(
            examples[0].code,
            "if (a < b && c > d) { s = \"it's\"; }"
        );
    }

    #[test]
    fn double_encoded_entities_do_not_survive() {
        assert_eq!(decode_entities("&amp;lt;div&amp;gt;"), "<div>");
        assert_eq!(decode_entities("plain"), "plain");
    }

    #[test]
    fn strips_highlighting_spans() {
        let markup = r#"<pre><code class="language-js"><span class="kw">import</span> x <span>from</span> <span class="str">&#39;lodash&#39;</span></code></pre>"#;
        let examples = extract_code_examples(markup);
        assert_eq!(examples[0].code, "import x from 'lodash'");
    }

    #[test]
    fn raw_comparison_operators_are_not_tags() {
        let markup = "<pre><code>if a < b && c > d { <b>swap</b>(a, c) }</code></pre>";
        let examples = extract_code_examples(markup);
        assert_eq!(examples[0].code, "if a < b && c > d { swap(a, c) }");
    }

    #[test]
    fn captures_filename_attribute() {
        let markup = r#"<pre data-filename="app.tsx"><code class="language-tsx">export {}</code></pre>"#;
        let examples = extract_code_examples(markup);
        assert_eq!(examples[0].filename.as_deref(), Some("app.tsx"));
        assert_eq!(examples[0].description, None);
    }
}
