//! Best-effort lexical parsers over raw page markup and the code found in it.
//!
//! None of these parsers build a DOM. Malformed or partially nested markup under- or over-matches
//! but never produces an error.

pub mod code_examples;
pub mod dependencies;
pub mod links;

pub use code_examples::extract_code_examples;
pub use dependencies::{detect_dependencies, package_name, SCANNED_LANGUAGES};
pub use links::{
    documentation_candidates, is_documentation_candidate, links_from_observation,
    select_guided_link,
};
