//! Lexical rewrite of JavaScript object-literal text into valid JSON.
//!
//! The holdings page embeds its data as a JavaScript array of object
//! literals whose keys are bare identifiers. Quoting those keys is the
//! only difference from JSON, so a single regex pass is enough.
//!
//! This is a lexical rewrite, not a grammar-aware transform: a string
//! value containing `,ident:` or `{ident:` would be mangled. The real
//! page never produces that shape, and a full JS grammar parser is out
//! of contract.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A bare identifier key: starts right after `{` or `,`, ends at `:`.
    static ref BARE_KEY: Regex =
        Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:")
            .expect("bare key pattern is valid");
}

/// Quote every bare object key in `fragment`, leaving already-quoted
/// keys and all values untouched.
pub fn normalize_quasi_json(fragment: &str) -> String {
    BARE_KEY
        .replace_all(fragment, "${1}\"${2}\":")
        .into_owned()
}
