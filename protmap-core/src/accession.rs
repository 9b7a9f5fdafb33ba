//! UniProtKB accession syntax
//!
//! Used by the resolver to decide whether an input token is already a
//! canonical identifier and can skip symbol search.

use regex::Regex;
use std::sync::OnceLock;

static ACCESSION: OnceLock<Regex> = OnceLock::new();

const ACCESSION_PATTERN: &str =
    r"^(?:[OPQ][0-9][A-Z0-9]{3}[0-9]|[A-NR-Z][0-9](?:[A-Z][A-Z0-9]{2}[0-9]){1,2})(?:-[0-9]+)?$";

fn accession_regex() -> &'static Regex {
    ACCESSION.get_or_init(|| Regex::new(ACCESSION_PATTERN).expect("accession pattern is valid"))
}

/// Whether `token` matches UniProtKB accession syntax
///
/// Matching is case-insensitive on the trimmed token and accepts an isoform
/// suffix (`P04637-2`).
///
/// ```
/// use protmap_core::accession::looks_like_accession;
///
/// assert!(looks_like_accession("P04637"));
/// assert!(looks_like_accession("a0a024r161"));
/// assert!(!looks_like_accession("TP53"));
/// ```
pub fn looks_like_accession(token: &str) -> bool {
    let token = token.trim();
    !token.is_empty() && accession_regex().is_match(&token.to_uppercase())
}

/// Canonical spelling of an accession-like token
///
/// Returns `None` when the token does not look like an accession.
pub fn canonical_accession(token: &str) -> Option<String> {
    if looks_like_accession(token) {
        Some(token.trim().to_uppercase())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_character_accessions() {
        for accession in ["P04637", "Q04740", "O15169", "P38398", "Q9Y6K9"] {
            assert!(looks_like_accession(accession), "{accession}");
        }
    }

    #[test]
    fn test_ten_character_accessions() {
        assert!(looks_like_accession("A0A024R161"));
        assert!(looks_like_accession("A0A0B4J2F0"));
    }

    #[test]
    fn test_isoform_suffix() {
        assert!(looks_like_accession("P04637-2"));
        assert!(!looks_like_accession("P04637-"));
    }

    #[test]
    fn test_gene_symbols_are_not_accessions() {
        for symbol in ["TP53", "BRCA1", "RNH1", "DICER1", "MYC", "H2AX", ""] {
            assert!(!looks_like_accession(symbol), "{symbol}");
        }
    }

    #[test]
    fn test_case_and_whitespace() {
        assert!(looks_like_accession(" p04637 "));
        assert_eq!(canonical_accession(" p04637 ").as_deref(), Some("P04637"));
        assert_eq!(canonical_accession("TP53"), None);
    }
}
