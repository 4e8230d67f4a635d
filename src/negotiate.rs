//! `Accept-Encoding` negotiation.
//!
//! Parses the weighted coding list of RFC 9110 §12.5.3 and picks the best
//! scheme present in the enabled table. Quality-less codings take the slot
//! unconditionally; an explicit weight replaces the current choice unless it
//! is zero or lower than the tracked weight, so equal weights resolve to the
//! last one written. `identity;q=0` (and `*;q=0`) is tracked separately: if
//! identity ends up selected but was explicitly excluded, the whole request
//! is unacceptable.

use crate::error::NotAcceptable;
use crate::registry::CompressorConfig;
use crate::scheme::Scheme;

/// Selects an index into `table` for the given `Accept-Encoding` value.
///
/// An empty or unparseable value selects identity (slot 0).
pub(crate) fn select(header: &str, table: &[CompressorConfig]) -> Result<usize, NotAcceptable> {
    let mut identity_allowed = true;
    let mut idx = 0usize;
    let mut weight = 0.0f64;

    for entry in header.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (coding, qval) = split_weight(entry);

        let Some(candidate) = lookup_enabled(coding, table) else {
            continue;
        };
        let scheme = table[candidate].ctype.scheme;
        tracing::trace!(coding, ?qval, candidate, "considering coding");

        if qval == Some(0.0) && scheme == Scheme::Identity {
            identity_allowed = false;
        }

        if let Some(q) = qval {
            if q == 0.0 || q < weight {
                continue;
            }
        }

        idx = candidate;
        weight = qval.unwrap_or(-1.0);
    }

    if idx == 0 && !identity_allowed {
        return Err(NotAcceptable);
    }

    tracing::trace!(selected = table[idx].ctype.token, "negotiated");
    Ok(idx)
}

/// Splits `coding;q=value` into the coding and its parsed weight. A missing
/// `;q=` yields `None`; a malformed value parses as 0.0, the way `atof`
/// would.
fn split_weight(entry: &str) -> (&str, Option<f64>) {
    match entry.split_once(';') {
        None => (entry, None),
        Some((coding, params)) => {
            let params = params.trim();
            let qval = params
                .strip_prefix("q=")
                .or_else(|| params.strip_prefix("Q="))
                .map(|v| v.trim().parse::<f64>().unwrap_or(0.0));
            (coding.trim(), qval)
        }
    }
}

/// Resolves a coding against the enabled table. `*` counts as identity for
/// matching purposes; codings not in the table resolve to nothing and are
/// ignored by the caller.
fn lookup_enabled(coding: &str, table: &[CompressorConfig]) -> Option<usize> {
    if coding.starts_with('*') {
        return Some(0);
    }
    table
        .iter()
        .position(|c| c.ctype.token.eq_ignore_ascii_case(coding))
}

#[cfg(test)]
mod tests {
    use crate::CompressorRegistry;

    fn registry(json: &str) -> CompressorRegistry {
        CompressorRegistry::from_config(&serde_json::from_str(json).unwrap()).unwrap()
    }

    fn gzip_br() -> CompressorRegistry {
        registry(r#"{ "compressors": [{ "encoding": "gzip" }, { "encoding": "br" }] }"#)
    }

    #[test]
    fn empty_header_selects_identity() {
        assert_eq!(gzip_br().negotiate("").unwrap(), 0);
        let identity_only = registry(r#"{ "compressors": [] }"#);
        assert_eq!(identity_only.negotiate("").unwrap(), 0);
    }

    #[test]
    fn bare_wildcard_selects_identity() {
        assert_eq!(gzip_br().negotiate("*").unwrap(), 0);
    }

    #[test]
    fn highest_weight_wins() {
        // gzip is slot 1, br slot 2
        assert_eq!(gzip_br().negotiate("gzip;q=0.5, br;q=0.8").unwrap(), 2);
        assert_eq!(gzip_br().negotiate("gzip;q=0.9, br;q=0.8").unwrap(), 1);
    }

    #[test]
    fn equal_weights_resolve_to_last_written() {
        assert_eq!(gzip_br().negotiate("gzip;q=0.5, br;q=0.5").unwrap(), 2);
        assert_eq!(gzip_br().negotiate("br;q=0.5, gzip;q=0.5").unwrap(), 1);
    }

    #[test]
    fn unweighted_coding_takes_the_slot() {
        // The literal replacement behavior: an unweighted coding tracks a
        // weight below any explicit one, so a later explicit entry still
        // takes over.
        assert_eq!(gzip_br().negotiate("gzip, br;q=0.5").unwrap(), 2);
        assert_eq!(gzip_br().negotiate("br;q=0.5, gzip").unwrap(), 1);
    }

    #[test]
    fn zero_weight_rejects_the_coding() {
        let gzip_only = registry(r#"{ "compressors": { "encoding": "gzip" } }"#);
        assert_eq!(gzip_only.negotiate("gzip;q=0").unwrap(), 0);
        assert_eq!(gzip_br().negotiate("gzip;q=0, br").unwrap(), 2);
    }

    #[test]
    fn unknown_codings_are_ignored() {
        assert_eq!(gzip_br().negotiate("snappy, compress;q=1.0").unwrap(), 0);
        assert_eq!(gzip_br().negotiate("snappy, gzip").unwrap(), 1);
    }

    #[test]
    fn identity_zero_alone_is_rejected() {
        let identity_only = registry(r#"{ "compressors": [] }"#);
        assert!(identity_only.negotiate("identity;q=0").is_err());
        assert!(identity_only.negotiate("*;q=0").is_err());
    }

    #[test]
    fn identity_and_all_schemes_excluded_is_rejected() {
        let gzip_only = registry(r#"{ "compressors": { "encoding": "gzip" } }"#);
        assert!(gzip_only.negotiate("identity;q=0, gzip;q=0").is_err());
    }

    #[test]
    fn identity_excluded_but_scheme_available_succeeds() {
        let gzip_only = registry(r#"{ "compressors": { "encoding": "gzip" } }"#);
        assert_eq!(gzip_only.negotiate("identity;q=0, gzip").unwrap(), 1);
    }

    #[test]
    fn malformed_weight_counts_as_zero() {
        let gzip_only = registry(r#"{ "compressors": { "encoding": "gzip" } }"#);
        assert_eq!(gzip_only.negotiate("gzip;q=abc").unwrap(), 0);
    }

    #[test]
    fn token_match_is_case_insensitive() {
        assert_eq!(gzip_br().negotiate("GZip").unwrap(), 1);
    }
}
