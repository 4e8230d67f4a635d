//! MIME type allow-list matching for the `types` configuration member.
//!
//! Patterns are matched case-insensitively against the media type with any
//! parameters stripped. Supported forms: exact (`text/html`), prefix
//! wildcard (`text/*`), suffix wildcard (`*+json`), bare `*`, and `!`
//! negation. A type matches when it hits no negated pattern and either hits
//! a positive pattern or no positive patterns exist.

#[derive(Debug, Clone)]
pub(crate) struct MimeRule {
    patterns: Vec<MimePattern>,
}

#[derive(Debug, Clone)]
struct MimePattern {
    negated: bool,
    kind: PatternKind,
}

#[derive(Debug, Clone)]
enum PatternKind {
    Any,
    Exact(String),
    Prefix(String),
    Suffix(String),
}

impl MimeRule {
    pub(crate) fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let patterns = patterns
            .iter()
            .map(|p| MimePattern::parse(p.as_ref()))
            .collect();
        Self { patterns }
    }

    pub(crate) fn matches(&self, mime_type: &str) -> bool {
        let media = mime_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        let mut any_positive = false;
        let mut positive_hit = false;
        for pattern in &self.patterns {
            let hit = pattern.kind.matches(&media);
            if pattern.negated {
                if hit {
                    return false;
                }
            } else {
                any_positive = true;
                positive_hit |= hit;
            }
        }

        positive_hit || !any_positive
    }
}

impl MimePattern {
    fn parse(pattern: &str) -> Self {
        let (negated, body) = match pattern.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, pattern),
        };
        let body = body.trim().to_ascii_lowercase();

        let kind = if body == "*" {
            PatternKind::Any
        } else if let Some(prefix) = body.strip_suffix('*') {
            PatternKind::Prefix(prefix.to_string())
        } else if let Some(suffix) = body.strip_prefix('*') {
            PatternKind::Suffix(suffix.to_string())
        } else {
            PatternKind::Exact(body)
        };

        Self { negated, kind }
    }
}

impl PatternKind {
    fn matches(&self, media: &str) -> bool {
        match self {
            PatternKind::Any => true,
            PatternKind::Exact(exact) => media == exact,
            PatternKind::Prefix(prefix) => media.starts_with(prefix),
            PatternKind::Suffix(suffix) => media.ends_with(suffix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_strips_parameters() {
        let rule = MimeRule::new(&["text/html"]);
        assert!(rule.matches("text/html"));
        assert!(rule.matches("text/html; charset=utf-8"));
        assert!(!rule.matches("text/plain"));
    }

    #[test]
    fn prefix_wildcard() {
        let rule = MimeRule::new(&["text/*"]);
        assert!(rule.matches("text/plain"));
        assert!(rule.matches("TEXT/CSS"));
        assert!(!rule.matches("application/json"));
    }

    #[test]
    fn suffix_wildcard() {
        let rule = MimeRule::new(&["*+json"]);
        assert!(rule.matches("application/problem+json"));
        assert!(!rule.matches("application/json-seq"));
    }

    #[test]
    fn negation_excludes() {
        let rule = MimeRule::new(&["text/*", "!text/x-raw"]);
        assert!(rule.matches("text/plain"));
        assert!(!rule.matches("text/x-raw"));
    }

    #[test]
    fn only_negations_allow_everything_else() {
        let rule = MimeRule::new(&["!image/png"]);
        assert!(rule.matches("text/plain"));
        assert!(!rule.matches("image/png"));
    }

    #[test]
    fn bare_star_matches_all() {
        let rule = MimeRule::new(&["*"]);
        assert!(rule.matches("anything/at-all"));
    }
}
