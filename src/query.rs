//! Header-extraction expressions.
//!
//! A minimal rendition of the host's template evaluator, covering the forms
//! this crate compiles: `$header_<name>` pulls a request header (underscores
//! become hyphens, repeated fields are joined with `", "`), anything without
//! a leading `$` evaluates to itself.

use crate::error::ConfigError;
use http::{HeaderMap, HeaderName};

#[derive(Debug, Clone)]
pub(crate) enum HeaderQuery {
    Literal(String),
    Header(HeaderName),
}

impl HeaderQuery {
    pub(crate) fn compile(expr: &str) -> Result<Self, ConfigError> {
        if let Some(name) = expr.strip_prefix("$header_") {
            let name = name.replace('_', "-");
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ConfigError::InvalidHeaderQuery(expr.to_string()))?;
            return Ok(HeaderQuery::Header(name));
        }
        if expr.starts_with('$') {
            return Err(ConfigError::InvalidHeaderQuery(expr.to_string()));
        }
        Ok(HeaderQuery::Literal(expr.to_string()))
    }

    pub(crate) fn evaluate(&self, headers: &HeaderMap) -> Option<String> {
        match self {
            HeaderQuery::Literal(value) => Some(value.clone()),
            HeaderQuery::Header(name) => {
                let values: Vec<&str> = headers
                    .get_all(name)
                    .iter()
                    .filter_map(|v| v.to_str().ok())
                    .collect();
                if values.is_empty() {
                    None
                } else {
                    Some(values.join(", "))
                }
            }
        }
    }
}
