//! Path Templates - Format Negotiation
//!
//! Asset paths in pack documents may contain tokens of the form
//! `{name:option:value:option:value:...}`. Resolution substitutes each
//! token with the value paired to the first option the runtime supports.
//!
//! Two token names are special:
//! - `{lq:lqValue:hqValue}` selects on the quality flag instead of a format.
//! - `{name}` without options expands a configured macro (one level).

use std::collections::BTreeMap;

use thiserror::Error;

use crate::capability::Capabilities;

pub const QUALITY_TOKEN: &str = "lq";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("No supported format for token {token} in path {path}")]
    UnsupportedFormatToken { token: String, path: String },

    #[error("Unterminated template token in path {path}")]
    UnterminatedToken { path: String },
}

/// Resolves templated paths against a fixed set of macros.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    macros: BTreeMap<String, String>,
}

impl PathResolver {
    pub fn new(macros: BTreeMap<String, String>) -> Self {
        Self { macros }
    }

    /// Resolve `path` for the given capabilities. `low_quality` selects the
    /// `lq` branch of quality tokens.
    pub fn resolve(
        &self,
        path: &str,
        capabilities: &Capabilities,
        low_quality: bool,
    ) -> Result<String, TemplateError> {
        let expanded = self.expand_macros(path)?;
        substitute(&expanded, path, |token| {
            resolve_token(token, capabilities, low_quality)
        })
    }

    fn expand_macros(&self, path: &str) -> Result<String, TemplateError> {
        substitute(path, path, |token| {
            if token.contains(':') {
                return Ok(None);
            }
            Ok(self.macros.get(token).cloned())
        })
    }
}

/// Walk `input`, calling `replace` with the body of every `{...}` token.
/// `Ok(None)` keeps the token verbatim.
fn substitute<F>(input: &str, original: &str, mut replace: F) -> Result<String, TemplateError>
where
    F: FnMut(&str) -> Result<Option<String>, TokenFailure>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('}').ok_or_else(|| TemplateError::UnterminatedToken {
            path: original.to_string(),
        })?;
        let body = &after[..end];

        match replace(body) {
            Ok(Some(value)) => out.push_str(&value),
            Ok(None) => {
                out.push('{');
                out.push_str(body);
                out.push('}');
            }
            Err(TokenFailure) => {
                return Err(TemplateError::UnsupportedFormatToken {
                    token: format!("{{{}}}", body),
                    path: original.to_string(),
                });
            }
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Marker for a token with no viable substitution.
struct TokenFailure;

fn resolve_token(
    body: &str,
    capabilities: &Capabilities,
    low_quality: bool,
) -> Result<Option<String>, TokenFailure> {
    let mut parts = body.split(':');
    let name = parts.next().unwrap_or_default();
    let options: Vec<&str> = parts.collect();

    if options.is_empty() {
        // Unknown bare token, leave as literal text
        return Ok(None);
    }

    if name == QUALITY_TOKEN {
        let value = if low_quality {
            options[0]
        } else {
            options.get(1).copied().unwrap_or_default()
        };
        return Ok(Some(value.to_string()));
    }

    for pair in options.chunks(2) {
        match pair {
            [option, value] if capabilities.supports(option) => {
                return Ok(Some((*value).to_string()));
            }
            [fallback] => return Ok(Some((*fallback).to_string())),
            _ => {}
        }
    }

    Err(TokenFailure)
}
