//! Session identifier serialization.
//!
//! A session is addressed by a caller-chosen identifier: a plain string, an
//! ordered list, or a structured record. The identifier is folded into a
//! canonical `SessionKey` so that deep-equal identifiers always hit the same
//! cache slot within a run. List and record identifiers are carried as JSON
//! values; canonicalization sorts object keys at every level, so field order
//! in the caller's literal does not matter.
//!
//! Pathological identifiers (very deep nesting, very large payloads) are
//! rejected up front with a diagnostic instead of being serialized at any
//! cost. Owned JSON values cannot be cyclic, so reference cycles are not a
//! runtime concern here.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::error::SessionError;

/// Guard rails applied while canonicalizing composite identifiers.
#[derive(Debug, Clone, Copy)]
pub struct KeyLimits {
    /// Maximum nesting depth of a list/record identifier.
    pub max_depth: usize,
    /// Maximum byte length of the canonical form.
    pub max_bytes: usize,
}

impl Default for KeyLimits {
    fn default() -> Self {
        Self {
            max_depth: 32,
            max_bytes: 64 * 1024,
        }
    }
}

/// A caller-chosen session identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionId {
    /// Plain string id, used verbatim.
    Text(String),
    /// Ordered list or structured record, deep-serialized into the key.
    Composite(Value),
}

impl SessionId {
    pub fn text(id: impl Into<String>) -> Self {
        SessionId::Text(id.into())
    }

    pub fn composite(value: Value) -> Self {
        SessionId::Composite(value)
    }

    /// Derive the canonical cache key for this identifier.
    ///
    /// Text ids and composite ids live in disjoint key namespaces: a string
    /// that happens to spell out JSON can never collide with a list or
    /// record identifier.
    pub fn to_key(&self, limits: &KeyLimits) -> Result<SessionKey, SessionError> {
        match self {
            SessionId::Text(id) => {
                if id.len() > limits.max_bytes {
                    return Err(SessionError::IdentifierRejected {
                        reason: format!(
                            "string id is {} bytes, limit is {}",
                            id.len(),
                            limits.max_bytes
                        ),
                    });
                }
                Ok(SessionKey(format!("str:{id}")))
            }
            SessionId::Composite(value) => {
                let mut canonical = String::new();
                write_canonical(value, 0, limits, &mut canonical)?;
                if canonical.len() > limits.max_bytes {
                    return Err(SessionError::IdentifierRejected {
                        reason: format!(
                            "canonical form is {} bytes, limit is {}; use a smaller identifier",
                            canonical.len(),
                            limits.max_bytes
                        ),
                    });
                }
                Ok(SessionKey(format!("json:{canonical}")))
            }
        }
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        SessionId::Text(id.to_string())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        SessionId::Text(id)
    }
}

impl From<Value> for SessionId {
    fn from(value: Value) -> Self {
        SessionId::Composite(value)
    }
}

/// Canonical cache key derived from a [`SessionId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Sha256 hex digest of the key. Used as the persisted-store filename
    /// and as the short handle shown by the CLI.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn short_digest(&self) -> String {
        let mut digest = self.digest();
        digest.truncate(12);
        digest
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Render `value` as canonical JSON: object keys sorted at every level,
/// no insignificant whitespace.
fn write_canonical(
    value: &Value,
    depth: usize,
    limits: &KeyLimits,
    out: &mut String,
) -> Result<(), SessionError> {
    if depth > limits.max_depth {
        return Err(SessionError::IdentifierRejected {
            reason: format!("identifier nests deeper than {} levels", limits.max_depth),
        });
    }
    if out.len() > limits.max_bytes {
        return Err(SessionError::IdentifierRejected {
            reason: format!(
                "canonical form exceeds {} bytes; use a smaller identifier",
                limits.max_bytes
            ),
        });
    }

    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => {
            let quoted =
                serde_json::to_string(s).map_err(|err| SessionError::IdentifierRejected {
                    reason: format!("string field could not be serialized: {err}"),
                })?;
            out.push_str(&quoted);
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, depth + 1, limits, out)?;
            }
            out.push(']');
        }
        Value::Object(fields) => {
            let sorted: BTreeMap<&String, &Value> = fields.iter().collect();
            out.push('{');
            for (i, (name, field)) in sorted.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let quoted =
                    serde_json::to_string(name).map_err(|err| SessionError::IdentifierRejected {
                        reason: format!("field name could not be serialized: {err}"),
                    })?;
                out.push_str(&quoted);
                out.push(':');
                write_canonical(field, depth + 1, limits, out)?;
            }
            out.push('}');
        }
    }

    Ok(())
}
