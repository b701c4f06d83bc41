//! Canonical JSON bytes: the single serialization-for-hashing implementation.
//!
//! Every digest in the workspace (state fingerprints, plan digests, policy
//! and report digests) is computed over bytes produced here.
//!
//! # Canonicalization rules
//!
//! 1. Object keys sorted by byte order, at every level.
//! 2. Compact form, no whitespace.
//! 3. Strings escaped by `serde_json` (RFC 8259).
//! 4. Numbers must be integers; floats are rejected so that formatting can
//!    never drift across platforms.

/// Error type for canonical JSON serialization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanonError {
    /// A JSON number was not an integer.
    #[error("non-integer number in canonical JSON: {raw}")]
    NonIntegerNumber { raw: String },
}

/// Produce canonical JSON bytes from a `serde_json::Value`.
///
/// # Errors
///
/// Returns [`CanonError::NonIntegerNumber`] if any number is not
/// representable as `i64` or `u64`.
pub fn canonical_json_bytes(value: &serde_json::Value) -> Result<Vec<u8>, CanonError> {
    let mut out = Vec::new();
    emit(&mut out, value)?;
    Ok(out)
}

fn emit(out: &mut Vec<u8>, value: &serde_json::Value) -> Result<(), CanonError> {
    use serde_json::Value;

    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => {
            let text = match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => i.to_string(),
                (None, Some(u)) => u.to_string(),
                (None, None) => {
                    return Err(CanonError::NonIntegerNumber { raw: n.to_string() });
                }
            };
            out.extend_from_slice(text.as_bytes());
        }
        Value::String(s) => emit_str(out, s),
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                emit(out, item)?;
            }
            out.push(b']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            out.push(b'{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                emit_str(out, key);
                out.push(b':');
                emit(out, item)?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}

fn emit_str(out: &mut Vec<u8>, s: &str) {
    let encoded = serde_json::Value::String(s.to_string()).to_string();
    out.extend_from_slice(encoded.as_bytes());
}
