//! `StateV1`: per-agent resource counters and boolean flags.
//!
//! # Layout
//!
//! - Quantities: `resource -> agent -> i64`
//! - Flags: `flag -> agent -> bool`
//!
//! Both maps are `BTreeMap`s so iteration, canonical JSON, and fingerprints
//! are independent of insertion order. Missing entries read as `0` / `false`.
//!
//! # Value semantics
//!
//! A `StateV1` is a plain value. Operators and methods receive `&StateV1`
//! and can never mutate the caller's copy; an operator that succeeds returns
//! a fresh state built from [`StateV1::snapshot`]. Search branches therefore
//! cannot observe each other's speculative effects.
//!
//! # Non-negativity
//!
//! Quantities are signed only so that a malformed initial description (or a
//! misbehaving operator) is *observable* rather than silently wrapped.
//! [`StateV1::adjust`] refuses to produce a negative quantity, and
//! [`StateV1::first_negative`] reports any that slipped in.

use std::collections::BTreeMap;

use crate::proof::canon::{canonical_json_bytes, CanonError};
use crate::proof::hash::{canonical_hash, ContentHash, HashDomain};

/// Reserved name of the scarce time resource.
pub const RESOURCE_TIME: &str = "time";

/// Typed failure for state adjustment. Fail-closed: the state is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// The adjustment would leave the resource below zero.
    #[error("adjusting {resource}[{agent}] from {current} by {delta} would go negative")]
    WouldGoNegative {
        resource: String,
        agent: String,
        current: i64,
        delta: i64,
    },
    /// The adjustment overflows `i64`.
    #[error("adjusting {resource}[{agent}] overflows")]
    Overflow { resource: String, agent: String },
}

/// A negative quantity found by [`StateV1::first_negative`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegativeQuantity {
    pub resource: String,
    pub agent: String,
    pub value: i64,
}

/// Per-agent resource state.
///
/// Equality is structural over both maps, except that explicit zero / `false`
/// entries compare equal to missing ones (see [`StateV1::normalized`]).
#[derive(Debug, Clone, Default)]
pub struct StateV1 {
    quantities: BTreeMap<String, BTreeMap<String, i64>>,
    flags: BTreeMap<String, BTreeMap<String, bool>>,
}

impl StateV1 {
    /// Create an empty state: every quantity reads `0`, every flag `false`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Quantity of `resource` held by `agent` (`0` if never set).
    #[must_use]
    pub fn get(&self, resource: &str, agent: &str) -> i64 {
        self.quantities
            .get(resource)
            .and_then(|per_agent| per_agent.get(agent))
            .copied()
            .unwrap_or(0)
    }

    /// Value of `flag` for `agent` (`false` if never set).
    #[must_use]
    pub fn flag(&self, flag: &str, agent: &str) -> bool {
        self.flags
            .get(flag)
            .and_then(|per_agent| per_agent.get(agent))
            .copied()
            .unwrap_or(false)
    }

    /// Overwrite a quantity. Used by state set-up and by operator effects on
    /// a private copy; the search engine never calls this.
    pub fn set(&mut self, resource: &str, agent: &str, value: i64) {
        self.quantities
            .entry(resource.to_string())
            .or_default()
            .insert(agent.to_string(), value);
    }

    /// Overwrite a flag.
    pub fn set_flag(&mut self, flag: &str, agent: &str, value: bool) {
        self.flags
            .entry(flag.to_string())
            .or_default()
            .insert(agent.to_string(), value);
    }

    /// Add `delta` (possibly negative) to a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::WouldGoNegative`] if the result would be below
    /// zero, or [`StateError::Overflow`] on `i64` overflow. On error the
    /// state is unchanged.
    pub fn adjust(&mut self, resource: &str, agent: &str, delta: i64) -> Result<(), StateError> {
        let current = self.get(resource, agent);
        let next = current
            .checked_add(delta)
            .ok_or_else(|| StateError::Overflow {
                resource: resource.to_string(),
                agent: agent.to_string(),
            })?;
        if next < 0 {
            return Err(StateError::WouldGoNegative {
                resource: resource.to_string(),
                agent: agent.to_string(),
                current,
                delta,
            });
        }
        self.set(resource, agent, next);
        Ok(())
    }

    /// Independent copy of this state, O(number of entries).
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Names of every resource with at least one entry, in sorted order.
    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.quantities.keys().map(String::as_str)
    }

    /// Every `(resource, agent, value)` triple, in sorted order.
    pub fn quantities(&self) -> impl Iterator<Item = (&str, &str, i64)> {
        self.quantities.iter().flat_map(|(resource, per_agent)| {
            per_agent
                .iter()
                .map(move |(agent, value)| (resource.as_str(), agent.as_str(), *value))
        })
    }

    /// Every `(flag, agent, value)` triple, in sorted order.
    pub fn flags(&self) -> impl Iterator<Item = (&str, &str, bool)> {
        self.flags.iter().flat_map(|(flag, per_agent)| {
            per_agent
                .iter()
                .map(move |(agent, value)| (flag.as_str(), agent.as_str(), *value))
        })
    }

    /// The first negative quantity in sorted order, if any.
    #[must_use]
    pub fn first_negative(&self) -> Option<NegativeQuantity> {
        self.quantities()
            .find(|&(_, _, value)| value < 0)
            .map(|(resource, agent, value)| NegativeQuantity {
                resource: resource.to_string(),
                agent: agent.to_string(),
                value,
            })
    }

    /// True when every quantity is non-negative.
    #[must_use]
    pub fn is_sound(&self) -> bool {
        self.first_negative().is_none()
    }

    /// Copy with zero quantities and `false` flags removed.
    ///
    /// Two states that differ only in explicit defaults normalize equal.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let quantities = self
            .quantities
            .iter()
            .filter_map(|(resource, per_agent)| {
                let kept: BTreeMap<String, i64> = per_agent
                    .iter()
                    .filter(|(_, v)| **v != 0)
                    .map(|(a, v)| (a.clone(), *v))
                    .collect();
                (!kept.is_empty()).then(|| (resource.clone(), kept))
            })
            .collect();
        let flags = self
            .flags
            .iter()
            .filter_map(|(flag, per_agent)| {
                let kept: BTreeMap<String, bool> = per_agent
                    .iter()
                    .filter(|(_, v)| **v)
                    .map(|(a, v)| (a.clone(), *v))
                    .collect();
                (!kept.is_empty()).then(|| (flag.clone(), kept))
            })
            .collect();
        Self { quantities, flags }
    }

    /// JSON form: `{"flags": {...}, "quantities": {...}}` over the normalized state.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let normalized = self.normalized();
        serde_json::json!({
            "flags": normalized.flags,
            "quantities": normalized.quantities,
        })
    }

    /// Canonical JSON bytes of [`StateV1::to_json`].
    ///
    /// # Errors
    ///
    /// Propagates [`CanonError`]; quantities are integers so this does not
    /// fail in practice.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(&self.to_json())
    }

    /// Content hash of the canonical bytes under [`HashDomain::StateFingerprint`].
    ///
    /// # Errors
    ///
    /// Propagates [`CanonError`].
    pub fn fingerprint(&self) -> Result<ContentHash, CanonError> {
        Ok(canonical_hash(
            HashDomain::StateFingerprint,
            &self.canonical_bytes()?,
        ))
    }
}

impl PartialEq for StateV1 {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.normalized(), other.normalized());
        a.quantities == b.quantities && a.flags == b.flags
    }
}

impl Eq for StateV1 {}
