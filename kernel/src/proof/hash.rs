//! Canonical hashing with typed domain separation.
//!
//! Algorithm: SHA-256 over `domain_prefix || data`. Every prefix is
//! null-terminated and unique, so the same bytes hashed for two different
//! purposes can never collide.
//!
//! **Exactly one place defines canonical hashing**: [`canonical_hash`].

use sha2::{Digest, Sha256};

/// A content-addressed hash with algorithm identifier.
///
/// Format: `"algorithm:hex_digest"` (e.g., `"sha256:abcdef..."`).
///
/// Invariant: the inner string contains a `:` separator with non-empty
/// substrings on both sides (enforced by [`ContentHash::parse`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash {
    full: String,
    colon: usize,
}

impl ContentHash {
    /// Parse from `"algorithm:hex"` format.
    ///
    /// Returns `None` on a missing colon, empty algorithm, or empty digest.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let colon = s.find(':')?;
        if colon == 0 || colon == s.len() - 1 {
            return None;
        }
        Some(Self {
            full: s.to_string(),
            colon,
        })
    }

    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.full[..self.colon]
    }

    #[must_use]
    pub fn hex_digest(&self) -> &str {
        &self.full[self.colon + 1..]
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.full
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full)
    }
}

/// Declares `HashDomain`, its prefixes, and `ALL` from one list.
macro_rules! hash_domains {
    ( $( $(#[$meta:meta])* $variant:ident => $bytes:expr ),+ $(,)? ) => {
        /// Typed domain separator for [`canonical_hash`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum HashDomain {
            $( $(#[$meta])* $variant, )+
        }

        impl HashDomain {
            /// Null-terminated prefix bytes.
            #[must_use]
            pub const fn as_bytes(self) -> &'static [u8] {
                match self {
                    $( Self::$variant => $bytes, )+
                }
            }

            /// Every domain, in declaration order.
            pub const ALL: &[HashDomain] = &[ $( Self::$variant, )+ ];
        }

        impl std::fmt::Display for HashDomain {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $( Self::$variant => f.write_str(stringify!($variant)), )+
                }
            }
        }
    };
}

hash_domains! {
    /// `StateV1` canonical form (replay comparison, report binding).
    StateFingerprint => b"FORGE::STATE::V1\0",
    /// Accepted plan: ordered primitive tasks.
    Plan => b"FORGE::PLAN::V1\0",
    /// Planner policy snapshot.
    PolicySnapshot => b"FORGE::POLICY_SNAPSHOT::V1\0",
    /// Recipe domain description as loaded.
    DomainDescription => b"FORGE::DOMAIN_DESCRIPTION::V1\0",
    /// Full run report.
    RunReport => b"FORGE::RUN_REPORT::V1\0",
}

/// Compute `sha256(domain || data)` as a `"sha256:<hex>"` [`ContentHash`].
#[must_use]
pub fn canonical_hash(domain: HashDomain, data: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(domain.as_bytes());
    hasher.update(data);
    let digest = hex::encode(hasher.finalize());
    ContentHash {
        colon: "sha256".len(),
        full: format!("sha256:{digest}"),
    }
}
