//! Declarative recipe descriptions.
//!
//! The on-disk format is a JSON object with PascalCase keys:
//!
//! ```json
//! { "Items": ["plank", "wood"], "Tools": ["bench"],
//!   "Initial": {}, "Goal": {"plank": 1},
//!   "Recipes": { "craft plank": { "Time": 1, "Consumes": {"wood": 1},
//!                                 "Produces": {"plank": 4} } } }
//! ```
//!
//! `Time` defaults to 1. Amounts are integers or booleans (`true` reads as
//! 1, `false` as 0), so `"Requires": {"bench": true}` is accepted as-is.
//! A recipe's `Requires`, `Consumes` and `Produces` keep the order they are
//! written in; the first `Produces` key names the recipe's output.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use forge_kernel::proof::canon::canonical_json_bytes;
use forge_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};

/// Recipe time when `Time` is omitted.
pub const DEFAULT_RECIPE_TIME: i64 = 1;

/// A resource amount: a count, or a boolean standing for 0/1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Flag(bool),
    Count(i64),
}

impl Amount {
    #[must_use]
    pub const fn count(self) -> i64 {
        match self {
            Self::Flag(true) => 1,
            Self::Flag(false) => 0,
            Self::Count(n) => n,
        }
    }
}

impl From<i64> for Amount {
    fn from(n: i64) -> Self {
        Self::Count(n)
    }
}

/// Resource amounts in declaration order. A resource appears at most once.
///
/// Order is taken from the JSON text as it streams in, so parse with
/// `serde_json::from_str` rather than through a `serde_json::Value`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceAmounts(Vec<(String, Amount)>);

impl ResourceAmounts {
    pub fn iter(&self) -> impl Iterator<Item = (&str, Amount)> + '_ {
        self.0.iter().map(|(resource, amount)| (resource.as_str(), *amount))
    }

    #[must_use]
    pub fn get(&self, resource: &str) -> Option<Amount> {
        self.iter().find(|(r, _)| *r == resource).map(|(_, a)| a)
    }

    /// The first declared resource.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(|(resource, _)| resource.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A repeated resource overwrites the earlier amount in place.
impl<K: Into<String>> FromIterator<(K, Amount)> for ResourceAmounts {
    fn from_iter<I: IntoIterator<Item = (K, Amount)>>(iter: I) -> Self {
        let mut entries: Vec<(String, Amount)> = Vec::new();
        for (resource, amount) in iter {
            let resource = resource.into();
            match entries.iter_mut().find(|(r, _)| *r == resource) {
                Some(entry) => entry.1 = amount,
                None => entries.push((resource, amount)),
            }
        }
        Self(entries)
    }
}

impl Serialize for ResourceAmounts {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut m = serializer.serialize_map(Some(self.0.len()))?;
        for (resource, amount) in &self.0 {
            m.serialize_entry(resource, amount)?;
        }
        m.end()
    }
}

impl<'de> Deserialize<'de> for ResourceAmounts {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(AmountsVisitor)
    }
}

struct AmountsVisitor;

impl<'de> Visitor<'de> for AmountsVisitor {
    type Value = ResourceAmounts;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map from resource name to amount")
    }

    fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut entries: Vec<(String, Amount)> = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((resource, amount)) = map.next_entry::<String, Amount>()? {
            if entries.iter().any(|(r, _)| *r == resource) {
                return Err(de::Error::custom(format_args!(
                    "resource `{resource}` listed twice"
                )));
            }
            entries.push((resource, amount));
        }
        Ok(ResourceAmounts(entries))
    }
}

/// One recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct RecipeV1 {
    #[serde(default = "default_time")]
    pub time: i64,
    #[serde(default)]
    pub requires: ResourceAmounts,
    #[serde(default)]
    pub consumes: ResourceAmounts,
    #[serde(default)]
    pub produces: ResourceAmounts,
}

const fn default_time() -> i64 {
    DEFAULT_RECIPE_TIME
}

impl RecipeV1 {
    /// The item whose producer method this recipe becomes: the first key of
    /// `Produces`, or `None` for a recipe that declares no output.
    #[must_use]
    pub fn primary_output(&self) -> Option<&str> {
        self.produces.first()
    }

    /// Why this recipe cannot be compiled, if it cannot.
    #[must_use]
    pub fn defect(&self) -> Option<String> {
        if self.produces.is_empty() {
            return Some("declares no Produces".into());
        }
        if self.time < 0 {
            return Some(format!("negative Time {}", self.time));
        }
        for (kind, table) in [
            ("Requires", &self.requires),
            ("Consumes", &self.consumes),
            ("Produces", &self.produces),
        ] {
            if let Some((resource, amount)) = table.iter().find(|(_, a)| a.count() < 0) {
                return Some(format!("negative {kind} amount {} for {resource}", amount.count()));
            }
        }
        None
    }
}

/// Error loading a description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipeError {
    #[error("cannot read {path}: {detail}")]
    Io { path: String, detail: String },
    #[error("malformed domain description: {detail}")]
    Parse { detail: String },
    #[error("cannot canonicalize domain description: {detail}")]
    Canon { detail: String },
}

/// A complete domain description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DomainDescriptionV1 {
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub initial: BTreeMap<String, Amount>,
    #[serde(default)]
    pub goal: BTreeMap<String, Amount>,
    pub recipes: BTreeMap<String, RecipeV1>,
}

impl DomainDescriptionV1 {
    /// Parse a description from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::Parse`] on malformed JSON or a shape mismatch.
    pub fn from_json_str(text: &str) -> Result<Self, RecipeError> {
        serde_json::from_str(text).map_err(|e| RecipeError::Parse {
            detail: e.to_string(),
        })
    }

    /// Read and parse a description file.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_json_str`].
    pub fn from_path(path: &Path) -> Result<Self, RecipeError> {
        let text = std::fs::read_to_string(path).map_err(|e| RecipeError::Io {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        Self::from_json_str(&text)
    }

    /// Whether `name` is listed under `Tools`.
    #[must_use]
    pub fn is_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t == name)
    }

    /// `Initial` with amounts resolved to counts.
    #[must_use]
    pub fn initial_counts(&self) -> BTreeMap<String, i64> {
        counts(&self.initial)
    }

    /// `Goal` with amounts resolved to counts.
    #[must_use]
    pub fn goal_counts(&self) -> BTreeMap<String, i64> {
        counts(&self.goal)
    }

    /// Content hash of the canonical JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::Canon`] if the description cannot be
    /// serialized canonically.
    pub fn digest(&self) -> Result<ContentHash, RecipeError> {
        let canon = |detail: String| RecipeError::Canon { detail };
        let value = serde_json::to_value(self).map_err(|e| canon(e.to_string()))?;
        let bytes = canonical_json_bytes(&value).map_err(|e| canon(e.to_string()))?;
        Ok(canonical_hash(HashDomain::DomainDescription, &bytes))
    }
}

fn counts(table: &BTreeMap<String, Amount>) -> BTreeMap<String, i64> {
    table.iter().map(|(k, a)| (k.clone(), a.count())).collect()
}
