//! Remotely-configured feature flags, injected as a plain name → value
//! mapping. Lookups are typed and fall back to the flag's default, so a
//! missing or malformed remote value never changes behavior unexpectedly.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// A named flag with its compiled-in default.
#[derive(Debug, Clone, Copy)]
pub struct Feature<T> {
    pub key: &'static str,
    pub default: T,
}

/// Whether feeds render their own bookmark control on the card. When on, the
/// post options menu drops its bookmark entry.
pub const BOOKMARK_ON_CARD: Feature<bool> = Feature {
    key: "bookmark_on_card",
    default: false,
};

/// Feed ranking algorithm revision requested by the client.
pub const FEED_VERSION: Feature<i64> = Feature {
    key: "feed_version",
    default: 15,
};

#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    values: HashMap<String, Value>,
}

impl FlagSet {
    pub fn new(values: HashMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Typed lookup; the default wins over an absent or mistyped value.
    pub fn value<T>(&self, feature: &Feature<T>) -> T
    where
        T: DeserializeOwned + Clone,
    {
        self.values
            .get(feature.key)
            .and_then(|raw| serde_json::from_value(raw.clone()).ok())
            .unwrap_or_else(|| feature.default.clone())
    }
}
