use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// An insertion-ordered string-keyed map.
///
/// Re-inserting a key replaces its value but keeps its original position,
/// the same way a JavaScript object behaves when a key is assigned twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

/// A flat token family: dash-joined token name to literal value.
pub type TokenMap = OrderedMap<String>;

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        if let Some(&slot) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[slot].1, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<V: Clone> OrderedMap<V> {
    /// Overlays `other` onto `self`; keys from `other` win.
    pub fn overlay(&mut self, other: &OrderedMap<V>) {
        for (key, value) in other.iter() {
            self.insert(key, value.clone());
        }
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.entries.iter().map(|(k, v)| (k, v)))
    }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map with string keys")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = OrderedMap::new();
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Colors,
    Spacing,
}

impl Family {
    pub fn from_key(key: &str) -> Option<Family> {
        match key {
            "colors" => Some(Family::Colors),
            "spacing" => Some(Family::Spacing),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Family::Colors => "colors",
            Family::Spacing => "spacing",
        }
    }
}

/// Where a token family was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// `theme.<family>`: replaces the defaults.
    Override,
    /// `theme.extend.<family>`: layered over whichever baseline applies.
    Extend,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenFamilies {
    #[serde(default)]
    pub colors: TokenMap,
    #[serde(default)]
    pub spacing: TokenMap,
}

impl TokenFamilies {
    pub fn family(&self, family: Family) -> &TokenMap {
        match family {
            Family::Colors => &self.colors,
            Family::Spacing => &self.spacing,
        }
    }

    pub fn family_mut(&mut self, family: Family) -> &mut TokenMap {
        match family {
            Family::Colors => &mut self.colors,
            Family::Spacing => &mut self.spacing,
        }
    }
}

/// Tokens declared in a configuration file, split by origin.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtractedTruth {
    #[serde(rename = "override", default)]
    pub overrides: TokenFamilies,
    #[serde(default)]
    pub extend: TokenFamilies,
}

impl ExtractedTruth {
    pub fn bucket(&self, origin: Origin) -> &TokenFamilies {
        match origin {
            Origin::Override => &self.overrides,
            Origin::Extend => &self.extend,
        }
    }

    pub fn bucket_mut(&mut self, origin: Origin) -> &mut TokenFamilies {
        match origin {
            Origin::Override => &mut self.overrides,
            Origin::Extend => &mut self.extend,
        }
    }
}

/// The final token universe used for validation. Only the resolver builds
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTruth {
    colors: TokenMap,
    spacing: TokenMap,
}

impl ResolvedTruth {
    pub(crate) fn new(colors: TokenMap, spacing: TokenMap) -> Self {
        Self { colors, spacing }
    }

    pub fn colors(&self) -> &TokenMap {
        &self.colors
    }

    pub fn spacing(&self) -> &TokenMap {
        &self.spacing
    }

    pub fn family(&self, family: Family) -> &TokenMap {
        match family {
            Family::Colors => &self.colors,
            Family::Spacing => &self.spacing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_first_position_and_last_value() {
        let mut map = TokenMap::new();
        map.insert("a", "1".to_string());
        map.insert("b", "2".to_string());
        let previous = map.insert("a", "3".to_string());

        assert_eq!(previous.as_deref(), Some("1"));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("a").map(String::as_str), Some("3"));
    }

    #[test]
    fn serde_preserves_order() {
        let json = r#"{"zeta":"1","alpha":"2","mid":"3"}"#;
        let map: TokenMap = serde_json::from_str(json).unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(serde_json::to_string(&map).unwrap(), json);
    }

    #[test]
    fn extracted_truth_uses_external_field_names() {
        let mut truth = ExtractedTruth::default();
        truth
            .bucket_mut(Origin::Override)
            .family_mut(Family::Colors)
            .insert("brand", "#000".to_string());

        let value = serde_json::to_value(&truth).unwrap();
        assert_eq!(value["override"]["colors"]["brand"], "#000");
        assert!(value["extend"]["spacing"].as_object().unwrap().is_empty());

        let back: ExtractedTruth = serde_json::from_value(value).unwrap();
        assert_eq!(back, truth);
    }
}
