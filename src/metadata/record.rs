use serde::Serialize;
use std::collections::HashMap;

/// Keys every generated module exports, in output order.
pub const FIXED_KEYS: [&str; 19] = [
    "url",
    "repositoryRoot",
    "repositoryUuid",
    "revision",
    "nodeKind",
    "lastChangedRev",
    "lastChangedDate",
    "lastChangedAuthor",
    "sha",
    "abbreviatedSha",
    "commitMessage",
    "author",
    "authorDate",
    "authorEmail",
    "branch",
    "tag",
    "tags",
    "lastTag",
    "describe",
];

/// A single exported value.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    List(Vec<String>),
    /// Whatever an extractor produced
    Json(serde_json::Value),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::Json(serde_json::Value::String(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// JSON text of the value as it appears in generated source.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "null".to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for MetadataValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<String>> for MetadataValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<serde_json::Value> for MetadataValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

/// Keys and values contributed by one collection task.
///
/// A `None` value means the task ran but had nothing for that key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partial {
    fields: Vec<(String, Option<MetadataValue>)>,
}

impl Partial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<V: Into<MetadataValue>>(&mut self, key: &str, value: Option<V>) {
        self.fields.push((key.to_string(), value.map(Into::into)));
    }

    /// A partial that explicitly leaves every listed key empty.
    pub fn absent(keys: &[&str]) -> Self {
        Self {
            fields: keys.iter().map(|key| ((*key).to_string(), None)).collect(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }
}

/// Flat merged metadata for one generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRecord {
    values: HashMap<String, Option<MetadataValue>>,
}

impl MetadataRecord {
    /// An all-empty record: every fixed key present, `tags` an empty list.
    pub fn empty() -> Self {
        let mut values: HashMap<String, Option<MetadataValue>> = FIXED_KEYS
            .iter()
            .map(|key| ((*key).to_string(), None))
            .collect();
        values.insert("tags".to_string(), Some(MetadataValue::List(Vec::new())));
        Self { values }
    }

    /// Overlay a partial; its keys replace whatever earlier layers set.
    pub fn merge(&mut self, partial: Partial) {
        for (key, value) in partial.fields {
            self.values.insert(key, value);
        }
        // An overlay may blank `tags`; the list itself is never absent
        if !matches!(self.values.get("tags"), Some(Some(_))) {
            self.values
                .insert("tags".to_string(), Some(MetadataValue::List(Vec::new())));
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.values.get(key).and_then(Option::as_ref)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(MetadataValue::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

}

impl Default for MetadataRecord {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_has_every_fixed_key() {
        let record = MetadataRecord::empty();
        for key in FIXED_KEYS {
            assert!(record.contains_key(key), "missing {key}");
        }
        assert!(!record.contains_key("buildId"));
        assert_eq!(record.get("tags"), Some(&MetadataValue::List(Vec::new())));
        assert_eq!(record.get("url"), None);
    }

    #[test]
    fn test_later_partials_overwrite_earlier() {
        let mut record = MetadataRecord::empty();

        let mut info = Partial::new();
        info.set("revision", Some("10"));
        info.set("url", Some("https://host/repo/trunk"));
        record.merge(info);

        let mut extractor = Partial::new();
        extractor.set("revision", Some(serde_json::json!("custom")));
        record.merge(extractor);

        assert_eq!(record.get_str("revision"), Some("custom"));
        assert_eq!(record.get_str("url"), Some("https://host/repo/trunk"));
    }

    #[test]
    fn test_tags_never_absent() {
        let mut record = MetadataRecord::empty();
        let mut partial = Partial::new();
        partial.set::<MetadataValue>("tags", None);
        record.merge(partial);
        assert_eq!(record.get("tags").and_then(MetadataValue::as_list), Some(&[][..]));
    }

    #[test]
    fn test_value_json() {
        assert_eq!(MetadataValue::from("r5").to_json(), r#""r5""#);
        assert_eq!(
            MetadataValue::from(vec!["5".to_string(), "4".to_string()]).to_json(),
            r#"["5","4"]"#
        );
        assert_eq!(
            MetadataValue::from(serde_json::json!({"a": 1})).to_json(),
            r#"{"a":1}"#
        );
    }
}
