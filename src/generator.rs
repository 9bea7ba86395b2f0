//! Rendering of collected metadata as module source.
//!
//! Every request yields one `export <key> = <value>` line per key. The key
//! order is part of the output contract: the fixed keys in declaration order,
//! then extractor keys that are not fixed keys, in the order they were
//! registered.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::config::Config;
use crate::log_warn;
use crate::metadata::{
    Aggregator, ExtractorMap, FIXED_KEYS, MetadataRecord, MetadataValue, Options, ProbeError,
};

/// Literal emitted for values that could not be determined
pub const NULL_LITERAL: &str = "null";

pub const NOT_A_REPOSITORY_WARNING: &str = "svn info failed, this may not be a SVN repository";
pub const NOT_INSTALLED_WARNING: &str = "svn is not installed, this may not be a SVN repository";

/// Channel for non-fatal messages back to the host.
pub trait Diagnostics: Send + Sync {
    fn warn(&self, message: &str);
}

/// Forwards warnings to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn warn(&self, message: &str) {
        log_warn!("{}", message);
    }
}

/// Keeps warnings in memory for the caller to inspect.
#[derive(Debug, Default)]
pub struct CollectedDiagnostics {
    warnings: Mutex<Vec<String>>,
}

impl CollectedDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().clone()
    }
}

impl Diagnostics for CollectedDiagnostics {
    fn warn(&self, message: &str) {
        self.warnings.lock().push(message.to_string());
    }
}

/// Ordered, de-duplicated export names for a set of extractors.
pub fn module_keys(extractors: &ExtractorMap) -> Vec<String> {
    let mut keys: Vec<String> = FIXED_KEYS.iter().map(|key| (*key).to_string()).collect();
    let mut seen: HashSet<String> = keys.iter().cloned().collect();

    for key in extractors.keys() {
        if seen.insert(key.to_string()) {
            keys.push(key.to_string());
        }
    }

    keys
}

/// Generated module as `(key, literal)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModule {
    entries: Vec<(String, String)>,
}

impl GeneratedModule {
    /// Render `keys` from `record`; with no record every key is `null`.
    pub fn render(record: Option<&MetadataRecord>, keys: &[String]) -> Self {
        let entries = keys
            .iter()
            .map(|key| {
                let literal = record
                    .and_then(|r| r.get(key))
                    .map_or_else(|| NULL_LITERAL.to_string(), MetadataValue::to_json);
                (key.clone(), literal)
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Literal for `key`, if it is exported
    pub fn literal(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, literal)| literal.as_str())
    }

    pub fn to_source(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GeneratedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, literal)) in self.entries.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "export {key} = {literal}")?;
        }
        Ok(())
    }
}

/// Turns a project root into module source text.
#[derive(Debug)]
pub struct ModuleGenerator {
    aggregator: Aggregator,
}

impl ModuleGenerator {
    pub fn new(aggregator: Aggregator) -> Self {
        Self { aggregator }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Aggregator::from_config(config))
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Generate source for `root`. Never fails: when no metadata can be read
    /// a warning goes to `diagnostics` and every export is `null`.
    pub async fn generate(
        &self,
        root: &Path,
        options: &Options,
        diagnostics: &dyn Diagnostics,
    ) -> String {
        self.generate_module(root, options, diagnostics)
            .await
            .to_source()
    }

    pub async fn generate_module(
        &self,
        root: &Path,
        options: &Options,
        diagnostics: &dyn Diagnostics,
    ) -> GeneratedModule {
        let record = match self.aggregator.try_collect(root, &options.extractors).await {
            Ok(record) => Some(record),
            Err(ProbeError::ToolUnavailable) => {
                diagnostics.warn(NOT_INSTALLED_WARNING);
                None
            }
            Err(ProbeError::NotARepository { .. }) => {
                diagnostics.warn(NOT_A_REPOSITORY_WARNING);
                None
            }
        };

        let keys = module_keys(&options.extractors);
        GeneratedModule::render(record.as_ref(), &keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Partial;
    use serde_json::json;

    #[test]
    fn test_fixed_keys_only() {
        let keys = module_keys(&ExtractorMap::new());
        assert_eq!(keys, FIXED_KEYS.map(String::from).to_vec());
    }

    #[test]
    fn test_extractor_keys_follow_fixed_keys_without_duplicates() {
        let options = Options::new()
            .with_value("buildId", json!("b-1"))
            .with_value("revision", json!("override"))
            .with_value("pipeline", json!(7));

        let keys = module_keys(&options.extractors);
        assert_eq!(keys.len(), FIXED_KEYS.len() + 2);
        assert_eq!(&keys[..FIXED_KEYS.len()], FIXED_KEYS.map(String::from).as_slice());
        assert_eq!(&keys[FIXED_KEYS.len()..], ["buildId", "pipeline"]);
    }

    #[test]
    fn test_render_without_record_is_all_null() {
        let keys = module_keys(&ExtractorMap::new());
        let module = GeneratedModule::render(None, &keys);
        let source = module.to_source();

        assert_eq!(source.lines().count(), FIXED_KEYS.len());
        assert!(source.lines().all(|line| line.ends_with(" = null")));
        assert!(source.starts_with("export url = null\n"));
        assert!(source.ends_with("export describe = null"));
    }

    #[test]
    fn test_render_record_values() {
        let mut record = MetadataRecord::empty();
        let mut partial = Partial::new();
        partial.set(
            "tags",
            Some(vec!["5".to_string(), "4".to_string(), "3".to_string()]),
        );
        partial.set("describe", Some("r5"));
        partial.set("commitMessage", Some("say \"hi\"\nbye"));
        record.merge(partial);

        let keys = module_keys(&ExtractorMap::new());
        let source = GeneratedModule::render(Some(&record), &keys).to_source();

        assert!(source.contains(r#"export tags = ["5","4","3"]"#));
        assert!(source.contains(r#"export describe = "r5""#));
        assert!(source.contains(r#"export commitMessage = "say \"hi\"\nbye""#));
        assert!(source.contains("export url = null"));
    }

    #[test]
    fn test_missing_extractor_value_renders_null() {
        let keys = vec!["url".to_string(), "flaky".to_string()];
        let module = GeneratedModule::render(Some(&MetadataRecord::empty()), &keys);
        assert_eq!(module.literal("flaky"), Some("null"));
        assert_eq!(module.literal("nope"), None);
    }

    #[test]
    fn test_collected_diagnostics() {
        let diagnostics = CollectedDiagnostics::new();
        diagnostics.warn("first");
        diagnostics.warn("second");
        assert_eq!(diagnostics.warnings(), ["first", "second"]);
    }
}
