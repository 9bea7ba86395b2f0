//! Parsing of `svn info` output.
//!
//! The output is one `Label: value` pair per line. Labels are human readable
//! and drift between client versions and locales, so lookups go through
//! [`InfoMap::get`] which tries the lower-camel-cased label first and the
//! label exactly as printed second.

use std::collections::HashMap;

/// Parsed `svn info` output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoMap {
    entries: HashMap<String, String>,
}

impl InfoMap {
    /// Parse `Key: Value` lines. Lines without a colon are skipped; the value
    /// is everything after the first colon, so URLs survive intact.
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();

        for line in text.lines() {
            let Some((label, value)) = line.split_once(':') else {
                continue;
            };
            let label = label.trim();
            if label.is_empty() {
                continue;
            }
            let value = value.trim().to_string();

            entries.insert(camel_case(label), value.clone());
            entries.entry(label.to_string()).or_insert(value);
        }

        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a value by camel-cased key or by its label as printed.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .or_else(|| self.entries.get(&camel_case(key)))
            .map(String::as_str)
    }

    pub fn url(&self) -> Option<&str> {
        self.get("url")
    }

    pub fn repository_root(&self) -> Option<&str> {
        self.get("repositoryRoot")
    }

    pub fn repository_uuid(&self) -> Option<&str> {
        self.get("repositoryUuid")
    }

    pub fn revision(&self) -> Option<&str> {
        self.get("revision")
    }

    pub fn node_kind(&self) -> Option<&str> {
        self.get("nodeKind")
    }

    /// Older clients print `Last Changed Revision` instead of `Last Changed Rev`.
    pub fn last_changed_rev(&self) -> Option<&str> {
        self.get("lastChangedRev")
            .or_else(|| self.get("lastChangedRevision"))
    }

    pub fn last_changed_date(&self) -> Option<&str> {
        self.get("lastChangedDate")
    }

    pub fn last_changed_author(&self) -> Option<&str> {
        self.get("lastChangedAuthor")
    }

    pub fn working_copy_root_path(&self) -> Option<&str> {
        self.get("workingCopyRootPath")
    }
}

/// Convert a human readable label to a lower-camel-case identifier.
///
/// `"Repository Root"` becomes `"repositoryRoot"`, `"Repository UUID"`
/// becomes `"repositoryUuid"`.
pub fn camel_case(label: &str) -> String {
    let mut out = String::with_capacity(label.len());

    for (index, word) in label.split_whitespace().enumerate() {
        let lower = word.to_lowercase();
        if index == 0 {
            out.push_str(&lower);
            continue;
        }
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Path: .
Working Copy Root Path: /home/dev/checkouts/mywork
URL: https://svn.example.com/repo/trunk
Relative URL: ^/trunk
Repository Root: https://svn.example.com/repo
Repository UUID: 0b8c3a2e-1f4d-4c55-9a7e-2d1f0c9e8b11
Revision: 1234
Node Kind: directory
Schedule: normal
Last Changed Author: alice
Last Changed Rev: 1230
Last Changed Date: 2024-03-01 10:15:00 +0000 (Fri, 01 Mar 2024)
";

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("Repository Root"), "repositoryRoot");
        assert_eq!(camel_case("Repository UUID"), "repositoryUuid");
        assert_eq!(camel_case("URL"), "url");
        assert_eq!(camel_case("last changed rev"), "lastChangedRev");
        assert_eq!(camel_case("  Node   Kind "), "nodeKind");
        assert_eq!(camel_case(""), "");
    }

    #[test]
    fn test_parse_full_info() {
        let info = InfoMap::parse(SAMPLE);
        assert_eq!(info.url(), Some("https://svn.example.com/repo/trunk"));
        assert_eq!(info.repository_root(), Some("https://svn.example.com/repo"));
        assert_eq!(
            info.repository_uuid(),
            Some("0b8c3a2e-1f4d-4c55-9a7e-2d1f0c9e8b11")
        );
        assert_eq!(info.revision(), Some("1234"));
        assert_eq!(info.node_kind(), Some("directory"));
        assert_eq!(info.last_changed_rev(), Some("1230"));
        assert_eq!(info.last_changed_author(), Some("alice"));
        assert_eq!(
            info.last_changed_date(),
            Some("2024-03-01 10:15:00 +0000 (Fri, 01 Mar 2024)")
        );
        assert_eq!(
            info.working_copy_root_path(),
            Some("/home/dev/checkouts/mywork")
        );
    }

    #[test]
    fn test_original_label_lookup() {
        let info = InfoMap::parse(SAMPLE);
        assert_eq!(info.get("Repository Root"), Some("https://svn.example.com/repo"));
        assert_eq!(info.get("Relative URL"), Some("^/trunk"));
    }

    #[test]
    fn test_last_changed_rev_label_variants() {
        for label in [
            "Last Changed Rev",
            "last changed rev",
            "LAST CHANGED REV",
            "last changed revision",
            "Last Changed Revision",
        ] {
            let info = InfoMap::parse(&format!("{label}: 42"));
            assert_eq!(info.last_changed_rev(), Some("42"), "label {label:?}");
        }
    }

    #[test]
    fn test_lines_without_colon_are_ignored() {
        let info = InfoMap::parse("garbage line\n\nRevision: 7\n: orphan value");
        assert_eq!(info.revision(), Some("7"));
        assert_eq!(info.get(""), None);
    }

    #[test]
    fn test_empty_output() {
        assert!(InfoMap::parse("").is_empty());
    }
}
