use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Placeholder when a URL has a `branches` directory but no branch name
pub const UNKNOWN_BRANCH: &str = "unknown-branch";
/// Placeholder when a URL has a `tags` directory but no tag name
pub const UNKNOWN_TAG: &str = "unknown-tag";
/// Result when nothing identifies the line of development
pub const UNKNOWN: &str = "unknown";

pub const TRUNK: &str = "trunk";

static TRUNK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/trunk(?:/|$)").expect("Should compile: TRUNK_RE"));

static BRANCHES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/branches(?:/([^/]*))?(?:/|$)").expect("Should compile: BRANCHES_RE")
});

static TAGS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/tags(?:/([^/]*))?(?:/|$)").expect("Should compile: TAGS_RE"));

/// Work out which branch or tag a working copy tracks.
///
/// Subversion has no first-class branches, so this relies on the standard
/// `trunk/`, `branches/<name>/`, `tags/<name>/` layout of the URL and falls
/// back to the directory name of the working copy root.
pub fn infer_branch(url: Option<&str>, working_copy_root: Option<&Path>) -> String {
    if let Some(url) = url.map(|u| u.trim_end_matches('/'))
        && let Some(name) = from_url(url)
    {
        return name;
    }

    working_copy_root
        .and_then(from_root_path)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn from_url(url: &str) -> Option<String> {
    if TRUNK_RE.is_match(url) {
        return Some(TRUNK.to_string());
    }

    if let Some(caps) = BRANCHES_RE.captures(url) {
        return Some(named_or(caps.get(1).map(|m| m.as_str()), UNKNOWN_BRANCH));
    }

    if let Some(caps) = TAGS_RE.captures(url) {
        return Some(named_or(caps.get(1).map(|m| m.as_str()), UNKNOWN_TAG));
    }

    None
}

fn named_or(name: Option<&str>, fallback: &str) -> String {
    match name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => fallback.to_string(),
    }
}

fn from_root_path(path: &Path) -> Option<String> {
    let segment = path.file_name()?.to_str()?;

    if segment == TRUNK {
        Some(TRUNK.to_string())
    } else if segment.is_empty() || segment.starts_with("tags") {
        None
    } else {
        Some(segment.to_string())
    }
}
