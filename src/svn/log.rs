use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// One <logentry revision="..."> ... </logentry> block
static LOGENTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<logentry\b([^>]*)>(.*?)</logentry>").expect("Should compile: LOGENTRY_RE")
});

static REVISION_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\brevision\s*=\s*["']([^"']*)["']"#).expect("Should compile: REVISION_ATTR_RE")
});

static AUTHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<author>(.*?)</author>").expect("Should compile: AUTHOR_RE"));

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<date>(.*?)</date>").expect("Should compile: DATE_RE"));

static MSG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<msg>(.*?)</msg>").expect("Should compile: MSG_RE"));

/// One commit from `svn log --xml`
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LogEntry {
    pub revision: String,
    pub author: String,
    pub date: String,
    pub msg: String,
}

/// Extract every `<logentry>` element in document order.
///
/// `svn log --xml` output is regular enough that scanning for the four fields
/// is sufficient. Missing `author`, `date` or `msg` elements (anonymous
/// commits, stripped revprops) become empty strings.
pub fn parse_log(xml: &str) -> Vec<LogEntry> {
    LOGENTRY_RE
        .captures_iter(xml)
        .map(|caps| {
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            let body = caps.get(2).map_or("", |m| m.as_str());

            LogEntry {
                revision: capture(&REVISION_ATTR_RE, attrs),
                author: capture(&AUTHOR_RE, body),
                date: capture(&DATE_RE, body),
                msg: capture(&MSG_RE, body),
            }
        })
        .collect()
}

/// The most recent entry, which `svn log` prints first.
pub fn parse_latest(xml: &str) -> Option<LogEntry> {
    parse_log(xml).into_iter().next()
}

fn capture(re: &Regex, haystack: &str) -> String {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| unescape(m.as_str()))
        .unwrap_or_default()
}

fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
