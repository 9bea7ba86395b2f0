use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use super::extractor::ExtractorMap;
use super::record::{MetadataRecord, Partial};
use crate::config::Config;
use crate::svn::{self, InfoMap, LogEntry, Prober, SvnProber, SvnRunner, SystemSvn};
use crate::{log_debug, log_warn, trace_debug};

/// Number of log entries listed in `tags` unless configured otherwise
pub const DEFAULT_LOG_LIMIT: usize = 10;

pub const BASIC_INFO_KEYS: [&str; 8] = [
    "url",
    "repositoryRoot",
    "repositoryUuid",
    "revision",
    "nodeKind",
    "lastChangedRev",
    "lastChangedDate",
    "lastChangedAuthor",
];

pub const LAST_COMMIT_KEYS: [&str; 6] = [
    "sha",
    "abbreviatedSha",
    "commitMessage",
    "author",
    "authorDate",
    "authorEmail",
];

pub const RECENT_LOG_KEYS: [&str; 5] = ["branch", "tag", "tags", "lastTag", "describe"];

/// Why no record could be collected for a directory.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("svn is not installed")]
    ToolUnavailable,
    #[error("{} is not inside a svn working copy", .path.display())]
    NotARepository { path: PathBuf },
}

/// Why a single query contributed nothing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("`svn {command}` produced no output")]
    EmptyOutput { command: &'static str },
    #[error("`svn {command}` output contained no usable entries")]
    Unparsable { command: &'static str },
}

/// Result of one collection task.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Collected(Partial),
    Failed(QueryError),
}

impl QueryOutcome {
    /// The partial to merge: collected fields, or every key left empty.
    fn into_partial(self, keys: &[&str]) -> Partial {
        match self {
            Self::Collected(partial) => partial,
            Self::Failed(e) => {
                log_debug!("Query failed, leaving {} empty: {}", keys.join(", "), e);
                Partial::absent(keys)
            }
        }
    }
}

/// Gathers metadata for a working copy and merges it into one record.
pub struct Aggregator {
    runner: Arc<dyn SvnRunner>,
    prober: Arc<dyn Prober>,
    log_limit: usize,
}

impl Aggregator {
    pub fn new(runner: Arc<dyn SvnRunner>, prober: Arc<dyn Prober>) -> Self {
        Self {
            runner,
            prober,
            log_limit: DEFAULT_LOG_LIMIT,
        }
    }

    /// Build an aggregator that runs the configured `svn` executable.
    pub fn from_config(config: &Config) -> Self {
        let runner: Arc<dyn SvnRunner> = Arc::new(SystemSvn::new(config.svn_command.clone()));
        let prober = SvnProber::new(Arc::clone(&runner)).metadata_dir(config.metadata_dir.clone());
        Self::new(runner, Arc::new(prober)).with_log_limit(config.log_limit)
    }

    #[must_use]
    pub fn with_log_limit(mut self, limit: usize) -> Self {
        self.log_limit = limit.max(1);
        self
    }

    pub fn prober(&self) -> &Arc<dyn Prober> {
        &self.prober
    }

    /// Collect metadata for `root`, or `None` when it cannot be a working copy.
    pub async fn collect(&self, root: &Path, extractors: &ExtractorMap) -> Option<MetadataRecord> {
        self.try_collect(root, extractors).await.ok()
    }

    /// Like [`Self::collect`], but says why nothing was collected.
    pub async fn try_collect(
        &self,
        root: &Path,
        extractors: &ExtractorMap,
    ) -> Result<MetadataRecord, ProbeError> {
        if !self.prober.available().await {
            log_warn!("svn is not installed, cannot read metadata for {}", root.display());
            return Err(ProbeError::ToolUnavailable);
        }

        if !self.prober.is_repository(root).await {
            log_debug!("{} is not a svn working copy", root.display());
            return Err(ProbeError::NotARepository {
                path: root.to_path_buf(),
            });
        }

        let start = Instant::now();

        let (info, last_commit, recent_log, extracted) = tokio::join!(
            self.basic_info(root),
            self.last_commit(root),
            self.recent_log(root),
            extractors.evaluate(),
        );

        trace_debug!(
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "collected svn metadata"
        );

        Ok(merge(
            info,
            last_commit,
            recent_log,
            QueryOutcome::Collected(extracted),
        ))
    }

    async fn basic_info(&self, root: &Path) -> QueryOutcome {
        let text = self.runner.run(&["info"], root).await;
        if text.is_empty() {
            return QueryOutcome::Failed(QueryError::EmptyOutput { command: "info" });
        }

        let info = InfoMap::parse(&text);
        if info.is_empty() {
            return QueryOutcome::Failed(QueryError::Unparsable { command: "info" });
        }

        QueryOutcome::Collected(basic_info_partial(&info))
    }

    async fn last_commit(&self, root: &Path) -> QueryOutcome {
        let xml = self.runner.run(&["log", "-l", "1", "--xml"], root).await;
        if xml.is_empty() {
            return QueryOutcome::Failed(QueryError::EmptyOutput { command: "log" });
        }

        match svn::parse_latest(&xml) {
            Some(entry) => QueryOutcome::Collected(last_commit_partial(&entry)),
            None => QueryOutcome::Failed(QueryError::Unparsable { command: "log" }),
        }
    }

    /// Recent revisions plus the inferred branch. Always yields a partial: an
    /// empty log only means `tags` is empty and `describe` is a bare `"r"`.
    async fn recent_log(&self, root: &Path) -> QueryOutcome {
        let limit = self.log_limit.to_string();
        let log_args = ["log", "-l", limit.as_str(), "--xml"];
        let (xml, info_text) = tokio::join!(
            self.runner.run(&log_args, root),
            self.runner.run(&["info"], root),
        );

        let entries = svn::parse_log(&xml);
        log_debug!("Read {} recent log entries", entries.len());

        let info = InfoMap::parse(&info_text);
        let wc_root = info
            .working_copy_root_path()
            .map_or_else(|| root.to_path_buf(), PathBuf::from);
        let branch = svn::infer_branch(info.url(), Some(&wc_root));

        QueryOutcome::Collected(recent_log_partial(&entries, &branch))
    }
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("log_limit", &self.log_limit)
            .finish_non_exhaustive()
    }
}

/// Merge task outcomes in precedence order: info, last commit, recent log,
/// extractors. Later layers overwrite keys set by earlier ones.
pub fn merge(
    info: QueryOutcome,
    last_commit: QueryOutcome,
    recent_log: QueryOutcome,
    extractors: QueryOutcome,
) -> MetadataRecord {
    let mut record = MetadataRecord::empty();
    record.merge(info.into_partial(&BASIC_INFO_KEYS));
    record.merge(last_commit.into_partial(&LAST_COMMIT_KEYS));
    record.merge(recent_log.into_partial(&RECENT_LOG_KEYS));
    record.merge(extractors.into_partial(&[]));
    record
}

pub fn basic_info_partial(info: &InfoMap) -> Partial {
    let mut partial = Partial::new();
    partial.set("url", info.url());
    partial.set("repositoryRoot", info.repository_root());
    partial.set("repositoryUuid", info.repository_uuid());
    partial.set("revision", info.revision());
    partial.set("nodeKind", info.node_kind());
    partial.set("lastChangedRev", info.last_changed_rev());
    partial.set("lastChangedDate", info.last_changed_date());
    partial.set("lastChangedAuthor", info.last_changed_author());
    partial
}

/// Revision numbers serve as both the full and the abbreviated identifier.
/// Subversion has no author e-mail, so `authorEmail` is always empty.
pub fn last_commit_partial(entry: &LogEntry) -> Partial {
    let mut partial = Partial::new();
    partial.set("sha", Some(entry.revision.as_str()));
    partial.set("abbreviatedSha", Some(entry.revision.as_str()));
    partial.set("commitMessage", Some(entry.msg.as_str()));
    partial.set("author", Some(entry.author.as_str()));
    partial.set("authorDate", Some(entry.date.as_str()));
    partial.set::<&str>("authorEmail", None);
    partial
}

pub fn recent_log_partial(entries: &[LogEntry], branch: &str) -> Partial {
    let tags: Vec<String> = entries.iter().map(|e| e.revision.clone()).collect();
    let describe = entries
        .first()
        .map_or_else(|| "r".to_string(), |e| format!("r{}", e.revision));

    let mut partial = Partial::new();
    partial.set("branch", Some(branch));
    partial.set("tag", Some(branch));
    partial.set("tags", Some(tags));
    partial.set("lastTag", Some(branch));
    partial.set("describe", Some(describe));
    partial
}
