//! Collection and merging of working-copy metadata.

mod aggregator;
mod extractor;
mod record;

pub use aggregator::{
    Aggregator, BASIC_INFO_KEYS, DEFAULT_LOG_LIMIT, LAST_COMMIT_KEYS, ProbeError, QueryError,
    QueryOutcome, RECENT_LOG_KEYS, basic_info_partial, last_commit_partial, merge,
    recent_log_partial,
};
pub use extractor::{ExtractorContext, ExtractorFn, ExtractorFuture, ExtractorMap, Options};
pub use record::{FIXED_KEYS, MetadataRecord, MetadataValue, Partial};
