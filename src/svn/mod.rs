// Subversion module: running the client and reading what it prints

mod branch;
mod command;
mod info;
mod log;
mod probe;

pub use branch::{TRUNK, UNKNOWN, UNKNOWN_BRANCH, UNKNOWN_TAG, infer_branch};
pub use command::{SvnRunner, SystemSvn};
pub use info::{InfoMap, camel_case};
pub use log::{LogEntry, parse_latest, parse_log};
pub use probe::{DEFAULT_METADATA_DIR, Prober, SvnProber};
