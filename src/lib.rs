//! svn-buildinfo - SVN working-copy metadata as a generated build-info module
//!
//! A bundler-plugin host hands over a project root and an [`Options`] value and
//! gets back module source with one `export <key> = <value>` line per key:
//! revision, author, branch, recent revisions and whatever extra values the
//! caller's extractors produce.
//!
//! ```no_run
//! use std::path::Path;
//! use svn_buildinfo::{Config, LogDiagnostics, ModuleGenerator, Options};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let root = Path::new("/path/to/checkout");
//! let generator = ModuleGenerator::from_config(&Config::load(root)?);
//! let source = generator
//!     .generate(root, &Options::new(), &LogDiagnostics)
//!     .await;
//! println!("{source}");
//! # Ok(())
//! # }
//! ```

#![allow(clippy::uninlined_format_args)] // Style preference

pub mod cli;
pub mod config;
pub mod generator;
pub mod logger;
pub mod metadata;
pub mod svn;

pub use config::Config;
pub use generator::{
    CollectedDiagnostics, Diagnostics, GeneratedModule, LogDiagnostics, ModuleGenerator,
    module_keys,
};
pub use metadata::{Aggregator, ExtractorMap, MetadataRecord, MetadataValue, Options};
