//! # esa-archiver
//!
//! A CLI tool that archives every post of an [esa.io](https://esa.io) team to local
//! Markdown files, together with the files uploaded into them.
//!
//! ## What it does
//!
//! Posts are fetched through the esa v1 API (`ESA_TOKEN` bearer token, comments
//! included). Each post is written to a path that mirrors its category:
//!
//! ```text
//! Eng/Design/Overview          ->  <root>/Eng/Design/Overview.md
//!                                  <root>/Eng/Design/attachments/<file>
//! ```
//!
//! Uploads referenced from the post or its comments (`[name (size)](https://img.esa.io/...)`)
//! are downloaded into `attachments/` next to the post and the links are rewritten
//! to `./attachments/<name>`. Comments follow the body under a
//! `# -------Comments--------` separator, each headed by its creation time.
//!
//! Every run re-fetches and overwrites everything. The first error stops the run.
//!
//! ## Usage
//!
//! ```sh
//! ESA_TOKEN=xxxx esa-archiver ~/backup/esa --team docs
//! ```
//!
//! Preferences can be persisted in `~/.config/esa-archiver/config.toml`.
pub mod attachments;
pub mod client;
pub mod error;
pub mod exporter;
pub mod importer;
pub mod rewriter;
pub mod sequential;
pub mod utils;

pub use attachments::{Attachment, AttachmentDetector, Download, HttpDownloader};
pub use client::{EsaClient, PostSource};
pub use error::{ArchiveError, Result};
pub use exporter::ArchiveWriter;
pub use importer::{Comment, Post};
pub use rewriter::SubstitutionTable;
pub use utils::{ArchiveConfig, ArchiveEntry, RunSummary};
