use crate::attachments::DEFAULT_ATTACHMENT_PREFIXES;
use crate::importer::Post;
use std::path::{Path, PathBuf};

/// Configuration required to run the archive process.
/// This decouples the logic from how the arguments were parsed (CLI/Config file).
#[derive(Clone, Debug)]
pub struct ArchiveConfig {
    pub target_dir: PathBuf,
    pub team: String,
    pub attachment_prefixes: Vec<String>,
    pub verbose: bool,
    pub quiet: bool,
}

impl ArchiveConfig {
    pub fn new(target_dir: impl Into<PathBuf>, team: impl Into<String>) -> Self {
        Self {
            target_dir: target_dir.into(),
            team: team.into(),
            attachment_prefixes: DEFAULT_ATTACHMENT_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            verbose: false,
            quiet: false,
        }
    }
}

/// Where a post lands on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Category directory; also the parent of `attachments/`.
    pub dir: PathBuf,
    /// `<dir>/<name>.md`
    pub file: PathBuf,
}

impl ArchiveEntry {
    /// Every `full_name` segment but the last becomes a directory. The last
    /// segment carries esa's ` #tag` decorations, so the file is named after
    /// `post.name` instead.
    pub fn for_post(root: &Path, post: &Post) -> Self {
        Self::from_parts(root, &post.full_name, &post.name)
    }

    pub fn from_parts(root: &Path, full_name: &str, name: &str) -> Self {
        let mut segments: Vec<&str> = full_name.split('/').collect();
        segments.pop();

        let dir = segments
            .into_iter()
            .filter(|s| !s.is_empty())
            .fold(root.to_path_buf(), |acc, seg| acc.join(seg));
        let file = dir.join(format!("{}.md", name));
        Self { dir, file }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub posts: usize,
    pub attachments: usize,
}
