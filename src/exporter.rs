use crate::attachments::{AttachmentDetector, Download, fetch_attachment};
use crate::error::{ArchiveError, Result};
use crate::importer::Post;
use crate::rewriter::SubstitutionTable;
use crate::utils::ArchiveEntry;
use chrono::{DateTime, FixedOffset};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const COMMENTS_MARKER: &str = "# -------Comments--------";

/// A post whose bodies already point at local attachments.
pub struct RenderedPost {
    pub body: String,
    pub comments: Vec<RenderedComment>,
}

pub struct RenderedComment {
    pub created_at: DateTime<FixedOffset>,
    pub body: String,
}

/// What one call to [`ArchiveWriter::archive_post`] put on disk.
#[derive(Debug)]
pub struct PostReport {
    pub file: PathBuf,
    pub attachments: usize,
}

pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S %z").to_string()
}

pub fn write_post_markdown<W: Write>(writer: &mut W, post: &RenderedPost) -> std::io::Result<()> {
    write!(writer, "{}", post.body)?;

    if post.comments.is_empty() {
        return Ok(());
    }

    writeln!(writer)?;
    writeln!(writer, "{}", COMMENTS_MARKER)?;
    for comment in &post.comments {
        writeln!(writer, "### {}", format_timestamp(&comment.created_at))?;
        write!(writer, "{}", comment.body)?;
        writeln!(writer)?;
    }

    Ok(())
}

/// Writes posts under an archive root, pulling their attachments alongside.
pub struct ArchiveWriter<'a> {
    root: PathBuf,
    detector: AttachmentDetector,
    downloader: &'a dyn Download,
}

impl<'a> ArchiveWriter<'a> {
    pub fn new(root: impl Into<PathBuf>, detector: AttachmentDetector, downloader: &'a dyn Download) -> Self {
        Self {
            root: root.into(),
            detector,
            downloader,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Downloads every attachment in `body` not yet in `table`, then rewrites
    /// `body` against the whole table.
    fn localize(&self, body: &str, dir: &Path, table: &mut SubstitutionTable) -> Result<String> {
        for attachment in self.detector.detect(body) {
            if table.contains(&attachment.remote_url) {
                continue;
            }
            let local = fetch_attachment(self.downloader, &attachment, dir)?;
            table.insert(attachment.remote_url, local);
        }
        Ok(table.rewrite(body).into_owned())
    }

    pub fn render(&self, post: &Post, dir: &Path) -> Result<(RenderedPost, SubstitutionTable)> {
        let mut table = SubstitutionTable::new();
        let body = self.localize(&post.body_md, dir, &mut table)?;

        let mut comments = Vec::with_capacity(post.comments.len());
        for comment in &post.comments {
            comments.push(RenderedComment {
                created_at: comment.created_at,
                body: self.localize(&comment.body_md, dir, &mut table)?,
            });
        }

        Ok((RenderedPost { body, comments }, table))
    }

    pub fn archive_post(&self, post: &Post) -> Result<PostReport> {
        let entry = ArchiveEntry::for_post(&self.root, post);
        fs::create_dir_all(&entry.dir)
            .map_err(|e| ArchiveError::fs("create post directory", &entry.dir, e))?;

        let (rendered, table) = self.render(post, &entry.dir)?;
        if !table.is_empty() {
            for (url, local) in table.iter() {
                debug!(post = %post.full_name, url, local, "Localized attachment link");
            }
        }

        let md_file = File::create(&entry.file)
            .map_err(|e| ArchiveError::fs("create markdown file", &entry.file, e))?;
        let mut writer = BufWriter::new(md_file);
        write_post_markdown(&mut writer, &rendered)
            .and_then(|_| writer.flush())
            .map_err(|e| ArchiveError::fs("write markdown file", &entry.file, e))?;

        Ok(PostReport {
            file: entry.file,
            attachments: table.len(),
        })
    }
}
