use crate::client::blocking_client;
use crate::error::{ArchiveError, Result};
use regex::Regex;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

/// Origins esa serves uploaded files from.
pub const DEFAULT_ATTACHMENT_PREFIXES: &[&str] = &[
    "https://img.esa.io/",
    "https://esa-storage-tokyo.s3-ap-northeast-1.amazonaws.com/",
];

pub const ATTACHMENTS_DIR: &str = "attachments";

/// `[name (meta)](url)`, single level, no nesting.
static ATTACHMENT_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\[\]]+) \(([^()]+)\)\]\(([^()]+)\)").expect("attachment pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub display_name: String,
    pub remote_url: String,
}

/// Finds esa upload links in markdown.
///
/// esa renders an upload as `![image.png (12.3 kB)](https://img.esa.io/...)`;
/// the parenthesized size suffix is what separates uploads from ordinary links.
/// Anything that does not have that exact shape is skipped without error.
#[derive(Debug, Clone)]
pub struct AttachmentDetector {
    prefixes: Vec<String>,
}

impl Default for AttachmentDetector {
    fn default() -> Self {
        Self::new(DEFAULT_ATTACHMENT_PREFIXES.iter().map(|p| p.to_string()))
    }
}

impl AttachmentDetector {
    pub fn new(prefixes: impl IntoIterator<Item = String>) -> Self {
        Self {
            prefixes: prefixes.into_iter().collect(),
        }
    }

    pub fn is_attachment(&self, url: &str) -> bool {
        self.prefixes.iter().any(|p| url.starts_with(p.as_str()))
    }

    pub fn detect(&self, body: &str) -> Vec<Attachment> {
        ATTACHMENT_LINK
            .captures_iter(body)
            .filter_map(|caps| {
                let url = caps.get(3)?.as_str();
                if !self.is_attachment(url) {
                    return None;
                }
                Some(Attachment {
                    display_name: caps.get(1)?.as_str().to_string(),
                    remote_url: url.to_string(),
                })
            })
            .collect()
    }
}

/// Transport used to pull attachment bytes.
pub trait Download {
    /// Stream the resource at `url` into `out`, returning the byte count.
    fn download(&self, url: &str, out: &mut dyn Write) -> Result<u64>;
}

pub struct HttpDownloader {
    http: reqwest::blocking::Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self> {
        let http = blocking_client().map_err(|e| ArchiveError::AttachmentDownload {
            url: String::new(),
            source: e.into(),
        })?;
        Ok(Self { http })
    }
}

impl Download for HttpDownloader {
    fn download(&self, url: &str, out: &mut dyn Write) -> Result<u64> {
        let failed = |e: reqwest::Error| ArchiveError::AttachmentDownload {
            url: url.to_string(),
            source: e.into(),
        };
        let mut resp = self
            .http
            .get(url)
            .send()
            .map_err(failed)?
            .error_for_status()
            .map_err(failed)?;
        resp.copy_to(out).map_err(failed)
    }
}

/// Makes a display name safe to use as a single file name inside `attachments/`.
///
/// Names that are already a plain component pass through untouched.
pub fn attachment_file_name(display_name: &str, remote_url: &str) -> String {
    let replaced: String = display_name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    if is_plain_component(&replaced) {
        return replaced;
    }

    Url::parse(remote_url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segs| segs.next_back().map(str::to_string))
        })
        .filter(|seg| is_plain_component(seg))
        .unwrap_or_else(|| "attachment".to_string())
}

fn is_plain_component(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".."
}

/// Downloads one attachment into `<post_dir>/attachments/` and returns the
/// relative path to substitute into markdown.
pub fn fetch_attachment(
    downloader: &dyn Download,
    attachment: &Attachment,
    post_dir: &Path,
) -> Result<String> {
    let dir = post_dir.join(ATTACHMENTS_DIR);
    fs::create_dir_all(&dir)
        .map_err(|e| ArchiveError::fs("create attachments directory", &dir, e))?;

    let file_name = attachment_file_name(&attachment.display_name, &attachment.remote_url);
    let path = dir.join(&file_name);

    // Buffer the body first so a failed request leaves nothing on disk.
    let mut data = Vec::new();
    let bytes = downloader.download(&attachment.remote_url, &mut data)?;

    let file = File::create(&path).map_err(|e| ArchiveError::fs("create attachment", &path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&data)
        .and_then(|_| writer.flush())
        .map_err(|e| ArchiveError::fs("write attachment", &path, e))?;

    debug!(url = %attachment.remote_url, path = %path.display(), bytes, "Downloaded attachment");

    Ok(format!("./{}/{}", ATTACHMENTS_DIR, file_name))
}
