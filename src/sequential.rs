use crate::attachments::{AttachmentDetector, Download};
use crate::client::PostSource;
use crate::error::{ArchiveError, Result};
use crate::exporter::ArchiveWriter;
use crate::utils::{ArchiveConfig, RunSummary};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use tracing::info;

fn progress_bar(total: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
    {
        bar.set_style(style.progress_chars("=>-"));
    }
    bar.println(format!("Found {} posts.", total));
    bar
}

/// Fetches every post, then archives them one at a time.
/// The first failure stops the run.
pub fn execute(
    config: &ArchiveConfig,
    source: &dyn PostSource,
    downloader: &dyn Download,
) -> Result<RunSummary> {
    fs::create_dir_all(&config.target_dir)
        .map_err(|e| ArchiveError::fs("create target directory", &config.target_dir, e))?;

    let posts = source.fetch_all_posts()?;
    info!(count = posts.len(), team = %config.team, "Fetched posts");

    let detector = AttachmentDetector::new(config.attachment_prefixes.iter().cloned());
    let writer = ArchiveWriter::new(&config.target_dir, detector, downloader);
    let pb = progress_bar(posts.len() as u64, config.quiet);

    let mut summary = RunSummary::default();
    for post in &posts {
        let report = match writer.archive_post(post) {
            Ok(report) => report,
            Err(e) => {
                pb.abandon();
                return Err(e);
            }
        };

        summary.posts += 1;
        summary.attachments += report.attachments;
        info!(
            number = post.number,
            full_name = %post.full_name,
            attachments = report.attachments,
            "Archived post"
        );
        if config.verbose {
            let shown = report
                .file
                .strip_prefix(writer.root())
                .unwrap_or(&report.file);
            pb.println(format!("Wrote:  {}", shown.display()));
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    if !config.quiet {
        eprintln!(
            "Done. {} posts archived, {} attachments downloaded.",
            summary.posts, summary.attachments
        );
    }

    Ok(summary)
}
