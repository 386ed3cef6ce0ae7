//! Book harvesting: walk the manifest in order and stream each chapter to the output.

use crate::model::{ChapterManifest, Session};
use crate::scraper::chapter::{assemble_chapter, Pagination, Pause};
use crate::scraper::client::Transport;
use crate::scraper::error::HarvestError;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Options for a harvest run: page limits and an optional percentage callback.
#[derive(Default)]
pub struct HarvestOptions<'a> {
    pub pagination: Pagination,
    pub progress: Option<&'a dyn Fn(u32)>,
}

/// Counts for the final report.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HarvestSummary {
    pub chapters: usize,
    /// Chapters that reached their end-of-chapter flag.
    pub complete: usize,
    /// Chapters stopped by missing data, the page cap, or a failed request.
    pub cut_short: usize,
    pub bytes: u64,
}

/// Percentage reported before chapter `index` (0-based) of `total`.
pub fn progress_percent(index: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    (index * 100 / total) as u32
}

fn report(options: &HarvestOptions<'_>, percent: u32) {
    info!("Progress: {}%", percent);
    if let Some(cb) = options.progress {
        cb(percent);
    }
}

/// Harvest every chapter of `manifest` into `sink`, in manifest order.
///
/// Each chapter is written and flushed before the next one is requested. Chapter-level
/// problems are logged and skipped past; only sink failures end the run.
pub fn harvest_book<T, P, W>(
    transport: &mut T,
    mut session: Session,
    manifest: &ChapterManifest,
    pause: &mut P,
    sink: &mut W,
    options: &HarvestOptions<'_>,
) -> Result<HarvestSummary, HarvestError>
where
    T: Transport + ?Sized,
    P: Pause + ?Sized,
    W: Write + ?Sized,
{
    let total = manifest.len();
    let mut summary = HarvestSummary::default();

    for (index, chapter_id) in manifest.iter().enumerate() {
        report(options, progress_percent(index, total));
        let chapter = assemble_chapter(
            transport,
            &mut session,
            pause,
            chapter_id,
            options.pagination,
        );
        sink.write_all(chapter.text.as_bytes())?;
        sink.flush()?;

        summary.chapters += 1;
        summary.bytes += chapter.text.len() as u64;
        if chapter.outcome.is_complete() {
            summary.complete += 1;
        } else {
            summary.cut_short += 1;
        }
    }
    report(options, 100);

    Ok(summary)
}

/// Create (or truncate) `path` and harvest into it.
pub fn harvest_to_file<T, P>(
    transport: &mut T,
    session: Session,
    manifest: &ChapterManifest,
    pause: &mut P,
    path: &Path,
    options: &HarvestOptions<'_>,
) -> Result<HarvestSummary, HarvestError>
where
    T: Transport + ?Sized,
    P: Pause + ?Sized,
{
    let file = File::create(path).map_err(|e| HarvestError::Output {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);
    let summary = harvest_book(transport, session, manifest, pause, &mut writer, options)?;
    writer.flush()?;
    Ok(summary)
}
