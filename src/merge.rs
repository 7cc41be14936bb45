//! The merge pipeline: skip check, staging, packing, replacement.

use crate::digest::{ContentDigest, file_digest};
use crate::marker::DigestMarker;
use crate::select::{EntryOrigin, plan_merge};
use crate::vpk::{VpkArchive, VpkWriter};
use crate::{Error, MergeRules, Result};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Result of a merge run.
#[derive(Debug)]
pub enum MergeOutcome {
    /// The archive already contained the merged content; nothing was
    /// written.
    Skipped {
        /// The digest both the archive and its marker agreed on.
        digest: ContentDigest,
    },
    /// A merge ran and replaced the archive.
    Merged(MergeReport),
}

impl MergeOutcome {
    /// Returns true if the merge was skipped.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Returns the content digest of the archive after the run.
    pub fn digest(&self) -> &ContentDigest {
        match self {
            Self::Skipped { digest } => digest,
            Self::Merged(report) => &report.digest,
        }
    }
}

/// What a completed merge did.
#[derive(Debug, Clone)]
pub struct MergeReport {
    /// Entries carried over from the base archive.
    pub entries_from_base: usize,
    /// Entries taken from the overlay archive.
    pub entries_from_overlay: usize,
    /// Entries written under a different name than their source.
    pub entries_renamed: usize,
    /// Overlay entries excluded by the rules.
    pub overlay_dropped: usize,
    /// Bytes extracted into the staging directory.
    pub bytes_staged: u64,
    /// Content digest of the written archive.
    pub digest: ContentDigest,
}

impl MergeReport {
    /// Total number of entries in the written archive.
    pub fn entries_written(&self) -> usize {
        self.entries_from_base + self.entries_from_overlay
    }
}

/// Drives the merge pipeline against a maps directory.
///
/// A run reads the base and overlay archives from the directory, plans
/// which entries survive, stages their content in a temporary directory,
/// packs the staged tree into a fresh archive, swaps it over the base
/// archive with a rename, and records the new content digest in the
/// marker file. When the marker already matches the archive on disk the
/// whole pipeline is skipped.
///
/// The staged files live in a [`tempfile::TempDir`] and are removed when
/// the run returns, on the error path included.
///
/// # Examples
///
/// ```no_run
/// use reefmerge::{MergeOutcome, MergeRules, Merger};
///
/// let merger = Merger::new(MergeRules::dota());
/// match merger.run("game/dota/maps")? {
///     MergeOutcome::Skipped { digest } => println!("up to date ({digest})"),
///     MergeOutcome::Merged(report) => {
///         println!("merged {} entries", report.entries_written());
///     }
/// }
/// # Ok::<(), reefmerge::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Merger {
    rules: MergeRules,
    force: bool,
}

impl Merger {
    /// Creates a merger with the given rules.
    pub fn new(rules: MergeRules) -> Self {
        Self {
            rules,
            force: false,
        }
    }

    /// Merges even when the digest marker says the content is current.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Returns the rules this merger applies.
    pub fn rules(&self) -> &MergeRules {
        &self.rules
    }

    /// Runs the pipeline against the archives in `archive_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if either archive is missing or malformed, or if
    /// any filesystem step fails. The base archive is only ever replaced
    /// by a complete, fully written pack; a failure at any earlier point
    /// leaves it untouched.
    pub fn run(&self, archive_dir: impl AsRef<Path>) -> Result<MergeOutcome> {
        let archive_dir = archive_dir.as_ref();
        let base_path = archive_dir.join(self.rules.base_name());
        let marker = DigestMarker::for_archive(&base_path);

        let current = file_digest(&base_path)?;
        if !self.force {
            match marker.load()? {
                Some(recorded) if recorded == current => {
                    log::info!(
                        "{} already contains the merged content, nothing to do",
                        self.rules.base_name()
                    );
                    return Ok(MergeOutcome::Skipped { digest: current });
                }
                Some(_) => log::debug!("digest marker is stale, merging"),
                None => log::debug!("no usable digest marker, merging"),
            }
        }

        let mut base = VpkArchive::open_path(&base_path)?;
        let mut overlay = VpkArchive::open_path(archive_dir.join(self.rules.overlay_name()))?;

        let plan = plan_merge(base.paths(), overlay.paths(), &self.rules)?;
        log::info!(
            "merging {} entries ({} from base, {} from overlay), dropping {} overlay entries",
            plan.len(),
            plan.entries_from_base(),
            plan.entries_from_overlay(),
            plan.dropped().len()
        );

        let staging = tempfile::tempdir()?;
        let mut bytes_staged = 0u64;
        for entry in plan.entries() {
            let dest = staging.path().join(entry.effective_path().to_host_path());
            let source = entry.source_path().as_str();
            bytes_staged += match entry.origin() {
                EntryOrigin::Base => base.extract_to_path(source, &dest)?,
                EntryOrigin::Overlay => overlay.extract_to_path(source, &dest)?,
            };
        }

        let mut writer = VpkWriter::new(self.rules.output_version());
        let added = writer.add_directory(staging.path())?;
        if added != plan.len() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "staging produced {added} files for {} planned entries",
                    plan.len()
                ),
            )));
        }

        // The finished pack lands next to the base archive, then replaces
        // it with a rename. A partially written pack never becomes
        // visible under the base archive's name.
        let output = NamedTempFile::new_in(archive_dir)?;
        let summary = {
            let mut sink = BufWriter::new(output.as_file());
            let summary = writer.write_to(&mut sink)?;
            sink.flush()?;
            summary
        };
        output.persist(&base_path).map_err(|e| Error::Io(e.error))?;

        let digest = file_digest(&base_path)?;
        marker.store(&digest)?;
        log::info!(
            "wrote {} ({} entries, {} bytes), digest {digest}",
            self.rules.base_name(),
            summary.entries_written,
            summary.bytes_written
        );

        Ok(MergeOutcome::Merged(MergeReport {
            entries_from_base: plan.entries_from_base(),
            entries_from_overlay: plan.entries_from_overlay(),
            entries_renamed: plan.entries_renamed(),
            overlay_dropped: plan.dropped().len(),
            bytes_staged,
            digest,
        }))
    }
}
