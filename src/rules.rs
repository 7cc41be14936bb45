//! Rules controlling which overlay entries reach the merged archive.

use crate::vpk::VpkVersion;

/// Parameters of a merge between a base archive and an overlay archive.
///
/// The defaults describe the dota pack layout: overlay entries under
/// `maps/dota/` carry over unchanged, the single `maps/dota_reef.vmap_c`
/// entry is renamed to `maps/dota.vmap_c`, and every other overlay entry
/// is dropped.
///
/// # Examples
///
/// ```
/// use reefmerge::MergeRules;
///
/// let rules = MergeRules::dota();
/// assert!(rules.is_protected("maps/dota/prefabs/tower.vmdl_c"));
/// assert!(rules.is_rename_source("maps/dota_reef.vmap_c"));
/// assert!(!rules.is_protected("scripts/npc/npc_units.txt"));
/// ```
#[derive(Debug, Clone)]
pub struct MergeRules {
    protected_prefix: String,
    rename_source: String,
    rename_target: String,
    base_name: String,
    overlay_name: String,
    output_version: VpkVersion,
}

impl MergeRules {
    /// Overlay prefix whose entries carry over unchanged.
    pub const DOTA_PROTECTED_PREFIX: &'static str = "maps/dota/";
    /// Overlay entry that replaces the base map file.
    pub const DOTA_RENAME_SOURCE: &'static str = "maps/dota_reef.vmap_c";
    /// Name the renamed entry takes in the output.
    pub const DOTA_RENAME_TARGET: &'static str = "maps/dota.vmap_c";
    /// File name of the base archive.
    pub const DOTA_BASE_ARCHIVE: &'static str = "dota.vpk";
    /// File name of the overlay archive.
    pub const DOTA_OVERLAY_ARCHIVE: &'static str = "dota_reef.vpk";

    /// Returns the rules for the dota pack layout.
    pub fn dota() -> Self {
        Self {
            protected_prefix: Self::DOTA_PROTECTED_PREFIX.to_string(),
            rename_source: Self::DOTA_RENAME_SOURCE.to_string(),
            rename_target: Self::DOTA_RENAME_TARGET.to_string(),
            base_name: Self::DOTA_BASE_ARCHIVE.to_string(),
            overlay_name: Self::DOTA_OVERLAY_ARCHIVE.to_string(),
            output_version: VpkVersion::V2,
        }
    }

    /// Sets the protected prefix. A trailing slash is appended if missing,
    /// so the prefix always matches at a directory boundary.
    pub fn with_protected_prefix(mut self, prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        self.protected_prefix = prefix;
        self
    }

    /// Sets the rename pair: the overlay entry at `source` appears in the
    /// output as `target`.
    pub fn with_rename(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.rename_source = source.into();
        self.rename_target = target.into();
        self
    }

    /// Sets the file name of the base archive.
    pub fn with_base_name(mut self, name: impl Into<String>) -> Self {
        self.base_name = name.into();
        self
    }

    /// Sets the file name of the overlay archive.
    pub fn with_overlay_name(mut self, name: impl Into<String>) -> Self {
        self.overlay_name = name.into();
        self
    }

    /// Sets the format version of the written archive.
    pub fn with_output_version(mut self, version: VpkVersion) -> Self {
        self.output_version = version;
        self
    }

    /// Returns the protected prefix, trailing slash included.
    pub fn protected_prefix(&self) -> &str {
        &self.protected_prefix
    }

    /// Returns the overlay path that gets renamed.
    pub fn rename_source(&self) -> &str {
        &self.rename_source
    }

    /// Returns the output path of the renamed entry.
    pub fn rename_target(&self) -> &str {
        &self.rename_target
    }

    /// Returns the base archive file name.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Returns the overlay archive file name.
    pub fn overlay_name(&self) -> &str {
        &self.overlay_name
    }

    /// Returns the format version of the written archive.
    pub fn output_version(&self) -> VpkVersion {
        self.output_version
    }

    /// Returns the file name of the digest marker next to the base archive.
    pub fn marker_name(&self) -> String {
        format!("{}.md5", self.base_name)
    }

    /// Returns true if an overlay entry at `path` carries over unchanged.
    pub fn is_protected(&self, path: &str) -> bool {
        path.starts_with(&self.protected_prefix)
    }

    /// Returns true if an overlay entry at `path` is the rename source.
    pub fn is_rename_source(&self, path: &str) -> bool {
        path == self.rename_source
    }
}

impl Default for MergeRules {
    fn default() -> Self {
        Self::dota()
    }
}
