use anyhow::Result;
use glob::glob;
use rand::Rng;
use std::path::{Path, PathBuf};

/// A video that can be shown as the page background
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoAsset {
    /// Filename, used as the asset identifier
    name: String,

    /// Absolute location of the file
    path: PathBuf,
}

impl VideoAsset {
    pub fn new(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let name = path.file_name()?.to_str()?.to_string();
        Some(Self { name, path })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filename minus its extension
    pub fn display_name(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.name,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self) -> common::AssetInfo {
        common::AssetInfo {
            name: self.name.clone(),
            display_name: self.display_name().to_string(),
            path: self.path.to_string_lossy().to_string(),
        }
    }
}

/// The fixed, ordered list of selectable videos.
///
/// Loaded once before the page starts and never modified afterwards.
#[derive(Debug, Clone)]
pub struct AssetList {
    assets: Vec<VideoAsset>,
}

impl AssetList {
    /// Build the asset list from sources (files, directories or glob patterns)
    pub fn load(sources: &[String], extensions: &[String]) -> Result<Self> {
        let paths = Self::load_paths_from_sources(sources, extensions)?;
        let list = Self::from_paths(paths)?;

        log::info!(
            "Loaded {} video asset(s) from {} source(s)",
            list.len(),
            sources.len()
        );

        Ok(list)
    }

    /// Build the asset list from explicit paths, keeping their order
    pub fn from_paths<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut assets: Vec<VideoAsset> = Vec::new();
        for path in paths {
            let path = path.into();
            match VideoAsset::new(&path) {
                // The filename is the identifier, so it has to be unique
                Some(asset) if assets.iter().any(|a| a.name == asset.name) => {
                    log::warn!(
                        "Skipping {}: another video is already named {}",
                        path.display(),
                        asset.name
                    );
                }
                Some(asset) => assets.push(asset),
                None => log::warn!("Skipping {}: no usable filename", path.display()),
            }
        }

        if assets.is_empty() {
            anyhow::bail!("No videos found in asset sources");
        }

        Ok(Self { assets })
    }

    /// Load paths from source entries
    fn load_paths_from_sources(sources: &[String], extensions: &[String]) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();

        for source in sources {
            let expanded_source = shellexpand::tilde(source);

            // Check if it's a direct file
            let source_path = Path::new(expanded_source.as_ref());
            if source_path.is_file() {
                if Self::has_valid_extension(source_path, extensions) {
                    paths.push(source_path.to_path_buf());
                }
                continue;
            }

            // Check if it's a directory, matching extensions without regard to case
            if source_path.is_dir() {
                let pattern = format!("{}/*", glob::Pattern::escape(&expanded_source));
                match glob(&pattern) {
                    Ok(entries) => {
                        for entry in entries.flatten() {
                            if entry.is_file() && Self::has_valid_extension(&entry, extensions) {
                                paths.push(entry);
                            }
                        }
                    }
                    Err(e) => {
                        log::warn!("Failed to scan directory '{}': {}", source, e);
                    }
                }
                continue;
            }

            // Try as glob pattern
            match glob(&expanded_source) {
                Ok(entries) => {
                    for entry in entries.flatten() {
                        if entry.is_file() && Self::has_valid_extension(&entry, extensions) {
                            paths.push(entry);
                        }
                    }
                }
                Err(e) => {
                    log::warn!("Failed to glob pattern '{}': {}", source, e);
                }
            }
        }

        paths.sort();
        paths.dedup();

        Ok(paths)
    }

    /// Check if a file has a valid extension
    fn has_valid_extension(path: &Path, extensions: &[String]) -> bool {
        if let Some(ext) = path.extension() {
            if let Some(ext_str) = ext.to_str() {
                return extensions.iter().any(|e| e.eq_ignore_ascii_case(ext_str));
            }
        }
        false
    }

    pub fn get(&self, name: &str) -> Option<&VideoAsset> {
        self.assets.iter().find(|a| a.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Pick an asset uniformly at random
    pub fn random(&self) -> &VideoAsset {
        let index = rand::rng().random_range(0..self.assets.len());
        &self.assets[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &VideoAsset> {
        self.assets.iter()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
