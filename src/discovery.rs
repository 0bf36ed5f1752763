//! Tileset discovery.
//!
//! Walks an input tree and collects the tiles to optimize together with the
//! descriptor files (`tileset.json` and friends) that must travel with them.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::batch::FileJob;
use crate::config::DiscoveryConfig;
use crate::{Error, Result};

/// Tile file extension.
pub const TILE_EXTENSION: &str = "b3dm";

/// Check if a path has a b3dm tile extension (case-insensitive).
pub fn is_tile_file(path: &Path) -> bool {
    has_extension(path, &[TILE_EXTENSION])
}

/// Check if a path has one of the given extensions (case-insensitive).
pub fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            extensions
                .iter()
                .any(|candidate| candidate.as_ref().eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Files found under an input root.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub root: PathBuf,
    /// Tiles, sorted, as paths under `root`.
    pub tiles: Vec<PathBuf>,
    /// Descriptor files, sorted, as paths under `root`.
    pub descriptors: Vec<PathBuf>,
}

/// Walk `root` recursively and collect tiles and descriptors.
///
/// Anything under `exclude` (typically the output directory when it sits
/// inside the input tree) is skipped.
pub fn discover(root: &Path, config: &DiscoveryConfig, exclude: Option<&Path>) -> Discovery {
    info!("Scanning directory: {:?}", root);

    let mut discovery = Discovery {
        root: root.to_path_buf(),
        ..Default::default()
    };

    let walker = WalkDir::new(root)
        .follow_links(config.follow_links)
        .into_iter()
        .filter_entry(|entry| match exclude {
            Some(excluded) => !entry.path().starts_with(excluded),
            None => true,
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        if is_tile_file(&path) {
            discovery.tiles.push(path);
        } else if has_extension(&path, &config.descriptor_extensions) {
            discovery.descriptors.push(path);
        }
    }

    discovery.tiles.sort();
    discovery.descriptors.sort();

    debug!(
        "Found {} tiles and {} descriptors",
        discovery.tiles.len(),
        discovery.descriptors.len()
    );

    discovery
}

impl Discovery {
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Build one job per tile.
    ///
    /// With an `output_root` each tile lands at the same relative path under
    /// it; without one, tiles are rewritten in place.
    pub fn jobs(&self, output_root: Option<&Path>) -> Vec<FileJob> {
        self.tiles
            .iter()
            .map(|source| {
                let relative = self.relative(source).to_path_buf();
                let destination = match output_root {
                    Some(out) => out.join(&relative),
                    None => source.clone(),
                };
                FileJob {
                    source: source.clone(),
                    destination,
                    relative,
                }
            })
            .collect()
    }

    /// Recreate the directory layout of every tile under `output_root` and
    /// copy descriptors there unchanged.
    ///
    /// Returns the number of descriptors copied.
    pub fn mirror_into(&self, output_root: &Path) -> Result<usize> {
        fs::create_dir_all(output_root).map_err(|e| Error::io(output_root, e))?;

        for tile in &self.tiles {
            if let Some(parent) = self.relative(tile).parent() {
                let dir = output_root.join(parent);
                fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
            }
        }

        for descriptor in &self.descriptors {
            let target = output_root.join(self.relative(descriptor));
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            fs::copy(descriptor, &target).map_err(|e| Error::io(&target, e))?;
            debug!("Copied descriptor {:?}", target);
        }

        Ok(self.descriptors.len())
    }
}
