use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::cache::RotationCache;
use crate::error::{CarouselError, Result};
use crate::models::Wallpaper;

/// Where a fresh page of wallpapers comes from.
#[async_trait]
pub trait WallpaperCatalog: Send + Sync {
    /// Display name used in logs.
    fn name(&self) -> &str;
    async fn fetch(&self) -> Result<Vec<Wallpaper>>;
}

/// Catalog backed by a JSON array of wallpapers on disk.
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl WallpaperCatalog for FileCatalog {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self) -> Result<Vec<Wallpaper>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CarouselError::CatalogNotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        let wallpapers: Vec<Wallpaper> = serde_json::from_str(&content).map_err(|e| {
            CarouselError::Catalog(format!("invalid catalog {}: {e}", self.path.display()))
        })?;
        Ok(wallpapers)
    }
}

/// Fetch a new page from `catalog` and swap it into `cache`.
///
/// On failure the cache keeps whatever it held before. Returns the number of
/// wallpapers now cached.
pub async fn refresh(cache: &RotationCache, catalog: &dyn WallpaperCatalog) -> Result<usize> {
    let wallpapers = match catalog.fetch().await {
        Ok(wps) => wps,
        Err(e) => {
            warn!(catalog = catalog.name(), "catalog fetch failed: {e}");
            return Err(e);
        }
    };
    let count = wallpapers.len();
    cache.replace(wallpapers);
    info!(catalog = catalog.name(), count, "catalog loaded");
    Ok(count)
}
