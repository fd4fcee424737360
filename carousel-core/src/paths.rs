use std::path::PathBuf;

use crate::error::{CarouselError, Result};

#[derive(Debug, Clone)]
pub struct CarouselPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl CarouselPaths {
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CarouselError::Config("cannot resolve XDG config dir".into()))?
            .join("carousel");

        let data_dir = dirs::data_dir()
            .ok_or_else(|| CarouselError::Config("cannot resolve XDG data dir".into()))?
            .join("carousel");

        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Catalog used when the config does not name one.
    pub fn default_catalog(&self) -> PathBuf {
        self.data_dir.join("catalog.json")
    }

    pub fn socket_path() -> PathBuf {
        let uid = unsafe { libc::getuid() };
        PathBuf::from(format!("/tmp/carousel-{uid}.sock"))
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.config_dir, &self.data_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = CarouselPaths {
            config_dir: tmp.path().join("config"),
            data_dir: tmp.path().join("data"),
        };
        paths.ensure_dirs().unwrap();
        assert!(paths.config_dir.is_dir());
        assert!(paths.data_dir.is_dir());
        assert_eq!(paths.config_file(), tmp.path().join("config/config.toml"));
        assert_eq!(paths.default_catalog(), tmp.path().join("data/catalog.json"));
    }

    #[test]
    fn test_socket_path_is_per_user() {
        let path = CarouselPaths::socket_path();
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("carousel-"));
        assert!(name.ends_with(".sock"));
    }
}
