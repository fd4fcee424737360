use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CarouselError {
    #[error("there is no cached wallpaper")]
    EmptyCache,

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("catalog not found: {0}")]
    CatalogNotFound(PathBuf),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("ipc error: {0}")]
    Ipc(String),
}

pub type Result<T> = std::result::Result<T, CarouselError>;
