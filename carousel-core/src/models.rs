use serde::{Deserialize, Serialize};

/// A wallpaper as held by the rotation cache. Identity is `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallpaper {
    pub id: String,
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub image_uri: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Wallpaper {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            liked: false,
            title: String::new(),
            author: String::new(),
            source_url: None,
            image_uri: String::new(),
            width: 0,
            height: 0,
            tags: Vec::new(),
        }
    }
}

/// Display form of a [`Wallpaper`], handed to the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallpaperItem {
    pub id: String,
    pub liked: bool,
    pub title: String,
    pub attribution: String,
    pub image_uri: String,
    pub resolution: Option<String>,
    pub tags: Vec<String>,
}

impl From<&Wallpaper> for WallpaperItem {
    fn from(wp: &Wallpaper) -> Self {
        let attribution = if wp.author.trim().is_empty() {
            wp.title.clone()
        } else {
            format!("{} by {}", wp.title, wp.author)
        };
        let resolution =
            (wp.width > 0 && wp.height > 0).then(|| format!("{}x{}", wp.width, wp.height));
        Self {
            id: wp.id.clone(),
            liked: wp.liked,
            title: wp.title.clone(),
            attribution,
            image_uri: wp.image_uri.clone(),
            resolution,
            tags: wp.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
    Uninitialized,
    Empty,
    Populated,
}

impl std::fmt::Display for CacheState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Empty => write!(f, "empty"),
            Self::Populated => write!(f, "populated"),
        }
    }
}
