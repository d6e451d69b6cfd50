use serde::{Deserialize, Serialize};

use super::Image;

/// Represent a song in the stable output schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: String,
    pub title: String,
    pub album: AlbumRef,
    pub primary_artists: Vec<String>,
    pub featured_artists: Vec<String>,
    pub singers: String,
    pub music: String,
    pub starring: String,
    pub year: Option<String>,
    pub release_date: Option<String>,
    pub language: Option<String>,
    pub label: Option<String>,
    pub copyright: Option<String>,
    pub explicit: bool,
    pub play_count: Option<u64>,
    /// seconds
    pub duration: Option<u32>,
    pub url: Option<String>,
    pub preview_url: Option<String>,
    /// ordered from the lowest to the highest bitrate
    pub download_urls: Vec<DownloadUrl>,
    pub images: Vec<Image>,
    pub has_lyrics: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRef {
    pub id: Option<String>,
    pub name: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadUrl {
    /// e.g. `160kbps`
    pub quality: String,
    pub url: String,
}

/// Search hit returned when full song data is not requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongStub {
    pub id: String,
    pub title: String,
    pub album: String,
    pub description: String,
    pub image: String,
    pub url: String,
    pub primary_artists: String,
    pub singers: String,
    pub language: String,
}
