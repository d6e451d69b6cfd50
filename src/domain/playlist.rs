use serde::{Deserialize, Serialize};

use super::{Image, song::Song};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub title: String,
    pub owner: Owner,
    pub follower_count: Option<u64>,
    pub song_count: usize,
    pub last_updated: Option<String>,
    pub url: Option<String>,
    pub images: Vec<Image>,
    pub songs: Vec<Song>,
}

/// Curator of a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: Option<String>,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: String,
}
