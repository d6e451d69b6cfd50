use serde::{Deserialize, Serialize};

use super::{Image, song::Song};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub title: String,
    pub name: String,
    pub year: Option<String>,
    pub release_date: Option<String>,
    pub primary_artists: Vec<String>,
    pub url: Option<String>,
    pub images: Vec<Image>,
    /// in upstream order
    pub songs: Vec<Song>,
}
