pub mod album;
pub mod playlist;
pub mod song;

use serde::{Deserialize, Serialize};

/// Artwork at one resolution, e.g. `500x500`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub quality: String,
    pub url: String,
}

const IMAGE_SIZES: &[&str] = &["50x50", "150x150", "500x500"];

/// Upstream hands out the 150x150 variant; the other sizes share its URL shape.
pub fn image_set(url: &str) -> Vec<Image> {
    if url.is_empty() {
        return Vec::new();
    }
    if !url.contains("150x150") {
        return vec![Image {
            quality: "original".to_string(),
            url: url.to_string(),
        }];
    }
    IMAGE_SIZES
        .iter()
        .map(|size| Image {
            quality: size.to_string(),
            url: url.replace("150x150", size),
        })
        .collect()
}

/// Splits upstream's comma separated artist lists.
pub fn artist_list(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
