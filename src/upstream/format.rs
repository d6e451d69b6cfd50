//! Mapping of raw upstream JSON onto the stable output schema.
//!
//! Every formatter returns `None` when the payload lacks an id, which callers
//! treat as a soft miss rather than an error.

use serde_json::Value;

use crate::{
    domain::{
        album::Album,
        artist_list, image_set,
        playlist::{Owner, Playlist},
        song::{AlbumRef, DownloadUrl, Song, SongStub},
    },
    upstream::error::UpstreamError,
};

/// Where formatters get lyrics from when they were asked to attach them.
pub trait LyricsSource {
    fn lyrics(&self, song_id: &str) -> Result<String, UpstreamError>;
}

const PREVIEW_SUFFIX: &str = "_96_p.mp4";

/// Decodes the HTML entities upstream leaves in text fields.
pub fn clean_text(text: &str) -> String {
    text.replace("&quot;", "'")
        .replace("&amp;", "&")
        .replace("&#039;", "'")
}

fn text(raw: &Value, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(raw: &Value, key: &str) -> Option<String> {
    text(raw, key).filter(|s| !s.is_empty())
}

fn cleaned(raw: &Value, key: &str) -> String {
    text(raw, key).map(|s| clean_text(&s)).unwrap_or_default()
}

fn number(raw: &Value, key: &str) -> Option<u64> {
    match raw.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn flag(raw: &Value, key: &str) -> bool {
    match raw.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true" || s == "1",
        Some(Value::Number(n)) => n.as_u64() == Some(1),
        _ => false,
    }
}

/// Derives the full quality streams from the 96 kbps preview URL.
fn download_urls(raw: &Value) -> Vec<DownloadUrl> {
    let Some(preview) = non_empty(raw, "media_preview_url") else {
        return Vec::new();
    };
    if !preview.contains(PREVIEW_SUFFIX) {
        return Vec::new();
    }
    let base = preview.replace("preview.", "aac.");

    let mut qualities = vec![("96kbps", "_96.mp4"), ("160kbps", "_160.mp4")];
    if flag(raw, "320kbps") {
        qualities.push(("320kbps", "_320.mp4"));
    }
    qualities
        .into_iter()
        .map(|(quality, suffix)| DownloadUrl {
            quality: quality.to_string(),
            url: base.replace(PREVIEW_SUFFIX, suffix),
        })
        .collect()
}

pub fn format_song(raw: &Value, lyrics: Option<&dyn LyricsSource>) -> Option<Song> {
    let id = non_empty(raw, "id")?;
    let has_lyrics = flag(raw, "has_lyrics");

    let lyrics = match lyrics {
        Some(source) if has_lyrics => match source.lyrics(&id) {
            Ok(text) => Some(text),
            Err(e) => {
                log::warn!("lyrics for song {id} unavailable: {e}");
                None
            }
        },
        _ => None,
    };

    Some(Song {
        title: cleaned(raw, "song"),
        album: AlbumRef {
            id: non_empty(raw, "albumid"),
            name: cleaned(raw, "album"),
            url: non_empty(raw, "album_url"),
        },
        primary_artists: artist_list(&cleaned(raw, "primary_artists")),
        featured_artists: artist_list(&cleaned(raw, "featured_artists")),
        singers: cleaned(raw, "singers"),
        music: cleaned(raw, "music"),
        starring: cleaned(raw, "starring"),
        year: non_empty(raw, "year"),
        release_date: non_empty(raw, "release_date"),
        language: non_empty(raw, "language"),
        label: non_empty(raw, "label").map(|s| clean_text(&s)),
        copyright: non_empty(raw, "copyright_text").map(|s| s.replace("&copy;", "©")),
        explicit: flag(raw, "explicit_content"),
        play_count: number(raw, "play_count"),
        duration: number(raw, "duration").and_then(|d| u32::try_from(d).ok()),
        url: non_empty(raw, "perma_url"),
        preview_url: non_empty(raw, "media_preview_url"),
        download_urls: download_urls(raw),
        images: image_set(&text(raw, "image").unwrap_or_default()),
        has_lyrics,
        lyrics,
        id,
    })
}

fn format_songs(raw: &Value, lyrics: Option<&dyn LyricsSource>) -> Vec<Song> {
    let Some(entries) = raw.get("songs").and_then(Value::as_array) else {
        return Vec::new();
    };
    let songs: Vec<Song> = entries
        .iter()
        .filter_map(|entry| format_song(entry, lyrics))
        .collect();
    if songs.len() < entries.len() {
        log::debug!("skipped {} songs without id", entries.len() - songs.len());
    }
    songs
}

pub fn format_album(raw: &Value, lyrics: Option<&dyn LyricsSource>) -> Option<Album> {
    let id = non_empty(raw, "albumid").or_else(|| non_empty(raw, "id"))?;

    Some(Album {
        id,
        title: cleaned(raw, "title"),
        name: cleaned(raw, "name"),
        year: non_empty(raw, "year"),
        release_date: non_empty(raw, "release_date"),
        primary_artists: artist_list(&cleaned(raw, "primary_artists")),
        url: non_empty(raw, "perma_url"),
        images: image_set(&text(raw, "image").unwrap_or_default()),
        songs: format_songs(raw, lyrics),
    })
}

pub fn format_playlist(raw: &Value, lyrics: Option<&dyn LyricsSource>) -> Option<Playlist> {
    let id = non_empty(raw, "listid")?;
    let songs = format_songs(raw, lyrics);

    Some(Playlist {
        id,
        title: cleaned(raw, "listname"),
        owner: Owner {
            id: non_empty(raw, "uid"),
            username: non_empty(raw, "username"),
            first_name: cleaned(raw, "firstname"),
            last_name: cleaned(raw, "lastname"),
        },
        follower_count: number(raw, "follower_count"),
        song_count: songs.len(),
        last_updated: non_empty(raw, "last_updated"),
        url: non_empty(raw, "perma_url"),
        images: image_set(&text(raw, "image").unwrap_or_default()),
        songs,
    })
}

/// Formats one autocomplete hit.
pub fn format_stub(raw: &Value) -> Option<SongStub> {
    let id = non_empty(raw, "id")?;
    let more_info = raw.get("more_info").unwrap_or(&Value::Null);

    Some(SongStub {
        id,
        title: cleaned(raw, "title"),
        album: cleaned(raw, "album"),
        description: cleaned(raw, "description"),
        image: text(raw, "image").unwrap_or_default(),
        url: text(raw, "url").unwrap_or_default(),
        primary_artists: cleaned(more_info, "primary_artists"),
        singers: cleaned(more_info, "singers"),
        language: text(more_info, "language").unwrap_or_default(),
    })
}
