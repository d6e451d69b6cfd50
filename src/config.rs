use anyhow::Context;
use serde::Deserialize;
use std::{path::Path, time::Duration};

use crate::cache::EvictionPolicy;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Reads the TOML config at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        if !path.exists() {
            log::info!(
                "config file {} not found, using defaults",
                path.to_string_lossy()
            );
            return Ok(Config::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.to_string_lossy()))?;
        toml::from_str(&contents).with_context(|| "Failed to parse config TOML")
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub port: u16,
    /// where `GET /` redirects to
    pub home_url: String,
    /// lifetime of the outer response cache on `/song/`, `/album/` and `/playlist/`
    pub response_cache_secs: u64,
    pub response_cache_entries: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 5100,
            home_url: "https://cyberboysumanjay.github.io/JioSaavnAPI/".to_string(),
            response_cache_secs: 300,
            response_cache_entries: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UpstreamConfig {
    pub search_url: String,
    pub song_details_url: String,
    pub album_details_url: String,
    pub playlist_details_url: String,
    pub lyrics_url: String,

    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    /// upper bound for one `fetch`, retries and backoff included
    pub request_deadline_ms: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub max_connections_per_host: usize,
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            search_url: "https://www.jiosaavn.com/api.php?__call=autocomplete.get&_format=json&_marker=0&cc=in&includeMetaTags=1&query=".to_string(),
            song_details_url: "https://www.jiosaavn.com/api.php?__call=song.getDetails&cc=in&_marker=0%3F_marker%3D0&_format=json&pids=".to_string(),
            album_details_url: "https://www.jiosaavn.com/api.php?__call=content.getAlbumDetails&_format=json&cc=in&_marker=0%3F_marker%3D0&albumid=".to_string(),
            playlist_details_url: "https://www.jiosaavn.com/api.php?__call=playlist.getDetails&_format=json&cc=in&_marker=0%3F_marker%3D0&listid=".to_string(),
            lyrics_url: "https://www.jiosaavn.com/api.php?__call=lyrics.getLyrics&ctx=web6dot0&api_version=4&_format=json&_marker=0%3F_marker%3D0&lyrics_id=".to_string(),
            connect_timeout_ms: 3_000,
            read_timeout_ms: 5_000,
            request_deadline_ms: 10_000,
            max_retries: 3,
            backoff_base_ms: 100,
            max_connections_per_host: 100,
            user_agent: concat!("saavn-proxy/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl UpstreamConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn request_deadline(&self) -> Duration {
        Duration::from_millis(self.request_deadline_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }
}

/// Entry limits of the memoization caches, one per catalog operation.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub policy: EvictionPolicy,
    /// expiry of memoized entries; unset means entries live until evicted
    pub ttl_secs: Option<u64>,
    pub search: usize,
    pub song: usize,
    pub id_resolution: usize,
    pub album: usize,
    pub playlist: usize,
    pub lyrics: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            policy: EvictionPolicy::Lru,
            ttl_secs: None,
            search: 1000,
            song: 1000,
            id_resolution: 100,
            album: 100,
            playlist: 100,
            lyrics: 1000,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}
