use serde::Serialize;
use serde_json::Value;
use std::{cell::Cell, time::Instant};

use crate::{
    cache::{CacheArg, CacheKey, MemoCache},
    config::{CacheConfig, UpstreamConfig},
    domain::{
        album::Album,
        playlist::Playlist,
        song::{Song, SongStub},
    },
    upstream::{
        client::HttpClient,
        error::UpstreamError,
        format::{LyricsSource, format_album, format_playlist, format_song, format_stub},
        normalize::{ALBUM_ID, IdPatterns, PLAYLIST_ID, SONG_ID, extract_id, normalize},
    },
};

/// Outcome of a song search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchResults {
    Songs(Vec<Song>),
    Stubs(Vec<SongStub>),
    /// the query was a song link
    Single(Option<Song>),
}

impl SearchResults {
    fn empty(full: bool) -> Self {
        if full {
            SearchResults::Songs(Vec::new())
        } else {
            SearchResults::Stubs(Vec::new())
        }
    }
}

/// True for shareable upstream links, which bypass text search.
pub fn is_content_url(query: &str) -> bool {
    query.starts_with("http") && query.contains("saavn.com")
}

/// True when a lyrics query names a song by link rather than by id.
pub fn is_song_link(query: &str) -> bool {
    query.contains("http") && query.contains("saavn")
}

/// Catalog entities fetched from upstream, with every operation memoized.
///
/// Lookups go through a [`Session`], one per inbound request.
pub struct Catalog {
    client: HttpClient,
    urls: UpstreamConfig,
    searches: MemoCache<SearchResults>,
    songs: MemoCache<Option<Song>>,
    albums: MemoCache<Option<Album>>,
    playlists: MemoCache<Option<Playlist>>,
    lyrics: MemoCache<String>,
    song_ids: MemoCache<String>,
    album_ids: MemoCache<String>,
    playlist_ids: MemoCache<String>,
}

impl Catalog {
    pub fn new(client: HttpClient, upstream: &UpstreamConfig, cache: &CacheConfig) -> Self {
        let (policy, ttl) = (cache.policy, cache.ttl());
        Self {
            client,
            urls: upstream.clone(),
            searches: MemoCache::new("search_songs", cache.search, policy, ttl),
            songs: MemoCache::new("get_song", cache.song, policy, ttl),
            albums: MemoCache::new("get_album", cache.album, policy, ttl),
            playlists: MemoCache::new("get_playlist", cache.playlist, policy, ttl),
            lyrics: MemoCache::new("get_lyrics", cache.lyrics, policy, ttl),
            song_ids: MemoCache::new("resolve_song_id", cache.id_resolution, policy, ttl),
            album_ids: MemoCache::new("resolve_album_id", cache.id_resolution, policy, ttl),
            playlist_ids: MemoCache::new("resolve_playlist_id", cache.id_resolution, policy, ttl),
        }
    }

    pub fn from_config(upstream: &UpstreamConfig, cache: &CacheConfig) -> Self {
        Self::new(HttpClient::new(upstream), upstream, cache)
    }

    /// Starts a request; its deadline starts counting now.
    pub fn session(&self) -> Session<'_> {
        Session {
            catalog: self,
            deadline: self.client.deadline(),
            misses: Cell::new(0),
        }
    }

    fn url(base: &str, arg: &str) -> String {
        format!("{base}{}", urlencoding::encode(arg))
    }
}

/// One request against the catalog.
///
/// Every upstream call made through a session shares its deadline. Upstream
/// failures that are swallowed along the way are counted, and a result built
/// while one happened is returned but not memoized.
pub struct Session<'a> {
    catalog: &'a Catalog,
    deadline: Instant,
    misses: Cell<u32>,
}

impl Session<'_> {
    /// True once any failure has been swallowed during this request.
    pub fn is_degraded(&self) -> bool {
        self.misses.get() > 0
    }

    fn record_miss(&self) {
        self.misses.set(self.misses.get() + 1);
    }

    fn fetch(&self, url: &str) -> Result<String, UpstreamError> {
        self.catalog.client.fetch_until(url, self.deadline)
    }

    fn lyrics_source(&self, include: bool) -> Option<&dyn LyricsSource> {
        include.then_some(self as &dyn LyricsSource)
    }

    /// Memoizes `compute` unless a failure was swallowed while it ran.
    fn memoize<V: Clone>(
        &self,
        cache: &MemoCache<V>,
        key: CacheKey,
        compute: impl FnOnce() -> Result<V, UpstreamError>,
    ) -> Result<V, UpstreamError> {
        let misses = self.misses.get();
        cache.get_or_try_insert_if(key, || {
            compute().map(|value| (value, self.misses.get() == misses))
        })
    }

    /// Turns swallowable upstream failures into `fallback`, logging them.
    fn soften<T>(
        &self,
        what: &str,
        result: Result<T, UpstreamError>,
        fallback: T,
    ) -> Result<T, UpstreamError> {
        match result {
            Err(e) if e.is_swallowable() => {
                log::warn!("{what} failed: {e}");
                self.record_miss();
                Ok(fallback)
            }
            other => other,
        }
    }

    /// Searches songs by text. A song link resolves to that single song.
    ///
    /// With `full` unset only the search hits are returned; otherwise every
    /// hit is fetched in detail. Only ID resolution errors propagate.
    pub fn search_songs(
        &self,
        query: &str,
        lyrics: bool,
        full: bool,
    ) -> Result<SearchResults, UpstreamError> {
        let searches = &self.catalog.searches;
        let key = searches.key([
            CacheArg::from(query),
            CacheArg::from(lyrics),
            CacheArg::from(full),
        ]);
        let result = self.memoize(searches, key, || self.search_uncached(query, lyrics, full));
        self.soften(
            &format!("search for {query:?}"),
            result,
            SearchResults::empty(full),
        )
    }

    fn search_uncached(
        &self,
        query: &str,
        lyrics: bool,
        full: bool,
    ) -> Result<SearchResults, UpstreamError> {
        if is_content_url(query) {
            let id = self.resolve_song_id(query)?;
            return Ok(SearchResults::Single(self.try_get_song(&id, lyrics)?));
        }

        let urls = &self.catalog.urls;
        let body = self.fetch(&Catalog::url(&urls.search_url, query))?;
        let response = normalize(&body)?;
        let hits = response
            .pointer("/songs/data")
            .and_then(Value::as_array)
            .ok_or_else(|| UpstreamError::Parse("search response has no songs.data".into()))?;

        if !full {
            return Ok(SearchResults::Stubs(
                hits.iter().filter_map(format_stub).collect(),
            ));
        }
        let songs = hits
            .iter()
            .filter_map(|hit| hit.get("id").and_then(Value::as_str))
            .filter_map(|id| self.get_song(id, lyrics))
            .collect();
        Ok(SearchResults::Songs(songs))
    }

    /// Fetches one song; upstream failures and unknown ids give `None`.
    pub fn get_song(&self, id: &str, lyrics: bool) -> Option<Song> {
        let result = self.try_get_song(id, lyrics);
        self.soften(&format!("song {id}"), result, None)
            .ok()
            .flatten()
    }

    fn try_get_song(&self, id: &str, lyrics: bool) -> Result<Option<Song>, UpstreamError> {
        let songs = &self.catalog.songs;
        let key = songs.key([CacheArg::from(id), CacheArg::from(lyrics)]);
        self.memoize(songs, key, || {
            let body = self.fetch(&Catalog::url(&self.catalog.urls.song_details_url, id))?;
            let response = normalize(&body)?;
            Ok(response
                .get(id)
                .and_then(|raw| format_song(raw, self.lyrics_source(lyrics))))
        })
    }

    pub fn get_album(&self, id: &str, lyrics: bool) -> Option<Album> {
        let albums = &self.catalog.albums;
        let key = albums.key([CacheArg::from(id), CacheArg::from(lyrics)]);
        let result = self.memoize(albums, key, || {
            let body = self.fetch(&Catalog::url(&self.catalog.urls.album_details_url, id))?;
            Ok(format_album(&normalize(&body)?, self.lyrics_source(lyrics)))
        });
        self.soften(&format!("album {id}"), result, None)
            .ok()
            .flatten()
    }

    pub fn get_playlist(&self, id: &str, lyrics: bool) -> Option<Playlist> {
        let playlists = &self.catalog.playlists;
        let key = playlists.key([CacheArg::from(id), CacheArg::from(lyrics)]);
        let result = self.memoize(playlists, key, || {
            let body = self.fetch(&Catalog::url(&self.catalog.urls.playlist_details_url, id))?;
            Ok(format_playlist(
                &normalize(&body)?,
                self.lyrics_source(lyrics),
            ))
        });
        self.soften(&format!("playlist {id}"), result, None)
            .ok()
            .flatten()
    }

    /// Lyrics of one song. Every failure propagates.
    pub fn get_lyrics(&self, song_id: &str) -> Result<String, UpstreamError> {
        let cache = &self.catalog.lyrics;
        cache.get_or_try_insert(cache.key([CacheArg::from(song_id)]), || {
            let body = self.fetch(&Catalog::url(&self.catalog.urls.lyrics_url, song_id))?;
            let response: Value =
                serde_json::from_str(&body).map_err(|e| UpstreamError::Parse(e.to_string()))?;
            response
                .get("lyrics")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| UpstreamError::NoLyrics(song_id.to_string()))
        })
    }

    fn resolve_id(
        &self,
        cache: &MemoCache<String>,
        patterns: &IdPatterns,
        url: &str,
    ) -> Result<String, UpstreamError> {
        cache.get_or_try_insert(cache.key([CacheArg::from(url)]), || {
            let page = self.fetch(url)?;
            let id = extract_id(patterns, &page)?;
            log::debug!("resolved {} {url} -> {id}", patterns.kind);
            Ok(id)
        })
    }

    pub fn resolve_song_id(&self, url: &str) -> Result<String, UpstreamError> {
        self.resolve_id(&self.catalog.song_ids, &SONG_ID, url)
    }

    pub fn resolve_album_id(&self, url: &str) -> Result<String, UpstreamError> {
        self.resolve_id(&self.catalog.album_ids, &ALBUM_ID, url)
    }

    pub fn resolve_playlist_id(&self, url: &str) -> Result<String, UpstreamError> {
        self.resolve_id(&self.catalog.playlist_ids, &PLAYLIST_ID, url)
    }
}

/// Lyrics attached to songs; transient failures count against the session.
impl LyricsSource for Session<'_> {
    fn lyrics(&self, song_id: &str) -> Result<String, UpstreamError> {
        let result = self.get_lyrics(song_id);
        if result.as_ref().is_err_and(|e| e.is_swallowable()) {
            self.record_miss();
        }
        result
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::upstream::testing::FakeTransport;
    use serde_json::json;
    use std::{sync::Arc, time::Duration};

    pub const SEARCH: &str = "https://up.test/search?q=";
    pub const SONG: &str = "https://up.test/song?pids=";
    pub const ALBUM: &str = "https://up.test/album?albumid=";
    pub const PLAYLIST: &str = "https://up.test/playlist?listid=";
    pub const LYRICS: &str = "https://up.test/lyrics?id=";

    pub fn upstream_config() -> UpstreamConfig {
        UpstreamConfig {
            search_url: SEARCH.to_string(),
            song_details_url: SONG.to_string(),
            album_details_url: ALBUM.to_string(),
            playlist_details_url: PLAYLIST.to_string(),
            lyrics_url: LYRICS.to_string(),
            backoff_base_ms: 1,
            ..Default::default()
        }
    }

    pub fn catalog(fake: &Arc<FakeTransport>) -> Catalog {
        let upstream = upstream_config();
        let client = HttpClient::with_transport(fake.clone(), &upstream);
        Catalog::new(client, &upstream, &CacheConfig::default())
    }

    pub fn song_json(id: &str, has_lyrics: bool) -> Value {
        json!({
            "id": id,
            "song": format!("Song {id}"),
            "album": "Album",
            "albumid": "77",
            "primary_artists": "Artist",
            "has_lyrics": if has_lyrics { "true" } else { "false" },
            "image": "https://c.saavncdn.com/1/x-150x150.jpg",
            "media_preview_url": "https://preview.saavncdn.com/1/x_96_p.mp4",
            "320kbps": "true"
        })
    }

    pub fn serve_song(fake: &FakeTransport, id: &str, has_lyrics: bool) {
        let mut body = serde_json::Map::new();
        body.insert(id.to_string(), song_json(id, has_lyrics));
        fake.reply(&format!("{SONG}{id}"), 200, &Value::Object(body).to_string());
    }

    pub fn serve_search(fake: &FakeTransport, query: &str, ids: &[&str]) {
        let hits: Vec<Value> = ids
            .iter()
            .map(|id| json!({"id": id, "title": format!("Song {id}"), "more_info": {}}))
            .collect();
        let body = json!({"songs": {"data": hits}}).to_string();
        fake.reply(
            &format!("{SEARCH}{}", urlencoding::encode(query)),
            200,
            &body,
        );
    }

    #[test]
    fn test_get_song_memoized() {
        let fake = Arc::new(FakeTransport::default());
        serve_song(&fake, "abc", false);
        serve_song(&fake, "def", false);
        let catalog = catalog(&fake);

        assert_eq!(catalog.session().get_song("abc", false).unwrap().id, "abc");
        assert_eq!(catalog.session().get_song("abc", false).unwrap().id, "abc");
        assert_eq!(fake.calls(&format!("{SONG}abc")), 1);

        catalog.session().get_song("def", false).unwrap();
        assert_eq!(fake.calls(&format!("{SONG}def")), 1);
        assert_eq!(fake.total_calls(), 2);
    }

    #[test]
    fn test_get_song_unknown_id_is_none() {
        let fake = Arc::new(FakeTransport::default());
        fake.reply(&format!("{SONG}nope"), 200, "[]");

        assert_eq!(catalog(&fake).session().get_song("nope", false), None);
    }

    #[test]
    fn test_transport_failure_is_none_and_not_cached() {
        let fake = Arc::new(FakeTransport::default());
        fake.reply(&format!("{SONG}abc"), 404, "");
        serve_song(&fake, "abc", false);
        let catalog = catalog(&fake);

        assert_eq!(catalog.session().get_song("abc", false), None);
        assert_eq!(catalog.session().get_song("abc", false).unwrap().id, "abc");
    }

    #[test]
    fn test_malformed_song_payload_is_none() {
        let fake = Arc::new(FakeTransport::default());
        fake.reply(&format!("{SONG}abc"), 200, "<html>oops</html>");

        assert_eq!(catalog(&fake).session().get_song("abc", false), None);
    }

    #[test]
    fn test_song_with_lyrics() {
        let fake = Arc::new(FakeTransport::default());
        serve_song(&fake, "abc", true);
        fake.reply(&format!("{LYRICS}abc"), 200, r#"{"lyrics":"first line<br>second"}"#);

        let song = catalog(&fake).session().get_song("abc", true).unwrap();

        assert_eq!(song.lyrics.as_deref(), Some("first line<br>second"));
    }

    #[test]
    fn test_song_without_lyrics_request_does_not_fetch_them() {
        let fake = Arc::new(FakeTransport::default());
        serve_song(&fake, "abc", true);

        let song = catalog(&fake).session().get_song("abc", false).unwrap();

        assert_eq!(song.lyrics, None);
        assert_eq!(fake.calls(&format!("{LYRICS}abc")), 0);
    }

    #[test]
    fn test_get_lyrics_errors_propagate() {
        let fake = Arc::new(FakeTransport::default());
        fake.reply(&format!("{LYRICS}abc"), 200, r#"{"status":"failure"}"#);
        fake.reply(&format!("{LYRICS}bad"), 200, "not json");
        let catalog = catalog(&fake);

        assert_eq!(
            catalog.session().get_lyrics("abc"),
            Err(UpstreamError::NoLyrics("abc".into()))
        );
        assert!(matches!(
            catalog.session().get_lyrics("bad"),
            Err(UpstreamError::Parse(_))
        ));
    }

    #[test]
    fn test_search_stubs_skip_detail_fetches() -> anyhow::Result<()> {
        let fake = Arc::new(FakeTransport::default());
        serve_search(&fake, "tum hi ho", &["a", "b"]);

        let result = catalog(&fake).session().search_songs("tum hi ho", false, false)?;

        match result {
            SearchResults::Stubs(stubs) => assert_eq!(stubs.len(), 2),
            other => panic!("expected stubs, got {other:?}"),
        }
        assert_eq!(fake.total_calls(), 1);
        Ok(())
    }

    #[test]
    fn test_search_full_fetches_each_song() -> anyhow::Result<()> {
        let fake = Arc::new(FakeTransport::default());
        serve_search(&fake, "kesariya", &["a", "b", "gone"]);
        serve_song(&fake, "a", false);
        serve_song(&fake, "b", false);
        fake.reply(&format!("{SONG}gone"), 200, "{}");

        let result = catalog(&fake).session().search_songs("kesariya", false, true)?;

        let SearchResults::Songs(songs) = result else {
            panic!("expected full songs");
        };
        let ids: Vec<_> = songs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        Ok(())
    }

    #[test]
    fn test_search_memoized_by_arguments() -> anyhow::Result<()> {
        let fake = Arc::new(FakeTransport::default());
        serve_search(&fake, "q", &["a"]);
        serve_search(&fake, "other", &["a"]);
        let catalog = catalog(&fake);

        catalog.session().search_songs("q", false, false)?;
        catalog.session().search_songs("q", false, false)?;
        assert_eq!(fake.total_calls(), 1);

        catalog.session().search_songs("other", false, false)?;
        assert_eq!(fake.total_calls(), 2);
        Ok(())
    }

    #[test]
    fn test_search_failure_is_empty() -> anyhow::Result<()> {
        let fake = Arc::new(FakeTransport::default());
        fake.reply(&format!("{SEARCH}q"), 500, "");

        let result = catalog(&fake).session().search_songs("q", false, true)?;

        assert_eq!(result, SearchResults::Songs(Vec::new()));
        Ok(())
    }

    #[test]
    fn test_search_with_song_link_resolves_single_song() -> anyhow::Result<()> {
        let fake = Arc::new(FakeTransport::default());
        let link = "https://www.jiosaavn.com/song/kesariya/OwE";
        fake.reply(link, 200, r#"<script>{"pid":"abc","x":1}</script>"#);
        serve_song(&fake, "abc", false);

        let result = catalog(&fake).session().search_songs(link, false, true)?;

        let SearchResults::Single(Some(song)) = result else {
            panic!("expected a single song");
        };
        assert_eq!(song.id, "abc");
        assert_eq!(fake.calls(&format!("{SEARCH}{}", urlencoding::encode(link))), 0);
        Ok(())
    }

    #[test]
    fn test_search_with_unresolvable_link_errors() {
        let fake = Arc::new(FakeTransport::default());
        let link = "https://www.jiosaavn.com/song/unknown/x";
        fake.reply(link, 200, "<html></html>");

        let err = catalog(&fake).session().search_songs(link, false, false).unwrap_err();

        assert_eq!(err, UpstreamError::IdResolution { kind: "song" });
    }

    #[test]
    fn test_resolve_ids_memoized() -> anyhow::Result<()> {
        let fake = Arc::new(FakeTransport::default());
        let link = "https://www.jiosaavn.com/album/brahmastra/x";
        fake.reply(link, 200, r#"{"album_id":"37178283","x":1}"#);
        let catalog = catalog(&fake);

        assert_eq!(catalog.session().resolve_album_id(link)?, "37178283");
        assert_eq!(catalog.session().resolve_album_id(link)?, "37178283");
        assert_eq!(fake.calls(link), 1);
        Ok(())
    }

    #[test]
    fn test_resolution_transport_error_propagates() {
        let fake = Arc::new(FakeTransport::default());
        let link = "https://www.jiosaavn.com/featured/x/y";
        fake.fail(link, "connection refused");

        let err = catalog(&fake).session().resolve_playlist_id(link).unwrap_err();

        assert!(matches!(err, UpstreamError::Transport { .. }));
    }

    #[test]
    fn test_get_album_and_playlist() {
        let fake = Arc::new(FakeTransport::default());
        let album = json!({"albumid": "77", "title": "Album", "songs": [song_json("a", false)]});
        let playlist = json!({"listid": "9", "listname": "Mix", "songs": [song_json("a", false), {}]});
        fake.reply(&format!("{ALBUM}77"), 200, &album.to_string());
        fake.reply(&format!("{PLAYLIST}9"), 200, &playlist.to_string());
        let catalog = catalog(&fake);

        let album = catalog.session().get_album("77", false).unwrap();
        assert_eq!(album.songs.len(), 1);

        let playlist = catalog.session().get_playlist("9", false).unwrap();
        assert_eq!(playlist.title, "Mix");
        assert_eq!(playlist.song_count, 1);

        assert_eq!(catalog.session().get_album("missing", false), None);
    }

    #[test]
    fn test_album_lyrics_failure_degrades() {
        let fake = Arc::new(FakeTransport::default());
        let album = json!({"albumid": "77", "songs": [song_json("a", true)]});
        fake.reply(&format!("{ALBUM}77"), 200, &album.to_string());
        fake.fail(&format!("{LYRICS}a"), "connection reset");

        let album = catalog(&fake).session().get_album("77", true).unwrap();

        assert_eq!(album.songs[0].id, "a");
        assert_eq!(album.songs[0].lyrics, None);
    }

    #[test]
    fn test_lyrics_failure_keeps_song_out_of_cache() {
        let fake = Arc::new(FakeTransport::default());
        serve_song(&fake, "abc", true);
        for _ in 0..4 {
            fake.fail(&format!("{LYRICS}abc"), "connection reset");
        }
        fake.reply(&format!("{LYRICS}abc"), 200, r#"{"lyrics":"hello"}"#);
        let catalog = catalog(&fake);

        let first = catalog.session().get_song("abc", true).unwrap();
        let second = catalog.session().get_song("abc", true).unwrap();

        assert_eq!(first.lyrics, None);
        assert_eq!(second.lyrics.as_deref(), Some("hello"));
        assert_eq!(fake.calls(&format!("{SONG}abc")), 2);

        catalog.session().get_song("abc", true).unwrap();
        assert_eq!(fake.calls(&format!("{SONG}abc")), 2);
    }

    #[test]
    fn test_missing_lyrics_do_not_block_caching() {
        let fake = Arc::new(FakeTransport::default());
        serve_song(&fake, "abc", true);
        fake.reply(&format!("{LYRICS}abc"), 200, r#"{"status":"failure"}"#);
        let catalog = catalog(&fake);

        let session = catalog.session();
        assert_eq!(session.get_song("abc", true).unwrap().lyrics, None);
        assert!(!session.is_degraded());

        catalog.session().get_song("abc", true).unwrap();
        assert_eq!(fake.calls(&format!("{SONG}abc")), 1);
    }

    #[test]
    fn test_search_with_failed_hit_is_not_memoized() -> anyhow::Result<()> {
        let fake = Arc::new(FakeTransport::default());
        serve_search(&fake, "q", &["a", "b"]);
        serve_song(&fake, "a", false);
        for _ in 0..4 {
            fake.reply(&format!("{SONG}b"), 503, "busy");
        }
        serve_song(&fake, "b", false);
        let catalog = catalog(&fake);

        let session = catalog.session();
        let first = session.search_songs("q", false, true)?;
        assert!(session.is_degraded());
        let second = catalog.session().search_songs("q", false, true)?;

        let (SearchResults::Songs(first), SearchResults::Songs(second)) = (first, second) else {
            panic!("expected full songs");
        };
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
        assert_eq!(fake.calls(&format!("{SEARCH}q")), 2);
        assert_eq!(fake.calls(&format!("{SONG}a")), 1);
        Ok(())
    }

    #[test]
    fn test_album_lyrics_stop_at_request_deadline() {
        let fake = Arc::new(FakeTransport::default());
        let ids: Vec<String> = (0..10).map(|i| format!("s{i}")).collect();
        let songs: Vec<Value> = ids.iter().map(|id| song_json(id, true)).collect();
        let album = json!({"albumid": "77", "songs": songs});
        fake.reply(&format!("{ALBUM}77"), 200, &album.to_string());
        for id in &ids {
            fake.reply(&format!("{LYRICS}{id}"), 200, r#"{"lyrics":"la"}"#);
        }
        fake.set_latency(Duration::from_millis(40));
        let upstream = UpstreamConfig {
            request_deadline_ms: 100,
            ..upstream_config()
        };
        let client = HttpClient::with_transport(fake.clone(), &upstream);
        let catalog = Catalog::new(client, &upstream, &CacheConfig::default());

        let started = Instant::now();
        let session = catalog.session();
        let album = session.get_album("77", true).unwrap();
        let elapsed = started.elapsed();

        assert_eq!(album.songs.len(), 10);
        assert!(elapsed < Duration::from_millis(300), "took {elapsed:?}");
        assert!(album.songs.iter().any(|song| song.lyrics.is_none()));
        assert!(fake.total_calls() < 10);
        assert!(session.is_degraded());
    }

    #[test]
    fn test_song_links_for_lyrics() {
        assert!(is_song_link("https://www.jiosaavn.com/song/x/y"));
        assert!(is_song_link("see http://saavn.com/s/1"));
        assert!(!is_song_link("OwE9q3"));
        assert!(!is_song_link("https://example.com/song"));
    }

    #[test]
    fn test_is_content_url() {
        assert!(is_content_url("https://www.jiosaavn.com/song/x/y"));
        assert!(!is_content_url("www.jiosaavn.com/song/x/y"));
        assert!(!is_content_url("https://example.com/song"));
        assert!(!is_content_url("saavn.com songs"));
    }
}
