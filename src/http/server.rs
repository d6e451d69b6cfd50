use log::info;
use rouille::{Request, Response};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};

use crate::{
    cache::{CacheArg, CacheKey, EvictionPolicy, MemoCache},
    config::HttpConfig,
    http::{error::ApiError, params},
    upstream::catalog::{Catalog, SearchResults, Session, is_song_link},
};

pub struct HttpServer {
    catalog: Arc<Catalog>,
    /// whole responses of the search, album and playlist routes
    responses: MemoCache<Value>,
    pub config: HttpConfig,
}

impl HttpServer {
    pub fn new(catalog: Catalog, config: HttpConfig) -> Self {
        let responses = MemoCache::new(
            "response",
            config.response_cache_entries,
            EvictionPolicy::Lru,
            Some(Duration::from_secs(config.response_cache_secs)),
        );
        Self {
            catalog: Arc::new(catalog),
            responses,
            config,
        }
    }

    pub fn run(self) {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        rouille::start_server(addr, move |request| self.handle_request(request));
    }

    fn handle_request(&self, request: &Request) -> Response {
        Self::log_request(request);
        let session = self.catalog.session();

        let result = rouille::router!(request,
            (GET) ["/"] => {
                Ok(Response::redirect_302(self.config.home_url.clone()))
            },

            (GET) ["/song/"] => { self.handle_search(request, &session).map(Self::json) },
            (GET) ["/song"] => { self.handle_search(request, &session).map(Self::json) },
            (GET) ["/song/get/"] => { self.handle_get_song(request, &session).map(Self::json) },
            (GET) ["/song/get"] => { self.handle_get_song(request, &session).map(Self::json) },
            (GET) ["/playlist/"] => { self.handle_playlist(request, &session).map(Self::json) },
            (GET) ["/playlist"] => { self.handle_playlist(request, &session).map(Self::json) },
            (GET) ["/album/"] => { self.handle_album(request, &session).map(Self::json) },
            (GET) ["/album"] => { self.handle_album(request, &session).map(Self::json) },
            (GET) ["/lyrics/"] => { self.handle_lyrics(request, &session).map(Self::json) },
            (GET) ["/lyrics"] => { self.handle_lyrics(request, &session).map(Self::json) },
            (GET) ["/result/"] => { self.handle_result(request, &session).map(Self::json) },
            (GET) ["/result"] => { self.handle_result(request, &session).map(Self::json) },
            _ => Ok(Response::empty_404())
        );

        let response = result
            .unwrap_or_else(ApiError::into_response)
            .with_additional_header("Access-Control-Allow-Origin", "*");

        info!("Response: {} {}", request.method(), response.status_code);
        response
    }

    fn log_request(request: &Request) {
        info!("{} {}", request.method(), request.raw_url());
    }

    fn json(value: Value) -> Response {
        Response::json(&value)
    }

    /// Serves a previously computed response for identical parameters.
    /// Responses built while an upstream failure was swallowed are not kept.
    fn cached(
        &self,
        session: &Session,
        route: &'static str,
        args: impl IntoIterator<Item = CacheArg>,
        compute: impl FnOnce() -> Result<Value, ApiError>,
    ) -> Result<Value, ApiError> {
        let key = CacheKey::new(route, args);
        self.responses.get_or_try_insert_if(key, || {
            compute().map(|value| (value, !session.is_degraded()))
        })
    }

    fn handle_search(&self, request: &Request, session: &Session) -> Result<Value, ApiError> {
        let query = params::required(request, "query")
            .ok_or(ApiError::MissingParam("Query is required to search songs!"))?;
        let lyrics = params::lyrics(request);
        let songdata = params::songdata(request);

        self.cached(
            session,
            "/song/",
            [
                CacheArg::from(query.as_str()),
                CacheArg::from(lyrics),
                CacheArg::from(songdata),
            ],
            || Self::search(session, &query, lyrics, songdata),
        )
    }

    fn search(
        session: &Session,
        query: &str,
        lyrics: bool,
        songdata: bool,
    ) -> Result<Value, ApiError> {
        match session.search_songs(query, lyrics, songdata)? {
            SearchResults::Single(None) => Err(ApiError::NotFound("Invalid Song ID received!")),
            results => Ok(serde_json::to_value(results)?),
        }
    }

    fn handle_get_song(&self, request: &Request, session: &Session) -> Result<Value, ApiError> {
        let id = params::required(request, "id")
            .ok_or(ApiError::MissingParam("Song ID is required to get a song!"))?;

        Self::song(session, &id, params::lyrics(request))
    }

    fn song(session: &Session, id: &str, lyrics: bool) -> Result<Value, ApiError> {
        let song = session
            .get_song(id, lyrics)
            .ok_or(ApiError::NotFound("Invalid Song ID received!"))?;
        Ok(serde_json::to_value(song)?)
    }

    fn handle_playlist(&self, request: &Request, session: &Session) -> Result<Value, ApiError> {
        let query = params::required(request, "query")
            .ok_or(ApiError::MissingParam("Query is required to search playlists!"))?;
        let lyrics = params::lyrics(request);

        self.cached(
            session,
            "/playlist/",
            [CacheArg::from(query.as_str()), CacheArg::from(lyrics)],
            || Self::playlist(session, &query, lyrics),
        )
    }

    fn playlist(session: &Session, url: &str, lyrics: bool) -> Result<Value, ApiError> {
        let id = session.resolve_playlist_id(url)?;
        let playlist = session
            .get_playlist(&id, lyrics)
            .ok_or(ApiError::NotFound("Invalid Playlist link received!"))?;
        Ok(serde_json::to_value(playlist)?)
    }

    fn handle_album(&self, request: &Request, session: &Session) -> Result<Value, ApiError> {
        let query = params::required(request, "query")
            .ok_or(ApiError::MissingParam("Query is required to search albums!"))?;
        let lyrics = params::lyrics(request);

        self.cached(
            session,
            "/album/",
            [CacheArg::from(query.as_str()), CacheArg::from(lyrics)],
            || Self::album(session, &query, lyrics),
        )
    }

    fn album(session: &Session, url: &str, lyrics: bool) -> Result<Value, ApiError> {
        let id = session.resolve_album_id(url)?;
        let album = session
            .get_album(&id, lyrics)
            .ok_or(ApiError::NotFound("Invalid Album link received!"))?;
        Ok(serde_json::to_value(album)?)
    }

    /// `query` is either a song link or a raw song id; failures are reported
    /// with the upstream error message.
    fn handle_lyrics(&self, request: &Request, session: &Session) -> Result<Value, ApiError> {
        let query = params::required(request, "query").ok_or(ApiError::MissingParam(
            "Query containing song link or id is required to fetch lyrics!",
        ))?;

        let id = if is_song_link(&query) {
            session.resolve_song_id(&query)?
        } else {
            query
        };
        let lyrics = session.get_lyrics(&id)?;

        Ok(json!({ "status": true, "lyrics": lyrics }))
    }

    /// Dispatches on the shape of `query`: song and album links go to their
    /// fetchers, any other upstream link is treated as a playlist, and plain
    /// text is a full search.
    fn handle_result(&self, request: &Request, session: &Session) -> Result<Value, ApiError> {
        let query = params::required(request, "query")
            .ok_or(ApiError::MissingParam("Query is required to fetch results!"))?;
        let lyrics = params::lyrics(request);

        if !query.contains("saavn") {
            return Self::search(session, &query, lyrics, true);
        }
        if query.contains("/song/") {
            let id = session.resolve_song_id(&query)?;
            Self::song(session, &id, lyrics)
        } else if query.contains("/album/") {
            Self::album(session, &query, lyrics)
        } else {
            log::debug!("treating {query} as a playlist link");
            Self::playlist(session, &query, lyrics)
        }
    }
}

#[cfg(test)]
pub fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: rouille::Response,
) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(
        response.data.into_reader_and_size().0,
    )?)
}
