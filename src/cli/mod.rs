use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::config;
use crate::http::server::HttpServer;
use crate::upstream::catalog::{Catalog, Session, is_song_link};

#[derive(Parser)]
#[command(name = "saavn-proxy")]
#[command(version = "0.1")]
#[command(about = "Caching JSON proxy for the JioSaavn catalog")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve,
    /// Search songs by text or song link
    Search {
        query: String,
        /// Attach lyrics to every song
        #[arg(short, long)]
        lyrics: bool,
        /// Only print search hits, without per-song details
        #[arg(long)]
        stubs: bool,
    },
    /// Fetch one song by id
    Song {
        id: String,
        #[arg(short, long)]
        lyrics: bool,
    },
    /// Fetch an album by its link
    Album {
        link: String,
        #[arg(short, long)]
        lyrics: bool,
    },
    /// Fetch a playlist by its link
    Playlist {
        link: String,
        #[arg(short, long)]
        lyrics: bool,
    },
    /// Fetch lyrics by song id or song link
    Lyrics { query: String },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = config::Config::load(&cli.config)?;
    let catalog = Catalog::from_config(&cfg.upstream, &cfg.cache);

    match cli.command {
        Commands::Serve => {
            let http_server = HttpServer::new(catalog, cfg.http);

            println!(
                "HTTP server running at http://{}:{}",
                http_server.config.bind_addr, http_server.config.port
            );
            http_server.run();
            Ok(())
        }
        command => lookup(&catalog.session(), command),
    }
}

/// Runs a one-shot command and prints its result.
fn lookup(session: &Session, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve => anyhow::bail!("serve is not a one-shot command"),

        Commands::Search {
            query,
            lyrics,
            stubs,
        } => {
            let results = session.search_songs(&query, lyrics, !stubs)?;
            print_json(&results)?;
        }

        Commands::Song { id, lyrics } => {
            let song = session
                .get_song(&id, lyrics)
                .with_context(|| format!("song {id} not found"))?;
            print_json(&song)?;
        }

        Commands::Album { link, lyrics } => {
            let id = session.resolve_album_id(&link)?;
            let album = session
                .get_album(&id, lyrics)
                .with_context(|| format!("album {id} not found"))?;
            print_json(&album)?;
        }

        Commands::Playlist { link, lyrics } => {
            let id = session.resolve_playlist_id(&link)?;
            let playlist = session
                .get_playlist(&id, lyrics)
                .with_context(|| format!("playlist {id} not found"))?;
            print_json(&playlist)?;
        }

        Commands::Lyrics { query } => {
            let id = if is_song_link(&query) {
                session.resolve_song_id(&query)?
            } else {
                query
            };
            println!("{}", session.get_lyrics(&id)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_command() {
        let cli = Cli::parse_from(["saavn-proxy", "search", "kesariya", "--stubs"]);

        assert_eq!(cli.config, PathBuf::from("config.toml"));
        match cli.command {
            Commands::Search {
                query,
                lyrics,
                stubs,
            } => {
                assert_eq!(query, "kesariya");
                assert!(!lyrics);
                assert!(stubs);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_parse_serve_with_config() {
        let cli = Cli::parse_from(["saavn-proxy", "-c", "/etc/proxy.toml", "serve"]);

        assert_eq!(cli.config, PathBuf::from("/etc/proxy.toml"));
        assert!(matches!(cli.command, Commands::Serve));
    }
}
