mod config;
mod error;
mod lyrics;
mod musixmatch;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{Level, warn};

use crate::lyrics::genius::GeniusClient;
use crate::lyrics::lrclib::LrclibQuery;
use crate::lyrics::ovh::OvhClient;
use crate::lyrics::{LrclibClient, LyricsResult, pages, query};
use crate::musixmatch::{LyricsResolver, MusixmatchClient, SessionManager, TokenStore};

const DEFAULT_QUERY: &str = "Imagine Dragons - Believer";

#[derive(Debug, Parser)]
#[command(name = "mxlyrics", version, about = "Fetch song lyrics from Musixmatch")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Log debug output to stderr.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Find lyrics for "artist - title" or any free text (default).
    Get {
        query: Vec<String>,
        /// Print timestamped LRC lines when synced lyrics exist.
        #[arg(long)]
        synced: bool,
        /// Try LRCLIB and lyrics.ovh when Musixmatch has nothing.
        #[arg(long)]
        fallback: bool,
        /// Print only this page (1-based).
        #[arg(long)]
        page: Option<usize>,
    },
    /// Print the current Musixmatch session token.
    Token {
        /// Ignore the cached token and fetch a new one.
        #[arg(long)]
        refresh: bool,
    },
    /// Show how a query is split into artist and title.
    Parse { query: Vec<String> },
    /// Look up lyrics on LRCLIB by exact track and artist name.
    Lrclib {
        #[arg(long)]
        title: String,
        #[arg(long)]
        artist: String,
        #[arg(long)]
        album: Option<String>,
        /// Track duration in seconds.
        #[arg(long)]
        duration: Option<u32>,
        /// Only consult LRCLIB's own database.
        #[arg(long)]
        cached: bool,
    },
    /// Look up plain lyrics on lyrics.ovh.
    Ovh {
        #[arg(long)]
        artist: String,
        #[arg(long)]
        title: String,
    },
    /// Find the Genius lyrics page for a song.
    Genius { query: Vec<String> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let cfg = config::load(cli.config.as_deref()).context("load config")?;
    let timeout = cfg.musixmatch.timeout();

    let command = cli.command.unwrap_or(Command::Get {
        query: Vec::new(),
        synced: false,
        fallback: false,
        page: None,
    });

    match command {
        Command::Get {
            query,
            synced,
            fallback,
            page,
        } => {
            let query = join_query(&query);
            let resolver = make_resolver(&cfg)?;

            // Not found and upstream failures look the same to the user
            let mut result = match resolver.resolve(&query).await {
                Ok(r) => r,
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            };
            if result.is_none() && fallback {
                result = try_fallbacks(&cfg, &query).await;
            }

            match result {
                Some(result) => print_result(&result, synced, page, cfg.display.page_chars)?,
                None => println!("No lyrics found for: {}", query),
            }
        }
        Command::Token { refresh } => {
            let resolver = make_resolver(&cfg)?;
            if refresh {
                resolver.session().invalidate();
            }
            println!("{}", resolver.session().token().await?);
        }
        Command::Parse { query } => {
            let parsed = query::parse(&query.join(" "));
            println!("artist: {}", parsed.artist.as_deref().unwrap_or("-"));
            println!("title:  {}", parsed.title);
        }
        Command::Lrclib {
            title,
            artist,
            album,
            duration,
            cached,
        } => {
            let client = LrclibClient::new(&cfg.lrclib.base_url, timeout)?;
            let q = LrclibQuery {
                track_name: &title,
                artist_name: &artist,
                album_name: album.as_deref(),
                duration_secs: duration,
            };
            let hit = if cached {
                client.get_cached_lyrics(&q).await?
            } else {
                client.get_lyrics(&q).await?
            };
            match hit.and_then(|h| h.into_result()) {
                Some(result) => print_result(&result, false, None, cfg.display.page_chars)?,
                None => println!("No lyrics found for: {} - {}", artist, title),
            }
        }
        Command::Ovh { artist, title } => {
            let client = OvhClient::new(timeout)?;
            match client.get_lyrics(&artist, &title).await? {
                Some(result) => print_result(&result, false, None, cfg.display.page_chars)?,
                None => println!("No lyrics found for: {} - {}", artist, title),
            }
        }
        Command::Genius { query } => {
            let token = cfg.genius.access_token.as_deref().unwrap_or_default();
            let client = GeniusClient::new(token, timeout)?;
            let query = join_query(&query);
            let hits = client.search(&query).await?;
            match hits.first() {
                Some(song) => {
                    let url = client.lyrics_url(song.id).await?;
                    println!("{}\n{}", song.full_title, url);
                }
                None => println!("No Genius results for: {}", query),
            }
        }
    }

    Ok(())
}

fn join_query(words: &[String]) -> String {
    let q = words.join(" ");
    if q.trim().is_empty() {
        DEFAULT_QUERY.to_string()
    } else {
        q
    }
}

fn make_resolver(cfg: &config::Config) -> anyhow::Result<LyricsResolver> {
    let client = Arc::new(MusixmatchClient::new(
        &cfg.musixmatch.base_url,
        cfg.musixmatch.timeout(),
    )?);
    let session = SessionManager::builder(client.clone())
        .store(
            TokenStore::new(&cfg.paths.data_dir),
            cfg.musixmatch.token_name.clone(),
        )
        .ttl(cfg.musixmatch.token_ttl())
        .build();
    Ok(LyricsResolver::new(client, session))
}

/// LRCLIB first (synced lyrics), then lyrics.ovh. Errors only get logged.
async fn try_fallbacks(cfg: &config::Config, raw: &str) -> Option<LyricsResult> {
    let parsed = query::parse(raw);
    if parsed.is_empty() {
        return None;
    }
    let artist = parsed.artist.as_deref().unwrap_or_default();
    let timeout = cfg.musixmatch.timeout();

    match LrclibClient::new(&cfg.lrclib.base_url, timeout) {
        Ok(client) => match client.find(&parsed.title, artist).await {
            Ok(Some(result)) => return Some(result),
            Ok(None) => {}
            Err(e) => warn!("lrclib lookup failed: {:#}", e),
        },
        Err(e) => warn!("{:#}", e),
    }

    if artist.is_empty() {
        return None;
    }
    match OvhClient::new(timeout) {
        Ok(client) => client.get_lyrics(artist, &parsed.title).await.unwrap_or_else(|e| {
            warn!("lyrics.ovh lookup failed: {:#}", e);
            None
        }),
        Err(e) => {
            warn!("{:#}", e);
            None
        }
    }
}

fn print_result(
    result: &LyricsResult,
    synced: bool,
    page: Option<usize>,
    page_chars: usize,
) -> anyhow::Result<()> {
    if synced && !result.is_synced() {
        warn!("no synced lyrics for this track, printing plain text");
    }
    let text = if synced {
        result.to_lrc().unwrap_or_else(|| result.text())
    } else {
        result.text()
    };

    let chunks = pages::paginate(&text, page_chars.max(1));
    if chunks.is_empty() {
        println!("No lyrics content available");
        return Ok(());
    }

    let header = if result.track.artist.is_empty() {
        result.track.title.clone()
    } else {
        format!("{} by {}", result.track.title, result.track.artist)
    };

    let total = chunks.len();
    let selected: Vec<(usize, &String)> = match page {
        Some(n) if (1..=total).contains(&n) => vec![(n - 1, &chunks[n - 1])],
        Some(n) => anyhow::bail!("page {} out of range (1-{})", n, total),
        None => chunks.iter().enumerate().collect(),
    };

    for (i, body) in selected {
        println!("{}", header);
        if i == 0
            && let Some(art) = &result.track.artwork_url
        {
            println!("{}", art);
        }
        println!("----------------------------------------");
        println!("{}", body);
        println!("----------------------------------------");
        println!("{} • Page {}/{}\n", result.source, i + 1, total);
    }
    Ok(())
}
