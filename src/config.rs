//! Command line and environment configuration of the server binary.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{ArgGroup, Parser};
use reqwest::Url;
use thiserror::Error;

use crate::server::AuthPolicy;
use crate::{
    ChunkPolicy, HttpResourceLookup, INITIAL_CHUNK, LookupClientError, MediaConfig, RangeResolver, ResourceLookup,
    ResponseAssembler, STEADY_CHUNK, StaticResourceLookup, VideoStreamService, DEFAULT_CONTENT_TYPE,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid content type {0:?}")]
    ContentType(String),

    #[error("could not build lookup client: {0}")]
    LookupClient(#[from] LookupClientError),
}

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Serve byte ranges of videos for progressive playback", long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["lookup_url", "videos"])))]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "VIDEO_STREAM_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// Base URL of the video service answering `GET /video/path?videoId=<id>`.
    #[arg(long, env = "VIDEO_STREAM_LOOKUP_URL")]
    pub lookup_url: Option<Url>,

    /// Give up on the video service after this many milliseconds.
    #[arg(long, default_value_t = 5000)]
    pub lookup_timeout_ms: u64,

    /// Serve a local file for a video id instead of asking the video service.
    #[arg(long = "video", value_name = "ID=PATH", value_parser = parse_video)]
    pub videos: Vec<(i64, PathBuf)>,

    #[arg(long, default_value_t = INITIAL_CHUNK)]
    pub initial_chunk: u64,

    #[arg(long, default_value_t = STEADY_CHUNK)]
    pub steady_chunk: u64,

    /// Always serve a full chunk, even when the client asks for fewer bytes.
    #[arg(long)]
    pub ignore_explicit_end: bool,

    #[arg(long, default_value = DEFAULT_CONTENT_TYPE)]
    pub content_type: String,

    /// Reject requests that carry no `Authorization: Bearer` header.
    #[arg(long)]
    pub require_bearer: bool,

    /// Log filter, in `tracing_subscriber::EnvFilter` syntax.
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log: String,
}

fn parse_video(s: &str) -> Result<(i64, PathBuf), String> {
    let (id, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=PATH, got {s:?}"))?;
    let id = id.parse::<i64>().map_err(|e| format!("invalid video id {id:?}: {e}"))?;
    if path.is_empty() {
        return Err(format!("empty path for video {id}"));
    }
    Ok((id, PathBuf::from(path)))
}

impl Config {
    pub fn chunk_policy(&self) -> ChunkPolicy {
        ChunkPolicy {
            initial_chunk: self.initial_chunk,
            steady_chunk: self.steady_chunk,
            honor_explicit_end: !self.ignore_explicit_end,
        }
    }

    pub fn media_config(&self) -> Result<MediaConfig, ConfigError> {
        MediaConfig::new(&self.content_type).map_err(|_| ConfigError::ContentType(self.content_type.clone()))
    }

    pub fn auth_policy(&self) -> AuthPolicy {
        if self.require_bearer {
            AuthPolicy::RequireBearer
        } else {
            AuthPolicy::Anonymous
        }
    }

    /// The remote lookup when a URL is configured, the static table otherwise.
    pub fn lookup(&self) -> Result<Arc<dyn ResourceLookup>, ConfigError> {
        match &self.lookup_url {
            Some(url) => {
                let timeout = Duration::from_millis(self.lookup_timeout_ms);
                Ok(Arc::new(HttpResourceLookup::new(url.clone(), timeout)?))
            }
            None => Ok(Arc::new(self.videos.iter().cloned().collect::<StaticResourceLookup>())),
        }
    }

    pub fn service(&self) -> Result<VideoStreamService, ConfigError> {
        Ok(VideoStreamService::new(
            self.lookup()?,
            RangeResolver::new(self.chunk_policy()),
            ResponseAssembler::new(self.media_config()?),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use assert_matches::assert_matches;
    use clap::Parser;

    use super::{Config, ConfigError};
    use crate::server::AuthPolicy;
    use crate::{ChunkPolicy, LookupClientError, StreamError};

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Config::try_parse_from(std::iter::once("video-stream").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--lookup-url", "http://video-service"]).unwrap();
        assert_eq!("0.0.0.0:3000", config.bind.to_string());
        assert_eq!(ChunkPolicy::default(), config.chunk_policy());
        assert_eq!("video/mp4", config.media_config().unwrap().content_type());
        assert_eq!(AuthPolicy::Anonymous, config.auth_policy());
        assert_eq!(5000, config.lookup_timeout_ms);
    }

    #[test]
    fn test_overrides() {
        let config = parse(&[
            "--video", "1=/srv/one.mp4",
            "--video", "2=/srv/two.mp4",
            "--initial-chunk", "100",
            "--steady-chunk", "1000",
            "--ignore-explicit-end",
            "--require-bearer",
            "--content-type", "video/webm",
        ])
        .unwrap();

        assert_eq!(vec![(1, PathBuf::from("/srv/one.mp4")), (2, PathBuf::from("/srv/two.mp4"))], config.videos);
        assert_eq!(
            ChunkPolicy { initial_chunk: 100, steady_chunk: 1000, honor_explicit_end: false },
            config.chunk_policy()
        );
        assert_eq!(AuthPolicy::RequireBearer, config.auth_policy());
        assert_eq!("video/webm", config.media_config().unwrap().content_type());
    }

    #[test]
    fn test_source_is_required() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--lookup-url", "http://video-service", "--video", "1=/a.mp4"]).is_err());
    }

    #[test]
    fn test_invalid_video_mapping() {
        assert!(parse(&["--video", "one=/a.mp4"]).is_err());
        assert!(parse(&["--video", "/a.mp4"]).is_err());
        assert!(parse(&["--video", "1="]).is_err());
    }

    #[test]
    fn test_invalid_content_type() {
        let config = parse(&["--video", "1=/a.mp4", "--content-type", "video/mp4\u{7f}"]).unwrap();
        assert_matches!(config.media_config(), Err(ConfigError::ContentType(_)));
    }

    #[test]
    fn test_unusable_lookup_url() {
        let config = parse(&["--lookup-url", "mailto:ops@example.com"]).unwrap();
        assert!(matches!(
            config.lookup(),
            Err(ConfigError::LookupClient(LookupClientError::BaseUrl { .. }))
        ));
    }

    #[tokio::test]
    async fn test_static_service() {
        let config = parse(&["--video", "1=/definitely/not/here.mp4"]).unwrap();
        let service = config.service().unwrap();
        assert_matches!(
            service.prepare_content("bytes=0-", 1, None).await,
            Err(StreamError::ResourceRead { .. })
        );
        assert_matches!(
            service.prepare_content("bytes=0-", 2, None).await,
            Err(StreamError::ResourceLookup { .. })
        );
    }
}
