//! # axum-video-stream
//!
//! Progressive video playback over HTTP range requests for [`axum`][1].
//!
//! Every request names a video and carries a `Range: bytes=<start>-[<end>]`
//! header. The server answers with `206 Partial Content` holding a bounded
//! window of the file: a small first chunk so playback starts immediately,
//! larger chunks afterwards, clamped to the end of the file. Clients keep
//! asking for advancing offsets to continue playing.
//!
//! A request passes through four stages, each usable on its own:
//!
//! 1. [`RangeRequest::parse`] checks the header syntax.
//! 2. [`RangeResolver::resolve`] picks the window using a [`ChunkPolicy`].
//! 3. [`read_window`] reads exactly that window from any [`RangeBody`].
//! 4. [`ResponseAssembler::assemble`] builds the headers and body.
//!
//! [`VideoStreamService`] chains them behind a [`ResourceLookup`], and
//! [`server::router`] exposes the service as `GET /video-stream?videoId=<id>`.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use axum_video_stream::{RangeResolver, ResponseAssembler, StaticResourceLookup, VideoStreamService};
//! use axum_video_stream::server::{self, AuthPolicy};
//!
//! #[tokio::main]
//! async fn main() {
//!     let lookup: StaticResourceLookup = [(1, "videos/intro.mp4")].into_iter().collect();
//!     let service = VideoStreamService::new(Arc::new(lookup), RangeResolver::default(), ResponseAssembler::default());
//!     let app = server::router(Arc::new(service), AuthPolicy::Anonymous);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```
//!
//! [1]: https://docs.rs/axum

mod content;
mod error;
mod file;
mod lookup;
mod range;
mod response;
mod service;
mod window;

pub mod config;
pub mod server;

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncSeek};

pub use content::{PartialContent, read_window};
pub use error::StreamError;
pub use file::KnownSize;
pub use lookup::{
    BearerToken, HttpResourceLookup, LookupClientError, ResourceLocation, ResourceLookup, StaticResourceLookup, VideoPath,
};
pub use range::{BYTES_PREFIX, RangeRequest};
pub use response::{DEFAULT_CONTENT_TYPE, MediaConfig, PartialContentResponse, ResponseAssembler};
pub use service::VideoStreamService;
pub use window::{ChunkPolicy, INITIAL_CHUNK, RangeResolver, ResolvedWindow, STEADY_CHUNK};

/// [`AsyncSeek`] narrowed to only allow seeking from start.
pub trait AsyncSeekStart {
    /// Same semantics as [`AsyncSeek::start_seek`], always passing position as the `SeekFrom::Start` variant.
    fn start_seek(self: Pin<&mut Self>, position: u64) -> io::Result<()>;

    /// Same semantics as [`AsyncSeek::poll_complete`], returning `()` instead of the new stream position.
    fn poll_complete(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>>;
}

impl<T: AsyncSeek> AsyncSeekStart for T {
    fn start_seek(self: Pin<&mut Self>, position: u64) -> io::Result<()> {
        AsyncSeek::start_seek(self, io::SeekFrom::Start(position))
    }

    fn poll_complete(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        AsyncSeek::poll_complete(self, cx).map_ok(|_| ())
    }
}

/// An [`AsyncRead`] and [`AsyncSeekStart`] with a fixed known byte size.
pub trait RangeBody: AsyncRead + AsyncSeekStart {
    /// The total size of the underlying file.
    ///
    /// This should not change for the lifetime of the object once queried.
    /// Behaviour is not guaranteed if it does change.
    fn byte_size(&self) -> u64;
}
