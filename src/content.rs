use std::io;
use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures::future::poll_fn;
use tokio::io::AsyncReadExt;
use tracing::trace;

use crate::{AsyncSeekStart, RangeBody, ResolvedWindow, StreamError};

/// Bytes of one [`ResolvedWindow`], read in full before any response is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialContent {
    bytes: Bytes,
    window: ResolvedWindow,
}

impl PartialContent {
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn window(&self) -> &ResolvedWindow {
        &self.window
    }

    pub fn into_parts(self) -> (Bytes, ResolvedWindow) {
        (self.bytes, self.window)
    }
}

/// Seeks `body` to the start of `window` and reads exactly `window.len()` bytes.
///
/// `body` is consumed, so the underlying handle is released as soon as this
/// returns, whether or not the read succeeded. A resource that ends before the
/// window does is reported as [`StreamError::ResourceRead`].
pub async fn read_window<B: RangeBody + Unpin>(mut body: B, window: ResolvedWindow) -> Result<PartialContent, StreamError> {
    let start = window.start();
    let length = usize::try_from(window.len()).map_err(|_| {
        StreamError::read(
            format!("window of {} bytes does not fit in memory", window.len()),
            io::Error::from(io::ErrorKind::OutOfMemory),
        )
    })?;

    Pin::new(&mut body)
        .start_seek(start)
        .map_err(|e| StreamError::read(format!("cannot seek to byte {start}"), e))?;
    poll_fn(|cx| Pin::new(&mut body).poll_complete(cx))
        .await
        .map_err(|e| StreamError::read(format!("cannot seek to byte {start}"), e))?;

    let mut buffer = BytesMut::zeroed(length);
    body.read_exact(&mut buffer).await.map_err(|e| {
        let context = if e.kind() == io::ErrorKind::UnexpectedEof {
            format!("resource ended before byte {} (truncated?)", window.end())
        } else {
            format!("cannot read {length} bytes at byte {start}")
        };
        StreamError::read(context, e)
    })?;

    trace!(start, end = window.end(), "read window");
    Ok(PartialContent { bytes: buffer.freeze(), window })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use assert_matches::assert_matches;

    use super::read_window;
    use crate::{KnownSize, RangeRequest, RangeResolver, ResolvedWindow, StreamError};

    const CONTENT: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

    fn window(start: u64, end: Option<u64>, total_size: u64) -> ResolvedWindow {
        RangeResolver::default()
            .resolve(&RangeRequest { start, end }, total_size)
            .unwrap()
    }

    fn body() -> KnownSize<Cursor<&'static [u8]>> {
        KnownSize::sized(Cursor::new(CONTENT), CONTENT.len() as u64)
    }

    #[tokio::test]
    async fn test_read_whole_small_resource() {
        let content = read_window(body(), window(0, None, 62)).await.unwrap();
        assert_eq!(CONTENT, &content.bytes()[..]);
        assert_eq!(62, content.window().len());
    }

    #[tokio::test]
    async fn test_read_middle_window() {
        let content = read_window(body(), window(10, Some(19), 62)).await.unwrap();
        assert_eq!(b"ABCDEFGHIJ", &content.bytes()[..]);

        let (bytes, window) = content.into_parts();
        assert_eq!(window.len(), bytes.len() as u64);
    }

    #[tokio::test]
    async fn test_read_tail() {
        let content = read_window(body(), window(50, None, 62)).await.unwrap();
        assert_eq!(b"opqrstuvwxyz", &content.bytes()[..]);
    }

    #[tokio::test]
    async fn test_short_read() {
        // claims to be longer than it is
        let body = KnownSize::sized(Cursor::new(CONTENT), 100);
        assert_matches!(
            read_window(body, window(50, None, 100)).await,
            Err(StreamError::ResourceRead { ref source, .. }) if source.kind() == std::io::ErrorKind::UnexpectedEof
        );
    }
}
