use crate::{RangeRequest, StreamError};

/// Bytes served past `start` when playback begins at offset zero.
pub const INITIAL_CHUNK: u64 = 17_000;

/// Bytes served past `start` for every later request.
pub const STEADY_CHUNK: u64 = 280_000;

/// How much of the resource a single request is allowed to receive.
///
/// The first chunk is kept small so playback can start immediately, later
/// chunks are large so that a player seeking forward needs few round trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPolicy {
    pub initial_chunk: u64,
    pub steady_chunk: u64,
    /// Serve a client supplied end position when it asks for less than the
    /// chunk would give. When unset the chunk size always wins.
    pub honor_explicit_end: bool,
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        ChunkPolicy {
            initial_chunk: INITIAL_CHUNK,
            steady_chunk: STEADY_CHUNK,
            honor_explicit_end: true,
        }
    }
}

/// Inclusive byte window within a resource of known size.
///
/// Only [`RangeResolver::resolve`] builds these, so `start <= end < total_size`
/// always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWindow {
    start: u64,
    end: u64,
    total_size: u64,
}

impl ResolvedWindow {
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last byte of the window, inclusive.
    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Number of bytes in the window, never zero.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always `false`: a resolved window holds at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Turns a [`RangeRequest`] into the window that will actually be served.
#[derive(Debug, Clone, Default)]
pub struct RangeResolver {
    policy: ChunkPolicy,
}

impl RangeResolver {
    pub fn new(policy: ChunkPolicy) -> Self {
        RangeResolver { policy }
    }

    pub fn policy(&self) -> &ChunkPolicy {
        &self.policy
    }

    /// Computes the window for `request` against a resource of `total_size`
    /// bytes, clamping to the last byte of the resource.
    pub fn resolve(&self, request: &RangeRequest, total_size: u64) -> Result<ResolvedWindow, StreamError> {
        let start = request.start;
        if start >= total_size {
            return Err(StreamError::RangeNotSatisfiable { start, total_size });
        }

        let chunk = if start == 0 {
            self.policy.initial_chunk
        } else {
            self.policy.steady_chunk
        };
        let mut end = start.saturating_add(chunk);

        if self.policy.honor_explicit_end {
            // an end below start is ignored rather than rejected
            if let Some(explicit) = request.end.filter(|&e| e >= start && e < end) {
                end = explicit;
            }
        }

        if end >= total_size {
            end = total_size - 1;
        }

        Ok(ResolvedWindow { start, end, total_size })
    }
}
