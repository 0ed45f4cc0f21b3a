use std::io;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::TypedHeader;
use axum_extra::headers::ContentRange;
use thiserror::Error;
use tracing::{debug, error};

/// Every way a single range request can fail.
///
/// The first two kinds are caused by the client and map to 4xx statuses,
/// the other two are server-side and map to 5xx statuses. None of them are
/// retried; each one terminates the request it was raised for.
#[derive(Error, Debug)]
pub enum StreamError {
    /// The `Range` header value is not `bytes=<start>-[<end>]`.
    #[error("invalid range syntax: {value:?}")]
    InvalidRangeSyntax {
        /// Raw header value as received.
        value: String,
    },

    /// The requested start offset lies at or beyond the end of the resource.
    #[error("range starting at byte {start} is not satisfiable for a resource of {total_size} bytes")]
    RangeNotSatisfiable {
        /// Requested first byte.
        start: u64,
        /// Size of the resource in bytes.
        total_size: u64,
    },

    /// The location of the resource could not be obtained.
    #[error("could not locate video {resource_id}: {reason}")]
    ResourceLookup {
        /// Identifier that was looked up.
        resource_id: i64,
        /// What went wrong.
        reason: String,
    },

    /// The resource could not be opened, measured, seeked or fully read.
    #[error("video file could not be read: {context}: {source}")]
    ResourceRead {
        /// What was being attempted.
        context: String,
        #[source]
        source: io::Error,
    },
}

impl StreamError {
    pub(crate) fn invalid_range(value: &str) -> Self {
        StreamError::InvalidRangeSyntax { value: value.to_string() }
    }

    pub(crate) fn lookup(resource_id: i64, reason: impl ToString) -> Self {
        StreamError::ResourceLookup { resource_id, reason: reason.to_string() }
    }

    pub(crate) fn read(context: impl Into<String>, source: io::Error) -> Self {
        StreamError::ResourceRead { context: context.into(), source }
    }

    /// `true` when the request itself was at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StreamError::InvalidRangeSyntax { .. } | StreamError::RangeNotSatisfiable { .. }
        )
    }

    /// HTTP status reported for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            StreamError::InvalidRangeSyntax { .. } => StatusCode::BAD_REQUEST,
            StreamError::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            StreamError::ResourceLookup { .. } => StatusCode::BAD_GATEWAY,
            StreamError::ResourceRead { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StreamError {
    fn into_response(self) -> Response {
        if self.is_client_error() {
            debug!("rejecting range request: {self}");
        } else {
            error!("range request failed: {self}");
        }

        let status = self.status();
        let message = self.to_string();
        match self {
            StreamError::RangeNotSatisfiable { total_size, .. } => {
                let header = TypedHeader(ContentRange::unsatisfied_bytes(total_size));
                (status, header, message).into_response()
            }
            _ => (status, message).into_response(),
        }
    }
}
