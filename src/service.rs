use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    BearerToken, KnownSize, PartialContentResponse, RangeBody, RangeRequest, RangeResolver,
    ResourceLookup, ResponseAssembler, StreamError, read_window,
};

/// Serves one window of a video per call.
///
/// Holds only immutable configuration and the lookup collaborator, so a
/// single instance can be shared by any number of concurrent requests.
#[derive(Clone)]
pub struct VideoStreamService {
    lookup: Arc<dyn ResourceLookup>,
    resolver: RangeResolver,
    assembler: ResponseAssembler,
}

impl VideoStreamService {
    pub fn new(lookup: Arc<dyn ResourceLookup>, resolver: RangeResolver, assembler: ResponseAssembler) -> Self {
        VideoStreamService { lookup, resolver, assembler }
    }

    /// Answers a `Range` header for video `resource_id`.
    ///
    /// The header is validated before the lookup service is contacted, and
    /// the whole window is read before a response exists, so any failure
    /// surfaces as an error rather than a truncated body.
    #[instrument(skip(self, auth))]
    pub async fn prepare_content(
        &self,
        range: &str,
        resource_id: i64,
        auth: Option<&BearerToken>,
    ) -> Result<PartialContentResponse, StreamError> {
        let request = RangeRequest::parse(range)?;
        let location = self.lookup.locate(resource_id, auth).await?;

        let body = KnownSize::open(&location).await?;
        let window = self.resolver.resolve(&request, body.byte_size())?;
        let content = read_window(body, window).await?;

        debug!(
            start = window.start(),
            end = window.end(),
            total_size = window.total_size(),
            "serving partial content"
        );
        Ok(self.assembler.assemble(content))
    }
}

impl std::fmt::Debug for VideoStreamService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoStreamService")
            .field("resolver", &self.resolver)
            .field("assembler", &self.assembler)
            .finish_non_exhaustive()
    }
}
