use std::time::Duration;

/// Construction options for [`crate::HttpTransport`].
#[derive(Debug, Clone, Default)]
pub struct HttpOptions {
    /// Endpoints to call, used round-robin. At least one is required.
    pub urls: Vec<String>,
    /// Name of the calling service, sent as `RPC-Caller` when set.
    pub source_service: Option<String>,
    /// Name of the called service, sent as `RPC-Service`. Required.
    pub target_service: String,
    /// TCP connect timeout. `None` uses 3 seconds.
    pub connect_timeout: Option<Duration>,
}

impl HttpOptions {
    #[must_use]
    pub fn new(url: impl Into<String>, target_service: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            target_service: target_service.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_source_service(mut self, source: impl Into<String>) -> Self {
        self.source_service = Some(source.into());
        self
    }
}
