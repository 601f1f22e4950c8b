use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    NoUrls,
    MissingTarget,
    InvalidUrl,
    UnsupportedScheme,
    InvalidServiceName,
    MissingMethod,
    RequestBuild,
    HeaderName,
    HeaderValue,
    Request,
    ConnectionClosed,
    Status,
    BodyRead,
    TruncatedBody,
    DeadlineExceeded,
}

impl ErrorKind {
    /// Errors raised while validating [`crate::HttpOptions`]; these never reach the wire.
    #[must_use]
    pub fn is_configuration(self) -> bool {
        matches!(
            self,
            Self::NoUrls
                | Self::MissingTarget
                | Self::InvalidUrl
                | Self::UnsupportedScheme
                | Self::InvalidServiceName
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no URLs specified for HTTP transport")]
    NoUrls,

    #[error("missing target service name")]
    MissingTarget,

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("only http:// and https:// URLs are supported: {0}")]
    UnsupportedScheme(String),

    #[error("invalid service name '{0}'")]
    InvalidServiceName(String),

    #[error("request has no method")]
    MissingMethod,

    #[error("http request build failed: {0}")]
    RequestBuild(#[from] http::Error),

    #[error("invalid http header name: {0}")]
    HeaderName(#[from] http::header::InvalidHeaderName),

    #[error("invalid http header value: {0}")]
    HeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("http request failed: {}", error_chain(.0))]
    Request(#[source] hyper_util::client::legacy::Error),

    #[error("connection closed before a response was received: EOF ({})", error_chain(.0))]
    ConnectionClosed(#[source] hyper_util::client::legacy::Error),

    #[error("non-success response code: {code}")]
    Status { code: u16 },

    #[error("failed to read response body: {}", error_chain(.0))]
    BodyRead(#[source] hyper::Error),

    #[error("response body truncated: unexpected EOF ({})", error_chain(.0))]
    TruncatedBody(#[source] hyper::Error),

    #[error("deadline exceeded (budget {budget:?})")]
    DeadlineExceeded { budget: Duration },
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoUrls => ErrorKind::NoUrls,
            Self::MissingTarget => ErrorKind::MissingTarget,
            Self::InvalidUrl(_) => ErrorKind::InvalidUrl,
            Self::UnsupportedScheme(_) => ErrorKind::UnsupportedScheme,
            Self::InvalidServiceName(_) => ErrorKind::InvalidServiceName,
            Self::MissingMethod => ErrorKind::MissingMethod,
            Self::RequestBuild(_) => ErrorKind::RequestBuild,
            Self::HeaderName(_) => ErrorKind::HeaderName,
            Self::HeaderValue(_) => ErrorKind::HeaderValue,
            Self::Request(_) => ErrorKind::Request,
            Self::ConnectionClosed(_) => ErrorKind::ConnectionClosed,
            Self::Status { .. } => ErrorKind::Status,
            Self::BodyRead(_) => ErrorKind::BodyRead,
            Self::TruncatedBody(_) => ErrorKind::TruncatedBody,
            Self::DeadlineExceeded { .. } => ErrorKind::DeadlineExceeded,
        }
    }

    /// Classifies a failure that happened before the response head arrived.
    pub(crate) fn from_request(err: hyper_util::client::legacy::Error) -> Self {
        if chain_has_eof(&err) {
            Self::ConnectionClosed(err)
        } else {
            Self::Request(err)
        }
    }

    /// Classifies a failure while reading the response body.
    pub(crate) fn from_body(err: hyper::Error) -> Self {
        if chain_has_eof(&err) {
            Self::TruncatedBody(err)
        } else {
            Self::BodyRead(err)
        }
    }
}

/// Whether the peer went away mid-exchange, as opposed to never being reachable.
fn chain_has_eof(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut cur = Some(err);
    while let Some(e) = cur {
        if let Some(h) = e.downcast_ref::<hyper::Error>()
            && h.is_incomplete_message()
        {
            return true;
        }
        if let Some(io) = e.downcast_ref::<std::io::Error>()
            && matches!(
                io.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            )
        {
            return true;
        }
        cur = e.source();
    }
    false
}

/// Joins an error with its sources, since the hyper wrappers hide the interesting part.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut cur = err.source();
    while let Some(e) = cur {
        out.push_str(": ");
        out.push_str(&e.to_string());
        cur = e.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_kinds() {
        assert!(Error::NoUrls.kind().is_configuration());
        assert!(Error::MissingTarget.kind().is_configuration());
        assert!(!Error::Status { code: 500 }.kind().is_configuration());
        assert_eq!(Error::MissingTarget.kind().to_string(), "missing_target");
    }

    #[test]
    fn status_message_is_stable() {
        assert_eq!(
            Error::Status { code: 400 }.to_string(),
            "non-success response code: 400"
        );
    }

    #[test]
    fn eof_is_found_in_source_chain() {
        #[derive(Debug, thiserror::Error)]
        #[error("outer")]
        struct Outer(#[source] std::io::Error);

        let err = Outer(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "eof",
        ));
        assert!(chain_has_eof(&err));
        assert_eq!(error_chain(&err), "outer: eof");

        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(!chain_has_eof(&refused));
    }
}
