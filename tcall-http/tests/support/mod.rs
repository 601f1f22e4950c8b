#![allow(dead_code)]

use tcall_http::{HttpOptions, HttpTransport};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn transport(url: &str) -> tcall_http::Result<HttpTransport> {
    init_tracing();
    HttpTransport::new(HttpOptions::new(url, "target").with_source_service("source"))
}
