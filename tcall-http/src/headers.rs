use std::collections::BTreeMap;
use std::time::Duration;

use http::HeaderMap;
use http::header::HeaderName;

pub const RPC_SERVICE: HeaderName = HeaderName::from_static("rpc-service");
pub const RPC_CALLER: HeaderName = HeaderName::from_static("rpc-caller");
pub const RPC_PROCEDURE: HeaderName = HeaderName::from_static("rpc-procedure");
pub const CONTEXT_TTL_MS: HeaderName = HeaderName::from_static("context-ttl-ms");

/// TTL advertised when the caller sets no deadline.
pub const DEFAULT_TTL: Duration = Duration::from_secs(1);

pub(crate) fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
}

/// Lowercases header names and joins repeated values with ", ".
pub(crate) fn merge_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut merged: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let v = String::from_utf8_lossy(value.as_bytes()).to_string();
        merged
            .entry(name.as_str().to_ascii_lowercase())
            .and_modify(|cur| {
                if !cur.is_empty() {
                    cur.push_str(", ");
                }
                cur.push_str(&v);
            })
            .or_insert(v);
    }
    merged
}
