use std::io::Read;
use std::time::Duration;

use tracing::debug;

use crate::error::{GateError, Result, SourceErrorKind};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_500);

/// Some list hosts refuse obvious non-browser clients
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:24.0) Gecko/20100101 Firefox/24.0";

/// GET `url` and return the whole body. Redirects are followed.
pub fn get_bytes(url: &str, timeout: Duration) -> Result<Vec<u8>> {
    debug!("GET: {}", url);

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into();

    let response = agent
        .get(url)
        .header("User-Agent", USER_AGENT)
        .call()
        .map_err(|e| GateError::source(SourceErrorKind::Network, url, e.to_string()))?;

    let (_, body) = response.into_parts();
    let mut reader = body.into_reader();
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| GateError::source(SourceErrorKind::Network, url, e.to_string()))?;

    debug!("Returning {} bytes from {}", bytes.len(), url);
    Ok(bytes)
}
