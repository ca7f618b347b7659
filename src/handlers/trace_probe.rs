use crate::trace::{TraceRecord, TRACE_PATH};
use thiserror::Error;
use worker::*;

const USER_AGENT: &str = "ProxyIpVerifier/1.0";

/// Ways a probe can fail once the caller's input has been accepted
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Trace request to host '{host}' failed with status: {status}")]
    UpstreamStatus { host: String, status: u16 },

    #[error("Trace response did not report a client IP address")]
    MissingReportedAddress,

    /// DNS override, TLS, connection or body read failures
    #[error("{0:#}")]
    Transport(#[source] anyhow::Error),
}

impl ProbeError {
    fn transport(step: &'static str, err: worker::Error) -> Self {
        ProbeError::Transport(anyhow::Error::msg(err.to_string()).context(step))
    }
}

pub fn trace_url(host: &str) -> String {
    format!("https://{}{}", host, TRACE_PATH)
}

/// Rejects anything outside 200-299 (redirects are already followed)
pub fn check_status(host: &str, status: u16) -> std::result::Result<(), ProbeError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(ProbeError::UpstreamStatus {
            host: host.to_string(),
            status,
        })
    }
}

/// Fetches `https://<host>/cdn-cgi/trace` with DNS for `host` pinned to
/// `address`. Host header and SNI stay `host`.
pub async fn probe_trace(address: &str, host: &str) -> std::result::Result<TraceRecord, ProbeError> {
    let headers = Headers::new();
    headers
        .set("User-Agent", USER_AGENT)
        .map_err(|e| ProbeError::transport("Failed to build trace request", e))?;

    let mut init = RequestInit::new();
    init.method = Method::Get;
    init.headers = headers;
    init.redirect = RequestRedirect::Follow;
    init.cf.resolve_override = Some(address.to_string());

    let request = Request::new_with_init(&trace_url(host), &init)
        .map_err(|e| ProbeError::transport("Failed to build trace request", e))?;

    let mut response = Fetch::Request(request)
        .send()
        .await
        .map_err(|e| ProbeError::transport("Failed to send trace request", e))?;

    check_status(host, response.status_code())?;

    let text = response
        .text()
        .await
        .map_err(|e| ProbeError::transport("Failed to read trace response body", e))?;

    Ok(TraceRecord::parse(&text))
}
