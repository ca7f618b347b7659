use http::{Response, StatusCode};
use serde::Serialize;
use worker::Url;

use super::trace_probe::{self, ProbeError};
use crate::address::{self, AddressComparison};
use crate::logger::LogLevel;
use crate::response::json_response;
use crate::trace::TraceRecord;

const FAILURE_MESSAGE: &str = "Test failed. The IP may not be a valid proxy for the specified host.";
const NOT_AVAILABLE: &str = "N/A";

/// Inputs of one verification, taken from the inbound URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyRequest {
    /// Candidate address the target host is resolved to
    pub address: String,
    /// Host header and SNI for the probe
    pub host: String,
}

impl VerifyRequest {
    /// `None` when the path carries no address
    pub fn from_url(url: &Url, default_host: &str) -> Option<Self> {
        let address = address::extract_address(url.path())?;

        Some(VerifyRequest {
            address,
            host: select_host(url, default_host),
        })
    }
}

/// First non-empty `host` query parameter, or the configured default
pub fn select_host(url: &Url, default_host: &str) -> String {
    url.query_pairs()
        .find(|(key, _)| key == "host")
        .map(|(_, value)| value.into_owned())
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| default_host.to_string())
}

#[derive(Serialize)]
struct UsageError {
    error: &'static str,
    usage: &'static str,
}

/// 400 for requests that don't name an address
pub fn usage_response() -> Response<String> {
    json_response(
        &UsageError {
            error: "Please provide an IP address in the URL path.",
            usage: "Use /<ip>?host=<hostname>, for example /1.2.3.4?host=your.sni.com",
        },
        StatusCode::BAD_REQUEST,
    )
}

#[derive(Debug, Serialize)]
pub struct VerdictDetails {
    pub tested_ip_address: String,
    pub used_host_header: String,
    pub reported_ip_from_trace: String,
    pub ips_are_equivalent: bool,
    pub cloudflare_data_center: String,
}

#[derive(Debug, Serialize)]
pub struct VerdictData {
    pub success: bool,
    pub message: String,
    pub details: VerdictDetails,
    pub raw_trace_data: TraceRecord,
}

#[derive(Debug, Serialize)]
pub struct FailureDetails {
    pub tested_ip_address: String,
    pub used_host_header: String,
    pub error_message: String,
}

#[derive(Debug, Serialize)]
pub struct FailureData {
    pub success: bool,
    pub message: String,
    pub details: FailureDetails,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum VerifyResponse {
    Verdict(VerdictData),
    Failure(FailureData),
}

impl VerifyResponse {
    pub fn status(&self) -> StatusCode {
        match self {
            VerifyResponse::Verdict(_) => StatusCode::OK,
            VerifyResponse::Failure(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn into_response(self) -> Response<String> {
        json_response(&self, self.status())
    }
}

/// Turns a probe outcome into the verdict returned to the caller
pub fn build_verdict(
    request: &VerifyRequest,
    outcome: Result<TraceRecord, ProbeError>,
) -> VerifyResponse {
    let trace = match outcome {
        Ok(trace) => trace,
        Err(err) => return failure(request, err),
    };

    let Some(reported) = trace.ip() else {
        return failure(request, ProbeError::MissingReportedAddress);
    };

    let AddressComparison {
        equivalent,
        displayed_reported,
    } = address::compare_addresses(&request.address, reported);

    let message = if equivalent {
        format!(
            "Proxy verified: the tested IP served the request for {}.",
            request.host
        )
    } else {
        "IP mismatch: the trace reported a different address than the tested IP.".to_string()
    };

    VerifyResponse::Verdict(VerdictData {
        success: equivalent,
        message,
        details: VerdictDetails {
            tested_ip_address: request.address.clone(),
            used_host_header: request.host.clone(),
            reported_ip_from_trace: displayed_reported,
            ips_are_equivalent: equivalent,
            cloudflare_data_center: trace.colo().unwrap_or(NOT_AVAILABLE).to_string(),
        },
        raw_trace_data: trace,
    })
}

fn failure(request: &VerifyRequest, err: ProbeError) -> VerifyResponse {
    VerifyResponse::Failure(FailureData {
        success: false,
        message: FAILURE_MESSAGE.to_string(),
        details: FailureDetails {
            tested_ip_address: request.address.clone(),
            used_host_header: request.host.clone(),
            error_message: err.to_string(),
        },
    })
}

/// Full verification for one inbound URL: validate, probe, compare
pub async fn handle_verify(url: &Url, default_host: &str, log_level: LogLevel) -> Response<String> {
    let Some(request) = VerifyRequest::from_url(url, default_host) else {
        log_info!("Rejected request without an address: {}", url.path());
        return usage_response();
    };

    log_info!("Testing IP {} for host {}", request.address, request.host);
    log_debug!(log_level, "Trace URL: {}", trace_probe::trace_url(&request.host));

    let outcome = trace_probe::probe_trace(&request.address, &request.host).await;
    match &outcome {
        Ok(trace) if trace.is_empty() => {
            log_debug!(log_level, "Trace body had no key=value pairs")
        }
        Ok(trace) => log_debug!(log_level, "Trace data ({} keys): {:?}", trace.len(), trace),
        Err(_) => {}
    }

    let verdict = build_verdict(&request, outcome);
    match &verdict {
        VerifyResponse::Verdict(data) => log_info!(
            "Verdict for {}: reported {}, equivalent: {}, colo: {}",
            request.address,
            data.details.reported_ip_from_trace,
            data.details.ips_are_equivalent,
            data.details.cloudflare_data_center
        ),
        VerifyResponse::Failure(data) => log_error!(
            "Verification of {} via {} failed: {}",
            request.address,
            request.host,
            data.details.error_message
        ),
    }

    verdict.into_response()
}
