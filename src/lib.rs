use worker::*;

#[macro_use]
mod logger;

mod address;
mod config;
mod handlers;
mod response;
mod trace;

use config::Config;

#[event(start)]
fn start() {
    console_error_panic_hook::set_once();
}

#[event(fetch)]
async fn fetch(
    req: HttpRequest,
    env: Env,
    _ctx: Context,
) -> Result<HttpResponse> {
    // Convert HttpRequest to worker::Request using try_from
    let worker_req = Request::try_from(req)?;

    // CORS preflight short-circuits before anything is parsed
    if worker_req.method() == Method::Options {
        return response::into_worker_response(response::preflight_response())?.try_into();
    }

    let config = Config::from_env(&env);

    // Per-request X-Log-Level header can raise the configured level
    let log_level = config.log_level.max(logger::LogLevel::from_header(
        &worker_req
            .headers()
            .get("X-Log-Level")?
            .unwrap_or_default(),
    ));

    // Get the datacenter where the worker is executing
    let colo = worker_req.cf().map(|cf| cf.colo()).unwrap_or("unknown".to_string());
    log_info!("Request received at datacenter: {}", colo);

    let url = worker_req.url()?;
    log_debug!(log_level, "Request URL: {}", url);

    let response = handlers::handle_verify(&url, &config.default_host, log_level).await;
    response::into_worker_response(response)?.try_into()
}
