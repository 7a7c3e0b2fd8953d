//! HTTP server binding.
//!
//! On ESP-IDF one wildcard GET handler forwards every URI to
//! [`routes::handle`](super::routes::handle).  The handler runs on the
//! httpd task and blocks there while the slow loop answers.
//!
//! On the host there is no server; [`start`] only logs.

use std::time::Duration;

use crate::app::mailbox::Mailbox;

/// How long a request waits for the slow loop.  Must exceed one poll.
pub fn reply_timeout(poll_interval_ms: u32) -> Duration {
    Duration::from_millis(u64::from(poll_interval_ms) * 3)
}

#[cfg(target_os = "espidf")]
pub struct HttpServer {
    _server: esp_idf_svc::http::server::EspHttpServer<'static>,
}

#[cfg(target_os = "espidf")]
pub fn start(
    port: u16,
    mailbox: &'static Mailbox,
    timeout: Duration,
) -> Result<HttpServer, esp_idf_svc::sys::EspError> {
    use esp_idf_svc::http::Method;
    use esp_idf_svc::http::server::{Configuration, EspHttpServer};
    use esp_idf_svc::io::{EspIOError, Write};

    let config = Configuration {
        http_port: port,
        uri_match_wildcard: true,
        ..Default::default()
    };
    let mut server = EspHttpServer::new(&config)?;
    server.fn_handler::<EspIOError, _>("/*", Method::Get, move |req| {
        let reply = super::routes::handle(req.uri(), mailbox, timeout);
        log::debug!("web: {} -> {}", req.uri(), reply.status);
        let mut resp =
            req.into_response(reply.status, None, &[("Content-Type", reply.content_type)])?;
        resp.write_all(reply.body.as_bytes())
    })?;
    log::info!("web: listening on port {}", port);
    Ok(HttpServer { _server: server })
}

#[cfg(not(target_os = "espidf"))]
pub struct HttpServer;

#[cfg(not(target_os = "espidf"))]
pub fn start(
    port: u16,
    _mailbox: &'static Mailbox,
    _timeout: Duration,
) -> Result<HttpServer, core::convert::Infallible> {
    log::info!("web(sim): no listener (port {})", port);
    Ok(HttpServer)
}
