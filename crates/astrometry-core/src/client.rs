use serde_json::Value;
use tracing::debug;

use crate::config::AstrometryConfig;
use crate::error::{AstrometryError, Result};
use crate::models::Session;
use crate::transport::{
    HttpRequest, HttpResponse, RequestBody, ReqwestTransport, Transport, request_json_form,
};

mod auth_service;
mod job_service;
mod upload_service;

#[cfg(test)]
mod tests;

/// Session-authenticated astrometry.net API client.
///
/// Building a client performs no I/O. Call [`AstrometryClient::connect`] to probe the
/// service and log in; every other remote operation requires the resulting session.
/// Operations take `&self`, so one connected client can be shared across threads.
pub struct AstrometryClient<T: Transport = ReqwestTransport> {
    transport: T,
    config: AstrometryConfig,
    reachable: bool,
    session: Session,
}

impl<T: Transport> std::fmt::Debug for AstrometryClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AstrometryClient")
            .field("endpoints", &self.config.endpoints)
            .field("reachable", &self.reachable)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl AstrometryClient<ReqwestTransport> {
    pub fn from_config(config: AstrometryConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout_ms)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: Transport> AstrometryClient<T> {
    pub fn new(transport: T, config: AstrometryConfig) -> Self {
        Self {
            transport,
            config,
            reachable: false,
            session: Session::Unauthenticated,
        }
    }

    pub fn config(&self) -> &AstrometryConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Outcome of the last availability probe; `false` before `connect`.
    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    fn require_session(&self) -> Result<&str> {
        self.session.token().ok_or(AstrometryError::Unauthenticated)
    }

    fn get(&self, url: &str) -> Result<Value> {
        self.submit(HttpRequest::get(url))
    }

    fn post(&self, url: &str, data: &Value) -> Result<Value> {
        let form = request_json_form(data)?;
        self.submit(HttpRequest::post(url, RequestBody::Form(form)))
    }

    /// Sends one request and decodes the body. The envelope is returned untouched.
    fn submit(&self, request: HttpRequest) -> Result<Value> {
        let response = self.send(request)?;
        if !response.is_success() {
            return Err(AstrometryError::Status {
                status: response.status,
                body: response.body,
            });
        }
        response.json()
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = request.method.as_str(), url = %request.url, "astrometry request");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, "astrometry response");
        Ok(response)
    }
}
