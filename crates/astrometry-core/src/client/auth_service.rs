use serde_json::{Value, json};
use tracing::{info, warn};

use crate::error::{AstrometryError, Result};
use crate::models::{ConnectOutcome, ResponseStatus, Session};
use crate::transport::{HttpRequest, Transport};

use super::AstrometryClient;

impl<T: Transport> AstrometryClient<T> {
    /// Validates the key, probes the login endpoint and logs in when it answers.
    ///
    /// An unreachable service is not an error: the outcome is reported and any
    /// previous session is dropped, so later calls fail with `Unauthenticated`.
    pub fn connect(&mut self) -> Result<ConnectOutcome> {
        self.ensure_api_key()?;

        self.reachable = self.check_availability();
        if !self.reachable {
            self.session = Session::Unauthenticated;
            warn!(
                login_url = %self.config.endpoints.login,
                "astrometry.net is unreachable; skipping login"
            );
            return Ok(ConnectOutcome::Unreachable);
        }

        self.login()?;
        Ok(ConnectOutcome::Authenticated)
    }

    /// GET the login URL; reachable iff the status is exactly 200.
    pub fn check_availability(&self) -> bool {
        match self.send(HttpRequest::get(&self.config.endpoints.login)) {
            Ok(response) => response.status == 200,
            Err(err) => {
                warn!(error = %err, "availability probe failed");
                false
            }
        }
    }

    /// Exchanges the API key for a session token, replacing any previous session.
    pub fn login(&mut self) -> Result<()> {
        self.ensure_api_key()?;

        let login_url = self.config.endpoints.login.clone();
        let response = self.post(&login_url, &json!({ "apikey": self.config.api_key }))?;
        let token = session_from_login_response(&response)?;

        self.session = Session::Authenticated(token);
        info!(login_url = %login_url, "astrometry.net session established");
        Ok(())
    }

    fn ensure_api_key(&self) -> Result<()> {
        if self.config.has_api_key() {
            return Ok(());
        }
        Err(AstrometryError::Config(
            "an API key is required; set ASTROMETRY_API_KEY".to_string(),
        ))
    }
}

pub(super) fn session_from_login_response(response: &Value) -> Result<String> {
    match ResponseStatus::of(response) {
        ResponseStatus::Success => response
            .get("session")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(ToString::to_string)
            .ok_or_else(|| {
                AstrometryError::Auth("login succeeded without a session token".to_string())
            }),
        ResponseStatus::Error(message) => Err(AstrometryError::Auth(message)),
        ResponseStatus::Other(_) => Err(AstrometryError::Auth(
            "there was an unknown problem during the login attempt".to_string(),
        )),
    }
}
