use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Login state of a client. The token only changes when login is re-run.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Unauthenticated,
    Authenticated(String),
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => f.write_str("Unauthenticated"),
            Self::Authenticated(_) => f.write_str("Authenticated(..)"),
        }
    }
}

impl Session {
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Unauthenticated => None,
            Self::Authenticated(token) => Some(token.as_str()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectOutcome {
    Authenticated,
    /// The availability probe did not see HTTP 200; login was skipped.
    Unreachable,
}

/// Classification of a response envelope's `status` discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseStatus {
    Success,
    Error(String),
    Other(Option<String>),
}

impl ResponseStatus {
    pub fn of(envelope: &Value) -> Self {
        match envelope.get("status").and_then(Value::as_str) {
            Some("success") => Self::Success,
            Some("error") => Self::Error(
                envelope
                    .get("errormessage")
                    .and_then(Value::as_str)
                    .unwrap_or("no error message supplied")
                    .to_string(),
            ),
            other => Self::Other(other.map(ToString::to_string)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleUnits {
    Degwidth,
    Arcminwidth,
    Arcsecperpix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleType {
    /// Lower and upper bounds.
    #[serde(rename = "ul")]
    Bounds,
    /// Estimate plus percentage error.
    #[serde(rename = "ev")]
    Estimate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "d")]
    SiteDefault,
    #[serde(rename = "y")]
    Allow,
    #[serde(rename = "n")]
    Deny,
    #[serde(rename = "sa")]
    ShareAlike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    #[serde(rename = "y")]
    Public,
    #[serde(rename = "n")]
    Private,
}

/// Solve hints understood by the remote service. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_commercial_use: Option<Permission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_modifications: Option<Permission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publicly_visible: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_units: Option<ScaleUnits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_type: Option<ScaleType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_lower: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_upper: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_est: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_err: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_ra: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_dec: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downsample_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tweak_order: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parity: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positional_error: Option<f64>,
    /// Keys not modelled above, forwarded verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UploadOptions {
    pub fn to_map(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}
