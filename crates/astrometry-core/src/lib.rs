//! Client for the astrometry.net plate-solving web API.
//!
//! The service does all image processing remotely. This crate authenticates with an
//! API key, forwards submissions and status queries, and hands back the decoded JSON
//! envelopes without interpreting them.

// Public fallible APIs in this crate share one concrete error contract (`AstrometryError`).
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type; per-item boilerplate would duplicate contract"
)]

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod transport;
pub mod urls;

pub use client::AstrometryClient;
pub use config::{AstrometryConfig, Endpoints};
pub use error::{AstrometryError, ErrorPayload, Result};
pub use models::{ConnectOutcome, ResponseStatus, Session, UploadOptions};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
