use std::fmt::Display;

use serde_json::Value;

use crate::error::Result;
use crate::transport::Transport;
use crate::urls::{job_status_url, known_objects_url};

use super::AstrometryClient;

impl<T: Transport> AstrometryClient<T> {
    /// Current processing status of a job, as returned by the service.
    pub fn job_status(&self, job_id: impl Display) -> Result<Value> {
        self.require_session()?;
        let url = job_status_url(&self.config.endpoints.job_status, job_id);
        self.get(&url)
    }

    /// Catalogue objects the solver identified in a job's field.
    pub fn known_objects(&self, job_id: impl Display) -> Result<Value> {
        self.require_session()?;
        let url = known_objects_url(&self.config.endpoints.job_status, job_id);
        self.get(&url)
    }
}
