mod env;

pub const API_KEY_ENV: &str = "ASTROMETRY_API_KEY";
pub const LOGIN_URL_ENV: &str = "ASTROMETRY_LOGIN_URL";
pub const FILE_UPLOAD_URL_ENV: &str = "ASTROMETRY_FILE_UPLOAD_URL";
pub const URL_UPLOAD_URL_ENV: &str = "ASTROMETRY_URL_UPLOAD_URL";
pub const JOB_STATUS_URL_ENV: &str = "ASTROMETRY_JOB_STATUS_URL";
pub const TIMEOUT_MS_ENV: &str = "ASTROMETRY_TIMEOUT_MS";

pub const DEFAULT_LOGIN_URL: &str = "http://nova.astrometry.net/api/login";
pub const DEFAULT_FILE_UPLOAD_URL: &str = "http://nova.astrometry.net/api/upload";
pub const DEFAULT_URL_UPLOAD_URL: &str = "http://nova.astrometry.net/api/url_upload";
pub const DEFAULT_JOB_STATUS_URL: &str = "http://nova.astrometry.net/api/jobs";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Absolute URLs of the remote API. Fixed once the client is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub login: String,
    pub file_upload: String,
    pub url_upload: String,
    pub job_status: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: DEFAULT_LOGIN_URL.to_string(),
            file_upload: DEFAULT_FILE_UPLOAD_URL.to_string(),
            url_upload: DEFAULT_URL_UPLOAD_URL.to_string(),
            job_status: DEFAULT_JOB_STATUS_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Job-status base with any trailing `/` removed.
    pub fn with_job_status(mut self, url: &str) -> Self {
        self.job_status = normalize_base_url(url);
        self
    }
}

#[derive(Clone)]
pub struct AstrometryConfig {
    pub endpoints: Endpoints,
    pub api_key: String,
    pub timeout_ms: u64,
}

impl std::fmt::Debug for AstrometryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AstrometryConfig")
            .field("endpoints", &self.endpoints)
            .field("api_key_set", &!self.api_key.trim().is_empty())
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl Default for AstrometryConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            api_key: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl AstrometryConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(env::process_env)
    }

    /// Builds a config from an arbitrary variable source. Blank values keep the defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Endpoints::default();
        let job_status =
            env::read_non_empty(&lookup, JOB_STATUS_URL_ENV).unwrap_or(defaults.job_status);
        let endpoints = Endpoints {
            login: env::read_non_empty(&lookup, LOGIN_URL_ENV).unwrap_or(defaults.login),
            file_upload: env::read_non_empty(&lookup, FILE_UPLOAD_URL_ENV)
                .unwrap_or(defaults.file_upload),
            url_upload: env::read_non_empty(&lookup, URL_UPLOAD_URL_ENV)
                .unwrap_or(defaults.url_upload),
            job_status: String::new(),
        }
        .with_job_status(&job_status);

        Self {
            endpoints,
            api_key: env::read_non_empty(&lookup, API_KEY_ENV).unwrap_or_default(),
            timeout_ms: env::read_u64(&lookup, TIMEOUT_MS_ENV)
                .filter(|value| *value > 0)
                .unwrap_or(DEFAULT_TIMEOUT_MS),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
