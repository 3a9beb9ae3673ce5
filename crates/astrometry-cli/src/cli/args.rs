use std::path::PathBuf;

use clap::{Args, ValueEnum};

use super::parsers::{parse_min_one_u64, parse_option_pair};

/// Overrides for the `ASTROMETRY_*` environment configuration.
#[derive(Debug, Args, Default)]
pub struct ConnectionArgs {
    #[arg(long)]
    pub api_key: Option<String>,
    #[arg(long)]
    pub login_url: Option<String>,
    #[arg(long)]
    pub file_upload_url: Option<String>,
    #[arg(long)]
    pub url_upload_url: Option<String>,
    #[arg(long)]
    pub job_status_url: Option<String>,
    #[arg(long, value_parser = parse_min_one_u64)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScaleUnitsArg {
    Degwidth,
    Arcminwidth,
    Arcsecperpix,
}

#[derive(Debug, Args, Default)]
pub struct SolveHintArgs {
    #[arg(long, value_enum)]
    pub scale_units: Option<ScaleUnitsArg>,
    #[arg(long)]
    pub scale_lower: Option<f64>,
    #[arg(long)]
    pub scale_upper: Option<f64>,
    #[arg(long)]
    pub scale_est: Option<f64>,
    /// Percentage error on `--scale-est`.
    #[arg(long)]
    pub scale_err: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub center_ra: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub center_dec: Option<f64>,
    /// Search radius around the centre, in degrees.
    #[arg(long)]
    pub radius: Option<f64>,
    #[arg(long)]
    pub downsample_factor: Option<f64>,
    #[arg(long)]
    pub tweak_order: Option<u32>,
    /// Keep the submission out of public listings.
    #[arg(long, default_value_t = false)]
    pub private: bool,
    /// Extra request field; VALUE is parsed as JSON when possible.
    #[arg(long = "option", value_name = "KEY=VALUE", value_parser = parse_option_pair)]
    pub options: Vec<(String, serde_json::Value)>,
}

#[derive(Debug, Args)]
pub struct SubmitUrlArgs {
    pub url: String,
    #[command(flatten)]
    pub hints: SolveHintArgs,
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    pub file: PathBuf,
    #[command(flatten)]
    pub hints: SolveHintArgs,
}

#[derive(Debug, Args)]
pub struct JobArg {
    pub job_id: String,
}
