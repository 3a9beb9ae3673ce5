use std::io::{self, Write};

use anyhow::Result;
use astrometry_core::models::{ScaleUnits, Visibility};
use astrometry_core::{AstrometryConfig, UploadOptions};
use serde_json::{Map, Value};

use crate::cli::{ConnectionArgs, ScaleUnitsArg, SolveHintArgs};

pub(super) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

pub(super) fn apply_connection_overrides(
    mut config: AstrometryConfig,
    args: &ConnectionArgs,
) -> AstrometryConfig {
    if let Some(key) = &args.api_key {
        config.api_key = key.trim().to_string();
    }
    if let Some(url) = non_blank(args.login_url.as_deref()) {
        config.endpoints.login = url;
    }
    if let Some(url) = non_blank(args.file_upload_url.as_deref()) {
        config.endpoints.file_upload = url;
    }
    if let Some(url) = non_blank(args.url_upload_url.as_deref()) {
        config.endpoints.url_upload = url;
    }
    if let Some(url) = non_blank(args.job_status_url.as_deref()) {
        config.endpoints = config.endpoints.with_job_status(&url);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    config
}

pub(super) fn build_upload_options(hints: &SolveHintArgs) -> Result<Map<String, Value>> {
    let mut options = UploadOptions {
        scale_units: hints.scale_units.map(scale_units),
        scale_lower: hints.scale_lower,
        scale_upper: hints.scale_upper,
        scale_est: hints.scale_est,
        scale_err: hints.scale_err,
        center_ra: hints.center_ra,
        center_dec: hints.center_dec,
        radius: hints.radius,
        downsample_factor: hints.downsample_factor,
        tweak_order: hints.tweak_order,
        publicly_visible: hints.private.then_some(Visibility::Private),
        ..UploadOptions::default()
    };
    for (key, value) in &hints.options {
        options.extra.insert(key.clone(), value.clone());
    }
    Ok(options.to_map()?)
}

const fn scale_units(arg: ScaleUnitsArg) -> ScaleUnits {
    match arg {
        ScaleUnitsArg::Degwidth => ScaleUnits::Degwidth,
        ScaleUnitsArg::Arcminwidth => ScaleUnits::Arcminwidth,
        ScaleUnitsArg::Arcsecperpix => ScaleUnits::Arcsecperpix,
    }
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}
