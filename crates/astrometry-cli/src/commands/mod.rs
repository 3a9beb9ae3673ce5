use anyhow::{Context, Result};
use astrometry_core::{
    AstrometryClient, AstrometryConfig, AstrometryError, ConnectOutcome, ErrorPayload, Transport,
};
use serde_json::{Value, json};

use crate::cli::{Cli, Commands};

mod support;


use self::support::{apply_connection_overrides, build_upload_options, print_json};

pub(crate) fn run(cli: Cli) -> Result<()> {
    let config = apply_connection_overrides(AstrometryConfig::from_env(), &cli.connection);
    let mut client = AstrometryClient::from_config(config).context("failed to create client")?;
    connect(&mut client)?;
    let output = execute(&client, cli.command)?;
    print_json(&output)
}

fn connect<T: Transport>(client: &mut AstrometryClient<T>) -> Result<()> {
    match client.connect()? {
        ConnectOutcome::Authenticated => Ok(()),
        ConnectOutcome::Unreachable => anyhow::bail!(
            "astrometry.net is unreachable at {}",
            client.config().endpoints.login
        ),
    }
}

fn execute<T: Transport>(client: &AstrometryClient<T>, command: Commands) -> Result<Value> {
    let output = match command {
        Commands::Login => json!({
            "status": "ok",
            "reachable": client.is_reachable(),
            "authenticated": client.is_authenticated(),
            "login_url": client.config().endpoints.login,
        }),
        Commands::SubmitUrl(args) => {
            let options = build_upload_options(&args.hints)?;
            client.submit_url(&args.url, &options)?
        }
        Commands::Upload(args) => {
            let options = build_upload_options(&args.hints)?;
            client
                .upload_file(&args.file, &options)
                .with_context(|| format!("failed to upload {}", args.file.display()))?
        }
        Commands::JobStatus(args) => client.job_status(&args.job_id)?,
        Commands::Objects(args) => client.known_objects(&args.job_id)?,
    };
    Ok(output)
}

pub(crate) fn report_error(operation: &str, url: Option<&str>, err: &anyhow::Error) {
    let rendered = error_payload(operation, url, err)
        .and_then(|payload| serde_json::to_string_pretty(&payload).ok());
    match rendered {
        Some(rendered) => eprintln!("{rendered}"),
        None => eprintln!("error: {err:#}"),
    }
}

fn error_payload(operation: &str, url: Option<&str>, err: &anyhow::Error) -> Option<ErrorPayload> {
    err.downcast_ref::<AstrometryError>()
        .map(|inner| inner.to_payload(operation, url.map(ToString::to_string)))
}
