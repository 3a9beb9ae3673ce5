use clap::{Parser, Subcommand};

mod args;
mod parsers;


pub use args::{ConnectionArgs, JobArg, ScaleUnitsArg, SolveHintArgs, SubmitUrlArgs, UploadArgs};

#[derive(Debug, Parser)]
#[command(name = "astrometry")]
#[command(about = "Submit images to astrometry.net and query plate-solving jobs", version)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Log requests and responses to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check that the service is reachable and the API key is accepted.
    Login,
    /// Ask the service to fetch and solve an image by URL.
    SubmitUrl(SubmitUrlArgs),
    /// Upload a local image file for solving.
    Upload(UploadArgs),
    JobStatus(JobArg),
    /// Objects identified in a solved job's field.
    Objects(JobArg),
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::SubmitUrl(_) => "submit-url",
            Self::Upload(_) => "upload",
            Self::JobStatus(_) => "job-status",
            Self::Objects(_) => "objects",
        }
    }

    /// Image URL the command submits, reported alongside failures.
    pub fn submitted_url(&self) -> Option<&str> {
        match self {
            Self::SubmitUrl(args) => Some(&args.url),
            _ => None,
        }
    }
}
