use std::path::PathBuf;

use clap::Parser;

/// Command line for the student API server
#[derive(Parser, Debug)]
#[command(name = "student-api")]
#[command(about = "Student records HTTP API with JWT authentication")]
#[command(version)]
pub struct Cli {
    /// Optional YAML config file; environment variables still take precedence
    #[arg(short, long, env = "CONFIG_PATH")]
    pub config: Option<PathBuf>,
}
