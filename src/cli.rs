use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::pipeline::extract::Method;

/// Derive accessible, semantically labeled color palettes from wallpapers.
#[derive(Parser, Debug)]
#[command(name = "wallhue", version, about)]
pub struct Cli {
    /// More logging (debug level)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the palette extracted from an image
    Extract(ExtractArgs),
    /// Render and install every configured application theme
    Apply(ApplyArgs),
    /// Render one template to stdout
    Render(RenderArgs),
    /// Render templates against a sample palette and report any errors
    Check(CheckArgs),
    /// List the builtin templates
    Templates,
}

/// Extraction knobs shared by every subcommand. Unset values fall back to
/// the config file, then to built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct PipelineArgs {
    /// Extraction method
    #[arg(short, long, value_enum)]
    pub method: Option<Method>,

    /// Number of colors to extract
    #[arg(short = 'k', long = "colors", value_parser = clap::value_parser!(u8).range(4..=32))]
    pub colors: Option<u8>,

    /// Give up starting new extraction work after this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Config file (defaults to $XDG_CONFIG_HOME/wallhue/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Path to the input image
    pub image: PathBuf,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Print the palette as JSON
    #[arg(long)]
    pub json: bool,

    /// Print a colored terminal preview of the palette
    #[arg(long)]
    pub preview: bool,

    /// Run every method and list them best first
    #[arg(long, conflicts_with = "method")]
    pub compare: bool,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Path to the input image
    pub image: PathBuf,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Only apply to these applications (repeatable)
    #[arg(short, long = "app")]
    pub apps: Vec<String>,

    /// Render everything but write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Do not run reload commands
    #[arg(long)]
    pub no_reload: bool,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Path to the input image
    pub image: PathBuf,

    /// Template file, or builtin:<name> (see `wallhue templates`)
    pub template: String,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Template files, or builtin:<name>
    #[arg(required = true)]
    pub templates: Vec<String>,
}
