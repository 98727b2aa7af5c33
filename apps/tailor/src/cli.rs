use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::layout::{FontFamily, PageGeometry};
use crate::remote_client::JobMetadata;

#[derive(Debug, Parser)]
#[command(
    name = "tailor",
    about = "Score and tailor a resume against a job description",
    version
)]
pub struct Cli {
    /// Base URL of the scoring/tailoring service (overrides TAILOR_API_BASE)
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Request timeout in seconds (overrides TAILOR_TIMEOUT_SECS)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check whether the generation backend is up
    Ping,

    /// Upload a resume and job description, then fetch the ATS score
    Score(InputArgs),

    /// Upload, score, tailor and export the tailored resume as PDF
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// Output PDF file (defaults to TAILOR_EXPORT_FILENAME)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the tailored text without writing a PDF
        #[arg(long)]
        no_export: bool,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Paginate a local text file into a PDF
    Export {
        /// Plain-text input file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PDF file (defaults to TAILOR_EXPORT_FILENAME)
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,
    },
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Resume file (.pdf, .doc, .docx or .txt)
    #[arg(short, long)]
    pub resume: PathBuf,

    /// Job description text file, or `-` to read stdin
    #[arg(short, long)]
    pub job: PathBuf,

    #[command(flatten)]
    pub metadata: MetadataArgs,
}

/// Optional job metadata; the service fills in defaults for anything omitted.
#[derive(Debug, Args, Default)]
pub struct MetadataArgs {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub company: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub employment_type: Option<String>,

    #[arg(long)]
    pub experience_level: Option<String>,
}

impl From<MetadataArgs> for JobMetadata {
    fn from(args: MetadataArgs) -> Self {
        JobMetadata {
            title: args.title,
            company: args.company,
            location: args.location,
            employment_type: args.employment_type,
            experience_level: args.experience_level,
        }
    }
}

#[derive(Debug, Args)]
pub struct LayoutArgs {
    /// PDF font
    #[arg(long, default_value = "helvetica", value_enum)]
    pub font: FontArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FontArg {
    Helvetica,
    Courier,
}

impl LayoutArgs {
    pub fn geometry(&self) -> PageGeometry {
        let font = match self.font {
            FontArg::Helvetica => FontFamily::Helvetica,
            FontArg::Courier => FontFamily::Courier,
        };
        PageGeometry {
            font,
            ..PageGeometry::default()
        }
    }
}
