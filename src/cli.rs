use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ref-audio-gen", version, about = "Generate reference audio across texts and voice profiles")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, value_name = "PATH", help = "Config file (defaults to ref-audio-gen.json or the user config dir)")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Generate(GenerateArgs),
    Transcribe(TranscribeArgs),
    SystemInfo(SystemInfoArgs),
    Config(ConfigArgs),
    #[command(name = "__generate-group", hide = true)]
    InternalGenerateGroup(InternalGenerateGroupArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[arg(long, value_name = "FILE", help = "Text list, one text per line")]
    pub texts: PathBuf,

    #[arg(
        long,
        value_name = "JSON",
        conflicts_with = "manifest",
        required_unless_present = "manifest",
        help = "Voice profiles as a JSON array"
    )]
    pub profiles: Option<PathBuf>,

    #[arg(long, value_name = "LIST", help = "ASR manifest to use as reference profiles")]
    pub manifest: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Output directory")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Number of workers (defaults to available parallelism)")]
    pub workers: Option<usize>,

    #[arg(long, help = "Override the TTS base URL")]
    pub base_url: Option<String>,

    #[arg(long, help = "Run partitions as threads instead of child processes")]
    pub threads: bool,
}

#[derive(Args, Debug)]
pub struct TranscribeArgs {
    #[arg(long, value_name = "DIR", help = "Directory of .wav files (searched recursively)")]
    pub input: PathBuf,

    #[arg(long, value_name = "DIR", help = "Directory for the .list manifest")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Language code written into the manifest")]
    pub language: Option<String>,

    #[arg(long, help = "Override the ASR endpoint")]
    pub endpoint: Option<String>,
}

#[derive(Args, Debug)]
pub struct SystemInfoArgs {
    #[arg(long, help = "Output as JSON")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[arg(long, help = "Show current config as JSON")]
    pub show: bool,

    #[arg(long, help = "Create default config file")]
    pub init: bool,

    #[arg(long, help = "Validate configuration")]
    pub validate: bool,
}

#[derive(Args, Debug)]
pub struct InternalGenerateGroupArgs {
    #[arg(long, help = "HTTP timeout in seconds")]
    pub timeout_seconds: Option<u64>,
}
