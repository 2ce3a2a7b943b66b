use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = ref_audio_gen::cli::Cli::parse();
    ref_audio_gen::run(cli)
}
