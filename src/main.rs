use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use samemail::{
    Corpus, MailDirectory, SamemailConfig, calculate_ratings_with_matrix, parse_line_corpus,
    rate_corpus,
};
use tracing_subscriber::EnvFilter;

/// Rate mails by how many near-duplicates they have.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory of mail files, or a line corpus file with `--lines`
    input: PathBuf,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the hash family; overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Read INPUT as one `<id> <content>` document per line
    #[arg(long)]
    lines: bool,

    /// Print every pairwise similarity before the report
    #[arg(long)]
    matrix: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => SamemailConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SamemailConfig::default(),
    };
    if let Some(seed) = cli.seed {
        cfg.perceptual.seed = Some(seed);
    }

    init_tracing(&cfg.log_level, cli.json_logs);

    let run = if cli.lines {
        let text = fs::read_to_string(&cli.input)
            .with_context(|| format!("reading {}", cli.input.display()))?;
        let corpus = Corpus::from_documents(parse_line_corpus(&text)?)?;
        rate_corpus(corpus, &cfg)?
    } else {
        let dir = MailDirectory::new(&cli.input);
        let ids = dir.ids()?;
        calculate_ratings_with_matrix(&ids, &dir, &cfg)?
    };

    if cli.matrix {
        for line in run.pair_lines(&cfg.rating) {
            println!("{line}");
        }
    }
    println!("{}", serde_json::to_string_pretty(&run.report)?);

    Ok(())
}

fn init_tracing(default_level: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
