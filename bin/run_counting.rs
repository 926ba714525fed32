use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use hinv_counting::{CountingProcessor, Executor, JsonBatchSource, RunConfig};

#[derive(Parser)]
#[command(name = "run_counting")]
#[command(about = "Count events and normalized yields per dataset and channel", long_about = None)]
struct Cli {
    /// Run configuration (YAML)
    #[arg(short, long, value_name = "YAML")]
    config: PathBuf,

    /// Directory of JSON batch files, read in file-name order
    #[arg(short, long, value_name = "DIR", conflicts_with = "files")]
    input_dir: Option<PathBuf>,

    /// Explicit JSON batch files
    #[arg(value_name = "BATCH")]
    files: Vec<PathBuf>,

    /// Output file (overrides `output_file` from the configuration)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Worker threads, 0 for one per core (overrides `workers`)
    #[arg(short, long, env = "HINV_WORKERS")]
    workers: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = RunConfig::from_yaml_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(output) = cli.output {
        config.output_file = output;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }

    let source = match (cli.input_dir, cli.files.is_empty()) {
        (Some(dir), _) => JsonBatchSource::from_dir(&dir)
            .with_context(|| format!("listing {}", dir.display()))?,
        (None, false) => JsonBatchSource::from_files(cli.files),
        (None, true) => bail!("no input: pass --input-dir or batch files"),
    };

    let processor = CountingProcessor::from_config(&config)?;
    let executor = Executor::new(config.workers)?;
    let merged = executor.run(&processor, source)?;
    let summary = processor.postprocess(&merged, &config.output_file)?;

    println!("Yields:");
    for (name, value) in &summary.yields {
        println!("{name}: {value:.2}");
    }
    Ok(())
}
