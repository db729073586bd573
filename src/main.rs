use clap::Parser;
use std::path::PathBuf;

use parquet_convert::config::{CompressionCodec, ConfigFile, ConvertConfig};

#[derive(Parser)]
#[command(name = "convert-to-parquet")]
#[command(
    about = "Convert a dataset saved with save_to_disk into sharded Parquet files",
    long_about = None
)]
struct Cli {
    /// Path to the dataset saved with save_to_disk
    input_path: Option<PathBuf>,

    /// Directory where the Parquet files are written
    output_path: Option<PathBuf>,

    /// Number of examples per Parquet file [default: 100000]
    #[arg(allow_negative_numbers = true)]
    shard_size: Option<i64>,

    /// YAML file with conversion settings; positional arguments take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    compression: Option<CompressionCodec>,

    /// Maximum rows per Parquet row group
    #[arg(long)]
    max_row_group_size: Option<usize>,

    /// Name recorded in dataset_info.json (defaults to the output directory name)
    #[arg(long)]
    dataset_name: Option<String>,

    /// Remove existing data_*.parquet files from the output directory
    #[arg(long)]
    clean: bool,

    /// Also write manifest.json with per-shard statistics
    #[arg(long)]
    manifest: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            eprint!("{}", e.render());
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    let result = build_config(cli).and_then(|config| {
        parquet_convert::convert(&config)?;
        Ok(config)
    });

    match result {
        Ok(config) => {
            let output = config.output_path.display();
            println!("Success! You can now use the output path in FLAME training scripts.");
            println!("Example usage:");
            println!("  --training.dataset {}", output);
            println!("  or");
            println!("  --training.dataset {} --training.data_files '*.parquet'", output);
        }
        Err(e) => {
            println!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn build_config(cli: Cli) -> anyhow::Result<ConvertConfig> {
    let file = match &cli.config {
        Some(path) => ConfigFile::from_yaml_file(path)?,
        None => ConfigFile::default(),
    };
    let mut config = file.resolve(cli.input_path, cli.output_path, cli.shard_size)?;

    if let Some(codec) = cli.compression {
        config.output.compression = codec;
    }
    if let Some(rows) = cli.max_row_group_size {
        config.output.max_row_group_size = Some(rows);
    }
    if let Some(name) = cli.dataset_name {
        config.output.dataset_name = Some(name);
    }
    config.output.clean |= cli.clean;
    config.output.manifest |= cli.manifest;

    config.validate()?;
    Ok(config)
}
