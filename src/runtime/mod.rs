use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::config::{ConvertConfig, TRAIN_SPLIT};
use crate::error::ConvertError;
use crate::features;
use crate::io;
use crate::io::disk::DATASET_INFO_FILE;

mod info;
mod manifest;
pub use info::{DatasetInfo, SplitInfo, VersionInfo};
pub use manifest::{Manifest, ShardManifest};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Print a progress line every this many shards
const PROGRESS_EVERY: usize = 10;

/// Hidden directory inside the output where a run writes before publishing
const STAGING_PREFIX: &str = ".parquet-convert-";

/// Contiguous row ranges of at most `shard_size` rows covering `[0, num_rows)`.
pub fn shard_ranges(
    num_rows: usize,
    shard_size: usize,
) -> Result<Vec<Range<usize>>, ConvertError> {
    if shard_size == 0 {
        return Err(ConvertError::InvalidShardSize(0));
    }
    Ok((0..num_rows.div_ceil(shard_size))
        .map(|i| {
            let start = i * shard_size;
            start..((i + 1) * shard_size).min(num_rows)
        })
        .collect())
}

pub fn shard_file_name(ordinal: usize) -> String {
    format!("data_{:06}.parquet", ordinal)
}

/// Convert a saved dataset into sharded parquet files plus dataset_info.json.
///
/// Files are written to a hidden staging directory inside the output
/// directory and moved into place only once every shard and the descriptor
/// exist. On failure the staging directory is removed and the existing
/// contents of the output directory are left as they were.
pub fn convert(config: &ConvertConfig) -> Result<Manifest> {
    if !config.input_path.exists() {
        return Err(ConvertError::InputNotFound(config.input_path.clone()).into());
    }
    config.validate()?;

    println!("Loading dataset from {}...", config.input_path.display());
    let dataset = io::load_from_disk(&config.input_path)?;

    println!("Converting to Parquet format...");
    println!("Dataset has {} examples", dataset.len());
    println!("Columns: {:?}", dataset.column_names());
    if let Some(split) = dataset.split().filter(|s| *s != TRAIN_SPLIT) {
        println!("Source split '{}' is written as '{}'", split, TRAIN_SPLIT);
    }

    let ranges = shard_ranges(dataset.len(), config.shard_size)?;
    let num_shards = ranges.len();

    let staging = create_staging_dir(&config.output_path)?;
    let props = io::writer_properties(&config.output);

    let mut manifest = Manifest::new(
        config.input_path.clone(),
        config.output_path.clone(),
        TRAIN_SPLIT.to_string(),
        config.shard_size,
        dataset.column_names(),
        dataset.len(),
    );

    let pb = ProgressBar::new(num_shards as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} shards ({percent}%)",
            )?,
    );

    for (i, range) in ranges.into_iter().enumerate() {
        let shard = dataset.select(range.clone())?;
        let file = shard_file_name(i);
        let file_bytes = io::write_parquet(&shard, &staging.path().join(&file), props.clone())
            .with_context(|| format!("Failed to write shard {}/{}", i + 1, num_shards))?;

        manifest.add_shard(ShardManifest {
            file,
            start: range.start,
            end: range.end,
            num_rows: shard.num_rows(),
            file_bytes,
            arrow_bytes: shard.get_array_memory_size(),
        });

        pb.inc(1);
        if (i + 1) % PROGRESS_EVERY == 0 {
            pb.suspend(|| println!("Saved shard {}/{}", i + 1, num_shards));
        }
    }
    pb.finish_and_clear();

    println!(
        "Successfully converted dataset to Parquet format at {}",
        config.output_path.display()
    );
    println!("Created {} Parquet files", num_shards);
    println!("Each file contains approximately {} examples", config.shard_size);

    let info = DatasetInfo::from_manifest(
        &manifest,
        dataset_name(config),
        features::dataset_features(&dataset),
    );
    info.write_to_file(staging.path().join(DATASET_INFO_FILE))?;
    if config.output.manifest {
        manifest.write_to_file(staging.path().join(MANIFEST_FILE))?;
    }

    publish(staging.path(), &config.output_path, config.output.clean)?;
    Ok(manifest)
}

fn dataset_name(config: &ConvertConfig) -> String {
    if let Some(name) = &config.output.dataset_name {
        return name.clone();
    }
    config
        .output_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            std::fs::canonicalize(&config.output_path)
                .ok()?
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "dataset".to_string())
}

/// Staging lives inside the output so the final renames stay on one filesystem,
/// even when the output is a mount point or a symlink.
fn create_staging_dir(output_path: &Path) -> Result<tempfile::TempDir> {
    std::fs::create_dir_all(output_path)
        .with_context(|| format!("Failed to create output directory: {:?}", output_path))?;

    tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(output_path)
        .with_context(|| format!("Failed to create staging directory in {:?}", output_path))
}

/// Move every staged file into the output directory.
fn publish(staging: &Path, output_path: &Path, clean: bool) -> Result<()> {
    if clean {
        for stale in stale_shards(output_path)? {
            std::fs::remove_file(&stale)
                .with_context(|| format!("Failed to remove stale shard: {:?}", stale))?;
        }
    }

    let mut staged: Vec<PathBuf> = std::fs::read_dir(staging)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    staged.sort();

    for from in staged {
        let Some(name) = from.file_name() else {
            continue;
        };
        let to = output_path.join(name);
        std::fs::rename(&from, &to)
            .with_context(|| format!("Failed to move {:?} to {:?}", from, to))?;
    }
    Ok(())
}

/// Existing shard files in the output directory
fn stale_shards(output_path: &Path) -> Result<Vec<PathBuf>> {
    let pattern = Path::new(&glob::Pattern::escape(&output_path.to_string_lossy()))
        .join("data_*.parquet");
    let paths = glob::glob(&pattern.to_string_lossy())?
        .collect::<Result<Vec<_>, glob::GlobError>>()?;
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_partition_rows() {
        let ranges = shard_ranges(250, 100).unwrap();
        assert_eq!(ranges, vec![0..100, 100..200, 200..250]);

        let ranges = shard_ranges(300, 100).unwrap();
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges.last(), Some(&(200..300)));
    }

    #[test]
    fn ranges_cover_without_gaps() {
        for (rows, size) in [(1, 1), (7, 3), (10, 10), (11, 10), (999, 7)] {
            let ranges = shard_ranges(rows, size).unwrap();
            assert_eq!(ranges.len(), rows.div_ceil(size));
            let mut next = 0;
            for r in &ranges {
                assert_eq!(r.start, next);
                assert!(r.end > r.start && r.end - r.start <= size);
                next = r.end;
            }
            assert_eq!(next, rows);
        }
    }

    #[test]
    fn no_ranges_for_empty_dataset() {
        assert!(shard_ranges(0, 100).unwrap().is_empty());
    }

    #[test]
    fn zero_shard_size_is_an_error() {
        assert!(matches!(
            shard_ranges(10, 0),
            Err(ConvertError::InvalidShardSize(0))
        ));
    }

    #[test]
    fn file_names_are_zero_padded() {
        assert_eq!(shard_file_name(0), "data_000000.parquet");
        assert_eq!(shard_file_name(42), "data_000042.parquet");
        assert_eq!(shard_file_name(1_234_567), "data_1234567.parquet");
    }

    #[test]
    fn dataset_name_prefers_override() {
        let mut config = ConvertConfig::new("in", "/tmp/out/my_corpus/");
        assert_eq!(dataset_name(&config), "my_corpus");
        config.output.dataset_name = Some("custom".into());
        assert_eq!(dataset_name(&config), "custom");
    }
}
