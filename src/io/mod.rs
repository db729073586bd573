use anyhow::{Context, Result};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;

use crate::config::OutputConfig;

pub mod disk;

pub use disk::{load_from_disk, read_arrow_file};

/// Writer properties for every shard of a run
pub fn writer_properties(output: &OutputConfig) -> WriterProperties {
    let mut builder = WriterProperties::builder().set_compression(output.compression.into());
    if let Some(rows) = output.max_row_group_size {
        builder = builder.set_max_row_group_size(rows);
    }
    builder.build()
}

/// Write one record batch as a Parquet file. Returns the size of the file on disk.
pub fn write_parquet(batch: &RecordBatch, path: &Path, props: WriterProperties) -> Result<u64> {
    if batch.num_rows() == 0 {
        anyhow::bail!("No rows to write to {:?}", path);
    }

    // Create directory if it doesn't exist
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file =
        File::create(path).with_context(|| format!("Failed to create parquet file: {:?}", path))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;

    let size = std::fs::metadata(path)?.len();
    Ok(size)
}
