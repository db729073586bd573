use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Result of a conversion run: where the shards went and what each one holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub split: String,
    pub shard_size: usize,
    pub columns: Vec<String>,
    pub total_rows: usize,
    pub shards: Vec<ShardManifest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardManifest {
    pub file: String,
    pub start: usize,
    pub end: usize,
    pub num_rows: usize,
    /// Parquet file size on disk
    pub file_bytes: u64,
    /// In-memory Arrow size of the shard before encoding
    pub arrow_bytes: usize,
}

impl Manifest {
    pub fn new(
        input_path: PathBuf,
        output_path: PathBuf,
        split: String,
        shard_size: usize,
        columns: Vec<String>,
        total_rows: usize,
    ) -> Self {
        Self {
            input_path,
            output_path,
            split,
            shard_size,
            columns,
            total_rows,
            shards: Vec::new(),
        }
    }

    pub fn add_shard(&mut self, shard: ShardManifest) {
        self.shards.push(shard);
    }

    pub fn num_shards(&self) -> usize {
        self.shards.len()
    }

    pub fn total_file_bytes(&self) -> u64 {
        self.shards.iter().map(|s| s.file_bytes).sum()
    }

    pub fn total_arrow_bytes(&self) -> u64 {
        self.shards.iter().map(|s| s.arrow_bytes as u64).sum()
    }

    pub fn shard_lengths(&self) -> Vec<usize> {
        self.shards.iter().map(|s| s.num_rows).collect()
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}
