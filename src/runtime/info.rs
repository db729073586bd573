use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use super::manifest::Manifest;

/// Contents of `dataset_info.json`, in the layout parquet dataset loaders read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub builder_name: String,
    pub citation: String,
    pub config_name: String,
    pub dataset_name: String,
    /// Number of records
    pub dataset_size: usize,
    pub description: String,
    pub download_checksums: Map<String, Value>,
    pub download_size: u64,
    pub features: Map<String, Value>,
    pub homepage: String,
    pub license: String,
    pub post_processed: Option<Value>,
    pub post_processing_size: Option<u64>,
    pub size_in_bytes: u64,
    pub splits: BTreeMap<String, SplitInfo>,
    pub supervised_keys: Option<Value>,
    pub task_templates: Vec<Value>,
    pub version: VersionInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitInfo {
    pub name: String,
    pub num_bytes: u64,
    pub num_examples: usize,
    pub shard_lengths: Option<Vec<usize>>,
    pub dataset_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version_str: String,
    pub description: Option<String>,
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            version_str: "0.0.0".to_string(),
            description: None,
            major: 0,
            minor: 0,
            patch: 0,
        }
    }
}

impl DatasetInfo {
    /// Describe a finished conversion. Sizes come from the shards that were written.
    pub fn from_manifest(
        manifest: &Manifest,
        dataset_name: String,
        features: Map<String, Value>,
    ) -> Self {
        let download_size = manifest.total_file_bytes();
        let num_bytes = manifest.total_arrow_bytes();

        let split = SplitInfo {
            name: manifest.split.clone(),
            num_bytes,
            num_examples: manifest.total_rows,
            shard_lengths: Some(manifest.shard_lengths()),
            dataset_name: dataset_name.clone(),
        };

        Self {
            builder_name: "parquet".to_string(),
            citation: String::new(),
            config_name: "default".to_string(),
            dataset_name,
            dataset_size: manifest.total_rows,
            description: format!(
                "Parquet dataset converted from {}",
                manifest.input_path.display()
            ),
            download_checksums: Map::new(),
            download_size,
            features,
            homepage: String::new(),
            license: String::new(),
            post_processed: None,
            post_processing_size: None,
            size_in_bytes: download_size + num_bytes,
            splits: BTreeMap::from([(manifest.split.clone(), split)]),
            supervised_keys: None,
            task_templates: Vec::new(),
            version: VersionInfo::default(),
        }
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}
