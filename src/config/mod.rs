use anyhow::{Context, Result};
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConvertError;

/// Rows per Parquet file when no shard size is given
pub const DEFAULT_SHARD_SIZE: usize = 100_000;

/// The only split that gets converted
pub const TRAIN_SPLIT: &str = "train";

/// Fully resolved settings for one conversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub shard_size: usize,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub compression: CompressionCodec,
    #[serde(default)]
    pub max_row_group_size: Option<usize>,
    /// Remove existing data_*.parquet files before publishing
    #[serde(default)]
    pub clean: bool,
    /// Also write manifest.json with per-shard statistics
    #[serde(default)]
    pub manifest: bool,
    #[serde(default)]
    pub dataset_name: Option<String>,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    #[default]
    Snappy,
    Zstd,
    Gzip,
    Lz4,
    None,
}

impl From<CompressionCodec> for Compression {
    fn from(codec: CompressionCodec) -> Self {
        match codec {
            CompressionCodec::Snappy => Compression::SNAPPY,
            CompressionCodec::Zstd => Compression::ZSTD(ZstdLevel::default()),
            CompressionCodec::Gzip => Compression::GZIP(GzipLevel::default()),
            CompressionCodec::Lz4 => Compression::LZ4_RAW,
            CompressionCodec::None => Compression::UNCOMPRESSED,
        }
    }
}

impl ConvertConfig {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            shard_size: DEFAULT_SHARD_SIZE,
            output: OutputConfig::default(),
        }
    }

    pub fn with_shard_size(mut self, shard_size: usize) -> Self {
        self.shard_size = shard_size;
        self
    }

    pub fn with_output(mut self, output: OutputConfig) -> Self {
        self.output = output;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.shard_size == 0 {
            return Err(ConvertError::InvalidShardSize(0).into());
        }
        if self.output.max_row_group_size == Some(0) {
            anyhow::bail!("max_row_group_size must be a positive integer");
        }
        Ok(())
    }
}

/// On-disk YAML configuration. Every field is optional so the command
/// line can supply or override any of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub input_path: Option<PathBuf>,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    #[serde(default)]
    pub shard_size: Option<i64>,
    #[serde(default)]
    pub output: OutputConfig,
}

impl ConfigFile {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse YAML configuration")
    }

    /// Merge command line values over the file and produce a validated config
    pub fn resolve(
        self,
        input_path: Option<PathBuf>,
        output_path: Option<PathBuf>,
        shard_size: Option<i64>,
    ) -> Result<ConvertConfig> {
        let input_path = input_path
            .or(self.input_path)
            .ok_or(ConvertError::MissingArgument("input_path"))?;
        let output_path = output_path
            .or(self.output_path)
            .ok_or(ConvertError::MissingArgument("output_path"))?;

        let shard_size = match shard_size.or(self.shard_size) {
            Some(n) => usize::try_from(n)
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConvertError::InvalidShardSize(n))?,
            None => DEFAULT_SHARD_SIZE,
        };

        let config = ConvertConfig {
            input_path,
            output_path,
            shard_size,
            output: self.output,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_fills_defaults() {
        let file = ConfigFile::from_yaml_str(
            r#"
input_path: /data/saved
output_path: /data/parquet
output:
  compression: zstd
  clean: true
"#,
        )
        .unwrap();

        let config = file.resolve(None, None, None).unwrap();
        assert_eq!(config.input_path, PathBuf::from("/data/saved"));
        assert_eq!(config.shard_size, DEFAULT_SHARD_SIZE);
        assert_eq!(config.output.compression, CompressionCodec::Zstd);
        assert!(config.output.clean);
        assert!(!config.output.manifest);
        assert_eq!(config.output.max_row_group_size, None);
    }

    #[test]
    fn command_line_overrides_file() {
        let file = ConfigFile::from_yaml_str("input_path: a\noutput_path: b\nshard_size: 10\n")
            .unwrap();
        let config = file.resolve(Some("in".into()), None, Some(25)).unwrap();
        assert_eq!(config.input_path, PathBuf::from("in"));
        assert_eq!(config.output_path, PathBuf::from("b"));
        assert_eq!(config.shard_size, 25);
    }

    #[test]
    fn rejects_non_positive_shard_size() {
        for bad in [0, -3] {
            let err = ConfigFile::default()
                .resolve(Some("in".into()), Some("out".into()), Some(bad))
                .unwrap_err();
            assert!(matches!(
                err.downcast_ref::<ConvertError>(),
                Some(ConvertError::InvalidShardSize(n)) if *n == bad
            ));
        }
    }

    #[test]
    fn missing_output_is_reported() {
        let err = ConfigFile::default()
            .resolve(Some("in".into()), None, None)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConvertError>(),
            Some(ConvertError::MissingArgument("output_path"))
        ));
    }

    #[test]
    fn unknown_codec_fails_to_parse() {
        assert!(ConfigFile::from_yaml_str("output:\n  compression: brotli9\n").is_err());
    }
}
