//! Convert datasets persisted with `save_to_disk` into sharded Parquet
//! files plus a `dataset_info.json` descriptor.

pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod io;
pub mod runtime;

pub use config::{CompressionCodec, ConfigFile, ConvertConfig, OutputConfig};
pub use dataset::Dataset;
pub use error::ConvertError;
pub use runtime::{convert, shard_file_name, shard_ranges, DatasetInfo, Manifest};
