//! Reader for directories written by `save_to_disk`.
//!
//! A single dataset directory holds `state.json`, an optional
//! `dataset_info.json` and one or more Arrow IPC data files. A dataset
//! dict holds `dataset_dict.json` and one such directory per split.

use anyhow::{Context, Result};
use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;
use arrow::ipc::reader::{FileReader, StreamReader};
use arrow::record_batch::RecordBatch;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::config::TRAIN_SPLIT;
use crate::dataset::Dataset;
use crate::error::ConvertError;

pub const STATE_FILE: &str = "state.json";
pub const DATASET_DICT_FILE: &str = "dataset_dict.json";
pub const DATASET_INFO_FILE: &str = "dataset_info.json";

/// Leading magic of the Arrow IPC file format; the stream format has none
const ARROW_FILE_MAGIC: &[u8; 6] = b"ARROW1";

#[derive(Debug, Deserialize)]
struct DatasetState {
    #[serde(rename = "_data_files")]
    data_files: Vec<DataFile>,
    #[serde(rename = "_split", default)]
    split: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DataFile {
    filename: String,
}

#[derive(Debug, Deserialize)]
struct DatasetDictState {
    splits: Vec<String>,
}

/// Load a saved dataset. For a dataset dict only the train split is loaded.
pub fn load_from_disk(path: &Path) -> Result<Dataset> {
    let dict_path = path.join(DATASET_DICT_FILE);
    if dict_path.is_file() {
        let dict: DatasetDictState = read_json(&dict_path)?;
        if !dict.splits.iter().any(|s| s == TRAIN_SPLIT) {
            return Err(ConvertError::MissingSplit {
                path: path.to_path_buf(),
                split: TRAIN_SPLIT.to_string(),
                available: dict.splits,
            }
            .into());
        }
        let dataset = load_split_dir(&path.join(TRAIN_SPLIT))?;
        return Ok(dataset.with_split(TRAIN_SPLIT));
    }

    load_split_dir(path)
}

fn load_split_dir(dir: &Path) -> Result<Dataset> {
    let state_path = dir.join(STATE_FILE);
    if !state_path.is_file() {
        return Err(ConvertError::NotASavedDataset(dir.to_path_buf()).into());
    }
    let state: DatasetState = read_json(&state_path)?;
    if state.data_files.is_empty() {
        return Err(ConvertError::NoDataFiles(state_path).into());
    }

    let mut schema: Option<(SchemaRef, PathBuf)> = None;
    let mut batches = Vec::new();

    for data_file in &state.data_files {
        let file_path = dir.join(&data_file.filename);
        let (file_schema, file_batches) = read_arrow_file(&file_path)?;

        match &schema {
            None => schema = Some((file_schema, file_path)),
            Some((expected, expected_path)) => {
                if expected.fields() != file_schema.fields() {
                    return Err(ConvertError::SchemaMismatch {
                        path: file_path,
                        expected: expected_path.clone(),
                    }
                    .into());
                }
            }
        }
        batches.extend(file_batches);
    }

    // data_files is non-empty, so the first file set the schema
    let (schema, _) = schema.ok_or_else(|| ConvertError::NoDataFiles(state_path.clone()))?;

    let info_path = dir.join(DATASET_INFO_FILE);
    let info = if info_path.is_file() {
        Some(read_json::<Value>(&info_path)?)
    } else {
        None
    };

    let dataset = Dataset::new(schema, batches)?.with_info(info);
    Ok(match state.split {
        Some(split) => dataset.with_split(split),
        None => dataset,
    })
}

/// Read every record batch of an Arrow IPC file, stream or file format.
pub fn read_arrow_file(path: &Path) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to open arrow file: {:?}", path))?;

    let mut magic = [0u8; 6];
    let is_file_format = file.read_exact(&mut magic).is_ok() && &magic == ARROW_FILE_MAGIC;
    file.seek(SeekFrom::Start(0))?;

    let reader = BufReader::new(file);
    let (schema, batches) = if is_file_format {
        let reader = FileReader::try_new(reader, None)
            .with_context(|| format!("Failed to read arrow file: {:?}", path))?;
        let schema = reader.schema();
        (schema, reader.collect::<Result<Vec<_>, ArrowError>>())
    } else {
        let reader = StreamReader::try_new(reader, None)
            .with_context(|| format!("Failed to read arrow stream: {:?}", path))?;
        let schema = reader.schema();
        (schema, reader.collect::<Result<Vec<_>, ArrowError>>())
    };

    let batches = batches.with_context(|| format!("Failed to decode record batch in {:?}", path))?;
    Ok((schema, batches))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
}
