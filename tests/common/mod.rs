//! Fixtures shared by the integration tests.
#![allow(dead_code)]

use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::ipc::writer::StreamWriter;
use arrow::record_batch::RecordBatch;
use serde_json::json;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub fn text_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("text", DataType::Utf8, true),
    ]))
}

pub fn text_batch(schema: &SchemaRef, ids: std::ops::Range<i64>) -> RecordBatch {
    let texts: Vec<String> = ids.clone().map(|i| format!("document {i}")).collect();
    RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(ids.collect::<Vec<_>>())),
            Arc::new(StringArray::from(texts)),
        ],
    )
    .unwrap()
}

/// Write a save_to_disk style directory: one arrow stream per entry of `files`.
pub fn write_saved_dataset(dir: &Path, schema: &SchemaRef, files: &[Vec<RecordBatch>]) {
    std::fs::create_dir_all(dir).unwrap();
    let mut data_files = Vec::new();
    for (i, batches) in files.iter().enumerate() {
        let name = format!("data-{:05}-of-{:05}.arrow", i, files.len());
        let file = File::create(dir.join(&name)).unwrap();
        let mut writer = StreamWriter::try_new(file, schema).unwrap();
        for batch in batches {
            writer.write(batch).unwrap();
        }
        writer.finish().unwrap();
        data_files.push(json!({ "filename": name }));
    }

    let state = json!({
        "_data_files": data_files,
        "_fingerprint": "0123456789abcdef",
        "_format_columns": null,
        "_format_kwargs": {},
        "_format_type": null,
        "_output_all_columns": false,
        "_split": null
    });
    std::fs::write(dir.join("state.json"), state.to_string()).unwrap();
}

pub fn parquet_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "parquet"))
        .collect();
    files.sort();
    files
}
