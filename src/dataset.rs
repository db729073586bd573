use anyhow::{Context, Result};
use arrow::array::UInt64Array;
use arrow::compute::{concat_batches, take_record_batch};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use serde_json::Value;
use std::ops::Range;

use crate::error::ConvertError;

/// A dataset held fully in memory: one schema and its record batches in row order.
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
    num_rows: usize,
    split: Option<String>,
    info: Option<Value>,
}

impl Dataset {
    /// Build a dataset from batches. Every batch is rebound to `schema` so
    /// slices of different batches can be concatenated later.
    pub fn new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Result<Self> {
        let mut bound = Vec::with_capacity(batches.len());
        let mut num_rows = 0;

        for batch in batches {
            if batch.num_rows() == 0 {
                continue;
            }
            num_rows += batch.num_rows();
            let batch = RecordBatch::try_new(schema.clone(), batch.columns().to_vec())
                .context("Record batch does not match the dataset schema")?;
            bound.push(batch);
        }

        Ok(Self {
            schema,
            batches: bound,
            num_rows,
            split: None,
            info: None,
        })
    }

    pub fn with_split(mut self, split: impl Into<String>) -> Self {
        self.split = Some(split.into());
        self
    }

    /// Attach the dataset_info.json found next to the data files
    pub fn with_info(mut self, info: Option<Value>) -> Self {
        self.info = info;
        self
    }

    pub fn len(&self) -> usize {
        self.num_rows
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn split(&self) -> Option<&str> {
        self.split.as_deref()
    }

    pub fn info(&self) -> Option<&Value> {
        self.info.as_ref()
    }

    /// Materialize rows `[start, end)` as a single, independent record batch.
    pub fn select(&self, range: Range<usize>) -> Result<RecordBatch> {
        if range.start > range.end || range.end > self.num_rows {
            return Err(ConvertError::RowRangeOutOfBounds {
                start: range.start,
                end: range.end,
                len: self.num_rows,
            }
            .into());
        }

        let mut pieces = Vec::new();
        let mut offset = 0;
        for batch in &self.batches {
            let batch_end = offset + batch.num_rows();
            if batch_end > range.start && offset < range.end {
                let from = range.start.max(offset) - offset;
                let to = range.end.min(batch_end) - offset;
                pieces.push(batch.slice(from, to - from));
            }
            if batch_end >= range.end {
                break;
            }
            offset = batch_end;
        }

        // A lone slice still shares its parent's buffers; take copies the rows out
        match pieces.as_slice() {
            [piece] => {
                let indices = UInt64Array::from_iter_values(0..piece.num_rows() as u64);
                take_record_batch(piece, &indices).context("Failed to materialize shard")
            }
            _ => concat_batches(&self.schema, &pieces).context("Failed to materialize shard"),
        }
    }
}
