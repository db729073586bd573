//! Feature descriptors for `dataset_info.json`.
//!
//! Columns map to the JSON shape dataset loaders expect: scalars become
//! `{"dtype": .., "_type": "Value"}`, lists become `Sequence` entries and
//! structs become nested objects.

use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

use crate::dataset::Dataset;

/// Schema metadata key under which save_to_disk embeds its dataset info
const HF_SCHEMA_METADATA_KEY: &str = "huggingface";

/// Features for a dataset. Declared features are used when they cover
/// exactly the dataset's columns, otherwise they are derived from the schema.
pub fn dataset_features(dataset: &Dataset) -> Map<String, Value> {
    let columns = dataset.column_names();

    let from_info = dataset
        .info()
        .and_then(|info| info.get("features"))
        .and_then(|features| declared_features(features, &columns));
    if let Some(features) = from_info {
        return features;
    }

    let from_metadata = dataset
        .schema()
        .metadata()
        .get(HF_SCHEMA_METADATA_KEY)
        .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
        .and_then(|meta| {
            meta.pointer("/info/features")
                .and_then(|features| declared_features(features, &columns))
        });
    if let Some(features) = from_metadata {
        return features;
    }

    features_from_schema(dataset.schema())
}

pub fn features_from_schema(schema: &Schema) -> Map<String, Value> {
    fields_to_features(schema.fields().iter().map(|f| f.as_ref()))
}

fn fields_to_features<'a>(fields: impl Iterator<Item = &'a Field>) -> Map<String, Value> {
    fields
        .map(|field| (field.name().clone(), feature_for(field.data_type())))
        .collect()
}

/// Reorder declared features to column order; None if the key set differs.
fn declared_features(features: &Value, columns: &[String]) -> Option<Map<String, Value>> {
    let declared = features.as_object()?;
    let declared_keys: HashSet<&str> = declared.keys().map(String::as_str).collect();
    let column_keys: HashSet<&str> = columns.iter().map(String::as_str).collect();
    if declared_keys != column_keys {
        return None;
    }

    Some(
        columns
            .iter()
            .map(|name| (name.clone(), declared[name].clone()))
            .collect(),
    )
}

fn feature_for(data_type: &DataType) -> Value {
    match data_type {
        DataType::List(inner) | DataType::LargeList(inner) => {
            json!({ "feature": feature_for(inner.data_type()), "_type": "Sequence" })
        }
        DataType::FixedSizeList(inner, length) => json!({
            "feature": feature_for(inner.data_type()),
            "length": length,
            "_type": "Sequence",
        }),
        DataType::Struct(fields) => {
            Value::Object(fields_to_features(fields.iter().map(|f| f.as_ref())))
        }
        DataType::Dictionary(_, values) => feature_for(values),
        other => json!({ "dtype": value_dtype(other), "_type": "Value" }),
    }
}

fn value_dtype(data_type: &DataType) -> String {
    match data_type {
        DataType::Null => "null".into(),
        DataType::Boolean => "bool".into(),
        DataType::Int8 => "int8".into(),
        DataType::Int16 => "int16".into(),
        DataType::Int32 => "int32".into(),
        DataType::Int64 => "int64".into(),
        DataType::UInt8 => "uint8".into(),
        DataType::UInt16 => "uint16".into(),
        DataType::UInt32 => "uint32".into(),
        DataType::UInt64 => "uint64".into(),
        DataType::Float16 => "float16".into(),
        DataType::Float32 => "float32".into(),
        DataType::Float64 => "float64".into(),
        DataType::Utf8 => "string".into(),
        DataType::LargeUtf8 => "large_string".into(),
        DataType::Binary | DataType::FixedSizeBinary(_) => "binary".into(),
        DataType::LargeBinary => "large_binary".into(),
        DataType::Date32 => "date32".into(),
        DataType::Date64 => "date64".into(),
        DataType::Time32(unit) => format!("time32[{}]", unit_suffix(unit)),
        DataType::Time64(unit) => format!("time64[{}]", unit_suffix(unit)),
        DataType::Duration(unit) => format!("duration[{}]", unit_suffix(unit)),
        DataType::Timestamp(unit, None) => format!("timestamp[{}]", unit_suffix(unit)),
        DataType::Timestamp(unit, Some(tz)) => {
            format!("timestamp[{}, tz={}]", unit_suffix(unit), tz)
        }
        DataType::Decimal128(precision, scale) => format!("decimal128({precision}, {scale})"),
        DataType::Decimal256(precision, scale) => format!("decimal256({precision}, {scale})"),
        other => other.to_string().to_lowercase(),
    }
}

fn unit_suffix(unit: &TimeUnit) -> &'static str {
    match unit {
        TimeUnit::Second => "s",
        TimeUnit::Millisecond => "ms",
        TimeUnit::Microsecond => "us",
        TimeUnit::Nanosecond => "ns",
    }
}
