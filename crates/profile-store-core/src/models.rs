//! Document shapes written to the store.
//!
//! A profiled column is persisted as two documents sharing one `id`:
//! a [`TextDocument`] (sample values, for free-text search) and a
//! [`ProfileDocument`] (statistics, for faceted and range queries).
//! Both are built transiently from a [`ColumnProfile`] and dropped after
//! the write.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Separator placed after every sample value by [`concat_values`].
pub const VALUE_SEPARATOR: &str = " ";

/// Statistics and metadata computed for one column by a profiling pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnProfile {
    pub id: i64,
    pub dataset_name: String,
    pub path: String,
    pub source_name: String,
    pub column_name: String,
    pub data_type: String,
    pub total_values: i32,
    pub unique_values: i32,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub min_value: f32,
    #[serde(default)]
    pub max_value: f32,
    #[serde(default)]
    pub avg_value: f32,
    #[serde(default)]
    pub median: i64,
    #[serde(default)]
    pub interquartile_range: i64,
}

/// Raw sample text of a column, indexed for keyword retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocument {
    pub id: i64,
    pub dataset_name: String,
    pub path: String,
    pub source_name: String,
    pub column_name: String,
    pub text: String,
}

impl TextDocument {
    /// Build a text document, joining `values` with [`concat_values`].
    pub fn new(
        id: i64,
        dataset_name: impl Into<String>,
        path: impl Into<String>,
        source_name: impl Into<String>,
        column_name: impl Into<String>,
        values: &[String],
    ) -> Self {
        Self {
            id,
            dataset_name: dataset_name.into(),
            path: path.into(),
            source_name: source_name.into(),
            column_name: column_name.into(),
            text: concat_values(values),
        }
    }

    /// Build the text document for a profiled column from its samples.
    pub fn for_profile(profile: &ColumnProfile, values: &[String]) -> Self {
        Self::new(
            profile.id,
            profile.dataset_name.as_str(),
            profile.path.as_str(),
            profile.source_name.as_str(),
            profile.column_name.as_str(),
            values,
        )
    }
}

/// Structured statistics of a column.
///
/// Source and column names are carried twice: a raw copy for exact match
/// and sorting, and an analyzed copy for fuzzy name search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDocument {
    pub id: i64,
    pub dataset_name: String,
    pub path: String,
    pub source_name_raw: String,
    pub source_name_analyzed: String,
    pub column_name_raw: String,
    pub column_name_analyzed: String,
    pub data_type: String,
    pub total_values: i32,
    pub unique_values: i32,
    pub entities: Vec<String>,
    pub min_value: f32,
    pub max_value: f32,
    pub avg_value: f32,
    pub median: i64,
    pub interquartile_range: i64,
}

impl From<&ColumnProfile> for ProfileDocument {
    fn from(p: &ColumnProfile) -> Self {
        Self {
            id: p.id,
            dataset_name: p.dataset_name.clone(),
            path: p.path.clone(),
            source_name_raw: p.source_name.clone(),
            source_name_analyzed: p.source_name.clone(),
            column_name_raw: p.column_name.clone(),
            column_name_analyzed: p.column_name.clone(),
            data_type: p.data_type.clone(),
            total_values: p.total_values,
            unique_values: p.unique_values,
            entities: p.entities.clone(),
            min_value: p.min_value,
            max_value: p.max_value,
            avg_value: p.avg_value,
            median: p.median,
            interquartile_range: p.interquartile_range,
        }
    }
}

/// Join sample values for full-text indexing.
///
/// Every value is followed by [`VALUE_SEPARATOR`], so the result keeps a
/// trailing space. Embedded spaces are not escaped: the output is meant
/// for tokenized search, not for recovering the original values.
pub fn concat_values(values: &[String]) -> String {
    let mut text = String::with_capacity(values.iter().map(|v| v.len() + 1).sum());
    for v in values {
        text.push_str(v);
        text.push_str(VALUE_SEPARATOR);
    }
    text
}

/// Stable identifier for a column, derived from its owning names.
///
/// Takes the first eight bytes of `SHA-256(dataset \0 source \0 column)`
/// as a big-endian `i64`, so re-profiling the same column yields the
/// same id and upserts replace the earlier documents.
pub fn column_id(dataset_name: &str, source_name: &str, column_name: &str) -> i64 {
    let mut hasher = Sha256::new();
    hasher.update(dataset_name.as_bytes());
    hasher.update([0u8]);
    hasher.update(source_name.as_bytes());
    hasher.update([0u8]);
    hasher.update(column_name.as_bytes());
    let digest = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    i64::from_be_bytes(head)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> ColumnProfile {
        ColumnProfile {
            id: 42,
            dataset_name: "sales".to_string(),
            path: "/data/sales".to_string(),
            source_name: "Invoices.csv".to_string(),
            column_name: "customer_id".to_string(),
            data_type: "N".to_string(),
            total_values: 100,
            unique_values: 7,
            entities: vec!["ORGANIZATION".to_string(), "PERSON".to_string()],
            min_value: 1.0,
            max_value: 99.0,
            avg_value: 50.5,
            median: 48,
            interquartile_range: 30,
        }
    }

    #[test]
    fn test_concat_keeps_trailing_separator() {
        let values = vec!["a".to_string(), "b c".to_string()];
        assert_eq!(concat_values(&values), "a b c ");
    }

    #[test]
    fn test_concat_empty() {
        assert_eq!(concat_values(&[]), "");
    }

    #[test]
    fn test_text_document_field_names() {
        let doc = TextDocument::for_profile(&sample_profile(), &["x".to_string()]);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 42,
                "datasetName": "sales",
                "path": "/data/sales",
                "sourceName": "Invoices.csv",
                "columnName": "customer_id",
                "text": "x "
            })
        );
    }

    #[test]
    fn test_profile_document_copies_names_twice() {
        let doc = ProfileDocument::from(&sample_profile());
        assert_eq!(doc.source_name_raw, "Invoices.csv");
        assert_eq!(doc.source_name_analyzed, "Invoices.csv");
        assert_eq!(doc.column_name_raw, "customer_id");
        assert_eq!(doc.column_name_analyzed, "customer_id");

        let json = serde_json::to_value(&doc).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "id",
            "datasetName",
            "path",
            "sourceNameRaw",
            "sourceNameAnalyzed",
            "columnNameRaw",
            "columnNameAnalyzed",
            "dataType",
            "totalValues",
            "uniqueValues",
            "entities",
            "minValue",
            "maxValue",
            "avgValue",
            "median",
            "interquartileRange",
        ] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
        assert_eq!(obj.len(), 16);
        assert_eq!(json["entities"], serde_json::json!(["ORGANIZATION", "PERSON"]));
    }

    #[test]
    fn test_column_profile_defaults() {
        let p: ColumnProfile = serde_json::from_str(
            r#"{"id":1,"datasetName":"d","path":"p","sourceName":"s","columnName":"c",
                "dataType":"T","totalValues":3,"uniqueValues":2}"#,
        )
        .unwrap();
        assert!(p.entities.is_empty());
        assert_eq!(p.median, 0);
    }

    #[test]
    fn test_column_id_stable_and_distinct() {
        let a = column_id("sales", "invoices.csv", "amount");
        assert_eq!(a, column_id("sales", "invoices.csv", "amount"));
        assert_ne!(a, column_id("sales", "invoices.csv", "amount2"));
        // Separator prevents concatenation collisions.
        assert_ne!(column_id("ab", "c", "d"), column_id("a", "bc", "d"));
    }
}
