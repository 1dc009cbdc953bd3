//! Index schema: analyzer settings and field mappings.
//!
//! The two indices and the custom analyzer are described with typed
//! values and turned into JSON only when a backend sends them. This keeps
//! the schema checkable ([`Schema::validate`]) without a live engine.
//!
//! # Indices
//!
//! | Index | Purpose | Analysis |
//! |-------|---------|----------|
//! | [`TEXT_INDEX`] | Raw sample values, keyword retrieval | built-in `english` on `text` |
//! | [`PROFILE_INDEX`] | Column statistics, range and facet queries | [`DOMAIN_ANALYZER`] on name fields |
//!
//! # Domain analyzer
//!
//! Dataset and column names are usually filenames or snake_case
//! identifiers. The analyzer turns `customer_orders.csv` into the
//! stemmed terms `custom` and `order`:
//!
//! ```text
//! char filters:  underscore_to_hyphen → strip_csv_suffix
//! tokenizer:     standard
//! token filters: english_possessive_stemmer → lowercase → english_stop → english_stemmer
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Name of the raw value index.
pub const TEXT_INDEX: &str = "text";
/// Name of the statistics index.
pub const PROFILE_INDEX: &str = "profile";
/// Default document type used in both indices.
pub const DOC_TYPE: &str = "column";
/// Name of the custom analyzer installed on the profile index.
pub const DOMAIN_ANALYZER: &str = "domain_analyzer";

const BUILTIN_ANALYZERS: &[&str] = &["standard", "english", "simple", "whitespace", "keyword"];
const BUILTIN_TOKENIZERS: &[&str] = &["standard", "whitespace", "keyword", "letter"];
const BUILTIN_TOKEN_FILTERS: &[&str] = &["lowercase", "uppercase", "asciifolding"];
const BUILTIN_CHAR_FILTERS: &[&str] = &["html_strip"];

/// A reference in the schema that does not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("index '{index}': field '{field}' uses unknown analyzer '{analyzer}'")]
    UnknownAnalyzer {
        index: String,
        field: String,
        analyzer: String,
    },

    #[error("analyzer '{analyzer}' uses unknown tokenizer '{tokenizer}'")]
    UnknownTokenizer { analyzer: String, tokenizer: String },

    #[error("analyzer '{analyzer}' uses unknown char filter '{name}'")]
    UnknownCharFilter { analyzer: String, name: String },

    #[error("analyzer '{analyzer}' uses unknown token filter '{name}'")]
    UnknownTokenFilter { analyzer: String, name: String },
}

/// Character-level rewrite applied before tokenization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CharFilter {
    Mapping { mappings: Vec<String> },
    PatternReplace { pattern: String, replacement: String },
}

/// Token-level filter applied after tokenization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TokenFilter {
    Stop { stopwords: String },
    Stemmer { language: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomAnalyzer {
    #[serde(rename = "type")]
    kind: &'static str,
    pub tokenizer: String,
    pub char_filter: Vec<String>,
    pub filter: Vec<String>,
}

impl CustomAnalyzer {
    pub fn new(tokenizer: &str, char_filter: &[&str], filter: &[&str]) -> Self {
        Self {
            kind: "custom",
            tokenizer: tokenizer.to_string(),
            char_filter: char_filter.iter().map(|s| s.to_string()).collect(),
            filter: filter.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analysis {
    pub char_filter: BTreeMap<String, CharFilter>,
    pub filter: BTreeMap<String, TokenFilter>,
    pub analyzer: BTreeMap<String, CustomAnalyzer>,
}

impl Analysis {
    /// The char-filter/stemmer pipeline registered as [`DOMAIN_ANALYZER`].
    pub fn domain() -> Self {
        let mut analysis = Analysis::default();
        analysis.char_filter.insert(
            "underscore_to_hyphen".to_string(),
            CharFilter::Mapping {
                mappings: vec!["_=>-".to_string()],
            },
        );
        analysis.char_filter.insert(
            "strip_csv_suffix".to_string(),
            CharFilter::PatternReplace {
                pattern: r"\.csv$".to_string(),
                replacement: String::new(),
            },
        );
        analysis.filter.insert(
            "english_possessive_stemmer".to_string(),
            TokenFilter::Stemmer {
                language: "possessive_english".to_string(),
            },
        );
        analysis.filter.insert(
            "english_stop".to_string(),
            TokenFilter::Stop {
                stopwords: "_english_".to_string(),
            },
        );
        analysis.filter.insert(
            "english_stemmer".to_string(),
            TokenFilter::Stemmer {
                language: "english".to_string(),
            },
        );
        analysis.analyzer.insert(
            DOMAIN_ANALYZER.to_string(),
            CustomAnalyzer::new(
                "standard",
                &["underscore_to_hyphen", "strip_csv_suffix"],
                &[
                    "english_possessive_stemmer",
                    "lowercase",
                    "english_stop",
                    "english_stemmer",
                ],
            ),
        );
        analysis
    }

    fn validate(&self) -> Result<(), SchemaError> {
        for (name, analyzer) in &self.analyzer {
            if !BUILTIN_TOKENIZERS.contains(&analyzer.tokenizer.as_str()) {
                return Err(SchemaError::UnknownTokenizer {
                    analyzer: name.clone(),
                    tokenizer: analyzer.tokenizer.clone(),
                });
            }
            for cf in &analyzer.char_filter {
                if !self.char_filter.contains_key(cf) && !BUILTIN_CHAR_FILTERS.contains(&cf.as_str()) {
                    return Err(SchemaError::UnknownCharFilter {
                        analyzer: name.clone(),
                        name: cf.clone(),
                    });
                }
            }
            for f in &analyzer.filter {
                if !self.filter.contains_key(f) && !BUILTIN_TOKEN_FILTERS.contains(&f.as_str()) {
                    return Err(SchemaError::UnknownTokenFilter {
                        analyzer: name.clone(),
                        name: f.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
}

/// Declared type and analysis of one document field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldMapping {
    Long,
    Integer,
    Float,
    /// Exact-match string: not tokenized, sortable.
    Keyword {
        #[serde(skip_serializing_if = "Option::is_none")]
        ignore_above: Option<u32>,
    },
    /// Analyzed string.
    Text {
        analyzer: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        term_vector: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        store: Option<bool>,
    },
}

impl FieldMapping {
    fn keyword() -> Self {
        FieldMapping::Keyword { ignore_above: None }
    }

    fn analyzed(analyzer: &str) -> Self {
        FieldMapping::Text {
            analyzer: analyzer.to_string(),
            term_vector: None,
            store: None,
        }
    }

    pub fn is_exact_match(&self) -> bool {
        matches!(self, FieldMapping::Keyword { .. })
    }

    pub fn analyzer(&self) -> Option<&str> {
        match self {
            FieldMapping::Text { analyzer, .. } => Some(analyzer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexMapping {
    pub properties: BTreeMap<String, FieldMapping>,
}

impl IndexMapping {
    fn field(mut self, name: &str, mapping: FieldMapping) -> Self {
        self.properties.insert(name.to_string(), mapping);
        self
    }
}

/// Everything needed to create one index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexDefinition {
    pub name: String,
    pub settings: IndexSettings,
    pub mapping: IndexMapping,
}

impl IndexDefinition {
    /// Raw value index: exact-match identity fields plus analyzed `text`.
    pub fn text() -> Self {
        let mapping = IndexMapping::default()
            .field("id", FieldMapping::Long)
            .field("datasetName", FieldMapping::keyword())
            .field("path", FieldMapping::keyword())
            .field("sourceName", FieldMapping::keyword())
            .field(
                "columnName",
                FieldMapping::Keyword {
                    ignore_above: Some(512),
                },
            )
            .field(
                "text",
                FieldMapping::Text {
                    analyzer: "english".to_string(),
                    term_vector: Some("yes".to_string()),
                    store: Some(false),
                },
            );
        Self {
            name: TEXT_INDEX.to_string(),
            settings: IndexSettings::default(),
            mapping,
        }
    }

    /// Statistics index: numeric range fields, raw and analyzed names.
    pub fn profile() -> Self {
        let mapping = IndexMapping::default()
            .field("id", FieldMapping::Long)
            .field("datasetName", FieldMapping::keyword())
            .field("path", FieldMapping::keyword())
            .field("sourceNameRaw", FieldMapping::keyword())
            .field("sourceNameAnalyzed", FieldMapping::analyzed(DOMAIN_ANALYZER))
            .field("columnNameRaw", FieldMapping::keyword())
            .field("columnNameAnalyzed", FieldMapping::analyzed(DOMAIN_ANALYZER))
            .field("dataType", FieldMapping::keyword())
            .field("totalValues", FieldMapping::Integer)
            .field("uniqueValues", FieldMapping::Integer)
            .field("entities", FieldMapping::analyzed("standard"))
            .field("minValue", FieldMapping::Float)
            .field("maxValue", FieldMapping::Float)
            .field("avgValue", FieldMapping::Float)
            .field("median", FieldMapping::Long)
            .field("interquartileRange", FieldMapping::Long);
        Self {
            name: PROFILE_INDEX.to_string(),
            settings: IndexSettings {
                analysis: Some(Analysis::domain()),
            },
            mapping,
        }
    }

    fn validate(&self) -> Result<(), SchemaError> {
        if let Some(analysis) = &self.settings.analysis {
            analysis.validate()?;
        }
        for (field, mapping) in &self.mapping.properties {
            let Some(analyzer) = mapping.analyzer() else {
                continue;
            };
            let custom = self
                .settings
                .analysis
                .as_ref()
                .is_some_and(|a| a.analyzer.contains_key(analyzer));
            if !custom && !BUILTIN_ANALYZERS.contains(&analyzer) {
                return Err(SchemaError::UnknownAnalyzer {
                    index: self.name.clone(),
                    field: field.clone(),
                    analyzer: analyzer.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// The full two-index schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub text: IndexDefinition,
    pub profile: IndexDefinition,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            text: IndexDefinition::text(),
            profile: IndexDefinition::profile(),
        }
    }
}

impl Schema {
    /// Check that every analyzer, tokenizer, and filter reference resolves,
    /// either to a definition in the index settings or to an engine built-in.
    pub fn validate(&self) -> Result<(), SchemaError> {
        self.text.validate()?;
        self.profile.validate()
    }
}
