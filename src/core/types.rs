use std::collections::{BTreeMap, BTreeSet};
use serde::{Deserialize, Serialize};

/// Multimap keyed by assay accession (or any other string key) with set
/// semantics on the values.
pub type SetMultimap = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Texts(Vec<String>),
}

impl FieldValue {
    /// Every textual rendering of the value; multi-valued fields yield one
    /// entry per value.
    pub fn as_texts(&self) -> Vec<String> {
        match self {
            FieldValue::Text(text) => vec![text.clone()],
            FieldValue::Number(number) => vec![number.to_string()],
            FieldValue::Boolean(flag) => vec![flag.to_string()],
            FieldValue::Texts(texts) => texts.clone(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(number) => Some(*number),
            FieldValue::Text(text) => text.parse().ok(),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

impl From<f64> for FieldValue {
    fn from(number: f64) -> Self {
        FieldValue::Number(number)
    }
}

/// Flat property bag handed to the engine. Serializes to a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexableDocument {
    pub fields: BTreeMap<String, FieldValue>,
}

impl IndexableDocument {
    pub fn new() -> Self {
        IndexableDocument { fields: BTreeMap::new() }
    }

    pub fn add_field(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Adds a multi-valued field; empty value sets are not stored.
    pub fn add_texts<I, S>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if !values.is_empty() {
            self.fields.insert(name.into(), FieldValue::Texts(values));
        }
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.add_field(name, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_serializes_as_flat_object() {
        let mut doc = IndexableDocument::new();
        doc.add_field("experiment_accession", "E-TEST-1");
        doc.add_field("expression_level", 12.5);
        doc.add_texts("conditions_search", ["liver", "UBERON:0002107"]);

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["experiment_accession"], "E-TEST-1");
        assert_eq!(json["expression_level"], 12.5);
        assert_eq!(json["conditions_search"][1], "UBERON:0002107");
    }

    #[test]
    fn empty_multi_value_is_not_stored() {
        let mut doc = IndexableDocument::new();
        doc.add_texts("conditions_search", Vec::<String>::new());
        assert!(doc.get_field("conditions_search").is_none());
    }
}
