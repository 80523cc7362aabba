// Dataset domain model: flat records fetched from a source
use super::errors::{FetchError, MalformedDateError};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Format every date field is parsed with.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single cell of a flat record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    Date(NaiveDate),
}

impl FieldValue {
    fn describe(&self) -> String {
        match self {
            FieldValue::Null => "null".to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => format!("\"{}\"", s),
            FieldValue::Date(d) => d.to_string(),
        }
    }
}

pub type Record = BTreeMap<String, FieldValue>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub source: String,
    pub records: Vec<Record>,
    /// Records dropped while converting the date field.
    #[serde(skip)]
    pub rejected: Vec<MalformedDateError>,
}

impl Dataset {
    pub fn new(source: String, records: Vec<Record>) -> Self {
        Self {
            source,
            records,
            rejected: Vec::new(),
        }
    }

    /// Build a dataset from a JSON payload, which must be an array of flat objects.
    pub fn from_json(source: &str, payload: serde_json::Value) -> Result<Self, FetchError> {
        let invalid = |reason: String| FetchError::InvalidPayload {
            source_name: source.to_string(),
            reason,
        };

        let serde_json::Value::Array(rows) = payload else {
            return Err(invalid("expected an array of records".to_string()));
        };

        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            let serde_json::Value::Object(fields) = row else {
                return Err(invalid(format!("record {} is not an object", index)));
            };

            let mut record = Record::new();
            for (name, value) in fields {
                let cell = match value {
                    serde_json::Value::Null => FieldValue::Null,
                    serde_json::Value::Bool(b) => FieldValue::Bool(b),
                    serde_json::Value::Number(n) => FieldValue::Number(n),
                    serde_json::Value::String(s) => FieldValue::Text(s),
                    _ => {
                        return Err(invalid(format!(
                            "record {} field '{}' is not a flat value",
                            index, name
                        )));
                    }
                };
                record.insert(name, cell);
            }
            records.push(record);
        }

        Ok(Self::new(source.to_string(), records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replace the string at `field` with a parsed date in every record.
    ///
    /// Records whose value is missing or does not match [`DATE_FORMAT`] are
    /// dropped and reported in `rejected`. Values that already hold a date are
    /// kept as they are, so converting twice changes nothing.
    pub fn convert_dates(self, field: &str) -> Self {
        let Dataset {
            source,
            records,
            mut rejected,
        } = self;

        let mut kept = Vec::with_capacity(records.len());
        for (record_index, mut record) in records.into_iter().enumerate() {
            let parsed = match record.get(field) {
                Some(FieldValue::Text(s)) => NaiveDate::parse_from_str(s, DATE_FORMAT)
                    .map_err(|_| FieldValue::Text(s.clone())),
                Some(FieldValue::Date(date)) => Ok(*date),
                Some(other) => Err(other.clone()),
                None => Err(FieldValue::Null),
            };

            match parsed {
                Ok(date) => {
                    record.insert(field.to_string(), FieldValue::Date(date));
                    kept.push(record);
                }
                Err(value) => rejected.push(MalformedDateError {
                    source_name: source.clone(),
                    record_index,
                    field: field.to_string(),
                    value: value.describe(),
                }),
            }
        }

        Self {
            source,
            records: kept,
            rejected,
        }
    }
}
