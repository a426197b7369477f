use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::{
    config::NumericMode,
    envelope::Envelope,
    error::{MapperError, Result},
    records::SourceRow,
};

/// Conversion applied to a raw cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Whitespace-trimmed string; absent cells become `""`.
    Trim,
    /// `true` only for a cell reading `true` in any case.
    Flag,
    /// Decimal number accepting `,` as the separator; falls back to `0.0`.
    Decimal,
}

impl Coercion {
    pub fn apply(self, raw: Option<&str>) -> Value {
        match self {
            Coercion::Trim => Value::Text(coerce_trim(raw)),
            Coercion::Flag => Value::Bool(coerce_flag(raw)),
            Coercion::Decimal => Value::Number(coerce_decimal(raw)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Bool(bool),
    Number(f64),
}

pub fn coerce_trim(raw: Option<&str>) -> String {
    raw.unwrap_or_default().trim().to_owned()
}

pub fn coerce_flag(raw: Option<&str>) -> bool {
    raw.unwrap_or_default().trim().to_lowercase() == "true"
}

pub fn coerce_decimal(raw: Option<&str>) -> f64 {
    parse_decimal(raw.unwrap_or("0")).unwrap_or(0.0)
}

// JSON has no representation for NaN or infinities, so those count as
// unparseable too.
fn parse_decimal(raw: &str) -> Option<f64> {
    raw.replace(',', ".")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Maps one input column onto one output key.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub column: String,
    pub key: String,
    pub coercion: Coercion,
}

impl FieldDescriptor {
    pub fn new(column: impl Into<String>, key: impl Into<String>, coercion: Coercion) -> Self {
        Self {
            column: column.into(),
            key: key.into(),
            coercion,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Column(FieldDescriptor),
    /// The same value on every record.
    Constant { key: String, value: String },
    /// `@<target_prefix>Ref<N>` pointing at the record with the same ordinal
    /// in another batch.
    Reference { key: String, target_prefix: String },
}

impl Field {
    pub fn key(&self) -> &str {
        match self {
            Field::Column(descriptor) => &descriptor.key,
            Field::Constant { key, .. } | Field::Reference { key, .. } => key,
        }
    }
}

/// Output shape of one record batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub record_type: String,
    pub ref_prefix: String,
    pub fields: Vec<Field>,
}

pub fn reference_id(prefix: &str, ordinal: usize) -> String {
    format!("{prefix}Ref{ordinal}")
}

pub fn cross_reference(target_prefix: &str, ordinal: usize) -> String {
    format!("@{}", reference_id(target_prefix, ordinal))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attributes {
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(rename = "referenceId")]
    pub reference_id: String,
}

/// A typed record. Serializes as a JSON object with `attributes` first and
/// the remaining keys in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub attributes: Attributes,
    pub fields: Vec<(String, Value)>,
}

#[cfg(test)]
impl OutputRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field_key, _)| field_key == key)
            .map(|(_, value)| value)
    }
}

impl Serialize for OutputRecord {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("attributes", &self.attributes)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Builds the record for the row at 1-based position `ordinal`.
///
/// Never fails: missing columns and unparseable numbers fall back to their
/// defaults.
pub fn build_record(row: &SourceRow, ordinal: usize, schema: &Schema) -> OutputRecord {
    let fields = schema
        .fields
        .iter()
        .map(|field| {
            let value = match field {
                Field::Column(descriptor) => descriptor.coercion.apply(row.get(&descriptor.column)),
                Field::Constant { value, .. } => Value::Text(value.clone()),
                Field::Reference { target_prefix, .. } => {
                    Value::Text(cross_reference(target_prefix, ordinal))
                }
            };
            (field.key().to_owned(), value)
        })
        .collect();

    OutputRecord {
        attributes: Attributes {
            record_type: schema.record_type.clone(),
            reference_id: reference_id(&schema.ref_prefix, ordinal),
        },
        fields,
    }
}

/// Like [`build_record`], but a decimal cell that is present and does not
/// parse is an error instead of `0.0`. Missing decimal columns still
/// default to `0.0`.
pub fn build_record_strict(row: &SourceRow, ordinal: usize, schema: &Schema) -> Result<OutputRecord> {
    for field in &schema.fields {
        let Field::Column(descriptor) = field else {
            continue;
        };
        if descriptor.coercion != Coercion::Decimal {
            continue;
        }
        if let Some(raw) = row.get(&descriptor.column) {
            if parse_decimal(raw).is_none() {
                return Err(MapperError::InvalidNumber {
                    row: ordinal,
                    column: descriptor.column.clone(),
                    value: raw.to_owned(),
                });
            }
        }
    }

    Ok(build_record(row, ordinal, schema))
}

/// Maps `rows` in order, numbering them from 1.
pub fn map_rows(rows: &[SourceRow], schema: &Schema, mode: NumericMode) -> Result<Envelope> {
    let records = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let ordinal = index + 1;
            match mode {
                NumericMode::Lenient => Ok(build_record(row, ordinal, schema)),
                NumericMode::Strict => build_record_strict(row, ordinal, schema),
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Envelope { records })
}
