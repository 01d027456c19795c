//! # Part Records
//!
//! Fixed column layout of a category worksheet and the request payload that
//! creates or edits a row.

use serde_json::{Map, Value};

use super::errors::{InventoryError, InventoryResult};
use crate::sheets::store::cell_text;
use crate::sheets::Record;

/// Body key naming the target worksheet
pub const CATEGORY_KEY: &str = "categoria";

/// Header row of a category worksheet
pub const HEADER: [&str; 8] = [
    "id",
    "peca",
    "quantidade",
    "material",
    "massa(g)",
    "valor($)",
    "descricao",
    "fornecedor",
];

/// The eight part columns, in worksheet order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartField {
    Id,
    Name,
    Quantity,
    Material,
    Mass,
    Value,
    Description,
    Supplier,
}

impl PartField {
    pub const ALL: [PartField; 8] = [
        PartField::Id,
        PartField::Name,
        PartField::Quantity,
        PartField::Material,
        PartField::Mass,
        PartField::Value,
        PartField::Description,
        PartField::Supplier,
    ];

    /// Fields a free-text search looks at
    pub const SEARCHABLE: [PartField; 5] = [
        PartField::Id,
        PartField::Name,
        PartField::Material,
        PartField::Description,
        PartField::Supplier,
    ];

    /// Header name and JSON body key
    pub fn key(&self) -> &'static str {
        match self {
            PartField::Id => "id",
            PartField::Name => "peca",
            PartField::Quantity => "quantidade",
            PartField::Material => "material",
            PartField::Mass => "massa(g)",
            PartField::Value => "valor($)",
            PartField::Description => "descricao",
            PartField::Supplier => "fornecedor",
        }
    }

    /// 1-based worksheet column
    pub fn column(&self) -> usize {
        match self {
            PartField::Id => 1,
            PartField::Name => 2,
            PartField::Quantity => 3,
            PartField::Material => 4,
            PartField::Mass => 5,
            PartField::Value => 6,
            PartField::Description => 7,
            PartField::Supplier => 8,
        }
    }
}

/// Look up a field in a record, matching the header case-insensitively
pub fn record_field<'a>(record: &'a Record, field: PartField) -> Option<&'a Value> {
    record
        .iter()
        .find(|(header, _)| header.trim().eq_ignore_ascii_case(field.key()))
        .map(|(_, value)| value)
}

/// A record's identifier as text ("" when the column is missing)
pub fn record_id(record: &Record) -> String {
    record_field(record, PartField::Id)
        .map(cell_text)
        .unwrap_or_default()
}

/// Body of a create, update or delete request
#[derive(Debug, Clone)]
pub struct PartPayload {
    category: String,
    fields: Map<String, Value>,
}

impl PartPayload {
    /// Validate a request body: it must be an object with a non-blank `categoria`
    pub fn from_json(body: Value) -> InventoryResult<Self> {
        let Value::Object(mut fields) = body else {
            return Err(InventoryError::InvalidInput(
                "Corpo da requisição deve ser um objeto JSON".to_string(),
            ));
        };

        let category = match fields.remove(CATEGORY_KEY) {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            _ => {
                return Err(InventoryError::InvalidInput(
                    "Campo 'categoria' é obrigatório".to_string(),
                ))
            }
        };

        Ok(Self { category, fields })
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Full row for a new part; absent fields become empty cells
    pub fn new_row(&self, id: &str) -> Vec<String> {
        PartField::ALL
            .iter()
            .map(|field| match field {
                PartField::Id => id.to_string(),
                other => self
                    .fields
                    .get(other.key())
                    .map(cell_text)
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// Recognized fields present in the body, with the text to write.
    /// Unknown keys are ignored.
    pub fn updates(&self) -> Vec<(PartField, String)> {
        PartField::ALL
            .iter()
            .filter_map(|field| {
                self.fields
                    .get(field.key())
                    .map(|value| (*field, cell_text(value)))
            })
            .collect()
    }
}
