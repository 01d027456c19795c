//! Free-text filtering of part records.

use super::part::{record_field, PartField};
use crate::sheets::store::cell_text;
use crate::sheets::Record;

/// Normalize the raw `busca` parameter; blank means "no filter"
pub fn normalize_query(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase)
}

/// Whether `query` (already lowercased) occurs in any searchable field
pub fn matches(record: &Record, query: &str) -> bool {
    PartField::SEARCHABLE.iter().any(|field| {
        record_field(record, *field)
            .map(|value| cell_text(value).to_lowercase().contains(query))
            .unwrap_or(false)
    })
}

/// Keep the records matching `query`; everything when there is no query
pub fn filter_records(records: Vec<Record>, query: Option<&str>) -> Vec<Record> {
    match query {
        Some(q) => records.into_iter().filter(|r| matches(r, q)).collect(),
        None => records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Vec<Record> {
        vec![
            json!({"id": 1, "peca": "Disco de freio", "quantidade": 4, "material": "Ferro fundido",
                   "descricao": "Dianteiro", "fornecedor": "Bosch"}),
            json!({"id": 2, "peca": "Pastilha", "quantidade": 8, "material": "Cerâmica",
                   "descricao": "Jogo com 4", "fornecedor": "Cobreq"}),
            json!({"id": "FRS-013", "peca": "Cabo", "quantidade": 1, "material": "Aço",
                   "descricao": "", "fornecedor": "Fras-le"}),
        ]
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap())
        .collect()
    }

    fn ids(records: &[Record]) -> Vec<String> {
        records.iter().map(crate::inventory::part::record_id).collect()
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query(None), None);
        assert_eq!(normalize_query(Some("   ")), None);
        assert_eq!(normalize_query(Some(" DiSCO ")), Some("disco".to_string()));
    }

    #[test]
    fn test_no_query_keeps_everything() {
        assert_eq!(filter_records(records(), None).len(), 3);
    }

    #[test]
    fn test_case_insensitive_match_on_each_field() {
        assert_eq!(ids(&filter_records(records(), Some("disco"))), vec!["1"]);
        assert_eq!(ids(&filter_records(records(), Some("cerâmica"))), vec!["2"]);
        assert_eq!(ids(&filter_records(records(), Some("dianteiro"))), vec!["1"]);
        assert_eq!(ids(&filter_records(records(), Some("fras"))), vec!["FRS-013"]);
        assert_eq!(ids(&filter_records(records(), Some("frs-0"))), vec!["FRS-013"]);
    }

    #[test]
    fn test_numeric_id_is_stringified() {
        assert_eq!(ids(&filter_records(records(), Some("2"))), vec!["2"]);
    }

    #[test]
    fn test_quantity_is_not_searched() {
        assert!(filter_records(records(), Some("8")).is_empty());
    }
}
