//! The ERP's paginated list-query envelope.
//!
//! Every `*/list` endpoint takes the same POST body shape and answers with
//! `{ rows, count }`, although some endpoints return a bare array and the
//! discharge endpoint may return a single object. [`rows_of`] flattens all
//! three shapes into a plain list.

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub field_list: Vec<String>,
    pub filter_list: Map<String, Value>,
    pub page_number: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    pub order_list: OrderList,
}

impl ListQuery {
    pub fn new(service_name: &str) -> Self {
        Self {
            field_list: Vec::new(),
            filter_list: Map::new(),
            page_number: 1,
            page_size: 100,
            service_name: Some(service_name.to_string()),
            order_list: OrderList::default(),
        }
    }

    pub fn filter(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.filter_list.insert(key.to_string(), value.into());
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn order_by(mut self, property: &str, order: &str) -> Self {
        self.order_list.order_list = vec![OrderEntry {
            property_name: property.to_string(),
            order: order.to_string(),
        }];
        self
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderList {
    pub order_list: Vec<OrderEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEntry {
    pub property_name: String,
    pub order: String,
}

/// Normalizes a list-ish response body into a row list.
///
/// Accepts `{ rows: [...] }`, a bare array, a single object (one row), or
/// null/absent (no rows).
pub fn rows_of(value: Value) -> Vec<Value> {
    match value {
        Value::Array(rows) => rows,
        Value::Object(mut map) => match map.remove("rows") {
            Some(Value::Array(rows)) => rows,
            Some(Value::Null) | None => vec![Value::Object(map)],
            Some(other) => vec![other],
        },
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paginated_rows_are_unwrapped() {
        let rows = rows_of(json!({ "rows": [{"a": 1}, {"a": 2}], "count": 2 }));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn bare_arrays_pass_through() {
        let rows = rows_of(json!([{"a": 1}]));
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn single_objects_become_one_row() {
        let rows = rows_of(json!({"bxaMnyValor": 100.0}));
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn null_is_empty() {
        assert!(rows_of(Value::Null).is_empty());
    }

    #[test]
    fn envelope_serializes_with_camel_case_keys() {
        let query = ListQuery::new("psq015")
            .filter("fPriCod#EQ", 4711)
            .order_by("filCod", "asc");
        let body = serde_json::to_value(&query).unwrap();

        assert_eq!(body["serviceName"], "psq015");
        assert_eq!(body["filterList"]["fPriCod#EQ"], 4711);
        assert_eq!(body["orderList"]["orderList"][0]["propertyName"], "filCod");
    }
}
