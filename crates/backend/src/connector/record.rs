use super::error::ConnectorError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub use contracts::domain::a001_salesforce_backend::aggregate::RecordId;

/// Словарь полей для записи в ERP
pub type FieldMap = BTreeMap<String, Value>;

/// Плоская запись Salesforce в том виде, в котором её отдаёт REST API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SalesforceRecord(Map<String, Value>);

impl SalesforceRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn from_value(value: Value) -> Result<Self, ConnectorError> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(ConnectorError::Api(format!(
                "Expected a JSON object for a Salesforce record, got {}",
                other
            ))),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.str_field("Id")
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Непустая строка
    pub fn str_field(&self, field: &str) -> Option<&str> {
        match self.0.get(field) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Числовое значение (SOAP-подобные ответы иногда отдают числа строками)
    pub fn number(&self, field: &str) -> Option<f64> {
        match self.0.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_truthy(&self, field: &str) -> bool {
        self.0.get(field).map(is_truthy).unwrap_or(false)
    }

    /// Поля, имя которых начинается с префикса (например, `Shipping`)
    pub fn fields_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.0
            .iter()
            .filter(move |(name, _)| name.starts_with(prefix))
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }
}

impl From<Map<String, Value>> for SalesforceRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Истинность значения: null, false, 0, "" и пустые коллекции: ложь
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Id из many2one: либо число, либо пара `[id, "name"]`
pub fn many2one_id(value: &Value) -> Option<RecordId> {
    match value {
        Value::Number(n) => n.as_i64().filter(|id| *id > 0),
        Value::Array(pair) => pair.first().and_then(many2one_id),
        _ => None,
    }
}

/// Значение реляционного поля для записи в ERP (`false`: пусто)
pub fn relation_value(id: Option<RecordId>) -> Value {
    match id {
        Some(id) => Value::from(id),
        None => Value::Bool(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> SalesforceRecord {
        SalesforceRecord::from_value(value).unwrap()
    }

    #[test]
    fn test_truthiness_follows_empty_values() {
        let rec = record(json!({
            "Empty": "",
            "Zero": 0,
            "ZeroFloat": 0.0,
            "Null": null,
            "False": false,
            "Text": "x",
            "Qty": 2.5,
            "Nested": {"Product2Id": "01t"},
            "NoNested": {}
        }));
        for field in ["Empty", "Zero", "ZeroFloat", "Null", "False", "NoNested", "Missing"] {
            assert!(!rec.is_truthy(field), "{} must be falsy", field);
        }
        for field in ["Text", "Qty", "Nested"] {
            assert!(rec.is_truthy(field), "{} must be truthy", field);
        }
    }

    #[test]
    fn test_number_accepts_numeric_strings() {
        let rec = record(json!({"A": 3, "B": "4.5", "C": "n/a"}));
        assert_eq!(rec.number("A"), Some(3.0));
        assert_eq!(rec.number("B"), Some(4.5));
        assert_eq!(rec.number("C"), None);
        assert_eq!(rec.number("D"), None);
    }

    #[test]
    fn test_fields_with_prefix() {
        let rec = record(json!({
            "ShippingCity": "Lausanne",
            "ShippingStreet": null,
            "BillingCity": "Bern"
        }));
        let mut names: Vec<&str> = rec.fields_with_prefix("Shipping").map(|(n, _)| n).collect();
        names.sort();
        assert_eq!(names, vec!["ShippingCity", "ShippingStreet"]);
    }

    #[test]
    fn test_many2one_id_accepts_pairs() {
        assert_eq!(many2one_id(&json!(12)), Some(12));
        assert_eq!(many2one_id(&json!([12, "Public Pricelist"])), Some(12));
        assert_eq!(many2one_id(&json!(false)), None);
        assert_eq!(many2one_id(&json!(0)), None);
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(SalesforceRecord::from_value(json!([1, 2])).is_err());
    }
}
