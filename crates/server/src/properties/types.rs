//! Row, request, and extraction types for normalized property records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Row from the `properties` table.
#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct Property {
    /// External listing identifier (unique).
    pub id: String,
    pub source_id: Uuid,
    pub city: String,
    pub availability: bool,
    pub price: f64,
    /// Original raw item, retained verbatim for provenance.
    #[schema(value_type = Object)]
    pub raw_data: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A record ready to persist: the mapping engine's output narrowed to the
/// persisted column set, plus provenance.
#[derive(Debug, Clone)]
pub struct NewProperty {
    pub id: String,
    pub source_id: Uuid,
    pub city: String,
    pub availability: bool,
    pub price: f64,
    pub raw_data: Option<Value>,
}

impl NewProperty {
    /// Extract the persisted columns from a mapped-fields object.
    ///
    /// The mapping engine performs no validation, so this is where a schema
    /// that fails to yield `id`, `city`, `availability`, and `price`
    /// finally surfaces — as a persist failure scoped to the item's source.
    pub fn from_mapped(
        mapped: &Value,
        source_id: Uuid,
        raw_data: Value,
    ) -> Result<Self, String> {
        let id = mapped
            .get("id")
            .and_then(Value::as_str)
            .ok_or("mapped record is missing string field 'id'")?
            .to_string();
        let city = mapped
            .get("city")
            .and_then(Value::as_str)
            .ok_or("mapped record is missing string field 'city'")?
            .to_string();
        let availability = mapped
            .get("availability")
            .and_then(Value::as_bool)
            .ok_or("mapped record is missing boolean field 'availability'")?;
        let price = mapped
            .get("price")
            .and_then(Value::as_f64)
            .ok_or("mapped record is missing numeric field 'price'")?;

        Ok(Self {
            id,
            source_id,
            city,
            availability,
            price,
            raw_data: Some(raw_data),
        })
    }
}

/// Request body for creating a property directly via the API.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProperty {
    pub id: String,
    pub source_id: Uuid,
    pub city: String,
    pub availability: bool,
    pub price: f64,
    #[schema(value_type = Object)]
    pub raw_data: Option<Value>,
}

impl From<CreateProperty> for NewProperty {
    fn from(req: CreateProperty) -> Self {
        Self {
            id: req.id,
            source_id: req.source_id,
            city: req.city,
            availability: req.availability,
            price: req.price,
            raw_data: req.raw_data,
        }
    }
}

/// Request body for updating a property (all fields optional).
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProperty {
    pub source_id: Option<Uuid>,
    pub city: Option<String>,
    pub availability: Option<bool>,
    pub price: Option<f64>,
    #[schema(value_type = Object)]
    pub raw_data: Option<Value>,
}

/// Flexible filter set for `POST /api/properties/query`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PropertyQuery {
    pub id: Option<String>,
    pub source_id: Option<Uuid>,
    /// Case-insensitive substring match.
    pub city: Option<String>,
    pub availability: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

/// Simple filters accepted by `GET /api/properties`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListPropertiesParams {
    pub city: Option<String>,
    pub availability: Option<bool>,
    pub source_id: Option<Uuid>,
}

/// Aggregate statistics over all persisted properties.
#[derive(Debug, Serialize, ToSchema)]
pub struct PropertyStatistics {
    pub total: i64,
    pub available: i64,
    pub unavailable: i64,
    pub average_price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_mapped_complete() {
        let mapped = json!({
            "id": "L-1", "city": "Berlin", "availability": true, "price": 99.0
        });
        let raw = json!({ "listing": { "id": "L-1" } });
        let source_id = Uuid::new_v4();
        let prop = NewProperty::from_mapped(&mapped, source_id, raw.clone()).unwrap();
        assert_eq!(prop.id, "L-1");
        assert_eq!(prop.city, "Berlin");
        assert!(prop.availability);
        assert_eq!(prop.price, 99.0);
        assert_eq!(prop.source_id, source_id);
        assert_eq!(prop.raw_data, Some(raw));
    }

    #[test]
    fn test_from_mapped_missing_field() {
        let mapped = json!({ "id": "L-1", "city": "Berlin", "availability": true });
        let err = NewProperty::from_mapped(&mapped, Uuid::new_v4(), json!({})).unwrap_err();
        assert!(err.contains("price"));
    }

    #[test]
    fn test_from_mapped_wrong_type() {
        let mapped = json!({
            "id": "L-1", "city": "Berlin", "availability": "yes", "price": 10
        });
        let err = NewProperty::from_mapped(&mapped, Uuid::new_v4(), json!({})).unwrap_err();
        assert!(err.contains("availability"));
    }

    #[test]
    fn test_from_mapped_integer_price_accepted() {
        let mapped = json!({
            "id": "L-1", "city": "Berlin", "availability": false, "price": 250
        });
        let prop = NewProperty::from_mapped(&mapped, Uuid::new_v4(), json!({})).unwrap();
        assert_eq!(prop.price, 250.0);
        assert!(!prop.availability);
    }

    #[test]
    fn test_query_deserializes_empty_body() {
        let q: PropertyQuery = serde_json::from_str("{}").unwrap();
        assert!(q.id.is_none());
        assert!(q.min_price.is_none());
    }
}
