use crate::enums::UserRole;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A cargo customer, identified externally by its `client_code` business key.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i64,
    pub client_code: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A consigned unit of cargo tied to one client.
///
/// The monetary fields are IEEE-754 doubles end to end: JSON numbers map to
/// `f64`, which maps to `DOUBLE PRECISION` columns. `amount_kzt` and `margin`
/// may be supplied by the caller or filled in by the ledger derivation.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub client_id: i64,
    pub product_code: String,
    pub arrival_date: NaiveDate,
    pub quantity: i32,
    pub weight: Option<f64>,
    pub price_usd: Option<f64>,
    pub exchange_rate: Option<f64>,
    pub amount_kzt: Option<f64>,
    pub cost_price: Option<f64>,
    pub margin: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A daily conversion rate between two currencies (normally USD -> KZT).
/// At most one logical rate exists per (from, to, date) triple.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub id: i64,
    pub currency_from: String,
    pub currency_to: String,
    pub rate: f64,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// A staff or client-portal account. Never serialized directly; API responses
/// use [`UserProfile`] so the password hash stays server-side.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub client_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// The public view of a [`User`], returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            client_id: user.client_id,
            created_at: user.created_at,
        }
    }
}

/// The validated payload for creating or replacing a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    pub client_code: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// The validated payload for creating or replacing an item.
///
/// Absence of an optional field means the caller did not send it at all;
/// a supplied value (including `0`) is an explicit override that the
/// ledger derivation must never recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub client_id: i64,
    pub product_code: String,
    pub arrival_date: NaiveDate,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    pub weight: Option<f64>,
    pub price_usd: Option<f64>,
    pub exchange_rate: Option<f64>,
    pub amount_kzt: Option<f64>,
    pub cost_price: Option<f64>,
    pub margin: Option<f64>,
    pub notes: Option<String>,
}

fn default_quantity() -> i32 {
    1
}

/// The validated payload for recording an exchange rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExchangeRate {
    #[serde(default = "default_currency_from")]
    pub currency_from: String,
    #[serde(default = "default_currency_to")]
    pub currency_to: String,
    pub rate: f64,
    pub date: NaiveDate,
}

fn default_currency_from() -> String {
    "USD".to_string()
}

fn default_currency_to() -> String {
    "KZT".to_string()
}

/// An account ready to be persisted; built by the auth handlers after
/// validation and password hashing.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub client_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_serializes_with_camel_case_keys() {
        let item = Item {
            id: 7,
            client_id: 3,
            product_code: "PC-100".to_string(),
            arrival_date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            quantity: 2,
            weight: Some(1.5),
            price_usd: Some(10.0),
            exchange_rate: Some(450.0),
            amount_kzt: Some(4500.0),
            cost_price: None,
            margin: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["clientId"], json!(3));
        assert_eq!(value["productCode"], json!("PC-100"));
        assert_eq!(value["arrivalDate"], json!("2024-03-05"));
        assert_eq!(value["amountKzt"], json!(4500.0));
        assert_eq!(value["costPrice"], serde_json::Value::Null);
    }

    #[test]
    fn item_draft_defaults_quantity_to_one() {
        let draft: ItemDraft = serde_json::from_value(json!({
            "clientId": 1,
            "productCode": "PC-1",
            "arrivalDate": "2024-01-15"
        }))
        .unwrap();

        assert_eq!(draft.quantity, 1);
        assert!(draft.price_usd.is_none());
        assert!(draft.amount_kzt.is_none());
    }

    #[test]
    fn new_exchange_rate_defaults_to_usd_kzt() {
        let rate: NewExchangeRate = serde_json::from_value(json!({
            "rate": 449.5,
            "date": "2024-02-01"
        }))
        .unwrap();

        assert_eq!(rate.currency_from, "USD");
        assert_eq!(rate.currency_to, "KZT");
    }

    #[test]
    fn user_role_round_trips_through_storage_form() {
        for role in [UserRole::Admin, UserRole::User, UserRole::Client] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("superuser".parse::<UserRole>().is_err());
    }
}
