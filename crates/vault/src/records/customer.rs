//! Rental customers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::SecuredRecord;

/// Postal address of a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

/// Bank account used for deposits and refunds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub iban: String,
    pub bic: String,
    #[serde(default)]
    pub account_holder: Option<String>,
}

/// A rental customer.
///
/// Contact data, identity documents and bank details are encrypted at rest;
/// names and date of birth stay searchable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub driving_license_number: String,
    #[serde(default)]
    pub id_card_number: Option<String>,
    #[serde(default)]
    pub bank_details: Option<BankDetails>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update of a [`Customer`]. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driving_license_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_card_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<BankDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SecuredRecord for Customer {
    const COLLECTION: &'static str = "customers";

    const SENSITIVE_FIELDS: &'static [&'static str] = &[
        "email",
        "phone",
        "address",
        "driving_license_number",
        "id_card_number",
        "bank_details",
    ];

    type Patch = CustomerPatch;

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample() -> Customer {
        Customer {
            id: "c1".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 12, 10),
            email: "a@b.com".into(),
            phone: "+33 6 12 34 56 78".into(),
            address: Some(Address {
                street: "12 rue de la Paix".into(),
                postal_code: "75002".into(),
                city: "Paris".into(),
                country: "FR".into(),
            }),
            driving_license_number: "DL-123456".into(),
            id_card_number: Some("ID-987654".into()),
            bank_details: Some(BankDetails {
                iban: "FR7630006000011234567890189".into(),
                bic: "AGRIFRPP".into(),
                account_holder: None,
            }),
            notes: None,
        }
    }

    #[test]
    fn patch_skips_unset_fields() {
        let patch = CustomerPatch {
            phone: Some("0600000000".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, serde_json::json!({"phone": "0600000000"}));
    }

    #[test]
    fn missing_optional_fields_deserialise() {
        let c: Customer = serde_json::from_value(serde_json::json!({
            "id": "c2",
            "first_name": "Grace",
            "last_name": "Hopper"
        }))
        .unwrap();
        assert_eq!(c.email, "");
        assert!(c.bank_details.is_none());
    }
}
