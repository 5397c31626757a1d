//! Fleet vehicles.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::SecuredRecord;

/// Availability of a vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    #[default]
    Available,
    Rented,
    Maintenance,
    OutOfService,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceDetails {
    pub provider: String,
    pub policy_number: String,
    pub coverage: String,
    pub expires_on: NaiveDate,
}

/// One service or repair entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub date: NaiveDate,
    pub mileage: u32,
    pub description: String,
    pub cost: f64,
}

/// A vehicle of the rental fleet.
///
/// VIN, insurance and maintenance history are encrypted at rest; the rest is
/// needed in plaintext for listings and the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub brand: String,
    pub model: String,
    pub year: u16,
    pub license_plate: String,
    #[serde(default)]
    pub status: VehicleStatus,
    #[serde(default)]
    pub mileage: u32,
    #[serde(default)]
    pub daily_rate: f64,
    #[serde(default)]
    pub vin: String,
    #[serde(default)]
    pub insurance: Option<InsuranceDetails>,
    #[serde(default)]
    pub maintenance_records: Vec<MaintenanceRecord>,
}

/// Partial update of a [`Vehicle`]. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VehiclePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VehicleStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance: Option<InsuranceDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_records: Option<Vec<MaintenanceRecord>>,
}

impl SecuredRecord for Vehicle {
    const COLLECTION: &'static str = "vehicles";

    const SENSITIVE_FIELDS: &'static [&'static str] = &["vin", "insurance", "maintenance_records"];

    type Patch = VehiclePatch;

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample() -> Vehicle {
        Vehicle {
            id: "v1".into(),
            brand: "Renault".into(),
            model: "Clio".into(),
            year: 2022,
            license_plate: "AB-123-CD".into(),
            status: VehicleStatus::Available,
            mileage: 24_500,
            daily_rate: 39.9,
            vin: "VF1RJA00768123456".into(),
            insurance: Some(InsuranceDetails {
                provider: "AXA".into(),
                policy_number: "POL-2022-0042".into(),
                coverage: "comprehensive".into(),
                expires_on: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            }),
            maintenance_records: vec![MaintenanceRecord {
                date: NaiveDate::from_ymd_opt(2024, 5, 14).unwrap(),
                mileage: 20_000,
                description: "oil change".into(),
                cost: 129.5,
            }],
        }
    }

    #[test]
    fn status_uses_snake_case() {
        let v = serde_json::to_value(VehicleStatus::OutOfService).unwrap();
        assert_eq!(v, "out_of_service");
    }

    #[test]
    fn patch_skips_unset_fields() {
        let patch = VehiclePatch {
            mileage: Some(25_000),
            status: Some(VehicleStatus::Rented),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, serde_json::json!({"mileage": 25000, "status": "rented"}));

        let identity = VehiclePatch {
            brand: Some("Peugeot".into()),
            model: Some("208".into()),
            year: Some(2023),
            ..Default::default()
        };
        let value = serde_json::to_value(&identity).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"brand": "Peugeot", "model": "208", "year": 2023})
        );
    }
}
