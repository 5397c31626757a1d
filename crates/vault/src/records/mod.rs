//! Record types stored through the secured store.
//!
//! Each type declares, once, the collection it lives in and the set of fields
//! that are encrypted at rest. The store encrypts and decrypts exactly that
//! set and never touches any other field.

pub mod customer;
pub mod vehicle;

pub use customer::{Address, BankDetails, Customer, CustomerPatch};
pub use vehicle::{InsuranceDetails, MaintenanceRecord, Vehicle, VehiclePatch, VehicleStatus};

use serde::{de::DeserializeOwned, Serialize};

/// A record type with a fixed schema and a declared set of sensitive fields.
pub trait SecuredRecord: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Document-store collection holding records of this type.
    const COLLECTION: &'static str;

    /// Top-level fields encrypted at rest.
    const SENSITIVE_FIELDS: &'static [&'static str];

    /// Partial update type. Fields set to `None` must not be serialised.
    type Patch: Serialize + Send + Sync;

    /// The record's own identifier, used as the document key.
    fn id(&self) -> &str;
}

/// Generate a fresh random record identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn sensitive_fields_exist_on_the_schema() {
        fn check<R: SecuredRecord>(sample: &R) {
            let value = serde_json::to_value(sample).unwrap();
            for field in R::SENSITIVE_FIELDS {
                assert!(
                    value.get(field).is_some(),
                    "{} has no field `{field}`",
                    R::COLLECTION
                );
            }
        }
        check(&customer::tests::sample());
        check(&vehicle::tests::sample());
    }
}
