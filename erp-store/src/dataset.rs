//! Raw dataset documents loaded into the store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::StoreResult;

/// Un-normalized source data for a [`LookupStore`](crate::LookupStore).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dataset {
    /// Product name to stock balance.
    #[serde(default)]
    pub products: BTreeMap<String, i64>,
    /// Counterparty name to outstanding debt.
    #[serde(default)]
    pub counterparties: BTreeMap<String, f64>,
}

impl Dataset {
    /// The fixed back-office snapshot the assistant ships with.
    #[must_use]
    pub fn builtin() -> Self {
        let products = [
            ("стол офисный модель а", 152),
            ("стул офисный стандарт", 312),
            ("монитор 24 дюйма", 88),
            ("клавиатура беспроводная", 210),
        ];
        let counterparties = [
            ("ооо ромашка", 125_430.50),
            ("ооо лютик", 0.0),
            ("ип васильев", 30_000.00),
        ];

        Self {
            products: products
                .into_iter()
                .map(|(name, balance)| (name.to_owned(), balance))
                .collect(),
            counterparties: counterparties
                .into_iter()
                .map(|(name, debt)| (name.to_owned(), debt))
                .collect(),
        }
    }

    /// Decodes a dataset from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`](crate::StoreError::Decode) when the
    /// document is malformed or carries unknown sections.
    pub fn from_json(raw: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_expected_cardinality() {
        let dataset = Dataset::builtin();
        assert_eq!(dataset.products.len(), 4);
        assert_eq!(dataset.counterparties.len(), 3);
    }

    #[test]
    fn decodes_partial_documents() {
        let dataset = Dataset::from_json(r#"{"products": {"Лампа": 3}}"#).expect("decode");
        assert_eq!(dataset.products.get("Лампа"), Some(&3));
        assert!(dataset.counterparties.is_empty());
    }

    #[test]
    fn rejects_unknown_sections() {
        let err = Dataset::from_json(r#"{"warehouses": {}}"#).expect_err("should fail");
        assert!(matches!(err, crate::StoreError::Decode { .. }));
    }
}
