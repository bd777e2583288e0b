//! Immutable lookup store keyed by normalized entity names.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use erp_primitives::{EntityKey, EntityKind};
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::{StoreError, StoreResult};

/// Two independent keyed collections of business facts.
///
/// The store has no mutating operations; once built it answers point
/// queries only.
#[derive(Debug, Clone, Default)]
pub struct LookupStore {
    products: HashMap<EntityKey, i64>,
    counterparties: HashMap<EntityKey, f64>,
}

impl LookupStore {
    /// Builds a store from the supplied dataset, normalizing every key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateKey`] when two entries of one collection
    /// normalize to the same key, or [`StoreError::InvalidValue`] for a
    /// non-finite debt.
    pub fn from_dataset(dataset: &Dataset) -> StoreResult<Self> {
        let products = index(EntityKind::Product, &dataset.products, |_| Ok(()))?;
        let counterparties = index(EntityKind::Counterparty, &dataset.counterparties, |debt| {
            if debt.is_finite() {
                Ok(())
            } else {
                Err("debt must be a finite number")
            }
        })?;

        debug!(
            products = products.len(),
            counterparties = counterparties.len(),
            "lookup store built"
        );

        Ok(Self {
            products,
            counterparties,
        })
    }

    /// Builds a store over [`Dataset::builtin`].
    ///
    /// # Errors
    ///
    /// Propagates [`LookupStore::from_dataset`] failures.
    pub fn builtin() -> StoreResult<Self> {
        Self::from_dataset(&Dataset::builtin())
    }

    /// Returns the stock balance recorded for `product_name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no product matches the
    /// normalized name.
    pub fn stock_balance(&self, product_name: &str) -> StoreResult<i64> {
        let key = EntityKey::new(product_name);
        self.products
            .get(&key)
            .copied()
            .ok_or(StoreError::NotFound {
                kind: EntityKind::Product,
                key,
            })
    }

    /// Returns the outstanding debt of `counterparty_name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no counterparty matches the
    /// normalized name.
    pub fn counterparty_debt(&self, counterparty_name: &str) -> StoreResult<f64> {
        let key = EntityKey::new(counterparty_name);
        self.counterparties
            .get(&key)
            .copied()
            .ok_or(StoreError::NotFound {
                kind: EntityKind::Counterparty,
                key,
            })
    }

    /// Number of products held.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Number of counterparties held.
    #[must_use]
    pub fn counterparty_count(&self) -> usize {
        self.counterparties.len()
    }
}

fn index<V, F>(
    kind: EntityKind,
    source: &BTreeMap<String, V>,
    check: F,
) -> StoreResult<HashMap<EntityKey, V>>
where
    V: Copy,
    F: Fn(V) -> Result<(), &'static str>,
{
    let mut out = HashMap::with_capacity(source.len());
    for (raw, value) in source {
        let key = EntityKey::new(raw);
        if let Err(reason) = check(*value) {
            return Err(StoreError::InvalidValue { kind, key, reason });
        }
        match out.entry(key) {
            Entry::Occupied(entry) => {
                return Err(StoreError::DuplicateKey {
                    kind,
                    key: entry.key().clone(),
                });
            }
            Entry::Vacant(entry) => {
                entry.insert(*value);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> LookupStore {
        LookupStore::builtin().expect("builtin dataset is valid")
    }

    #[test]
    fn returns_constructed_values() {
        let store = store();
        assert_eq!(store.stock_balance("монитор 24 дюйма").unwrap(), 88);
        assert_eq!(store.stock_balance("стол офисный модель а").unwrap(), 152);
        assert!((store.counterparty_debt("ооо ромашка").unwrap() - 125_430.50).abs() < f64::EPSILON);
        assert!(store.counterparty_debt("ооо лютик").unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn lookups_ignore_case_and_spacing() {
        let store = store();
        assert_eq!(
            store.stock_balance("Стул Офисный Стандарт").unwrap(),
            store.stock_balance("стул офисный стандарт").unwrap()
        );
        assert_eq!(store.stock_balance("  КЛАВИАТУРА   беспроводная ").unwrap(), 210);
    }

    #[test]
    fn miss_reports_kind_and_normalized_key() {
        let err = store().stock_balance("Диван Угловой").expect_err("absent");
        match err {
            StoreError::NotFound { kind, key } => {
                assert_eq!(kind, EntityKind::Product);
                assert_eq!(key.as_str(), "диван угловой");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn collections_are_independent() {
        let store = store();
        let err = store.counterparty_debt("монитор 24 дюйма").expect_err("not a counterparty");
        assert!(err.is_not_found());
        let err = store.stock_balance("ооо ромашка").expect_err("not a product");
        assert!(err.is_not_found());
    }

    #[test]
    fn colliding_keys_are_rejected() {
        let mut dataset = Dataset::default();
        dataset.products.insert("Лампа".into(), 1);
        dataset.products.insert("лампа ".into(), 2);

        let err = LookupStore::from_dataset(&dataset).expect_err("collision");
        assert!(matches!(
            err,
            StoreError::DuplicateKey { kind: EntityKind::Product, ref key } if key.as_str() == "лампа"
        ));
    }

    #[test]
    fn non_finite_debt_is_rejected() {
        let mut dataset = Dataset::default();
        dataset.counterparties.insert("ооо бесконечность".into(), f64::INFINITY);

        let err = LookupStore::from_dataset(&dataset).expect_err("infinite debt");
        assert!(matches!(err, StoreError::InvalidValue { kind: EntityKind::Counterparty, .. }));
    }

    #[test]
    fn negative_balances_pass_through() {
        let mut dataset = Dataset::default();
        dataset.products.insert("возврат".into(), -4);
        let store = LookupStore::from_dataset(&dataset).expect("build");
        assert_eq!(store.stock_balance("Возврат").unwrap(), -4);
        assert_eq!(store.product_count(), 1);
        assert_eq!(store.counterparty_count(), 0);
    }
}
