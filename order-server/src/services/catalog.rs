//! Catalog lookup collaborator
//!
//! Resolves product, additive and order-add-on definitions with
//! restaurant-specific prices and stop-list flags. Pure read; the engine
//! freezes the returned prices onto the order at attach time.

use parking_lot::RwLock;
use shared::models::{Additive, OrderAddOnDef, Product};
use std::collections::HashMap;

/// Batch catalog lookup, keyed by id
pub trait CatalogService: Send + Sync {
    /// Products as priced for one restaurant; missing ids are absent from
    /// the result
    fn products_for_restaurant(&self, restaurant_id: i64, ids: &[i64]) -> HashMap<i64, Product>;

    fn additives(&self, ids: &[i64]) -> HashMap<i64, Additive>;

    fn order_addons(&self, ids: &[i64]) -> HashMap<i64, OrderAddOnDef>;
}

/// In-memory catalog used by tests and the standalone binary
#[derive(Default)]
pub struct InMemoryCatalog {
    /// (restaurant_id, product_id) -> product
    products: RwLock<HashMap<(i64, i64), Product>>,
    additives: RwLock<HashMap<i64, Additive>>,
    addons: RwLock<HashMap<i64, OrderAddOnDef>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_product(&self, restaurant_id: i64, product: Product) {
        self.products
            .write()
            .insert((restaurant_id, product.id), product);
    }

    pub fn insert_additive(&self, additive: Additive) {
        self.additives.write().insert(additive.id, additive);
    }

    pub fn insert_addon(&self, addon: OrderAddOnDef) {
        self.addons.write().insert(addon.id, addon);
    }
}

impl CatalogService for InMemoryCatalog {
    fn products_for_restaurant(&self, restaurant_id: i64, ids: &[i64]) -> HashMap<i64, Product> {
        let products = self.products.read();
        ids.iter()
            .filter_map(|id| products.get(&(restaurant_id, *id)).map(|p| (*id, p.clone())))
            .collect()
    }

    fn additives(&self, ids: &[i64]) -> HashMap<i64, Additive> {
        let additives = self.additives.read();
        ids.iter()
            .filter_map(|id| additives.get(id).map(|a| (*id, a.clone())))
            .collect()
    }

    fn order_addons(&self, ids: &[i64]) -> HashMap<i64, OrderAddOnDef> {
        let addons = self.addons.read();
        ids.iter()
            .filter_map(|id| addons.get(id).map(|a| (*id, a.clone())))
            .collect()
    }
}
