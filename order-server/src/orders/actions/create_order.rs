//! CreateOrder command handler
//!
//! Validates catalog references and the stop list, optionally reserves a
//! seating resource, freezes all prices and emits the OrderCreated event
//! with a pending payment record.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::tables;
use shared::models::{Additive, OrderAddOnDef, Product};
use shared::order::types::{
    AddOnAttachment, AddOnInput, OrderItemInput, OrderType, SurchargeInput, SurchargeLine,
};
use shared::order::{EventPayload, OrderEvent, OrderEventType};

use super::{build_item_snapshots, make_event};

/// CreateOrder action
///
/// Catalog data and the collision-checked order number are resolved by
/// the manager before the transaction begins.
pub struct CreateOrderAction {
    pub restaurant_id: i64,
    pub order_type: OrderType,
    pub guest_count: i32,
    pub customer_id: Option<i64>,
    pub scheduled_for: Option<i64>,
    pub table_id: Option<i64>,
    pub items: Vec<OrderItemInput>,
    pub addons: Vec<AddOnInput>,
    pub surcharges: Vec<SurchargeInput>,
    /// Pre-generated, collision-checked order number
    pub order_number: String,
    pub products: HashMap<i64, Product>,
    pub additives: HashMap<i64, Additive>,
    pub addon_defs: HashMap<i64, OrderAddOnDef>,
}

#[async_trait]
impl CommandHandler for CreateOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.guest_count < 1 {
            return Err(OrderError::Validation(
                "guest count must be at least 1".to_string(),
            ));
        }
        if self.order_type == OrderType::Scheduled && self.scheduled_for.is_none() {
            return Err(OrderError::Validation(
                "scheduled orders require a scheduled time".to_string(),
            ));
        }

        let order_id = uuid::Uuid::new_v4().to_string();

        // Reserve the table inside this transaction; a later failure
        // rolls the occupancy write back with everything else.
        let table_name = match self.table_id {
            Some(table_id) => {
                let table = tables::check_and_reserve(
                    ctx.storage(),
                    ctx.txn(),
                    table_id,
                    self.restaurant_id,
                    &order_id,
                )?;
                Some(table.name)
            }
            None => None,
        };

        let items = build_item_snapshots(&self.items, &self.products, &self.additives, false)?;

        let mut addons = Vec::with_capacity(self.addons.len());
        for input in &self.addons {
            if input.quantity < 1 {
                return Err(OrderError::Validation(format!(
                    "add-on quantity must be at least 1 for add-on {}",
                    input.addon_id
                )));
            }
            if addons.iter().any(|a: &AddOnAttachment| a.addon_id == input.addon_id) {
                return Err(OrderError::Validation(format!(
                    "add-on {} attached twice",
                    input.addon_id
                )));
            }
            let def = self
                .addon_defs
                .get(&input.addon_id)
                .ok_or(OrderError::AddOnNotFound(input.addon_id))?;
            addons.push(AddOnAttachment {
                addon_id: def.id,
                name: def.name.clone(),
                mode: def.mode,
                unit_price: def.price,
                quantity: input.quantity,
                amount: 0,
            });
        }

        let mut surcharges = Vec::with_capacity(self.surcharges.len());
        for input in &self.surcharges {
            if input.value.is_sign_negative() {
                return Err(OrderError::Validation(format!(
                    "surcharge '{}' must not be negative",
                    input.name
                )));
            }
            surcharges.push(SurchargeLine {
                name: input.name.clone(),
                mode: input.mode,
                value: input.value,
                amount: 0,
            });
        }

        let seq = ctx.next_sequence();
        let event = make_event(
            seq,
            &order_id,
            self.restaurant_id,
            metadata,
            OrderEventType::OrderCreated,
            EventPayload::OrderCreated {
                restaurant_id: self.restaurant_id,
                order_number: self.order_number.clone(),
                order_type: self.order_type,
                guest_count: self.guest_count,
                customer_id: self.customer_id,
                scheduled_for: self.scheduled_for,
                table_id: self.table_id,
                table_name,
                items,
                addons,
                surcharges,
                payment_id: uuid::Uuid::new_v4().to_string(),
            },
        );

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::storage::OrderStorage;
    use shared::models::{AddOnPricingMode, TableStatus};

    fn metadata() -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".to_string(),
            operator_id: 1,
            operator_name: "Test".to_string(),
            timestamp: 1_700_000_000_000,
        }
    }

    fn product(id: i64, price: i64, stop_listed: bool) -> Product {
        Product {
            id,
            name: format!("Product {id}"),
            price,
            is_stop_listed: stop_listed,
        }
    }

    fn base_action() -> CreateOrderAction {
        let mut products = HashMap::new();
        products.insert(1, product(1, 300, false));
        CreateOrderAction {
            restaurant_id: 100,
            order_type: OrderType::DineIn,
            guest_count: 2,
            customer_id: None,
            scheduled_for: None,
            table_id: None,
            items: vec![OrderItemInput {
                product_id: 1,
                quantity: 2,
                additive_ids: vec![],
                comment: None,
            }],
            addons: vec![],
            surcharges: vec![],
            order_number: "20260806-1234".to_string(),
            products,
            additives: HashMap::new(),
            addon_defs: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_create_order_emits_event() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let events = base_action().execute(&mut ctx, &metadata()).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, OrderEventType::OrderCreated);
        if let EventPayload::OrderCreated { items, order_number, .. } = &events[0].payload {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].unit_price, 300);
            assert_eq!(order_number, "20260806-1234");
        } else {
            panic!("Expected OrderCreated payload");
        }
    }

    #[tokio::test]
    async fn test_create_order_rejects_stop_listed_product() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let mut action = base_action();
        action.products.insert(1, product(1, 300, true));
        let result = action.execute(&mut ctx, &metadata()).await;
        assert!(matches!(result, Err(OrderError::ProductStopListed(1))));
    }

    #[tokio::test]
    async fn test_create_order_rejects_unknown_product() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let mut action = base_action();
        action.items[0].product_id = 99;
        let result = action.execute(&mut ctx, &metadata()).await;
        assert!(matches!(result, Err(OrderError::ProductNotFound(99))));
    }

    #[tokio::test]
    async fn test_create_order_rejects_zero_guest_count() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let mut action = base_action();
        action.guest_count = 0;
        let result = action.execute(&mut ctx, &metadata()).await;
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }

    #[tokio::test]
    async fn test_scheduled_order_requires_time() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let mut action = base_action();
        action.order_type = OrderType::Scheduled;
        let result = action.execute(&mut ctx, &metadata()).await;
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_order_with_table_reserves_it() {
        let storage = OrderStorage::open_in_memory().unwrap();
        storage
            .upsert_table(&shared::models::DiningTable {
                id: 5,
                restaurant_id: 100,
                name: "T5".to_string(),
                capacity: 4,
                status: TableStatus::Available,
            })
            .unwrap();

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let mut action = base_action();
        action.table_id = Some(5);
        let events = action.execute(&mut ctx, &metadata()).await.unwrap();
        if let EventPayload::OrderCreated { table_name, .. } = &events[0].payload {
            assert_eq!(table_name.as_deref(), Some("T5"));
        } else {
            panic!("Expected OrderCreated payload");
        }
        txn.commit().unwrap();

        assert_eq!(
            storage.get_table(5).unwrap().unwrap().status,
            TableStatus::Occupied
        );
    }

    #[tokio::test]
    async fn test_create_order_duplicate_addon_rejected() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let mut action = base_action();
        action.addon_defs.insert(
            7,
            OrderAddOnDef {
                id: 7,
                name: "Service".to_string(),
                mode: AddOnPricingMode::Fixed,
                price: 100,
            },
        );
        action.addons = vec![
            AddOnInput { addon_id: 7, quantity: 1 },
            AddOnInput { addon_id: 7, quantity: 2 },
        ];
        let result = action.execute(&mut ctx, &metadata()).await;
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }
}
