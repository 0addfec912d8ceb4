//! AssignTable command handler
//!
//! Reserves the target table inside the current transaction and, on
//! reassignment, releases the previous one. Assignment forces the order
//! type to dine-in (the applier sets it).

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::tables;
use shared::order::{EventPayload, OrderEvent, OrderEventType};

use super::{ensure_active, make_event};

/// AssignTable action
pub struct AssignTableAction {
    pub order_id: String,
    pub table_id: i64,
}

#[async_trait]
impl CommandHandler for AssignTableAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        ensure_active(&snapshot)?;

        if snapshot.table_id == Some(self.table_id) {
            return Err(OrderError::InvalidOperation(format!(
                "Order {} already holds table {}",
                self.order_id, self.table_id
            )));
        }

        let table = tables::check_and_reserve(
            ctx.storage(),
            ctx.txn(),
            self.table_id,
            snapshot.restaurant_id,
            &self.order_id,
        )?;

        let mut events = Vec::with_capacity(2);
        if let Some(previous_table_id) = snapshot.table_id {
            tables::release(ctx.storage(), ctx.txn(), previous_table_id, &self.order_id)?;
            let seq = ctx.next_sequence();
            events.push(make_event(
                seq,
                &self.order_id,
                snapshot.restaurant_id,
                metadata,
                OrderEventType::TableReleased,
                EventPayload::TableReleased {
                    table_id: previous_table_id,
                },
            ));
        }

        let seq = ctx.next_sequence();
        events.push(make_event(
            seq,
            &self.order_id,
            snapshot.restaurant_id,
            metadata,
            OrderEventType::TableAssigned,
            EventPayload::TableAssigned {
                table_id: self.table_id,
                table_name: table.name,
                previous_table_id: snapshot.table_id,
            },
        ));

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::storage::OrderStorage;
    use shared::models::{DiningTable, TableStatus};
    use shared::order::OrderSnapshot;

    fn metadata() -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".to_string(),
            operator_id: 1,
            operator_name: "Test".to_string(),
            timestamp: 1_700_000_000_000,
        }
    }

    fn table(id: i64, status: TableStatus) -> DiningTable {
        DiningTable {
            id,
            restaurant_id: 100,
            name: format!("T{id}"),
            capacity: 4,
            status,
        }
    }

    fn store(storage: &OrderStorage, snapshot: &OrderSnapshot) {
        let txn = storage.begin_write().unwrap();
        storage.store_snapshot(&txn, snapshot).unwrap();
        storage.mark_order_active(&txn, &snapshot.order_id).unwrap();
        txn.commit().unwrap();
    }

    #[tokio::test]
    async fn test_assign_emits_event_and_occupies() {
        let storage = OrderStorage::open_in_memory().unwrap();
        storage.upsert_table(&table(1, TableStatus::Available)).unwrap();
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.restaurant_id = 100;
        store(&storage, &snapshot);

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = AssignTableAction {
            order_id: "order-1".to_string(),
            table_id: 1,
        };
        let events = action.execute(&mut ctx, &metadata()).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, OrderEventType::TableAssigned);
        txn.commit().unwrap();

        assert_eq!(storage.get_table(1).unwrap().unwrap().status, TableStatus::Occupied);
    }

    #[tokio::test]
    async fn test_reassignment_releases_previous_table() {
        let storage = OrderStorage::open_in_memory().unwrap();
        storage.upsert_table(&table(1, TableStatus::Occupied)).unwrap();
        storage.upsert_table(&table(2, TableStatus::Available)).unwrap();
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.restaurant_id = 100;
        snapshot.table_id = Some(1);
        store(&storage, &snapshot);

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = AssignTableAction {
            order_id: "order-1".to_string(),
            table_id: 2,
        };
        let events = action.execute(&mut ctx, &metadata()).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, OrderEventType::TableReleased);
        assert_eq!(events[1].event_type, OrderEventType::TableAssigned);
        txn.commit().unwrap();

        assert_eq!(storage.get_table(1).unwrap().unwrap().status, TableStatus::Available);
        assert_eq!(storage.get_table(2).unwrap().unwrap().status, TableStatus::Occupied);
    }

    #[tokio::test]
    async fn test_assign_occupied_table_conflicts() {
        let storage = OrderStorage::open_in_memory().unwrap();
        storage.upsert_table(&table(1, TableStatus::Occupied)).unwrap();

        let mut holder = OrderSnapshot::new("order-0".to_string());
        holder.restaurant_id = 100;
        holder.table_id = Some(1);
        store(&storage, &holder);

        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.restaurant_id = 100;
        store(&storage, &snapshot);

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = AssignTableAction {
            order_id: "order-1".to_string(),
            table_id: 1,
        };
        let result = action.execute(&mut ctx, &metadata()).await;
        assert!(matches!(result, Err(OrderError::TableOccupied(_))));
    }
}
