//! OrdersManager - command processing and event generation
//!
//! The manager sequences every mutation as one atomic unit of work:
//!
//! ```text
//! execute_command(cmd)
//!     ├─ 1. Idempotency check (command_id)
//!     ├─ 2. Pre-transaction collaborator reads
//!     │     (catalog batch lookup, reservation window, loyalty spend)
//!     ├─ 3. Begin write transaction
//!     ├─ 4. Build action and execute (validate → events)
//!     ├─ 5. Apply events to snapshots via EventApplier
//!     ├─ 6. Persist events, snapshots, indices, order number
//!     ├─ 7. Mark command processed
//!     ├─ 8. Commit transaction
//!     ├─ 9. Post-commit effects (usage counters, bonus re-credit)
//!     ├─ 10. Broadcast event(s)
//!     └─ 11. Return response with the denormalized snapshot
//! ```
//!
//! redb's single-writer model serializes steps 3-8 across concurrent
//! requests, so a table check-and-reserve can never succeed twice and a
//! failed command rolls back without partial application.

mod error;
pub use error::*;

use chrono::Utc;
use chrono_tz::Tz;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::actions::{self, CommandAction};
use super::appliers::EventAction;
use super::storage::{OrderStorage, StorageError};
use super::traits::{CommandContext, CommandHandler, CommandMetadata, EventApplier, OrderError};
use crate::services::{
    CatalogService, DiscountStore, LoyaltyError, LoyaltyService, ReservationLookup,
};
use shared::models::{DiscountKind, DiscountTarget};
use shared::order::types::{DiscountApplication, ItemChanges, OrderItemInput};
use shared::order::{
    CommandResponse, EventPayload, OrderCommand, OrderCommandPayload, OrderEvent, OrderSnapshot,
};

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 65536;

/// Bounded retries for order-number collisions
const ORDER_NUMBER_MAX_ATTEMPTS: u32 = 5;

/// Reservation conflict window around "now" (±2 hours)
const RESERVATION_WINDOW_MS: i64 = 2 * 60 * 60 * 1000;

/// Bonus points spent through the loyalty collaborator before the
/// transaction; compensated if the transaction then fails.
struct SpentBonus {
    customer_id: i64,
    network_id: i64,
    points: i64,
    order_id: String,
}

/// Post-commit side effects gathered while the transaction is open
#[derive(Default)]
struct PostCommit {
    discount_increments: Vec<i64>,
    discount_decrements: Vec<i64>,
    /// (customer_id, network_id, points, order_id)
    bonus_credit: Option<(i64, i64, i64, String)>,
}

/// OrdersManager for command processing
///
/// The `epoch` field is a unique identifier generated on each startup;
/// clients use it to detect server restarts and trigger full resync.
pub struct OrdersManager {
    storage: OrderStorage,
    event_tx: broadcast::Sender<OrderEvent>,
    epoch: String,
    catalog: Arc<dyn CatalogService>,
    discounts: Option<Arc<dyn DiscountStore>>,
    loyalty: Option<Arc<dyn LoyaltyService>>,
    reservations: Option<Arc<dyn ReservationLookup>>,
    /// Business timezone for date-prefixed order numbers
    tz: Tz,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("storage", &"<OrderStorage>")
            .field("event_tx", &"<broadcast::Sender>")
            .field("epoch", &self.epoch)
            .finish()
    }
}

impl OrdersManager {
    /// Create a new OrdersManager with the given database path
    pub fn new(
        db_path: impl AsRef<Path>,
        catalog: Arc<dyn CatalogService>,
        tz: Tz,
    ) -> ManagerResult<Self> {
        let storage = OrderStorage::open(db_path)?;
        Ok(Self::with_storage(storage, catalog, tz))
    }

    /// Create an OrdersManager over existing storage (tests, embedding)
    pub fn with_storage(storage: OrderStorage, catalog: Arc<dyn CatalogService>, tz: Tz) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, "OrdersManager started with new epoch");
        Self {
            storage,
            event_tx,
            epoch,
            catalog,
            discounts: None,
            loyalty: None,
            reservations: None,
            tz,
        }
    }

    /// Attach the discount store collaborator
    pub fn with_discount_store(mut self, discounts: Arc<dyn DiscountStore>) -> Self {
        self.discounts = Some(discounts);
        self
    }

    /// Attach the loyalty collaborator
    pub fn with_loyalty(mut self, loyalty: Arc<dyn LoyaltyService>) -> Self {
        self.loyalty = Some(loyalty);
        self
    }

    /// Attach the reservation collaborator
    pub fn with_reservations(mut self, reservations: Arc<dyn ReservationLookup>) -> Self {
        self.reservations = Some(reservations);
        self
    }

    /// Get the server epoch (unique instance ID)
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    /// Subscribe to post-commit event broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.event_tx.subscribe()
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    /// Generate a date-prefixed order number with a random suffix,
    /// retrying on collision up to a bounded number of attempts. The
    /// number is claimed inside the write transaction, so a racing
    /// creation cannot end up with a duplicate.
    fn next_order_number(&self) -> ManagerResult<String> {
        use rand::Rng;
        let date = Utc::now().with_timezone(&self.tz).format("%Y%m%d").to_string();
        for attempt in 0..ORDER_NUMBER_MAX_ATTEMPTS {
            let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
            let number = format!("{date}-{suffix:04}");
            if !self.storage.order_number_exists(&number)? {
                return Ok(number);
            }
            tracing::debug!(number = %number, attempt, "Order number collision, retrying");
        }
        Err(ManagerError::DuplicateOrderNumber {
            attempts: ORDER_NUMBER_MAX_ATTEMPTS,
        })
    }

    /// Execute a command and return the response
    pub fn execute_command(&self, cmd: OrderCommand) -> CommandResponse {
        match self.process_command(cmd.clone()) {
            Ok((response, events)) => {
                // Broadcast events after successful commit
                for event in events {
                    if self.event_tx.send(event).is_err() {
                        tracing::debug!("Event broadcast skipped: no active receivers");
                        break;
                    }
                }
                response
            }
            Err(err) => CommandResponse::error(cmd.command_id, err.into()),
        }
    }

    /// Process a command and return the response with generated events
    fn process_command(
        &self,
        cmd: OrderCommand,
    ) -> ManagerResult<(CommandResponse, Vec<OrderEvent>)> {
        tracing::debug!(command_id = %cmd.command_id, payload = ?cmd.payload, "Processing command");

        // 1. Idempotency check (before transaction)
        if self.storage.is_command_processed(&cmd.command_id)? {
            tracing::warn!(command_id = %cmd.command_id, "Duplicate command");
            return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
        }

        // 2. Pre-transaction collaborator reads; may spend bonus points
        let (action, spent_bonus) = self.build_action(&cmd)?;

        // 3-8. Run the write transaction; compensate a bonus spend if it
        // fails after the points already left the customer's balance.
        match self.run_transaction(&cmd, action) {
            Ok(result) => Ok(result),
            Err(err) => {
                if let Some(spent) = spent_bonus {
                    self.refund_spent_bonus(&spent);
                }
                Err(err)
            }
        }
    }

    /// Resolve collaborator data and build the action for a payload
    fn build_action(
        &self,
        cmd: &OrderCommand,
    ) -> ManagerResult<(CommandAction, Option<SpentBonus>)> {
        let action = match &cmd.payload {
            OrderCommandPayload::CreateOrder {
                restaurant_id,
                order_type,
                guest_count,
                customer_id,
                scheduled_for,
                table_id,
                items,
                addons,
                surcharges,
            } => {
                if let Some(table_id) = table_id {
                    self.check_reservation_window(*table_id)?;
                }
                let (products, additives) = self.resolve_items(*restaurant_id, items);
                let addon_ids: Vec<i64> = addons.iter().map(|a| a.addon_id).collect();
                CommandAction::CreateOrder(actions::CreateOrderAction {
                    restaurant_id: *restaurant_id,
                    order_type: *order_type,
                    guest_count: *guest_count,
                    customer_id: *customer_id,
                    scheduled_for: *scheduled_for,
                    table_id: *table_id,
                    items: items.clone(),
                    addons: addons.clone(),
                    surcharges: surcharges.clone(),
                    order_number: self.next_order_number()?,
                    products,
                    additives,
                    addon_defs: self.catalog.order_addons(&addon_ids),
                })
            }
            OrderCommandPayload::UpdateOrderStatus {
                order_id,
                status,
                reason,
            } => CommandAction::UpdateOrderStatus(actions::UpdateOrderStatusAction {
                order_id: order_id.clone(),
                status: *status,
                reason: reason.clone(),
            }),
            OrderCommandPayload::StartScheduledOrder { order_id } => {
                CommandAction::StartScheduledOrder(actions::StartScheduledOrderAction {
                    order_id: order_id.clone(),
                })
            }
            OrderCommandPayload::UpdateOrderInfo {
                order_id,
                guest_count,
                is_precheck,
            } => CommandAction::UpdateOrderInfo(actions::UpdateOrderInfoAction {
                order_id: order_id.clone(),
                guest_count: *guest_count,
                is_precheck: *is_precheck,
            }),
            OrderCommandPayload::AddItems { order_id, items } => {
                let snapshot = self.require_snapshot(order_id)?;
                let (products, additives) = self.resolve_items(snapshot.restaurant_id, items);
                CommandAction::AddItems(actions::AddItemsAction {
                    order_id: order_id.clone(),
                    items: items.clone(),
                    products,
                    additives,
                })
            }
            OrderCommandPayload::ModifyItem {
                order_id,
                instance_id,
                changes,
            } => {
                let resolved_additives = match &changes.additive_ids {
                    Some(ids) => {
                        let found = self.catalog.additives(ids);
                        let mut additives = Vec::with_capacity(ids.len());
                        for id in ids {
                            let additive = found
                                .get(id)
                                .ok_or(OrderError::AdditiveNotFound(*id))?;
                            additives.push(shared::order::types::AdditiveSnapshot {
                                id: additive.id,
                                name: additive.name.clone(),
                                price: additive.price,
                            });
                        }
                        Some(additives)
                    }
                    None => None,
                };
                CommandAction::ModifyItem(actions::ModifyItemAction {
                    order_id: order_id.clone(),
                    instance_id: instance_id.clone(),
                    changes: ItemChanges {
                        quantity: changes.quantity,
                        comment: changes.comment.clone(),
                        additives: resolved_additives,
                    },
                })
            }
            OrderCommandPayload::RemoveItem {
                order_id,
                instance_id,
                reason,
            } => CommandAction::RemoveItem(actions::RemoveItemAction {
                order_id: order_id.clone(),
                instance_id: instance_id.clone(),
                reason: reason.clone(),
            }),
            OrderCommandPayload::RefundItem {
                order_id,
                instance_id,
                reason,
            } => CommandAction::RefundItem(actions::RefundItemAction {
                order_id: order_id.clone(),
                instance_id: instance_id.clone(),
                reason: reason.clone(),
            }),
            OrderCommandPayload::UpdateItemStatus {
                order_id,
                updates,
                reason,
            } => CommandAction::UpdateItemStatus(actions::UpdateItemStatusAction {
                order_id: order_id.clone(),
                updates: updates.clone(),
                reason: reason.clone(),
            }),
            OrderCommandPayload::AssignTable { order_id, table_id } => {
                self.check_reservation_window(*table_id)?;
                CommandAction::AssignTable(actions::AssignTableAction {
                    order_id: order_id.clone(),
                    table_id: *table_id,
                })
            }
            OrderCommandPayload::UnassignTable { order_id } => {
                CommandAction::UnassignTable(actions::UnassignTableAction {
                    order_id: order_id.clone(),
                })
            }
            OrderCommandPayload::AttachAddOn {
                order_id,
                addon_id,
                quantity,
            } => {
                let def = self
                    .catalog
                    .order_addons(&[*addon_id])
                    .remove(addon_id)
                    .ok_or(OrderError::AddOnNotFound(*addon_id))?;
                CommandAction::AttachAddOn(actions::AttachAddOnAction {
                    order_id: order_id.clone(),
                    quantity: *quantity,
                    def,
                })
            }
            OrderCommandPayload::DetachAddOn { order_id, addon_id } => {
                CommandAction::DetachAddOn(actions::DetachAddOnAction {
                    order_id: order_id.clone(),
                    addon_id: *addon_id,
                })
            }
            OrderCommandPayload::ApplyDiscount {
                order_id,
                discount_id,
            } => {
                let application = self.resolve_discount(order_id, *discount_id)?;
                CommandAction::ApplyDiscount(actions::ApplyDiscountAction {
                    order_id: order_id.clone(),
                    application,
                })
            }
            OrderCommandPayload::RemoveDiscount {
                order_id,
                discount_id,
            } => CommandAction::RemoveDiscount(actions::RemoveDiscountAction {
                order_id: order_id.clone(),
                discount_id: *discount_id,
            }),
            OrderCommandPayload::RedeemBonusPoints { order_id, points } => {
                let (action, spent) = self.prepare_bonus_redemption(cmd, order_id, *points)?;
                return Ok((CommandAction::RedeemBonus(action), Some(spent)));
            }
            OrderCommandPayload::CancelBonusRedemption { order_id } => {
                CommandAction::CancelBonusRedemption(actions::CancelBonusRedemptionAction {
                    order_id: order_id.clone(),
                })
            }
            OrderCommandPayload::SettlePayment { order_id } => {
                CommandAction::SettlePayment(actions::SettlePaymentAction {
                    order_id: order_id.clone(),
                })
            }
        };
        Ok((action, None))
    }

    /// Batch-resolve the catalog data for a set of item inputs
    fn resolve_items(
        &self,
        restaurant_id: i64,
        items: &[OrderItemInput],
    ) -> (
        HashMap<i64, shared::models::Product>,
        HashMap<i64, shared::models::Additive>,
    ) {
        let product_ids: Vec<i64> = items.iter().map(|i| i.product_id).collect();
        let additive_ids: Vec<i64> = items
            .iter()
            .flat_map(|i| i.additive_ids.iter().copied())
            .collect();
        (
            self.catalog.products_for_restaurant(restaurant_id, &product_ids),
            self.catalog.additives(&additive_ids),
        )
    }

    /// Reject the assignment when a confirmed reservation falls within
    /// ±2 hours of now
    fn check_reservation_window(&self, table_id: i64) -> ManagerResult<()> {
        let Some(reservations) = &self.reservations else {
            return Ok(());
        };
        let now = shared::util::now_millis();
        let conflict = futures::executor::block_on(reservations.has_confirmed_reservation_near(
            table_id,
            now - RESERVATION_WINDOW_MS,
            now + RESERVATION_WINDOW_MS,
        ))
        .map_err(|e| ManagerError::Internal(format!("reservation lookup failed: {e}")))?;
        if conflict {
            return Err(ManagerError::ReservationConflict { table_id });
        }
        Ok(())
    }

    /// Build a discount application from the discount store, or from the
    /// customer's personal discount when no id is given
    fn resolve_discount(
        &self,
        order_id: &str,
        discount_id: Option<i64>,
    ) -> ManagerResult<DiscountApplication> {
        match discount_id {
            Some(id) => {
                let store = self.discounts.as_ref().ok_or_else(|| {
                    ManagerError::Internal("discount store not configured".to_string())
                })?;
                let discount = store.get(id).ok_or(OrderError::DiscountNotFound(id))?;
                if !discount.is_active {
                    return Err(OrderError::Validation(format!(
                        "discount {} is not active",
                        id
                    ))
                    .into());
                }
                Ok(DiscountApplication {
                    discount_id: Some(discount.id),
                    description: discount.description,
                    kind: discount.kind,
                    value: discount.value,
                    target: discount.target,
                    amount: 0,
                })
            }
            None => {
                let snapshot = self.require_snapshot(order_id)?;
                let customer_id = snapshot.customer_id.ok_or_else(|| {
                    OrderError::Validation(
                        "order has no customer for a personal discount".to_string(),
                    )
                })?;
                let loyalty = self.loyalty.as_ref().ok_or_else(|| {
                    ManagerError::Internal("loyalty collaborator not configured".to_string())
                })?;
                let personal = futures::executor::block_on(
                    loyalty.personal_discount(customer_id, snapshot.restaurant_id),
                )
                .map_err(|e| ManagerError::Loyalty(e.to_string()))?;
                let personal = personal.filter(|p| p.active).ok_or_else(|| {
                    OrderError::Validation(format!(
                        "customer {} has no active personal discount",
                        customer_id
                    ))
                })?;
                Ok(DiscountApplication {
                    discount_id: None,
                    description: "Personal discount".to_string(),
                    kind: DiscountKind::Percentage,
                    value: personal.percentage,
                    target: DiscountTarget::All,
                    amount: 0,
                })
            }
        }
    }

    /// Check the balance and spend points through the loyalty
    /// collaborator before the transaction
    fn prepare_bonus_redemption(
        &self,
        cmd: &OrderCommand,
        order_id: &str,
        points: i64,
    ) -> ManagerResult<(actions::RedeemBonusAction, SpentBonus)> {
        if points < 1 {
            return Err(OrderError::Validation("points must be at least 1".to_string()).into());
        }
        let snapshot = self.require_snapshot(order_id)?;
        let customer_id = snapshot.customer_id.ok_or_else(|| {
            OrderError::Validation("order has no customer to redeem points for".to_string())
        })?;
        let loyalty = self.loyalty.as_ref().ok_or_else(|| {
            ManagerError::Internal("loyalty collaborator not configured".to_string())
        })?;

        let network_id = snapshot.restaurant_id;
        let description = format!("Redemption on order {}", snapshot.order_number);
        let new_balance = futures::executor::block_on(loyalty.spend_bonus_points(
            customer_id,
            network_id,
            points,
            order_id,
            &description,
        ))
        .map_err(|e| match e {
            LoyaltyError::InsufficientBalance { balance, requested } => {
                ManagerError::Order(OrderError::InsufficientBonusBalance { balance, requested })
            }
            LoyaltyError::Unavailable(msg) => ManagerError::Loyalty(msg),
        })?;
        tracing::debug!(
            command_id = %cmd.command_id,
            order_id,
            points,
            new_balance,
            "Bonus points spent"
        );

        Ok((
            actions::RedeemBonusAction {
                order_id: order_id.to_string(),
                points,
                new_balance,
            },
            SpentBonus {
                customer_id,
                network_id,
                points,
                order_id: order_id.to_string(),
            },
        ))
    }

    /// Compensating credit for a spend whose transaction failed
    fn refund_spent_bonus(&self, spent: &SpentBonus) {
        let Some(loyalty) = &self.loyalty else { return };
        match futures::executor::block_on(loyalty.earn_bonus_points(
            spent.customer_id,
            spent.network_id,
            spent.points,
            &spent.order_id,
            "Redemption rolled back",
        )) {
            Ok(balance) => {
                tracing::info!(order_id = %spent.order_id, points = spent.points, balance, "Bonus spend compensated");
            }
            Err(e) => {
                tracing::error!(order_id = %spent.order_id, points = spent.points, error = %e, "Failed to compensate bonus spend");
            }
        }
    }

    fn require_snapshot(&self, order_id: &str) -> ManagerResult<OrderSnapshot> {
        self.storage
            .get_snapshot(order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()).into())
    }

    /// Execute the action inside one write transaction and commit
    fn run_transaction(
        &self,
        cmd: &OrderCommand,
        action: CommandAction,
    ) -> ManagerResult<(CommandResponse, Vec<OrderEvent>)> {
        let txn = self.storage.begin_write()?;

        // Double-check idempotency within the transaction
        if self.storage.is_command_processed_txn(&txn, &cmd.command_id)? {
            return Ok((CommandResponse::duplicate(cmd.command_id.clone()), vec![]));
        }

        let current_sequence = self.storage.get_current_sequence()?;
        let metadata = CommandMetadata {
            command_id: cmd.command_id.clone(),
            operator_id: cmd.operator_id,
            operator_name: cmd.operator_name.clone(),
            timestamp: cmd.timestamp,
        };

        let mut ctx = CommandContext::new(&txn, &self.storage, current_sequence);
        let events = futures::executor::block_on(action.execute(&mut ctx, &metadata))
            .map_err(ManagerError::from)?;

        // Fold events into snapshots
        for event in &events {
            let mut snapshot = ctx
                .load_snapshot(&event.order_id)
                .unwrap_or_else(|_| OrderSnapshot::new(event.order_id.clone()));
            let applier: EventAction = event.into();
            applier.apply(&mut snapshot, event);
            ctx.save_snapshot(snapshot);
        }

        // Claim the order number for creations; the uniqueness index is
        // the last word even if the pre-check raced another creation.
        for event in &events {
            if let EventPayload::OrderCreated { order_number, .. } = &event.payload
                && !self
                    .storage
                    .claim_order_number(&txn, order_number, &event.order_id)?
            {
                return Err(ManagerError::DuplicateOrderNumber {
                    attempts: ORDER_NUMBER_MAX_ATTEMPTS,
                });
            }
        }

        // Persist events
        for event in &events {
            self.storage.store_event(&txn, event)?;
        }

        // Persist snapshots and maintain the active-order index
        for snapshot in ctx.modified_snapshots() {
            self.storage.store_snapshot(&txn, snapshot)?;
            if snapshot.is_active() {
                self.storage.mark_order_active(&txn, &snapshot.order_id)?;
            } else {
                self.storage.mark_order_inactive(&txn, &snapshot.order_id)?;
            }
        }

        // Advance the sequence counter
        let max_sequence = ctx.current_sequence();
        if max_sequence > current_sequence {
            self.storage.set_sequence(&txn, max_sequence)?;
        }

        self.storage.mark_command_processed(&txn, &cmd.command_id)?;

        // Gather response and post-commit data before releasing the
        // transaction borrow
        let order_id = cmd
            .payload
            .order_id()
            .map(str::to_string)
            .or_else(|| events.first().map(|e| e.order_id.clone()));
        let mut response_snapshot = order_id
            .as_ref()
            .and_then(|id| ctx.modified_snapshots().find(|s| &s.order_id == id).cloned());
        let post = self.collect_post_commit(&events, response_snapshot.as_ref());

        drop(ctx);
        txn.commit().map_err(StorageError::from)?;

        self.apply_post_commit(post);

        // No-op commands (e.g. an already-started scheduled order) still
        // answer with the current snapshot
        if response_snapshot.is_none()
            && let Some(id) = &order_id
        {
            response_snapshot = self.storage.get_snapshot(id)?;
        }

        tracing::info!(
            command_id = %cmd.command_id,
            order_id = ?order_id,
            event_count = events.len(),
            "Command processed successfully"
        );
        Ok((
            CommandResponse::success(
                cmd.command_id.clone(),
                order_id,
                response_snapshot.map(Box::new),
            ),
            events,
        ))
    }

    fn collect_post_commit(
        &self,
        events: &[OrderEvent],
        snapshot: Option<&OrderSnapshot>,
    ) -> PostCommit {
        let mut post = PostCommit::default();
        for event in events {
            match &event.payload {
                EventPayload::DiscountApplied { application } => {
                    if let Some(id) = application.discount_id {
                        post.discount_increments.push(id);
                    }
                }
                EventPayload::DiscountRemoved { discount_id, .. } => {
                    if let Some(id) = discount_id {
                        post.discount_decrements.push(*id);
                    }
                }
                EventPayload::BonusRedemptionCancelled { points } => {
                    if let Some(customer_id) = snapshot.and_then(|s| s.customer_id) {
                        post.bonus_credit = Some((
                            customer_id,
                            event.restaurant_id,
                            *points,
                            event.order_id.clone(),
                        ));
                    }
                }
                _ => {}
            }
        }
        post
    }

    /// Usage counters and loyalty credits run after commit; failures are
    /// logged, never unwound into the committed mutation.
    fn apply_post_commit(&self, post: PostCommit) {
        if let Some(discounts) = &self.discounts {
            for id in &post.discount_increments {
                discounts.increment_usage(*id);
            }
            for id in &post.discount_decrements {
                discounts.decrement_usage(*id);
            }
        }
        if let Some((customer_id, network_id, points, order_id)) = post.bonus_credit {
            let Some(loyalty) = &self.loyalty else { return };
            match futures::executor::block_on(loyalty.earn_bonus_points(
                customer_id,
                network_id,
                points,
                &order_id,
                "Redemption cancelled",
            )) {
                Ok(balance) => {
                    tracing::debug!(order_id = %order_id, points, balance, "Bonus points re-credited");
                }
                Err(e) => {
                    tracing::error!(order_id = %order_id, points, error = %e, "Failed to re-credit bonus points");
                }
            }
        }
    }

    // ========== Public Query Methods ==========

    /// Get a snapshot by order ID
    pub fn get_snapshot(&self, order_id: &str) -> ManagerResult<Option<OrderSnapshot>> {
        Ok(self.storage.get_snapshot(order_id)?)
    }

    /// Get all active order snapshots
    pub fn get_active_orders(&self) -> ManagerResult<Vec<OrderSnapshot>> {
        Ok(self.storage.get_active_orders()?)
    }

    /// Get current sequence number
    pub fn get_current_sequence(&self) -> ManagerResult<u64> {
        Ok(self.storage.get_current_sequence()?)
    }

    /// Get events since a given sequence
    pub fn get_events_since(&self, since_sequence: u64) -> ManagerResult<Vec<OrderEvent>> {
        Ok(self.storage.get_events_since(since_sequence)?)
    }

    /// Get all events for a specific order
    pub fn get_events_for_order(&self, order_id: &str) -> ManagerResult<Vec<OrderEvent>> {
        Ok(self.storage.get_events_for_order(order_id)?)
    }

    /// Rebuild a snapshot from its event stream (for verification)
    pub fn rebuild_snapshot(&self, order_id: &str) -> ManagerResult<OrderSnapshot> {
        let events = self.storage.get_events_for_order(order_id)?;
        if events.is_empty() {
            return Err(OrderError::OrderNotFound(order_id.to_string()).into());
        }

        let mut snapshot = OrderSnapshot::new(order_id.to_string());
        for event in &events {
            let applier: EventAction = event.into();
            applier.apply(&mut snapshot, event);
        }

        Ok(snapshot)
    }
}

impl Clone for OrdersManager {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            event_tx: self.event_tx.clone(),
            epoch: self.epoch.clone(),
            catalog: self.catalog.clone(),
            discounts: self.discounts.clone(),
            loyalty: self.loyalty.clone(),
            reservations: self.reservations.clone(),
            tz: self.tz,
        }
    }
}

#[cfg(test)]
mod tests;
