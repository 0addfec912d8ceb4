use super::super::storage::StorageError;
use super::super::traits::OrderError;
use shared::order::{CommandError, CommandErrorCode};
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("Order number collision persisted after {attempts} attempts")]
    DuplicateOrderNumber { attempts: u32 },

    #[error("Reservation conflict on table {table_id}")]
    ReservationConflict { table_id: i64 },

    #[error("Loyalty collaborator error: {0}")]
    Loyalty(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ManagerResult<T> = Result<T, ManagerError>;

/// Map storage failures to wire error codes (clients localize messages)
fn classify_storage_error(e: &StorageError) -> CommandErrorCode {
    match e {
        StorageError::Serialization(_) => return CommandErrorCode::InternalError,
        StorageError::OrderNotFound(_) => return CommandErrorCode::OrderNotFound,
        _ => {}
    }

    // redb errors are classified by message content
    let err_str = e.to_string().to_lowercase();
    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc") {
        return CommandErrorCode::StorageFull;
    }
    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return CommandErrorCode::StorageCorrupted;
    }
    CommandErrorCode::SystemBusy
}

fn classify_order_error(e: &OrderError) -> CommandErrorCode {
    match e {
        OrderError::OrderNotFound(_) => CommandErrorCode::OrderNotFound,
        OrderError::ItemNotFound(_) => CommandErrorCode::ItemNotFound,
        OrderError::ProductNotFound(_) => CommandErrorCode::ProductNotFound,
        OrderError::ProductStopListed(_) => CommandErrorCode::ProductStopListed,
        OrderError::AdditiveNotFound(_) => CommandErrorCode::AdditiveNotFound,
        OrderError::AddOnNotFound(_) => CommandErrorCode::AddOnNotFound,
        OrderError::DiscountNotFound(_) => CommandErrorCode::DiscountNotFound,
        OrderError::TableNotFound(_) => CommandErrorCode::TableNotFound,
        OrderError::TableOccupied(_) => CommandErrorCode::TableOccupied,
        OrderError::TableWrongRestaurant(_) => CommandErrorCode::TableWrongRestaurant,
        OrderError::InvalidOrderTransition { .. } | OrderError::InvalidItemTransition { .. } => {
            CommandErrorCode::InvalidStatusTransition
        }
        OrderError::OrderAlreadyPaid(_) => CommandErrorCode::OrderAlreadyPaid,
        OrderError::ItemNotEditable(_) => CommandErrorCode::ItemNotEditable,
        OrderError::Validation(_) => CommandErrorCode::ValidationFailed,
        OrderError::InsufficientBonusBalance { .. } => CommandErrorCode::InsufficientBonusBalance,
        OrderError::InvalidOperation(_) => CommandErrorCode::InvalidOperation,
        OrderError::Storage(_) => CommandErrorCode::InternalError,
    }
}

impl From<ManagerError> for CommandError {
    fn from(err: ManagerError) -> Self {
        let (code, message) = match &err {
            ManagerError::Storage(e) => {
                let code = classify_storage_error(e);
                tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
                (code, e.to_string())
            }
            ManagerError::Order(e) => (classify_order_error(e), e.to_string()),
            ManagerError::DuplicateOrderNumber { .. } => {
                (CommandErrorCode::DuplicateOrderNumber, err.to_string())
            }
            ManagerError::ReservationConflict { .. } => {
                (CommandErrorCode::ReservationConflict, err.to_string())
            }
            ManagerError::Loyalty(msg) => (CommandErrorCode::InternalError, msg.clone()),
            ManagerError::Internal(msg) => (CommandErrorCode::InternalError, msg.clone()),
        };
        CommandError::new(code, message)
    }
}
