//! Unified error system for the Comanda engine
//!
//! Provides [`ErrorCode`], a stable u16 code space shared with clients,
//! and [`AppError`], the rich error type used by services and
//! collaborators.
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Product / catalog errors
//! - 7xxx: Table errors
//! - 8xxx: Loyalty errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Unified error code enum
///
/// Codes are represented as u16 values for efficient serialization and
/// cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Value out of range
    ValueOutOfRange = 6,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Disallowed status transition
    InvalidStatusTransition = 4002,
    /// Item not found in order
    ItemNotFound = 4003,
    /// Item is not editable in its current status
    ItemNotEditable = 4004,
    /// Order number collision persisted after retries
    DuplicateOrderNumber = 4005,

    // ==================== 5xxx: Payment ====================
    /// Payment not found
    PaymentNotFound = 5001,
    /// Order payment is already settled
    OrderAlreadyPaid = 5002,

    // ==================== 6xxx: Product / Catalog ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product is stop-listed for this restaurant
    ProductStopListed = 6002,
    /// Additive not found
    AdditiveNotFound = 6003,
    /// Order add-on definition not found
    AddOnNotFound = 6004,
    /// Discount not found
    DiscountNotFound = 6005,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table is occupied by another active order
    TableOccupied = 7002,
    /// Table belongs to a different restaurant
    TableWrongRestaurant = 7003,
    /// A confirmed reservation conflicts with the assignment
    ReservationConflict = 7004,

    // ==================== 8xxx: Loyalty ====================
    /// Not enough bonus points for the redemption
    InsufficientBonusBalance = 8001,
    /// Loyalty collaborator unavailable
    LoyaltyUnavailable = 8002,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Storage is full
    StorageFull = 9002,
    /// Storage is corrupted
    StorageCorrupted = 9003,
    /// System is busy, retry later
    SystemBusy = 9004,
}

impl ErrorCode {
    /// Default human-readable message for this code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",
            Self::ValueOutOfRange => "Value out of range",
            Self::OrderNotFound => "Order not found",
            Self::InvalidStatusTransition => "Invalid status transition",
            Self::ItemNotFound => "Item not found",
            Self::ItemNotEditable => "Item is not editable",
            Self::DuplicateOrderNumber => "Duplicate order number",
            Self::PaymentNotFound => "Payment not found",
            Self::OrderAlreadyPaid => "Order payment already settled",
            Self::ProductNotFound => "Product not found",
            Self::ProductStopListed => "Product is stop-listed",
            Self::AdditiveNotFound => "Additive not found",
            Self::AddOnNotFound => "Order add-on not found",
            Self::DiscountNotFound => "Discount not found",
            Self::TableNotFound => "Table not found",
            Self::TableOccupied => "Table is occupied",
            Self::TableWrongRestaurant => "Table belongs to a different restaurant",
            Self::ReservationConflict => "Reservation conflict",
            Self::InsufficientBonusBalance => "Insufficient bonus balance",
            Self::LoyaltyUnavailable => "Loyalty service unavailable",
            Self::InternalError => "Internal error",
            Self::StorageFull => "Storage full",
            Self::StorageCorrupted => "Storage corrupted",
            Self::SystemBusy => "System busy",
        }
    }

    /// Numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error returned when converting an unknown u16 into [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,
            6 => Self::ValueOutOfRange,
            4001 => Self::OrderNotFound,
            4002 => Self::InvalidStatusTransition,
            4003 => Self::ItemNotFound,
            4004 => Self::ItemNotEditable,
            4005 => Self::DuplicateOrderNumber,
            5001 => Self::PaymentNotFound,
            5002 => Self::OrderAlreadyPaid,
            6001 => Self::ProductNotFound,
            6002 => Self::ProductStopListed,
            6003 => Self::AdditiveNotFound,
            6004 => Self::AddOnNotFound,
            6005 => Self::DiscountNotFound,
            7001 => Self::TableNotFound,
            7002 => Self::TableOccupied,
            7003 => Self::TableWrongRestaurant,
            7004 => Self::ReservationConflict,
            8001 => Self::InsufficientBonusBalance,
            8002 => Self::LoyaltyUnavailable,
            9001 => Self::InternalError,
            9002 => Self::StorageFull,
            9003 => Self::StorageCorrupted,
            9004 => Self::SystemBusy,
            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

/// Application error with structured error code and details
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field-level errors, context, etc.)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", r))
            .with_detail("resource", r)
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::AlreadyExists, msg)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }
}

/// Result alias for application errors
pub type AppResult<T> = Result<T, AppError>;
