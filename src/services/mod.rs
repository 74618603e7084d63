//! Services Layer
//!
//! Business logic that spans several tables, kept out of the HTTP handlers.

pub mod account_service;
pub mod library_service;
pub mod purchase_service;
pub mod reading_service;

pub use purchase_service::{PurchaseReceipt, purchase};
pub use reading_service::{ReadingView, open_book};
