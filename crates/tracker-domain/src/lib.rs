//! tracker-domain
//!
//! Pure domain records (Invoice, ExpenseItem, Template, PaymentCard, etc.).
//! No I/O, no HTTP, no storage. Only data types, enums, and wire helpers.

pub mod common;
pub mod dates;
pub mod expense;
pub mod invoice;
pub mod payment;
pub mod template;
pub mod user;

pub use common::*;
pub use expense::*;
pub use invoice::*;
pub use payment::*;
pub use template::*;
pub use user::*;
