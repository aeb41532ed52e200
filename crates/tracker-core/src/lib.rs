//! tracker-core
//!
//! Expense transforms, template shaping and client-side validation for the
//! invoice tracker. Depends on tracker-domain. No CLI, no HTTP, no direct
//! filesystem access.

pub mod card_service;
pub mod error;
pub mod expense_service;
pub mod format;
pub mod storage;
pub mod summary_service;
pub mod template_service;
pub mod time;
pub mod transform_service;
pub mod validation;

pub use card_service::*;
pub use error::CoreError;
pub use expense_service::*;
pub use format::*;
pub use storage::*;
pub use summary_service::*;
pub use template_service::*;
pub use time::*;
pub use transform_service::*;
pub use validation::*;

#[cfg(test)]
mod tests;
