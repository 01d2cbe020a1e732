//! Pure business rules. Nothing here touches the database or the clock.

pub mod kra;
pub mod permissions;
pub mod sandwich;

pub use kra::{calculate_weighted_percentage, score_evaluations};
pub use permissions::PermissionSet;
pub use sandwich::{SandwichLeaveResult, calculate_sandwich_leave};
