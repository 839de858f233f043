//! Domain services. Handlers validate and authorize; services own the
//! business rules and run every multi-step mutation inside a database
//! transaction.

pub mod inventory;
pub mod menu;
pub mod orders;
pub mod restaurants;
pub mod settings;
pub mod tables;

use uuid::Uuid;

/// Explicit per-request context: who is acting and for which tenant.
/// Constructed by handlers from the authenticated user and passed down
/// rather than kept in any ambient state.
#[derive(Debug, Clone, Copy)]
pub struct RequestCtx {
    pub restaurant_id: Uuid,
    pub user_id: Uuid,
}
