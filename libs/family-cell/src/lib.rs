pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::family_routes;
pub use services::{FamilyScope, FamilyService, InviteCodeService, ScopeService};
