pub mod family;
pub mod invite;
pub mod scope;

pub use family::FamilyService;
pub use invite::{generate_invite_code, InviteCodeService};
pub use scope::{FamilyScope, ScopeService};
