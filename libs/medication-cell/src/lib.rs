pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::{medication_log_routes, medication_routes};
pub use services::{LogService, MedicationService};
