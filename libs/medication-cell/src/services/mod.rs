pub mod logs;
pub mod medication;
pub mod schedule;

pub use logs::LogService;
pub use medication::MedicationService;
pub use schedule::{planned_doses, PlannedDose};
