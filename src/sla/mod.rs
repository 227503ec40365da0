//! SLA classification of tickets on top of the business calendar.

pub mod activity;
pub mod evaluator;
pub mod targets;
pub mod work_notes;

pub use activity::TeamActivity;
pub use evaluator::SlaEvaluator;
pub use targets::{PriorityTargets, SlaTargets};
pub use work_notes::{parse_work_notes, WorkNote};
