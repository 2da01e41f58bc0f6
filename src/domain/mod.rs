// Domain layer - Pure dashboard types
pub mod dashboard;
pub mod identity;
pub mod period;
pub mod report;
pub mod view_state;
