// Application layer - Use cases over the report source
pub mod normalizer;
pub mod report_source;
pub mod view_controller;
