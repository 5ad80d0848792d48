pub mod console;
pub mod report_model;
