pub mod bank;
pub mod flow;
pub mod interview;
pub mod report;
pub mod scoring;
pub mod settings;
pub mod utils;
