pub mod build;
pub mod create;
