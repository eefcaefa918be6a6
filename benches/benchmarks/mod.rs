pub mod engine;
pub mod persistence;
