//! Existence check engine

pub mod checker;

pub use checker::{exec, run_check, ExistenceChecker};
