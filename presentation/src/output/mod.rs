//! Output formatting for run records

pub mod console;
