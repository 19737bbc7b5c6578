//! Progress reporting for runs

pub mod reporter;
