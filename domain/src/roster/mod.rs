//! Roster domain
//!
//! The roster is the ordered list of agent personas queried in a run.
//! Roster order is canonical: sampling takes a prefix of it and every run
//! record iterates in it, regardless of the order in which tasks complete.

pub mod entities;

pub use entities::{AgentId, Roster, RosterEntry};
