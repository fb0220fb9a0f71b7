//! Scenario tests
//!
//! Whole-encounter scenarios:
//! - Combat: hits, fumbles, termination and the properties every fight keeps
//! - Luck: near-miss negotiation and Luck accounting
//! - Deeds: mighty deeds with trade goods
//! - Driver: paced runs to completion

pub mod combat;
pub mod deeds;
pub mod driver;
pub mod luck;
