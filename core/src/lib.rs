//! Loyalty rewards engine: point balance, earn/redeem ledger, tiers,
//! a daily check-in streak, a daily prize wheel and redemption codes.

pub mod catalog;
pub mod checkin;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod gate;
pub mod ledger;
pub mod redemption;
pub mod rng;
pub mod service;
pub mod spin;
pub mod state;
pub mod store;
pub mod tiers;
pub mod types;
