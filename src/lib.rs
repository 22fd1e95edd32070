//! scalptrader — scalping strategy plugins for a candle-driven trading host.
//!
//! Each strategy is an indicator plan, a set of rule blocks and a trade
//! policy. Hexagonal architecture: domain logic in [`domain`], port traits
//! in [`ports`], concrete implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
