//! # Repository Implementations
//!
//! One repository per aggregate. Each holds a clone of the connection pool
//! and converts raw rows into `qbu-core` entities at this boundary - the
//! rest of the system never sees an untyped row.

pub mod audit;
pub mod order;
pub mod pricing_config;
pub mod shipping;
pub mod ticket;
