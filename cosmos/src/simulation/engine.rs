//! High-level runtime engine settings
//!
//! Selects which body index the driver builds over the hierarchy and
//! whether it also partitions the bodies into a mass-balanced cluster

use crate::configuration::config::IndexConfig;

#[derive(Debug, Clone)]
pub struct Engine {
    pub index: IndexConfig, // ordered, hash or flat
    pub balance: bool, // true = build a BalancedCluster over all bodies
}
