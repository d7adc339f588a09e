//! 应用层

pub mod probes;
pub mod products;
