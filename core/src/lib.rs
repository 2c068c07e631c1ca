//! Lead/sales dashboard core: synthetic data generation, flat-file
//! load/export, and the filter & aggregation pipeline behind the views.

pub mod config;
pub mod error;
pub mod generator;
pub mod palette;
pub mod pipeline;
pub mod record;
pub mod rng;
pub mod selection;
pub mod session;
pub mod store;
pub mod summary;
pub mod types;
