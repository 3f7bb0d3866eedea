pub mod aqi;
pub mod error;
pub mod features;
pub mod fusion;
pub mod loaders;
pub mod output;
pub mod stats;
pub mod table;

pub use error::NowcastError;
