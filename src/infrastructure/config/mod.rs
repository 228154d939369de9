//! Infrastructure configuration modules.

pub mod cart;
pub mod logging;
pub mod settings;

pub use settings::Config;
