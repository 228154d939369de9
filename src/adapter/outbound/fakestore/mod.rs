//! Fake Store API catalog adapter.

pub mod client;
pub mod dto;
pub mod settings;

pub use client::FakeStoreClient;
pub use settings::CatalogConfig;
