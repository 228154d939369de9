//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                 ┌──────────────────────────┐
//!                 │       Application        │
//!                 │  cart service, adapters  │
//!                 └────────────┬─────────────┘
//!              ┌───────────────┴───────────────┐
//!              ▼                               ▼
//!        ┌───────────┐                   ┌───────────┐
//!        │ CartStore │                   │  Catalog  │
//!        │  sqlite / │                   │ fakestore │
//!        │  memory   │                   │   HTTP    │
//!        └───────────┘                   └───────────┘
//! ```

pub mod outbound;

pub use outbound::catalog::Catalog;
pub use outbound::store::CartStore;
