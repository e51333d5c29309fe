//! Infrastructure layer: in-memory storage and demo data.

pub mod repositories;
pub mod seed;
pub mod store;

pub use repositories::Repositories;
pub use seed::{DemoData, seed_demo_data, seed_topics};
pub use store::{InMemoryStore, Store};
