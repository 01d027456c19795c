//! # Inventory
//!
//! Parts kept in category worksheets: record layout, identifier allocation,
//! search, and the service that ties them to a `TabularStore`.

pub mod allocator;
pub mod errors;
pub mod part;
pub mod search;
pub mod service;

pub use allocator::next_id;
pub use errors::{InventoryError, InventoryResult};
pub use part::{PartField, PartPayload, HEADER};
pub use service::{ConsistencyConfig, InventoryService, Listing, ServiceOptions, DEFAULT_PAGE};
