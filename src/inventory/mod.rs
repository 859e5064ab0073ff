// Inventory grouping and document model
pub mod builder;
pub mod types;

pub use builder::build_inventory;
pub use types::Inventory;
