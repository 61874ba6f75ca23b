/// Raw data ingestion: CSV tables from blob storage, typed at the boundary.
pub mod fixtures;
pub mod loader;
pub mod records;
pub mod table;

pub use loader::DataLoader;
pub use table::{Table, TableRow};
