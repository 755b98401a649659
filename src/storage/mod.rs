pub mod csv_store;
pub mod row;

pub use csv_store::RecordStore;
pub use row::parse_legacy_path;
