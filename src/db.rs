// src/db.rs

pub mod gateway;
pub mod mapping;
pub mod records;
pub mod remote_repo;

pub use gateway::{PgGateway, RowGateway};
pub use records::RemoteRecord;
pub use remote_repo::RemoteRepository;
