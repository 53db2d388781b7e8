//! Database repositories.

#![allow(missing_docs)]

pub mod chat;
pub mod complaint;
pub mod incident;
pub mod link;
pub mod order;
pub mod product;
pub mod supplier;
pub mod user;

pub use chat::ChatRepository;
pub use complaint::ComplaintRepository;
pub use incident::IncidentRepository;
pub use link::LinkRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use supplier::SupplierRepository;
pub use user::UserRepository;
