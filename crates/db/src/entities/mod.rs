//! SeaORM entities.

#![allow(missing_docs)]

pub mod chat_message;
pub mod chat_thread;
pub mod complaint;
pub mod incident;
pub mod incident_log;
pub mod link;
pub mod order;
pub mod order_item;
pub mod product;
pub mod supplier;
pub mod user;

pub use chat_message::Entity as ChatMessage;
pub use chat_thread::Entity as ChatThread;
pub use complaint::Entity as Complaint;
pub use incident::Entity as Incident;
pub use incident_log::Entity as IncidentLog;
pub use link::Entity as Link;
pub use order::Entity as Order;
pub use order_item::Entity as OrderItem;
pub use product::Entity as Product;
pub use supplier::Entity as Supplier;
pub use user::Entity as User;
