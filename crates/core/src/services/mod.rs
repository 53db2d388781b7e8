//! Business logic services.

#![allow(missing_docs)]

pub mod access;
pub mod analytics;
pub mod catalog;
pub mod chat;
pub mod complaint;
pub mod incident;
pub mod link;
pub mod order;
pub mod supplier;
pub mod user;

pub use access::{Role, RolePermissions, Viewer, Visibility, permissions_for};
pub use analytics::{AnalyticsService, Dashboard};
pub use catalog::{CatalogService, CreateProductInput, UpdateProductInput};
pub use chat::{ChatService, SendMessageInput, ThreadSummary};
pub use complaint::{ComplaintService, CreateComplaintInput};
pub use incident::{CreateIncidentInput, IncidentService};
pub use link::LinkService;
pub use order::{CreateOrderInput, OrderItemInput, OrderService, OrderWithItems};
pub use supplier::SupplierService;
pub use user::{CreateStaffInput, RegisterInput, UserService};
