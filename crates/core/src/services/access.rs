//! Role-based access: permission table, viewer identity and visibility rules.

use scp_common::{AppError, AppResult};
use scp_db::entities::{chat_thread, complaint, incident, link, order, product, user};

pub use scp_db::entities::user::Role;

/// Fixed capability set of a role.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RolePermissions {
    pub can_approve_links: bool,
    pub can_manage_catalog: bool,
    pub can_manage_orders: bool,
    pub can_chat: bool,
    pub can_handle_complaints: bool,
    pub can_escalate: bool,
    pub can_manage_incidents: bool,
    pub can_manage_users: bool,
    pub can_view_analytics: bool,
}

const FULL: RolePermissions = RolePermissions {
    can_approve_links: true,
    can_manage_catalog: true,
    can_manage_orders: true,
    can_chat: true,
    can_handle_complaints: true,
    can_escalate: true,
    can_manage_incidents: true,
    can_manage_users: true,
    can_view_analytics: true,
};

/// Look up the permission set of a role.
///
/// Pure and total: Owner and Admin carry identical full permissions, Sales
/// gets order/chat/complaint rights, Consumer gets order/chat rights.
#[must_use]
pub const fn permissions_for(role: Role) -> RolePermissions {
    match role {
        Role::Owner | Role::Admin => FULL,
        Role::Sales => RolePermissions {
            can_approve_links: false,
            can_manage_catalog: false,
            can_manage_orders: true,
            can_chat: true,
            can_handle_complaints: true,
            can_escalate: true,
            can_manage_incidents: false,
            can_manage_users: false,
            can_view_analytics: false,
        },
        Role::Consumer => RolePermissions {
            can_approve_links: false,
            can_manage_catalog: false,
            can_manage_orders: true,
            can_chat: true,
            can_handle_complaints: false,
            can_escalate: false,
            can_manage_incidents: false,
            can_manage_users: false,
            can_view_analytics: false,
        },
    }
}

/// The authenticated identity every permission and visibility check runs
/// against.
///
/// Resolved once per request from the session user; supplier staff always
/// carry their company id here, consumers never do.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub user_id: String,
    pub role: Role,
    pub supplier_id: Option<String>,
}

impl Viewer {
    /// Build a viewer from a session user.
    ///
    /// Fails for deactivated accounts and for supplier-side users without a
    /// company, so downstream code can rely on the invariant.
    pub fn from_user(user: &user::Model) -> AppResult<Self> {
        if !user.is_active {
            return Err(AppError::Forbidden("Account is deactivated".to_string()));
        }

        if user.role.is_supplier_side() && user.supplier_id.is_none() {
            return Err(AppError::Forbidden(
                "Supplier account has no company".to_string(),
            ));
        }

        Ok(Self {
            user_id: user.id.clone(),
            role: user.role,
            supplier_id: user.supplier_id.clone(),
        })
    }

    /// Permission set of this viewer's role.
    #[must_use]
    pub const fn permissions(&self) -> RolePermissions {
        permissions_for(self.role)
    }

    /// The viewer's supplier company id, or Forbidden for consumers.
    pub fn supplier_scope(&self) -> AppResult<&str> {
        self.supplier_id
            .as_deref()
            .ok_or_else(|| AppError::Forbidden("Supplier role required".to_string()))
    }

    /// Require a permission bit, evaluated against this viewer's role.
    pub fn require(&self, allowed: bool, action: &str) -> AppResult<()> {
        if allowed {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Role {:?} may not {action}",
                self.role
            )))
        }
    }

    /// Require the consumer role.
    pub fn require_consumer(&self, action: &str) -> AppResult<()> {
        if self.role == Role::Consumer {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Only consumers may {action}"
            )))
        }
    }
}

/// Per-record visibility: a consumer sees records keyed on their user id, a
/// supplier-side viewer sees records keyed on their company id.
pub trait Visibility {
    /// Supplier company the record belongs to.
    fn record_supplier_id(&self) -> &str;

    /// Consumer user the record belongs to, where applicable.
    fn record_consumer_id(&self) -> Option<&str>;

    /// Whether the viewer may see this record.
    fn visible_to(&self, viewer: &Viewer) -> bool {
        if viewer.role == Role::Consumer {
            self.record_consumer_id() == Some(viewer.user_id.as_str())
        } else {
            viewer.supplier_id.as_deref() == Some(self.record_supplier_id())
        }
    }

    /// Visibility as a result, for use at read boundaries.
    fn check_visible(&self, viewer: &Viewer) -> AppResult<()> {
        if self.visible_to(viewer) {
            Ok(())
        } else {
            Err(AppError::Forbidden("Record is out of scope".to_string()))
        }
    }
}

impl Visibility for link::Model {
    fn record_supplier_id(&self) -> &str {
        &self.supplier_id
    }

    fn record_consumer_id(&self) -> Option<&str> {
        Some(&self.consumer_id)
    }
}

impl Visibility for order::Model {
    fn record_supplier_id(&self) -> &str {
        &self.supplier_id
    }

    fn record_consumer_id(&self) -> Option<&str> {
        Some(&self.consumer_id)
    }
}

impl Visibility for chat_thread::Model {
    fn record_supplier_id(&self) -> &str {
        &self.supplier_id
    }

    fn record_consumer_id(&self) -> Option<&str> {
        Some(&self.consumer_id)
    }
}

impl Visibility for complaint::Model {
    fn record_supplier_id(&self) -> &str {
        &self.supplier_id
    }

    fn record_consumer_id(&self) -> Option<&str> {
        Some(&self.reported_by)
    }
}

// Supplier-internal records: no consumer ever sees them.

impl Visibility for product::Model {
    fn record_supplier_id(&self) -> &str {
        &self.supplier_id
    }

    fn record_consumer_id(&self) -> Option<&str> {
        None
    }
}

impl Visibility for incident::Model {
    fn record_supplier_id(&self) -> &str {
        &self.supplier_id
    }

    fn record_consumer_id(&self) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use scp_db::entities::link::LinkStatus;

    fn consumer_viewer(user_id: &str) -> Viewer {
        Viewer {
            user_id: user_id.to_string(),
            role: Role::Consumer,
            supplier_id: None,
        }
    }

    fn supplier_viewer(user_id: &str, supplier_id: &str) -> Viewer {
        Viewer {
            user_id: user_id.to_string(),
            role: Role::Sales,
            supplier_id: Some(supplier_id.to_string()),
        }
    }

    fn test_link(id: &str, supplier_id: &str, consumer_id: &str) -> link::Model {
        link::Model {
            id: id.to_string(),
            supplier_id: supplier_id.to_string(),
            consumer_id: consumer_id.to_string(),
            status: LinkStatus::Approved,
            requested_at: Utc::now().into(),
            responded_at: None,
            responded_by: None,
            archived: false,
        }
    }

    // The full 4x9 permission table.
    #[test]
    fn test_owner_permissions() {
        let p = permissions_for(Role::Owner);
        assert!(p.can_approve_links);
        assert!(p.can_manage_catalog);
        assert!(p.can_manage_orders);
        assert!(p.can_chat);
        assert!(p.can_handle_complaints);
        assert!(p.can_escalate);
        assert!(p.can_manage_incidents);
        assert!(p.can_manage_users);
        assert!(p.can_view_analytics);
    }

    #[test]
    fn test_admin_permissions_equal_owner() {
        assert_eq!(permissions_for(Role::Admin), permissions_for(Role::Owner));
    }

    #[test]
    fn test_sales_permissions() {
        let p = permissions_for(Role::Sales);
        assert!(!p.can_approve_links);
        assert!(!p.can_manage_catalog);
        assert!(p.can_manage_orders);
        assert!(p.can_chat);
        assert!(p.can_handle_complaints);
        assert!(p.can_escalate);
        assert!(!p.can_manage_incidents);
        assert!(!p.can_manage_users);
        assert!(!p.can_view_analytics);
    }

    #[test]
    fn test_consumer_permissions() {
        let p = permissions_for(Role::Consumer);
        assert!(!p.can_approve_links);
        assert!(!p.can_manage_catalog);
        assert!(p.can_manage_orders);
        assert!(p.can_chat);
        assert!(!p.can_handle_complaints);
        assert!(!p.can_escalate);
        assert!(!p.can_manage_incidents);
        assert!(!p.can_manage_users);
        assert!(!p.can_view_analytics);
    }

    #[test]
    fn test_consumer_sees_exactly_own_links() {
        let viewer = consumer_viewer("consumer@x");
        let links = vec![
            test_link("l1", "sup1", "consumer@x"),
            test_link("l2", "sup1", "consumer@y"),
            test_link("l3", "sup2", "consumer@x"),
        ];

        let visible: Vec<&str> = links
            .iter()
            .filter(|l| l.visible_to(&viewer))
            .map(|l| l.id.as_str())
            .collect();

        assert_eq!(visible, vec!["l1", "l3"]);
    }

    #[test]
    fn test_supplier_sees_own_company_links() {
        let viewer = supplier_viewer("u1", "sup1");
        let links = vec![
            test_link("l1", "sup1", "consumer@x"),
            test_link("l2", "sup2", "consumer@x"),
        ];

        assert!(links[0].visible_to(&viewer));
        assert!(!links[1].visible_to(&viewer));
    }

    #[test]
    fn test_check_visible_out_of_scope_is_forbidden() {
        let viewer = supplier_viewer("u1", "sup1");
        let link = test_link("l1", "sup2", "consumer@x");

        assert!(matches!(
            link.check_visible(&viewer),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_viewer_from_inactive_user_rejected() {
        let user = user::Model {
            id: "u1".to_string(),
            email: "a@b.kz".to_string(),
            password_hash: "h".to_string(),
            name: "A".to_string(),
            phone: None,
            role: Role::Consumer,
            supplier_id: None,
            company_name: None,
            token: None,
            is_active: false,
            created_at: Utc::now().into(),
            updated_at: None,
        };

        assert!(matches!(
            Viewer::from_user(&user),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_viewer_supplier_side_requires_company() {
        let user = user::Model {
            id: "u1".to_string(),
            email: "a@b.kz".to_string(),
            password_hash: "h".to_string(),
            name: "A".to_string(),
            phone: None,
            role: Role::Sales,
            supplier_id: None,
            company_name: None,
            token: None,
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: None,
        };

        assert!(matches!(
            Viewer::from_user(&user),
            Err(AppError::Forbidden(_))
        ));
    }
}
