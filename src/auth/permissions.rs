/*!
 * # Permissions Module
 *
 * Permissions are `resource:action` strings. Each dashboard role maps to a
 * static permission set; `admin` additionally bypasses permission checks
 * entirely (platform operators).
 */

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Common permission string constants for compile-time safety
pub mod consts {
    // Inventory
    pub const INVENTORY_READ: &str = "inventory:read";
    pub const INVENTORY_CREATE: &str = "inventory:create";
    pub const INVENTORY_UPDATE: &str = "inventory:update";
    pub const INVENTORY_DELETE: &str = "inventory:delete";
    pub const INVENTORY_ADJUST: &str = "inventory:adjust";

    // Menu
    pub const MENU_READ: &str = "menu:read";
    pub const MENU_MANAGE: &str = "menu:manage";

    // Orders
    pub const ORDERS_READ: &str = "orders:read";
    pub const ORDERS_CREATE: &str = "orders:create";
    pub const ORDERS_UPDATE: &str = "orders:update";
    pub const ORDERS_CANCEL: &str = "orders:cancel";
    pub const ORDERS_PAY: &str = "orders:pay";

    // Tables
    pub const TABLES_READ: &str = "tables:read";
    pub const TABLES_MANAGE: &str = "tables:manage";
    pub const TABLES_UPDATE_STATUS: &str = "tables:update-status";

    // Restaurant registration and administration
    pub const RESTAURANTS_MANAGE: &str = "restaurants:manage";

    // Tenant-scoped user management
    pub const USERS_CREATE: &str = "users:create";

    // POS settings
    pub const SETTINGS_READ: &str = "settings:read";
    pub const SETTINGS_UPDATE: &str = "settings:update";

    // Reports
    pub const REPORTS_READ: &str = "reports:read";
}

/// Dashboard roles, mirrored in the `users.role` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Owner,
    Manager,
    Staff,
    Kitchen,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Owner => "owner",
            UserRole::Manager => "manager",
            UserRole::Staff => "staff",
            UserRole::Kitchen => "kitchen",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(UserRole::Admin),
            "owner" => Some(UserRole::Owner),
            "manager" => Some(UserRole::Manager),
            "staff" => Some(UserRole::Staff),
            "kitchen" => Some(UserRole::Kitchen),
            _ => None,
        }
    }
}

/// Static role -> permission mapping baked into issued tokens.
pub fn permissions_for_role(role: UserRole) -> Vec<&'static str> {
    use consts::*;
    match role {
        UserRole::Admin => vec!["*"],
        UserRole::Owner => vec![
            "inventory:*",
            "menu:*",
            "orders:*",
            "tables:*",
            "settings:*",
            USERS_CREATE,
            REPORTS_READ,
        ],
        UserRole::Manager => vec![
            "inventory:*",
            "menu:*",
            "orders:*",
            "tables:*",
            SETTINGS_READ,
            SETTINGS_UPDATE,
            REPORTS_READ,
        ],
        UserRole::Staff => vec![
            ORDERS_READ,
            ORDERS_CREATE,
            ORDERS_UPDATE,
            ORDERS_CANCEL,
            ORDERS_PAY,
            TABLES_READ,
            TABLES_UPDATE_STATUS,
            INVENTORY_READ,
            MENU_READ,
        ],
        UserRole::Kitchen => vec![ORDERS_READ, ORDERS_UPDATE, MENU_READ, INVENTORY_READ],
    }
}

/// Check if a held permission satisfies a required one, honoring
/// `resource:*` and global `*` wildcards.
pub fn is_permission_implied(user_perm: &str, required_perm: &str) -> bool {
    if user_perm == required_perm || user_perm == "*" {
        return true;
    }

    let user_parts: Vec<&str> = user_perm.split(':').collect();
    let required_parts: Vec<&str> = required_perm.split(':').collect();

    if user_parts.len() == 2 && required_parts.len() == 2 {
        let user_resource = user_parts[0];
        let user_action = user_parts[1];
        let required_resource = required_parts[0];

        if user_resource == required_resource && user_action == "*" {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_permissions_are_implied() {
        assert!(is_permission_implied("orders:*", consts::ORDERS_CANCEL));
        assert!(is_permission_implied("*", consts::INVENTORY_ADJUST));
        assert!(is_permission_implied(consts::MENU_READ, consts::MENU_READ));
    }

    #[test]
    fn unrelated_permissions_are_not_implied() {
        assert!(!is_permission_implied("orders:*", consts::INVENTORY_READ));
        assert!(!is_permission_implied(consts::MENU_READ, consts::MENU_MANAGE));
        assert!(!is_permission_implied("orders", consts::ORDERS_READ));
    }

    #[test]
    fn kitchen_cannot_create_orders() {
        let perms = permissions_for_role(UserRole::Kitchen);
        assert!(!perms
            .iter()
            .any(|p| is_permission_implied(p, consts::ORDERS_CREATE)));
        assert!(perms
            .iter()
            .any(|p| is_permission_implied(p, consts::ORDERS_UPDATE)));
    }

    #[test]
    fn staff_cannot_manage_menu_or_settings() {
        let perms = permissions_for_role(UserRole::Staff);
        assert!(!perms
            .iter()
            .any(|p| is_permission_implied(p, consts::MENU_MANAGE)));
        assert!(!perms
            .iter()
            .any(|p| is_permission_implied(p, consts::SETTINGS_UPDATE)));
        assert!(perms
            .iter()
            .any(|p| is_permission_implied(p, consts::ORDERS_PAY)));
    }

    #[test]
    fn owner_covers_all_tenant_resources() {
        let perms = permissions_for_role(UserRole::Owner);
        for required in [
            consts::INVENTORY_DELETE,
            consts::MENU_MANAGE,
            consts::ORDERS_CANCEL,
            consts::TABLES_MANAGE,
            consts::SETTINGS_UPDATE,
            consts::REPORTS_READ,
        ] {
            assert!(
                perms.iter().any(|p| is_permission_implied(p, required)),
                "owner missing {required}"
            );
        }
    }

    #[test]
    fn role_parsing_round_trips() {
        for role in [
            UserRole::Admin,
            UserRole::Owner,
            UserRole::Manager,
            UserRole::Staff,
            UserRole::Kitchen,
        ] {
            assert_eq!(UserRole::from_str(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::from_str("vendor"), None);
    }
}
