//! Static page registry. Every page the portal can show is listed here once;
//! navigation resolves keys against this table and nothing else.

use serde::Serialize;

use crate::session::Role;

/// Page shown at startup, after logout, and whenever navigation fails.
pub const DEFAULT_PAGE: &str = HOME;

pub const HOME: &str = "Home";
pub const USER_LOGIN: &str = "User_Login";
pub const ADMIN_LOGIN: &str = "Admin_Login";
pub const REGISTER: &str = "Register";
pub const FORGOT_PASSWORD: &str = "Forgot_Password";
pub const STUDENT_DASHBOARD: &str = "Student_Dashboard";
pub const ADMIN_DASHBOARD: &str = "Admin_Dashboard";
pub const PLACEMENT_DASHBOARD: &str = "Placement_Dashboard";

/// Which session role a page demands. Matching is exact: an admin does not
/// satisfy a `Student` page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredRole {
    Any,
    Student,
    Admin,
}

impl RequiredRole {
    pub fn permits(self, role: Role) -> bool {
        match self {
            RequiredRole::Any => true,
            RequiredRole::Student => role == Role::Student,
            RequiredRole::Admin => role == Role::Admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageDescriptor {
    pub key: &'static str,
    pub display_name: &'static str,
    pub required_role: RequiredRole,
}

static REGISTRY: [PageDescriptor; 8] = [
    PageDescriptor {
        key: HOME,
        display_name: "🏠 Home",
        required_role: RequiredRole::Any,
    },
    PageDescriptor {
        key: USER_LOGIN,
        display_name: "👤 Student Login",
        required_role: RequiredRole::Any,
    },
    PageDescriptor {
        key: ADMIN_LOGIN,
        display_name: "👑 Admin Login",
        required_role: RequiredRole::Any,
    },
    PageDescriptor {
        key: REGISTER,
        display_name: "📝 Register",
        required_role: RequiredRole::Any,
    },
    PageDescriptor {
        key: FORGOT_PASSWORD,
        display_name: "🔐 Forgot Password",
        required_role: RequiredRole::Any,
    },
    PageDescriptor {
        key: STUDENT_DASHBOARD,
        display_name: "🎯 Student Dashboard",
        required_role: RequiredRole::Student,
    },
    PageDescriptor {
        key: ADMIN_DASHBOARD,
        display_name: "📊 Admin Dashboard",
        required_role: RequiredRole::Admin,
    },
    PageDescriptor {
        key: PLACEMENT_DASHBOARD,
        display_name: "📈 Placement Analytics",
        required_role: RequiredRole::Admin,
    },
];

/// All registered pages, in menu order.
pub fn all() -> &'static [PageDescriptor] {
    &REGISTRY
}

pub fn lookup(key: &str) -> Option<&'static PageDescriptor> {
    REGISTRY.iter().find(|page| page.key == key)
}

pub fn default_page() -> &'static PageDescriptor {
    &REGISTRY[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_unique() {
        let mut keys: Vec<_> = all().iter().map(|p| p.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), all().len());
    }

    #[test]
    fn test_default_page_is_home_and_open() {
        assert_eq!(default_page().key, DEFAULT_PAGE);
        assert_eq!(default_page().required_role, RequiredRole::Any);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(lookup("Admin_Dashboard").is_some());
        assert!(lookup("admin_dashboard").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn test_role_matching_is_flat() {
        assert!(RequiredRole::Any.permits(Role::Guest));
        assert!(RequiredRole::Student.permits(Role::Student));
        assert!(!RequiredRole::Student.permits(Role::Admin));
        assert!(!RequiredRole::Admin.permits(Role::Student));
        assert!(!RequiredRole::Admin.permits(Role::Guest));
    }
}
