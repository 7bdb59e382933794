//! Baseline department catalog loaded by the `seed` command.

pub struct CategorySeed {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub struct PermissionSeed {
    pub category: &'static str,
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub struct RoleSeed {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub level: i32,
    pub parent: Option<&'static str>,
}

/// Role that the bootstrap administrator receives.
pub const ADMINISTRATOR_ROLE: &str = "admin";

pub const CATEGORIES: &[CategorySeed] = &[
    CategorySeed {
        key: "user",
        name: "User Management",
        description: "Permissions related to user administration",
    },
    CategorySeed {
        key: "case",
        name: "Case Management",
        description: "Permissions related to case handling",
    },
    CategorySeed {
        key: "evidence",
        name: "Evidence Handling",
        description: "Permissions related to evidence management",
    },
    CategorySeed {
        key: "role",
        name: "Role Management",
        description: "Permissions related to role administration",
    },
    CategorySeed {
        key: "report",
        name: "Reporting",
        description: "Permissions related to viewing and generating reports",
    },
    CategorySeed {
        key: "system",
        name: "System Administration",
        description: "Permissions related to system settings",
    },
];

const fn permission(
    category: &'static str,
    code: &'static str,
    name: &'static str,
    description: &'static str,
) -> PermissionSeed {
    PermissionSeed {
        category,
        code,
        name,
        description,
    }
}

pub const PERMISSIONS: &[PermissionSeed] = &[
    permission("user", "user.create", "Create User", "Can create new users"),
    permission("user", "user.view", "View Users", "Can view user details"),
    permission("user", "user.edit", "Edit User", "Can edit user information"),
    permission("user", "user.delete", "Delete User", "Can delete users"),
    permission("case", "case.create", "Create Case", "Can create new cases"),
    permission("case", "case.view", "View Cases", "Can view case details"),
    permission("case", "case.edit", "Edit Case", "Can edit case information"),
    permission("case", "case.delete", "Delete Case", "Can delete cases"),
    permission("case", "case.close", "Close Case", "Can close cases"),
    permission("case", "case.assign", "Assign Case", "Can assign officers to cases"),
    permission("evidence", "evidence.upload", "Upload Evidence", "Can upload new evidence"),
    permission("evidence", "evidence.view", "View Evidence", "Can view evidence details"),
    permission("evidence", "evidence.edit", "Edit Evidence", "Can edit evidence information"),
    permission("evidence", "evidence.delete", "Delete Evidence", "Can delete evidence"),
    permission(
        "evidence",
        "evidence.confidential",
        "Access Confidential Evidence",
        "Can access confidential evidence",
    ),
    permission("role", "role.create", "Create Role", "Can create new roles"),
    permission("role", "role.view", "View Roles", "Can view role details"),
    permission("role", "role.edit", "Edit Role", "Can edit role information"),
    permission("role", "role.delete", "Delete Role", "Can delete roles"),
    permission("role", "role.assign", "Assign Role", "Can assign roles to users"),
    permission("report", "report.view", "View Reports", "Can view reports"),
    permission("report", "report.create", "Create Reports", "Can generate new reports"),
    permission("report", "report.export", "Export Reports", "Can export reports"),
    permission("system", "system.settings", "Manage System Settings", "Can change system settings"),
    permission("system", "system.audit", "View Audit Logs", "Can view audit logs"),
];

/// Parents are listed before their children.
pub const ROLES: &[RoleSeed] = &[
    RoleSeed {
        key: "admin",
        name: "Administrator",
        description: "System administrator with full access",
        level: 100,
        parent: None,
    },
    RoleSeed {
        key: "chief",
        name: "Police Chief",
        description: "Head of the police department",
        level: 90,
        parent: Some("admin"),
    },
    RoleSeed {
        key: "captain",
        name: "Captain",
        description: "Senior officer overseeing divisions",
        level: 80,
        parent: Some("chief"),
    },
    RoleSeed {
        key: "lieutenant",
        name: "Lieutenant",
        description: "Mid-level officer in charge of sergeants",
        level: 70,
        parent: Some("captain"),
    },
    RoleSeed {
        key: "sergeant",
        name: "Sergeant",
        description: "Supervisor in charge of officers",
        level: 60,
        parent: Some("lieutenant"),
    },
    RoleSeed {
        key: "detective",
        name: "Detective",
        description: "Investigative officer",
        level: 50,
        parent: Some("sergeant"),
    },
    RoleSeed {
        key: "officer",
        name: "Police Officer",
        description: "Regular patrol officer",
        level: 40,
        parent: Some("sergeant"),
    },
    RoleSeed {
        key: "trainee",
        name: "Trainee Officer",
        description: "Officer in training",
        level: 30,
        parent: Some("officer"),
    },
    RoleSeed {
        key: "analyst",
        name: "Crime Analyst",
        description: "Data analyst for crime patterns",
        level: 50,
        parent: Some("lieutenant"),
    },
    RoleSeed {
        key: "civilian",
        name: "Civilian Staff",
        description: "Non-officer support staff",
        level: 20,
        parent: Some("lieutenant"),
    },
];

pub const GRANTS: &[(&str, &[&str])] = &[
    (
        "admin",
        &[
            "user.create",
            "user.view",
            "user.edit",
            "user.delete",
            "case.create",
            "case.view",
            "case.edit",
            "case.delete",
            "case.close",
            "case.assign",
            "evidence.upload",
            "evidence.view",
            "evidence.edit",
            "evidence.delete",
            "evidence.confidential",
            "role.create",
            "role.view",
            "role.edit",
            "role.delete",
            "role.assign",
            "report.view",
            "report.create",
            "report.export",
            "system.settings",
            "system.audit",
        ],
    ),
    (
        "chief",
        &[
            "user.create",
            "user.view",
            "user.edit",
            "user.delete",
            "case.create",
            "case.view",
            "case.edit",
            "case.delete",
            "case.close",
            "case.assign",
            "evidence.upload",
            "evidence.view",
            "evidence.edit",
            "evidence.delete",
            "evidence.confidential",
            "role.view",
            "role.assign",
            "report.view",
            "report.create",
            "report.export",
            "system.audit",
        ],
    ),
    (
        "captain",
        &[
            "user.view",
            "user.edit",
            "case.create",
            "case.view",
            "case.edit",
            "case.close",
            "case.assign",
            "evidence.upload",
            "evidence.view",
            "evidence.edit",
            "evidence.confidential",
            "role.view",
            "role.assign",
            "report.view",
            "report.create",
            "report.export",
            "system.audit",
        ],
    ),
    (
        "lieutenant",
        &[
            "user.view",
            "case.create",
            "case.view",
            "case.edit",
            "case.close",
            "case.assign",
            "evidence.upload",
            "evidence.view",
            "evidence.edit",
            "evidence.confidential",
            "report.view",
            "report.create",
        ],
    ),
    (
        "sergeant",
        &[
            "user.view",
            "case.create",
            "case.view",
            "case.edit",
            "case.assign",
            "evidence.upload",
            "evidence.view",
            "evidence.edit",
            "report.view",
            "report.create",
        ],
    ),
    (
        "detective",
        &[
            "case.create",
            "case.view",
            "case.edit",
            "evidence.upload",
            "evidence.view",
            "evidence.edit",
            "report.view",
            "report.create",
        ],
    ),
    (
        "officer",
        &[
            "case.create",
            "case.view",
            "evidence.upload",
            "evidence.view",
            "report.view",
        ],
    ),
    ("trainee", &["case.view", "evidence.view"]),
    (
        "analyst",
        &[
            "case.view",
            "evidence.view",
            "report.view",
            "report.create",
            "report.export",
        ],
    ),
    ("civilian", &["case.view", "report.view"]),
];

/// Manager role key first, manageable role key second.
pub const MANAGEMENT_EDGES: &[(&str, &str)] = &[
    ("admin", "chief"),
    ("admin", "captain"),
    ("admin", "lieutenant"),
    ("admin", "sergeant"),
    ("admin", "detective"),
    ("admin", "officer"),
    ("admin", "trainee"),
    ("admin", "analyst"),
    ("admin", "civilian"),
    ("chief", "captain"),
    ("chief", "lieutenant"),
    ("chief", "sergeant"),
    ("chief", "detective"),
    ("chief", "officer"),
    ("chief", "trainee"),
    ("chief", "analyst"),
    ("chief", "civilian"),
    ("captain", "lieutenant"),
    ("captain", "sergeant"),
    ("captain", "detective"),
    ("captain", "officer"),
    ("captain", "trainee"),
    ("captain", "analyst"),
    ("captain", "civilian"),
    ("lieutenant", "sergeant"),
    ("lieutenant", "detective"),
    ("lieutenant", "officer"),
    ("lieutenant", "trainee"),
    ("lieutenant", "civilian"),
    ("sergeant", "officer"),
    ("sergeant", "trainee"),
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{
        ADMINISTRATOR_ROLE, CATEGORIES, GRANTS, MANAGEMENT_EDGES, PERMISSIONS, ROLES,
    };

    fn role_keys() -> HashSet<&'static str> {
        ROLES.iter().map(|role| role.key).collect()
    }

    #[test]
    fn catalog_has_expected_shape() {
        assert_eq!(CATEGORIES.len(), 6);
        assert_eq!(PERMISSIONS.len(), 25);
        assert_eq!(ROLES.len(), 10);
        assert_eq!(MANAGEMENT_EDGES.len(), 31);
        assert!(role_keys().contains(ADMINISTRATOR_ROLE));
    }

    #[test]
    fn permission_codes_are_unique_and_categorized() {
        let categories: HashSet<&str> = CATEGORIES.iter().map(|category| category.key).collect();
        let mut codes = HashSet::new();
        for permission in PERMISSIONS {
            assert!(categories.contains(permission.category));
            assert!(codes.insert(permission.code), "duplicate code {}", permission.code);
        }
    }

    #[test]
    fn parents_precede_children() {
        let mut seen = HashSet::new();
        for role in ROLES {
            if let Some(parent) = role.parent {
                assert!(seen.contains(parent), "{} listed before {parent}", role.key);
            }
            seen.insert(role.key);
        }
    }

    #[test]
    fn grants_and_edges_reference_known_entries() {
        let roles = role_keys();
        let codes: HashSet<&str> = PERMISSIONS.iter().map(|permission| permission.code).collect();

        for (role, granted) in GRANTS {
            assert!(roles.contains(role));
            assert!(granted.iter().all(|code| codes.contains(code)));
        }

        let mut edges = HashSet::new();
        for (manager, manageable) in MANAGEMENT_EDGES {
            assert!(roles.contains(manager) && roles.contains(manageable));
            assert_ne!(manager, manageable);
            assert!(edges.insert((manager, manageable)));
        }
    }
}
