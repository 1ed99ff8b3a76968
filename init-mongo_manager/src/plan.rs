use init_commons::{
    ADMIN_DB, ADMIN_PASSWORD, ADMIN_ROLES, ADMIN_USER, APP_DB, APP_PASSWORD, APP_ROLES, APP_USER,
    PATIENTS_COLLECTION,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A role grant, serialized as an entry of the `roles` array of `createUser`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub role: String,
    pub db: String,
}

impl Role {
    pub fn new(role: impl Into<String>, db: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            db: db.into(),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub password: String,
    pub roles: Vec<Role>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, password: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
            roles,
        }
    }

    #[cfg(test)]
    pub(crate) fn has_role(&self, role: &str, db: &str) -> bool {
        self.roles.iter().any(|r| r.role == role && r.db == db)
    }
}

// Keeps the password out of logs
impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("password", &"***")
            .field("roles", &self.roles)
            .finish()
    }
}

/// Everything the bootstrap creates
#[derive(Clone, Debug)]
pub struct BootstrapPlan {
    pub app_db: String,
    pub collection: String,
    pub app_user: NewUser,
    pub admin_db: String,
    pub admin_user: NewUser,
}

impl Default for BootstrapPlan {
    fn default() -> Self {
        let grants = |roles: &[&str], db: &str| -> Vec<Role> {
            roles.iter().map(|r| Role::new(*r, db)).collect()
        };

        Self {
            app_db: APP_DB.to_string(),
            collection: PATIENTS_COLLECTION.to_string(),
            app_user: NewUser::new(APP_USER, APP_PASSWORD, grants(APP_ROLES, APP_DB)),
            admin_db: ADMIN_DB.to_string(),
            admin_user: NewUser::new(ADMIN_USER, ADMIN_PASSWORD, grants(ADMIN_ROLES, ADMIN_DB)),
        }
    }
}
