//! Role - ロール文字列を能力（capability）の集合に変換
//!
//! API から来るロール名は一度だけ `Role` に変換し、
//! 画面側は `role.can(Capability::X)` だけで判定します。

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ManageUsers,
    ApproveTimesheets,
    ApproveLeave,
    ManageProjects,
    ManageInventory,
    ViewAllAttendance,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    SuperAdmin,
    Manager,
    Employee,
    Student,
    /// Unknown role names are kept verbatim and grant nothing.
    Other(String),
}

impl Role {
    pub fn parse(name: &str) -> Self {
        match name {
            "super_admin" => Role::SuperAdmin,
            "manager" => Role::Manager,
            "employee" => Role::Employee,
            "student" => Role::Student,
            other => Role::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
            Role::Student => "student",
            Role::Other(name) => name,
        }
    }

    pub fn capabilities(&self) -> &'static [Capability] {
        use Capability::*;
        match self {
            Role::SuperAdmin => &[
                ManageUsers,
                ApproveTimesheets,
                ApproveLeave,
                ManageProjects,
                ManageInventory,
                ViewAllAttendance,
            ],
            Role::Manager => &[
                ApproveTimesheets,
                ApproveLeave,
                ManageProjects,
                ManageInventory,
                ViewAllAttendance,
            ],
            Role::Employee | Role::Student | Role::Other(_) => &[],
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Role::parse(&s)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
