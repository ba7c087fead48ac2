use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Membership access level. Lower id means more privilege:
/// Admin (1) > Write (2) > Read (3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessLevel {
    Admin,
    Write,
    Read,
}

impl AccessLevel {
    pub const ALL: [AccessLevel; 3] = [AccessLevel::Admin, AccessLevel::Write, AccessLevel::Read];

    pub fn id(self) -> i64 {
        match self {
            AccessLevel::Admin => 1,
            AccessLevel::Write => 2,
            AccessLevel::Read => 3,
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.id() == id)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::Admin => "admin",
            AccessLevel::Write => "write",
            AccessLevel::Read => "read",
        }
    }

    /// True when a member holding `self` may do something that needs `required`.
    pub fn permits(self, required: AccessLevel) -> bool {
        self.id() <= required.id()
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" | "1" => Ok(AccessLevel::Admin),
            "write" | "2" => Ok(AccessLevel::Write),
            "read" | "3" => Ok(AccessLevel::Read),
            other => Err(format!("unknown access level: {}", other)),
        }
    }
}

impl Serialize for AccessLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Accepts either the level name or its numeric id.
impl<'de> Deserialize<'de> for AccessLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Id(i64),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Id(id) => AccessLevel::from_id(id)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown access level id: {}", id))),
            Raw::Name(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Company database model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Company {
    pub id: String,
    pub name: String,
}

/// One row of a company's member list.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub user_id: String,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub access_level: AccessLevel,
}

#[derive(Debug, FromRow)]
pub(crate) struct MemberRow {
    pub user_id: String,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub access_id: i64,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CreateCompanyRequest {
    #[serde(alias = "companyName")]
    pub name: String,
}

/// POST /v0/company/:company/adduser body; one of `email` or `username`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    pub access_level: AccessLevel,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeAccessRequest {
    pub user_id: String,
    pub access_level: AccessLevel,
}

/// Response for a freshly created company.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyCreated {
    pub message: String,
    pub company_id: String,
}
