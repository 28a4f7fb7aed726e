use std::fmt;

use serde::{Deserialize, Serialize};

use super::de;

/// Entry of `GET /access/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// `name@realm`. Absent from single-user responses.
    #[serde(default)]
    pub userid: String,
    #[serde(default, deserialize_with = "de::flag")]
    pub enable: bool,
    /// Unix timestamp; `0` means never.
    #[serde(default)]
    pub expire: Option<i64>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub groups: Option<String>,
    #[serde(default)]
    pub realm_type: Option<String>,
}

impl User {
    pub fn full_name(&self) -> Option<String> {
        match (self.firstname.as_deref(), self.lastname.as_deref()) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(one), None) | (None, Some(one)) => Some(one.to_owned()),
            (None, None) => None,
        }
    }
}

/// Body of `POST /access/users`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreateRequest {
    pub userid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "de::opt_flag_as_int",
        deserialize_with = "de::opt_flag"
    )]
    pub enable: Option<bool>,
}

impl UserCreateRequest {
    pub fn new(userid: impl Into<String>) -> Self {
        Self {
            userid: userid.into(),
            password: None,
            comment: None,
            email: None,
            firstname: None,
            lastname: None,
            groups: None,
            expire: None,
            enable: None,
        }
    }
}

impl fmt::Debug for UserCreateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCreateRequest")
            .field("userid", &self.userid)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("comment", &self.comment)
            .field("email", &self.email)
            .field("firstname", &self.firstname)
            .field("lastname", &self.lastname)
            .field("groups", &self.groups)
            .field("expire", &self.expire)
            .field("enable", &self.enable)
            .finish()
    }
}

/// Body of `PUT /access/users/{userid}`. Only supplied fields change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "de::opt_flag_as_int",
        deserialize_with = "de::opt_flag"
    )]
    pub enable: Option<bool>,
}

impl UserUpdateRequest {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
