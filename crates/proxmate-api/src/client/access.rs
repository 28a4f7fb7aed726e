use super::{Access, PveClient, require_non_blank, to_body};
use crate::error::Error;
use crate::models::{User, UserCreateRequest, UserUpdateRequest};

impl PveClient {
    /// `GET /access/users`
    pub async fn users(&self) -> Result<Vec<User>, Error> {
        self.get_list(self.endpoint(&["access", "users"]), &[]).await
    }

    /// `GET /access/users/{userid}`
    pub async fn user(&self, userid: &str) -> Result<User, Error> {
        let userid = require_non_blank("userid", userid)?;
        let mut user: User = self
            .get_object(
                self.endpoint(&["access", "users", userid]),
                &[],
                Access::Authenticated,
            )
            .await?;
        if user.userid.is_empty() {
            userid.clone_into(&mut user.userid);
        }
        Ok(user)
    }

    /// `POST /access/users`
    pub async fn create_user(&self, request: &UserCreateRequest) -> Result<(), Error> {
        validate_userid(&request.userid)?;
        let body = to_body("request", request)?;
        self.post_unit(self.endpoint(&["access", "users"]), Some(&body))
            .await
    }

    /// `PUT /access/users/{userid}`
    pub async fn update_user(&self, userid: &str, request: &UserUpdateRequest) -> Result<(), Error> {
        let userid = validate_userid(userid)?;
        if request.is_empty() {
            return Err(Error::invalid_input("request", "no fields to update"));
        }
        let body = to_body("request", request)?;
        self.put_unit(self.endpoint(&["access", "users", userid]), Some(&body))
            .await
    }

    /// `DELETE /access/users/{userid}`
    pub async fn delete_user(&self, userid: &str) -> Result<(), Error> {
        let userid = validate_userid(userid)?;
        self.delete_unit(self.endpoint(&["access", "users", userid]))
            .await
    }
}

/// User ids are `name@realm`.
fn validate_userid(userid: &str) -> Result<&str, Error> {
    let userid = require_non_blank("userid", userid)?;
    match userid.split_once('@') {
        Some((name, realm)) if !name.is_empty() && !realm.is_empty() => Ok(userid),
        _ => Err(Error::invalid_input(
            "userid",
            format!("`{userid}` is not of the form name@realm"),
        )),
    }
}
