//! Wires for the identity value objects.
//!
//! `GroupWire` and `UserWire` take the wire of their parts as a type parameter,
//! so a caller can swap the permission (or group) encoding without touching
//! the composite.
use serde_json::{Value, json};

use crate::domain::auth::models::{Group, Permission, User};
use crate::wire::{Wire, WireError, WireResult, array_field, as_object, bool_field, string_field};

#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionWire;

impl Wire for PermissionWire {
    type Value = Permission;

    fn encode(&self, value: &Permission) -> WireResult<Value> {
        Ok(json!({
            "name": value.name(),
            "codename": value.codename(),
        }))
    }

    fn decode(&self, plain: &Value) -> WireResult<Permission> {
        let obj = as_object(plain)?;
        Ok(Permission::new(
            string_field(obj, "name")?,
            string_field(obj, "codename")?,
        ))
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroupWire<P = PermissionWire> {
    permissions: P,
}

impl GroupWire {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P> GroupWire<P>
where
    P: Wire<Value = Permission>,
{
    pub fn with_permissions(permissions: P) -> Self {
        Self { permissions }
    }
}

impl<P> Wire for GroupWire<P>
where
    P: Wire<Value = Permission>,
{
    type Value = Group;

    fn encode(&self, value: &Group) -> WireResult<Value> {
        let permissions = value
            .permissions()
            .iter()
            .map(|p| self.permissions.encode(p))
            .collect::<WireResult<Vec<_>>>()?;

        Ok(json!({
            "name": value.name(),
            "permissions": permissions,
        }))
    }

    fn decode(&self, plain: &Value) -> WireResult<Group> {
        let obj = as_object(plain)?;
        let permissions = array_field(obj, "permissions")?
            .iter()
            .map(|p| self.permissions.decode(p))
            .collect::<WireResult<Vec<_>>>()?;

        Ok(Group::new(string_field(obj, "name")?, permissions))
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserWire<G = GroupWire> {
    groups: G,
}

impl UserWire {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G> UserWire<G>
where
    G: Wire<Value = Group>,
{
    pub fn with_groups(groups: G) -> Self {
        Self { groups }
    }
}

impl<G> Wire for UserWire<G>
where
    G: Wire<Value = Group>,
{
    type Value = User;

    fn encode(&self, value: &User) -> WireResult<Value> {
        let groups = value
            .groups()
            .iter()
            .map(|g| self.groups.encode(g))
            .collect::<WireResult<Vec<_>>>()?;

        Ok(json!({
            "username": value.username(),
            "is_anonymous": value.is_anonymous(),
            "is_authenticated": value.is_authenticated(),
            "is_staff": value.is_staff(),
            "is_active": value.is_active(),
            "is_superuser": value.is_superuser(),
            "groups": groups,
        }))
    }

    fn decode(&self, plain: &Value) -> WireResult<User> {
        let obj = as_object(plain)?;

        let is_anonymous = bool_field(obj, "is_anonymous")?;
        let is_authenticated = bool_field(obj, "is_authenticated")?;
        if is_anonymous == is_authenticated {
            return Err(WireError::Invalid(
                "exactly one of is_anonymous / is_authenticated must be true".into(),
            ));
        }

        let groups = array_field(obj, "groups")?
            .iter()
            .map(|g| self.groups.decode(g))
            .collect::<WireResult<Vec<_>>>()?;

        let username = string_field(obj, "username")?;
        let user = if is_anonymous {
            if !username.is_empty() {
                return Err(WireError::Invalid(
                    "anonymous user cannot carry a username".into(),
                ));
            }
            User::anonymous()
        } else {
            User::authenticated(username)
        };

        Ok(user
            .staff(bool_field(obj, "is_staff")?)
            .active(bool_field(obj, "is_active")?)
            .superuser(bool_field(obj, "is_superuser")?)
            .with_groups(groups))
    }
}
