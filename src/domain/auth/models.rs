/*
 * Responsibility
 * - Identity value objects carried inside tokens (User / Group / Permission)
 * - Translation from external records (ORM rows etc.) via the *Record traits
 * - No persistence behavior here
 */

/// Read-only view of a stored permission.
pub trait PermissionRecord {
    fn name(&self) -> &str;
    fn codename(&self) -> &str;
}

/// Read-only view of a stored group.
pub trait GroupRecord {
    type Permission: PermissionRecord;

    fn name(&self) -> &str;
    fn permissions(&self) -> &[Self::Permission];
}

/// Read-only view of a stored user account.
pub trait UserRecord {
    type Group: GroupRecord;

    fn username(&self) -> &str;
    fn is_anonymous(&self) -> bool;
    fn is_staff(&self) -> bool;
    fn is_active(&self) -> bool;
    fn is_superuser(&self) -> bool;
    fn groups(&self) -> &[Self::Group];
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permission {
    name: String,
    codename: String,
}

impl Permission {
    pub fn new(name: impl Into<String>, codename: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            codename: codename.into(),
        }
    }

    pub fn from_record<R: PermissionRecord + ?Sized>(record: &R) -> Self {
        Self::new(record.name(), record.codename())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn codename(&self) -> &str {
        &self.codename
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    name: String,
    permissions: Vec<Permission>,
}

impl Group {
    pub fn new(name: impl Into<String>, permissions: Vec<Permission>) -> Self {
        Self {
            name: name.into(),
            permissions,
        }
    }

    pub fn from_record<R: GroupRecord + ?Sized>(record: &R) -> Self {
        let permissions = record
            .permissions()
            .iter()
            .map(Permission::from_record)
            .collect();
        Self::new(record.name(), permissions)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }
}

/// Authenticated (or anonymous) principal.
///
/// `is_anonymous` and `is_authenticated` are always opposite: the only ways to
/// build a `User` are the constructors below and `UserWire::decode`, which
/// rejects payloads where both flags agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    username: String,
    is_anonymous: bool,
    is_staff: bool,
    is_active: bool,
    is_superuser: bool,
    groups: Vec<Group>,
}

impl User {
    pub fn anonymous() -> Self {
        Self {
            username: String::new(),
            is_anonymous: true,
            is_staff: false,
            is_active: false,
            is_superuser: false,
            groups: Vec::new(),
        }
    }

    /// Authenticated, active user with no extra flags or groups.
    pub fn authenticated(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_anonymous: false,
            is_staff: false,
            is_active: true,
            is_superuser: false,
            groups: Vec::new(),
        }
    }

    /// An anonymous record never carries a username, whatever the record says.
    pub fn from_record<R: UserRecord + ?Sized>(record: &R) -> Self {
        let username = if record.is_anonymous() {
            String::new()
        } else {
            record.username().to_owned()
        };

        Self {
            username,
            is_anonymous: record.is_anonymous(),
            is_staff: record.is_staff(),
            is_active: record.is_active(),
            is_superuser: record.is_superuser(),
            groups: record.groups().iter().map(Group::from_record).collect(),
        }
    }

    pub fn staff(mut self, value: bool) -> Self {
        self.is_staff = value;
        self
    }

    pub fn active(mut self, value: bool) -> Self {
        self.is_active = value;
        self
    }

    pub fn superuser(mut self, value: bool) -> Self {
        self.is_superuser = value;
        self
    }

    pub fn with_groups(mut self, groups: Vec<Group>) -> Self {
        self.groups = groups;
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn is_anonymous(&self) -> bool {
        self.is_anonymous
    }

    pub fn is_authenticated(&self) -> bool {
        !self.is_anonymous
    }

    pub fn is_staff(&self) -> bool {
        self.is_staff
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Whether any of the user's groups grants `codename`.
    pub fn has_permission(&self, codename: &str) -> bool {
        self.groups
            .iter()
            .flat_map(|g| g.permissions())
            .any(|p| p.codename() == codename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::UserWire;
    use crate::wire::Wire;

    struct PermRow(&'static str, &'static str);
    struct GroupRow(&'static str, Vec<PermRow>);
    struct UserRow {
        username: &'static str,
        anonymous: bool,
        staff: bool,
        active: bool,
        superuser: bool,
        groups: Vec<GroupRow>,
    }

    impl PermissionRecord for PermRow {
        fn name(&self) -> &str {
            self.0
        }
        fn codename(&self) -> &str {
            self.1
        }
    }

    impl GroupRecord for GroupRow {
        type Permission = PermRow;
        fn name(&self) -> &str {
            self.0
        }
        fn permissions(&self) -> &[PermRow] {
            &self.1
        }
    }

    impl UserRecord for UserRow {
        type Group = GroupRow;
        fn username(&self) -> &str {
            self.username
        }
        fn is_anonymous(&self) -> bool {
            self.anonymous
        }
        fn is_staff(&self) -> bool {
            self.staff
        }
        fn is_active(&self) -> bool {
            self.active
        }
        fn is_superuser(&self) -> bool {
            self.superuser
        }
        fn groups(&self) -> &[GroupRow] {
            &self.groups
        }
    }

    #[test]
    fn permission_from_record() {
        for (name, codename) in [("name", "codename"), ("a", "b")] {
            let record = PermRow(name, codename);
            assert_eq!(
                Permission::from_record(&record),
                Permission::new(name, codename)
            );
        }
    }

    #[test]
    fn group_from_record_keeps_permission_order() {
        let record = GroupRow("even", vec![PermRow("n0", "c0"), PermRow("n2", "c2")]);

        let group = Group::from_record(&record);

        assert_eq!(
            group,
            Group::new(
                "even",
                vec![Permission::new("n0", "c0"), Permission::new("n2", "c2")]
            )
        );
    }

    #[test]
    fn user_from_record_is_authenticated() {
        let record = UserRow {
            username: "userE",
            anonymous: false,
            staff: true,
            active: false,
            superuser: true,
            groups: vec![GroupRow("egroup", vec![]), GroupRow("singleton", vec![PermRow("n", "c")])],
        };

        let user = User::from_record(&record);

        let expected = User::authenticated("userE")
            .staff(true)
            .active(false)
            .superuser(true)
            .with_groups(vec![
                Group::new("egroup", vec![]),
                Group::new("singleton", vec![Permission::new("n", "c")]),
            ]);
        assert_eq!(user, expected);
        assert!(user.is_authenticated() && !user.is_anonymous());
        assert!(user.has_permission("c"));
        assert!(!user.has_permission("missing"));
    }

    #[test]
    fn anonymous_record_drops_its_username() {
        let record = UserRow {
            username: "ghost",
            anonymous: true,
            staff: false,
            active: false,
            superuser: false,
            groups: vec![],
        };

        let user = User::from_record(&record);

        assert!(user.is_anonymous());
        assert_eq!(user.username(), "");
        assert_eq!(user, User::anonymous());

        let wire = UserWire::new();
        assert_eq!(wire.decode(&wire.encode(&user).unwrap()).unwrap(), user);
    }

    #[test]
    fn anonymous_user_flags_are_exclusive() {
        let user = User::anonymous();
        assert!(user.is_anonymous());
        assert!(!user.is_authenticated());
        assert_eq!(user.username(), "");
    }
}
