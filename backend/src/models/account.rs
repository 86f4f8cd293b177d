//! Models for accounts, roles, statuses, and capability permissions.

use std::collections::BTreeSet;

use serde::{
    de::{self, SeqAccess, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Stored representation of one principal.
pub struct Account {
    /// Opaque unique identifier.
    pub id: String,
    /// Login name, compared case-insensitively.
    pub username: String,
    /// Login email, compared case-insensitively.
    pub email: String,
    /// Argon2 hash of the account password. Never logged or echoed.
    pub password_hash: String,
    /// Coarse capability tier.
    pub role: Role,
    /// Soft lifecycle state. Only `active` accounts may authenticate.
    pub status: AccountStatus,
    /// Capability grants, or the `all` sentinel.
    pub permissions: Permissions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
/// Supported account roles.
pub enum Role {
    Admin,
    Customer,
    Operator,
    Reseller,
}

impl Role {
    /// Canonical snake_case representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Customer => "customer",
            Role::Operator => "operator",
            Role::Reseller => "reseller",
        }
    }

    /// Landing path a freshly authenticated session of this role is sent to.
    pub fn landing_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Customer => "/dashboard",
            Role::Operator => "/operator",
            Role::Reseller => "/reseller",
        }
    }
}

impl Serialize for Role {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "customer" => Ok(Role::Customer),
            "operator" => Ok(Role::Operator),
            "reseller" => Ok(Role::Reseller),
            other => Err(de::Error::unknown_variant(
                other,
                &["admin", "customer", "operator", "reseller"],
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
/// Soft account lifecycle state. Accounts are never physically deleted.
pub enum AccountStatus {
    Active,
    Suspended,
    Pending,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Suspended => "suspended",
            AccountStatus::Pending => "pending",
        }
    }
}

impl Serialize for AccountStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AccountStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(AccountStatus::Active),
            "suspended" => Ok(AccountStatus::Suspended),
            "pending" => Ok(AccountStatus::Pending),
            other => Err(de::Error::unknown_variant(
                other,
                &["active", "suspended", "pending"],
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Capability grants: either the `all` sentinel or an explicit set.
///
/// Serialized as the JSON string `"all"` or an array of capability names,
/// matching the stored account records.
pub enum Permissions {
    All,
    Grants(BTreeSet<String>),
}

impl Permissions {
    pub fn has(&self, capability: &str) -> bool {
        match self {
            Permissions::All => true,
            Permissions::Grants(set) => set.contains(capability),
        }
    }

    pub fn none() -> Self {
        Permissions::Grants(BTreeSet::new())
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::none()
    }
}

impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Permissions::All => serializer.serialize_str("all"),
            Permissions::Grants(set) => set.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PermissionsVisitor;

        impl<'de> Visitor<'de> for PermissionsVisitor {
            type Value = Permissions;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("the string \"all\" or an array of capability names")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if value.eq_ignore_ascii_case("all") {
                    Ok(Permissions::All)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(value), &self))
                }
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut set = BTreeSet::new();
                while let Some(value) = seq.next_element::<String>()? {
                    set.insert(value);
                }
                Ok(Permissions::Grants(set))
            }
        }

        deserializer.deserialize_any(PermissionsVisitor)
    }
}

impl Account {
    /// Constructs a new account with a freshly generated identifier.
    pub fn new(
        username: String,
        email: String,
        password_hash: String,
        role: Role,
        permissions: Permissions,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            email,
            password_hash,
            role,
            status: AccountStatus::Active,
            permissions,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Case-insensitive match against username or email.
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        self.username.eq_ignore_ascii_case(identifier) || self.email.eq_ignore_ascii_case(identifier)
    }
}

#[derive(Debug, Deserialize)]
/// Credentials submitted to the login endpoint. The password is verified
/// and discarded; it never reaches a log or a response.
pub struct LoginCredentials {
    /// Username or email.
    pub identifier: String,
    pub password: String,
    /// Originally requested path to return to after login.
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
/// Payload for provisioning a new account (admin only).
pub struct CreateAccount {
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub permissions: Permissions,
}

#[derive(Debug, Deserialize)]
/// Payload for an admin status change.
pub struct UpdateAccountStatus {
    pub status: AccountStatus,
}

#[derive(Debug, Serialize)]
/// Public-facing representation of an account. The password hash never
/// leaves the store layer.
pub struct AccountResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub status: AccountStatus,
    pub permissions: Permissions,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        AccountResponse {
            id: account.id,
            username: account.username,
            email: account.email,
            role: account.role,
            status: account.status,
            permissions: account.permissions,
        }
    }
}
