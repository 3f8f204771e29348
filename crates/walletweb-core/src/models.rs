//! Wallet data models as exchanged with the REST API

use chrono::{DateTime, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Resource identifier
///
/// The wallet API is not consistent about id types, so numeric and string
/// ids both decode into the same string-backed value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawId")]
pub struct Id(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl From<RawId> for Id {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(n) => Id(n.to_string()),
            RawId::Text(s) => Id(s),
        }
    }
}

impl Id {
    pub fn new(value: impl Into<String>) -> Self {
        Id(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id(value.to_string())
    }
}

/// Wallet user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    #[serde(default, alias = "first_name")]
    pub first_name: String,
    #[serde(default, alias = "last_name")]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

impl User {
    /// "First Last", trimmed when one of the parts is missing
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Payload for `POST /users/register`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dni: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Partial profile update for `PUT /users/{id}`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Wallet account, owned by exactly one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Id,
    /// Routing alias (CVU)
    #[serde(default)]
    pub cvu: String,
    /// Human-readable alias
    #[serde(default)]
    pub alias: String,
    #[serde(alias = "user_id")]
    pub user_id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,
}

impl Account {
    /// Exact, case-sensitive match against the CVU or the alias
    pub fn matches(&self, needle: &str) -> bool {
        self.cvu == needle || self.alias == needle
    }
}

/// Transaction type as reported by the activity endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionType {
    Deposit,
    Transfer,
    Other,
}

impl From<String> for TransactionType {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "deposit" => TransactionType::Deposit,
            "transfer" => TransactionType::Transfer,
            _ => TransactionType::Other,
        }
    }
}

impl From<TransactionType> for String {
    fn from(value: TransactionType) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Deposit => write!(f, "Deposit"),
            TransactionType::Transfer => write!(f, "Transfer"),
            TransactionType::Other => write!(f, "Other"),
        }
    }
}

/// Activity record of an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Id,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    /// Counterparty name
    #[serde(default)]
    pub name: String,
    /// Counterparty routing identifier for incoming money, own CVU for outgoing
    #[serde(default)]
    pub origin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dated: Option<String>,
    #[serde(default, alias = "account_id", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Transaction {
    /// Timestamp formatted as `dd/mm/yyyy HH:MM`, or the raw text when it is
    /// not RFC 3339 / ISO-8601 without offset
    pub fn dated_display(&self) -> String {
        let Some(raw) = self.dated.as_deref() else {
            return String::new();
        };
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return dt.format("%d/%m/%Y %H:%M").to_string();
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return dt.format("%d/%m/%Y %H:%M").to_string();
        }
        raw.to_string()
    }
}

/// Credentials for `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Successful login answer
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(default, alias = "user_id")]
    pub user_id: Option<Id>,
    #[serde(default)]
    pub user: Option<User>,
}

impl LoginResponse {
    /// Id of the signed-in user, from either the flat field or the embedded profile
    pub fn resolved_user_id(&self) -> Option<Id> {
        self.user_id
            .clone()
            .or_else(|| self.user.as_ref().map(|u| u.id.clone()))
            .filter(|id| !id.is_empty())
    }
}

/// Authenticated session: the token plus the user it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: Id,
}

/// Payload for `POST /accounts/{id}/transfers`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferRequest {
    /// Sender CVU
    pub origin: String,
    /// Recipient CVU
    pub destination: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Recipient display name
    pub name: String,
}

/// Payload for `POST /accounts/{id}/deposit`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepositRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Payload for `POST /accounts/{id}/cards`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub number: String,
    pub holder_name: String,
    pub expiration: String,
    pub cvc: String,
}

/// Card attached to an account
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: Id,
    #[serde(default, alias = "last_four")]
    pub last_four: Option<String>,
    #[serde(default, alias = "holder_name")]
    pub holder_name: Option<String>,
}

/// Any creation response; only the id is needed downstream
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedResource {
    pub id: Id,
}
