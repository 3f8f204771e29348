//! Wallet domain logic: models, activity classification and the send-money flow
//!
//! The wallet REST API is reached only through the [`WalletApi`] trait, so the
//! flow can be driven by the HTTP adapter in production and by an in-memory
//! fake in tests.

pub mod activity;
pub mod error;
pub mod models;
pub mod money;
pub mod transfer;
pub mod validation;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

use async_trait::async_trait;
use std::sync::Arc;

pub use activity::{classify_direction, incoming_counterparties, ActivityKind, CounterpartyRecord, Direction};
pub use error::{
    CoreError, CoreResult, DefaultErrorLogger, ErrorCode, ErrorContext, ErrorDetails, ErrorLogger, ErrorSeverity,
    RequestError, GENERIC_REQUEST_ERROR, UNAUTHORIZED,
};
pub use models::{
    Account, Card, CreatedResource, Credentials, DepositRequest, Id, LoginResponse, NewCard, NewUser,
    Session, Transaction, TransactionType, TransferRequest, User, UserUpdate,
};
pub use money::format_currency;
pub use rust_decimal::Decimal;
pub use transfer::{FlowOutcome, FlowQuery, Screen, Step, StepNotice, TransferFlow, TransferForm};
pub use validation::FieldErrors;

/// Shared handle to the wallet API
pub type ApiRef = Arc<dyn WalletApi>;

/// Operations offered by the wallet REST API
///
/// Every call is a network request; nothing is cached or retried.
#[async_trait]
pub trait WalletApi: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, RequestError>;

    /// `POST /auth/logout`
    async fn logout(&self, token: &str) -> Result<(), RequestError>;

    /// `POST /users/register`
    async fn register_user(&self, user: &NewUser) -> Result<User, RequestError>;

    /// `GET /users/{id}`
    async fn get_user(&self, user_id: &Id, token: &str) -> Result<User, RequestError>;

    /// `PUT /users/{id}`
    async fn update_user(&self, user_id: &Id, update: &UserUpdate, token: &str) -> Result<User, RequestError>;

    /// `GET /accounts`
    async fn list_accounts(&self, token: &str) -> Result<Vec<Account>, RequestError>;

    /// `GET /accounts/{id}`
    async fn get_account(&self, account_id: &Id, token: &str) -> Result<Account, RequestError>;

    /// `GET /accounts/{id}/activity`
    async fn get_account_activity(&self, account_id: &Id, token: &str) -> Result<Vec<Transaction>, RequestError>;

    /// `GET /accounts/{id}/transactions`
    async fn get_account_transactions(&self, account_id: &Id, token: &str) -> Result<Vec<Transaction>, RequestError>;

    /// `POST /accounts/{id}/transfers`
    async fn create_transfer(
        &self,
        account_id: &Id,
        transfer: &TransferRequest,
        token: &str,
    ) -> Result<CreatedResource, RequestError>;

    /// `POST /accounts/{id}/deposit`
    async fn create_deposit(
        &self,
        account_id: &Id,
        deposit: &DepositRequest,
        token: &str,
    ) -> Result<CreatedResource, RequestError>;

    /// `POST /accounts/{id}/cards`
    async fn create_card(&self, account_id: &Id, card: &NewCard, token: &str) -> Result<Card, RequestError>;

    /// `DELETE /accounts/{id}/cards/{cardId}`
    async fn delete_card(&self, account_id: &Id, card_id: &Id, token: &str) -> Result<(), RequestError>;
}
