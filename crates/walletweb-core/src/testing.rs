//! In-memory wallet API for tests

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::RequestError;
use crate::models::{
    Account, Card, CreatedResource, Credentials, DepositRequest, Id, LoginResponse, NewCard, NewUser,
    Transaction, TransactionType, TransferRequest, User, UserUpdate,
};
use crate::WalletApi;

pub fn user(id: &str, first_name: &str, last_name: &str) -> User {
    User {
        id: Id::new(id),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!("{}@example.com", first_name.to_lowercase()),
    }
}

pub fn account(id: &str, cvu: &str, alias: &str, user_id: &str) -> Account {
    Account {
        id: Id::new(id),
        cvu: cvu.to_string(),
        alias: alias.to_string(),
        user_id: Id::new(user_id),
        balance: None,
    }
}

/// Transfer activity row; the counterparty name is `name-{origin}`
pub fn transfer(id: &str, origin: &str, amount: i64) -> Transaction {
    Transaction {
        id: Id::new(id),
        kind: TransactionType::Transfer,
        amount: Decimal::from(amount),
        name: format!("name-{}", origin),
        origin: origin.to_string(),
        destination: None,
        dated: None,
        account_id: None,
        description: None,
    }
}

/// Wallet API backed by in-memory fixtures
///
/// Every call is appended to a call log. An operation registered with
/// [`FakeWalletApi::failing`] returns its error instead of touching the
/// fixtures.
pub struct FakeWalletApi {
    users: Vec<User>,
    accounts: Vec<Account>,
    activity: HashMap<Id, Vec<Transaction>>,
    passwords: HashMap<String, (String, Id)>,
    failures: HashMap<String, RequestError>,
    transfer_id: Id,
    calls: Mutex<Vec<String>>,
    transfers: Mutex<Vec<(Id, TransferRequest)>>,
}

impl Default for FakeWalletApi {
    fn default() -> Self {
        Self {
            users: vec![],
            accounts: vec![],
            activity: HashMap::new(),
            passwords: HashMap::new(),
            failures: HashMap::new(),
            transfer_id: Id::new("tx123"),
            calls: Mutex::new(vec![]),
            transfers: Mutex::new(vec![]),
        }
    }
}

impl FakeWalletApi {
    pub fn with_user(mut self, user: User) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_account(mut self, account: Account) -> Self {
        self.accounts.push(account);
        self
    }

    pub fn with_activity(mut self, account_id: &Id, activity: Vec<Transaction>) -> Self {
        self.activity.insert(account_id.clone(), activity);
        self
    }

    /// Accept `email`/`password` and sign in as `user_id`
    pub fn with_login(mut self, email: &str, password: &str, user_id: &str) -> Self {
        self.passwords
            .insert(email.to_string(), (password.to_string(), Id::new(user_id)));
        self
    }

    pub fn with_transfer_id(mut self, id: &str) -> Self {
        self.transfer_id = Id::new(id);
        self
    }

    pub fn failing(mut self, operation: &str, error: RequestError) -> Self {
        self.failures.insert(operation.to_string(), error);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn transfers(&self) -> Vec<(Id, TransferRequest)> {
        self.transfers.lock().map(|t| t.clone()).unwrap_or_default()
    }

    fn enter(&self, operation: &str) -> Result<(), RequestError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(operation.to_string());
        }
        match self.failures.get(operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn not_found() -> RequestError {
        RequestError::new(404, "Not found")
    }

    fn find_user(&self, user_id: &Id) -> Result<User, RequestError> {
        self.users
            .iter()
            .find(|u| &u.id == user_id)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    fn find_account(&self, account_id: &Id) -> Result<Account, RequestError> {
        self.accounts
            .iter()
            .find(|a| &a.id == account_id)
            .cloned()
            .ok_or_else(Self::not_found)
    }
}

#[async_trait]
impl WalletApi for FakeWalletApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, RequestError> {
        self.enter("login")?;
        match self.passwords.get(&credentials.email) {
            Some((password, user_id)) if password == &credentials.password => Ok(LoginResponse {
                token: format!("token-{}", user_id),
                user_id: Some(user_id.clone()),
                user: None,
            }),
            _ => Err(RequestError::new(401, "Credenciales inválidas")),
        }
    }

    async fn logout(&self, _token: &str) -> Result<(), RequestError> {
        self.enter("logout")
    }

    async fn register_user(&self, new_user: &NewUser) -> Result<User, RequestError> {
        self.enter("register_user")?;
        Ok(User {
            id: Id::new(format!("u{}", self.users.len() + 1)),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            email: new_user.email.clone(),
        })
    }

    async fn get_user(&self, user_id: &Id, _token: &str) -> Result<User, RequestError> {
        self.enter("get_user")?;
        self.find_user(user_id)
    }

    async fn update_user(&self, user_id: &Id, update: &UserUpdate, _token: &str) -> Result<User, RequestError> {
        self.enter("update_user")?;
        let mut found = self.find_user(user_id)?;
        if let Some(first_name) = &update.first_name {
            found.first_name = first_name.clone();
        }
        if let Some(last_name) = &update.last_name {
            found.last_name = last_name.clone();
        }
        if let Some(email) = &update.email {
            found.email = email.clone();
        }
        Ok(found)
    }

    async fn list_accounts(&self, _token: &str) -> Result<Vec<Account>, RequestError> {
        self.enter("list_accounts")?;
        Ok(self.accounts.clone())
    }

    async fn get_account(&self, account_id: &Id, _token: &str) -> Result<Account, RequestError> {
        self.enter("get_account")?;
        self.find_account(account_id)
    }

    async fn get_account_activity(&self, account_id: &Id, _token: &str) -> Result<Vec<Transaction>, RequestError> {
        self.enter("get_account_activity")?;
        Ok(self.activity.get(account_id).cloned().unwrap_or_default())
    }

    async fn get_account_transactions(&self, account_id: &Id, _token: &str) -> Result<Vec<Transaction>, RequestError> {
        self.enter("get_account_transactions")?;
        Ok(self.activity.get(account_id).cloned().unwrap_or_default())
    }

    async fn create_transfer(
        &self,
        account_id: &Id,
        transfer: &TransferRequest,
        _token: &str,
    ) -> Result<CreatedResource, RequestError> {
        self.enter("create_transfer")?;
        if let Ok(mut transfers) = self.transfers.lock() {
            transfers.push((account_id.clone(), transfer.clone()));
        }
        Ok(CreatedResource {
            id: self.transfer_id.clone(),
        })
    }

    async fn create_deposit(
        &self,
        account_id: &Id,
        _deposit: &DepositRequest,
        _token: &str,
    ) -> Result<CreatedResource, RequestError> {
        self.enter("create_deposit")?;
        self.find_account(account_id)?;
        Ok(CreatedResource { id: Id::new("dep1") })
    }

    async fn create_card(&self, account_id: &Id, card: &NewCard, _token: &str) -> Result<Card, RequestError> {
        self.enter("create_card")?;
        self.find_account(account_id)?;
        let digits: String = card.number.chars().filter(char::is_ascii_digit).collect();
        let last_four = digits.get(digits.len().saturating_sub(4)..).map(str::to_string);
        Ok(Card {
            id: Id::new("card1"),
            last_four,
            holder_name: Some(card.holder_name.clone()),
        })
    }

    async fn delete_card(&self, account_id: &Id, _card_id: &Id, _token: &str) -> Result<(), RequestError> {
        self.enter("delete_card")?;
        self.find_account(account_id).map(|_| ())
    }
}
