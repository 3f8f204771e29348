//! Send-money flow
//!
//! The `step` query parameter is the only source of truth for the screen:
//! absent shows the counterparty list, `1` asks for the destination, `2` for
//! the amount and `3` shows the confirmation. The form state (destination and
//! amount text) travels in the same URL, so every screen can be rebuilt from
//! the request alone.
//!
//! Steps 2 and 3 always resolve the destination again. A destination that
//! does not resolve sends the user back to step 1 with the error flag set,
//! never to a screen with missing recipient data. Step 3 checks the amount
//! rules again, since its URL can be reached without going through step 2.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::activity::{incoming_counterparties, ActivityKind, CounterpartyRecord};
use crate::error::{CoreError, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::models::{Account, Id, Session, Transaction, TransferRequest, User};
use crate::validation::{validate_amount, validate_destination, FieldErrors};
use crate::WalletApi;

/// Route of the send-money screens
pub const SEND_MONEY_PATH: &str = "/send-money";

/// Route prefix of the transfer receipt
pub const ACTIVITY_PATH: &str = "/activity";

/// Screen selected by the `step` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// No step: existing counterparties
    List,
    /// Step 1: destination CVU or alias
    Destination,
    /// Step 2: amount
    Amount,
    /// Step 3: confirmation
    Confirm,
}

impl Step {
    /// `None` for a step value outside `1..=3`
    pub fn parse(raw: Option<&str>) -> Option<Step> {
        match raw.map(str::trim) {
            None | Some("") => Some(Step::List),
            Some("1") => Some(Step::Destination),
            Some("2") => Some(Step::Amount),
            Some("3") => Some(Step::Confirm),
            Some(_) => None,
        }
    }

    pub fn number(&self) -> Option<u8> {
        match self {
            Step::List => None,
            Step::Destination => Some(1),
            Step::Amount => Some(2),
            Step::Confirm => Some(3),
        }
    }
}

/// Why step 1 was shown again after a failed lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepNotice {
    /// No account has the typed CVU or alias
    NotFound,
    /// The account lookup itself failed
    Unavailable,
}

impl StepNotice {
    /// Value of the `error` query parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            StepNotice::NotFound => "true",
            StepNotice::Unavailable => "unavailable",
        }
    }

    /// Any present `error` flag other than `unavailable` is a lookup miss
    pub fn from_param(raw: &str) -> Self {
        if raw == StepNotice::Unavailable.as_param() {
            StepNotice::Unavailable
        } else {
            StepNotice::NotFound
        }
    }
}

/// Query string of the send-money route
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowQuery {
    pub step: Option<String>,
    pub destination: Option<String>,
    pub amount: Option<String>,
    /// Presence flag set after a failed destination lookup
    pub error: Option<String>,
}

impl FlowQuery {
    pub fn notice(&self) -> Option<StepNotice> {
        self.error.as_deref().map(StepNotice::from_param)
    }

    pub fn form(&self) -> TransferForm {
        TransferForm {
            destination: self.destination.clone().unwrap_or_default(),
            amount: self.amount.clone().unwrap_or_default(),
        }
    }
}

/// Client-held form state: destination and amount as typed
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TransferForm {
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub amount: String,
}

impl TransferForm {
    pub fn has_destination(&self) -> bool {
        !self.destination.trim().is_empty()
    }
}

/// URL of a form step carrying the form state
pub fn step_url(step: u8, form: &TransferForm, notice: Option<StepNotice>) -> String {
    let mut url = format!("{}?step={}", SEND_MONEY_PATH, step);
    if form.has_destination() {
        url.push_str("&destination=");
        url.push_str(&urlencoding::encode(form.destination.trim()));
    }
    if !form.amount.trim().is_empty() {
        url.push_str("&amount=");
        url.push_str(&urlencoding::encode(form.amount.trim()));
    }
    if let Some(notice) = notice {
        url.push_str("&error=");
        url.push_str(notice.as_param());
    }
    url
}

/// URL of the receipt of a created transaction
pub fn receipt_url(id: &Id) -> String {
    format!("{}/{}", ACTIVITY_PATH, urlencoding::encode(id.as_str()))
}

/// Find the account whose CVU or alias equals the trimmed destination
///
/// Matching is exact and case-sensitive.
pub fn find_destination<'a>(accounts: &'a [Account], destination: &str) -> Option<&'a Account> {
    let needle = destination.trim();
    if needle.is_empty() {
        return None;
    }
    accounts.iter().find(|account| account.matches(needle))
}

/// Everything the confirmation screen shows
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub form: TransferForm,
    pub amount: Decimal,
    pub recipient: Option<User>,
    pub destination_account: Account,
    /// Set when the last submission failed
    pub submit_error: Option<String>,
}

/// Transfer receipt
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub transaction: Transaction,
    pub kind: ActivityKind,
}

/// Screen to render
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    List { records: Vec<CounterpartyRecord> },
    Destination { form: TransferForm, notice: Option<StepNotice>, errors: FieldErrors },
    Amount { form: TransferForm, recipient: Option<User>, errors: FieldErrors },
    Confirm(Confirmation),
    Receipt(Option<Receipt>),
}

/// Result of driving the flow for one request
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome {
    Show(Screen),
    Redirect(String),
    /// The API answered 401; the session must end
    Unauthorized,
}

/// Lookups backing steps 2 and 3
#[derive(Debug, Clone)]
pub struct ResolvedTransfer {
    pub destination_account: Account,
    pub destination_user: Option<User>,
    pub origin_account: Option<Account>,
}

impl ResolvedTransfer {
    /// Name sent with the transfer: the recipient's full name, or the alias
    pub fn recipient_name(&self) -> String {
        self.destination_user
            .as_ref()
            .map(User::full_name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.destination_account.alias.clone())
    }
}

/// One pass of the send-money flow on behalf of a signed-in user
pub struct TransferFlow<'a> {
    api: &'a dyn WalletApi,
    session: &'a Session,
    logger: DefaultErrorLogger,
}

impl<'a> TransferFlow<'a> {
    pub fn new(api: &'a dyn WalletApi, session: &'a Session) -> Self {
        Self {
            api,
            session,
            logger: DefaultErrorLogger,
        }
    }

    fn token(&self) -> &str {
        &self.session.token
    }

    fn report(&self, error: &CoreError, operation: &str) {
        let context = ErrorContext::new(operation).with_user_id(self.session.user_id.to_string());
        self.logger.log_error(error, &context);
    }

    /// Map a failed destination lookup at steps 2/3 to its outcome
    fn fail(&self, error: CoreError) -> FlowOutcome {
        if error.is_unauthorized() {
            return FlowOutcome::Unauthorized;
        }
        let notice = match error {
            CoreError::DestinationNotFound { .. } => StepNotice::NotFound,
            _ => StepNotice::Unavailable,
        };
        FlowOutcome::Redirect(step_url(1, &TransferForm::default(), Some(notice)))
    }

    /// Render the screen selected by a GET on the send-money route
    pub async fn enter(&self, query: &FlowQuery, max_amount: u64) -> FlowOutcome {
        let Some(step) = Step::parse(query.step.as_deref()) else {
            log::debug!("Unknown step {:?}, back to the list", query.step);
            return FlowOutcome::Redirect(SEND_MONEY_PATH.to_string());
        };
        let form = query.form();

        match step {
            Step::List => self.list().await,
            Step::Destination => FlowOutcome::Show(Screen::Destination {
                form,
                notice: query.notice(),
                errors: FieldErrors::default(),
            }),
            Step::Amount | Step::Confirm if !form.has_destination() => {
                FlowOutcome::Redirect(step_url(1, &TransferForm::default(), None))
            }
            Step::Amount => match self.resolve(&form.destination).await {
                Ok(resolved) => FlowOutcome::Show(Screen::Amount {
                    form,
                    recipient: resolved.destination_user,
                    errors: FieldErrors::default(),
                }),
                Err(e) => self.fail(e),
            },
            Step::Confirm => {
                let Ok(amount) = validate_amount(&form.amount, max_amount) else {
                    return FlowOutcome::Redirect(step_url(2, &form, None));
                };
                match self.resolve(&form.destination).await {
                    Ok(resolved) => FlowOutcome::Show(Screen::Confirm(Confirmation {
                        form,
                        amount,
                        recipient: resolved.destination_user,
                        destination_account: resolved.destination_account,
                        submit_error: None,
                    })),
                    Err(e) => self.fail(e),
                }
            }
        }
    }

    /// Counterparties that have sent money to the signed-in user
    pub async fn list(&self) -> FlowOutcome {
        let account = match self.own_account().await {
            Ok(account) => account,
            Err(e) if e.is_unauthorized() => return FlowOutcome::Unauthorized,
            Err(e) => {
                self.report(&e, "list_counterparties");
                return FlowOutcome::Show(Screen::List { records: vec![] });
            }
        };

        match self.api.get_account_activity(&account.id, self.token()).await {
            Ok(activities) => FlowOutcome::Show(Screen::List {
                records: incoming_counterparties(&activities, &account.cvu),
            }),
            Err(e) if e.is_unauthorized() => FlowOutcome::Unauthorized,
            Err(e) => {
                self.report(&e.into(), "get_account_activity");
                FlowOutcome::Show(Screen::List { records: vec![] })
            }
        }
    }

    /// Step 1 submit: a non-blank destination advances to step 2
    pub fn submit_destination(&self, form: &TransferForm) -> FlowOutcome {
        match validate_destination(&form.destination) {
            Ok(destination) => {
                let next = TransferForm {
                    destination,
                    amount: form.amount.clone(),
                };
                FlowOutcome::Redirect(step_url(2, &next, None))
            }
            Err(errors) => FlowOutcome::Show(Screen::Destination {
                form: form.clone(),
                notice: None,
                errors,
            }),
        }
    }

    /// Step 2 submit: a valid amount advances to step 3
    pub async fn submit_amount(&self, form: &TransferForm, max_amount: u64) -> FlowOutcome {
        if !form.has_destination() {
            return FlowOutcome::Redirect(step_url(1, &TransferForm::default(), None));
        }
        match validate_amount(&form.amount, max_amount) {
            Ok(_) => FlowOutcome::Redirect(step_url(3, form, None)),
            Err(errors) => match self.resolve(&form.destination).await {
                Ok(resolved) => FlowOutcome::Show(Screen::Amount {
                    form: form.clone(),
                    recipient: resolved.destination_user,
                    errors,
                }),
                Err(e) => self.fail(e),
            },
        }
    }

    /// Step 3 submit: create the transfer and go to its receipt
    ///
    /// An amount that breaks the amount rules never reaches the API; the user
    /// is sent back to the amount step. Submission failures stay on the
    /// confirmation screen with the API's message.
    pub async fn submit_transfer(&self, form: &TransferForm, max_amount: u64) -> FlowOutcome {
        let Ok(amount) = validate_amount(&form.amount, max_amount) else {
            log::debug!("Transfer submitted without a valid amount: {:?}", form.amount);
            return FlowOutcome::Redirect(step_url(2, form, None));
        };
        if !form.has_destination() {
            return FlowOutcome::Redirect(step_url(1, &TransferForm::default(), None));
        }
        if self.session.user_id.is_empty() {
            return FlowOutcome::Unauthorized;
        }

        let resolved = match self.resolve(&form.destination).await {
            Ok(resolved) => resolved,
            Err(e) => return self.fail(e),
        };
        let confirmation = |submit_error: String| {
            FlowOutcome::Show(Screen::Confirm(Confirmation {
                form: form.clone(),
                amount,
                recipient: resolved.destination_user.clone(),
                destination_account: resolved.destination_account.clone(),
                submit_error: Some(submit_error),
            }))
        };

        let Some(origin) = resolved.origin_account.as_ref() else {
            return confirmation("No encontramos tu cuenta para debitar la transferencia".to_string());
        };

        let request = TransferRequest {
            origin: origin.cvu.clone(),
            destination: resolved.destination_account.cvu.clone(),
            amount,
            name: resolved.recipient_name(),
        };

        match self.api.create_transfer(&origin.id, &request, self.token()).await {
            Ok(created) => {
                log::info!(
                    "Transfer {} created from account {} to {}",
                    created.id,
                    origin.id,
                    resolved.destination_account.id
                );
                FlowOutcome::Redirect(receipt_url(&created.id))
            }
            Err(e) if e.is_unauthorized() => FlowOutcome::Unauthorized,
            Err(e) => {
                let message = e.message.clone();
                self.report(&e.into(), "create_transfer");
                confirmation(message)
            }
        }
    }

    /// Receipt of one of the signed-in user's transactions
    pub async fn receipt(&self, transaction_id: &Id) -> FlowOutcome {
        let account = match self.own_account().await {
            Ok(account) => account,
            Err(e) if e.is_unauthorized() => return FlowOutcome::Unauthorized,
            Err(e) => {
                self.report(&e, "receipt");
                return FlowOutcome::Show(Screen::Receipt(None));
            }
        };

        match self.api.get_account_activity(&account.id, self.token()).await {
            Ok(activities) => {
                let receipt = activities
                    .into_iter()
                    .find(|tx| &tx.id == transaction_id)
                    .map(|transaction| Receipt {
                        kind: ActivityKind::of(&transaction, &account.cvu),
                        transaction,
                    });
                if receipt.is_none() {
                    let error = CoreError::TransactionNotFound {
                        id: transaction_id.to_string(),
                    };
                    self.report(&error, "receipt");
                }
                FlowOutcome::Show(Screen::Receipt(receipt))
            }
            Err(e) if e.is_unauthorized() => FlowOutcome::Unauthorized,
            Err(e) => {
                self.report(&e.into(), "receipt");
                FlowOutcome::Show(Screen::Receipt(None))
            }
        }
    }

    /// Resolve the destination account to an account
    pub async fn resolve_destination(&self, destination: &str) -> Result<Account, CoreError> {
        let accounts = self.api.list_accounts(self.token()).await?;
        find_destination(&accounts, destination)
            .cloned()
            .ok_or_else(|| CoreError::DestinationNotFound {
                destination: destination.trim().to_string(),
            })
    }

    /// The signed-in user's own account
    pub async fn own_account(&self) -> Result<Account, CoreError> {
        let accounts = self.api.list_accounts(self.token()).await?;
        accounts
            .into_iter()
            .find(|account| account.user_id == self.session.user_id)
            .ok_or_else(|| CoreError::AccountNotFound {
                user_id: self.session.user_id.to_string(),
            })
    }

    /// Run the derived lookups of steps 2 and 3
    ///
    /// Destination account then destination user form one chain; the origin
    /// account runs next to it. Only the destination account is required.
    pub async fn resolve(&self, destination: &str) -> Result<ResolvedTransfer, CoreError> {
        let destination_chain = async {
            let account = self.resolve_destination(destination).await?;
            let user = match self.api.get_user(&account.user_id, self.token()).await {
                Ok(user) => Some(user),
                Err(e) if e.is_unauthorized() => return Err(CoreError::from(e)),
                Err(e) => {
                    self.report(&e.into(), "get_user");
                    None
                }
            };
            Ok::<_, CoreError>((account, user))
        };

        let (destination_result, origin_result) = tokio::join!(destination_chain, self.own_account());

        let (destination_account, destination_user) = match destination_result {
            Ok(found) => found,
            Err(e) => {
                if !e.is_unauthorized() {
                    self.report(&e, "resolve_destination");
                }
                return Err(e);
            }
        };

        let origin_account = match origin_result {
            Ok(account) => Some(account),
            Err(e) if e.is_unauthorized() => return Err(e),
            Err(e) => {
                self.report(&e, "own_account");
                None
            }
        };

        Ok(ResolvedTransfer {
            destination_account,
            destination_user,
            origin_account,
        })
    }
}
