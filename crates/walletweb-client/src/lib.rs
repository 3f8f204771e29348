//! HTTP adapter for the wallet REST API
//!
//! One generic [`ApiClient::request`] does all the transport work: JSON
//! headers, the bearer token, status checks and error normalization into
//! [`RequestError`]. The typed operations are thin wrappers that pick a path
//! and a method and decode the answer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use walletweb_config::Config;
use walletweb_core::{
    Account, Card, CreatedResource, Credentials, DepositRequest, Id, LoginResponse, NewCard, NewUser,
    RequestError, Transaction, TransferRequest, User, UserUpdate, WalletApi,
};

/// Failure to build the adapter itself
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),

    #[error("Invalid API base URL: {url}")]
    InvalidBaseUrl { url: String },
}

/// Wallet API adapter over a single reqwest client
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Build from the `api` section of the configuration
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        Self::with_base_url(config.api_base_url(), Duration::from_secs(config.api.timeout_secs))
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidBaseUrl { url: base_url });
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request and normalize the answer
    ///
    /// A 2xx answer yields its JSON body, or `None` for 204 and empty bodies.
    pub async fn request(
        &self,
        path: &str,
        method: Method,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Option<Value>, RequestError> {
        self.exchange(path, method, token, body)
            .await
            .map(|(_, value)| value)
    }

    async fn exchange(
        &self,
        path: &str,
        method: Method,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<(StatusCode, Option<Value>), RequestError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!(target: "walletweb::client", "{} {}", method, path);

        let mut builder = self
            .client
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            log::warn!(target: "walletweb::client", "{} {} failed: {}", method, path, e);
            map_transport_error(&e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| map_transport_error(&e))?;

        if !status.is_success() {
            let error = RequestError::from_response(status.as_u16(), &bytes);
            log::debug!(
                target: "walletweb::client",
                "{} {} answered {}: {}",
                method,
                path,
                status.as_u16(),
                error.message
            );
            return Err(error);
        }

        if status == StatusCode::NO_CONTENT || bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok((status, None));
        }

        serde_json::from_slice(&bytes)
            .map(|value| (status, Some(value)))
            .map_err(|e| RequestError::new(status.as_u16(), format!("Respuesta inválida del servidor: {}", e)))
    }

    /// Request whose 2xx answer must decode into `T`
    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        method: Method,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T, RequestError> {
        let (status, value) = self.exchange(path, method, token, body.as_ref()).await?;
        let value = value.ok_or_else(|| RequestError::new(status.as_u16(), "Respuesta vacía del servidor"))?;
        serde_json::from_value(value)
            .map_err(|e| RequestError::new(status.as_u16(), format!("Respuesta inválida del servidor: {}", e)))
    }

    /// Request whose answer body is ignored
    async fn send(
        &self,
        path: &str,
        method: Method,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(), RequestError> {
        self.exchange(path, method, token, body.as_ref()).await.map(|_| ())
    }
}

fn to_body<T: Serialize>(payload: &T) -> Result<Value, RequestError> {
    serde_json::to_value(payload)
        .map_err(|e| RequestError::transport(format!("No se pudo serializar la petición: {}", e)))
}

fn segment(id: &Id) -> String {
    urlencoding::encode(id.as_str()).into_owned()
}

fn map_transport_error(error: &reqwest::Error) -> RequestError {
    if error.is_timeout() {
        RequestError::transport("La petición excedió el tiempo de espera")
    } else if error.is_connect() {
        RequestError::transport(format!("No se pudo conectar con el servidor: {}", error))
    } else {
        RequestError::transport(error.to_string())
    }
}

#[async_trait]
impl WalletApi for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, RequestError> {
        self.fetch("/auth/login", Method::POST, None, Some(to_body(credentials)?))
            .await
    }

    async fn logout(&self, token: &str) -> Result<(), RequestError> {
        self.send("/auth/logout", Method::POST, Some(token), None).await
    }

    async fn register_user(&self, user: &NewUser) -> Result<User, RequestError> {
        self.fetch("/users/register", Method::POST, None, Some(to_body(user)?))
            .await
    }

    async fn get_user(&self, user_id: &Id, token: &str) -> Result<User, RequestError> {
        self.fetch(&format!("/users/{}", segment(user_id)), Method::GET, Some(token), None)
            .await
    }

    async fn update_user(&self, user_id: &Id, update: &UserUpdate, token: &str) -> Result<User, RequestError> {
        self.fetch(
            &format!("/users/{}", segment(user_id)),
            Method::PUT,
            Some(token),
            Some(to_body(update)?),
        )
        .await
    }

    async fn list_accounts(&self, token: &str) -> Result<Vec<Account>, RequestError> {
        self.fetch("/accounts", Method::GET, Some(token), None).await
    }

    async fn get_account(&self, account_id: &Id, token: &str) -> Result<Account, RequestError> {
        self.fetch(&format!("/accounts/{}", segment(account_id)), Method::GET, Some(token), None)
            .await
    }

    async fn get_account_activity(&self, account_id: &Id, token: &str) -> Result<Vec<Transaction>, RequestError> {
        self.fetch(
            &format!("/accounts/{}/activity", segment(account_id)),
            Method::GET,
            Some(token),
            None,
        )
        .await
    }

    async fn get_account_transactions(&self, account_id: &Id, token: &str) -> Result<Vec<Transaction>, RequestError> {
        self.fetch(
            &format!("/accounts/{}/transactions", segment(account_id)),
            Method::GET,
            Some(token),
            None,
        )
        .await
    }

    async fn create_transfer(
        &self,
        account_id: &Id,
        transfer: &TransferRequest,
        token: &str,
    ) -> Result<CreatedResource, RequestError> {
        self.fetch(
            &format!("/accounts/{}/transfers", segment(account_id)),
            Method::POST,
            Some(token),
            Some(to_body(transfer)?),
        )
        .await
    }

    async fn create_deposit(
        &self,
        account_id: &Id,
        deposit: &DepositRequest,
        token: &str,
    ) -> Result<CreatedResource, RequestError> {
        self.fetch(
            &format!("/accounts/{}/deposit", segment(account_id)),
            Method::POST,
            Some(token),
            Some(to_body(deposit)?),
        )
        .await
    }

    async fn create_card(&self, account_id: &Id, card: &NewCard, token: &str) -> Result<Card, RequestError> {
        self.fetch(
            &format!("/accounts/{}/cards", segment(account_id)),
            Method::POST,
            Some(token),
            Some(to_body(card)?),
        )
        .await
    }

    async fn delete_card(&self, account_id: &Id, card_id: &Id, token: &str) -> Result<(), RequestError> {
        self.send(
            &format!("/accounts/{}/cards/{}", segment(account_id), segment(card_id)),
            Method::DELETE,
            Some(token),
            None,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use walletweb_core::GENERIC_REQUEST_ERROR;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::with_base_url(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_rejects_base_url_without_scheme() {
        let result = ApiClient::with_base_url("localhost:3000", Duration::from_secs(1));
        assert!(matches!(result, Err(ClientError::InvalidBaseUrl { .. })));

        let client = ApiClient::with_base_url("http://localhost:3000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_new_from_config() {
        let client = ApiClient::new(&Config::default()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[tokio::test]
    async fn test_request_sends_bearer_token_and_json_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/accounts"))
            .and(header("authorization", "Bearer tok"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "cvu": "0001", "alias": "ana.pago", "userId": 9 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let accounts = client(&server).list_accounts("tok").await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].alias, "ana.pago");
        assert_eq!(accounts[0].user_id, Id::new("9"));
    }

    #[tokio::test]
    async fn test_request_without_token_has_no_authorization_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({ "email": "ana@example.com", "password": "secreto" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "t1", "userId": 4 })))
            .mount(&server)
            .await;

        let response = client(&server)
            .login(&Credentials {
                email: "ana@example.com".to_string(),
                password: "secreto".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response.token, "t1");

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_no_content_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/accounts/1/cards/7"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client(&server);
        let value = client
            .request("/accounts/1/cards/7", Method::DELETE, Some("tok"), None)
            .await
            .unwrap();
        assert!(value.is_none());
        client.delete_card(&Id::new("1"), &Id::new("7"), "tok").await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_success_body_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let value = client(&server)
            .request("/auth/logout", Method::POST, Some("tok"), None)
            .await
            .unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_error_message_from_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accounts/10/transfers"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "message": "Saldo insuficiente" })))
            .mount(&server)
            .await;

        let request = TransferRequest {
            origin: "a".to_string(),
            destination: "b".to_string(),
            amount: "10".parse().unwrap(),
            name: "Ana".to_string(),
        };
        let error = client(&server)
            .create_transfer(&Id::new("10"), &request, "tok")
            .await
            .unwrap_err();
        assert_eq!(error, RequestError::new(400, "Saldo insuficiente"));
    }

    #[tokio::test]
    async fn test_error_message_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/3"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let error = client(&server).get_user(&Id::new("3"), "tok").await.unwrap_err();
        assert_eq!(error.status, 500);
        assert_eq!(error.message, GENERIC_REQUEST_ERROR);
    }

    #[tokio::test]
    async fn test_unauthorized_status_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/accounts/5/activity"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Token expirado" })))
            .mount(&server)
            .await;

        let error = client(&server)
            .get_account_activity(&Id::new("5"), "tok")
            .await
            .unwrap_err();
        assert!(error.is_unauthorized());
    }

    #[tokio::test]
    async fn test_transfer_posts_expected_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accounts/10/transfers"))
            .and(body_json(json!({
                "origin": "0010", "destination": "0020", "amount": 99.5, "name": "Ana Paz"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "tx123" })))
            .expect(1)
            .mount(&server)
            .await;

        let request = TransferRequest {
            origin: "0010".to_string(),
            destination: "0020".to_string(),
            amount: "99.5".parse().unwrap(),
            name: "Ana Paz".to_string(),
        };
        let created = client(&server)
            .create_transfer(&Id::new("10"), &request, "tok")
            .await
            .unwrap();
        assert_eq!(created.id, Id::new("tx123"));
    }

    #[tokio::test]
    async fn test_invalid_json_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/accounts/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let error = client(&server).get_account(&Id::new("1"), "tok").await.unwrap_err();
        assert_eq!(error.status, 200);
    }

    #[tokio::test]
    async fn test_transport_error_has_status_zero() {
        let client = ApiClient::with_base_url("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let error = client.list_accounts("tok").await.unwrap_err();
        assert_eq!(error.status, 0);
        assert!(!error.message.is_empty());
    }
}
