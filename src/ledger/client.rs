//! HTTP client for the ledger REST API.
//!
//! Authenticates with an OAuth2 resource-owner password grant and refreshes
//! the access token when it expires or the service rejects it.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::runtime::Runtime;

use crate::config::ApiConfig;
use crate::ledger::error::LedgerError;
use crate::ledger::types::{
    valid_balance, CardInfo, CardRegistration, NfcRecord, Spend, TokenResponse, User, UserRecord,
    VoucherPurchase, VoucherUse, Wallet,
};
use crate::ledger::Ledger;

const TOKEN_PATH: &str = "o/token/";

/// Refresh this long before the advertised expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct Token {
    access: String,
    refresh: Option<String>,
    expires_at: Option<Instant>,
}

impl Token {
    fn is_expired(&self) -> bool {
        self.expires_at
            .map(|at| Instant::now() + EXPIRY_MARGIN >= at)
            .unwrap_or(false)
    }
}

impl From<TokenResponse> for Token {
    fn from(grant: TokenResponse) -> Self {
        Token {
            access: grant.access_token,
            refresh: grant.refresh_token,
            expires_at: grant
                .expires_in
                .map(|secs| Instant::now() + Duration::from_secs(secs)),
        }
    }
}

/// Async client. One instance per process; the token is shared by all calls.
pub struct LedgerClient {
    http: Client,
    base: Url,
    api: ApiConfig,
    token: Mutex<Option<Token>>,
}

impl LedgerClient {
    pub fn new(api: &ApiConfig) -> Result<Self, LedgerError> {
        let mut base_url = api.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base = Url::parse(&base_url).map_err(|e| LedgerError::Url(e.to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(u64::from(api.timeout_seconds)))
            .danger_accept_invalid_certs(api.accept_invalid_certs)
            .build()
            .map_err(|e| LedgerError::http("client", e))?;

        Ok(Self {
            http,
            base,
            api: api.clone(),
            token: Mutex::new(None),
        })
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, LedgerError> {
        self.resource_url(path, &[], query)
    }

    /// `path` followed by `ids`, each encoded as exactly one path segment.
    fn resource_url(
        &self,
        path: &str,
        ids: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Url, LedgerError> {
        let mut url = self
            .base
            .join(path)
            .map_err(|e| LedgerError::Url(e.to_string()))?;
        if !ids.is_empty() {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| LedgerError::Url(format!("{} cannot hold a path", self.base)))?;
            segments.pop_if_empty();
            for id in ids {
                if !is_segment(id) {
                    return Err(LedgerError::Url(format!("invalid path segment '{}'", id)));
                }
                segments.push(id);
            }
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn access_token(&self) -> Result<String, LedgerError> {
        let current = self.token.lock().clone();
        match current {
            Some(token) if !token.is_expired() => Ok(token.access),
            Some(_) => self.refresh_token().await,
            None => self.password_grant().await,
        }
    }

    async fn password_grant(&self) -> Result<String, LedgerError> {
        tracing::info!(username = %self.api.username, "Requesting ledger access token");
        self.request_token(&[
            ("grant_type", "password"),
            ("username", self.api.username.as_str()),
            ("password", self.api.password.as_str()),
            ("client_id", self.api.client_id.as_str()),
            ("client_secret", self.api.client_secret.as_str()),
        ])
        .await
    }

    /// Falls back to a fresh password grant when there is no refresh token
    /// or the service refuses it.
    async fn refresh_token(&self) -> Result<String, LedgerError> {
        let refresh = self.token.lock().as_ref().and_then(|t| t.refresh.clone());
        let Some(refresh) = refresh else {
            return self.password_grant().await;
        };
        let refreshed = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh.as_str()),
                ("client_id", self.api.client_id.as_str()),
                ("client_secret", self.api.client_secret.as_str()),
            ])
            .await;
        match refreshed {
            Ok(access) => Ok(access),
            Err(err) => {
                tracing::warn!("Token refresh failed, signing in again: {}", err);
                self.password_grant().await
            }
        }
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<String, LedgerError> {
        let url = self.url(TOKEN_PATH, &[])?;
        let mut encoded = url.clone();
        encoded.query_pairs_mut().clear().extend_pairs(form);
        let body = encoded.query().unwrap_or_default().to_string();

        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| LedgerError::http(TOKEN_PATH, e))?;
        if !response.status().is_success() {
            *self.token.lock() = None;
            return Err(LedgerError::Auth(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }
        let grant: TokenResponse = decode(TOKEN_PATH, response).await?;
        let token = Token::from(grant);
        let access = token.access.clone();
        *self.token.lock() = Some(token);
        Ok(access)
    }

    /// Sends an authenticated request, refreshing the token once on 401.
    async fn send<F>(&self, endpoint: &str, build: F) -> Result<Response, LedgerError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let token = self.access_token().await?;
        let response = build(&self.http)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| LedgerError::http(endpoint, e))?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::info!(endpoint, "Access token rejected, refreshing");
        let token = self.refresh_token().await?;
        build(&self.http)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| LedgerError::http(endpoint, e))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, LedgerError> {
        let endpoint = url.path().to_string();
        let response = self.send(&endpoint, |http| http.get(url.clone())).await?;
        let response = expect_success(&endpoint, response)?;
        decode(&endpoint, response).await
    }

    async fn post_json<B: serde::Serialize>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<Response, LedgerError> {
        let endpoint = url.path().to_string();
        self.send(&endpoint, |http| http.post(url.clone()).json(body))
            .await
    }

    pub async fn card_info(&self, card_uid: &str) -> Result<Option<CardInfo>, LedgerError> {
        let url = self.url("api/core/nfc", &[("format", "json"), ("card_uid", card_uid)])?;
        let records: Vec<NfcRecord> = self.get_json(url).await?;
        Ok(records.into_iter().next().map(CardInfo::from))
    }

    pub async fn find_user(&self, username: &str) -> Result<Option<User>, LedgerError> {
        if !is_segment(username) {
            tracing::debug!(username = %username, "Not a valid username");
            return Ok(None);
        }
        let url = self.resource_url("api/core/users/", &[username], &[("format", "json")])?;
        let endpoint = url.path().to_string();
        let response = self.send(&endpoint, |http| http.get(url.clone())).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = expect_success(&endpoint, response)?;
        let body: serde_json::Value = decode(&endpoint, response).await?;
        // The service answers unknown users with {"detail": "Not found."}.
        if body.get("detail").is_some() {
            return Ok(None);
        }
        let user: UserRecord =
            serde_json::from_value(body).map_err(|e| LedgerError::decode(&endpoint, e))?;
        Ok(Some(User {
            id: user.id,
            username: user.username,
        }))
    }

    pub async fn register_card(
        &self,
        card_uid: &str,
        user_id: Option<u64>,
        intern: bool,
    ) -> Result<bool, LedgerError> {
        let body = CardRegistration {
            card_uid,
            user: user_id,
            intern,
            comment: "",
        };
        let response = self.post_json(self.url("api/core/nfc", &[])?, &body).await?;
        Ok(response.status() == StatusCode::CREATED)
    }

    pub async fn voucher_balance(&self, username: &str) -> Result<f64, LedgerError> {
        let url = self.url("api/voucher/wallets", &[("format", "json"), ("user", username)])?;
        let wallets: Vec<Wallet> = self.get_json(url).await?;
        Ok(valid_balance(&wallets))
    }

    pub async fn coffee_balance(&self, card_uid: &str) -> Result<f64, LedgerError> {
        let url = self.url(
            "api/coffee/wallets",
            &[("format", "json"), ("card_uid", card_uid)],
        )?;
        let wallets: Vec<Wallet> = self.get_json(url).await?;
        Ok(valid_balance(&wallets))
    }

    pub async fn use_vouchers(&self, username: &str, amount: u32) -> Result<Spend, LedgerError> {
        let url = self.resource_url("api/voucher/users/", &[username, "use_vouchers"], &[])?;
        self.spend(url, amount).await
    }

    pub async fn use_coffee_vouchers(
        &self,
        card_uid: &str,
        amount: u32,
    ) -> Result<Spend, LedgerError> {
        let url = self.resource_url("api/coffee/cards/", &[card_uid, "use_vouchers"], &[])?;
        self.spend(url, amount).await
    }

    async fn spend(&self, url: Url, amount: u32) -> Result<Spend, LedgerError> {
        let endpoint = url.path().to_string();
        let response = self
            .post_json(url, &VoucherUse { vouchers: amount })
            .await?;
        match response.status() {
            StatusCode::CREATED => Ok(Spend::Accepted),
            StatusCode::PAYMENT_REQUIRED => Ok(Spend::Insufficient),
            status => Err(LedgerError::Status {
                endpoint,
                status: status.as_u16(),
            }),
        }
    }

    pub async fn add_coffee_vouchers(&self, card_uid: &str, amount: u32) -> Result<bool, LedgerError> {
        let body = VoucherPurchase {
            card: card_uid,
            vouchers: amount,
        };
        let url = self.url("api/coffee/registerlogs", &[])?;
        let response = self.post_json(url, &body).await?;
        Ok(response.status() == StatusCode::CREATED)
    }
}

/// Rejects identifiers that would not stay a single path segment.
fn is_segment(id: &str) -> bool {
    !matches!(id, "" | "." | "..")
}

fn expect_success(endpoint: &str, response: Response) -> Result<Response, LedgerError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(LedgerError::Status {
            endpoint: endpoint.to_string(),
            status: response.status().as_u16(),
        })
    }
}

async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T, LedgerError> {
    response
        .json::<T>()
        .await
        .map_err(|e| LedgerError::decode(endpoint, e))
}

/// [`Ledger`] over [`LedgerClient`], driving it on a private runtime so the
/// session controller stays synchronous.
pub struct HttpLedger {
    client: LedgerClient,
    runtime: Runtime,
}

impl HttpLedger {
    pub fn new(api: &ApiConfig) -> Result<Self, LedgerError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(LedgerError::Runtime)?;
        Ok(Self {
            client: LedgerClient::new(api)?,
            runtime,
        })
    }
}

impl Ledger for HttpLedger {
    fn card_info(&self, card_uid: &str) -> Result<Option<CardInfo>, LedgerError> {
        self.runtime.block_on(self.client.card_info(card_uid))
    }

    fn find_user(&self, username: &str) -> Result<Option<User>, LedgerError> {
        self.runtime.block_on(self.client.find_user(username))
    }

    fn register_card(
        &self,
        card_uid: &str,
        user_id: Option<u64>,
        intern: bool,
    ) -> Result<bool, LedgerError> {
        self.runtime
            .block_on(self.client.register_card(card_uid, user_id, intern))
    }

    fn voucher_balance(&self, username: &str) -> Result<f64, LedgerError> {
        self.runtime.block_on(self.client.voucher_balance(username))
    }

    fn coffee_balance(&self, card_uid: &str) -> Result<f64, LedgerError> {
        self.runtime.block_on(self.client.coffee_balance(card_uid))
    }

    fn use_vouchers(&self, username: &str, amount: u32) -> Result<Spend, LedgerError> {
        self.runtime
            .block_on(self.client.use_vouchers(username, amount))
    }

    fn use_coffee_vouchers(&self, card_uid: &str, amount: u32) -> Result<Spend, LedgerError> {
        self.runtime
            .block_on(self.client.use_coffee_vouchers(card_uid, amount))
    }

    fn add_coffee_vouchers(&self, card_uid: &str, amount: u32) -> Result<bool, LedgerError> {
        self.runtime
            .block_on(self.client.add_coffee_vouchers(card_uid, amount))
    }
}
