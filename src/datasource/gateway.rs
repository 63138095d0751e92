//! HTTP client for the settlement gateway.
//!
//! The gateway fronts a settlement node and a signer. Event queries and
//! command submission are single-shot; balance reads retry transient
//! failures with exponential backoff.

use super::{BalanceScope, SettlementSource, SourceError};
use crate::domain::{Address, BaseUnits, Command, EventKind, EventLog};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Settlement source backed by the gateway's JSON API.
#[derive(Debug, Clone)]
pub struct GatewaySettlement {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventQuery<'a> {
    event: &'a str,
    from_block: u64,
    to_block: u64,
}

#[derive(Debug, Serialize)]
struct BalanceQuery<'a> {
    scope: BalanceScope,
    token: &'a Address,
    account: &'a Address,
}

#[derive(Debug, Serialize)]
struct Submission<'a> {
    from: &'a Address,
    command: &'a Command,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockNumberReply {
    block_number: u64,
}

#[derive(Debug, Deserialize)]
struct BalanceReply {
    balance: BaseUnits,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionReply {
    transaction_hash: String,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: String,
}

impl GatewaySettlement {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, SourceError> {
        let status = response.status();
        if status == 429 {
            return Err(SourceError::RateLimited);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::HttpError {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| SourceError::ParseError(e.to_string()))
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, SourceError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| SourceError::NetworkError(e.to_string()))?;
        Self::parse(response).await
    }
}

/// Sort a transient failure from a permanent one for the retry loop.
fn classify(err: SourceError) -> backoff::Error<SourceError> {
    match &err {
        SourceError::NetworkError(_) | SourceError::RateLimited => backoff::Error::transient(err),
        SourceError::HttpError { status, .. } if *status >= 500 => backoff::Error::transient(err),
        _ => backoff::Error::permanent(err),
    }
}

#[async_trait]
impl SettlementSource for GatewaySettlement {
    async fn latest_block(&self) -> Result<u64, SourceError> {
        let response = self
            .client
            .get(self.url("block-number"))
            .send()
            .await
            .map_err(|e| SourceError::NetworkError(e.to_string()))?;
        let reply: BlockNumberReply = Self::parse(response).await?;
        Ok(reply.block_number)
    }

    async fn query_past_events(
        &self,
        kind: EventKind,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<EventLog>, SourceError> {
        debug!(
            "Querying {} events from_block={}, to_block={}",
            kind, from_block, to_block
        );
        let query = EventQuery {
            event: kind.as_str(),
            from_block,
            to_block,
        };
        self.post_json("events", &query).await
    }

    async fn get_balance(
        &self,
        scope: BalanceScope,
        token: &Address,
        account: &Address,
    ) -> Result<BaseUnits, SourceError> {
        let query = BalanceQuery {
            scope,
            token,
            account,
        };
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(10)),
            ..Default::default()
        };

        retry(backoff, || async {
            self.post_json::<_, BalanceReply>("balance", &query)
                .await
                .map(|reply| reply.balance)
                .map_err(|e| {
                    debug!("Balance read failed: {}", e);
                    classify(e)
                })
        })
        .await
    }

    async fn submit(&self, from: &Address, command: &Command) -> Result<String, SourceError> {
        let response = self
            .client
            .post(self.url("commands"))
            .json(&Submission { from, command })
            .send()
            .await
            .map_err(|e| SourceError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let reply: SubmissionReply = response
                .json()
                .await
                .map_err(|e| SourceError::ParseError(e.to_string()))?;
            return Ok(reply.transaction_hash);
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorReply>(&body) {
            Ok(reply) => Err(SourceError::Rejected(reply.error)),
            Err(_) => {
                warn!("Gateway returned {} without an error body", status);
                Err(SourceError::HttpError {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }
}
