//! Account session manager: stored refresh token → fresh access token → persisted pair.
//!
//! Publishing for an account may only start once [`SessionManager::refresh`] returned
//! `Ok`, i.e. once the (possibly rotated) refresh token is confirmed saved.
//! There are no retries; any failure is a [`PipelineError::Credential`].

use tracing::{error, info};

use crate::contract::{
    AccountStore, Collaborators, CredentialPair, SaveTokenRequest, TokenExchange,
};
use crate::error::PipelineError;

/// A verified session for one account.
#[derive(Debug, Clone)]
pub struct Session {
    /// Type stored for the account, used when the configuration lists none.
    pub stored_type: Option<String>,
    pub credentials: CredentialPair,
}

pub struct SessionManager<'a> {
    accounts: &'a dyn AccountStore,
    tokens: &'a dyn TokenExchange,
}

impl<'a> SessionManager<'a> {
    pub fn new(services: &Collaborators<'a>) -> Self {
        Self {
            accounts: services.accounts,
            tokens: services.tokens,
        }
    }

    pub async fn refresh(&self, account_id: &str) -> Result<Session, PipelineError> {
        let result = self.try_refresh(account_id).await;
        if let Err(e) = &result {
            error!(account_id, error = %e, "[SESSION][ERROR] Session could not be established");
        }
        result
    }

    async fn try_refresh(&self, account_id: &str) -> Result<Session, PipelineError> {
        // Stored account
        info!(account_id, "[SESSION] Fetching stored account");
        let lookup = self
            .accounts
            .fetch_account(account_id)
            .await
            .map_err(|e| credential(format!("account lookup failed: {e}")))?;
        let record = match (lookup.success, lookup.data) {
            (true, Some(record)) => record,
            _ => return Err(credential(format!("account not found: {account_id}"))),
        };
        let stored_refresh = record
            .refresh_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| credential(format!("no refresh token on file for {account_id}")))?;

        // Exchange
        info!(account_id, "[SESSION] Exchanging refresh token");
        let grant = self
            .tokens
            .refresh(&stored_refresh)
            .await
            .map_err(|e| credential(format!("token refresh failed: {e}")))?;
        if let Some(err) = grant.error.as_deref() {
            let detail = grant
                .error_description
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or(err);
            return Err(credential(format!("token refresh failed: {detail}")));
        }
        let access_token = grant
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| credential("token refresh returned no access_token".to_string()))?;
        let rotated = grant.refresh_token.filter(|t| !t.is_empty());
        info!(account_id, rotated = rotated.is_some(), "[SESSION] Token refreshed");
        let credentials = CredentialPair {
            access_token,
            refresh_token: rotated.unwrap_or(stored_refresh),
        };

        // Persist
        let request = SaveTokenRequest {
            id: account_id.to_string(),
            account_type: record.account_type.clone(),
            access_token: credentials.access_token.clone(),
            refresh_token: credentials.refresh_token.clone(),
        };
        let saved = self
            .accounts
            .save_token(&request)
            .await
            .map_err(|e| credential(format!("token save failed: {e}")))?;
        if !saved.success {
            let reason = saved.error.unwrap_or_else(|| "Unknown error".to_string());
            return Err(credential(format!("token save failed: {reason}")));
        }
        info!(account_id, "[SESSION] Token saved");

        Ok(Session {
            stored_type: record.account_type,
            credentials,
        })
    }
}

fn credential(message: String) -> PipelineError {
    PipelineError::Credential(message)
}
