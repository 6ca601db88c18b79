//! Top-level pipeline: every configured account, every requested type, every instrument.
//!
//! Per account:
//!   fetch stored account → refresh token → persist token → one record per requested type.
//! A failure before publishing aborts that account only (one failure record); each type is
//! processed independently of the others. Accounts, types and instruments are handled
//! strictly one at a time.
//!
//! # Navigation
//! - Main entrypoint: [`Orchestrator::run`]
//! - Output: [`RunReport`] (see [`crate::report`])

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::classify::classify;
use crate::config::{AccountConfig, PublishConfig};
use crate::contract::{Board, Collaborators, CredentialPair, Instrument, InstrumentType};
use crate::error::PipelineError;
use crate::group::GroupProcessor;
use crate::pacing::Pause;
use crate::publish::ItemPublisher;
use crate::report::{AccountRunResult, GroupResult, RunReport, SummaryLine, UNKNOWN_ACCOUNT_TYPE};
use crate::session::SessionManager;

pub const CRYPTO_TOP_TIER_LABEL: &str = "Crypto (top tier)";
pub const CRYPTO_ALT_LABEL: &str = "Crypto (alt)";

pub struct Orchestrator<'a> {
    config: PublishConfig,
    services: Collaborators<'a>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: PublishConfig, services: Collaborators<'a>) -> Self {
        Self { config, services }
    }

    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    /// Run the whole batch. Only a configuration defect is returned as an error;
    /// every other failure is recorded in the report.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        self.config.validate()?;
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, accounts = self.config.accounts.len(), "[RUN] Starting publishing run");

        let mut results = Vec::new();
        let count = self.config.accounts.len();
        for (i, account) in self.config.accounts.iter().enumerate() {
            info!(
                %run_id,
                account_id = %account.id,
                position = i + 1,
                total = count,
                "[RUN] Processing account"
            );
            results.extend(self.run_account(account).await);

            if i + 1 < count {
                self.services.pacer.pause(Pause::BetweenAccounts).await;
            }
        }

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            results,
        };
        log_summary(&report);
        Ok(report)
    }

    async fn run_account(&self, account: &AccountConfig) -> Vec<AccountRunResult> {
        let session = match SessionManager::new(&self.services).refresh(&account.id).await {
            Ok(session) => session,
            Err(e) => {
                error!(account_id = %account.id, error = %e, "[RUN][ERROR] Account aborted");
                return vec![AccountRunResult::aborted(&account.id, &e)];
            }
        };

        let types = self.effective_types(account, session.stored_type.as_deref());
        if types.is_empty() {
            if self.config.type_filter.is_some() {
                info!(account_id = %account.id, "[RUN] No requested type passes the type filter");
                return Vec::new();
            }
            let e = PipelineError::UnknownType("no instrument type configured or stored".to_string());
            error!(account_id = %account.id, error = %e, "[RUN][ERROR] Nothing to publish");
            return vec![AccountRunResult::failed(
                &account.id,
                UNKNOWN_ACCOUNT_TYPE,
                "account",
                Vec::new(),
                &e,
            )];
        }
        info!(account_id = %account.id, types = ?types, "[RUN] Session ready");

        let mut results = Vec::with_capacity(types.len());
        for token in &types {
            results.push(self.run_type(&account.id, token, &session.credentials).await);
        }
        results
    }

    /// Configured types (or the stored type when none are configured), narrowed by the
    /// type filter. Tokens are kept raw; unknown ones are reported when processed.
    pub fn effective_types(&self, account: &AccountConfig, stored_type: Option<&str>) -> Vec<String> {
        let requested = match &account.types {
            Some(types) => types.clone(),
            None => stored_type.map(|t| vec![t.to_string()]).unwrap_or_default(),
        };
        match &self.config.type_filter {
            Some(filter) => requested.into_iter().filter(|t| filter.allows(t)).collect(),
            None => requested,
        }
    }

    async fn run_type(
        &self,
        account_id: &str,
        token: &str,
        credentials: &CredentialPair,
    ) -> AccountRunResult {
        let kind = match token.parse::<InstrumentType>() {
            Ok(kind) => kind,
            Err(e) => {
                error!(account_id, token, error = %e, "[RUN][ERROR] Unknown instrument type");
                return AccountRunResult::failed(account_id, token, token, Vec::new(), &e);
            }
        };
        info!(account_id, %kind, "[RUN] Processing instrument type");
        match kind {
            InstrumentType::Domestic | InstrumentType::World => {
                self.run_stock(account_id, kind, credentials).await
            }
            InstrumentType::Crypto => self.run_crypto(account_id, credentials).await,
        }
    }

    async fn run_stock(
        &self,
        account_id: &str,
        kind: InstrumentType,
        credentials: &CredentialPair,
    ) -> AccountRunResult {
        let label = kind.label();
        let board = self.config.boards.stock_board(kind);
        let instruments = match self.list(kind).await {
            Ok(list) => list,
            Err(e) => return listing_failure(account_id, kind, board, &e),
        };

        let group = self
            .group_processor()
            .process(&instruments, kind, label, board, credentials)
            .await;
        AccountRunResult::completed(account_id, kind.as_str(), label, vec![group])
    }

    async fn run_crypto(&self, account_id: &str, credentials: &CredentialPair) -> AccountRunResult {
        let kind = InstrumentType::Crypto;
        let instruments = match self.list(kind).await {
            Ok(list) => list,
            Err(e) => return listing_failure(account_id, kind, None, &e),
        };

        let (top_tier, alt) = classify(&instruments, &self.config.top_tier_codes);
        info!(
            account_id,
            total = instruments.len(),
            top_tier = top_tier.len(),
            alt = alt.len(),
            "[RUN] Crypto listing classified"
        );

        let processor = self.group_processor();
        let top_group = processor
            .process(
                &top_tier,
                kind,
                CRYPTO_TOP_TIER_LABEL,
                self.config.boards.crypto_top_tier_board(),
                credentials,
            )
            .await;
        let alt_group = processor
            .process(
                &alt,
                kind,
                CRYPTO_ALT_LABEL,
                self.config.boards.crypto_alt_board(),
                credentials,
            )
            .await;

        AccountRunResult::completed(account_id, kind.as_str(), kind.label(), vec![top_group, alt_group])
    }

    async fn list(&self, kind: InstrumentType) -> Result<Vec<Instrument>, PipelineError> {
        info!(%kind, size = self.config.listing_size, "[RUN] Fetching instrument listing");
        let instruments = self
            .services
            .content
            .list_instruments(kind, self.config.listing_size)
            .await
            .map_err(|e| PipelineError::Listing(format!("{kind} listing failed: {e}")))?;
        if instruments.is_empty() {
            return Err(PipelineError::Listing(format!("{kind} listing is empty")));
        }
        info!(%kind, count = instruments.len(), "[RUN] Listing fetched");
        Ok(instruments)
    }

    fn group_processor(&self) -> GroupProcessor<'_> {
        GroupProcessor::new(
            ItemPublisher::new(&self.services, &self.config),
            self.services.pacer,
        )
    }
}

fn listing_failure(
    account_id: &str,
    kind: InstrumentType,
    board: Option<Board>,
    e: &PipelineError,
) -> AccountRunResult {
    warn!(account_id, %kind, error = %e, "[RUN][ERROR] Listing failed, no items attempted");
    AccountRunResult::failed(
        account_id,
        kind.as_str(),
        kind.label(),
        vec![GroupResult::listing_failed(kind.label(), board, e)],
        e,
    )
}

fn log_summary(report: &RunReport) {
    let summary = report.summary();
    info!(
        run_id = %report.run_id,
        records = summary.total,
        success = summary.success,
        failed = summary.fail,
        "[RUN] Publishing run complete"
    );
    for account in &summary.accounts {
        info!(
            account_id = %account.account_id,
            account_type = %account.account_type,
            success = account.success,
            failed = account.fail,
            "[RUN] Account summary"
        );
        for line in &account.lines {
            match line {
                SummaryLine::Succeeded { label, success, total, skipped } => info!(
                    account_id = %account.account_id,
                    label = %label,
                    success,
                    total,
                    skipped,
                    "[RUN] Type summary"
                ),
                SummaryLine::Failed { label, error } => warn!(
                    account_id = %account.account_id,
                    label = %label,
                    error = %error,
                    "[RUN] Type failed"
                ),
            }
        }
    }
}
