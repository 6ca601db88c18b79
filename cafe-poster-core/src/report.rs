//! Result records produced by the pipeline, from single items up to the whole run.
//!
//! - [`ItemResult`]: one per instrument, always produced.
//! - [`GroupResult`]: one per board-bound instrument list.
//! - [`AccountRunResult`]: one per requested type per account, or one abort record.
//! - [`RunReport`]: everything, plus the per-account [`RunSummary`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::contract::{Board, Instrument};
use crate::error::PipelineError;

/// Terminal state of one item. `Skipped` means content was produced but no board
/// was configured; it is not a failure but it is not a publication either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Published,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemResult {
    pub instrument_code: String,
    pub display_name: String,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Platform payload returned for a published article.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<serde_json::Value>,
}

impl ItemResult {
    fn base(instrument: &Instrument, status: ItemStatus) -> Self {
        Self {
            instrument_code: instrument.code.clone(),
            display_name: instrument.display_name().to_string(),
            status,
            subject: None,
            error: None,
            receipt: None,
        }
    }

    pub fn published(instrument: &Instrument, subject: String, receipt: serde_json::Value) -> Self {
        Self {
            subject: Some(subject),
            receipt: Some(receipt),
            ..Self::base(instrument, ItemStatus::Published)
        }
    }

    pub fn skipped(instrument: &Instrument, subject: String) -> Self {
        Self {
            subject: Some(subject),
            ..Self::base(instrument, ItemStatus::Skipped)
        }
    }

    pub fn failed(instrument: &Instrument, error: &PipelineError) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::base(instrument, ItemStatus::Failed)
        }
    }

    /// Published or skipped.
    pub fn success(&self) -> bool {
        self.status != ItemStatus::Failed
    }

    pub fn skipped_flag(&self) -> bool {
        self.status == ItemStatus::Skipped
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupResult {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<Board>,
    pub total: usize,
    pub success_count: usize,
    pub fail_count: usize,
    pub skipped_count: usize,
    pub items: Vec<ItemResult>,
    /// Group-level failure (the listing could not be fetched); no items were attempted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GroupResult {
    pub fn from_items(label: impl Into<String>, board: Option<Board>, items: Vec<ItemResult>) -> Self {
        let success_count = items.iter().filter(|i| i.success()).count();
        let skipped_count = items.iter().filter(|i| i.skipped_flag()).count();
        Self {
            label: label.into(),
            board,
            total: items.len(),
            success_count,
            fail_count: items.len() - success_count,
            skipped_count,
            items,
            error: None,
        }
    }

    pub fn listing_failed(label: impl Into<String>, board: Option<Board>, error: &PipelineError) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::from_items(label, board, Vec::new())
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

/// Account type recorded for an account that aborted before its type was known.
pub const UNKNOWN_ACCOUNT_TYPE: &str = "unknown";

/// Outcome of one requested type for one account, or of an aborted account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountRunResult {
    pub account_id: String,
    /// The raw type token this record is for.
    pub account_type: String,
    pub label: String,
    pub groups: Vec<GroupResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AccountRunResult {
    pub fn completed(
        account_id: &str,
        account_type: &str,
        label: impl Into<String>,
        groups: Vec<GroupResult>,
    ) -> Self {
        Self {
            account_id: account_id.to_string(),
            account_type: account_type.to_string(),
            label: label.into(),
            groups,
            error: None,
        }
    }

    /// Type-level failure. Keeps any group record describing the failure.
    pub fn failed(
        account_id: &str,
        account_type: &str,
        label: impl Into<String>,
        groups: Vec<GroupResult>,
        error: &PipelineError,
    ) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::completed(account_id, account_type, label, groups)
        }
    }

    /// The account never reached publishing.
    pub fn aborted(account_id: &str, error: &PipelineError) -> Self {
        Self::failed(account_id, UNKNOWN_ACCOUNT_TYPE, "account", Vec::new(), error)
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.total).sum()
    }

    pub fn success_count(&self) -> usize {
        self.groups.iter().map(|g| g.success_count).sum()
    }

    pub fn fail_count(&self) -> usize {
        self.groups.iter().map(|g| g.fail_count).sum()
    }

    pub fn skipped_count(&self) -> usize {
        self.groups.iter().map(|g| g.skipped_count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<AccountRunResult>,
}

impl RunReport {
    /// Records (account × type) that succeeded.
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.success()).count()
    }

    pub fn fail_count(&self) -> usize {
        self.results.iter().filter(|r| !r.success()).count()
    }

    /// Records grouped by account, in first-seen order.
    pub fn summary(&self) -> RunSummary {
        let mut accounts: Vec<AccountSummary> = Vec::new();
        for result in &self.results {
            let position = accounts
                .iter()
                .position(|a| a.account_id == result.account_id);
            let idx = match position {
                Some(idx) => idx,
                None => {
                    accounts.push(AccountSummary {
                        account_id: result.account_id.clone(),
                        account_type: result.account_type.clone(),
                        success: 0,
                        fail: 0,
                        lines: Vec::new(),
                    });
                    accounts.len() - 1
                }
            };
            let entry = &mut accounts[idx];
            if result.success() {
                entry.success += 1;
            } else {
                entry.fail += 1;
            }
            entry.lines.push(SummaryLine::from(result));
        }
        RunSummary {
            total: self.results.len(),
            success: self.success_count(),
            fail: self.fail_count(),
            accounts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub success: usize,
    pub fail: usize,
    pub accounts: Vec<AccountSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub account_id: String,
    /// Type of the account's first record.
    pub account_type: String,
    pub success: usize,
    pub fail: usize,
    pub lines: Vec<SummaryLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SummaryLine {
    Succeeded {
        label: String,
        success: usize,
        total: usize,
        skipped: usize,
    },
    Failed {
        label: String,
        error: String,
    },
}

impl From<&AccountRunResult> for SummaryLine {
    fn from(result: &AccountRunResult) -> Self {
        match &result.error {
            None => SummaryLine::Succeeded {
                label: result.label.clone(),
                success: result.success_count(),
                total: result.total(),
                skipped: result.skipped_count(),
            },
            Some(error) => SummaryLine::Failed {
                label: result.label.clone(),
                error: error.clone(),
            },
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total records: {}", self.total)?;
        writeln!(f, "Succeeded: {}", self.success)?;
        writeln!(f, "Failed: {}", self.fail)?;
        for account in &self.accounts {
            writeln!(f)?;
            writeln!(f, "  [{}] ({})", account.account_id, account.account_type)?;
            writeln!(f, "    succeeded: {}, failed: {}", account.success, account.fail)?;
            for line in &account.lines {
                match line {
                    SummaryLine::Succeeded { label, success, total, skipped: 0 } => {
                        writeln!(f, "    - {label}: {success}/{total} articles")?
                    }
                    SummaryLine::Succeeded { label, success, total, skipped } => writeln!(
                        f,
                        "    - {label}: {success}/{total} articles ({skipped} not published)"
                    )?,
                    SummaryLine::Failed { label, error } => {
                        writeln!(f, "    - {label}: failed - {error}")?
                    }
                }
            }
        }
        Ok(())
    }
}
