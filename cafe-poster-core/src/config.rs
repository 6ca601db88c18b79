//! Immutable run configuration injected into the orchestrator.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::contract::{Board, InstrumentType};
use crate::error::PipelineError;
use crate::pacing::DelayPolicy;

pub const DEFAULT_LISTING_SIZE: usize = 20;

/// One account to publish for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountConfig {
    pub id: String,
    /// Raw type tokens. `None` means "use the type stored for the account".
    pub types: Option<Vec<String>>,
}

impl AccountConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            types: None,
        }
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = Some(types.into_iter().map(Into::into).collect());
        self
    }
}

/// Menu ids per board inside one club. A missing club or menu means "do not publish".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardRouting {
    pub club_id: Option<u64>,
    pub domestic: Option<u64>,
    pub world: Option<u64>,
    pub crypto_top_tier: Option<u64>,
    pub crypto_alt: Option<u64>,
}

impl BoardRouting {
    /// Every board pointed at a single test menu.
    pub fn single_menu(club_id: u64, menu_id: u64) -> Self {
        Self {
            club_id: Some(club_id),
            domestic: Some(menu_id),
            world: Some(menu_id),
            crypto_top_tier: Some(menu_id),
            crypto_alt: Some(menu_id),
        }
    }

    fn board(&self, menu_id: Option<u64>) -> Option<Board> {
        Some(Board {
            club_id: self.club_id?,
            menu_id: menu_id?,
        })
    }

    /// Board for a stock type. Crypto boards are split; use the dedicated accessors.
    pub fn stock_board(&self, kind: InstrumentType) -> Option<Board> {
        match kind {
            InstrumentType::Domestic => self.board(self.domestic),
            InstrumentType::World => self.board(self.world),
            InstrumentType::Crypto => None,
        }
    }

    pub fn crypto_top_tier_board(&self) -> Option<Board> {
        self.board(self.crypto_top_tier)
    }

    pub fn crypto_alt_board(&self) -> Option<Board> {
        self.board(self.crypto_alt)
    }
}

/// Restricts a run to a subset of instrument types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeFilter(BTreeSet<InstrumentType>);

impl TypeFilter {
    /// `None` when no type was selected (no filtering).
    pub fn from_selection(selection: impl IntoIterator<Item = InstrumentType>) -> Option<Self> {
        let set: BTreeSet<_> = selection.into_iter().collect();
        (!set.is_empty()).then_some(Self(set))
    }

    /// Whether a raw type token passes the filter. Unknown tokens never do.
    pub fn allows(&self, token: &str) -> bool {
        token
            .parse::<InstrumentType>()
            .map(|kind| self.0.contains(&kind))
            .unwrap_or(false)
    }

    pub fn types(&self) -> impl Iterator<Item = InstrumentType> + '_ {
        self.0.iter().copied()
    }
}

#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub accounts: Vec<AccountConfig>,
    pub boards: BoardRouting,
    /// Coin codes routed to the top-tier crypto board.
    pub top_tier_codes: Vec<String>,
    /// Size of the ranked stock listings.
    pub listing_size: usize,
    pub delays: DelayPolicy,
    pub type_filter: Option<TypeFilter>,
    /// Chart image URL template per type; `{code}` is replaced by the instrument code.
    pub chart_images: BTreeMap<InstrumentType, String>,
}

impl PublishConfig {
    pub fn new(accounts: Vec<AccountConfig>, boards: BoardRouting) -> Self {
        Self {
            accounts,
            boards,
            top_tier_codes: Vec::new(),
            listing_size: DEFAULT_LISTING_SIZE,
            delays: DelayPolicy::default(),
            type_filter: None,
            chart_images: BTreeMap::new(),
        }
    }

    /// Reject configurations the orchestrator cannot run at all.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.accounts.is_empty() {
            return Err(PipelineError::Configuration(
                "no accounts configured".to_string(),
            ));
        }
        if let Some(account) = self.accounts.iter().find(|a| a.id.trim().is_empty()) {
            return Err(PipelineError::Configuration(format!(
                "account with empty id (types: {:?})",
                account.types
            )));
        }
        if self.listing_size == 0 {
            return Err(PipelineError::Configuration(
                "listing_size must be positive".to_string(),
            ));
        }
        if self.delays.between_accounts < self.delays.between_items {
            return Err(PipelineError::Configuration(format!(
                "between_accounts delay ({:?}) is shorter than between_items delay ({:?})",
                self.delays.between_accounts, self.delays.between_items
            )));
        }
        Ok(())
    }

    /// Chart image URL for an instrument, if a template is configured for its type.
    pub fn chart_image_url(&self, kind: InstrumentType, code: &str) -> Option<String> {
        self.chart_images
            .get(&kind)
            .map(|template| template.replace("{code}", code))
    }

    pub fn trace_loaded(&self) {
        info!(
            accounts = self.accounts.len(),
            club_id = ?self.boards.club_id,
            top_tier = self.top_tier_codes.len(),
            listing_size = self.listing_size,
            filter = ?self.type_filter,
            "Loaded PublishConfig"
        );
        debug!(?self, "PublishConfig loaded (full debug)");
    }
}
