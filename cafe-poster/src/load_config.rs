/// `load_config` module: loads the static YAML run configuration and adapts it into the core's
/// [`PublishConfig`].
///
/// This module is the only place where untrusted YAML is parsed. Everything downstream works on
/// strongly-typed core models.
///
/// # Responsibilities
/// - Parse the YAML file into [`CliConfig`]
/// - Apply the `PFLOW_BASE_URL` environment override to `backend.base_url`
/// - Map accounts, boards, delays and chart templates into [`PublishConfig`], honouring the
///   test-mode and type-filter [`RunOptions`] chosen on the command line
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use cafe_poster_core::config::{AccountConfig, BoardRouting, PublishConfig, TypeFilter, DEFAULT_LISTING_SIZE};
use cafe_poster_core::contract::InstrumentType;
use cafe_poster_core::pacing::DelayPolicy;
use serde::Deserialize;
use tracing::{error, info, warn};

pub const BASE_URL_ENV: &str = "PFLOW_BASE_URL";
pub const DEFAULT_CAFE_API_BASE: &str = "https://openapi.naver.com";

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    pub backend: BackendSection,
    #[serde(default)]
    pub cafe: CafeSection,
    pub accounts: Vec<AccountSection>,
    #[serde(default)]
    pub crypto: CryptoSection,
    #[serde(default)]
    pub listing_size: Option<usize>,
    #[serde(default)]
    pub delays: Option<DelaySection>,
    #[serde(default)]
    pub chart_images: BTreeMap<InstrumentType, String>,
}

#[derive(Debug, Deserialize)]
pub struct BackendSection {
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct CafeSection {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub club_id: Option<u64>,
    #[serde(default)]
    pub boards: BoardSection,
    #[serde(default)]
    pub test: Option<TestBoardSection>,
}

impl Default for CafeSection {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            club_id: None,
            boards: BoardSection::default(),
            test: None,
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_CAFE_API_BASE.to_string()
}

#[derive(Debug, Default, Deserialize)]
pub struct BoardSection {
    pub domestic: Option<u64>,
    pub world: Option<u64>,
    pub crypto_top_tier: Option<u64>,
    pub crypto_alt: Option<u64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TestBoardSection {
    pub club_id: u64,
    pub menu_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct AccountSection {
    pub id: String,
    #[serde(default)]
    pub types: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CryptoSection {
    #[serde(default)]
    pub top_tier: Vec<String>,
}

/// Delays in whole seconds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DelaySection {
    pub between_items: u64,
    pub between_accounts: u64,
}

/// Per-invocation switches chosen on the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub test_mode: bool,
    pub type_filter: Option<TypeFilter>,
}

impl CliConfig {
    /// Map the YAML-side sections into the core's run configuration.
    pub fn to_publish_config(&self, options: &RunOptions) -> Result<PublishConfig> {
        let boards = if options.test_mode {
            let Some(test) = self.cafe.test else {
                bail!("test mode requested but cafe.test is not configured");
            };
            info!(
                club_id = test.club_id,
                menu_id = test.menu_id,
                "Test mode: routing every board to the test menu"
            );
            BoardRouting::single_menu(test.club_id, test.menu_id)
        } else {
            if self.cafe.club_id.is_none() {
                warn!("No cafe.club_id configured; articles will be generated but not published");
            }
            BoardRouting {
                club_id: self.cafe.club_id,
                domestic: self.cafe.boards.domestic,
                world: self.cafe.boards.world,
                crypto_top_tier: self.cafe.boards.crypto_top_tier,
                crypto_alt: self.cafe.boards.crypto_alt,
            }
        };

        let accounts = self
            .accounts
            .iter()
            .map(|a| AccountConfig {
                id: a.id.clone(),
                types: a.types.clone(),
            })
            .collect();

        let mut config = PublishConfig::new(accounts, boards);
        config.top_tier_codes = self.crypto.top_tier.clone();
        config.listing_size = self.listing_size.unwrap_or(DEFAULT_LISTING_SIZE);
        if let Some(delays) = self.delays {
            config.delays = DelayPolicy {
                between_items: Duration::from_secs(delays.between_items),
                between_accounts: Duration::from_secs(delays.between_accounts),
            };
        }
        config.type_filter = options.type_filter.clone();
        config.chart_images = self.chart_images.clone();

        config.validate()?;
        Ok(config)
    }
}

/// Loads the YAML config file and applies the environment override for the backend URL.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let mut config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(cfg) => {
            info!(config_path = ?path_ref, "YAML parsed successfully");
            cfg
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse YAML config");
            return Err(anyhow::anyhow!(
                "Failed to parse YAML config {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
        if !base_url.trim().is_empty() {
            info!(env = BASE_URL_ENV, base_url = %base_url, "Overriding backend.base_url from environment");
            config.backend.base_url = base_url;
        }
    }
    if config.backend.base_url.trim().is_empty() {
        error!(config_path = ?path_ref, "backend.base_url is empty");
        bail!("backend.base_url must not be empty");
    }

    info!(
        accounts = config.accounts.len(),
        base_url = %config.backend.base_url,
        test_board = config.cafe.test.is_some(),
        "Loaded CliConfig"
    );
    Ok(config)
}
