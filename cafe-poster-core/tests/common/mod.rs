#![allow(dead_code)]

use cafe_poster_core::config::{AccountConfig, BoardRouting, PublishConfig};
use cafe_poster_core::contract::{
    AccountLookup, AccountRecord, Collaborators, ContentResponse, Instrument, MockAccountStore,
    MockArticleSink, MockContentSource, MockImageSource, MockTokenExchange, SaveTokenResponse,
    TokenResponse,
};
use cafe_poster_core::pacing::MockPacer;

/// One mock per collaborator; borrow them all with [`Mocks::services`].
pub struct Mocks {
    pub accounts: MockAccountStore,
    pub tokens: MockTokenExchange,
    pub content: MockContentSource,
    pub images: MockImageSource,
    pub articles: MockArticleSink,
    pub pacer: MockPacer,
}

impl Mocks {
    pub fn new() -> Self {
        Self {
            accounts: MockAccountStore::new(),
            tokens: MockTokenExchange::new(),
            content: MockContentSource::new(),
            images: MockImageSource::new(),
            articles: MockArticleSink::new(),
            pacer: MockPacer::new(),
        }
    }

    pub fn services(&self) -> Collaborators<'_> {
        Collaborators {
            accounts: &self.accounts,
            tokens: &self.tokens,
            content: &self.content,
            images: &self.images,
            articles: &self.articles,
            pacer: &self.pacer,
        }
    }

    pub fn allow_pauses(&mut self) {
        self.pacer.expect_pause().returning(|_| ());
    }

    /// Lookup, exchange and save all succeed for `account_id`.
    /// The refresh token on file is `refresh-<id>`, the new access token `access-<id>`.
    pub fn healthy_session(&mut self, account_id: &'static str, stored_type: &'static str) {
        self.accounts
            .expect_fetch_account()
            .withf(move |id: &str| id == account_id)
            .returning(move |_| Ok(lookup(stored_type, &format!("refresh-{account_id}"))));
        let refresh = format!("refresh-{account_id}");
        self.tokens
            .expect_refresh()
            .withf(move |token: &str| token == refresh)
            .returning(move |_| {
                Ok(TokenResponse {
                    access_token: Some(format!("access-{account_id}")),
                    ..Default::default()
                })
            });
        self.accounts
            .expect_save_token()
            .withf(move |req| req.id == account_id)
            .returning(|_| {
                Ok(SaveTokenResponse {
                    success: true,
                    error: None,
                })
            });
    }
}

pub fn lookup(stored_type: &str, refresh_token: &str) -> AccountLookup {
    AccountLookup {
        success: true,
        data: Some(AccountRecord {
            account_type: Some(stored_type.to_string()),
            refresh_token: Some(refresh_token.to_string()),
        }),
    }
}

pub fn instruments(codes: &[&str]) -> Vec<Instrument> {
    codes
        .iter()
        .map(|code| Instrument::new(*code, format!("{code} Corp")))
        .collect()
}

pub fn content_for(code: &str) -> ContentResponse {
    ContentResponse {
        subject: Some(format!("{code} daily outlook")),
        content: Some(format!("<p>{code} closed higher.<br>Volume rose.</p>")),
        images: Vec::new(),
    }
}

pub fn boards() -> BoardRouting {
    BoardRouting {
        club_id: Some(31632186),
        domestic: Some(5),
        world: Some(6),
        crypto_top_tier: Some(29),
        crypto_alt: Some(30),
    }
}

pub fn config(accounts: Vec<AccountConfig>) -> PublishConfig {
    PublishConfig::new(accounts, boards())
}
