mod common;

use cafe_poster_core::config::AccountConfig;
use cafe_poster_core::contract::{Board, ContentResponse, CredentialPair, InstrumentType};
use cafe_poster_core::group::GroupProcessor;
use cafe_poster_core::pacing::Pause;
use cafe_poster_core::publish::ItemPublisher;
use cafe_poster_core::report::ItemStatus;
use common::{config, content_for, instruments, Mocks};
use mockall::predicate::eq;
use serde_json::json;

const BOARD: Board = Board {
    club_id: 31632186,
    menu_id: 6,
};

fn credentials() -> CredentialPair {
    CredentialPair {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
    }
}

#[tokio::test]
async fn one_failed_item_out_of_three() {
    let mut mocks = Mocks::new();
    mocks.content.expect_generate().returning(|code, _| {
        if code == "B" {
            Ok(ContentResponse {
                subject: None,
                ..content_for(code)
            })
        } else {
            Ok(content_for(code))
        }
    });
    mocks
        .articles
        .expect_post_article()
        .times(2)
        .returning(|_, _, _| Ok(json!({"ok": true})));
    mocks
        .pacer
        .expect_pause()
        .with(eq(Pause::BetweenItems))
        .times(2)
        .returning(|_| ());

    let cfg = config(vec![AccountConfig::new("alpha")]);
    let services = mocks.services();
    let processor = GroupProcessor::new(ItemPublisher::new(&services, &cfg), services.pacer);

    let group = processor
        .process(
            &instruments(&["A", "B", "C"]),
            InstrumentType::World,
            "World stocks",
            Some(BOARD),
            &credentials(),
        )
        .await;

    assert_eq!(group.total, 3);
    assert_eq!(group.success_count, 2);
    assert_eq!(group.fail_count, 1);
    assert_eq!(group.success_count + group.fail_count, group.total);
    let codes: Vec<&str> = group.items.iter().map(|i| i.instrument_code.as_str()).collect();
    assert_eq!(codes, ["A", "B", "C"]);
    assert_eq!(group.items[0].status, ItemStatus::Published);
    assert_eq!(group.items[1].status, ItemStatus::Failed);
    assert!(group.items[1].error.is_some());
    assert_eq!(group.items[2].status, ItemStatus::Published);
    assert!(group.error.is_none());
}

#[tokio::test]
async fn submission_failure_does_not_affect_other_items() {
    let mut mocks = Mocks::new();
    mocks
        .content
        .expect_generate()
        .returning(|code, _| Ok(content_for(code)));
    mocks
        .articles
        .expect_post_article()
        .times(4)
        .returning(|_, _, article| {
            if article.subject.starts_with("MSFT") {
                Err("500 Internal Server Error".into())
            } else {
                Ok(json!({"ok": true}))
            }
        });
    mocks.allow_pauses();

    let cfg = config(vec![AccountConfig::new("alpha")]);
    let services = mocks.services();
    let processor = GroupProcessor::new(ItemPublisher::new(&services, &cfg), services.pacer);

    let group = processor
        .process(
            &instruments(&["AAPL", "MSFT", "NVDA", "TSLA"]),
            InstrumentType::World,
            "World stocks",
            Some(BOARD),
            &credentials(),
        )
        .await;

    assert_eq!((group.total, group.success_count, group.fail_count), (4, 3, 1));
    assert!(group
        .items
        .iter()
        .filter(|i| i.instrument_code != "MSFT")
        .all(|i| i.status == ItemStatus::Published));
}

#[tokio::test]
async fn pause_follows_every_item_but_the_last() {
    let mut mocks = Mocks::new();
    mocks
        .content
        .expect_generate()
        .returning(|code, _| Ok(content_for(code)));
    mocks
        .articles
        .expect_post_article()
        .returning(|_, _, _| Ok(json!({})));
    mocks.pacer.expect_pause().never();

    let cfg = config(vec![AccountConfig::new("alpha")]);
    let services = mocks.services();
    let processor = GroupProcessor::new(ItemPublisher::new(&services, &cfg), services.pacer);

    let single = processor
        .process(
            &instruments(&["ONLY"]),
            InstrumentType::World,
            "World stocks",
            Some(BOARD),
            &credentials(),
        )
        .await;
    assert_eq!(single.total, 1);

    let empty = processor
        .process(&[], InstrumentType::World, "World stocks", Some(BOARD), &credentials())
        .await;
    assert_eq!((empty.total, empty.success_count, empty.fail_count), (0, 0, 0));
    assert!(empty.items.is_empty());
}

#[tokio::test]
async fn group_without_board_skips_every_item() {
    let mut mocks = Mocks::new();
    mocks
        .content
        .expect_generate()
        .returning(|code, _| Ok(content_for(code)));
    mocks.articles.expect_post_article().never();
    mocks.allow_pauses();

    let cfg = config(vec![AccountConfig::new("alpha")]);
    let services = mocks.services();
    let processor = GroupProcessor::new(ItemPublisher::new(&services, &cfg), services.pacer);

    let group = processor
        .process(
            &instruments(&["KRW-BTC", "KRW-ETH"]),
            InstrumentType::Crypto,
            "Crypto (top tier)",
            None,
            &credentials(),
        )
        .await;

    assert_eq!(group.success_count, 2);
    assert_eq!(group.skipped_count, 2);
    assert_eq!(group.fail_count, 0);
    assert!(group.items.iter().all(|i| i.status == ItemStatus::Skipped));
}
