use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::NamedTempFile;

/// Config with a production board layout but no test board.
fn create_config_without_test_board() -> NamedTempFile {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    write(
        config.path(),
        b"backend:\n  base_url: http://127.0.0.1:9\ncafe:\n  club_id: 31632186\n  boards:\n    domestic: 5\naccounts:\n  - id: sdfddf\n    types: [domestic]\n",
    )
    .expect("Writing temp config failed");
    config
}

#[test]
fn publish_help_lists_type_filters() {
    let mut cmd = Command::cargo_bin("cafe-poster").expect("Binary exists");
    cmd.args(["publish", "--help"]);
    cmd.assert().success().stdout(
        predicate::str::contains("--domestic")
            .and(predicate::str::contains("--world"))
            .and(predicate::str::contains("--crypto"))
            .and(predicate::str::contains("--test")),
    );
}

#[test]
fn missing_config_file_fails() {
    let mut cmd = Command::cargo_bin("cafe-poster").expect("Binary exists");
    cmd.args(["publish", "--config", "does-not-exist.yaml"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_mode_without_test_board_fails_before_any_request() {
    let config = create_config_without_test_board();
    let mut cmd = Command::cargo_bin("cafe-poster").expect("Binary exists");
    cmd.arg("publish")
        .arg("--config")
        .arg(config.path())
        .arg("--test")
        .env_remove("PFLOW_BASE_URL");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cafe.test is not configured"));
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        use std::fmt::Write as FmtWrite;
        let mut msg = String::new();
        let _ = write!(&mut msg, "{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use cafe_poster::cli::{run, Cli, Commands, PublishArgs};

    // A dummy path: the run fails at config loading, after the initial event.
    let cli = Cli {
        command: Commands::Publish(PublishArgs {
            config: std::path::PathBuf::from("dummy.yaml"),
            ..PublishArgs::default()
        }),
    };

    let result = run(cli).await;
    assert!(result.is_err());

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}

#[test]
fn flags_combine_into_a_type_filter() {
    use cafe_poster::cli::PublishArgs;

    let none = PublishArgs::default().run_options();
    assert!(none.type_filter.is_none());
    assert!(!none.test_mode);

    let args = PublishArgs {
        domestic: true,
        crypto: true,
        test: true,
        ..PublishArgs::default()
    };
    let options = args.run_options();
    assert!(options.test_mode);
    let filter = options.type_filter.expect("filter selected");
    assert!(filter.allows("domestic"));
    assert!(filter.allows("crypto"));
    assert!(!filter.allows("world"));
}
