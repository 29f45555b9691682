mod common;

use common::ScriptedRuntime;
use image_migrator::cli::runner::{RunStatus, execute};
use image_migrator::cli::MigratorConfig;
use image_migrator::registry::{TOKEN_VAR, USERNAME_VAR};
use image_migrator::{Catalog, OutputManager, SetupError};

const CATALOG: &str = "\
# mirror
docker.io/library/alpine:3.20 registry.example.com/mirror/alpine:3.20
docker.io/library/redis:7.2 registry.example.com/mirror/redis:7.2
";

const TOKEN: &str = "glpat-not-a-real-token";

fn config() -> MigratorConfig {
    MigratorConfig {
        retry_delay: 0,
        pacing_delay: 0,
        ..MigratorConfig::default()
    }
}

fn credentials(key: &str) -> Option<String> {
    match key {
        USERNAME_VAR => Some("mirror-bot".to_string()),
        TOKEN_VAR => Some(TOKEN.to_string()),
        _ => None,
    }
}

async fn run(
    runtime: &ScriptedRuntime,
    catalog: &str,
    interactive: Option<&[u8]>,
) -> image_migrator::Result<RunStatus> {
    execute(
        &config(),
        Catalog::parse(catalog).unwrap(),
        credentials,
        runtime,
        interactive,
        &OutputManager::new_quiet(),
    )
    .await
}

#[tokio::test]
async fn session_wraps_the_whole_batch() {
    let runtime = ScriptedRuntime::new();
    let status = run(&runtime, CATALOG, None).await.unwrap();

    let calls = runtime.calls();
    assert_eq!(calls.first().map(String::as_str), Some("version"));
    assert_eq!(calls[1], "login registry.example.com mirror-bot");
    assert_eq!(calls.last().map(String::as_str), Some("logout registry.example.com"));

    match status {
        RunStatus::Completed(summary) => {
            assert_eq!(summary.total_count, 2);
            assert_eq!(summary.success_count, 2);
        }
        other => panic!("unexpected status: {other:?}"),
    }
}

#[tokio::test]
async fn token_only_reaches_the_login_call() {
    let runtime = ScriptedRuntime::new();
    run(&runtime, CATALOG, None).await.unwrap();

    assert_eq!(runtime.tokens_received(), [TOKEN]);
    assert!(runtime.calls().iter().all(|call| !call.contains(TOKEN)));
}

#[tokio::test]
async fn logout_happens_even_when_images_fail() {
    let runtime = ScriptedRuntime::new()
        .failing_pulls("docker.io/library/alpine:3.20", 3)
        .failing_push("registry.example.com/mirror/redis:7.2");

    let status = run(&runtime, CATALOG, None).await.unwrap();

    assert_eq!(status.exit_code(), 0);
    match status {
        RunStatus::Completed(summary) => {
            assert_eq!(summary.success_count, 0);
            assert_eq!(summary.failure_count(), 2);
        }
        other => panic!("unexpected status: {other:?}"),
    }
    assert_eq!(
        runtime.calls().last().map(String::as_str),
        Some("logout registry.example.com")
    );
}

#[tokio::test]
async fn unavailable_runtime_stops_before_login() {
    let runtime = ScriptedRuntime::new().unavailable();
    let err = run(&runtime, CATALOG, None).await.unwrap_err();

    assert!(matches!(err, SetupError::RuntimeUnavailable { .. }));
    assert_eq!(runtime.calls(), ["version"]);
}

#[tokio::test]
async fn rejected_login_migrates_nothing() {
    let runtime = ScriptedRuntime::new().failing_login();
    let err = run(&runtime, CATALOG, None).await.unwrap_err();

    assert!(matches!(err, SetupError::Authentication(_)));
    assert!(runtime.calls_starting_with("pull").is_empty());
    assert!(runtime.calls_starting_with("logout").is_empty());
}

#[tokio::test]
async fn immediate_sentinel_adds_no_migrations() {
    let runtime = ScriptedRuntime::new();
    let status = run(&runtime, CATALOG, Some(b"done\n")).await.unwrap();

    match status {
        RunStatus::Completed(summary) => assert_eq!(summary.total_count, 2),
        other => panic!("unexpected status: {other:?}"),
    }
    assert_eq!(runtime.calls_starting_with("pull").len(), 2);
}

#[tokio::test]
async fn interactive_pairs_run_after_the_static_catalog() {
    let runtime = ScriptedRuntime::new();
    let input: &[u8] = b"ghcr.io/org/tool:1.0 registry.example.com/mirror/tool:1.0\ndone\n";
    let status = run(&runtime, CATALOG, Some(input)).await.unwrap();

    match status {
        RunStatus::Completed(summary) => assert_eq!(summary.total_count, 3),
        other => panic!("unexpected status: {other:?}"),
    }
    assert_eq!(
        runtime.calls_starting_with("pull"),
        [
            "pull docker.io/library/alpine:3.20",
            "pull docker.io/library/redis:7.2",
            "pull ghcr.io/org/tool:1.0",
        ]
    );
}

#[tokio::test]
async fn empty_catalog_skips_login() {
    let runtime = ScriptedRuntime::new();
    let status = run(&runtime, "# nothing yet\n", Some(b"done\n")).await.unwrap();

    assert_eq!(status, RunStatus::Completed(Default::default()));
    assert_eq!(runtime.calls(), ["version"]);
}

#[tokio::test]
async fn missing_token_fails_before_the_runtime_is_touched() {
    let runtime = ScriptedRuntime::new();
    let err = execute(
        &config(),
        Catalog::parse(CATALOG).unwrap(),
        |key: &str| (key == USERNAME_VAR).then(|| "mirror-bot".to_string()),
        &runtime,
        Some(&b"ghcr.io/org/tool:1.0 registry.example.com/mirror/tool:1.0\n"[..]),
        &OutputManager::new_quiet(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SetupError::MissingCredential(TOKEN_VAR)));
    assert!(runtime.calls().is_empty());
}

#[tokio::test]
async fn missing_username_fails_before_the_runtime_is_touched() {
    let runtime = ScriptedRuntime::new().unavailable();
    let err = execute(
        &config(),
        Catalog::parse(CATALOG).unwrap(),
        |_: &str| None,
        &runtime,
        None::<&[u8]>,
        &OutputManager::new_quiet(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SetupError::MissingCredential(USERNAME_VAR)));
    assert!(runtime.calls().is_empty());
}
