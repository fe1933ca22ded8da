mod common;

use common::{catalog, FakeGateway, FakeEvents, SharedFragment};
use fluster_app_core::{AppCommand, ChannelNotifier, FlusterApp, OperationError};

type TestApp = FlusterApp<FakeGateway, FakeEvents, SharedFragment, ChannelNotifier>;

fn app(gateway: &FakeGateway, ids: &[&str]) -> (TestApp, tokio::sync::mpsc::Receiver<fluster_app_core::Notification>) {
    let (notifier, rx) = ChannelNotifier::channel(16);
    let app = FlusterApp::with_catalog(
        gateway.clone(),
        FakeEvents::default(),
        SharedFragment::default(),
        notifier,
        catalog(ids),
    );
    (app, rx)
}

#[tokio::test]
async fn refresh_places_every_version_in_exactly_one_partition() {
    let gateway = FakeGateway::new().with_installed("b");
    let (app, _rx) = app(&gateway, &["a", "b", "c"]);

    app.dispatch(AppCommand::Refresh).await.unwrap();

    let parts = app.versions().partitions();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts.installed.len(), 1);
    assert_eq!(parts.available.len(), 2);
    assert!(parts.installing.is_empty());
    for id in ["a", "b", "c"] {
        assert_eq!(parts.occurrences(id), 1, "{id}");
    }
}

#[tokio::test]
async fn size_failure_aborts_refresh_and_keeps_previous_versions() {
    let gateway = FakeGateway::new();
    let (app, mut rx) = app(&gateway, &["a", "b"]);
    app.dispatch(AppCommand::Refresh).await.unwrap();

    gateway.fail("get_version_size", 1);
    let err = app.dispatch(AppCommand::Refresh).await.unwrap_err();
    assert!(matches!(err, OperationError::Gateway(_)));
    assert_eq!(app.versions().versions().len(), 2);

    let notice = rx.recv().await.unwrap();
    assert_eq!(notice.title, "Failed to refresh versions.");
    assert_eq!(notice.retry, None);
}

#[tokio::test]
async fn stats_failure_leaves_that_entry_without_stats() {
    let gateway = FakeGateway::new()
        .with_installed("a")
        .with_stats("a", r#"{"total_play_time":3600,"last_played":10,"is_running":true,"size_bytes":2048}"#);
    let (app, _rx) = app(&gateway, &["a", "b"]);
    gateway.fail("get_version_stats", 1);

    app.dispatch(AppCommand::Refresh).await.unwrap();

    let versions = app.versions().versions();
    // Stats are fetched in catalog order, so "a" takes the scripted failure.
    assert_eq!(versions[0].stats, None);
    assert!(versions[1].stats.is_some());
}

#[tokio::test]
async fn concurrent_installs_are_serialized() {
    let gateway = FakeGateway::new();
    let (app, _rx) = app(&gateway, &["a", "b"]);
    app.dispatch(AppCommand::Refresh).await.unwrap();

    let (first, second) = tokio::join!(app.versions().install("a"), app.versions().install("b"));

    assert!(first.is_ok());
    assert!(matches!(second, Err(OperationError::InstallInProgress)));
    assert_eq!(gateway.calls_to("install_client"), vec!["a"]);
    assert!(!app.versions().is_installing());

    let parts = app.versions().partitions();
    assert_eq!(parts.installed.len(), 1);
    assert_eq!(parts.installed[0].id, "a");
}

#[tokio::test]
async fn slot_is_held_while_install_runs() {
    let gateway = FakeGateway::new();
    let (app, _rx) = app(&gateway, &["a"]);
    app.dispatch(AppCommand::Refresh).await.unwrap();

    let observe = async {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let parts = app.versions().partitions();
        (app.versions().is_installing(), parts.installing.len())
    };
    let (result, (installing, bucket)) = tokio::join!(app.versions().install("a"), observe);

    result.unwrap();
    assert!(installing);
    assert_eq!(bucket, 1);
}

#[tokio::test]
async fn failed_install_releases_slot_and_retry_runs_same_install() {
    let gateway = FakeGateway::new();
    let (app, mut rx) = app(&gateway, &["x"]);
    app.dispatch(AppCommand::Refresh).await.unwrap();
    gateway.fail("install_client", 1);

    let err = app.dispatch(AppCommand::Install("x".into())).await.unwrap_err();
    assert!(!err.is_domain());
    assert!(!app.versions().is_installing());
    assert!(!app.state().version("x").unwrap().installing);

    let notice = rx.recv().await.unwrap();
    assert_eq!(notice.title, "Something went wrong while installing x");
    assert_eq!(notice.duration.as_millis(), 3000);

    app.retry(&notice).await.unwrap().unwrap();
    assert_eq!(gateway.calls_to("install_client"), vec!["x", "x"]);
    assert!(app.state().version("x").unwrap().installed);
}

#[tokio::test]
async fn install_that_does_not_land_is_a_domain_error() {
    let gateway = FakeGateway::new();
    let (app, _rx) = app(&gateway, &["a"]);
    app.dispatch(AppCommand::Refresh).await.unwrap();
    gateway.install_lands(false);

    let err = app.versions().install("a").await.unwrap_err();
    assert!(matches!(err, OperationError::NotInstalledAfterInstall { ref id } if id == "a"));
    assert!(err.is_domain());

    let v = app.state().version("a").cloned().unwrap();
    assert!(!v.installed);
    assert!(!v.installing);
}

#[tokio::test]
async fn install_survives_a_failed_follow_up_refresh() {
    let gateway = FakeGateway::new();
    let (app, _rx) = app(&gateway, &["a"]);
    app.dispatch(AppCommand::Refresh).await.unwrap();
    gateway.fail("get_version_size", 1);

    app.versions().install("a").await.unwrap();

    let v = app.state().version("a").cloned().unwrap();
    assert!(v.installed);
    assert!(!v.installing);
}

#[tokio::test]
async fn uninstall_flips_only_installed() {
    let gateway = FakeGateway::new()
        .with_installed("a")
        .with_stats("a", r#"{"total_play_time":7200,"last_played":100,"is_running":false,"size_bytes":4096}"#);
    let (app, _rx) = app(&gateway, &["a"]);
    app.dispatch(AppCommand::Refresh).await.unwrap();
    let before = app.state().version("a").cloned().unwrap();
    let calls_before = gateway.calls().len();

    app.dispatch(AppCommand::Uninstall("a".into())).await.unwrap();

    let after = app.state().version("a").cloned().unwrap();
    assert!(!after.installed);
    assert_eq!(after.stats, before.stats);
    assert_eq!(after.size, before.size);
    // No refetch after uninstall.
    assert_eq!(gateway.calls().len(), calls_before + 1);
}

#[tokio::test]
async fn rejected_launch_notifies_with_generic_title() {
    let gateway = FakeGateway::new().with_installed("a");
    let (app, mut rx) = app(&gateway, &["a"]);
    gateway.launch_accepted(false);

    let err = app.dispatch(AppCommand::Launch("a".into())).await.unwrap_err();
    assert!(matches!(err, OperationError::LaunchRejected { .. }));

    let notice = rx.recv().await.unwrap();
    assert_eq!(notice.title, "An error occurred");
    assert_eq!(notice.duration.as_millis(), 5000);
    assert_eq!(notice.retry, Some(AppCommand::Launch("a".into())));
}

#[tokio::test]
async fn initial_load_reads_username_and_ends_loading() {
    let gateway = FakeGateway::new();
    let (app, _rx) = app(&gateway, &["a"]);
    assert!(app.state().is_loading);

    app.load_initial_state().await;

    let state = app.state();
    assert!(!state.is_loading);
    assert_eq!(state.username, "builderman");
    assert_eq!(state.versions.len(), 1);
}

#[tokio::test]
async fn failed_uninstall_keeps_state_and_offers_retry() {
    let gateway = FakeGateway::new().with_installed("a");
    let (app, mut rx) = app(&gateway, &["a"]);
    app.dispatch(AppCommand::Refresh).await.unwrap();
    gateway.fail("uninstall_client", 1);

    app.dispatch(AppCommand::Uninstall("a".into())).await.unwrap_err();
    assert!(app.state().version("a").unwrap().installed);

    let notice = rx.recv().await.unwrap();
    assert_eq!(notice.title, "Something went wrong while uninstalling a");
    assert_eq!(notice.duration.as_millis(), 3000);
    assert_eq!(notice.retry, Some(AppCommand::Uninstall("a".into())));

    app.retry(&notice).await.unwrap().unwrap();
    assert!(!app.state().version("a").unwrap().installed);
}
