//! Dispatch tests against the in-memory backing client
//!
//! These go through the registry and type-erased descriptors the same way
//! the CLI does.

use netctl::api::{BgpConfiguration, BgpPeer, Kind, ResourceObject};
use netctl::client::MemoryClient;
use netctl::context::Context;
use netctl::error::{ClientError, Error, Operation};
use netctl::resource::{parse_documents, ColumnSet, Registry};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

fn peer(name: &str) -> ResourceObject {
    BgpPeer::new(name, "192.0.2.1", 64512).into_object()
}

#[tokio::test]
async fn test_type_mismatch_never_reaches_client() {
    let registry = Registry::with_defaults();
    let client = MemoryClient::new();
    let ctx = Context::new();
    let configs = registry.lookup("bgpconfig").unwrap();

    for result in [
        configs.create(&ctx, &client, peer("p")).await,
        configs.update(&ctx, &client, peer("p")).await,
        configs.delete(&ctx, &client, peer("p")).await,
        configs.get(&ctx, &client, peer("p")).await,
    ] {
        let err = assert_err!(result);
        assert!(matches!(
            err,
            Error::TypeMismatch {
                expected: "BGPConfiguration",
                actual: "BGPPeer"
            }
        ));
        assert!(err.is_fatal());
    }

    let err = assert_err!(configs.list(&ctx, &client, peer("p")).await);
    assert!(err.is_fatal());

    let err = assert_err!(configs.row(ColumnSet::Default, &peer("p")));
    assert!(matches!(err, Error::TypeMismatch { .. }));

    assert_eq!(client.request_count(), 0);
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let registry = Registry::with_defaults();
    let client = MemoryClient::new();
    let peers = registry.lookup("bgppeer").unwrap();

    let err = assert_err!(
        peers
            .get(&Context::new(), &client, peers.new_object("nope", None))
            .await
    );

    assert!(err.is_not_found());
    assert!(matches!(
        err,
        Error::NotFound {
            operation: Operation::Get,
            kind: "BGPPeer",
            ..
        }
    ));
    assert_eq!(err.client_error(), Some(&ClientError::not_found("BGPPeer", "nope")));
}

#[tokio::test]
async fn test_list_empty_kind() {
    let registry = Registry::with_defaults();
    let client = MemoryClient::new();
    let configs = registry.lookup("bgpconfigs").unwrap();

    let list = assert_ok!(
        configs
            .list(&Context::new(), &client, configs.new_object("", None))
            .await
    );

    assert!(list.is_empty());
    assert_eq!(list.kind, "BGPConfigurationList");
}

#[tokio::test]
async fn test_update_requires_current_version() {
    let registry = Registry::with_defaults();
    let client = MemoryClient::new();
    let ctx = Context::new();
    let peers = registry.lookup("bp").unwrap();

    let created = assert_ok!(peers.create(&ctx, &client, peer("tor")).await);
    let first = created.metadata().resource_version.clone().unwrap();
    let uid = created.metadata().uid.clone();

    // Someone else updates first
    let updated = assert_ok!(peers.update(&ctx, &client, created.clone()).await);
    let second = updated.metadata().resource_version.clone().unwrap();
    assert_ne!(first, second);

    // The original copy is now stale
    let err = assert_err!(peers.update(&ctx, &client, created).await);
    assert!(err.is_conflict());

    // Updating from the current copy succeeds with a fresh version
    let again = assert_ok!(peers.update(&ctx, &client, updated).await);
    let third = again.metadata().resource_version.clone().unwrap();
    assert_ne!(second, third);
    assert_eq!(again.metadata().uid, uid);
}

#[tokio::test]
async fn test_pinned_versions() {
    let registry = Registry::with_defaults();
    let client = MemoryClient::new();
    let ctx = Context::new();
    let peers = registry.lookup("bgppeer").unwrap();

    let created = assert_ok!(peers.create(&ctx, &client, peer("tor")).await);

    let mut stale = created.clone();
    stale.metadata_mut().resource_version = Some("999".to_string());

    let err = assert_err!(peers.get(&ctx, &client, stale.clone()).await);
    assert!(err.is_not_found());

    let err = assert_err!(peers.delete(&ctx, &client, stale).await);
    assert!(err.is_conflict());

    // Exact version gets and deletes
    assert_ok!(peers.get(&ctx, &client, created.clone()).await);
    let deleted = assert_ok!(peers.delete(&ctx, &client, created).await);
    assert_eq!(deleted.name(), "tor");
}

#[tokio::test]
async fn test_list_filters_by_name() {
    let registry = Registry::with_defaults();
    let client = MemoryClient::new();
    let ctx = Context::new();
    let peers = registry.lookup("bgppeer").unwrap();

    for name in ["c", "a", "b"] {
        assert_ok!(peers.create(&ctx, &client, peer(name)).await);
    }

    let all = assert_ok!(peers.list(&ctx, &client, peers.new_object("", None)).await);
    let names: Vec<_> = all.items.iter().map(ResourceObject::name).collect();
    assert_eq!(names, ["a", "b", "c"]);
    assert_eq!(all.metadata.resource_version.as_deref(), Some("3"));

    let one = assert_ok!(peers.list(&ctx, &client, peers.new_object("b", None)).await);
    assert_eq!(one.len(), 1);
}

#[tokio::test]
async fn test_cancelled_context_does_not_wait() {
    let registry = Registry::with_defaults();
    let client = MemoryClient::new().with_latency(Duration::from_secs(30));
    let configs = registry.lookup("bgpconfig").unwrap();

    let ctx = Context::new();
    ctx.cancel();

    let started = std::time::Instant::now();
    let err = assert_err!(
        configs
            .get(&ctx, &client, configs.new_object("default", None))
            .await
    );

    assert!(matches!(
        err,
        Error::Cancelled {
            operation: Operation::Get,
            kind: "BGPConfiguration"
        }
    ));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_cancel_while_in_flight() {
    let registry = Registry::with_defaults();
    let client = MemoryClient::new().with_latency(Duration::from_secs(30));
    let configs = registry.lookup("bgpconfig").unwrap();
    let ctx = Context::new();

    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let err = assert_err!(
        configs
            .create(&ctx, &client, BgpConfiguration::new("default").into_object())
            .await
    );
    assert!(matches!(err, Error::Cancelled { operation: Operation::Create, .. }));
    assert_eq!(client.request_count(), 1);
}

#[tokio::test]
async fn test_deadline_exceeded() {
    let registry = Registry::with_defaults();
    let client = MemoryClient::new().with_latency(Duration::from_secs(30));
    let peers = registry.lookup("bgppeer").unwrap();

    let ctx = Context::new().with_timeout(Duration::from_millis(20));
    let err = assert_err!(peers.list(&ctx, &client, peers.new_object("", None)).await);

    assert!(matches!(
        err,
        Error::DeadlineExceeded {
            operation: Operation::List,
            kind: "BGPPeer"
        }
    ));
}

#[tokio::test]
async fn test_documents_round_through_aliases() {
    let registry = Registry::with_defaults();
    let client = MemoryClient::new();
    let ctx = Context::new();

    let text = "
kind: BGPConfig
metadata: {name: default}
spec: {logSeverityScreen: Info, asNumber: 64512}
---
kind: BPS
metadata: {name: rack1-tor}
spec: {peerIP: 192.0.2.1, asNumber: 64513, node: rack1-host1}
";

    for object in parse_documents(&registry, text).unwrap() {
        let descriptor = registry.lookup(object.kind()).unwrap();
        assert_ok!(descriptor.create(&ctx, &client, object).await);
    }

    let peers = registry.lookup("bgppeers").unwrap();
    let list = assert_ok!(peers.list(&ctx, &client, peers.new_object("", None)).await);
    let row = peers.row(ColumnSet::Default, &list.items[0]).unwrap();
    assert_eq!(row, ["rack1-tor", "192.0.2.1", "rack1-host1", "64513"]);

    let configs = registry.lookup("bgpconfiguration").unwrap();
    let config = assert_ok!(
        configs
            .get(&ctx, &client, configs.new_object("default", None))
            .await
    );
    let row = configs.row(ColumnSet::Default, &config).unwrap();
    assert_eq!(row, ["default", "Info", "-", "64512"]);
}
