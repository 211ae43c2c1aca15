//! Tests for the partition runtime.

mod common;

use bytes::Bytes;
use partkv::core::error::PartkvError;
use partkv::partition::channel::{Channel, Subscriber};
use partkv::partition::command::{Command, Reply, Request};
use partkv::partition::dispatcher::PartitionState;
use partkv::partition::handoff::HandoffEntry;
use partkv::partition::registry::ChannelRegistry;
use partkv::partition::store::KvStore;
use partkv::partition::table::PartitionTable;
use partkv::partition::tracker::SubscriberTracker;
use partkv::partition::{PartitionConfig, SubscriberId};
use std::time::Duration;

fn b(s: &'static str) -> Bytes {
    Bytes::from_static(s.as_bytes())
}

fn sync_exec(
    state: &mut PartitionState,
    request: Request,
    subscriber: &Subscriber,
) -> Result<Reply, PartkvError> {
    state.execute(Command::parse(request)?, subscriber)
}

// ============================================================================
// Key-Value Store Tests
// ============================================================================

#[test]
fn store_get_after_put() {
    let mut store = KvStore::new();
    store.put(b("k"), b("v1"));
    assert_eq!(store.get(b"k"), Some(&b("v1")));

    store.put(b("k"), b("v2"));
    assert_eq!(store.get(b"k"), Some(&b("v2")));

    store.delete(b"k");
    assert_eq!(store.get(b"k"), None);
}

#[test]
fn store_delete_absent_leaves_store_unchanged() {
    let mut store = KvStore::new();
    store.put(b("a"), b("1"));

    assert_eq!(store.delete(b"missing"), 0);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(b"a"), Some(&b("1")));
}

#[test]
fn store_binary_keys() {
    let mut store = KvStore::new();
    let key = Bytes::from(vec![0u8, 255, 10]);
    store.put(key.clone(), Bytes::from(vec![1u8, 2, 3]));
    assert_eq!(store.get(&key), Some(&Bytes::from(vec![1u8, 2, 3])));
}

// ============================================================================
// Channel & Registry Tests
// ============================================================================

#[test]
fn registry_lookup_before_subscribe() {
    let mut registry = ChannelRegistry::new();
    assert!(registry.get_existing(b"t").is_none());

    let (p, _inbox) = Subscriber::new();
    registry.get_or_create(&b("t")).subscribe(&p);
    assert_eq!(registry.get_existing(b"t").unwrap().subscriber_count(), 1);
}

#[test]
fn channel_unsubscribe_absent_is_noop() {
    let mut channel = Channel::new(b("t"));
    let (p, _inbox) = Subscriber::new();
    assert!(!channel.unsubscribe(p.id()));
    assert_eq!(channel.subscriber_count(), 0);
    assert_eq!(channel.topic(), &b("t"));
}

#[test]
fn tracker_remove_is_proportional_to_own_topics() {
    let mut tracker = SubscriberTracker::new();
    let p = SubscriberId(1);
    let c = SubscriberId(2);
    tracker.track(p, b("a"));
    tracker.track(p, b("b"));
    tracker.track(c, b("a"));

    let topics = tracker.remove(p).unwrap();
    assert_eq!(topics.len(), 2);
    assert!(tracker.is_tracked(c));
    assert_eq!(tracker.len(), 1);
}

// ============================================================================
// Dispatcher Tests (synchronous state)
// ============================================================================

#[test]
fn dispatcher_kv_scenario() {
    let mut state = PartitionState::new(0);
    let (p, _inbox) = Subscriber::new();

    assert_eq!(sync_exec(&mut state, Request::set("k1", "x"), &p).unwrap(), Reply::Ok);
    assert_eq!(
        sync_exec(&mut state, Request::get("k1"), &p).unwrap(),
        Reply::Value(Some(b("x")))
    );
    assert_eq!(sync_exec(&mut state, Request::del("k1"), &p).unwrap(), Reply::Deleted(1));
    assert_eq!(
        sync_exec(&mut state, Request::get("k1"), &p).unwrap(),
        Reply::Value(None)
    );
    assert_eq!(sync_exec(&mut state, Request::del("k1"), &p).unwrap(), Reply::Deleted(0));
}

#[test]
fn dispatcher_unsubscribe_unknown_topic() {
    let mut state = PartitionState::new(0);
    let (p, _inbox) = Subscriber::new();

    let err = sync_exec(&mut state, Request::unsubscribe("never"), &p).unwrap_err();
    assert_eq!(err, PartkvError::not_subscribed("never"));
    assert!(state.is_empty());
}

#[test]
fn dispatcher_unsubscribe_twice_is_safe() {
    let mut state = PartitionState::new(0);
    let (p, _inbox) = Subscriber::new();
    sync_exec(&mut state, Request::subscribe("t"), &p).unwrap();

    assert_eq!(sync_exec(&mut state, Request::unsubscribe("t"), &p).unwrap(), Reply::Ok);
    assert_eq!(sync_exec(&mut state, Request::unsubscribe("t"), &p).unwrap(), Reply::Ok);
    assert_eq!(state.subscriber_count(b"t"), Some(0));
}

#[test]
fn dispatcher_unsubscribe_non_member_is_ok() {
    let mut state = PartitionState::new(0);
    let (p, _ip) = Subscriber::new();
    let (q, _iq) = Subscriber::new();
    sync_exec(&mut state, Request::subscribe("t"), &p).unwrap();

    assert_eq!(sync_exec(&mut state, Request::unsubscribe("t"), &q).unwrap(), Reply::Ok);
    assert_eq!(state.subscriber_count(b"t"), Some(1));
}

#[test]
fn dispatcher_publish_unknown_topic_creates_nothing() {
    let mut state = PartitionState::new(0);
    let (p, _inbox) = Subscriber::new();

    assert_eq!(
        sync_exec(&mut state, Request::publish("t", "m"), &p).unwrap(),
        Reply::Published(0)
    );
    assert_eq!(state.subscriber_count(b"t"), None);
    assert!(state.is_empty());
}

#[test]
fn dispatcher_crash_cleanup() {
    let mut state = PartitionState::new(0);
    let (p, _ip) = Subscriber::new();
    let (c, _ic) = Subscriber::new();
    sync_exec(&mut state, Request::subscribe("A"), &p).unwrap();
    sync_exec(&mut state, Request::subscribe("B"), &p).unwrap();
    sync_exec(&mut state, Request::subscribe("A"), &c).unwrap();

    assert_eq!(state.handle_down(p.id()), 2);

    assert_eq!(state.subscriber_count(b"A"), Some(1));
    assert_eq!(state.subscriber_count(b"B"), Some(0));
    assert!(state.is_tracked(c.id()));
    assert!(!state.is_tracked(p.id()));
}

#[test]
fn dispatcher_unknown_command() {
    let mut state = PartitionState::new(0);
    let (p, _inbox) = Subscriber::new();

    let err = sync_exec(&mut state, Request::new("FLUSHALL", [b("now")]), &p).unwrap_err();
    assert_eq!(
        err,
        PartkvError::UnknownCommand {
            command: "FLUSHALL".to_string(),
            args: vec![b("now")],
        }
    );
}

// ============================================================================
// Partition Task Tests
// ============================================================================

#[tokio::test]
async fn partition_kv_end_to_end() {
    let handle = common::start_partition(0);
    let (p, _inbox) = Subscriber::new();

    assert_eq!(handle.dispatch(Request::set("k1", "x"), &p).await.unwrap(), Reply::Ok);
    assert_eq!(
        handle.dispatch(Request::get("k1"), &p).await.unwrap(),
        Reply::Value(Some(b("x")))
    );
    assert_eq!(handle.dispatch(Request::del("k1"), &p).await.unwrap(), Reply::Deleted(1));
    assert_eq!(
        handle.dispatch(Request::get("k1"), &p).await.unwrap(),
        Reply::Value(None)
    );

    handle.stop().await;
}

#[tokio::test]
async fn partition_pubsub_end_to_end() {
    let handle = common::start_partition(0);
    let (p, mut inbox_p) = Subscriber::new();
    let (q, mut inbox_q) = Subscriber::new();

    assert_eq!(
        handle.dispatch(Request::subscribe("news"), &p).await.unwrap(),
        Reply::NoReply
    );
    handle.dispatch(Request::subscribe("news"), &q).await.unwrap();

    let reply = handle.dispatch(Request::publish("news", "hi"), &q).await.unwrap();
    assert_eq!(reply, Reply::Published(2));

    for inbox in [&mut inbox_p, &mut inbox_q] {
        let delivery = tokio::time::timeout(Duration::from_secs(1), inbox.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(delivery.topic, b("news"));
        assert_eq!(delivery.message, b("hi"));
    }

    // terminate P
    drop(inbox_p);

    let reply = handle.dispatch(Request::publish("news", "again"), &q).await.unwrap();
    assert_eq!(reply, Reply::Published(1));
    assert_eq!(inbox_q.recv().await.unwrap().message, b("again"));
    assert!(inbox_q.try_recv().is_none());

    handle.stop().await;
}

#[tokio::test]
async fn partition_monitor_cleans_up_without_publish() {
    let handle = common::start_partition(0);
    let (p, inbox_p) = Subscriber::new();
    let (c, _inbox_c) = Subscriber::new();
    handle.dispatch(Request::subscribe("A"), &p).await.unwrap();
    handle.dispatch(Request::subscribe("B"), &p).await.unwrap();
    handle.dispatch(Request::subscribe("A"), &c).await.unwrap();

    let stats = handle.stats().await.unwrap();
    assert_eq!(stats.tracked_subscribers, 2);
    assert_eq!(stats.channels, 2);

    drop(inbox_p);
    let stats = common::wait_for_stats(&handle, |s| s.tracked_subscribers == 1).await;
    assert_eq!(stats.channels, 2);

    // C still receives on A
    let reply = handle.dispatch(Request::publish("A", "m"), &c).await.unwrap();
    assert_eq!(reply, Reply::Published(1));
    let reply = handle.dispatch(Request::publish("B", "m"), &c).await.unwrap();
    assert_eq!(reply, Reply::Published(0));

    handle.stop().await;
}

#[tokio::test]
async fn partition_duplicate_down_is_absorbed() {
    let handle = common::start_partition(0);
    let (p, _inbox) = Subscriber::new();
    handle.dispatch(Request::subscribe("A"), &p).await.unwrap();

    handle.notify_down(p.id()).await.unwrap();
    handle.notify_down(p.id()).await.unwrap();
    handle.notify_down(SubscriberId(u64::MAX)).await.unwrap();

    assert_eq!(handle.dispatch(Request::ping(), &p).await.unwrap(), Reply::Pong(0));
    let stats = handle.stats().await.unwrap();
    assert_eq!(stats.tracked_subscribers, 0);

    handle.stop().await;
}

#[tokio::test]
async fn partition_subscribe_reuses_monitor() {
    let handle = common::start_partition(0);
    let (p, _inbox) = Subscriber::new();
    for topic in ["a", "b", "c"] {
        handle.dispatch(Request::subscribe(topic), &p).await.unwrap();
    }

    let stats = handle.stats().await.unwrap();
    assert_eq!(stats.tracked_subscribers, 1);
    assert_eq!(stats.channels, 3);
    assert_eq!(stats.monitors_started, 1);

    // a second subscriber gets its own monitor
    let (q, _inbox_q) = Subscriber::new();
    handle.dispatch(Request::subscribe("a"), &q).await.unwrap();
    handle.dispatch(Request::subscribe("b"), &q).await.unwrap();
    assert_eq!(handle.stats().await.unwrap().monitors_started, 2);

    // leaving every topic drops the monitor; rejoining starts a fresh one
    for topic in ["a", "b", "c"] {
        handle.dispatch(Request::unsubscribe(topic), &p).await.unwrap();
    }
    assert_eq!(handle.stats().await.unwrap().tracked_subscribers, 1);
    handle.dispatch(Request::subscribe("c"), &p).await.unwrap();
    handle.dispatch(Request::subscribe("a"), &p).await.unwrap();

    let stats = handle.stats().await.unwrap();
    assert_eq!(stats.tracked_subscribers, 2);
    assert_eq!(stats.monitors_started, 3);

    handle.stop().await;
}

#[tokio::test]
async fn partition_slow_subscriber_does_not_block_publish() {
    let handle = common::start_partition(0);
    let (slow, _never_read) = Subscriber::new();
    handle.dispatch(Request::subscribe("t"), &slow).await.unwrap();

    for _ in 0..10_000 {
        let reply = handle.dispatch(Request::publish("t", "m"), &slow).await.unwrap();
        assert_eq!(reply, Reply::Published(1));
    }
    assert_eq!(handle.dispatch(Request::ping(), &slow).await.unwrap(), Reply::Pong(0));

    handle.stop().await;
}

#[tokio::test]
async fn partition_is_empty_and_delete() {
    let handle = common::start_partition(5);
    let (p, _inbox) = Subscriber::new();
    assert!(handle.is_empty().await.unwrap());

    handle.dispatch(Request::subscribe("t"), &p).await.unwrap();
    assert!(!handle.is_empty().await.unwrap());

    handle.dispatch(Request::unsubscribe("t"), &p).await.unwrap();
    // empty channels still count
    assert!(!handle.is_empty().await.unwrap());

    handle.delete().await.unwrap();
    assert!(handle.is_stopped());
    assert_eq!(
        handle.is_empty().await.unwrap_err(),
        PartkvError::PartitionStopped { index: 5 }
    );
}

#[tokio::test]
async fn partition_errors_do_not_stop_it() {
    let handle = common::start_partition(0);
    let (p, _inbox) = Subscriber::new();

    let err = handle.dispatch(Request::unsubscribe("none"), &p).await.unwrap_err();
    assert!(matches!(err, PartkvError::NotSubscribed { .. }));
    let err = handle.dispatch(Request::new("BOGUS", Vec::<Bytes>::new()), &p).await.unwrap_err();
    assert!(matches!(err, PartkvError::UnknownCommand { .. }));

    assert_eq!(handle.dispatch(Request::ping(), &p).await.unwrap(), Reply::Pong(0));
    handle.stop().await;
}

#[tokio::test]
async fn partition_handoff_is_placeholder() {
    let handle = common::start_partition(0);
    let (p, _inbox) = Subscriber::new();
    handle.dispatch(Request::set("k", "v"), &p).await.unwrap();

    assert!(handle.handoff_entries().await.unwrap().is_empty());
    handle
        .handoff_ingest(HandoffEntry {
            key: b("other"),
            value: b("v"),
        })
        .await
        .unwrap();
    assert_eq!(
        handle.dispatch(Request::get("other"), &p).await.unwrap(),
        Reply::Value(None)
    );

    handle.stop().await;
}

// ============================================================================
// Partition Table Tests
// ============================================================================

#[tokio::test]
async fn table_partitions_run_in_parallel() {
    let table = std::sync::Arc::new(PartitionTable::new());
    let config = PartitionConfig::default();
    for index in 0..4 {
        table.start(index, &config).unwrap();
    }

    let mut tasks = Vec::new();
    for index in 0..4u32 {
        let table = table.clone();
        tasks.push(tokio::spawn(async move {
            let (p, _inbox) = Subscriber::new();
            for i in 0..100 {
                let key = format!("k{i}");
                table
                    .dispatch(index, Request::set(key, index.to_string()), &p)
                    .await
                    .unwrap();
            }
            table.get(index).unwrap().stats().await.unwrap()
        }));
    }

    for task in tasks {
        let stats = task.await.unwrap();
        assert_eq!(stats.keys, 100);
    }

    table.delete(0).await.unwrap();
    assert_eq!(table.indices(), vec![1, 2, 3]);
    table.stop_all().await;
    assert!(table.is_empty());
}
