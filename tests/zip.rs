mod common;

use std::sync::Arc;

use common::{ManualSource, Seen, TestSubscriber};
use zipbarrier::sources::{Empty, Fail, FromIter, Just};
use zipbarrier::{
    Bus, EventKind, ProtocolViolation, Publisher, StreamError, ZipConfig, ZipPublisher,
};

fn just(v: i32) -> Arc<dyn Publisher<i32>> {
    Arc::new(Just::new(v))
}

fn seq(items: &[i32]) -> Arc<dyn Publisher<i32>> {
    Arc::new(FromIter::new(items.to_vec()))
}

#[test]
fn null_consumer_fails_for_every_arity() {
    for n in 0..6 {
        let zip = ZipPublisher::new((0..n).map(just).collect());
        assert_eq!(
            zip.try_subscribe(None),
            Err(ProtocolViolation::NullSubscriber),
            "n={n}"
        );
    }
}

#[test]
fn no_sources_complete_right_after_subscribe() {
    let zip = ZipPublisher::<i32>::new(Vec::new());
    let sub = TestSubscriber::<Vec<i32>>::new();
    zip.try_subscribe(Some(sub.clone())).unwrap();
    assert_eq!(sub.seen(), vec![Seen::Subscribed, Seen::Complete]);
}

#[test]
fn scalar_sources_emit_one_tuple_then_complete() {
    for n in 1..6 {
        let zip = ZipPublisher::new((0..n).map(just).collect());
        let sub = TestSubscriber::<Vec<i32>>::new();
        zip.subscribe(sub.clone());

        sub.request(1);
        assert_eq!(sub.values(), vec![(0..n).collect::<Vec<_>>()]);
        assert_eq!(sub.completions(), 1);

        sub.request(1);
        assert_eq!(sub.values().len(), 1, "n={n}");
        assert_eq!(sub.terminals(), 1);
    }
}

#[test]
fn two_scalars_with_spare_demand() {
    let zip = ZipPublisher::new(vec![just(1), just(2)]);
    let sub = TestSubscriber::<Vec<i32>>::new();
    zip.subscribe(sub.clone());
    sub.request(5);

    assert_eq!(
        sub.seen(),
        vec![Seen::Subscribed, Seen::Next(vec![1, 2]), Seen::Complete]
    );
}

#[test]
fn shorter_source_ends_the_sequence() {
    let zip = ZipPublisher::new(vec![seq(&[1, 2, 3]), seq(&[10, 20])]);
    let sub = TestSubscriber::<Vec<i32>>::new();
    zip.subscribe(sub.clone());
    sub.request(u64::MAX);

    assert_eq!(
        sub.seen(),
        vec![
            Seen::Subscribed,
            Seen::Next(vec![1, 10]),
            Seen::Next(vec![2, 20]),
            Seen::Complete,
        ]
    );
}

#[test]
fn hand_driven_sources_zip_pairwise() {
    let a = ManualSource::<i32>::new();
    let b = ManualSource::<i32>::new();
    let zip = ZipPublisher::new(vec![a.erased(), b.erased()]);
    let sub = TestSubscriber::<Vec<i32>>::requesting(u64::MAX);
    zip.subscribe(sub.clone());

    a.next(1);
    a.next(2);
    a.next(3);
    a.complete();
    b.next(10);
    b.next(20);
    assert_eq!(sub.values(), vec![vec![1, 10], vec![2, 20]]);
    assert_eq!(sub.terminals(), 0);

    b.complete();
    assert_eq!(sub.completions(), 1);
    assert_eq!(a.cancels(), 1);
    assert_eq!(b.cancels(), 1);
}

#[test]
fn dropped_handle_still_delivers_the_stream() {
    let a = ManualSource::<i32>::new();
    let b = ManualSource::<i32>::new();
    let zip = ZipPublisher::new(vec![a.erased(), b.erased()]);
    let sub = TestSubscriber::<Vec<i32>>::fire_and_forget(u64::MAX);
    zip.subscribe(sub.clone());
    drop(zip);

    a.next(1);
    b.next(10);
    a.complete();
    assert_eq!(sub.values(), vec![vec![1, 10]]);
    assert_eq!(sub.completions(), 1);
    assert_eq!(a.cancels(), 1);
    assert_eq!(b.cancels(), 1);
}

#[test]
fn dropped_handle_still_delivers_errors() {
    let a = ManualSource::<i32>::new();
    let zip = ZipPublisher::new(vec![a.erased(), just(3)]);
    let sub = TestSubscriber::<Vec<i32>>::fire_and_forget(1);
    zip.subscribe(sub.clone());
    drop(zip);

    a.error(StreamError::upstream("link down"));
    assert_eq!(sub.errors().len(), 1);
    assert_eq!(sub.terminals(), 1);
    assert_eq!(a.cancels(), 1);
}

#[test]
fn terminal_signal_releases_the_zip() {
    let zip = ZipPublisher::new(vec![seq(&[1, 2, 3]), seq(&[4, 5])]);
    let sub = TestSubscriber::<Vec<i32>>::requesting(u64::MAX);
    zip.subscribe(sub.clone());
    assert_eq!(sub.completions(), 1);

    let barrier = Arc::downgrade(sub.subscription());
    let consumer = Arc::downgrade(&sub);
    drop(zip);
    drop(sub);
    assert!(barrier.upgrade().is_none(), "barrier outlived its consumer");
    assert!(consumer.upgrade().is_none(), "consumer kept alive by the barrier");
}

#[test]
fn cancel_releases_the_zip() {
    let a = ManualSource::<i32>::new();
    let zip = ZipPublisher::new(vec![a.erased(), just(1)]);
    let sub = TestSubscriber::<Vec<i32>>::requesting(1);
    zip.subscribe(sub.clone());
    sub.cancel();

    let consumer = Arc::downgrade(&sub);
    drop(zip);
    drop(sub);
    assert!(consumer.upgrade().is_none());
    assert_eq!(a.cancels(), 1);
}

#[test]
fn early_error_cancels_peers_and_emits_nothing() {
    let sources: Vec<_> = (0..4).map(|_| ManualSource::<i32>::new()).collect();
    let zip = ZipPublisher::new(sources.iter().map(|s| s.erased()).collect());
    let sub = TestSubscriber::<Vec<i32>>::requesting(10);
    zip.subscribe(sub.clone());

    sources[0].next(1);
    sources[2].next(3);
    sources[3].error(StreamError::upstream("link down"));

    assert_eq!(
        sub.seen(),
        vec![
            Seen::Subscribed,
            Seen::Error("upstream failed: link down".to_string())
        ]
    );
    for source in &sources[..3] {
        assert_eq!(source.cancels(), 1);
    }
}

#[test]
fn failing_source_on_subscribe() {
    let failing: Arc<dyn Publisher<i32>> =
        Arc::new(Fail::new(StreamError::upstream("refused")));
    let other = ManualSource::<i32>::new();
    let zip = ZipPublisher::new(vec![other.erased(), failing]);
    let sub = TestSubscriber::<Vec<i32>>::requesting(1);
    zip.subscribe(sub.clone());

    assert_eq!(sub.errors().len(), 1);
    assert_eq!(sub.errors()[0].as_label(), "stream_upstream");
    assert_eq!(other.cancels(), 1);
    assert!(sub.values().is_empty());
}

#[test]
fn empty_source_completes_without_tuples() {
    let empty: Arc<dyn Publisher<i32>> = Arc::new(Empty);
    let zip = ZipPublisher::new(vec![seq(&[1, 2]), empty]);
    let sub = TestSubscriber::<Vec<i32>>::requesting(4);
    zip.subscribe(sub.clone());

    assert_eq!(sub.seen(), vec![Seen::Subscribed, Seen::Complete]);
}

#[test]
fn cancel_silences_everything() {
    let a = ManualSource::<i32>::new();
    let b = ManualSource::<i32>::new();
    let zip = ZipPublisher::new(vec![a.erased(), b.erased()]);
    let sub = TestSubscriber::<Vec<i32>>::requesting(8);
    zip.subscribe(sub.clone());

    a.next(1);
    sub.cancel();
    b.next(2);
    a.complete();
    b.error(StreamError::upstream("after cancel"));

    assert_eq!(sub.seen(), vec![Seen::Subscribed]);
    assert_eq!(a.cancels(), 1);
    assert_eq!(b.cancels(), 1);
}

#[test]
fn cancel_twice_equals_cancel_once() {
    let a = ManualSource::<i32>::new();
    let b = ManualSource::<i32>::new();
    let zip = ZipPublisher::new(vec![a.erased(), b.erased()]);
    let sub = TestSubscriber::<Vec<i32>>::new();
    zip.subscribe(sub.clone());

    sub.cancel();
    sub.cancel();
    assert_eq!(a.cancels(), 1);
    assert_eq!(b.cancels(), 1);
    assert_eq!(sub.seen(), vec![Seen::Subscribed]);
}

#[test]
fn demand_is_additive() {
    let items = [1, 2, 3, 4, 5, 6, 7, 8];
    let zip = ZipPublisher::new(vec![seq(&items), seq(&items)]);

    let split = TestSubscriber::<Vec<i32>>::new();
    zip.subscribe(split.clone());
    split.request(2);
    split.request(3);

    let single = TestSubscriber::<Vec<i32>>::new();
    zip.subscribe(single.clone());
    single.request(5);

    assert_eq!(split.values().len(), 5);
    assert_eq!(split.values(), single.values());
}

#[test]
fn zero_demand_is_rejected_synchronously() {
    let zip = ZipPublisher::new(vec![seq(&[1])]);
    let sub = TestSubscriber::<Vec<i32>>::new();
    zip.subscribe(sub.clone());

    let err = sub.subscription().request(0).unwrap_err();
    assert_eq!(err.requested, 0);
    assert_eq!(err.as_label(), "demand_invalid");
    assert!(sub.values().is_empty());
}

#[test]
fn duplicate_handshake_cancels_the_newcomer() {
    let bus = Bus::new(16);
    let mut rx = bus.subscribe();
    let a = ManualSource::<i32>::new();
    let zip = ZipPublisher::builder(vec![a.erased(), just(0)])
        .name("dup")
        .bus(bus)
        .build();
    let sub = TestSubscriber::<Vec<i32>>::requesting(1);
    zip.subscribe(sub.clone());

    let extra = a.resubscribe();
    assert_eq!(extra.cancels(), 1);
    assert_eq!(extra.requested(), 0);
    assert_eq!(a.cancels(), 0);

    a.next(5);
    assert_eq!(sub.values(), vec![vec![5, 0]]);

    let mut kinds = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        kinds.push(ev.kind);
    }
    assert!(kinds.contains(&EventKind::DuplicateSubscription));
}

#[test]
fn ignoring_backpressure_is_an_overflow_error() {
    let a = ManualSource::<i32>::new();
    let b = ManualSource::<i32>::new();
    let zip = ZipPublisher::builder(vec![a.erased(), b.erased()])
        .config(ZipConfig {
            prefetch: 2,
            ..ZipConfig::default()
        })
        .build();
    let sub = TestSubscriber::<Vec<i32>>::requesting(1);
    zip.subscribe(sub.clone());
    assert_eq!(a.requested(), 2);

    a.next(1);
    a.next(2);
    a.next(3);

    match sub.errors().as_slice() {
        [StreamError::Overflow { index, capacity }] => {
            assert_eq!(*index, 0);
            assert_eq!(*capacity, 2);
        }
        other => panic!("unexpected errors: {other:?}"),
    }
    assert_eq!(b.cancels(), 1);
}

#[test]
fn combinator_sees_values_in_source_order() {
    let zip = ZipPublisher::builder(vec![seq(&[1, 2]), seq(&[3, 4]), seq(&[5, 6])])
        .combine(|t: &[i32]| Ok(format!("{}-{}-{}", t[0], t[1], t[2])))
        .build();
    let sub = TestSubscriber::<String>::requesting(u64::MAX);
    zip.subscribe(sub.clone());

    assert_eq!(sub.values(), vec!["1-3-5".to_string(), "2-4-6".to_string()]);
    assert_eq!(sub.completions(), 1);
}
