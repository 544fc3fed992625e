use std::time::Duration;

use futures::StreamExt;
use oxide_reactor::{CounterIntent, TestObserver};

use super::{build_counter_test, state, tokio_spawner};

#[tokio::test(start_paused = true)]
async fn given_a_late_observer_should_start_from_the_current_snapshot() {
    let test = build_counter_test().build();

    test.container.submit(CounterIntent::Increment);
    test.settle().await;

    let late = TestObserver::new();
    late.attach(test.container.observe(), &tokio_spawner);
    test.container.submit(CounterIntent::Increment);
    test.settle().await;

    late.with_snapshots(|snapshots| {
        assert_eq!(
            snapshots,
            &vec![state(1, false), state(1, true), state(2, true), state(2, false)]
        );
    });
    assert_eq!(late.last(), test.snapshots.last());
    assert_eq!(test.snapshots.count(), 7);
}

#[tokio::test(start_paused = true)]
async fn given_observers_subscribed_at_different_times_should_agree_on_final_state() {
    let test = build_counter_test().build();
    let early = TestObserver::new();
    early.attach(test.container.observe(), &tokio_spawner);

    test.container.submit(CounterIntent::Decrement);
    test.advance(Duration::from_millis(500)).await;

    let mid = TestObserver::new();
    mid.attach(test.container.observe(), &tokio_spawner);
    test.container.submit(CounterIntent::Decrement);
    test.settle().await;

    assert_eq!(early.last(), Some(state(-2, false)));
    assert_eq!(mid.last(), early.last());
    mid.with_snapshots(|snapshots| assert_eq!(snapshots[0], state(0, true)));
}

#[tokio::test(start_paused = true)]
async fn given_projected_observers_should_only_see_distinct_values() {
    let test = build_counter_test().build();
    let values = test.container.observe().distinct_by(|state| state.value);
    let loading = test.container.observe().distinct_by(|state| state.is_loading);

    test.container.submit(CounterIntent::Increment);
    test.container.submit(CounterIntent::Decrement);
    test.settle().await;
    test.container.close();

    assert_eq!(values.collect::<Vec<_>>().await, vec![0, 1, 0]);
    assert_eq!(
        loading.collect::<Vec<_>>().await,
        vec![false, true, false, true, false]
    );
}

#[tokio::test(start_paused = true)]
async fn given_a_dropped_observer_should_stop_delivering_to_it() {
    let test = build_counter_test().build();
    let transient = test.container.observe();
    assert_eq!(test.container.observer_count(), 2);

    drop(transient);
    assert_eq!(test.container.observer_count(), 1);

    test.container.submit(CounterIntent::Increment);
    test.settle().await;
    assert_eq!(test.snapshots.last(), Some(state(1, false)));
}
