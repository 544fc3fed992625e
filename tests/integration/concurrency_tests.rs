use futures::StreamExt;
use oxide_reactor::{CounterIntent, CounterState, Phase};

use super::{build_counter_test, state};

const PRODUCERS: usize = 4;
const PER_PRODUCER: usize = 25;

/// Every intent after the seed shows busy, then its delta, then idle, with nothing in between.
fn assert_bracketed(snapshots: &[CounterState]) {
    let mut settled = snapshots[0];
    assert!(!settled.is_loading);
    for step in snapshots[1..].chunks(3) {
        assert_eq!(step[0], state(settled.value, true));
        if let Some(delta) = step.get(1) {
            assert!(delta.is_loading);
            assert_eq!((delta.value - settled.value).abs(), 1);
        }
        if let Some(done) = step.get(2) {
            assert_eq!(*done, state(step[1].value, false));
            settled = *done;
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_producers_on_several_workers_should_keep_every_intent_bracketed() {
    let test = build_counter_test()
        .given_yielding_pending_step()
        .expecting_pending_runs(PRODUCERS * PER_PRODUCER)
        .build();

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|producer| {
            let dispatcher = test.container.dispatcher();
            tokio::spawn(async move {
                for n in 0..PER_PRODUCER {
                    let intent = if (producer + n) % 2 == 0 {
                        CounterIntent::Increment
                    } else {
                        CounterIntent::Decrement
                    };
                    dispatcher.submit(intent);
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();
    for producer in producers {
        producer.await.unwrap();
    }

    test.wait_until(|snapshots| snapshots.len() == 1 + 3 * PRODUCERS * PER_PRODUCER)
        .await;

    test.snapshots.with_snapshots(|snapshots| assert_bracketed(snapshots));
    assert_eq!(test.container.current_state(), state(0, false));
    assert_eq!(test.container.phase(), Phase::Idle);
    test.verify_pending();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_two_containers_driven_concurrently_should_stay_isolated() {
    let rising = build_counter_test().given_yielding_pending_step().build();
    let falling = build_counter_test()
        .given_initial_value(100)
        .given_yielding_pending_step()
        .build();

    let up = rising.container.dispatcher();
    let down = falling.container.dispatcher();
    let (up_done, down_done) = tokio::join!(
        tokio::spawn(async move {
            for _ in 0..50 {
                up.submit(CounterIntent::Increment);
                tokio::task::yield_now().await;
            }
        }),
        tokio::spawn(async move {
            for _ in 0..50 {
                down.submit(CounterIntent::Decrement);
                tokio::task::yield_now().await;
            }
        }),
    );
    up_done.unwrap();
    down_done.unwrap();

    rising.wait_until(|snapshots| snapshots.len() == 151).await;
    falling.wait_until(|snapshots| snapshots.len() == 151).await;

    assert_eq!(rising.container.current_state(), state(50, false));
    assert_eq!(falling.container.current_state(), state(50, false));
    rising.snapshots.with_snapshots(|snapshots| {
        assert_bracketed(snapshots);
        assert!(snapshots.windows(2).all(|pair| pair[1].value >= pair[0].value));
    });
    falling.snapshots.with_snapshots(|snapshots| {
        assert_bracketed(snapshots);
        assert!(snapshots.windows(2).all(|pair| pair[1].value <= pair[0].value));
    });
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_close_while_loop_runs_on_a_worker_should_freeze_state() {
    let test = build_counter_test().given_yielding_pending_step().build();
    let states = test.container.observe();

    for _ in 0..2000 {
        test.container.submit(CounterIntent::Increment);
    }
    test.wait_until(|snapshots| snapshots.len() >= 30).await;

    test.container.close();
    let frozen = test.container.current_state();

    let received: Vec<CounterState> = states.collect().await;
    assert_eq!(received.last(), Some(&frozen));
    assert_bracketed(&received);

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert_eq!(test.container.current_state(), frozen);
    assert_eq!(test.container.phase(), Phase::Idle);
    assert_eq!(test.snapshots.last(), Some(frozen));
    assert!(test.snapshots.count() <= received.len());
}
