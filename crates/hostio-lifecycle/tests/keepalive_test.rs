//! Property and unit tests for cancellation tokens and keep-alive counting.

use std::time::Duration;

use hostio_lifecycle::{Cancellable, CancellationState, CancellationToken, KeepAliveRegistry};
use proptest::prelude::*;

#[test]
fn token_abort_is_terminal() {
    let token = CancellationToken::new();
    assert_eq!(token.state(), CancellationState::Active);
    token.cancel();
    token.cancel();
    assert_eq!(token.state(), CancellationState::Aborted);
    assert!(token.stop_handle().is_stopped());
}

#[tokio::test]
async fn aborted_wakes_waiters_and_returns_immediately_after() {
    let token = CancellationToken::new();
    let waiter = {
        let token = token.clone();
        tokio::spawn(async move { token.aborted().await })
    };
    tokio::task::yield_now().await;
    token.stop_handle().stop();
    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("waiter not woken")
        .unwrap();
    tokio::time::timeout(Duration::from_millis(10), token.aborted())
        .await
        .expect("aborted() blocked on an aborted token");
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Ref,
    Unref,
    Release,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Ref), Just(Op::Unref), Just(Op::Release)]
}

proptest! {
    #[test]
    fn registry_count_matches_refed_handles(ops in prop::collection::vec((0usize..4, op()), 0..64)) {
        let registry = KeepAliveRegistry::new();
        let refs: Vec<_> = (0..4).map(|_| registry.acquire(true)).collect();
        for (index, op) in ops {
            match op {
                Op::Ref => refs[index].ref_(),
                Op::Unref => refs[index].unref(),
                Op::Release => refs[index].release(),
            }
        }
        let refed = refs.iter().filter(|r| r.has_ref()).count();
        prop_assert_eq!(registry.active_count(), refed);
        drop(refs);
        prop_assert!(registry.is_idle());
    }
}
