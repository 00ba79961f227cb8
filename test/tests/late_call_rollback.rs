//! Calls that cross on the wire: the peer that already executed a later
//! call rolls back and re-commits in time-stamp order.

use tangle_peer::{CallArg, Tangle, TangleConfig, TangleState};
use tangle_shared::PeerId;
use tangle_test::helpers::{settle, CounterMachine, MockNet};

const BINARY: &[u8] = b"\x00asm-counter-module";

fn connected_pair() -> (Tangle<CounterMachine>, Tangle<CounterMachine>) {
    let net = MockNet::new();
    let mut a = Tangle::new(
        CounterMachine::new(Some(16.0)),
        BINARY.to_vec(),
        TangleConfig::default(),
    );
    a.connect(net.join(PeerId::new(1)));
    a.receive_events();

    let mut b = Tangle::new(
        CounterMachine::new(Some(16.0)),
        BINARY.to_vec(),
        TangleConfig::default(),
    );
    b.connect(net.join(PeerId::new(2)));
    b.receive_events();
    settle(&mut [&mut a, &mut b]);

    assert_eq!(a.state(), TangleState::Connected);
    assert_eq!(b.state(), TangleState::Connected);
    (a, b)
}

#[test]
fn late_arrival_is_reordered_before_the_local_call() {
    let (mut a, mut b) = connected_pair();

    // Distinct pacing: A's clock reaches 100ms, B's only 90ms.
    a.progress_time_with(0.0);
    b.progress_time_with(0.0);
    a.progress_time_with(100.0);
    b.progress_time_with(90.0);

    // The calls cross: A commits add(10) at ~100 first, then B's mul(2)
    // at ~90 lands afterwards and has to be ordered in front of it.
    a.call("add", &[CallArg::Number(10.0)]);
    b.call("mul", &[CallArg::Number(2.0)]);
    settle(&mut [&mut a, &mut b]);

    // (0 * 2) + 10, on both sides. The arrival-order fold would be 20.
    assert_eq!(a.machine().counter(), 10.0);
    assert_eq!(b.machine().counter(), 10.0);
    assert_eq!(
        a.machine().history_time_stamps(),
        b.machine().history_time_stamps()
    );
}

#[test]
fn near_simultaneous_calls_converge_on_one_order() {
    let (mut a, mut b) = connected_pair();

    // Both sides call at (almost) the same target time; whatever order
    // the `(time, player_id)` key produces, both sides must produce it.
    a.call("add", &[CallArg::Number(10.0)]);
    b.call("mul", &[CallArg::Number(2.0)]);
    settle(&mut [&mut a, &mut b]);

    assert_eq!(
        a.machine().history_time_stamps(),
        b.machine().history_time_stamps()
    );
    assert_eq!(a.machine().counter(), b.machine().counter());
}
