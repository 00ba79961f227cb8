//! A peer joining mid-stream bootstraps from the heap of an established
//! peer, replays whatever arrived during the transfer, and converges.

use tangle_peer::{CallArg, Tangle, TangleConfig, TangleState};
use tangle_shared::PeerId;
use tangle_test::helpers::{settle, state_log, CounterMachine, MockNet};

const BINARY: &[u8] = b"\x00asm-counter-module";

fn fixed_step_tangle(config: TangleConfig) -> Tangle<CounterMachine> {
    Tangle::new(CounterMachine::new(Some(16.0)), BINARY.to_vec(), config)
}

#[test]
fn late_joiner_converges_on_the_established_state() {
    let net = MockNet::new();
    let a_id = PeerId::new(1);
    let b_id = PeerId::new(2);

    let mut a = fixed_step_tangle(TangleConfig::default());
    a.connect(net.join(a_id));
    a.receive_events();
    assert_eq!(a.state(), TangleState::Connected);

    // An established stream of calls before anyone else shows up.
    for _ in 0..10 {
        a.call("add", &[CallArg::Number(1.0)]);
    }

    let (callback, b_states) = state_log();
    let mut b = fixed_step_tangle(TangleConfig {
        on_state_change: Some(callback),
        ..TangleConfig::default()
    });
    b.connect(net.join(b_id));
    b.receive_events();

    // B found a peer to bootstrap from and is waiting on the heap.
    assert_eq!(b.state(), TangleState::RequestingHeap);

    // A keeps streaming while the heap request is still in flight; these
    // calls reach B before the heap does and must be buffered.
    a.call("add", &[CallArg::Number(1.0)]);
    a.call("add", &[CallArg::Number(1.0)]);

    settle(&mut [&mut a, &mut b]);

    assert_eq!(b.state(), TangleState::Connected);
    assert_eq!(
        b_states.borrow().as_slice(),
        &[TangleState::RequestingHeap, TangleState::Connected]
    );

    // Convergence: same counter, same memory image, same committed
    // history. The buffered calls were applied exactly once.
    assert_eq!(a.machine().counter(), 12.0);
    assert_eq!(b.machine().counter(), 12.0);
    assert_eq!(a.read_memory(0, 8), b.read_memory(0, 8));
    assert_eq!(
        a.machine().history_time_stamps(),
        b.machine().history_time_stamps()
    );

    // One ping/pong round has produced a usable round-trip estimate.
    let rtt = b.peer_record(a_id).unwrap().round_trip_time;
    assert!(rtt >= 0.0 && rtt < 10_000.0, "implausible rtt {rtt}");
}

#[test]
fn both_sides_track_each_others_call_watermarks() {
    let net = MockNet::new();
    let a_id = PeerId::new(1);
    let b_id = PeerId::new(2);

    let mut a = fixed_step_tangle(TangleConfig::default());
    a.connect(net.join(a_id));
    a.receive_events();

    let mut b = fixed_step_tangle(TangleConfig::default());
    b.connect(net.join(b_id));
    b.receive_events();
    settle(&mut [&mut a, &mut b]);

    a.call("add", &[CallArg::Number(3.0)]);
    settle(&mut [&mut a, &mut b]);

    // B saw A's call: its watermark for A is the call's time stamp, and
    // A's send watermark for B reflects the same bound.
    let b_view = b.peer_record(a_id).unwrap();
    assert!(b_view.last_received_message.is_finite());
    let a_view = a.peer_record(b_id).unwrap();
    assert!(a_view.last_sent_message >= b_view.last_received_message);

    assert_eq!(a.machine().counter(), 3.0);
    assert_eq!(b.machine().counter(), 3.0);
}
