use std::cell::RefCell;
use std::rc::Rc;

use tangle_peer::{Tangle, TangleState};
use tangle_shared::TimeMachine;

/// Pump room events across all peers until every mailbox runs dry.
///
/// Each round drains every peer once; replies land in other mailboxes and
/// get picked up next round. Synchronous routing means this terminates as
/// soon as the room goes quiet.
pub fn settle<M: TimeMachine>(peers: &mut [&mut Tangle<M>]) {
    loop {
        let mut processed = 0;
        for peer in peers.iter_mut() {
            processed += peer.receive_events();
        }
        if processed == 0 {
            return;
        }
    }
}

/// A state-change observer: returns the callback to hand to
/// `TangleConfig` and the shared log of transitions it records.
pub fn state_log() -> (
    Box<dyn FnMut(TangleState)>,
    Rc<RefCell<Vec<TangleState>>>,
) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let callback = Box::new(move |state: TangleState| {
        sink.borrow_mut().push(state);
    });
    (callback, log)
}
