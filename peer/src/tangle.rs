use log::{debug, warn};

use tangle_shared::{
    successor_of, ByteWriter, Decoder, Encoder, Message, MessageKind, PeerId, Room, RoomEvent,
    RoomState, SimTime, TimeMachine, TimeStamp, WallClock, DIVERGENCE_LIMIT_MS,
    MESSAGE_TIME_OFFSET_STEP, PRUNE_CUSHION_MS, STEP_BUDGET_RATIO,
};

use crate::call_arg::CallArg;
use crate::command::{Command, CommandQueue};
use crate::config::TangleConfig;
use crate::lifecycle::{StateChangeCallback, TangleState};
use crate::peer_table::{PeerRecord, PeerTable};

/// Name of the module export invoked when a peer departs.
const PEER_LEFT_EXPORT: &str = "peer_left";

/// A call received while a heap transfer was in flight, held for replay
/// once the heap lands.
struct BufferedCall {
    function_index: u32,
    time_stamp: TimeStamp,
    args: Vec<f64>,
}

/// The rollback-aware distributed execution coordinator.
///
/// Owns the peer table, the lifecycle, the buffered-call queue, the
/// command lane, and the outgoing send buffer; collaborates with a
/// [`TimeMachine`] for execution and a [`Room`] for transport. All
/// mutation funnels through the single command lane, so state is only
/// ever touched in one strict sequential order.
pub struct Tangle<M: TimeMachine> {
    machine: M,
    binary: Vec<u8>,
    room: Option<Box<dyn Room>>,
    room_name: String,
    accept_new_programs: bool,
    on_state_change: Option<StateChangeCallback>,
    state: TangleState,
    peers: PeerTable,
    buffered_calls: Vec<BufferedCall>,
    queue: CommandQueue,
    message_time_offset: SimTime,
    last_performance_now: Option<f64>,
    outgoing: ByteWriter,
    heap_encoder: Encoder,
    heap_decoder: Decoder,
}

impl<M: TimeMachine> Tangle<M> {
    /// Create a coordinator around a loaded engine.
    pub fn new(machine: M, binary: Vec<u8>, config: TangleConfig) -> Self {
        let room_name = format!(
            "{}-{}",
            config.room_name,
            tangle_shared::program_hash_hex(&binary)
        );
        let heap_mode = config.compression.heap;
        Self {
            machine,
            binary,
            room: None,
            room_name,
            accept_new_programs: config.accept_new_programs,
            on_state_change: config.on_state_change,
            state: TangleState::Disconnected,
            peers: PeerTable::new(),
            buffered_calls: Vec::new(),
            queue: CommandQueue::new(),
            message_time_offset: 0.0,
            last_performance_now: None,
            outgoing: ByteWriter::new(),
            heap_encoder: Encoder::new(heap_mode.clone()),
            heap_decoder: Decoder::new(heap_mode),
        }
    }

    /// The hash-qualified room name peers of this binary must share.
    pub fn room_name(&self) -> &str {
        &self.room_name
    }

    /// The module binary this coordinator executes.
    pub fn program(&self) -> &[u8] {
        &self.binary
    }

    pub fn state(&self) -> TangleState {
        self.state
    }

    /// This peer's id, once a room is attached.
    pub fn my_id(&self) -> Option<PeerId> {
        self.room.as_ref().map(|room| room.my_id())
    }

    /// The execution engine, for embedder reads and diagnostics.
    pub fn machine(&self) -> &M {
        &self.machine
    }

    /// Bookkeeping for one remote peer, if it is currently a member.
    pub fn peer_record(&self, peer: PeerId) -> Option<&PeerRecord> {
        self.peers.get(peer)
    }

    /// Attach a room transport (created by the embedder against
    /// [`room_name`](Self::room_name)). Events flow on the next
    /// [`receive_events`](Self::receive_events) call.
    pub fn connect(&mut self, room: Box<dyn Room>) {
        self.room = Some(room);
    }

    /// Drain pending room events through the command lane, in delivery
    /// order. Returns how many events were processed.
    pub fn receive_events(&mut self) -> usize {
        let mut processed = 0;
        loop {
            let event = match self.room.as_mut() {
                Some(room) => room.receive(),
                None => None,
            };
            let Some(event) = event else { break };
            processed += 1;
            match event {
                RoomEvent::PeerJoined(peer) => self.run_task(Command::PeerJoined { peer }, false),
                RoomEvent::PeerLeft(peer) => self.run_task(Command::PeerLeft { peer }, false),
                RoomEvent::StateChanged(state) => {
                    self.run_task(Command::RoomStateChanged { state }, false)
                }
                RoomEvent::Message { from, payload } => {
                    // A datagram can outrun its peer's join event; defer it
                    // behind whatever the lane processes next instead of
                    // losing it.
                    let enqueue_only = !self.peers.contains(from);
                    self.run_task(Command::RemoteMessage { from, payload }, enqueue_only);
                }
            }
        }
        processed
    }

    /// Invoke a module export at the current target time, commit it to
    /// local history, and broadcast it to the room.
    pub fn call(&mut self, name: &str, args: &[CallArg]) {
        self.run_task(
            Command::LocalCall {
                name: name.to_string(),
                args: args.to_vec(),
            },
            false,
        );
        // Variable-step sessions advance time per call rather than per
        // fixed tick; this re-enters the lane on its own.
        if self.machine.fixed_update_interval().is_none() {
            self.progress_time();
        }
    }

    /// Invoke a module export speculatively and revert every effect.
    /// Never networked, never committed; useful for queries and rendering.
    pub fn call_and_revert(&mut self, name: &str, args: &[CallArg]) {
        let Some(my_id) = self.my_id() else {
            warn!("dropping speculative call to `{name}`: no room attached");
            return;
        };
        let args = substitute_args(args, my_id);
        let Some(function_index) = self.machine.function_export_index(name) else {
            debug!("dropping speculative call to unknown export `{name}`");
            return;
        };
        if let Err(err) = self.machine.call_and_revert(function_index, &args) {
            warn!("speculative call to `{name}` failed: {err}");
        }
    }

    /// Re-bootstrap from the lowest-latency peer's heap.
    pub fn resync(&mut self) {
        self.run_task(Command::Resync, false);
    }

    /// Advance the simulation using the process wall clock.
    pub fn progress_time(&mut self) {
        self.progress_time_with(WallClock::now_ms());
    }

    /// Advance the simulation using an embedder-supplied frame timestamp,
    /// in milliseconds. Timestamps must be monotonic and must all come
    /// from the same clock.
    pub fn progress_time_with(&mut self, now_ms: f64) {
        self.run_task(Command::ProgressTime { now_ms }, false);
    }

    /// Read raw bytes out of module memory.
    pub fn read_memory(&self, address: usize, length: usize) -> Vec<u8> {
        self.machine.read_memory(address, length)
    }

    /// Read a UTF-8 string out of module memory.
    pub fn read_string(&self, address: usize, length: usize) -> String {
        self.machine.read_string(address, length)
    }

    /// Leave the room. The lifecycle returns to Disconnected when the
    /// transport reports the change; no retries are initiated here.
    pub fn disconnect(&mut self) {
        if let Some(room) = self.room.as_mut() {
            room.disconnect();
        }
    }

    // Command lane

    fn run_task(&mut self, command: Command, enqueue_only: bool) {
        if enqueue_only || !self.queue.try_claim() {
            self.queue.enqueue(command);
            return;
        }
        self.execute(command);
        while let Some(next) = self.queue.next() {
            self.execute(next);
        }
        self.queue.release();
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::LocalCall { name, args } => self.execute_local_call(&name, &args),
            Command::RemoteMessage { from, payload } => {
                self.execute_remote_message(from, &payload)
            }
            Command::PeerJoined { peer } => self.execute_peer_joined(peer),
            Command::PeerLeft { peer } => self.execute_peer_left(peer),
            Command::RoomStateChanged { state } => self.execute_room_state_changed(state),
            Command::ProgressTime { now_ms } => self.execute_progress_time(now_ms),
            Command::Resync => self.request_heap(),
        }
    }

    // Call path

    fn execute_local_call(&mut self, name: &str, args: &[CallArg]) {
        let Some(my_id) = self.my_id() else {
            warn!("dropping call to `{name}`: no room attached");
            return;
        };
        let args = substitute_args(args, my_id);
        let Some(function_index) = self.machine.function_export_index(name) else {
            debug!("dropping call to unknown export `{name}`");
            return;
        };

        let time_stamp = TimeStamp::new(
            self.machine.target_time() + self.message_time_offset,
            my_id,
        );
        self.message_time_offset += MESSAGE_TIME_OFFSET_STEP;

        if let Err(err) = self
            .machine
            .call_with_time_stamp(function_index, &args, time_stamp, true)
        {
            warn!("call to `{name}` failed: {err}");
            return;
        }

        self.send_message(
            None,
            &Message::WasmCall {
                function_index,
                time: time_stamp.time,
                args,
            },
        );

        // Conservative upper bound for the pruning math: each peer now has
        // everything up to this call, or whatever it last sent us,
        // whichever is later.
        for (_, record) in self.peers.iter_mut() {
            record.last_sent_message = record.last_received_message.max(time_stamp.time);
        }
    }

    // Inbound dispatch

    fn execute_remote_message(&mut self, from: PeerId, payload: &[u8]) {
        if !self.peers.contains(from) {
            warn!("dropping datagram from unknown peer {from}");
            return;
        }
        let message = match Message::read(payload) {
            Ok(message) => message,
            Err(err) => {
                warn!("dropping malformed datagram from {from}: {err}");
                return;
            }
        };
        match message {
            Message::WasmCall {
                function_index,
                time,
                args,
            } => self.handle_wasm_call(from, function_index, time, args),
            Message::TimeProgressed { time } => {
                if let Some(record) = self.peers.get_mut(from) {
                    record.last_received_message = time;
                }
            }
            Message::RequestState => self.handle_request_state(),
            Message::SetHeap { heap } => self.handle_set_heap(from, heap),
            Message::Ping { .. } => self.handle_ping(from, payload),
            Message::Pong { wall_clock_ms } => {
                let now_ms = WallClock::now_ms();
                if let Some(record) = self.peers.get_mut(from) {
                    record.round_trip_time = now_ms - wall_clock_ms;
                }
            }
            Message::SetProgram { .. } => self.handle_set_program(from),
        }
    }

    fn handle_wasm_call(
        &mut self,
        from: PeerId,
        function_index: u32,
        time: SimTime,
        args: Vec<f64>,
    ) {
        if let Some(record) = self.peers.get_mut(from) {
            record.last_received_message = time;
        }
        let time_stamp = TimeStamp::new(time, from);

        if self.state == TangleState::RequestingHeap {
            // Hold it until the heap lands, then replay in arrival order.
            self.buffered_calls.push(BufferedCall {
                function_index,
                time_stamp,
                args,
            });
            return;
        }

        if let Err(err) = self
            .machine
            .call_with_time_stamp(function_index, &args, time_stamp, true)
        {
            warn!("remote call from {from} to export {function_index} failed: {err}");
        }
        if self.machine.fixed_update_interval().is_none() {
            self.run_task(
                Command::ProgressTime {
                    now_ms: WallClock::now_ms(),
                },
                false,
            );
        }
    }

    fn handle_request_state(&mut self) {
        let heap = self.machine.encode_heap();
        let heap = match self.heap_encoder.try_encode(&heap) {
            Ok(encoded) => encoded.to_vec(),
            Err(err) => {
                warn!("failed to encode heap for a state request: {err}");
                return;
            }
        };
        self.send_message(None, &Message::SetHeap { heap: &heap });
    }

    fn handle_set_heap(&mut self, from: PeerId, heap: &[u8]) {
        if self.state == TangleState::Connected {
            // Rejoin storms rebroadcast stale heaps; a connected peer
            // ignores them.
            debug!("ignoring heap from {from} while connected");
            return;
        }
        let decoded = match self.heap_decoder.try_decode(heap) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!("dropping undecodable heap from {from}: {err}");
                return;
            }
        };
        if let Err(err) = self.machine.apply_heap(decoded) {
            warn!("dropping unusable heap from {from}: {err}");
            return;
        }

        // Replay everything that arrived while the transfer was in flight.
        let buffered = std::mem::take(&mut self.buffered_calls);
        for call in buffered {
            if let Err(err) = self.machine.call_with_time_stamp(
                call.function_index,
                &call.args,
                call.time_stamp,
                true,
            ) {
                warn!(
                    "replay of buffered call to export {} failed: {err}",
                    call.function_index
                );
            }
        }

        // Half the measured round trip approximates how far the sender's
        // clock has moved since it encoded the heap.
        let rtt = self
            .peers
            .get(from)
            .map(|record| record.round_trip_time)
            .unwrap_or(0.0);
        self.machine.progress_time(rtt / 2.0);

        self.transition(TangleState::Connected);
    }

    fn handle_ping(&mut self, from: PeerId, payload: &[u8]) {
        // Rewrite the kind byte in place and echo; the embedded timestamp
        // travels back untouched.
        let mut echo = payload.to_vec();
        echo[0] = MessageKind::Pong.to_u8();
        self.send_raw(Some(from), &echo);
    }

    fn handle_set_program(&mut self, from: PeerId) {
        if !self.accept_new_programs {
            debug!("dropping program swap from {from}: not accepted by this peer");
            return;
        }
        // TODO: executing the swap needs a migration story first:
        // re-resolve export indices against the new module, re-hash the
        // room name, and rebootstrap peers that joined against the old
        // binary.
        warn!("ignoring program swap from {from}: hot swap is not implemented");
    }

    // Membership

    fn execute_peer_joined(&mut self, peer: PeerId) {
        self.peers.insert(peer);
        self.send_message(
            Some(peer),
            &Message::Ping {
                wall_clock_ms: WallClock::now_ms(),
            },
        );
    }

    fn execute_peer_left(&mut self, peer: PeerId) {
        self.peers.remove(peer);
        let Some(my_id) = self.my_id() else { return };

        // Same departure, same election on every remaining peer: exactly
        // one member makes the authoritative announcement, and the
        // broadcast delivers it to everyone else.
        let elected = successor_of(self.peers.ids().chain(std::iter::once(my_id)), peer);
        if elected == Some(my_id) {
            self.execute_local_call(PEER_LEFT_EXPORT, &[CallArg::Number(peer.as_f64())]);
        }
    }

    fn execute_room_state_changed(&mut self, state: RoomState) {
        match state {
            RoomState::Connected => {
                if self.peers.is_empty() {
                    // Single-peer session: nothing to bootstrap from.
                    self.transition(TangleState::Connected);
                } else {
                    self.request_heap();
                }
            }
            RoomState::Joining | RoomState::Disconnected => {
                self.transition(TangleState::Disconnected);
            }
        }
    }

    // Bootstrap

    /// Ask the nearest peer for a full state dump. Callers handle the
    /// no-peer alternative themselves.
    fn request_heap(&mut self) {
        let target = match self.room.as_ref() {
            Some(room) => room.lowest_latency_peer(),
            None => None,
        };
        // The transport may not have measured any latency yet; any member
        // can serve the heap, so fall back to the lowest id rather than
        // stranding the lifecycle outside RequestingHeap.
        let target = target.or_else(|| self.peers.ids().min());
        let Some(target) = target else { return };

        // The ping primes the RTT estimate that heap application halves.
        self.send_message(
            Some(target),
            &Message::Ping {
                wall_clock_ms: WallClock::now_ms(),
            },
        );
        self.send_message(Some(target), &Message::RequestState);
        self.transition(TangleState::RequestingHeap);
    }

    // Pacing

    fn execute_progress_time(&mut self, now_ms: f64) {
        let Some(last_now) = self.last_performance_now else {
            // First tick (or first after reconnecting): set the baseline.
            self.last_performance_now = Some(now_ms);
            return;
        };
        let mut elapsed = now_ms - last_now;

        if let Some(interval) = self.machine.fixed_update_interval() {
            let lag =
                (self.machine.target_time() + elapsed) - self.machine.current_simulation_time();
            if lag > DIVERGENCE_LIMIT_MS {
                // Too far behind to roll forward safely: take one step's
                // worth of time and start over from a fresh heap. A lone
                // peer just absorbs the clock jump.
                elapsed = interval;
                if !self.peers.is_empty() {
                    self.request_heap();
                }
            }
        }

        self.machine.progress_time(elapsed);

        // Simulate under a real-time budget so a lagging peer degrades
        // instead of hanging its embedder.
        let budget_ms = STEP_BUDGET_RATIO * elapsed;
        let budget_start = WallClock::now_ms();
        while self.machine.step() {
            self.machine.take_snapshot();
            if WallClock::now_ms() - budget_start >= budget_ms {
                break;
            }
        }

        // Discard history no peer can still roll us back into.
        let earliest_safe = self
            .peers
            .earliest_received(self.machine.current_simulation_time());
        self.machine
            .remove_history_before(earliest_safe - PRUNE_CUSHION_MS);

        // Quiet peers still need their pruning watermark advanced.
        let target_time = self.machine.target_time();
        for peer in self.peers.keep_alive_due(target_time) {
            self.send_message(Some(peer), &Message::TimeProgressed { time: target_time });
            if let Some(record) = self.peers.get_mut(peer) {
                record.last_sent_message = target_time;
            }
        }

        if elapsed > 0.0 {
            self.message_time_offset = 0.0;
        }
        self.last_performance_now = Some(now_ms);
    }

    // Lifecycle

    fn transition(&mut self, next: TangleState) {
        if self.state == next {
            return;
        }
        self.state = next;
        match next {
            TangleState::Connected | TangleState::Disconnected => {
                // Unset the pacing baseline: the first tick after a
                // transition re-records it, so the bootstrap duration is
                // never counted as elapsed frame time.
                self.last_performance_now = None;
            }
            TangleState::RequestingHeap => {}
        }
        if let Some(callback) = self.on_state_change.as_mut() {
            callback(next);
        }
    }

    // Outgoing data

    fn send_message(&mut self, to: Option<PeerId>, message: &Message) {
        self.outgoing.reset();
        if let Err(err) = message.write(&mut self.outgoing) {
            warn!("failed to frame outgoing {:?} message: {err}", message.kind());
            return;
        }
        let Some(room) = self.room.as_mut() else {
            warn!(
                "dropping outgoing {:?} message: no room attached",
                message.kind()
            );
            return;
        };
        if let Err(err) = room.send(to, self.outgoing.bytes()) {
            warn!("failed to send {:?} message: {err}", message.kind());
        }
    }

    fn send_raw(&mut self, to: Option<PeerId>, payload: &[u8]) {
        let Some(room) = self.room.as_mut() else { return };
        if let Err(err) = room.send(to, payload) {
            warn!("failed to echo datagram: {err}");
        }
    }
}

fn substitute_args(args: &[CallArg], my_id: PeerId) -> Vec<f64> {
    args.iter()
        .map(|arg| match arg {
            CallArg::Number(value) => *value,
            CallArg::UserId => my_id.as_f64(),
        })
        .collect()
}
