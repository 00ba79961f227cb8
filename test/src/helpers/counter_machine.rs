use tangle_shared::{
    ByteReader, ByteWriter, PeerId, SimTime, TimeMachine, TimeMachineError, TimeStamp,
};

/// Exports the scripted module offers, by index.
const EXPORTS: [&str; 5] = ["inc", "add", "mul", "set", "peer_left"];

const BANNER: &str = "counter-module";

#[derive(Clone, Debug, PartialEq)]
struct AppliedCall {
    time_stamp: TimeStamp,
    function_index: u32,
    args: Vec<f64>,
}

/// A deterministic scripted engine standing in for the real sandboxed
/// module runner.
///
/// State is a single counter plus a log of departed peers. Committed
/// calls live in a history sorted by time stamp, and the visible state is
/// always the fold of that history over the pruned-away base, so a call
/// landing in the past reorders exactly the way a rollback re-execution
/// would. Duplicate time stamps are ignored as re-deliveries.
pub struct CounterMachine {
    fixed_update_interval: Option<SimTime>,
    current_time: SimTime,
    target_time: SimTime,
    base_counter: f64,
    base_departed: Vec<f64>,
    history: Vec<AppliedCall>,
    history_start: SimTime,
    /// Every watermark `remove_history_before` was called with
    pub removed_before: Vec<SimTime>,
    pub snapshots_taken: usize,
    pub heaps_applied: usize,
    pub reverted_calls: usize,
}

impl CounterMachine {
    pub fn new(fixed_update_interval: Option<SimTime>) -> Self {
        Self {
            fixed_update_interval,
            current_time: 0.0,
            target_time: 0.0,
            base_counter: 0.0,
            base_departed: Vec::new(),
            history: Vec::new(),
            history_start: f64::NEG_INFINITY,
            removed_before: Vec::new(),
            snapshots_taken: 0,
            heaps_applied: 0,
            reverted_calls: 0,
        }
    }

    fn fold(&self) -> (f64, Vec<f64>) {
        let mut counter = self.base_counter;
        let mut departed = self.base_departed.clone();
        for call in &self.history {
            Self::apply(&mut counter, &mut departed, call.function_index, &call.args);
        }
        (counter, departed)
    }

    fn apply(counter: &mut f64, departed: &mut Vec<f64>, function_index: u32, args: &[f64]) {
        let arg = args.first().copied().unwrap_or(0.0);
        match function_index {
            0 => *counter += 1.0,
            1 => *counter += arg,
            2 => *counter *= arg,
            3 => *counter = arg,
            4 => departed.push(arg),
            _ => {}
        }
    }

    /// The counter after every committed call.
    pub fn counter(&self) -> f64 {
        self.fold().0
    }

    /// Peer ids the module has been told departed, in commit order.
    pub fn departed(&self) -> Vec<f64> {
        self.fold().1
    }

    /// Committed time stamps, in commit order.
    pub fn history_time_stamps(&self) -> Vec<TimeStamp> {
        self.history.iter().map(|call| call.time_stamp).collect()
    }

    fn memory_image(&self) -> Vec<u8> {
        let mut image = (self.counter() as i64).to_le_bytes().to_vec();
        image.extend_from_slice(BANNER.as_bytes());
        image
    }
}

impl TimeMachine for CounterMachine {
    fn function_export_index(&self, name: &str) -> Option<u32> {
        EXPORTS
            .iter()
            .position(|export| *export == name)
            .map(|position| position as u32)
    }

    fn function_name(&self, index: u32) -> Option<&str> {
        EXPORTS.get(index as usize).copied()
    }

    fn call_with_time_stamp(
        &mut self,
        function_index: u32,
        args: &[f64],
        time_stamp: TimeStamp,
        _authoritative: bool,
    ) -> Result<(), TimeMachineError> {
        if time_stamp.time < self.history_start {
            return Err(TimeMachineError::MissingSnapshot {
                time: time_stamp.time,
            });
        }
        if self
            .history
            .iter()
            .any(|call| call.time_stamp == time_stamp)
        {
            // Duplicate delivery of a call we already committed.
            return Ok(());
        }
        let position = self
            .history
            .partition_point(|call| call.time_stamp < time_stamp);
        self.history.insert(
            position,
            AppliedCall {
                time_stamp,
                function_index,
                args: args.to_vec(),
            },
        );
        Ok(())
    }

    fn call_and_revert(
        &mut self,
        function_index: u32,
        args: &[f64],
    ) -> Result<(), TimeMachineError> {
        let (mut counter, mut departed) = self.fold();
        Self::apply(&mut counter, &mut departed, function_index, args);
        self.reverted_calls += 1;
        Ok(())
    }

    fn progress_time(&mut self, delta_ms: SimTime) {
        self.target_time += delta_ms;
    }

    fn step(&mut self) -> bool {
        match self.fixed_update_interval {
            Some(interval) => {
                if self.current_time + interval > self.target_time {
                    return false;
                }
                self.current_time += interval;
                true
            }
            None => {
                if self.current_time >= self.target_time {
                    return false;
                }
                self.current_time = self.target_time;
                true
            }
        }
    }

    fn take_snapshot(&mut self) {
        self.snapshots_taken += 1;
    }

    fn remove_history_before(&mut self, time: SimTime) {
        self.removed_before.push(time);
        if time <= self.history_start {
            return;
        }
        self.history_start = time;
        let cut = self.history.partition_point(|call| call.time_stamp.time < time);
        for call in self.history.drain(..cut) {
            Self::apply(
                &mut self.base_counter,
                &mut self.base_departed,
                call.function_index,
                &call.args,
            );
        }
    }

    fn target_time(&self) -> SimTime {
        self.target_time
    }

    fn current_simulation_time(&self) -> SimTime {
        self.current_time
    }

    fn fixed_update_interval(&self) -> Option<SimTime> {
        self.fixed_update_interval
    }

    fn encode_heap(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        writer.write_f64(self.current_time);
        writer.write_f64(self.target_time);
        writer.write_f64(self.base_counter);
        writer.write_u32(self.base_departed.len() as u32);
        for departed in &self.base_departed {
            writer.write_f64(*departed);
        }
        writer.write_u32(self.history.len() as u32);
        for call in &self.history {
            writer.write_f64(call.time_stamp.time);
            writer.write_u64(call.time_stamp.player_id.as_u64());
            writer.write_u32(call.function_index);
            writer.write_u8(call.args.len() as u8);
            for arg in &call.args {
                writer.write_f64(*arg);
            }
        }
        writer.into_bytes()
    }

    fn apply_heap(&mut self, heap: &[u8]) -> Result<(), TimeMachineError> {
        let malformed = |err: tangle_shared::CodecError| TimeMachineError::MalformedHeap {
            reason: err.to_string(),
        };
        let mut reader = ByteReader::new(heap);
        let current_time = reader.read_f64().map_err(malformed)?;
        let target_time = reader.read_f64().map_err(malformed)?;
        let base_counter = reader.read_f64().map_err(malformed)?;
        let departed_len = reader.read_u32().map_err(malformed)?;
        let mut base_departed = Vec::with_capacity(departed_len as usize);
        for _ in 0..departed_len {
            base_departed.push(reader.read_f64().map_err(malformed)?);
        }
        let history_len = reader.read_u32().map_err(malformed)?;
        let mut history = Vec::with_capacity(history_len as usize);
        for _ in 0..history_len {
            let time = reader.read_f64().map_err(malformed)?;
            let player_id = PeerId::new(reader.read_u64().map_err(malformed)?);
            let function_index = reader.read_u32().map_err(malformed)?;
            let arg_count = reader.read_u8().map_err(malformed)?;
            let mut args = Vec::with_capacity(arg_count as usize);
            for _ in 0..arg_count {
                args.push(reader.read_f64().map_err(malformed)?);
            }
            history.push(AppliedCall {
                time_stamp: TimeStamp::new(time, player_id),
                function_index,
                args,
            });
        }

        self.current_time = current_time;
        self.target_time = target_time;
        self.base_counter = base_counter;
        self.base_departed = base_departed;
        self.history = history;
        self.heaps_applied += 1;
        Ok(())
    }

    fn read_memory(&self, address: usize, length: usize) -> Vec<u8> {
        let image = self.memory_image();
        let end = (address + length).min(image.len());
        image.get(address..end).map(<[u8]>::to_vec).unwrap_or_default()
    }

    fn read_string(&self, address: usize, length: usize) -> String {
        String::from_utf8_lossy(&self.read_memory(address, length)).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::CounterMachine;
    use tangle_shared::{PeerId, TimeMachine, TimeStamp};

    fn stamp(time: f64, player: u64) -> TimeStamp {
        TimeStamp::new(time, PeerId::new(player))
    }

    #[test]
    fn late_calls_reorder_like_a_rollback() {
        let mut machine = CounterMachine::new(None);
        // add 10 at t=100 arrives first, mul 2 at t=90 arrives late.
        machine
            .call_with_time_stamp(1, &[10.0], stamp(100.0, 1), true)
            .unwrap();
        machine
            .call_with_time_stamp(2, &[2.0], stamp(90.0, 2), true)
            .unwrap();
        // Committed order is (90, mul) then (100, add): 0*2 + 10.
        assert_eq!(machine.counter(), 10.0);
    }

    #[test]
    fn duplicate_time_stamps_are_ignored() {
        let mut machine = CounterMachine::new(None);
        machine
            .call_with_time_stamp(0, &[], stamp(5.0, 1), true)
            .unwrap();
        machine
            .call_with_time_stamp(0, &[], stamp(5.0, 1), true)
            .unwrap();
        assert_eq!(machine.counter(), 1.0);
    }

    #[test]
    fn heap_round_trip_reproduces_state() {
        let mut machine = CounterMachine::new(Some(16.0));
        machine
            .call_with_time_stamp(1, &[3.0], stamp(10.0, 1), true)
            .unwrap();
        machine
            .call_with_time_stamp(4, &[7.0], stamp(20.0, 1), true)
            .unwrap();
        machine.progress_time(50.0);

        let mut other = CounterMachine::new(Some(16.0));
        other.apply_heap(&machine.encode_heap()).unwrap();

        assert_eq!(other.counter(), machine.counter());
        assert_eq!(other.departed(), machine.departed());
        assert_eq!(other.target_time(), machine.target_time());
    }

    #[test]
    fn pruning_folds_history_without_changing_state() {
        let mut machine = CounterMachine::new(None);
        machine
            .call_with_time_stamp(1, &[5.0], stamp(10.0, 1), true)
            .unwrap();
        machine
            .call_with_time_stamp(2, &[3.0], stamp(20.0, 1), true)
            .unwrap();
        assert_eq!(machine.counter(), 15.0);

        machine.remove_history_before(15.0);
        assert_eq!(machine.counter(), 15.0);
        assert_eq!(machine.history_time_stamps().len(), 1);

        // A call from before the pruned horizon can no longer roll back.
        let err = machine
            .call_with_time_stamp(0, &[], stamp(10.0, 2), true)
            .unwrap_err();
        assert!(matches!(
            err,
            tangle_shared::TimeMachineError::MissingSnapshot { .. }
        ));
    }

    #[test]
    fn fixed_steps_stop_at_the_target() {
        let mut machine = CounterMachine::new(Some(16.0));
        machine.progress_time(40.0);
        assert!(machine.step());
        assert!(machine.step());
        // 32ms simulated; the remaining 8ms is less than one interval.
        assert!(!machine.step());
        assert_eq!(machine.current_simulation_time(), 32.0);
    }

    #[test]
    fn memory_exposes_counter_and_banner() {
        let mut machine = CounterMachine::new(None);
        machine
            .call_with_time_stamp(0, &[], stamp(0.0, 1), true)
            .unwrap();
        assert_eq!(machine.read_memory(0, 4), vec![1, 0, 0, 0]);
        assert_eq!(machine.read_string(8, 14), "counter-module");
    }
}
