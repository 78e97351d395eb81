//! The live heapviz session.
//!
//! A [`Session`] owns the authoritative heap and runs user operations one at
//! a time. Submitted commands wait in a FIFO queue; the head of the queue
//! becomes the in-flight operation, whose trace is computed only when it
//! starts. Each [`Session::tick`] pulls one step from that trace and applies
//! it to the live array, so every intermediate state is observable.

mod command;
mod pacer;

pub use command::{CommandError, HeapCommand, parse_script};
pub use pacer::{NoPacer, Pacer, SleepPacer};

use heapviz_config::{ConfigError, VisualizerConfig};
use heapviz_emitter::{Emitter, Event};
use heapviz_trace::{Step, Steps};
use heapviz_engine::{
    Heap, Trace, Value, clear, extract_root, heapify, insert, set_branching_factor, set_order,
};
use heapviz_logging::{LogEntry, LogLevel, OperationLog};
use heapviz_random::HeapGenerator;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const COMPONENT: &str = "session";

/// Notifications published by a [`Session`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// An operation left the queue.
    Started { command: HeapCommand },
    /// One step was applied to the live array.
    Step { step: Step, highlights: Vec<usize> },
    /// The heap's version moved.
    Changed { version: u64 },
    /// A root was removed.
    Extracted { value: Value },
    /// An operation completed (or was fast-forwarded).
    Finished { command: HeapCommand },
    Log { entry: LogEntry },
    /// Queued operations were dropped.
    Cancelled { dropped: usize },
}

impl Event for SessionEvent {
    fn name(&self) -> &'static str {
        match self {
            SessionEvent::Started { .. } => "started",
            SessionEvent::Step { .. } => "step",
            SessionEvent::Changed { .. } => "changed",
            SessionEvent::Extracted { .. } => "extracted",
            SessionEvent::Finished { .. } => "finished",
            SessionEvent::Log { .. } => "log",
            SessionEvent::Cancelled { .. } => "cancelled",
        }
    }
}

#[derive(Debug)]
struct InFlight {
    command: HeapCommand,
    steps: Steps<Value>,
    /// Array to install once the old root's highlight has been shown.
    staged: Option<Vec<Value>>,
    yielded: usize,
    completion: Option<&'static str>,
}

/// Single owner of the live heap.
#[derive(Debug)]
pub struct Session {
    heap: Heap,
    pending: VecDeque<HeapCommand>,
    in_flight: Option<InFlight>,
    highlights: Vec<usize>,
    log: OperationLog,
    emitter: Emitter<SessionEvent>,
    generator: HeapGenerator,
    last_extracted: Option<Value>,
    seen_version: u64,
}

impl Session {
    /// Start an empty session.
    pub fn new(config: &VisualizerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let heap = Heap::new(config.branching_factor()?, config.order);
        Self::from_heap(heap, config)
    }

    /// Start from an existing heap. The heap's own `d` and order win over
    /// the configured ones.
    pub fn from_heap(heap: Heap, config: &VisualizerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            seen_version: heap.version(),
            heap,
            pending: VecDeque::new(),
            in_flight: None,
            highlights: Vec::new(),
            log: OperationLog::new(config.log_capacity),
            emitter: Emitter::new(),
            generator: HeapGenerator::from_config(&config.random),
            last_extracted: None,
        })
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Indices highlighted by the most recent step.
    pub fn highlights(&self) -> &[usize] {
        &self.highlights
    }

    pub fn log(&self) -> &OperationLog {
        &self.log
    }

    pub fn last_extracted(&self) -> Option<Value> {
        self.last_extracted
    }

    /// The operation currently being played, if any.
    pub fn current(&self) -> Option<HeapCommand> {
        self.in_flight.as_ref().map(|f| f.command)
    }

    /// Commands waiting behind the current one, in run order.
    pub fn pending(&self) -> impl Iterator<Item = &HeapCommand> {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight.is_none() && self.pending.is_empty()
    }

    /// Subscribe to one kind of [`SessionEvent`] (see [`Event::name`]).
    pub fn on<F>(&mut self, event: &'static str, callback: F)
    where
        F: FnMut(&SessionEvent) + Send + 'static,
    {
        self.emitter.on(event, callback);
    }

    /// Subscribe to every [`SessionEvent`].
    pub fn on_any<F>(&mut self, callback: F)
    where
        F: FnMut(&SessionEvent) + Send + 'static,
    {
        self.emitter.on_any(callback);
    }

    /// Queue a command. Returns the number of commands now waiting.
    pub fn submit(&mut self, command: HeapCommand) -> usize {
        self.pending.push_back(command);
        self.pending.len()
    }

    /// Parse and queue a script. On a parse error nothing is queued and a
    /// warning is logged.
    pub fn submit_input(&mut self, input: &str) -> Result<usize, CommandError> {
        match parse_script(input) {
            Ok(commands) => {
                let count = commands.len();
                self.pending.extend(commands);
                Ok(count)
            }
            Err(err) => {
                self.record(LogLevel::Warn, format!("Invalid input: {err}"));
                Err(err)
            }
        }
    }

    /// Apply the next step, starting queued operations as needed.
    ///
    /// Operations without steps (clear, configuration changes, extraction
    /// from an empty heap) complete inside this call. Returns `None` once
    /// the queue is drained.
    pub fn tick(&mut self) -> Option<Step> {
        loop {
            if self.in_flight.is_none() {
                let command = self.pending.pop_front()?;
                self.start(command);
                continue;
            }
            if let Some(step) = self.advance() {
                return Some(step);
            }
        }
    }

    /// Play until idle, pausing after every step. Returns the number of
    /// steps applied.
    pub fn run(&mut self, pacer: &mut impl Pacer) -> usize {
        let mut applied = 0;
        while let Some(step) = self.tick() {
            applied += 1;
            pacer.pause(&step);
        }
        applied
    }

    /// Queue one command and play until idle.
    pub fn execute(&mut self, command: HeapCommand, pacer: &mut impl Pacer) -> usize {
        self.submit(command);
        self.run(pacer)
    }

    /// Fast-forward the in-flight operation to its final array and drop
    /// everything still queued. Returns the number of dropped commands.
    pub fn cancel(&mut self) -> usize {
        if self.is_idle() {
            return 0;
        }

        if let Some(flight) = self.in_flight.take() {
            let elements = flight.steps.finish();
            if elements != self.heap.elements() {
                self.heap.replace_elements(elements);
                self.notify_changed();
            }
            self.highlights.clear();
            if let Some(message) = flight.completion {
                self.record(LogLevel::Info, message);
            }
            self.emitter.emit(&SessionEvent::Finished {
                command: flight.command,
            });
        }

        let dropped = self.pending.len();
        self.pending.clear();
        self.record(
            LogLevel::Info,
            format!("Cancelled; dropped {dropped} queued operations"),
        );
        self.emitter.emit(&SessionEvent::Cancelled { dropped });
        dropped
    }

    fn start(&mut self, command: HeapCommand) {
        self.emitter.emit(&SessionEvent::Started { command });
        match command {
            HeapCommand::Insert(value) => {
                self.record(LogLevel::Info, format!("Inserted value: {value}"));
                let (_, trace) = insert(self.heap.clone(), value);
                self.heap.replace_elements(trace.initial().to_vec());
                self.notify_changed();
                self.begin(command, &trace, None, None);
            }
            HeapCommand::Extract => match extract_root(self.heap.clone()) {
                Ok((value, _, trace)) => {
                    self.last_extracted = Some(value);
                    self.record(
                        LogLevel::Info,
                        format!(
                            "Extracted {} value: {value}",
                            self.heap.order().extreme_name()
                        ),
                    );
                    self.emitter.emit(&SessionEvent::Extracted { value });
                    let staged = trace.initial().to_vec();
                    self.begin(command, &trace, Some(staged), None);
                }
                Err(err) => {
                    self.record(LogLevel::Warn, format!("{err}, nothing to extract"));
                    self.end_instant(command);
                }
            },
            HeapCommand::Heapify => self.start_heapify(command),
            HeapCommand::Random => {
                let values = self.generator.values();
                let count = values.len();
                self.heap.replace_elements(values);
                self.highlights.clear();
                self.notify_changed();
                self.record(
                    LogLevel::Info,
                    format!("Generated random heap with {count} elements"),
                );
                self.start_heapify(command);
            }
            HeapCommand::Clear => {
                self.heap = clear(std::mem::take(&mut self.heap));
                self.highlights.clear();
                self.log.clear();
                self.notify_changed();
                self.record(LogLevel::Info, "Heap cleared");
                self.end_instant(command);
            }
            HeapCommand::SetBranchingFactor(d) => {
                self.heap = set_branching_factor(std::mem::take(&mut self.heap), d);
                self.notify_changed();
                self.record(LogLevel::Info, format!("Branching factor set to {d}"));
                self.end_instant(command);
            }
            HeapCommand::SetOrder(order) => {
                self.heap = set_order(std::mem::take(&mut self.heap), order);
                self.notify_changed();
                self.record(LogLevel::Info, format!("Heap type set to {order}-heap"));
                self.end_instant(command);
            }
        }
    }

    fn start_heapify(&mut self, command: HeapCommand) {
        if self.heap.len() <= 1 {
            self.end_instant(command);
            return;
        }
        self.record(LogLevel::Info, "Starting heapify operation");
        let (_, trace) = heapify(self.heap.clone());
        self.begin(command, &trace, None, Some("Heapify operation completed"));
    }

    fn begin(
        &mut self,
        command: HeapCommand,
        trace: &Trace,
        staged: Option<Vec<Value>>,
        completion: Option<&'static str>,
    ) {
        self.in_flight = Some(InFlight {
            command,
            steps: trace.steps(),
            staged,
            yielded: 0,
            completion,
        });
    }

    fn end_instant(&mut self, command: HeapCommand) {
        self.emitter.emit(&SessionEvent::Finished { command });
    }

    /// Pull one step from the in-flight trace, or finish it.
    fn advance(&mut self) -> Option<Step> {
        let flight = self.in_flight.as_mut()?;
        let step = flight.steps.next();
        let install = if flight.yielded > 0 || step.is_none() {
            flight.staged.take()
        } else {
            None
        };
        if step.is_some() {
            flight.yielded += 1;
        }

        if let Some(elements) = install {
            self.heap.replace_elements(elements);
            self.notify_changed();
        }

        match step {
            Some(step) => {
                self.play(step);
                Some(step)
            }
            None => {
                self.finish();
                None
            }
        }
    }

    fn play(&mut self, step: Step) {
        self.heap.apply(&step);
        match step {
            Step::Compare(a, b) | Step::Swap(a, b) => {
                self.highlights = if a == b { vec![a] } else { vec![a, b] };
            }
            Step::Done => self.highlights.clear(),
        }
        if let Step::Swap(a, b) = step {
            let elements = self.heap.elements();
            let message = format!("Swapped {} and {}", elements[b], elements[a]);
            self.record(LogLevel::Debug, message);
        }
        if self.emitter.has_listeners("step") {
            self.emitter.emit(&SessionEvent::Step {
                step,
                highlights: self.highlights.clone(),
            });
        }
        self.notify_changed();
    }

    fn finish(&mut self) {
        let Some(flight) = self.in_flight.take() else {
            return;
        };
        self.highlights.clear();
        if let Some(message) = flight.completion {
            self.record(LogLevel::Info, message);
        }
        self.emitter.emit(&SessionEvent::Finished {
            command: flight.command,
        });
    }

    fn record(&mut self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry::with_component(level, COMPONENT, message);
        if self.emitter.has_listeners("log") {
            self.log.push(entry.clone());
            self.emitter.emit(&SessionEvent::Log { entry });
        } else {
            self.log.push(entry);
        }
    }

    fn notify_changed(&mut self) {
        let version = self.heap.version();
        if version != self.seen_version {
            self.seen_version = version;
            self.emitter.emit(&SessionEvent::Changed { version });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapviz_core::{BranchingFactor, HeapOrder};
    use std::sync::{Arc, Mutex};

    fn config() -> VisualizerConfig {
        let mut config = VisualizerConfig {
            step_delay_ms: 0,
            log_capacity: 64,
            ..Default::default()
        };
        config.random.seed = Some(7);
        config
    }

    fn session() -> Session {
        Session::new(&config()).unwrap()
    }

    fn recorder(session: &mut Session) -> Arc<Mutex<Vec<SessionEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        session.on_any(move |e| sink.lock().unwrap().push(e.clone()));
        events
    }

    #[test]
    fn rejects_invalid_config() {
        let config = VisualizerConfig {
            branching_factor: 1,
            ..Default::default()
        };
        assert_eq!(
            Session::new(&config).unwrap_err(),
            ConfigError::BranchingFactor(1)
        );
    }

    #[test]
    fn inserts_play_to_a_valid_heap() {
        let mut s = session();
        s.submit_input("insert 5; insert 3; insert 8; insert 1")
            .unwrap();
        s.run(&mut NoPacer);
        assert_eq!(s.heap().elements(), &[1, 3, 8, 5]);
        assert!(s.is_idle());
        assert!(s.highlights().is_empty());
    }

    #[test]
    fn trace_is_computed_when_the_operation_starts() {
        let mut s = session();
        s.submit(HeapCommand::Insert(5));
        s.submit(HeapCommand::Insert(1));
        // The second insert sees the array left by the first.
        s.run(&mut NoPacer);
        assert_eq!(s.heap().elements(), &[1, 5]);
    }

    #[test]
    fn ticks_expose_intermediate_arrays() {
        let mut s = session();
        for v in [3, 5, 8] {
            s.execute(HeapCommand::Insert(v), &mut NoPacer);
        }
        s.submit(HeapCommand::Insert(1));

        assert_eq!(s.tick(), Some(Step::Compare(3, 1)));
        assert_eq!(s.heap().elements(), &[3, 5, 8, 1]);
        assert_eq!(s.highlights(), &[3, 1]);
        assert_eq!(s.current(), Some(HeapCommand::Insert(1)));

        assert_eq!(s.tick(), Some(Step::Swap(3, 1)));
        assert_eq!(s.heap().elements(), &[3, 1, 8, 5]);
        assert_eq!(s.log().messages()[0], "Swapped 1 and 5");

        assert_eq!(s.tick(), Some(Step::Compare(1, 0)));
        assert_eq!(s.tick(), Some(Step::Swap(1, 0)));
        assert_eq!(s.tick(), Some(Step::Done));
        assert!(s.highlights().is_empty());
        assert_eq!(s.tick(), None);
        assert_eq!(s.heap().elements(), &[1, 3, 8, 5]);
    }

    #[test]
    fn extraction_highlights_old_root_then_new_root() {
        let mut s = session();
        s.submit_input("5;3;8;1").unwrap();
        s.run(&mut NoPacer);

        s.submit(HeapCommand::Extract);
        assert_eq!(s.tick(), Some(Step::Compare(0, 0)));
        assert_eq!(s.heap().elements(), &[1, 3, 8, 5]);
        assert_eq!(s.highlights(), &[0]);

        assert_eq!(s.tick(), Some(Step::Compare(0, 0)));
        assert_eq!(s.heap().elements(), &[5, 3, 8]);
        assert_eq!(s.highlights(), &[0]);

        assert_eq!(s.tick(), Some(Step::Compare(0, 1)));
        assert_eq!(s.heap().elements(), &[5, 3, 8]);

        s.run(&mut NoPacer);
        assert_eq!(s.heap().elements(), &[3, 5, 8]);
        assert_eq!(s.last_extracted(), Some(1));
        assert!(s.log().messages().contains(&"Extracted minimum value: 1"));
    }

    #[test]
    fn extracting_the_last_element_empties_heap() {
        let mut s = session();
        s.execute(HeapCommand::Insert(4), &mut NoPacer);
        let applied = s.execute(HeapCommand::Extract, &mut NoPacer);
        assert_eq!(applied, 2);
        assert!(s.heap().is_empty());
    }

    #[test]
    fn extracting_from_empty_warns() {
        let mut s = session();
        let events = recorder(&mut s);
        let applied = s.execute(HeapCommand::Extract, &mut NoPacer);
        assert_eq!(applied, 0);
        assert_eq!(s.log().filter_by_level(LogLevel::Warn).len(), 1);
        assert_eq!(s.log().messages()[0], "Heap is empty, nothing to extract");
        assert!(
            !events
                .lock()
                .unwrap()
                .iter()
                .any(|e| matches!(e, SessionEvent::Changed { .. }))
        );
    }

    #[test]
    fn invalid_input_is_logged_and_not_queued() {
        let mut s = session();
        let err = s.submit_input("insert 1; insert abc").unwrap_err();
        assert_eq!(err, CommandError::InvalidNumber("abc".into()));
        assert_eq!(s.pending_len(), 0);
        assert_eq!(
            s.log().messages(),
            vec!["Invalid input: please enter a valid number, got `abc`"]
        );
    }

    #[test]
    fn random_generates_then_heapifies() {
        let mut s = session();
        s.execute(HeapCommand::Random, &mut NoPacer);
        let len = s.heap().len();
        assert!((5..=14).contains(&len));
        assert!(s.heap().is_valid());

        let messages = s.log().messages();
        assert!(messages.contains(&"Heapify operation completed"));
        assert!(
            messages
                .iter()
                .any(|m| *m == format!("Generated random heap with {len} elements"))
        );
    }

    #[test]
    fn seeded_random_is_reproducible() {
        let mut a = session();
        let mut b = session();
        a.execute(HeapCommand::Random, &mut NoPacer);
        b.execute(HeapCommand::Random, &mut NoPacer);
        assert_eq!(a.heap().elements(), b.heap().elements());
    }

    #[test]
    fn clear_resets_heap_and_log() {
        let mut s = session();
        s.submit_input("insert 2; insert 1; clear").unwrap();
        s.run(&mut NoPacer);
        assert!(s.heap().is_empty());
        assert_eq!(s.log().messages(), vec!["Heap cleared"]);
    }

    #[test]
    fn configuration_commands_apply_in_order() {
        let mut s = session();
        s.submit_input("1; 2; 3; order max; heapify; d 3").unwrap();
        s.run(&mut NoPacer);
        assert_eq!(s.heap().order(), HeapOrder::Max);
        assert_eq!(s.heap().branching_factor(), BranchingFactor::new(3).unwrap());
        assert_eq!(s.heap().root(), Some(3));
    }

    #[test]
    fn operations_never_interleave() {
        let mut s = session();
        let events = recorder(&mut s);
        s.submit_input("random; insert 50; extract; heapify; insert -1")
            .unwrap();
        s.run(&mut NoPacer);

        let mut open: Option<HeapCommand> = None;
        let mut started = Vec::new();
        for event in events.lock().unwrap().iter() {
            match event {
                SessionEvent::Started { command } => {
                    assert!(open.is_none(), "{command} started while {open:?} running");
                    open = Some(*command);
                    started.push(*command);
                }
                SessionEvent::Finished { command } => {
                    assert_eq!(open.take(), Some(*command));
                }
                SessionEvent::Step { .. } => assert!(open.is_some()),
                _ => {}
            }
        }
        assert!(open.is_none());
        assert_eq!(
            started,
            vec![
                HeapCommand::Random,
                HeapCommand::Insert(50),
                HeapCommand::Extract,
                HeapCommand::Heapify,
                HeapCommand::Insert(-1),
            ]
        );
        assert!(s.heap().is_valid());
    }

    #[test]
    fn cancel_fast_forwards_and_drops_queue() {
        let mut s = session();
        s.submit_input("9; 8; 7; 6; 5; 4").unwrap();
        s.run(&mut NoPacer);
        s.submit_input("extract; insert 0; insert 1").unwrap();

        assert_eq!(s.heap().elements(), &[4, 6, 5, 9, 7, 8]);
        assert_eq!(s.tick(), Some(Step::Compare(0, 0)));
        assert_eq!(s.tick(), Some(Step::Compare(0, 0)));
        assert_eq!(s.heap().elements(), &[8, 6, 5, 9, 7]);
        assert_eq!(s.tick(), Some(Step::Compare(0, 2)));
        let dropped = s.cancel();

        assert_eq!(dropped, 2);
        assert!(s.is_idle());
        assert!(s.heap().is_valid());
        assert_eq!(s.heap().elements().len(), 5);
        assert_eq!(s.heap().root(), Some(5));
        assert!(s.highlights().is_empty());
    }

    #[test]
    fn cancel_while_idle_is_a_no_op() {
        let mut s = session();
        assert_eq!(s.cancel(), 0);
        assert!(s.log().is_empty());
    }

    #[test]
    fn changed_events_follow_versions() {
        let mut s = session();
        let versions = Arc::new(Mutex::new(Vec::new()));
        {
            let versions = versions.clone();
            s.on("changed", move |e| {
                if let SessionEvent::Changed { version } = e {
                    versions.lock().unwrap().push(*version);
                }
            });
        }
        s.submit_input("2; 1").unwrap();
        s.run(&mut NoPacer);

        let versions = versions.lock().unwrap();
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(versions.last().copied(), Some(s.heap().version()));
    }

    #[test]
    fn step_listeners_see_every_step() {
        let mut s = session();
        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let seen = seen.clone();
            s.on("step", move |e| {
                if let SessionEvent::Step { step, .. } = e {
                    seen.lock().unwrap().push(*step);
                }
            });
        }
        s.submit_input("2; 1").unwrap();
        let applied = s.run(&mut NoPacer);
        assert_eq!(seen.lock().unwrap().len(), applied);
        // Nobody listens for log events, but the log is still kept.
        assert_eq!(s.log().messages()[0], "Swapped 1 and 2");
    }

    #[test]
    fn pacer_sees_every_step() {
        let mut s = session();
        let mut paced = Vec::new();
        s.submit_input("3; 1").unwrap();
        let applied = s.run(&mut |step: &Step| paced.push(*step));
        assert_eq!(applied, paced.len());
        assert_eq!(paced.last(), Some(&Step::Done));
    }

    #[test]
    fn events_serialize_with_kind() {
        let event = SessionEvent::Step {
            step: Step::Swap(1, 0),
            highlights: vec![1, 0],
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"event":"step","step":{"step":"swap","indices":[1,0]},"highlights":[1,0]}"#
        );
    }
}
