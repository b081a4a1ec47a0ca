//! This module defines the `Simulator`, which runs a validated machine definition on one
//! input string. It owns the tape bank and the current state, applies one transition per
//! step, and decides acceptance.

use crate::definition::Definition;
use crate::tape::TapeBank;
use crate::trace::{Observer, Snapshot};
use crate::types::{Action, Config, State, Status, Symbol, TuringMachineError};
use tracing::{debug, info, warn};

/// A single run of a machine on one input.
///
/// The simulator is created in the [`Status::Running`] state and moves to
/// [`Status::Accepted`] or [`Status::Stopped`] exactly once. Both are terminal.
#[derive(Debug, Clone)]
pub struct Simulator {
    definition: Definition,
    config: Config,
    input: String,
    state: State,
    tapes: TapeBank,
    step_count: usize,
    status: Status,
}

impl Simulator {
    /// Prepares a run of `definition` on `input`.
    ///
    /// # Returns
    ///
    /// * `Ok(Simulator)` positioned at step 0 in the initial state.
    /// * `Err(TuringMachineError::IllegalInput)` naming the first input character outside the
    ///   input alphabet and its character offset.
    pub fn of(definition: Definition, input: &str) -> Result<Self, TuringMachineError> {
        if let Some((position, symbol)) = input
            .chars()
            .enumerate()
            .find(|&(_, symbol)| !definition.is_input_symbol(symbol))
        {
            return Err(TuringMachineError::IllegalInput { symbol, position });
        }

        let tapes = TapeBank::new(definition.tape_count(), input, definition.blank());

        Ok(Self {
            state: definition.initial_state().to_string(),
            definition,
            config: Config::default(),
            input: input.to_string(),
            tapes,
            step_count: 0,
            status: Status::Running,
        })
    }

    /// Replaces the run configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Applies at most one transition.
    ///
    /// A machine in a final state accepts before any lookup, so transitions leaving a
    /// final state never fire. A machine with no matching transition stops.
    pub fn step(&mut self) -> Status {
        self.advance(None).unwrap_or(self.status)
    }

    /// One step that refuses to apply a transition once `limit` transitions have run.
    ///
    /// Returns `None` if a transition matched but the limit held it back. The heads are
    /// read and the table is consulted once either way.
    fn advance(&mut self, limit: Option<usize>) -> Option<Status> {
        if self.status.is_terminal() {
            return Some(self.status);
        }

        if self.definition.is_final(&self.state) {
            self.status = Status::Accepted;
            return Some(self.status);
        }

        let symbols = self.tapes.read_all();
        let Some(action) = self.definition.table().get(&self.state, &symbols) else {
            self.status = Status::Stopped;
            return Some(self.status);
        };

        if limit.is_some_and(|limit| self.step_count >= limit) {
            return None;
        }

        let heads = self.tapes.write_all(&action.write, &action.moves);
        self.step_count += 1;

        debug!(
            step = self.step_count,
            from = %self.state,
            to = %action.next_state,
            read = ?symbols,
            write = ?action.write,
            heads = ?heads,
            "applied transition"
        );

        self.state.clone_from(&action.next_state);

        Some(self.status)
    }

    /// Runs the machine until it halts.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` holding tape 0's trimmed contents if the machine accepted.
    /// * `Err(TuringMachineError::NotAccepted)` if it stopped in a non-final state.
    /// * `Err(TuringMachineError::StepLimitExceeded)` if a step limit is configured and the
    ///   machine could still move once the limit was reached.
    pub fn run(&mut self) -> Result<String, TuringMachineError> {
        self.run_with(&mut ())
    }

    /// Runs the machine until it halts, reporting every step boundary to `observer`.
    ///
    /// The observer sees the initial configuration, one snapshot after each applied
    /// transition, and finally the halting status with tape 0's contents. A run cut off by
    /// the step limit does not report a halt.
    pub fn run_with<O: Observer + ?Sized>(
        &mut self,
        observer: &mut O,
    ) -> Result<String, TuringMachineError> {
        observer.on_step(&self.snapshot());

        while self.status == Status::Running {
            match self.advance(self.config.step_limit) {
                Some(Status::Running) => observer.on_step(&self.snapshot()),
                Some(_) => {}
                None => {
                    let limit = self.step_count;
                    warn!(limit, state = %self.state, "step limit exceeded");
                    return Err(TuringMachineError::StepLimitExceeded(limit));
                }
            }
        }

        let result = self.result();
        observer.on_halt(self.status, &result);

        match self.status {
            Status::Accepted => {
                info!(steps = self.step_count, state = %self.state, "input accepted");
                Ok(result)
            }
            Status::Running | Status::Stopped => {
                let symbols: String = self.symbols().into_iter().collect();
                info!(
                    steps = self.step_count,
                    state = %self.state,
                    symbols = %symbols,
                    "input not accepted"
                );
                Err(TuringMachineError::NotAccepted {
                    state: self.state.clone(),
                    symbols,
                    result,
                })
            }
        }
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Number of transitions applied so far.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tapes(&self) -> &TapeBank {
        &self.tapes
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// The symbol under each head, in tape order.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.tapes.read_all()
    }

    /// The action the next step would apply, if any.
    ///
    /// This does not account for acceptance: a final state may still have a matching
    /// transition that [`Simulator::step`] will never apply.
    pub fn transition(&self) -> Option<&Action> {
        self.definition.table().get(&self.state, &self.symbols())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            step: self.step_count,
            state: self.state.clone(),
            tapes: self.tapes.snapshot(),
        }
    }

    /// Tape 0's contents with surrounding blanks trimmed.
    pub fn result(&self) -> String {
        self.tapes.result()
    }
}
