//! Run tracing: snapshots of a machine at step boundaries, the [`Observer`] hook the
//! simulator reports them through, and a [`Reporter`] that renders a run as text.
//!
//! The simulator never prints anything itself. Callers decide where snapshots go by
//! passing an observer to [`crate::Simulator::run_with`].

use crate::types::{Position, State, Status, Symbol};
use serde::Serialize;
use std::io::{self, Write};

const RUN_BANNER: &str = "==================== RUN ====================";
const ERR_BANNER: &str = "==================== ERR ====================";
const END_BANNER: &str = "==================== END ====================";
const SEPARATOR: &str = "---------------------------------------------";
const INPUT_LABEL: &str = "Input: ";

/// The visible window of one tape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TapeSnapshot {
    /// Index of the tape in its bank.
    pub index: usize,
    /// Logical position of `cells[0]`.
    pub start: Position,
    pub cells: Vec<Symbol>,
    pub head: Position,
}

/// The machine at a step boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Transitions applied so far.
    pub step: usize,
    pub state: State,
    pub tapes: Vec<TapeSnapshot>,
}

/// Receives progress from a running simulator. Every hook defaults to doing nothing.
pub trait Observer {
    /// Called with the initial configuration and after every applied transition.
    fn on_step(&mut self, _snapshot: &Snapshot) {}

    /// Called once the machine accepted or got stuck, with tape 0's result.
    fn on_halt(&mut self, _status: Status, _result: &str) {}
}

impl Observer for () {}

/// Collects every snapshot of a run.
impl Observer for Vec<Snapshot> {
    fn on_step(&mut self, snapshot: &Snapshot) {
        self.push(snapshot.clone());
    }
}

/// Renders a run in the verbose text format:
///
/// ```text
/// Input: 11
/// ==================== RUN ====================
/// Step   : 0
/// State  : q0
/// Index0 : 0 1
/// Tape0  : 1 1
/// Head0  : ^
/// ---------------------------------------------
/// Result: 111
/// ==================== END ====================
/// ```
///
/// Write failures do not interrupt the run; the first one is returned by
/// [`Reporter::finish`].
pub struct Reporter<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// Prints the banner that opens a run.
    pub fn start(&mut self, input: &str) {
        self.emit(&format!("{INPUT_LABEL}{input}\n{RUN_BANNER}"));
    }

    /// Prints a diagnostic pointing at the first undeclared input symbol.
    pub fn illegal_input(&mut self, input: &str, symbol: Symbol, position: usize) {
        let caret = " ".repeat(INPUT_LABEL.len() + position);
        self.emit(&format!(
            "{INPUT_LABEL}{input}\n{ERR_BANNER}\n\
             error: '{symbol}' was not declared in the set of input symbols\n\
             {INPUT_LABEL}{input}\n{caret}^\n{END_BANNER}"
        ));
    }

    /// Returns the writer, or the first write error encountered.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn emit(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = writeln!(self.out, "{text}") {
            self.error = Some(error);
        }
    }
}

impl<W: Write> Observer for Reporter<W> {
    fn on_step(&mut self, snapshot: &Snapshot) {
        self.emit(&render_snapshot(snapshot));
    }

    fn on_halt(&mut self, _status: Status, result: &str) {
        self.emit(&format!("Result: {result}\n{END_BANNER}"));
    }
}

/// Renders the `Step`/`State` block followed by every tape.
pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let tapes: Vec<String> = snapshot.tapes.iter().map(render_tape).collect();
    format!(
        "Step   : {}\nState  : {}\n{}\n{SEPARATOR}",
        snapshot.step,
        snapshot.state,
        tapes.join("\n")
    )
}

/// Renders one tape as three aligned lines: logical indices, symbols, and the head marker.
pub fn render_tape(tape: &TapeSnapshot) -> String {
    let mut indices = Vec::with_capacity(tape.cells.len());
    let mut symbols = Vec::with_capacity(tape.cells.len());
    let mut marker = Vec::with_capacity(tape.cells.len());

    for (position, symbol) in (tape.start..).zip(&tape.cells) {
        let index = position.to_string();
        let width = index.len();
        let head = if position == tape.head { "^" } else { "" };

        symbols.push(format!("{symbol:<width$}"));
        marker.push(format!("{head:<width$}"));
        indices.push(index);
    }

    let i = tape.index;
    format!(
        "Index{i} : {}\nTape{i}  : {}\nHead{i}  : {}",
        indices.join(" ").trim_end(),
        symbols.join(" ").trim_end(),
        marker.join(" ").trim_end()
    )
}
