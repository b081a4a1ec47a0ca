//! Unbounded tapes and the bank of tapes a multi-tape machine works on.
//!
//! A [`Tape`] stores its cells in a `VecDeque` together with the logical position of the
//! first stored cell, so logical position `p` lives at storage index `p - start`. Storage
//! only grows on writes, by exactly the blank gap between the old boundary and the written
//! cell, in either direction.

use crate::trace::TapeSnapshot;
use crate::types::{Move, Position, Symbol};
use std::collections::VecDeque;
use std::iter;

/// A single tape with one read/write head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: VecDeque<Symbol>,
    /// Logical position of `cells[0]`.
    start: Position,
    head: Position,
    blank: Symbol,
}

impl Tape {
    /// Creates a tape holding a single blank cell under the head.
    pub fn new(blank: Symbol) -> Self {
        Self {
            cells: VecDeque::from([blank]),
            start: 0,
            head: 0,
            blank,
        }
    }

    /// Creates a tape holding `input` from position 0, head on its first symbol.
    pub fn with_input(input: &str, blank: Symbol) -> Self {
        if input.is_empty() {
            return Self::new(blank);
        }

        Self {
            cells: input.chars().collect(),
            start: 0,
            head: 0,
            blank,
        }
    }

    pub fn head(&self) -> Position {
        self.head
    }

    /// Logical position of the first stored cell.
    pub fn start(&self) -> Position {
        self.start
    }

    /// Logical position one past the last stored cell.
    pub fn stop(&self) -> Position {
        self.start + self.cells.len() as Position
    }

    pub fn blank(&self) -> Symbol {
        self.blank
    }

    /// Returns the symbol at any logical position; blank outside the stored cells.
    pub fn at(&self, position: Position) -> Symbol {
        self.index(position)
            .map_or(self.blank, |index| self.cells[index])
    }

    /// Returns the symbol under the head.
    pub fn read(&self) -> Symbol {
        self.at(self.head)
    }

    /// Writes `symbol` under the head, then moves the head. Returns the new head position.
    pub fn write(&mut self, symbol: Symbol, direction: Move) -> Position {
        let head = self.head;
        *self.cell_mut(head) = symbol;
        self.head += direction.offset();
        self.head
    }

    /// The stored contents with leading and trailing blanks trimmed.
    pub fn result(&self) -> String {
        match self.content_bounds() {
            Some((first, last)) => self.cells.range(first..=last).collect(),
            None => String::new(),
        }
    }

    /// The cells from the first to the last non-blank symbol, widened to include the head.
    pub fn snapshot(&self, index: usize) -> TapeSnapshot {
        let (from, to) = match self.content_bounds() {
            Some((first, last)) => (
                (self.start + first as Position).min(self.head),
                (self.start + last as Position).max(self.head),
            ),
            None => (self.head, self.head),
        };

        TapeSnapshot {
            index,
            start: from,
            cells: (from..=to).map(|position| self.at(position)).collect(),
            head: self.head,
        }
    }

    fn index(&self, position: Position) -> Option<usize> {
        if position < self.start || position >= self.stop() {
            return None;
        }
        usize::try_from(position - self.start).ok()
    }

    /// Storage indices of the first and last non-blank cells.
    fn content_bounds(&self) -> Option<(usize, usize)> {
        let first = self.cells.iter().position(|&c| c != self.blank)?;
        let last = self.cells.iter().rposition(|&c| c != self.blank)?;
        Some((first, last))
    }

    fn cell_mut(&mut self, position: Position) -> &mut Symbol {
        let blank = self.blank;

        if position < self.start {
            for _ in position..self.start {
                self.cells.push_front(blank);
            }
            self.start = position;
        } else if position >= self.stop() {
            let missing = position - self.stop() + 1;
            self.cells
                .extend(iter::repeat(blank).take(missing as usize));
        }

        let index = (position - self.start) as usize;
        &mut self.cells[index]
    }
}

/// The ordered tapes of one machine. Tape 0 holds the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapeBank {
    tapes: Vec<Tape>,
}

impl TapeBank {
    /// Creates `tape_count` tapes; tape 0 is seeded with `input`, the others are blank.
    pub fn new(tape_count: usize, input: &str, blank: Symbol) -> Self {
        let tapes = (0..tape_count)
            .map(|i| {
                if i == 0 {
                    Tape::with_input(input, blank)
                } else {
                    Tape::new(blank)
                }
            })
            .collect();

        Self { tapes }
    }

    /// The symbol under each head, in tape order.
    pub fn read_all(&self) -> Vec<Symbol> {
        self.tapes.iter().map(Tape::read).collect()
    }

    /// Writes one symbol and applies one move per tape. Returns the new head positions.
    pub fn write_all(&mut self, symbols: &[Symbol], moves: &[Move]) -> Vec<Position> {
        self.tapes
            .iter_mut()
            .zip(symbols)
            .zip(moves)
            .map(|((tape, &symbol), &direction)| tape.write(symbol, direction))
            .collect()
    }

    /// Tape 0's trimmed contents.
    pub fn result(&self) -> String {
        self.tapes.first().map(Tape::result).unwrap_or_default()
    }

    pub fn heads(&self) -> Vec<Position> {
        self.tapes.iter().map(Tape::head).collect()
    }

    pub fn snapshot(&self) -> Vec<TapeSnapshot> {
        self.tapes
            .iter()
            .enumerate()
            .map(|(index, tape)| tape.snapshot(index))
            .collect()
    }

    pub fn get(&self, index: usize) -> Option<&Tape> {
        self.tapes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tape> {
        self.tapes.iter()
    }

    pub fn len(&self) -> usize {
        self.tapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tapes.is_empty()
    }
}
