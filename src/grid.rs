use std::collections::HashMap;
use std::fs;
use std::path::Path;

use smallvec::SmallVec;
use thiserror::Error;

use crate::SlotId;

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Across,
    Down,
}

/// A single entry in the grid: a maximal run of two or more open cells in
/// one direction. Two slots are equal iff all four fields match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

impl Slot {
    /// The grid coordinate of the k-th cell of this slot.
    pub fn cell(&self, k: usize) -> (usize, usize) {
        match self.direction {
            Direction::Across => (self.row, self.col + k),
            Direction::Down => (self.row + k, self.col),
        }
    }

    /// Generate the coords for each cell of this slot.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.length).map(move |k| self.cell(k))
    }
}

#[derive(Debug, Error)]
pub enum GridError {
    #[error("structure contains no rows")]
    Empty,
    #[error("structure row {line} does not match the width of the first row")]
    RaggedRow { line: usize },
    #[error("failed to read structure: {0}")]
    Io(#[from] std::io::Error),
}

/// An immutable crossword structure: the open/blocked cells, the slots
/// derived from them, and the crossing map between slot pairs.
#[derive(Debug, Clone)]
pub struct Grid {
    height: usize,
    width: usize,
    /// Row-major; `true` means the cell is open.
    cells: Vec<bool>,
    slots: Vec<Slot>,
    /// Dense `slot_count * slot_count` matrix. `overlaps[a * n + b]` holds
    /// the `(index-in-a, index-in-b)` of the shared cell, symmetric with
    /// the indices swapped for `(b, a)`, `None` where the pair is disjoint.
    overlaps: Vec<Option<(usize, usize)>>,
}

impl Grid {
    /// Parse a structure template: `_` is an open cell, any other character
    /// is blocked. Blank lines are skipped and rows are trimmed, so templates
    /// may be indented; because of the trimming, blocked cells at the edges
    /// of a row must use a non-whitespace glyph such as `#`. All remaining
    /// rows must share one width.
    pub fn parse(text: &str) -> Result<Grid, GridError> {
        let mut rows: Vec<&str> = Vec::new();
        let mut width = 0;

        for (line_idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if rows.is_empty() {
                width = line.chars().count();
            } else if line.chars().count() != width {
                return Err(GridError::RaggedRow { line: line_idx + 1 });
            }
            rows.push(line);
        }

        if rows.is_empty() {
            return Err(GridError::Empty);
        }

        let height = rows.len();
        let mut cells = Vec::with_capacity(height * width);
        for row in &rows {
            cells.extend(row.chars().map(|c| c == '_'));
        }

        let slots = find_slots(&cells, height, width);
        let overlaps = build_overlaps(&slots);

        Ok(Grid {
            height,
            width,
            cells,
            slots,
            overlaps,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Grid, GridError> {
        let text = fs::read_to_string(path)?;
        Grid::parse(&text)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_open(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.width + col]
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, id: SlotId) -> Slot {
        self.slots[id]
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// The shared-cell positions for a pair of slots, or `None` if the
    /// pair never crosses. Self-pairs are `None`.
    pub fn overlap(&self, a: SlotId, b: SlotId) -> Option<(usize, usize)> {
        self.overlaps[a * self.slots.len() + b]
    }

    /// Every slot that crosses the given one, excluding itself.
    pub fn neighbors(&self, slot: SlotId) -> impl Iterator<Item = SlotId> + '_ {
        (0..self.slots.len()).filter(move |&other| self.overlap(slot, other).is_some())
    }

    /// The number of slots crossing the given one.
    pub fn degree(&self, slot: SlotId) -> usize {
        self.neighbors(slot).count()
    }
}

/// Scan the rows and then the columns for maximal open runs of length >= 2.
fn find_slots(cells: &[bool], height: usize, width: usize) -> Vec<Slot> {
    let mut slots = Vec::new();

    for row in 0..height {
        let mut run_start = None;
        for col in 0..=width {
            let open = col < width && cells[row * width + col];
            if open {
                run_start.get_or_insert(col);
            } else if let Some(start) = run_start.take() {
                if col - start >= 2 {
                    slots.push(Slot {
                        row,
                        col: start,
                        direction: Direction::Across,
                        length: col - start,
                    });
                }
            }
        }
    }

    for col in 0..width {
        let mut run_start = None;
        for row in 0..=height {
            let open = row < height && cells[row * width + col];
            if open {
                run_start.get_or_insert(row);
            } else if let Some(start) = run_start.take() {
                if row - start >= 2 {
                    slots.push(Slot {
                        row: start,
                        col,
                        direction: Direction::Down,
                        length: row - start,
                    });
                }
            }
        }
    }

    slots
}

/// Build the dense crossing matrix from the cell coordinates of each slot.
/// At most one across and one down slot can cover any cell.
fn build_overlaps(slots: &[Slot]) -> Vec<Option<(usize, usize)>> {
    let mut entries_by_cell: HashMap<(usize, usize), SmallVec<[(SlotId, usize); 2]>> =
        HashMap::new();

    for (slot_id, slot) in slots.iter().enumerate() {
        for (cell_idx, coord) in slot.cells().enumerate() {
            entries_by_cell.entry(coord).or_default().push((slot_id, cell_idx));
        }
    }

    let n = slots.len();
    let mut overlaps = vec![None; n * n];

    for entries in entries_by_cell.values() {
        debug_assert!(entries.len() <= 2, "more than two slots crossing in one cell");

        for (i, &(a, a_idx)) in entries.iter().enumerate() {
            for &(b, b_idx) in &entries[i + 1..] {
                overlaps[a * n + b] = Some((a_idx, b_idx));
                overlaps[b * n + a] = Some((b_idx, a_idx));
            }
        }
    }

    overlaps
}
