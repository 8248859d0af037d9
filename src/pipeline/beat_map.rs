// The on/off grid behind the sequencer: one row per sound, one column per beat.
//
// Terminology, since it's easy to mix up:
// "tact": one bar. "tact length": beats in a bar (the metre). "tact count": bars in the loop.
// "sample length": tact length * tact count, the number of beats every row has.
//
// Bad indices are never an error here. The UI can click a row that was removed a
// moment ago, so every mutation with a stale index just does nothing.

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BeatMap {
    tact_length: usize,
    tact_count: usize,
    sample_length: usize,
    cells: Vec<Vec<bool>>, // rows in insertion order, each exactly sample_length long
    cursor: usize,
}

impl BeatMap {
    pub fn new(tact_length: usize, tact_count: usize) -> Self {
        let mut map = Self::default();
        map.resize(tact_length, tact_count);
        map
    }

    pub fn tact_length(&self) -> usize {
        self.tact_length
    }

    pub fn tact_count(&self) -> usize {
        self.tact_count
    }

    pub fn sample_length(&self) -> usize {
        self.sample_length
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cell(&self, row: usize, beat: usize) -> bool {
        self.cells
            .get(row)
            .and_then(|r| r.get(beat))
            .copied()
            .unwrap_or(false)
    }

    pub fn toggle(&mut self, row: usize, beat: usize) {
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(beat)) {
            *cell = !*cell;
        }
    }

    /// New geometry; every row is wiped and the cursor goes back to the start.
    pub fn resize(&mut self, tact_length: usize, tact_count: usize) {
        self.tact_length = tact_length;
        self.tact_count = tact_count;
        self.sample_length = tact_length.saturating_mul(tact_count);
        self.cursor = 0;
        self.clear();
    }

    /// Turn every cell off, rows and geometry stay.
    pub fn clear(&mut self) {
        let len = self.sample_length;
        for row in &mut self.cells {
            row.clear();
            row.resize(len, false);
        }
    }

    /// Add a row at the end. A seed pattern is copied positionally; anything past
    /// the sample length is dropped and a short seed is padded with off cells.
    pub fn append(&mut self, seed: Option<&[bool]>) -> usize {
        let mut row = vec![false; self.sample_length];
        if let Some(seed) = seed {
            for (cell, &flag) in row.iter_mut().zip(seed) {
                *cell = flag;
            }
        }
        self.cells.push(row);
        self.cells.len() - 1
    }

    pub fn remove(&mut self, row: usize) -> bool {
        if row < self.cells.len() {
            self.cells.remove(row);
            true
        } else {
            false
        }
    }

    /// Rows that fire at `beat`, in row order.
    pub fn query(&self, beat: usize) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, row)| row.get(beat).copied().unwrap_or(false))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn snapshot(&self) -> Vec<Vec<bool>> {
        self.cells.clone()
    }

    pub fn advance_cursor(&mut self) -> usize {
        if self.sample_length > 0 {
            self.cursor = (self.cursor + 1) % self.sample_length;
        }
        self.cursor
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }
}
