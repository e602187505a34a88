use serde::Serialize;
use std::fmt;

/// An inclusive range of slot indices on one core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SlotRange {
    pub start: usize,
    pub end: usize,
}

impl SlotRange {
    /// Range of `len` slots beginning at `start`. `len` must be at least 1.
    pub fn with_len(start: usize, len: usize) -> Self {
        SlotRange { start, end: start + len - 1 }
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }

    pub fn contains(&self, slot: usize) -> bool {
        self.start <= slot && slot <= self.end
    }
}

impl fmt::Display for SlotRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Maximal runs of `true` values in `mask`.
pub fn free_runs(mask: &[bool]) -> Vec<SlotRange> {
    let mut runs = Vec::new();
    let mut run_start: Option<usize> = None;

    for (index, free) in mask.iter().enumerate() {
        match (free, run_start) {
            (true, None) => run_start = Some(index),
            (false, Some(start)) => {
                runs.push(SlotRange { start, end: index - 1 });
                run_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = run_start {
        runs.push(SlotRange { start, end: mask.len() - 1 });
    }

    runs
}
