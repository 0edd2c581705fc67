use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Upper bound of the cosmetic page number.
pub const MAX_PAGE_NUMBER: u32 = 30;

/// Uniform integers in `[0, bound)`. Callers never pass `bound == 0`.
pub trait RandomSource: Send + Sync {
    fn below(&self, bound: usize) -> usize;
}

/// Per-thread OS-seeded RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn below(&self, bound: usize) -> usize {
        rand::thread_rng().gen_range(0..bound)
    }
}

/// Reproducible sequence from a fixed seed.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn below(&self, bound: usize) -> usize {
        self.rng.lock().gen_range(0..bound)
    }
}

/// Replays a fixed script (each value taken modulo the bound), then yields 0.
#[derive(Default)]
pub struct ScriptedRandom {
    values: Mutex<VecDeque<usize>>,
}

impl ScriptedRandom {
    pub fn new(values: impl IntoIterator<Item = usize>) -> Self {
        Self {
            values: Mutex::new(values.into_iter().collect()),
        }
    }

    #[cfg(test)]
    fn remaining(&self) -> usize {
        self.values.lock().len()
    }
}

impl RandomSource for ScriptedRandom {
    fn below(&self, bound: usize) -> usize {
        self.values.lock().pop_front().unwrap_or(0) % bound
    }
}

/// Random-selection policy for the navigator.
#[derive(Clone)]
pub struct Picker {
    rng: Arc<dyn RandomSource>,
}

impl Picker {
    pub fn new(rng: Arc<dyn RandomSource>) -> Self {
        Self { rng }
    }

    /// Uniform index in `[0, total)`; 0 when the size is unknown.
    pub fn index(&self, total: usize) -> usize {
        if total == 0 {
            return 0;
        }
        self.rng.below(total)
    }

    /// Like [`index`](Self::index), but re-rolls once if the result equals
    /// `current`. A second roll may still coincide.
    pub fn next_index(&self, total: usize, current: usize) -> usize {
        let next = self.index(total);
        if next == current && total > 1 {
            return self.index(total);
        }
        next
    }

    /// Cosmetic page number in `[1, MAX_PAGE_NUMBER]`.
    pub fn page_number(&self) -> u32 {
        self.rng.below(MAX_PAGE_NUMBER as usize) as u32 + 1
    }
}

impl Default for Picker {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRandom))
    }
}
