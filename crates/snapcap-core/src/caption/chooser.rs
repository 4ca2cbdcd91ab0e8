//! Random template selection.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::templates::Template;

/// Source of the index used to pick one template out of a set.
///
/// Only wording depends on this; which policy branch runs never does.
pub trait TemplateChooser: Send + Sync {
    /// Return an index in `0..len`. `len` is never zero.
    fn choose(&self, len: usize) -> usize;
}

impl<T: TemplateChooser + ?Sized> TemplateChooser for Box<T> {
    fn choose(&self, len: usize) -> usize {
        (**self).choose(len)
    }
}

/// Production chooser backed by the thread-local OS-seeded RNG.
///
/// Each thread seeds once, so concurrent requests neither share a lock nor
/// draw correlated sequences.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngChooser;

impl TemplateChooser for ThreadRngChooser {
    fn choose(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Reproducible chooser for a fixed seed.
#[derive(Debug)]
pub struct SeededChooser {
    rng: Mutex<StdRng>,
}

impl SeededChooser {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl TemplateChooser for SeededChooser {
    fn choose(&self, len: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..len)
    }
}

/// Always picks the same position (wrapped to the set size).
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedChooser(pub usize);

impl TemplateChooser for FixedChooser {
    fn choose(&self, len: usize) -> usize {
        self.0 % len
    }
}

/// Pick one template from `candidates`, or `None` if there are none.
pub fn choose_template<'t, C>(candidates: &'t [Template], chooser: &C) -> Option<&'t Template>
where
    C: TemplateChooser + ?Sized,
{
    if candidates.is_empty() {
        return None;
    }
    let index = chooser.choose(candidates.len()).min(candidates.len() - 1);
    candidates.get(index)
}
