//! Seeded RNG for the driving side of the fleet.
//!
//! The traffic layer and the agent state machine are fully deterministic and
//! never draw random numbers.  Drivers (the demo's interactive thread, load
//! generators in tests) do: they pick spawn sites and task targets.  Wrapping
//! `SmallRng` keeps those picks reproducible from `FleetConfig::seed`.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for deriving child seeds.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

pub struct FleetRng(SmallRng);

impl FleetRng {
    pub fn new(seed: u64) -> Self {
        FleetRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive an independent stream, e.g. one per driver thread.
    pub fn child(&mut self, offset: u64) -> FleetRng {
        let seed = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        FleetRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// A random element of `slice`, or `None` if it is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        slice.choose(&mut self.0)
    }

    /// A random element of `slice` other than `exclude`, if one exists.
    pub fn choose_other<T: PartialEq + Copy>(&mut self, slice: &[T], exclude: T) -> Option<T> {
        let candidates: Vec<T> = slice.iter().copied().filter(|&v| v != exclude).collect();
        candidates.choose(&mut self.0).copied()
    }
}
