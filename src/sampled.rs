// SPDX: CC0-1.0

use crate::{Function, Grid, Number};
use core::fmt;
use std::rc::Rc;

/// Precomputed values of a function over a [`Grid`].
///
/// Lookups inside the grid return the sample at the nearest grid point
/// (no interpolation, so the x-error is at most `dx / 2`). Lookups outside
/// the grid evaluate the source directly.
pub struct SampledFunction {
    source: Rc<dyn Function>,
    grid: Grid,
    samples: Vec<Number>,
    generation: u64,
}

impl SampledFunction {
    /// Caches `source` over exactly `grid`.
    pub fn new(source: Rc<dyn Function>, grid: Grid) -> Self {
        let mut ret = Self {
            source,
            grid,
            samples: Vec::with_capacity(grid.segments() + 1),
            generation: 0,
        };
        ret.sample();
        ret
    }

    /// Caches `source` over `visible` widened by one width on each side, so
    /// that differences probing past the visible edges still hit the cache.
    pub fn widened(source: Rc<dyn Function>, visible: Grid) -> Self {
        Self::new(source, visible.widened())
    }

    /// Replaces every sample by a fresh evaluation of the source.
    pub fn sample(&mut self) {
        let Self {
            source,
            grid,
            samples,
            ..
        } = self;
        samples.clear();
        samples.extend(grid.xs().map(|x| source.eval(x)));
        self.generation += 1;
    }

    pub fn evaluate(&self, x: Number) -> Number {
        let (x0, x1) = (self.grid.x0(), self.grid.x1());
        if !(x0..=x1).contains(&x) {
            return self.source.eval(x);
        }

        let dx = self.grid.dx();
        let lower = ((x - x0) / dx).floor() as usize;
        let lower_x = x0 + lower as Number * dx;
        let idx = if x - lower_x <= dx / 2.0 {
            lower
        } else {
            lower + 1
        };
        // rounding in `lower_x` can push an upper-bound query one past the end
        self.samples[idx.min(self.samples.len() - 1)]
    }

    #[inline]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn samples(&self) -> &[Number] {
        &self.samples
    }

    #[inline]
    pub fn source(&self) -> &Rc<dyn Function> {
        &self.source
    }

    /// Number of times the samples have been rebuilt.
    #[inline]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

impl Function for SampledFunction {
    #[inline]
    fn eval(&self, x: Number) -> Number {
        self.evaluate(x)
    }
}

impl fmt::Debug for SampledFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampledFunction")
            .field("grid", &self.grid)
            .field("samples", &self.samples.len())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
