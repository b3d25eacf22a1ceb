// SPDX: CC0-1.0

pub mod chain;
pub mod config;
pub mod difference;
pub mod eval;
pub mod expr;
pub mod gnuplot;
pub mod lex;
pub mod parse;
pub mod render;
pub mod sampled;
pub mod shell;
pub mod stdlib;
pub mod viewport;

use crate::config::ConfigError;
use core::{fmt, num::NonZeroUsize};

pub type Number = f64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

/// A scalar function of one real variable.
pub trait Function {
    fn eval(&self, x: Number) -> Number;
}

impl<F> Function for F
where
    F: Fn(Number) -> Number,
{
    #[inline]
    fn eval(&self, x: Number) -> Number {
        self(x)
    }
}

/// Equally spaced sample positions `x0 + i * dx` for `i` in `0..=segments`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    x0: Number,
    x1: Number,
    segments: NonZeroUsize,
}

// the cache grid covers three visible widths
const WIDEN_FACTOR: NonZeroUsize = match NonZeroUsize::new(3) {
    Some(n) => n,
    None => unreachable!(),
};

impl Grid {
    pub fn new(x0: Number, x1: Number, segments: usize) -> Result<Self, ConfigError> {
        if !x0.is_finite() || !x1.is_finite() {
            return Err(ConfigError::NonFiniteBound { min: x0, max: x1 });
        }
        if x0 >= x1 {
            return Err(ConfigError::InvertedDomain { min: x0, max: x1 });
        }
        let segments = NonZeroUsize::new(segments).ok_or(ConfigError::NoSegments)?;
        Ok(Self { x0, x1, segments })
    }

    #[inline]
    pub const fn x0(&self) -> Number {
        self.x0
    }

    #[inline]
    pub const fn x1(&self) -> Number {
        self.x1
    }

    #[inline]
    pub const fn segments(&self) -> usize {
        self.segments.get()
    }

    #[inline]
    pub fn dx(&self) -> Number {
        (self.x1 - self.x0) / self.segments.get() as Number
    }

    #[inline]
    pub fn x_at(&self, idx: usize) -> Number {
        self.x0 + idx as Number * self.dx()
    }

    pub fn xs(&self) -> impl Iterator<Item = Number> + '_ {
        (0..=self.segments()).map(move |idx| self.x_at(idx))
    }

    /// Extends the bounds outward by one width on each side, keeping `dx`.
    pub fn widened(&self) -> Self {
        let width = self.x1 - self.x0;
        Self {
            x0: self.x0 - width,
            x1: self.x1 + width,
            segments: self.segments.saturating_mul(WIDEN_FACTOR),
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("x range", &(self.x0..self.x1))
            .field("segments", &self.segments)
            .field("dx", &self.dx())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn widened_grid_keeps_spacing() {
        let grid = Grid::new(-1.0, 3.0, 8).unwrap();
        let wide = grid.widened();
        assert_eq!(wide.segments(), 24);
        assert_abs_diff_eq!(wide.x0(), -5.0);
        assert_abs_diff_eq!(wide.x1(), 7.0);
        assert_abs_diff_eq!(wide.dx(), grid.dx());
    }

    #[test]
    fn grid_positions_include_both_bounds() {
        let grid = Grid::new(0.0, 1.0, 4).unwrap();
        let xs: Vec<Number> = grid.xs().collect();
        assert_eq!(xs, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn rejects_degenerate_grids() {
        assert!(matches!(Grid::new(0.0, 10.0, 0), Err(ConfigError::NoSegments)));
        assert!(matches!(
            Grid::new(2.0, 2.0, 10),
            Err(ConfigError::InvertedDomain { .. })
        ));
        assert!(matches!(
            Grid::new(3.0, -3.0, 10),
            Err(ConfigError::InvertedDomain { .. })
        ));
        assert!(matches!(
            Grid::new(Number::NEG_INFINITY, 0.0, 10),
            Err(ConfigError::NonFiniteBound { .. })
        ));
    }
}
