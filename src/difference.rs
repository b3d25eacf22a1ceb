// SPDX: CC0-1.0

//! Finite-difference approximations of the derivative.
//!
//! All operators built from one [`StepSize`] read it at call time, so a new
//! step changes every derivative already built from it. Caches over those
//! derivatives are *not* notified; the owner must resample them.

use crate::{config::ConfigError, Function, Number};
use core::{cell::Cell, fmt, str::FromStr};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// `(g(x + Δx) - g(x)) / Δx`
    Forward,
    /// `(g(x) - g(x - Δx)) / Δx`
    Backward,
    /// `(g(x + Δx/2) - g(x - Δx/2)) / Δx`
    Centered,
}

impl Scheme {
    pub const fn exhaustive() -> &'static [Scheme] {
        &[Self::Forward, Self::Backward, Self::Centered]
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
            Self::Centered => "centered",
        }
    }

    pub const fn alias(&self) -> &'static str {
        match self {
            Self::Forward => "plus",
            Self::Backward => "minus",
            Self::Centered => "balanced",
        }
    }

    pub const fn help(&self) -> &'static str {
        match self {
            Self::Forward => "slope between (x, f(x)) and (x+Δx, f(x+Δx))",
            Self::Backward => "slope between (x-Δx, f(x-Δx)) and (x, f(x))",
            Self::Centered => "slope between (x-Δx/2, f(x-Δx/2)) and (x+Δx/2, f(x+Δx/2))",
        }
    }

    pub fn difference<G: Function + ?Sized>(&self, g: &G, x: Number, step: Number) -> Number {
        match self {
            Self::Forward => (g.eval(x + step) - g.eval(x)) / step,
            Self::Backward => (g.eval(x) - g.eval(x - step)) / step,
            Self::Centered => {
                let half = step / 2.0;
                (g.eval(x + half) - g.eval(x - half)) / step
            }
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        for scheme in Self::exhaustive() {
            if s == scheme.name() || s == scheme.alias() {
                return Ok(*scheme);
            }
        }

        let suggestion = Self::exhaustive()
            .iter()
            .flat_map(|scheme| [scheme.name(), scheme.alias()])
            .map(|name| (strsim::normalized_damerau_levenshtein(&s, name), name))
            .filter(|(sim, _)| *sim > 0.3)
            .reduce(|acc, elem| if elem.0 > acc.0 { elem } else { acc })
            .map(|(_, name)| name);

        Err(ConfigError::UnknownScheme {
            given: s,
            suggestion,
        })
    }
}

/// Step size shared by every operator in a chain.
#[derive(Clone, Debug)]
pub struct StepSize(Rc<Cell<Number>>);

impl StepSize {
    pub fn new(step: Number) -> Self {
        Self(Rc::new(Cell::new(step)))
    }

    #[inline]
    pub fn get(&self) -> Number {
        self.0.get()
    }

    #[inline]
    pub fn set(&self, step: Number) {
        self.0.set(step)
    }
}

#[derive(Clone, Debug)]
pub struct DifferenceOperator {
    scheme: Scheme,
    step: StepSize,
}

impl DifferenceOperator {
    pub const fn new(scheme: Scheme, step: StepSize) -> Self {
        Self { scheme, step }
    }

    #[inline]
    pub const fn scheme(&self) -> Scheme {
        self.scheme
    }

    #[inline]
    pub const fn step(&self) -> &StepSize {
        &self.step
    }

    pub fn apply(&self, g: Rc<dyn Function>) -> Derivative {
        Derivative {
            inner: g,
            scheme: self.scheme,
            step: self.step.clone(),
        }
    }
}

/// Approximate derivative of `inner`, evaluated lazily.
pub struct Derivative {
    inner: Rc<dyn Function>,
    scheme: Scheme,
    step: StepSize,
}

impl Function for Derivative {
    fn eval(&self, x: Number) -> Number {
        self.scheme.difference(&*self.inner, x, self.step.get())
    }
}

impl fmt::Debug for Derivative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Derivative")
            .field("scheme", &self.scheme)
            .field("step", &self.step.get())
            .finish_non_exhaustive()
    }
}
