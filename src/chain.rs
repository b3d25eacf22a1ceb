// SPDX: CC0-1.0

use crate::{
    config::ConfigError,
    difference::{DifferenceOperator, Scheme},
    sampled::SampledFunction,
    Function, Grid, Number, Point,
};
use std::rc::Rc;
use tracing::{debug, trace};

/// One link of the chain: the function at a given differentiation order.
#[derive(Debug)]
pub struct Stage {
    order: usize,
    title: String,
    sampled: SampledFunction,
    series: Vec<Point<Number>>,
}

impl Stage {
    fn new(order: usize, title: String, source: Rc<dyn Function>, visible: Grid) -> Self {
        let sampled = SampledFunction::widened(source, visible);
        let mut ret = Self {
            order,
            title,
            sampled,
            series: Vec::with_capacity(visible.segments() + 1),
        };
        ret.refresh_series(visible);
        ret
    }

    fn refresh_series(&mut self, visible: Grid) {
        let sampled = &self.sampled;
        self.series.clear();
        self.series.extend(visible.xs().map(|x| Point {
            x,
            y: sampled.evaluate(x),
        }));
    }

    #[inline]
    pub const fn order(&self) -> usize {
        self.order
    }

    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[inline]
    pub const fn sampled(&self) -> &SampledFunction {
        &self.sampled
    }

    /// Points of the visible curve, as of the last resample.
    #[inline]
    pub fn series(&self) -> &[Point<Number>] {
        &self.series
    }
}

/// Title of the stage at `order`: `f = <name>`, then `f'`, `f''`, ...
pub fn stage_title(name: &str, order: usize) -> String {
    if order == 0 {
        format!("f = {name}")
    } else {
        format!("f{}", "'".repeat(order))
    }
}

/// A function followed by its successive finite-difference derivatives.
///
/// Stage `k` caches the operator applied `k` times to the base function,
/// always built on the unsampled function of stage `k - 1`.
#[derive(Debug)]
pub struct DerivativeChain {
    operator: DifferenceOperator,
    visible: Grid,
    stages: Vec<Stage>,
    stale: bool,
}

impl DerivativeChain {
    pub fn build(
        base: Rc<dyn Function>,
        name: &str,
        order: usize,
        visible: Grid,
        operator: DifferenceOperator,
    ) -> Result<Self, ConfigError> {
        if order < 1 {
            return Err(ConfigError::OrderTooLow(order as i64));
        }

        let mut stages = Vec::with_capacity(order + 1);
        let mut next = base;
        stages.push(Stage::new(0, stage_title(name, 0), Rc::clone(&next), visible));
        for k in 1..=order {
            next = Rc::new(operator.apply(next));
            stages.push(Stage::new(k, stage_title(name, k), Rc::clone(&next), visible));
        }
        debug!(order, scheme = %operator.scheme(), %visible, "built derivative chain");

        Ok(Self {
            operator,
            visible,
            stages,
            stale: false,
        })
    }

    #[inline]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// The highest-order stage.
    pub fn terminal(&self) -> &Stage {
        // `build` always pushes the base stage
        &self.stages[self.stages.len() - 1]
    }

    #[inline]
    pub const fn scheme(&self) -> Scheme {
        self.operator.scheme()
    }

    #[inline]
    pub const fn visible(&self) -> &Grid {
        &self.visible
    }

    #[inline]
    pub fn step(&self) -> Number {
        self.operator.step().get()
    }

    /// Changes the shared step. Every cache is stale until [`Self::resample`].
    pub fn set_step(&mut self, step: Number) {
        self.operator.step().set(step);
        self.stale = true;
    }

    #[inline]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// Rebuilds every stage's cache, then every stage's visible series.
    pub fn resample(&mut self) {
        for stage in &mut self.stages {
            stage.sampled.sample();
            trace!(order = stage.order, "resampled stage");
        }
        let visible = self.visible;
        for stage in &mut self.stages {
            stage.refresh_series(visible);
        }
        self.stale = false;
        debug!(step = self.step(), stages = self.stages.len(), "resampled chain");
    }
}
