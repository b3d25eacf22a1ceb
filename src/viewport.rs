// SPDX: CC0-1.0

//! Slider-driven controller running the resample/redraw cascades.
//!
//! Every cascade runs to completion on the caller's thread: a Δx change
//! resamples *all* stages before rendering *any* of them, and an x change
//! only redraws.

use crate::{
    chain::DerivativeChain,
    config::{Config, ConfigError},
    difference::{DifferenceOperator, StepSize},
    render::{Marker, Overlay, RenderSink},
    Function, Number,
};
use core::ops::RangeInclusive;
use std::rc::Rc;
use tracing::{debug, trace};

/// Positions available on both sliders.
pub const SLIDER_RANGE: RangeInclusive<i32> = 0..=1000;

/// Affine map from slider position to value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slider {
    pub base: Number,
    pub scale: Number,
}

impl Slider {
    pub fn value(&self, pos: i32) -> Number {
        self.base + Number::from(clamp_pos(pos)) * self.scale
    }
}

fn clamp_pos(pos: i32) -> i32 {
    pos.clamp(*SLIDER_RANGE.start(), *SLIDER_RANGE.end())
}

#[derive(Debug)]
pub struct ViewportController<S> {
    chain: DerivativeChain,
    sink: S,
    x: Number,
    x_slider: Slider,
    deltax_slider: Slider,
    min_deltax: Number,
    positions: (i32, i32),
}

impl<S: RenderSink> ViewportController<S> {
    /// Validates `config` and builds the chain over `base`. Nothing is
    /// rendered until [`Self::start`].
    pub fn new(config: &Config, base: Rc<dyn Function>, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let visible = config.grid()?;
        let width = visible.x1() - visible.x0();
        let slider_width = Number::from(*SLIDER_RANGE.end());

        let deltax = visible.dx();
        let deltax_slider = Slider {
            base: 0.0,
            scale: width / slider_width,
        };
        let x_slider = Slider {
            base: visible.x0(),
            scale: width / slider_width,
        };
        let positions = (
            (deltax / deltax_slider.scale) as i32,
            *SLIDER_RANGE.end() / 2,
        );

        let operator = DifferenceOperator::new(config.scheme, StepSize::new(deltax));
        let chain = DerivativeChain::build(
            base,
            config.display_name(),
            config.order()?,
            visible,
            operator,
        )?;

        Ok(Self {
            chain,
            sink,
            x: (visible.x0() + visible.x1()) / 2.0,
            x_slider,
            deltax_slider,
            min_deltax: width / 1e6,
            positions,
        })
    }

    /// Runs the Δx cascade then the x cascade at the current positions.
    pub fn start(&mut self) -> Result<(), S::Error> {
        let (deltax_pos, x_pos) = self.positions;
        self.on_deltax(deltax_pos)?;
        self.on_x(x_pos)
    }

    /// Current `(Δx, x)` slider positions.
    #[inline]
    pub const fn positions(&self) -> (i32, i32) {
        self.positions
    }

    pub fn on_deltax(&mut self, pos: i32) -> Result<(), S::Error> {
        self.positions.0 = clamp_pos(pos);
        let mut deltax = self.deltax_slider.value(pos);
        if deltax.abs() < self.min_deltax {
            deltax = self.min_deltax;
        }
        debug!(pos, deltax, "Δx changed");
        self.chain.set_step(deltax);
        self.chain.resample();
        self.redraw()
    }

    pub fn on_x(&mut self, pos: i32) -> Result<(), S::Error> {
        self.positions.1 = clamp_pos(pos);
        self.x = self.x_slider.value(pos);
        debug!(pos, x = self.x, "x changed");
        self.redraw()
    }

    fn redraw(&mut self) -> Result<(), S::Error> {
        if self.chain.is_stale() {
            self.chain.resample();
        }

        let bracket = Marker::bracketing(self.chain.scheme());
        let terminal = self.chain.stages().len() - 1;
        let deltax = self.chain.step();
        for (idx, stage) in self.chain.stages().iter().enumerate() {
            let overlay = Overlay {
                marker: if idx == terminal { Marker::Point } else { bracket },
                sampled: stage.sampled(),
                x: self.x,
                deltax,
            };
            trace!(canvas = idx, title = stage.title(), "render");
            self.sink
                .render(idx, stage.title(), stage.series(), Some(&overlay))?;
        }
        self.sink.present()
    }

    #[inline]
    pub const fn x(&self) -> Number {
        self.x
    }

    #[inline]
    pub fn deltax(&self) -> Number {
        self.chain.step()
    }

    #[inline]
    pub const fn min_deltax(&self) -> Number {
        self.min_deltax
    }

    #[inline]
    pub const fn chain(&self) -> &DerivativeChain {
        &self.chain
    }

    #[inline]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    #[inline]
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{difference::Scheme, render::FrameSink};
    use approx::assert_abs_diff_eq;

    fn config(order: i64, scheme: Scheme) -> Config {
        Config {
            function: String::from("x^2"),
            min_x: 0.0,
            max_x: 10.0,
            num_segments: 100,
            differentiation_order: order,
            scheme,
            ..Config::default()
        }
    }

    fn controller(order: i64, scheme: Scheme) -> ViewportController<FrameSink> {
        ViewportController::new(
            &config(order, scheme),
            Rc::new(|x: Number| x * x),
            FrameSink::new(),
        )
        .unwrap()
    }

    #[test]
    fn sliders_map_affinely() {
        let c = controller(1, Scheme::Forward);
        assert_eq!(c.positions(), (10, 500));
        assert_abs_diff_eq!(c.x_slider.value(0), 0.0);
        assert_abs_diff_eq!(c.x_slider.value(250), 2.5);
        assert_abs_diff_eq!(c.deltax_slider.value(40), 0.4);
        // clamped to the widget range
        assert_abs_diff_eq!(c.x_slider.value(5000), 10.0);
        assert_abs_diff_eq!(c.x_slider.value(-7), 0.0);
    }

    #[test]
    fn zero_step_is_floored() {
        let mut c = controller(1, Scheme::Forward);
        c.on_deltax(0).unwrap();
        assert_eq!(c.deltax(), c.min_deltax());
        assert_abs_diff_eq!(c.min_deltax(), 1e-5);
    }

    #[test]
    fn nothing_renders_before_start() {
        let mut c = controller(2, Scheme::Centered);
        assert_eq!(c.sink().renders(), 0);
        c.start().unwrap();
        // one Δx cascade and one x cascade over three canvases
        assert_eq!(c.sink().renders(), 6);
        assert_eq!(c.sink().presents(), 2);
        assert_abs_diff_eq!(c.x(), 5.0);
        assert_abs_diff_eq!(c.deltax(), 0.1);
    }

    #[test]
    fn position_change_does_not_resample() {
        let mut c = controller(2, Scheme::Backward);
        c.start().unwrap();
        let before: Vec<u64> = c
            .chain()
            .stages()
            .iter()
            .map(|stage| stage.sampled().generation())
            .collect();
        c.on_x(123).unwrap();
        assert_eq!(c.positions(), (10, 123));
        let after: Vec<u64> = c
            .chain()
            .stages()
            .iter()
            .map(|stage| stage.sampled().generation())
            .collect();
        assert_eq!(before, after);
        assert_abs_diff_eq!(c.x(), 1.23);
    }
}
