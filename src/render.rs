// SPDX: CC0-1.0

use crate::{difference::Scheme, sampled::SampledFunction, Number, Point};
use core::convert::Infallible;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Blue,
}

impl Color {
    pub const fn rgb(&self) -> &'static str {
        match self {
            Self::Red => "#ff0000",
            Self::Blue => "#0000ff",
        }
    }
}

/// Connected points drawn on top of a curve.
#[derive(Clone, Debug, PartialEq)]
pub struct Mark {
    pub points: Vec<Point<Number>>,
    pub color: Color,
}

/// What to mark around the probe position on one canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    /// `x` alone, for the highest-order stage.
    Point,
    /// `x` joined to `x + Δx`.
    Forward,
    /// `x` joined to `x - Δx`.
    Backward,
    /// `x` in blue, `x - Δx/2` joined to `x + Δx/2` in red.
    Centered,
}

impl Marker {
    pub const fn bracketing(scheme: Scheme) -> Self {
        match scheme {
            Scheme::Forward => Self::Forward,
            Scheme::Backward => Self::Backward,
            Scheme::Centered => Self::Centered,
        }
    }
}

/// Marks for one canvas, read through the same cache as its curve.
#[derive(Clone, Copy, Debug)]
pub struct Overlay<'a> {
    pub marker: Marker,
    pub sampled: &'a SampledFunction,
    pub x: Number,
    pub deltax: Number,
}

impl Overlay<'_> {
    fn at(&self, x: Number) -> Point<Number> {
        Point {
            x,
            y: self.sampled.evaluate(x),
        }
    }

    pub fn marks(&self) -> Vec<Mark> {
        let Self { x, deltax, .. } = *self;
        match self.marker {
            Marker::Point => vec![Mark {
                points: vec![self.at(x)],
                color: Color::Red,
            }],
            Marker::Forward => vec![Mark {
                points: vec![self.at(x), self.at(x + deltax)],
                color: Color::Red,
            }],
            Marker::Backward => vec![Mark {
                points: vec![self.at(x), self.at(x - deltax)],
                color: Color::Red,
            }],
            Marker::Centered => {
                let half = deltax / 2.0;
                vec![
                    Mark {
                        points: vec![self.at(x)],
                        color: Color::Blue,
                    },
                    Mark {
                        points: vec![self.at(x - half), self.at(x + half)],
                        color: Color::Red,
                    },
                ]
            }
        }
    }
}

/// Draws canvases. The engine only calls into it.
pub trait RenderSink {
    type Error;

    /// Redraws `canvas` with the given curve and optional marks.
    fn render(
        &mut self,
        canvas: usize,
        title: &str,
        series: &[Point<Number>],
        overlay: Option<&Overlay<'_>>,
    ) -> Result<(), Self::Error>;

    /// Called once after every canvas of a cascade has been rendered.
    fn present(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Canvas {
    pub title: String,
    pub series: Vec<Point<Number>>,
    pub marks: Vec<Mark>,
}

/// Keeps the latest drawing of every canvas in memory.
#[derive(Clone, Debug, Default)]
pub struct FrameSink {
    canvases: Vec<Canvas>,
    renders: usize,
    presents: usize,
}

impl FrameSink {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn canvases(&self) -> &[Canvas] {
        &self.canvases
    }

    /// Total number of canvas renders so far.
    #[inline]
    pub const fn renders(&self) -> usize {
        self.renders
    }

    /// Number of completed cascades so far.
    #[inline]
    pub const fn presents(&self) -> usize {
        self.presents
    }
}

impl RenderSink for FrameSink {
    type Error = Infallible;

    fn render(
        &mut self,
        canvas: usize,
        title: &str,
        series: &[Point<Number>],
        overlay: Option<&Overlay<'_>>,
    ) -> Result<(), Self::Error> {
        if self.canvases.len() <= canvas {
            self.canvases.resize_with(canvas + 1, Canvas::default);
        }
        let dst = &mut self.canvases[canvas];
        dst.title.clear();
        dst.title.push_str(title);
        dst.series.clear();
        dst.series.extend_from_slice(series);
        dst.marks = overlay.map(Overlay::marks).unwrap_or_default();
        self.renders += 1;
        Ok(())
    }

    fn present(&mut self) -> Result<(), Self::Error> {
        self.presents += 1;
        Ok(())
    }
}
