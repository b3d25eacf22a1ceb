// SPDX: CC0-1.0

use approx::assert_abs_diff_eq;
use deltax::{
    config::{Config, ConfigError},
    difference::Scheme,
    expr::Expression,
    render::{Color, FrameSink, Overlay, RenderSink},
    viewport::ViewportController,
    Function, Number, Point,
};
use std::{cell::Cell, convert::Infallible, rc::Rc};

fn sine_config(min_x: Number, max_x: Number, num_segments: usize, order: i64, scheme: Scheme) -> Config {
    Config {
        min_x,
        max_x,
        num_segments,
        differentiation_order: order,
        scheme,
        ..Config::default()
    }
}

fn sine() -> Rc<dyn Function> {
    Rc::new(|x: Number| x.sin())
}

/// Counts calls without keeping anything.
struct CountingSink(Rc<Cell<usize>>);

impl RenderSink for CountingSink {
    type Error = Infallible;

    fn render(
        &mut self,
        _canvas: usize,
        _title: &str,
        _series: &[Point<Number>],
        _overlay: Option<&Overlay<'_>>,
    ) -> Result<(), Self::Error> {
        self.0.set(self.0.get() + 1);
        Ok(())
    }
}

#[test]
fn centered_error_shrinks_with_step() {
    let config = sine_config(0.0, 10.0, 10, 1, Scheme::Centered);
    let mut view = ViewportController::new(&config, sine(), FrameSink::new()).unwrap();
    view.start().unwrap();

    // 3.0 lies exactly on the cache grid, so the lookup adds no error
    let mut last = Number::INFINITY;
    for pos in [80, 40, 20, 10] {
        view.on_deltax(pos).unwrap();
        let approx = view.chain().terminal().sampled().evaluate(3.0);
        let err = (approx - 3.0f64.cos()).abs();
        assert!(err < last, "error {err} at Δx = {} did not shrink", view.deltax());
        last = err;
    }
    assert!(last < 1e-3);
}

#[test]
fn deltax_change_refreshes_every_derivative() {
    let config = sine_config(0.0, 10.0, 100, 3, Scheme::Forward);
    let mut view = ViewportController::new(&config, sine(), FrameSink::new()).unwrap();
    view.start().unwrap();

    let stages = view.chain().stages();
    let generations: Vec<u64> = stages.iter().map(|s| s.sampled().generation()).collect();
    let series: Vec<Vec<Point<Number>>> = stages.iter().map(|s| s.series().to_vec()).collect();

    view.on_deltax(200).unwrap();

    for (idx, stage) in view.chain().stages().iter().enumerate() {
        assert_eq!(stage.sampled().generation(), generations[idx] + 1);
        if idx == 0 {
            assert_eq!(stage.series(), series[0].as_slice());
        } else {
            assert_ne!(stage.series(), series[idx].as_slice(), "stage {idx} kept its old curve");
        }
    }
    assert!(!view.chain().is_stale());

    // what was drawn matches what is cached
    for (canvas, stage) in view.sink().canvases().iter().zip(view.chain().stages()) {
        assert_eq!(canvas.series, stage.series());
        assert_eq!(canvas.title, stage.title());
    }
}

#[test]
fn forward_markers_reach_ahead() {
    let config = sine_config(0.0, 10.0, 100, 2, Scheme::Forward);
    let mut view = ViewportController::new(&config, sine(), FrameSink::new()).unwrap();
    view.start().unwrap();
    view.on_deltax(50).unwrap();
    view.on_x(500).unwrap();

    let canvases = view.sink().canvases();
    assert_eq!(canvases.len(), 3);
    assert_eq!(canvases[0].title, "f = sin(x)");
    assert_eq!(canvases[1].title, "f'");
    assert_eq!(canvases[2].title, "f''");

    for canvas in &canvases[..2] {
        assert_eq!(canvas.marks.len(), 1);
        let mark = &canvas.marks[0];
        assert_eq!(mark.color, Color::Red);
        assert_eq!(mark.points.len(), 2);
        assert_abs_diff_eq!(mark.points[0].x, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mark.points[1].x, 5.5, epsilon = 1e-12);
    }

    let terminal = &canvases[2].marks;
    assert_eq!(terminal.len(), 1);
    assert_eq!(terminal[0].points.len(), 1);
    assert_abs_diff_eq!(terminal[0].points[0].x, 5.0, epsilon = 1e-12);
}

#[test]
fn centered_markers_straddle_the_probe() {
    let config = sine_config(0.0, 10.0, 100, 1, Scheme::Centered);
    let mut view = ViewportController::new(&config, sine(), FrameSink::new()).unwrap();
    view.start().unwrap();
    view.on_deltax(100).unwrap();
    view.on_x(400).unwrap();

    let marks = &view.sink().canvases()[0].marks;
    assert_eq!(marks.len(), 2);
    assert_eq!(marks[0].color, Color::Blue);
    assert_abs_diff_eq!(marks[0].points[0].x, 4.0, epsilon = 1e-12);
    assert_eq!(marks[1].color, Color::Red);
    assert_abs_diff_eq!(marks[1].points[0].x, 3.5, epsilon = 1e-12);
    assert_abs_diff_eq!(marks[1].points[1].x, 4.5, epsilon = 1e-12);
}

#[test]
fn bad_configuration_renders_nothing() {
    let cases = [
        (sine_config(0.0, 10.0, 0, 1, Scheme::Forward), ConfigError::NoSegments),
        (
            sine_config(10.0, 10.0, 10, 1, Scheme::Forward),
            ConfigError::InvertedDomain { min: 10.0, max: 10.0 },
        ),
        (
            sine_config(0.0, 10.0, 10, 0, Scheme::Backward),
            ConfigError::OrderTooLow(0),
        ),
    ];

    for (config, expected) in cases {
        let renders = Rc::new(Cell::new(0));
        let result = ViewportController::new(&config, sine(), CountingSink(Rc::clone(&renders)));
        assert_eq!(result.err(), Some(expected));
        assert_eq!(renders.get(), 0);
    }
}

#[test]
fn expression_drives_the_whole_chain() {
    let config = Config {
        function: String::from("x^3"),
        function_name: Some(String::from("cube")),
        min_x: -1.0,
        max_x: 1.0,
        num_segments: 20,
        differentiation_order: 2,
        scheme: Scheme::Centered,
        debug: false,
    };
    let expr: Rc<dyn Function> = Rc::new(Expression::new(config.function.as_str()).unwrap());
    let mut view = ViewportController::new(&config, expr, FrameSink::new()).unwrap();
    view.start().unwrap();
    view.on_deltax(100).unwrap();

    assert_abs_diff_eq!(view.deltax(), 0.2, epsilon = 1e-12);
    assert_eq!(view.sink().canvases()[0].title, "f = cube");

    // the nested centered difference of a cubic is exact
    let second = view.chain().terminal().sampled();
    for x in [-0.5, 0.0, 0.5] {
        assert_abs_diff_eq!(second.evaluate(x), 6.0 * x, epsilon = 1e-6);
    }
}
