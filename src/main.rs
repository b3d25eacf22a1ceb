// SPDX: CC0-1.0

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use core::f64::consts;
use deltax::{
    config::{Config, ConfigError},
    eval::CompileErrTyp,
    expr::{ExprErr, Expression},
    gnuplot,
    lex::{LexErrTyp, SubStr, TokTyp},
    parse::ParseErrTyp,
    render::FrameSink,
    shell::{self, Command},
    stdlib,
    viewport::{ViewportController, SLIDER_RANGE},
    Function, Number,
};
#[cfg(not(debug_assertions))]
use std::process::Stdio;
use std::{
    fs::OpenOptions,
    io::{self, stdout, BufWriter, Write},
    process::{self, Child, ExitCode},
    rc::Rc,
    sync::Arc,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Explore a function and its finite-difference derivatives.
#[derive(Debug, Parser)]
#[command(name = "deltax", version)]
struct Args {
    /// Generate debugging output (RUST_LOG takes precedence)
    #[arg(short, long)]
    debug: bool,

    /// Function of x to plot
    #[arg(short = 'f', long, default_value = "sin(x)")]
    function: String,

    /// Name of the function to use in plot titles
    #[arg(short = 'F', long, default_value = "")]
    function_name: String,

    /// Minimum x value to use in plots
    #[arg(short = 'm', long, default_value_t = -consts::TAU, allow_negative_numbers = true)]
    min_x: Number,

    /// Maximum x value to use in plots
    #[arg(short = 'M', long, default_value_t = consts::TAU, allow_negative_numbers = true)]
    max_x: Number,

    /// Number of line segments used in graphing functions
    #[arg(short = 'n', long, default_value_t = 1024)]
    num_segments: usize,

    /// Number of times to differentiate
    #[arg(short = 'D', long, default_value_t = 1, allow_negative_numbers = true)]
    differentiate: i64,

    /// Approximation method: forward (plus), backward (minus) or centered (balanced)
    #[arg(short = 'a', long, default_value = "forward")]
    approximation_method: String,
}

impl Args {
    fn into_config(self) -> Result<Config, ConfigError> {
        let config = Config {
            scheme: self.approximation_method.parse()?,
            function: self.function,
            function_name: Some(self.function_name).filter(|name| !name.is_empty()),
            min_x: self.min_x,
            max_x: self.max_x,
            num_segments: self.num_segments,
            differentiation_order: self.differentiate,
            debug: self.debug,
        };
        config.validate()?;
        Ok(config)
    }
}

fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let argv0 = std::env::args()
        .next()
        .unwrap_or_else(|| String::from(env!("CARGO_PKG_NAME")));
    let args = Args::parse();
    init_logging(args.debug);

    let config = match args.into_config() {
        Ok(config) => config,
        Err(ConfigError::OrderTooLow(given)) => {
            eprintln!("{argv0}: -D should be at least 1 ({given} given)");
            return ExitCode::FAILURE;
        }
        Err(err) => {
            eprintln!("{argv0}: {err}");
            return ExitCode::FAILURE;
        }
    };

    match try_main(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let chain = err.chain();
            if chain.len() > 1 {
                eprintln!();
                eprintln!("context:");
                for it in chain.skip(1) {
                    eprintln!("  {it}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

struct State {
    config: Config,
    expr: Rc<Expression>,
    view: ViewportController<FrameSink>,
    gnuplot: Option<Child>,
}

fn try_main(config: Config) -> anyhow::Result<()> {
    let mut stdout = BufWriter::new(stdout());

    let src = Arc::new(config.function.clone());
    let expr = match Expression::with_idents(Arc::clone(&src), &stdlib::standard_idents()) {
        Ok(expr) => Rc::new(expr),
        Err(err) => {
            report_expr_err(&mut stdout, src, &err)?;
            stdout.flush()?;
            return Err(ConfigError::Expression(err.to_string()).into());
        }
    };
    info!(function = %expr, "compiled function");

    let base: Rc<dyn Function> = Rc::clone(&expr) as Rc<dyn Function>;
    let mut view = ViewportController::new(&config, base, FrameSink::new())?;
    view.start()?;

    let mut state = State {
        config,
        expr,
        view,
        gnuplot: None,
    };

    loop {
        print_status(&mut stdout, &state)?;

        let mut try_cmd = match shell::input(&mut stdout, "> ")? {
            Some(cmd) => cmd,
            None => break,
        };
        try_cmd.make_ascii_lowercase();
        writeln!(stdout)?;

        if let Ok(cmd) = try_cmd.parse::<Command>() {
            match cmd {
                Command::Help => {
                    for c in Command::exhaustive() {
                        writeln!(stdout, "{name}: {help}", name = c.name(), help = c.help())?;
                    }
                }

                Command::Quit => break,

                Command::DeltaX => {
                    let (cur, _) = state.view.positions();
                    if let Some(pos) = read_position(&mut stdout, "Δx", cur)? {
                        state.view.on_deltax(pos)?;
                    }
                }

                Command::X => {
                    let (_, cur) = state.view.positions();
                    if let Some(pos) = read_position(&mut stdout, "x", cur)? {
                        state.view.on_x(pos)?;
                    }
                }

                Command::Status => {
                    writeln!(
                        stdout,
                        "𝝙x = {:.6e}, x = {:.6}, min 𝝙x = {:.6e}",
                        state.view.deltax(),
                        state.view.x(),
                        state.view.min_deltax()
                    )?;
                    for (idx, canvas) in state.view.sink().canvases().iter().enumerate() {
                        writeln!(stdout, "canvas {idx}: {}", canvas.title)?;
                        for mark in &canvas.marks {
                            let points: Vec<String> = mark
                                .points
                                .iter()
                                .map(|p| format!("({:.6}, {:.6})", p.x, p.y))
                                .collect();
                            writeln!(stdout, "  {:?}: {}", mark.color, points.join(" - "))?;
                        }
                    }
                }

                Command::Plot => plot(&mut stdout, &mut state)?,

                Command::PrintProg => {
                    shell::dump_program(&mut stdout, state.expr.program(), format_args!("program"))?
                }
            }
        } else if !try_cmd.is_empty() {
            writeln!(stdout, r#"Unknown command, try "help" for help"#)?;
            if let Some(name) = Command::similar(&try_cmd) {
                writeln!(stdout, "note: command '{name}' has a similar name")?;
            }
        }

        writeln!(stdout)?;
    }

    if let Some(mut child) = state.gnuplot.take() {
        // --persist keeps the window open after the process is gone
        let _ = child.wait();
    }
    stdout.flush()?;
    Ok(())
}

fn print_status<W: Write>(mut out: W, state: &State) -> io::Result<()> {
    let (deltax_pos, x_pos) = state.view.positions();
    writeln!(
        out,
        "{name}: 𝝙x = {deltax:11.4e} [{deltax_pos}]   x = {x:11.4} [{x_pos}]",
        name = state.config.display_name(),
        deltax = state.view.deltax(),
        x = state.view.x(),
    )
}

fn read_position<W: Write>(mut out: W, name: &str, cur: i32) -> anyhow::Result<Option<i32>> {
    let (min, max) = (SLIDER_RANGE.start(), SLIDER_RANGE.end());
    match shell::read_fromstr::<_, i32>(
        &mut out,
        format_args!("?{name} slider {min}..={max} (is {cur}) = "),
    )? {
        Ok(Some(pos)) => {
            if !SLIDER_RANGE.contains(&pos) {
                writeln!(out, "note: position clamped to {min}..={max}")?;
            }
            Ok(Some(pos))
        }
        Ok(None) | Err(_) => Ok(None),
    }
}

fn plot<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    if let Some(mut old_child) = state.gnuplot.take() {
        if let Err(err) = old_child.kill() {
            debug!(%err, "previous gnuplot child already gone");
        }
        let _ = old_child.wait();
    }

    let path = gnuplot::output_filename(Local::now());
    let mut script = BufWriter::new(
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .context("failed to open output gnuplot file")?,
    );
    gnuplot::write_script(
        &mut script,
        state.view.sink().canvases(),
        state.config.display_name(),
    )
    .context("failed to write to output gnuplot file")?;
    script.flush()?;
    script.get_mut().sync_data()?;
    drop(script);

    // spawn gnuplot and provide the path to the file
    let mut cmd = process::Command::new("gnuplot");
    cmd.arg("--persist").arg(&path);
    #[cfg(not(debug_assertions))]
    {
        cmd.stdout(Stdio::null())
            .stderr(Stdio::null())
            .stdin(Stdio::null());
    }
    let child = cmd
        .spawn()
        .context("failed to spawn gnuplot (is it installed and in ${PATH}?)")?;
    info!(%path, "spawned gnuplot");
    writeln!(out, "wrote {path}")?;

    state.gnuplot = Some(child);
    Ok(())
}

fn report_expr_err<W: Write>(mut out: W, src: Arc<String>, err: &ExprErr) -> io::Result<()> {
    // NOTE(unicode)
    let loc = err.loc().cloned().unwrap_or_else(|| SubStr::end_of(src));
    shell::underline(&mut out, &loc)?;
    writeln!(out, "{err}")?;

    match err {
        ExprErr::Parse(err) => match err.typ {
            ParseErrTyp::LexErr(LexErrTyp::InvalidChar) => writeln!(
                out,
                "note: available tokens are numbers, alphabetic identifiers, and symbols +-*/^,()"
            )?,
            ParseErrTyp::LexErr(LexErrTyp::Unsupported(typ)) => match typ {
                TokTyp::XGreater | TokTyp::XLess => {
                    writeln!(out, "note: expected an expression but found an inequality")?
                }
                TokTyp::XEqual => {
                    writeln!(out, "note: expected an expression but found an equation")?
                }
                TokTyp::XPipe => writeln!(
                    out,
                    "note: use the 'abs' function to compute absolute value"
                )?,
                _ => {}
            },
            ParseErrTyp::ParseNum(_) => writeln!(out, "note: parsing as floating point number")?,
            ParseErrTyp::ParenMismatch => {}
        },

        ExprErr::Compile(err) => match &err.typ {
            CompileErrTyp::StackMismatch { .. } => writeln!(
                out,
                "note: implicit multiplication is not supported, so for example '5x' would be '5*x'"
            )?,
            CompileErrTyp::UndefinedIdent {
                similar: Some(similar),
                ..
            } => writeln!(
                out,
                "note: {kind} '{name}' has a similar name",
                kind = similar.kind,
                name = similar.name
            )?,
            CompileErrTyp::Empty
            | CompileErrTyp::MissingArgs { .. }
            | CompileErrTyp::UndefinedIdent { similar: None, .. } => {}
        },
    }

    Ok(())
}
