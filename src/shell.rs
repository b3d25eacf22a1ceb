// SPDX: CC0-1.0

use crate::{eval::Program, lex::SubStr};
use anyhow::Context;
use core::fmt;
use std::{
    io::{self, stdin, BufRead, Write},
    sync::Arc,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    DeltaX,
    X,
    Status,
    Plot,
    PrintProg,
}

impl Command {
    pub const fn exhaustive() -> &'static [Command] {
        &[
            Self::Help,
            Self::Quit,
            Self::DeltaX,
            Self::X,
            Self::Status,
            Self::Plot,
            Self::PrintProg,
        ]
    }

    pub const fn help(&self) -> &'static str {
        match self {
            Self::Help => "display help for each command",
            Self::Quit => "quit the shell",
            Self::DeltaX => "move the Δx slider",
            Self::X => "move the x slider",
            Self::Status => "print current x and Δx, and the marks on every canvas",
            Self::Plot => "plot the function and its derivatives with gnuplot",
            Self::PrintProg => "print program compiled from the function (for debugging)",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Quit => "quit",
            Self::DeltaX => "dx",
            Self::X => "x",
            Self::Status => "status",
            Self::Plot => "plot",
            Self::PrintProg => "prog",
        }
    }

    /// Closest command name to an unrecognized input.
    pub fn similar(s: &str) -> Option<&'static str> {
        Self::exhaustive()
            .iter()
            .map(|c| (strsim::normalized_damerau_levenshtein(s, c.name()), c.name()))
            .reduce(|acc, elem| if elem.0 > acc.0 { elem } else { acc })
            .filter(|(sim, _)| *sim > 0.3)
            .map(|(_, name)| name)
    }
}

impl core::str::FromStr for Command {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::exhaustive()
            .iter()
            .find(|c| c.name() == s)
            .copied()
            .ok_or(())
    }
}

pub fn input<W: Write>(out: W, prompt: impl fmt::Display) -> anyhow::Result<Option<String>> {
    fn inner<W: Write>(mut out: W, prompt: impl fmt::Display) -> io::Result<Option<String>> {
        write!(out, "{prompt}")?;
        out.flush()?;
        let mut s = String::new();
        if stdin().lock().read_line(&mut s)? == 0 {
            // end of input
            return Ok(None);
        }
        Ok(Some(s.trim().to_string()))
    }

    let s = inner(out, prompt).context("read from standard input failed")?;
    Ok(s)
}

pub fn read_fromstr<W: Write, T: core::str::FromStr>(
    mut out: W,
    prompt: impl fmt::Display,
) -> anyhow::Result<Result<Option<T>, <T as core::str::FromStr>::Err>>
where
    <T as core::str::FromStr>::Err: fmt::Display,
{
    let input = match input(&mut out, prompt)? {
        Some(input) if !input.is_empty() => Arc::new(input),
        _ => return Ok(Ok(None)),
    };
    match input.parse::<T>() {
        Ok(new) => Ok(Ok(Some(new))),
        Err(err) => {
            writeln!(out)?;
            underline(&mut out, &SubStr::all(input))?;
            writeln!(out, "parse error: {err}")?;
            Ok(Err(err))
        }
    }
}

pub fn underline<W: Write>(mut out: W, span: &SubStr) -> io::Result<()> {
    writeln!(out, "{}", span.src())?;
    writeln!(
        out,
        "{}{}",
        " ".repeat(span.start()),
        "^".repeat(span.len().max(1))
    )?;
    Ok(())
}

pub fn dump_program<W: Write>(mut out: W, prog: &Program, title: fmt::Arguments) -> io::Result<()> {
    writeln!(out, "{title}: ")?;
    if prog.ops().len() == 0 {
        writeln!(out, "  (empty)")?;
    }
    for op in prog.ops() {
        writeln!(out, "  {op}")?;
    }
    Ok(())
}
