// SPDX: CC0-1.0

use crate::{
    eval::{self, CompileErr, Compiled, Idents, Program},
    lex::{Lexer, SubStr},
    parse::{self, ParseErr},
    stdlib, Function, Number,
};
use core::fmt;
use std::sync::Arc;

#[derive(Debug)]
pub enum ExprErr {
    Parse(ParseErr),
    Compile(CompileErr),
}

impl ExprErr {
    /// Where in the source the problem is, if it can be pinned down.
    pub fn loc(&self) -> Option<&SubStr> {
        match self {
            Self::Parse(err) => Some(&err.loc),
            Self::Compile(err) => err.op.as_ref().map(|op| &op.loc),
        }
    }
}

impl fmt::Display for ExprErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "parse error: {err}"),
            Self::Compile(err) => write!(f, "compile error: {err}"),
        }
    }
}

impl std::error::Error for ExprErr {}

impl From<ParseErr> for ExprErr {
    fn from(err: ParseErr) -> Self {
        Self::Parse(err)
    }
}

impl From<CompileErr> for ExprErr {
    fn from(err: CompileErr) -> Self {
        Self::Compile(err)
    }
}

/// A function of `x` written in the expression language.
#[derive(Debug)]
pub struct Expression {
    src: Arc<String>,
    prog: Program,
    compiled: Compiled,
}

impl Expression {
    pub fn new(src: impl Into<String>) -> Result<Self, ExprErr> {
        Self::with_idents(Arc::new(src.into()), &stdlib::standard_idents())
    }

    pub fn with_idents(src: Arc<String>, idents: &Idents) -> Result<Self, ExprErr> {
        let prog = parse::parse(Lexer::new(&src), idents)?;
        let compiled = eval::compile(&prog, idents)?;
        Ok(Self {
            src,
            prog,
            compiled,
        })
    }

    pub fn src(&self) -> Arc<String> {
        Arc::clone(&self.src)
    }

    #[inline]
    pub const fn program(&self) -> &Program {
        &self.prog
    }
}

impl Function for Expression {
    #[inline]
    fn eval(&self, x: Number) -> Number {
        self.compiled.eval(x)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use core::f64::consts;

    #[test]
    fn evaluates_common_functions() {
        let f = Expression::new("sin(x) + cos(x)^2 - log(8, 2)").unwrap();
        assert_relative_eq!(f.eval(0.0), 1.0 - 3.0, epsilon = 1e-12);
        assert_relative_eq!(f.eval(consts::FRAC_PI_2), 1.0 - 3.0, epsilon = 1e-12);

        let g = Expression::new("exp(-x^2 / 2)").unwrap();
        assert_relative_eq!(g.eval(1.0), (-0.5f64).exp());
        assert_eq!(g.to_string(), "exp(-x^2 / 2)");
    }

    #[test]
    fn errors_point_into_the_source() {
        let err = Expression::new("x + cosh(x) + y").unwrap_err();
        assert!(matches!(err, ExprErr::Compile(_)));
        assert_eq!(err.loc().map(SubStr::get), Some("y"));

        let err = Expression::new("x | 2").unwrap_err();
        assert!(matches!(err, ExprErr::Parse(_)));
        assert_eq!(err.loc().map(SubStr::start), Some(2));
    }

    #[test]
    fn program_lists_postfix_operations() {
        let f = Expression::new("2*x").unwrap();
        let listing: Vec<String> = f.program().ops().map(ToString::to_string).collect();
        assert_eq!(listing, ["push 2", "load 'x'", "call 'mul'"]);
    }
}
