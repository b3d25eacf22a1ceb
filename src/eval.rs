// SPDX: CC0-1.0

use crate::{lex::SubStr, stdlib, Function, Number};
use core::fmt;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorTyp {
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
}

impl OperatorTyp {
    pub const fn exhaustive() -> &'static [OperatorTyp] {
        &[
            Self::Neg,
            Self::Add,
            Self::Sub,
            Self::Mul,
            Self::Div,
            Self::Pow,
        ]
    }

    pub const fn precedence(&self) -> i8 {
        match self {
            Self::Add => 2,
            Self::Sub => 2,
            Self::Mul => 3,
            Self::Div => 3,
            Self::Neg => 4,
            Self::Pow => 5,
        }
    }

    pub const fn associativity(&self) -> Associativity {
        use Associativity::{Left, Right};
        match self {
            Self::Neg => Right,
            Self::Add => Left,
            Self::Sub => Left,
            Self::Mul => Left,
            Self::Div => Left,
            Self::Pow => Right,
        }
    }

    /// Prefix operators take their operand from the right.
    pub const fn is_prefix(&self) -> bool {
        matches!(self, Self::Neg)
    }

    pub const fn fun(&self) -> (&'static str, Fun) {
        match self {
            Self::Neg => ("neg", Fun::Unary(stdlib::neg)),
            Self::Add => ("add", Fun::Binary(stdlib::add)),
            Self::Sub => ("sub", Fun::Binary(stdlib::sub)),
            Self::Mul => ("mul", Fun::Binary(stdlib::mul)),
            Self::Div => ("div", Fun::Binary(stdlib::div)),
            Self::Pow => ("pow", Fun::Binary(stdlib::pow)),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum OperationTyp {
    Operator(OperatorTyp),
    Val(Number),
    Ident,
}

#[derive(Clone, Debug)]
pub struct Operation {
    pub typ: OperationTyp,
    pub loc: SubStr,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.typ {
            OperationTyp::Val(val) => write!(f, "push {val}"),
            OperationTyp::Operator(typ) => write!(f, "call '{}'", typ.fun().0),
            OperationTyp::Ident => write!(f, "load '{}'", self.loc.get()),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Fun {
    Unary(fn(Number) -> Number),
    Binary(fn(Number, Number) -> Number),
}

impl Fun {
    pub const fn arity(&self) -> usize {
        match self {
            Self::Unary(_) => 1,
            Self::Binary(_) => 2,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Ident {
    /// The free variable, bound at evaluation time.
    Var,
    Const(Number),
    Fun(Fun),
}

impl Ident {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Var => "variable",
            Self::Const(_) => "constant",
            Self::Fun(_) => "function",
        }
    }
}

#[derive(Clone, Debug, Eq)]
pub enum IdentKey {
    Arc(SubStr),
    Static(&'static str),
}

impl PartialEq for IdentKey {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl core::hash::Hash for IdentKey {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.get().hash(state)
    }
}

impl IdentKey {
    pub fn get(&self) -> &str {
        match self {
            Self::Arc(s) => s.get(),
            Self::Static(s) => s,
        }
    }
}

impl fmt::Display for IdentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get())
    }
}

impl From<SubStr> for IdentKey {
    fn from(s: SubStr) -> Self {
        Self::Arc(s)
    }
}

impl From<&'static str> for IdentKey {
    fn from(s: &'static str) -> Self {
        Self::Static(s)
    }
}

pub type Idents = HashMap<IdentKey, Ident>;

/// Postfix operations produced by the parser.
#[derive(Debug)]
pub struct Program {
    pub(crate) ops: Vec<Operation>,
}

impl Program {
    #[inline]
    pub const fn new(ops: Vec<Operation>) -> Self {
        Self { ops }
    }

    #[inline]
    pub fn ops(&self) -> core::slice::Iter<'_, Operation> {
        self.ops.iter()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Similar {
    pub name: String,
    pub kind: &'static str,
}

#[derive(Debug)]
pub enum CompileErrTyp {
    Empty,
    MissingArgs {
        name: IdentKey,
        arity: usize,
        found: usize,
    },
    StackMismatch {
        expected: usize,
        found: usize,
    },
    UndefinedIdent {
        text: SubStr,
        similar: Option<Similar>,
    },
}

#[derive(Debug)]
pub struct CompileErr {
    pub typ: CompileErrTyp,
    pub op: Option<Operation>, // if none, associated with end-of-program checking
}

impl fmt::Display for CompileErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.typ {
            CompileErrTyp::Empty => write!(f, "cannot evaluate empty program"),

            CompileErrTyp::MissingArgs { name, arity, found } => write!(
                f,
                "function '{name}' requires {arity} argument{s}, but found {found}",
                s = if *arity == 1 { "" } else { "s" }
            ),

            CompileErrTyp::StackMismatch { expected, found } => write!(
                f,
                "expected {expected} value{s} on the stack but found {found}",
                s = if *expected == 1 { "" } else { "s" }
            ),

            CompileErrTyp::UndefinedIdent { text, .. } => {
                write!(f, "undefined identifier '{}'", text.get())
            }
        }
    }
}

fn most_similar(text: &str, idents: &Idents) -> Option<Similar> {
    let text = text.to_ascii_lowercase();
    idents
        .iter()
        .map(|(key, ident)| {
            (
                strsim::normalized_damerau_levenshtein(&text, &key.get().to_ascii_lowercase()),
                (key, ident),
            )
        })
        .reduce(|acc, elem| if elem.0 > acc.0 { elem } else { acc })
        .filter(|(sim, _)| *sim > 0.3)
        .map(|(_, (key, ident))| Similar {
            name: key.get().to_string(),
            kind: ident.kind(),
        })
}

#[derive(Clone, Copy, Debug)]
enum Step {
    Push(Number),
    Load,
    Call(Fun),
}

/// A program with every identifier resolved and its stack use checked.
#[derive(Clone, Debug)]
pub struct Compiled {
    steps: Vec<Step>,
    depth: usize,
}

pub fn compile(prog: &Program, idents: &Idents) -> Result<Compiled, CompileErr> {
    fn call(depth: usize, op: &Operation, name: IdentKey, fun: Fun) -> Result<Step, CompileErr> {
        if depth < fun.arity() {
            Err(CompileErr {
                typ: CompileErrTyp::MissingArgs {
                    name,
                    arity: fun.arity(),
                    found: depth,
                },
                op: Some(op.clone()),
            })
        } else {
            Ok(Step::Call(fun))
        }
    }

    if prog.ops.is_empty() {
        return Err(CompileErr {
            typ: CompileErrTyp::Empty,
            op: None,
        });
    }

    let mut steps = Vec::with_capacity(prog.ops.len());
    let mut depth = 0;
    let mut max_depth = 0;
    for op in prog.ops() {
        let step = match op.typ {
            OperationTyp::Val(val) => Step::Push(val),

            OperationTyp::Operator(typ) => {
                let (name, fun) = typ.fun();
                call(depth, op, name.into(), fun)?
            }

            OperationTyp::Ident => match idents.get(&IdentKey::from(op.loc.clone())) {
                Some(Ident::Var) => Step::Load,
                Some(Ident::Const(val)) => Step::Push(*val),
                Some(Ident::Fun(fun)) => call(depth, op, op.loc.clone().into(), *fun)?,
                None => {
                    return Err(CompileErr {
                        typ: CompileErrTyp::UndefinedIdent {
                            text: op.loc.clone(),
                            similar: most_similar(op.loc.get(), idents),
                        },
                        op: Some(op.clone()),
                    })
                }
            },
        };

        depth = match step {
            Step::Push(_) | Step::Load => depth + 1,
            Step::Call(fun) => depth - fun.arity() + 1,
        };
        max_depth = max_depth.max(depth);
        steps.push(step);
    }

    if depth != 1 {
        return Err(CompileErr {
            typ: CompileErrTyp::StackMismatch {
                expected: 1,
                found: depth,
            },
            op: None,
        });
    }

    Ok(Compiled {
        steps,
        depth: max_depth,
    })
}

impl Compiled {
    /// Evaluates at `x`. Stack use was checked by [`compile`].
    pub fn eval(&self, x: Number) -> Number {
        let mut stack: Vec<Number> = Vec::with_capacity(self.depth);
        for step in &self.steps {
            let val = match *step {
                Step::Push(val) => val,
                Step::Load => x,
                Step::Call(Fun::Unary(fun)) => match stack.pop() {
                    Some(a) => fun(a),
                    None => return Number::NAN,
                },
                Step::Call(Fun::Binary(fun)) => match (stack.pop(), stack.pop()) {
                    (Some(b), Some(a)) => fun(a, b),
                    _ => return Number::NAN,
                },
            };
            stack.push(val);
        }
        stack.pop().unwrap_or(Number::NAN)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Function for Compiled {
    #[inline]
    fn eval(&self, x: Number) -> Number {
        Compiled::eval(self, x)
    }
}
