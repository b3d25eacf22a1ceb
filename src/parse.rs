// SPDX: CC0-1.0

// shunting yard algorithm by dijkstra (see https://en.wikipedia.org/wiki/Shunting_yard_algorithm)

use crate::{
    eval::{Associativity, Ident, IdentKey, Idents, Operation, OperationTyp, OperatorTyp, Program},
    lex::{LexErr, LexErrTyp, Lexer, SubStr, TokTyp},
    Number,
};
use core::{fmt, num::ParseFloatError};

#[derive(Debug)]
pub enum ParseErrTyp {
    LexErr(LexErrTyp),
    ParseNum(ParseFloatError),
    ParenMismatch,
}

impl fmt::Display for ParseErrTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LexErr(err) => write!(f, "{err}"),
            Self::ParseNum(err) => write!(f, "invalid number: {err}"),
            Self::ParenMismatch => write!(f, "mismatched parentheses"),
        }
    }
}

#[derive(Debug)]
pub struct ParseErr {
    pub typ: ParseErrTyp,
    pub loc: SubStr,
}

impl fmt::Display for ParseErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.typ)
    }
}

impl From<LexErr> for ParseErr {
    fn from(err: LexErr) -> Self {
        Self {
            typ: ParseErrTyp::LexErr(err.typ),
            loc: err.loc,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ShuntOpTyp {
    Operator(OperatorTyp),
    Fun,
    OpenParen,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ShuntOp {
    typ: ShuntOpTyp,
    loc: SubStr,
}

impl ShuntOp {
    fn precedence(&self) -> i8 {
        match self.typ {
            ShuntOpTyp::Operator(op) => op.precedence(),
            // applied to the operand directly after it, so `sin x + 1` is `sin(x) + 1`
            ShuntOpTyp::Fun => i8::MAX,
            ShuntOpTyp::OpenParen => i8::MIN,
        }
    }

    /// Whether this stacked op must be output before pushing `incoming`.
    fn yields_to(&self, incoming: OperatorTyp) -> bool {
        if self.typ == ShuntOpTyp::OpenParen || incoming.is_prefix() {
            return false;
        }
        let (mine, theirs) = (self.precedence(), incoming.precedence());
        mine > theirs || (mine == theirs && incoming.associativity() == Associativity::Left)
    }

    fn into_output(self) -> Option<Operation> {
        let typ = match self.typ {
            ShuntOpTyp::Operator(typ) => OperationTyp::Operator(typ),
            ShuntOpTyp::Fun => OperationTyp::Ident,
            ShuntOpTyp::OpenParen => return None,
        };
        Some(Operation { typ, loc: self.loc })
    }
}

pub fn parse(lex: Lexer<'_>, idents: &Idents) -> Result<Program, ParseErr> {
    let mut out: Vec<Operation> = Vec::new(); // output
    let mut ops: Vec<ShuntOp> = Vec::new(); // operator stack

    for tok in lex {
        let tok = tok?;
        match tok.typ {
            TokTyp::Number => {
                let num: Number = tok.loc.get().parse().map_err(|err| ParseErr {
                    typ: ParseErrTyp::ParseNum(err),
                    loc: tok.loc.clone(),
                })?;
                out.push(Operation {
                    typ: OperationTyp::Val(num),
                    loc: tok.loc,
                });
            }

            TokTyp::Ident => {
                if let Some(Ident::Fun(_)) = idents.get(&IdentKey::from(tok.loc.clone())) {
                    ops.push(ShuntOp {
                        typ: ShuntOpTyp::Fun,
                        loc: tok.loc,
                    });
                } else {
                    // variables, constants, and unknown names (reported when compiling)
                    out.push(Operation {
                        typ: OperationTyp::Ident,
                        loc: tok.loc,
                    });
                }
            }

            TokTyp::Op(o1) => {
                while let Some(o2) = ops.pop_if_yields(o1) {
                    out.extend(o2.into_output());
                }
                ops.push(ShuntOp {
                    typ: ShuntOpTyp::Operator(o1),
                    loc: tok.loc,
                });
            }

            TokTyp::Comma => {
                while let Some(op) = ops.pop_unless_paren() {
                    out.extend(op.into_output());
                }
            }

            TokTyp::OpenParen => {
                ops.push(ShuntOp {
                    typ: ShuntOpTyp::OpenParen,
                    loc: tok.loc,
                });
            }

            TokTyp::CloseParen => {
                while let Some(op) = ops.pop_unless_paren() {
                    out.extend(op.into_output());
                }

                // discard the matching open parenthesis
                if ops.pop().is_none() {
                    return Err(ParseErr {
                        typ: ParseErrTyp::ParenMismatch,
                        loc: tok.loc,
                    });
                }

                // a function name right before the parenthesis applies to it
                if let Some(op) = ops.pop_if_fun() {
                    out.extend(op.into_output());
                }
            }

            TokTyp::XGreater
            | TokTyp::XLess
            | TokTyp::XEqual
            | TokTyp::XPipe
            | TokTyp::XOpenSquareBracket
            | TokTyp::XCloseSquareBracket
            | TokTyp::XOpenCurly
            | TokTyp::XCloseCurly => {
                return Err(ParseErr {
                    typ: ParseErrTyp::LexErr(LexErrTyp::Unsupported(tok.typ)),
                    loc: tok.loc,
                })
            }
        }
    }

    while let Some(op) = ops.pop() {
        let loc = op.loc.clone();
        match op.into_output() {
            Some(op) => out.push(op),
            None => {
                return Err(ParseErr {
                    typ: ParseErrTyp::ParenMismatch,
                    loc,
                })
            }
        }
    }

    Ok(Program::new(out))
}

trait ShuntStack {
    fn pop_if_yields(&mut self, incoming: OperatorTyp) -> Option<ShuntOp>;
    fn pop_unless_paren(&mut self) -> Option<ShuntOp>;
    fn pop_if_fun(&mut self) -> Option<ShuntOp>;
}

impl ShuntStack for Vec<ShuntOp> {
    fn pop_if_yields(&mut self, incoming: OperatorTyp) -> Option<ShuntOp> {
        if self.last()?.yields_to(incoming) {
            self.pop()
        } else {
            None
        }
    }

    fn pop_unless_paren(&mut self) -> Option<ShuntOp> {
        if self.last()?.typ == ShuntOpTyp::OpenParen {
            None
        } else {
            self.pop()
        }
    }

    fn pop_if_fun(&mut self) -> Option<ShuntOp> {
        if self.last()?.typ == ShuntOpTyp::Fun {
            self.pop()
        } else {
            None
        }
    }
}
