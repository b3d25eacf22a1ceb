// SPDX: CC0-1.0

use crate::{eval::*, Number};
use core::f64::consts;
use std::collections::HashMap; // assumes Number = f64

/// Name of the free variable.
pub const X: &str = "x";

const UNARY: &[(&str, fn(Number) -> Number)] = &[
    ("abs", Number::abs),
    ("ln", Number::ln),
    ("exp", Number::exp),
    ("sqrt", Number::sqrt),
    ("floor", Number::floor),
    ("ceil", Number::ceil),
    // trig
    ("sin", Number::sin),
    ("cos", Number::cos),
    ("tan", Number::tan),
    ("asin", Number::asin),
    ("acos", Number::acos),
    ("atan", Number::atan),
    ("arcsin", Number::asin),
    ("arccos", Number::acos),
    ("arctan", Number::atan),
    ("sinh", Number::sinh),
    ("cosh", Number::cosh),
    ("tanh", Number::tanh),
];

const BINARY: &[(&str, fn(Number, Number) -> Number)] = &[
    ("log", log),
    ("min", Number::min),
    ("max", Number::max),
];

const CONSTS: &[(&str, Number)] = &[("pi", consts::PI), ("tau", consts::TAU), ("e", consts::E)];

pub fn standard_idents() -> Idents {
    let mut ret = HashMap::new();

    ret.insert(X.into(), Ident::Var);

    for op in OperatorTyp::exhaustive() {
        let (name, fun) = op.fun();
        ret.insert(name.into(), Ident::Fun(fun));
    }
    for &(name, fun) in UNARY {
        ret.insert(name.into(), Ident::Fun(Fun::Unary(fun)));
    }
    for &(name, fun) in BINARY {
        ret.insert(name.into(), Ident::Fun(Fun::Binary(fun)));
    }
    for &(name, val) in CONSTS {
        ret.insert(name.into(), Ident::Const(val));
    }
    ret
}

pub fn neg(x: Number) -> Number {
    -x
}

pub fn add(x: Number, y: Number) -> Number {
    x + y
}

pub fn sub(x: Number, y: Number) -> Number {
    x - y
}

pub fn mul(x: Number, y: Number) -> Number {
    x * y
}

pub fn div(x: Number, y: Number) -> Number {
    x / y
}

pub fn pow(x: Number, exp: Number) -> Number {
    x.powf(exp)
}

pub fn log(x: Number, base: Number) -> Number {
    x.log(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_is_unique() {
        let total = 1 + OperatorTyp::exhaustive().len() + UNARY.len() + BINARY.len() + CONSTS.len();
        assert_eq!(standard_idents().len(), total);
    }

    #[test]
    fn variable_is_registered() {
        assert!(matches!(standard_idents().get(&IdentKey::from(X)), Some(Ident::Var)));
    }
}
