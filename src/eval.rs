//! Plaintext reference evaluation of assembled programs.
//!
//! An MPC runtime evaluates a [`Program`] over secret shares. This module evaluates the same
//! circuit over cleartext values, which makes it possible to check what a program computes (and
//! which domain errors it runs into) without running any protocol. The numeric semantics are
//! supplied by an [`Arithmetic`] domain:
//!
//! - `u64`: checked unsigned integers with truncating division,
//! - `i64`: checked signed integers with Euclidean division,
//! - [`Ratio`]: exact rationals of arbitrary size, for programs whose results assume exact
//!   division.

use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use num::{BigInt, BigRational, Signed, Zero, traits};
use thiserror::Error;
use tracing::{Level, debug, instrument};

use crate::{
    circuit::{CircuitError, NodeId, Op},
    program::Program,
    value::Literal,
};

/// Errors raised by the arithmetic domain while evaluating a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// No value was provided for the named input.
    #[error("missing value for input {0}")]
    MissingInput(String),
    /// A value was provided for an input that the program does not declare.
    #[error("program has no input named {0}")]
    UnexpectedInput(String),
    /// The divisor of a division was zero.
    #[error("division by zero at node {0}")]
    DivisionByZero(NodeId),
    /// The result of an operation does not fit into the domain.
    #[error("arithmetic overflow at node {0}")]
    Overflow(NodeId),
    /// The literal cannot be represented in the domain.
    #[error("literal {literal} at node {node} is not representable")]
    InvalidLiteral {
        /// The node of the literal.
        node: NodeId,
        /// The literal value.
        literal: Literal,
    },
    /// The circuit of the program is ill-formed.
    #[error("invalid circuit: {0}")]
    Circuit(#[from] CircuitError),
}

/// A numeric domain in which programs can be evaluated.
///
/// All operations return `None` if the result is not representable.
pub trait Arithmetic: Sized + Clone + fmt::Debug {
    /// Converts a public constant into the domain.
    fn from_literal(literal: Literal) -> Option<Self>;
    /// `self + rhs`.
    fn add(&self, rhs: &Self) -> Option<Self>;
    /// `self - rhs`.
    fn sub(&self, rhs: &Self) -> Option<Self>;
    /// `self * rhs`.
    fn mul(&self, rhs: &Self) -> Option<Self>;
    /// `self / rhs`, only called with a non-zero `rhs`.
    fn div(&self, rhs: &Self) -> Option<Self>;
    /// Returns `true` for the additive identity.
    fn is_zero(&self) -> bool;
    /// Returns `true` for values below zero, which unsigned nodes must never hold.
    fn is_negative(&self) -> bool;
}

impl Arithmetic for u64 {
    fn from_literal(literal: Literal) -> Option<Self> {
        match literal {
            Literal::Unsigned(n) => Some(n),
            Literal::Signed(n) => u64::try_from(n).ok(),
        }
    }

    fn add(&self, rhs: &Self) -> Option<Self> {
        self.checked_add(*rhs)
    }

    fn sub(&self, rhs: &Self) -> Option<Self> {
        self.checked_sub(*rhs)
    }

    fn mul(&self, rhs: &Self) -> Option<Self> {
        self.checked_mul(*rhs)
    }

    fn div(&self, rhs: &Self) -> Option<Self> {
        self.checked_div(*rhs)
    }

    fn is_zero(&self) -> bool {
        *self == 0
    }

    fn is_negative(&self) -> bool {
        false
    }
}

impl Arithmetic for i64 {
    fn from_literal(literal: Literal) -> Option<Self> {
        match literal {
            Literal::Unsigned(n) => i64::try_from(n).ok(),
            Literal::Signed(n) => Some(n),
        }
    }

    fn add(&self, rhs: &Self) -> Option<Self> {
        self.checked_add(*rhs)
    }

    fn sub(&self, rhs: &Self) -> Option<Self> {
        self.checked_sub(*rhs)
    }

    fn mul(&self, rhs: &Self) -> Option<Self> {
        self.checked_mul(*rhs)
    }

    fn div(&self, rhs: &Self) -> Option<Self> {
        self.checked_div_euclid(*rhs)
    }

    fn is_zero(&self) -> bool {
        *self == 0
    }

    fn is_negative(&self) -> bool {
        *self < 0
    }
}

/// An exact rational number of arbitrary size, always kept in lowest terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ratio(BigRational);

impl Ratio {
    /// The rational `0`.
    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    /// Creates `numer / denom`, or `None` if `denom` is zero.
    pub fn new(numer: impl Into<BigInt>, denom: impl Into<BigInt>) -> Option<Self> {
        let denom = denom.into();
        if denom.is_zero() {
            return None;
        }
        Some(Self(BigRational::new(numer.into(), denom)))
    }

    /// The integer `n` as a rational.
    pub fn integer(n: impl Into<BigInt>) -> Self {
        Self(BigRational::from_integer(n.into()))
    }

    /// The numerator in lowest terms.
    pub fn numer(&self) -> &BigInt {
        self.0.numer()
    }

    /// The (positive) denominator in lowest terms.
    pub fn denom(&self) -> &BigInt {
        self.0.denom()
    }

    /// Returns the value if it is an integer.
    pub fn to_integer(&self) -> Option<BigInt> {
        self.0.is_integer().then(|| self.0.to_integer())
    }
}

impl From<u64> for Ratio {
    fn from(n: u64) -> Self {
        Self::integer(n)
    }
}

impl From<i64> for Ratio {
    fn from(n: i64) -> Self {
        Self::integer(n)
    }
}

impl From<BigRational> for Ratio {
    fn from(value: BigRational) -> Self {
        Self(value)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Arithmetic for Ratio {
    fn from_literal(literal: Literal) -> Option<Self> {
        match literal {
            Literal::Unsigned(n) => Some(n.into()),
            Literal::Signed(n) => Some(n.into()),
        }
    }

    fn add(&self, rhs: &Self) -> Option<Self> {
        traits::CheckedAdd::checked_add(&self.0, &rhs.0).map(Self)
    }

    fn sub(&self, rhs: &Self) -> Option<Self> {
        traits::CheckedSub::checked_sub(&self.0, &rhs.0).map(Self)
    }

    fn mul(&self, rhs: &Self) -> Option<Self> {
        traits::CheckedMul::checked_mul(&self.0, &rhs.0).map(Self)
    }

    fn div(&self, rhs: &Self) -> Option<Self> {
        traits::CheckedDiv::checked_div(&self.0, &rhs.0).map(Self)
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    fn is_negative(&self) -> bool {
        self.0.is_negative()
    }
}

/// Evaluates all outputs of `program` in cleartext, in the order the outputs were declared.
///
/// `inputs` maps every input name of the program to its value. Every node of the circuit is
/// evaluated, so a domain error fails the evaluation even if the node does not reach an output.
/// Unsigned nodes and inputs holding a negative value fail with [`EvalError::Overflow`], in every
/// domain.
#[instrument(level = Level::DEBUG, skip_all, err, fields(nodes = program.circuit().len()))]
pub fn evaluate<A: Arithmetic>(
    program: &Program,
    inputs: &HashMap<String, A>,
) -> Result<Vec<A>, EvalError> {
    let declared: HashSet<&str> = program
        .inputs()
        .iter()
        .map(|input| input.name.as_str())
        .collect();
    if let Some(name) = inputs.keys().find(|name| !declared.contains(name.as_str())) {
        return Err(EvalError::UnexpectedInput(name.clone()));
    }

    let nodes = program.circuit().nodes();
    let mut values: Vec<A> = Vec::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        let id = NodeId(i);
        let value = match node.op {
            Op::Input(input) => {
                let Some(input) = program.inputs().get(input) else {
                    return Err(CircuitError::InvalidInput { node: id, input }.into());
                };
                match inputs.get(&input.name) {
                    Some(value) => value.clone(),
                    None => return Err(EvalError::MissingInput(input.name.clone())),
                }
            }
            Op::Literal(literal) => {
                A::from_literal(literal).ok_or(EvalError::InvalidLiteral { node: id, literal })?
            }
            Op::Add(x, y) | Op::Sub(x, y) | Op::Mul(x, y) | Op::Div(x, y) => {
                let (Some(x), Some(y)) = (values.get(x.0), values.get(y.0)) else {
                    let operand = if x.0 >= i { x } else { y };
                    return Err(CircuitError::OperandNotBefore { node: id, operand }.into());
                };
                let result = match node.op {
                    Op::Add(_, _) => x.add(y),
                    Op::Sub(_, _) => x.sub(y),
                    Op::Mul(_, _) => x.mul(y),
                    _ => {
                        if y.is_zero() {
                            return Err(EvalError::DivisionByZero(id));
                        }
                        x.div(y)
                    }
                };
                result.ok_or(EvalError::Overflow(id))?
            }
        };
        if !node.ty.is_signed() && value.is_negative() {
            return Err(EvalError::Overflow(id));
        }
        values.push(value);
    }

    let mut outputs = Vec::with_capacity(program.outputs().len());
    for output in program.outputs() {
        match values.get(output.value.id.0) {
            Some(value) => outputs.push(value.clone()),
            None => return Err(CircuitError::MissingNode(output.value.id).into()),
        }
    }
    debug!(outputs = outputs.len(), "Evaluated program");
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use num::BigInt;

    use super::{Arithmetic, EvalError, Ratio, evaluate};
    use crate::{builder::ProgramBuilder, circuit::NodeId, value::Literal};

    #[test]
    fn ratio_is_normalized() {
        assert_eq!(Ratio::new(2, 4), Ratio::new(1, 2));
        assert_eq!(Ratio::new(3, -6), Ratio::new(-1, 2));
        assert_eq!(Ratio::new(0, -5), Some(Ratio::zero()));
        assert_eq!(Ratio::new(1, 0), None);
        assert_eq!(
            Ratio::new(6, 3).and_then(|r| r.to_integer()),
            Some(BigInt::from(2))
        );
    }

    #[test]
    fn ratio_arithmetic() {
        let half = Ratio::new(1, 2).unwrap();
        let third = Ratio::new(1, 3).unwrap();
        assert_eq!(half.add(&third), Ratio::new(5, 6));
        assert_eq!(half.sub(&third), Ratio::new(1, 6));
        assert_eq!(half.mul(&third), Ratio::new(1, 6));
        assert_eq!(half.div(&third), Ratio::new(3, 2));
        assert_eq!(half.to_string(), "1/2");
        assert_eq!(Ratio::from(42u64).to_string(), "42");
    }

    #[test]
    fn ratio_products_do_not_overflow() {
        let max = Ratio::from(u64::MAX);
        let cube = max.mul(&max).and_then(|square| square.mul(&max));
        assert_eq!(
            cube.and_then(|cube| cube.to_integer()),
            Some(BigInt::from(u64::MAX).pow(3))
        );
        assert_eq!(
            max.sub(&Ratio::from(i64::MIN)).map(|r| r.is_negative()),
            Some(false)
        );
    }

    #[test]
    fn integer_domains() {
        assert_eq!(7u64.div(&2), Some(3));
        assert_eq!(1u64.sub(&2), None);
        assert_eq!((-7i64).div(&2), Some(-4));
        assert_eq!(u64::from_literal(Literal::Signed(-1)), None);
        assert_eq!(i64::from_literal(Literal::Unsigned(u64::MAX)), None);
    }

    #[test]
    fn evaluates_outputs_in_order() -> Result<(), Box<dyn std::error::Error>> {
        let mut b = ProgramBuilder::new();
        let p = b.party("Alice")?;
        let x = b.secret_unsigned_integer("x", &p)?;
        let y = b.secret_unsigned_integer("y", &p)?;
        let sum = b.add(x, y)?;
        let quot = b.div(x, y)?;
        b.output(quot, "quot", &p)?;
        b.output(sum, "sum", &p)?;
        let program = b.build();

        let inputs = HashMap::from([("x".to_string(), 9u64), ("y".to_string(), 2)]);
        assert_eq!(evaluate(&program, &inputs)?, vec![4, 11]);
        Ok(())
    }

    #[test]
    fn input_errors() -> Result<(), Box<dyn std::error::Error>> {
        let mut b = ProgramBuilder::new();
        let p = b.party("Alice")?;
        let x = b.secret_unsigned_integer("x", &p)?;
        b.output(x, "x", &p)?;
        let program = b.build();

        let missing: HashMap<String, u64> = HashMap::new();
        assert_eq!(
            evaluate(&program, &missing),
            Err(EvalError::MissingInput("x".to_string()))
        );
        let extra = HashMap::from([("x".to_string(), 1u64), ("z".to_string(), 2)]);
        assert_eq!(
            evaluate(&program, &extra),
            Err(EvalError::UnexpectedInput("z".to_string()))
        );
        Ok(())
    }

    #[test]
    fn domain_errors() -> Result<(), Box<dyn std::error::Error>> {
        let mut b = ProgramBuilder::new();
        let p = b.party("Alice")?;
        let x = b.secret_unsigned_integer("x", &p)?;
        let zero = b.literal(Literal::Unsigned(0));
        let underflow = b.sub(zero, x)?;
        b.output(underflow, "underflow", &p)?;
        let program = b.build();

        let inputs = HashMap::from([("x".to_string(), 1u64)]);
        assert_eq!(
            evaluate(&program, &inputs),
            Err(EvalError::Overflow(underflow.id()))
        );
        let inputs = HashMap::from([("x".to_string(), Ratio::from(1u64))]);
        assert_eq!(
            evaluate(&program, &inputs),
            Err(EvalError::Overflow(underflow.id()))
        );
        let inputs = HashMap::from([("x".to_string(), -1i64)]);
        assert_eq!(
            evaluate(&program, &inputs),
            Err(EvalError::Overflow(x.id()))
        );

        let mut b = ProgramBuilder::new();
        let p = b.party("Alice")?;
        let x = b.secret_unsigned_integer("x", &p)?;
        let zero = b.literal(Literal::Unsigned(0));
        let quot = b.div(x, zero)?;
        b.output(quot, "quot", &p)?;
        let inputs = HashMap::from([("x".to_string(), 1u64)]);
        assert_eq!(
            evaluate(&b.build(), &inputs),
            Err(EvalError::DivisionByZero(NodeId(2)))
        );
        Ok(())
    }

    #[test]
    fn negative_values_only_fit_signed_nodes() -> Result<(), Box<dyn std::error::Error>> {
        let mut b = ProgramBuilder::new();
        let p = b.party("Alice")?;
        let x = b.secret_unsigned_integer("x", &p)?;
        let y = b.secret_integer("y", &p)?;
        let zero = b.literal(Literal::Signed(0));
        let negated = b.sub(zero, y)?;
        b.output(x, "x", &p)?;
        b.output(negated, "negated", &p)?;
        let program = b.build();

        let inputs = HashMap::from([
            ("x".to_string(), Ratio::from(-5i64)),
            ("y".to_string(), Ratio::from(5i64)),
        ]);
        assert_eq!(evaluate(&program, &inputs), Err(EvalError::Overflow(x.id())));

        let inputs = HashMap::from([
            ("x".to_string(), Ratio::from(5u64)),
            ("y".to_string(), Ratio::from(5i64)),
        ]);
        assert_eq!(
            evaluate(&program, &inputs)?,
            vec![Ratio::from(5u64), Ratio::from(-5i64)]
        );
        Ok(())
    }
}
