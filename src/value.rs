//! Handles to values in the computation graph and the numeric domains they live in.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::circuit::NodeId;

/// The numeric domain of a node in the computation graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ty {
    /// A secret-shared unsigned integer, only known to its owner.
    SecretUnsignedInteger,
    /// A secret-shared signed integer, only known to its owner.
    SecretInteger,
    /// A public unsigned integer, known to all parties.
    UnsignedInteger,
    /// A public signed integer, known to all parties.
    Integer,
}

impl Ty {
    /// Returns `true` if values of this type are secret-shared.
    pub fn is_secret(self) -> bool {
        matches!(self, Ty::SecretUnsignedInteger | Ty::SecretInteger)
    }

    /// Returns `true` if values of this type are signed.
    pub fn is_signed(self) -> bool {
        matches!(self, Ty::SecretInteger | Ty::Integer)
    }

    /// The secret counterpart of this type.
    pub fn to_secret(self) -> Self {
        if self.is_signed() {
            Ty::SecretInteger
        } else {
            Ty::SecretUnsignedInteger
        }
    }

    /// The public counterpart of this type.
    pub fn to_public(self) -> Self {
        if self.is_signed() {
            Ty::Integer
        } else {
            Ty::UnsignedInteger
        }
    }

    /// The type of a binary operation over `self` and `rhs`.
    ///
    /// Operands must agree in signedness. The result is secret as soon as one operand is.
    pub(crate) fn combine(self, rhs: Ty) -> Option<Ty> {
        if self.is_signed() != rhs.is_signed() {
            return None;
        }
        if self.is_secret() || rhs.is_secret() {
            Some(self.to_secret())
        } else {
            Some(self.to_public())
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Ty::SecretUnsignedInteger => "SecretUnsignedInteger",
            Ty::SecretInteger => "SecretInteger",
            Ty::UnsignedInteger => "UnsignedInteger",
            Ty::Integer => "Integer",
        };
        f.write_str(name)
    }
}

/// A public constant embedded in the computation graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Literal {
    /// An unsigned constant.
    Unsigned(u64),
    /// A signed constant.
    Signed(i64),
}

impl Literal {
    /// The (public) type of the literal.
    pub fn ty(self) -> Ty {
        match self {
            Literal::Unsigned(_) => Ty::UnsignedInteger,
            Literal::Signed(_) => Ty::Integer,
        }
    }

    /// The constant `0` in the domain of `ty`.
    pub fn zero(ty: Ty) -> Self {
        if ty.is_signed() {
            Literal::Signed(0)
        } else {
            Literal::Unsigned(0)
        }
    }

    /// The constant `1` in the domain of `ty`.
    pub fn one(ty: Ty) -> Self {
        if ty.is_signed() {
            Literal::Signed(1)
        } else {
            Literal::Unsigned(1)
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Unsigned(n) => write!(f, "{n}u"),
            Literal::Signed(n) => write!(f, "{n}"),
        }
    }
}

/// An opaque handle to a value node of a [`crate::builder::ProgramBuilder`].
///
/// Handles are cheap to copy. Combining them through the builder never changes the node they
/// point to, it appends a new node and returns a new handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretValue {
    pub(crate) id: NodeId,
    pub(crate) ty: Ty,
}

impl SecretValue {
    /// The node in the computation graph that holds this value.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The numeric domain of this value.
    pub fn ty(&self) -> Ty {
        self.ty
    }
}
