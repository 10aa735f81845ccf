//! Construction of programs by declaring parties, inputs, arithmetic and outputs.
//!
//! A [`ProgramBuilder`] owns the arena of value nodes. Arithmetic never evaluates anything, it
//! appends a node whose operands are existing handles and returns a handle to the new node.
//! Since secret values cannot be inspected while the program is built, there is no way to branch
//! on them: conditional logic must be expressed arithmetically (see [`crate::selector`]).
//!
//! All names are checked for uniqueness as soon as they are declared, so that an assembled
//! [`Program`] never silently overwrites a binding.

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::{
    circuit::{Circuit, Node, NodeId, Op},
    party::Party,
    program::{Input, Output, Program},
    value::{Literal, SecretValue, Ty},
};

/// Errors raised while a program is being assembled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A party with the same name has already been declared.
    #[error("party {0} is declared twice")]
    DuplicateParty(Party),
    /// The party has not been declared in this program.
    #[error("party {0} is not declared")]
    UnknownParty(Party),
    /// An input with the same name has already been declared.
    #[error("input {0} is declared twice")]
    DuplicateInput(String),
    /// The party already receives an output with the same name.
    #[error("output {name} is declared twice for party {party}")]
    DuplicateOutput {
        /// The name of the output.
        name: String,
        /// The recipient of the output.
        party: Party,
    },
    /// The per-party sequences do not have the declared number of elements.
    #[error(
        "expected {expected} elements per party sequence, found {work} work and {capacity} capacity values"
    )]
    LengthMismatch {
        /// The declared number of parties.
        expected: usize,
        /// The number of work values.
        work: usize,
        /// The number of capacity values.
        capacity: usize,
    },
    /// The handle does not belong to this builder.
    #[error("value {0} does not belong to this program")]
    UnknownValue(NodeId),
    /// The operands of an operation live in incompatible domains.
    #[error("cannot {op} {lhs} and {rhs}")]
    TypeMismatch {
        /// The operation that was attempted.
        op: &'static str,
        /// The type of the left operand.
        lhs: Ty,
        /// The type of the right operand.
        rhs: Ty,
    },
}

/// Builds a [`Program`] in a single pass.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    parties: Vec<Party>,
    party_names: HashSet<Party>,
    inputs: Vec<Input>,
    input_names: HashSet<String>,
    outputs: Vec<Output>,
    output_names: HashSet<(Party, String)>,
    circuit: Circuit,
}

impl ProgramBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a new party.
    pub fn party(&mut self, name: impl Into<String>) -> Result<Party, Error> {
        let party = Party::new(name);
        if !self.party_names.insert(party.clone()) {
            return Err(Error::DuplicateParty(party));
        }
        debug!(party = party.name(), "Declared party");
        self.parties.push(party.clone());
        Ok(party)
    }

    /// Declares an input of type `ty`, provided by `party` at evaluation time.
    pub fn input(
        &mut self,
        name: impl Into<String>,
        party: &Party,
        ty: Ty,
    ) -> Result<SecretValue, Error> {
        let name = name.into();
        if !self.party_names.contains(party) {
            return Err(Error::UnknownParty(party.clone()));
        }
        if self.input_names.contains(&name) {
            return Err(Error::DuplicateInput(name));
        }
        let id = self.circuit.push(Node {
            op: Op::Input(self.inputs.len()),
            ty,
        });
        let value = SecretValue { id, ty };
        debug!(input = name.as_str(), party = party.name(), %ty, "Declared input");
        self.input_names.insert(name.clone());
        self.inputs.push(Input {
            name,
            party: party.clone(),
            value,
        });
        Ok(value)
    }

    /// Declares a secret unsigned integer input, provided by `party` at evaluation time.
    pub fn secret_unsigned_integer(
        &mut self,
        name: impl Into<String>,
        party: &Party,
    ) -> Result<SecretValue, Error> {
        self.input(name, party, Ty::SecretUnsignedInteger)
    }

    /// Declares a secret signed integer input, provided by `party` at evaluation time.
    pub fn secret_integer(
        &mut self,
        name: impl Into<String>,
        party: &Party,
    ) -> Result<SecretValue, Error> {
        self.input(name, party, Ty::SecretInteger)
    }

    /// Embeds a public constant.
    pub fn literal(&mut self, literal: Literal) -> SecretValue {
        let ty = literal.ty();
        let id = self.circuit.push(Node {
            op: Op::Literal(literal),
            ty,
        });
        SecretValue { id, ty }
    }

    /// Appends `lhs + rhs`.
    pub fn add(&mut self, lhs: SecretValue, rhs: SecretValue) -> Result<SecretValue, Error> {
        self.binary(lhs, rhs, Op::Add)
    }

    /// Appends `lhs - rhs`.
    pub fn sub(&mut self, lhs: SecretValue, rhs: SecretValue) -> Result<SecretValue, Error> {
        self.binary(lhs, rhs, Op::Sub)
    }

    /// Appends `lhs * rhs`.
    pub fn mul(&mut self, lhs: SecretValue, rhs: SecretValue) -> Result<SecretValue, Error> {
        self.binary(lhs, rhs, Op::Mul)
    }

    /// Appends the secure division `lhs / rhs`.
    ///
    /// Rounding and division by zero are defined by the domain the program is evaluated in.
    pub fn div(&mut self, lhs: SecretValue, rhs: SecretValue) -> Result<SecretValue, Error> {
        self.binary(lhs, rhs, Op::Div)
    }

    fn binary(
        &mut self,
        lhs: SecretValue,
        rhs: SecretValue,
        op: fn(NodeId, NodeId) -> Op,
    ) -> Result<SecretValue, Error> {
        self.check(lhs)?;
        self.check(rhs)?;
        let op = op(lhs.id, rhs.id);
        let Some(ty) = lhs.ty.combine(rhs.ty) else {
            return Err(Error::TypeMismatch {
                op: op.name(),
                lhs: lhs.ty,
                rhs: rhs.ty,
            });
        };
        let id = self.circuit.push(Node { op, ty });
        Ok(SecretValue { id, ty })
    }

    fn check(&self, value: SecretValue) -> Result<(), Error> {
        match self.circuit.get(value.id) {
            Some(node) if node.ty == value.ty => Ok(()),
            _ => Err(Error::UnknownValue(value.id)),
        }
    }

    /// Declares that `value` is delivered to `party` under `name`.
    pub fn output(
        &mut self,
        value: SecretValue,
        name: impl Into<String>,
        party: &Party,
    ) -> Result<Output, Error> {
        let name = name.into();
        self.check(value)?;
        if !self.party_names.contains(party) {
            return Err(Error::UnknownParty(party.clone()));
        }
        if !self.output_names.insert((party.clone(), name.clone())) {
            return Err(Error::DuplicateOutput {
                name,
                party: party.clone(),
            });
        }
        debug!(output = name.as_str(), party = party.name(), node = %value.id, "Declared output");
        let output = Output {
            value,
            name,
            party: party.clone(),
        };
        self.outputs.push(output.clone());
        Ok(output)
    }

    /// The number of nodes appended so far.
    pub fn node_count(&self) -> usize {
        self.circuit.len()
    }

    /// The nodes appended so far.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Finishes the program.
    pub fn build(self) -> Program {
        debug!(
            parties = self.parties.len(),
            inputs = self.inputs.len(),
            outputs = self.outputs.len(),
            nodes = self.circuit.len(),
            "Assembled program"
        );
        Program {
            parties: self.parties,
            inputs: self.inputs,
            outputs: self.outputs,
            circuit: self.circuit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ProgramBuilder};
    use crate::{
        circuit::Op,
        party::Party,
        value::{Literal, Ty},
    };

    #[test]
    fn arithmetic_appends_nodes() -> Result<(), Error> {
        let mut b = ProgramBuilder::new();
        let p = b.party("Collaborator0")?;
        let x = b.secret_unsigned_integer("x", &p)?;
        let one = b.literal(Literal::Unsigned(1));
        let y = b.sub(one, x)?;
        let z = b.mul(y, x)?;

        assert_eq!(y.ty(), Ty::SecretUnsignedInteger);
        assert_eq!(b.node_count(), 4);
        assert_eq!(b.circuit().nodes()[z.id().index()].op, Op::Mul(y.id(), x.id()));
        // the operands are left untouched
        assert_eq!(b.circuit().nodes()[x.id().index()].op, Op::Input(0));
        Ok(())
    }

    #[test]
    fn duplicate_names_fail() -> Result<(), Error> {
        let mut b = ProgramBuilder::new();
        let p = b.party("Collaborator0")?;
        let q = b.party("Collaborator1")?;
        assert_eq!(
            b.party("Collaborator0"),
            Err(Error::DuplicateParty(Party::new("Collaborator0")))
        );

        let x = b.secret_unsigned_integer("work_0", &p)?;
        assert_eq!(
            b.secret_unsigned_integer("work_0", &q),
            Err(Error::DuplicateInput("work_0".to_string()))
        );

        b.output(x, "result", &p)?;
        b.output(x, "result", &q)?;
        assert_eq!(
            b.output(x, "result", &p),
            Err(Error::DuplicateOutput {
                name: "result".to_string(),
                party: p.clone()
            })
        );
        assert_eq!(b.build().outputs().len(), 2);
        Ok(())
    }

    #[test]
    fn undeclared_party_fails() {
        let mut b = ProgramBuilder::new();
        let stranger = Party::new("Stranger");
        assert_eq!(
            b.secret_unsigned_integer("x", &stranger),
            Err(Error::UnknownParty(stranger))
        );
    }

    #[test]
    fn mixed_signedness_fails() -> Result<(), Error> {
        let mut b = ProgramBuilder::new();
        let p = b.party("Collaborator0")?;
        let x = b.secret_unsigned_integer("x", &p)?;
        let y = b.secret_integer("y", &p)?;
        assert_eq!(
            b.add(x, y),
            Err(Error::TypeMismatch {
                op: "add",
                lhs: Ty::SecretUnsignedInteger,
                rhs: Ty::SecretInteger
            })
        );
        Ok(())
    }

    #[test]
    fn foreign_handles_fail() -> Result<(), Error> {
        let mut other = ProgramBuilder::new();
        let p = other.party("Collaborator0")?;
        other.secret_unsigned_integer("a", &p)?;
        let foreign = other.secret_unsigned_integer("b", &p)?;

        let mut b = ProgramBuilder::new();
        let p = b.party("Collaborator0")?;
        let x = b.secret_unsigned_integer("x", &p)?;
        assert_eq!(b.add(x, foreign), Err(Error::UnknownValue(foreign.id())));
        Ok(())
    }
}
