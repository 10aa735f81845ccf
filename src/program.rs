//! An assembled program: the parties, input and output bindings and the circuit connecting them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    circuit::{Circuit, CircuitError, Op},
    party::Party,
    utils::{deserialize, serialize},
    value::{SecretValue, Ty},
};

/// A secret slot owned by a party, filled in by that party at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    /// The program-wide unique name of the input.
    pub name: String,
    /// The party providing the input.
    pub party: Party,
    /// The value node bound to the input.
    pub value: SecretValue,
}

/// A computed value delivered to a party under a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    /// The value to deliver.
    pub value: SecretValue,
    /// The name under which the party receives the value, unique per party.
    pub name: String,
    /// The recipient.
    pub party: Party,
}

/// Errors raised when loading a serialized program.
#[derive(Debug, Error)]
pub enum Error {
    /// The bytes are not a serialized program.
    #[error("could not (de-)serialize program: {0}")]
    Serde(#[from] bincode::Error),
    /// The circuit of the program is ill-formed.
    #[error("invalid circuit: {0}")]
    Circuit(#[from] CircuitError),
    /// An input or output refers to a party that is not declared.
    #[error("party {0} is not declared in the program")]
    UnknownParty(Party),
    /// The node of an input does not read that input.
    #[error("input {0} is not bound to its own input node")]
    UnboundInput(String),
    /// An output refers to a node that is missing or has a different type.
    #[error("output {0} refers to a missing or differently typed node")]
    DanglingOutput(String),
    /// A name is used twice where it must be unique.
    #[error("name {0} is declared more than once")]
    DuplicateName(String),
}

/// The result of assembling a program, ready to be handed to an MPC runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub(crate) parties: Vec<Party>,
    pub(crate) inputs: Vec<Input>,
    pub(crate) outputs: Vec<Output>,
    pub(crate) circuit: Circuit,
}

impl Program {
    /// All declared parties, in declaration order.
    pub fn parties(&self) -> &[Party] {
        &self.parties
    }

    /// All declared inputs, in declaration order.
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// All declared outputs, in declaration order.
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// The computation graph.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Looks up an output by recipient and name.
    pub fn output(&self, party: &Party, name: &str) -> Option<&Output> {
        self.outputs
            .iter()
            .find(|out| &out.party == party && out.name == name)
    }

    /// Returns a one-line summary of the node counts per operation.
    pub fn report_ops(&self) -> String {
        self.circuit.report_ops()
    }

    /// Serializes the program for an external runtime.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(serialize(self)?)
    }

    /// Deserializes a program and checks that it is well-formed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let program: Program = deserialize(bytes)?;
        program.validate()?;
        debug!(
            inputs = program.inputs.len(),
            outputs = program.outputs.len(),
            nodes = program.circuit.len(),
            "Loaded program"
        );
        Ok(program)
    }

    /// Checks the invariants that [`crate::builder::ProgramBuilder`] guarantees by construction.
    pub fn validate(&self) -> Result<(), Error> {
        let mut parties = HashSet::new();
        for party in &self.parties {
            if !parties.insert(party) {
                return Err(Error::DuplicateName(party.name().to_string()));
            }
        }
        let input_types: Vec<Ty> = self.inputs.iter().map(|input| input.value.ty).collect();
        self.circuit.validate(&input_types)?;

        let mut input_names = HashSet::new();
        for (i, input) in self.inputs.iter().enumerate() {
            if !parties.contains(&input.party) {
                return Err(Error::UnknownParty(input.party.clone()));
            }
            if !input_names.insert(input.name.as_str()) {
                return Err(Error::DuplicateName(input.name.clone()));
            }
            match self.circuit.get(input.value.id) {
                Some(node) if node.op == Op::Input(i) => {}
                _ => return Err(Error::UnboundInput(input.name.clone())),
            }
        }

        let mut output_names = HashSet::new();
        for output in &self.outputs {
            if !parties.contains(&output.party) {
                return Err(Error::UnknownParty(output.party.clone()));
            }
            if !output_names.insert((&output.party, output.name.as_str())) {
                return Err(Error::DuplicateName(output.name.clone()));
            }
            match self.circuit.get(output.value.id) {
                Some(node) if node.ty == output.value.ty => {}
                _ => return Err(Error::DanglingOutput(output.name.clone())),
            }
        }
        Ok(())
    }
}
