//! Proportional allocation of secret work according to secret capacities.

use tracing::{Level, debug, instrument};

use crate::{
    builder::{Error, ProgramBuilder},
    party::Party,
    program::Output,
    value::SecretValue,
};

/// The name of the output carrying the allocation of collaborator `i`.
pub fn allocated_work_name(prefix: &str, i: usize) -> String {
    format!("{prefix}{i}")
}

/// The output name prefix used when no other prefix is configured.
pub const DEFAULT_OUTPUT_PREFIX: &str = "allocated_work_collaborator";

/// Allocates the work of every collaborator in proportion to its share of the total capacity.
///
/// For every collaborator `i` this declares an output `allocated_work_collaborator<i>` for
/// `out_party`, carrying `work[i] * (capacity[i] / total_capacity)` where `total_capacity` is the
/// sum of all capacities. The sum is built once and shared by all divisions, and the outputs are
/// declared in collaborator order.
///
/// The capacities must not sum up to zero. This is not checked here (the values are secret), the
/// division fails when the program is evaluated.
pub fn allocate_work(
    b: &mut ProgramBuilder,
    nr_collaborators: usize,
    work: &[SecretValue],
    capacity: &[SecretValue],
    out_party: &Party,
) -> Result<Vec<Output>, Error> {
    allocate_work_with_prefix(
        b,
        nr_collaborators,
        work,
        capacity,
        out_party,
        DEFAULT_OUTPUT_PREFIX,
    )
}

/// Like [`allocate_work`], but names the outputs `<output_prefix><i>`.
#[instrument(level = Level::DEBUG, skip(b, work, capacity), err)]
pub fn allocate_work_with_prefix(
    b: &mut ProgramBuilder,
    nr_collaborators: usize,
    work: &[SecretValue],
    capacity: &[SecretValue],
    out_party: &Party,
    output_prefix: &str,
) -> Result<Vec<Output>, Error> {
    if work.len() != nr_collaborators || capacity.len() != nr_collaborators {
        return Err(Error::LengthMismatch {
            expected: nr_collaborators,
            work: work.len(),
            capacity: capacity.len(),
        });
    }
    let Some((&first, rest)) = capacity.split_first() else {
        return Ok(vec![]);
    };

    let mut total_capacity = first;
    for &c in rest {
        total_capacity = b.add(total_capacity, c)?;
    }
    debug!(node = %total_capacity.id(), "Built total capacity");

    let mut allocated_work = Vec::with_capacity(nr_collaborators);
    for (i, (&w, &c)) in work.iter().zip(capacity).enumerate() {
        let ratio = b.div(c, total_capacity)?;
        let allocated = b.mul(w, ratio)?;
        allocated_work.push(b.output(
            allocated,
            allocated_work_name(output_prefix, i),
            out_party,
        )?);
    }
    Ok(allocated_work)
}

#[cfg(test)]
mod tests {
    use super::allocate_work;
    use crate::{
        builder::{Error, ProgramBuilder},
        circuit::Op,
        party::Party,
        value::SecretValue,
    };

    fn inputs(
        b: &mut ProgramBuilder,
        n: usize,
    ) -> Result<(Vec<SecretValue>, Vec<SecretValue>, Party), Error> {
        let mut work = vec![];
        let mut capacity = vec![];
        for i in 0..n {
            let p = b.party(format!("Collaborator{i}"))?;
            work.push(b.secret_unsigned_integer(format!("work_{i}"), &p)?);
            capacity.push(b.secret_unsigned_integer(format!("capacity_{i}"), &p)?);
        }
        let out = b.party("OutParty")?;
        Ok((work, capacity, out))
    }

    #[test]
    fn total_capacity_is_built_once() -> Result<(), Error> {
        for n in [1, 2, 5] {
            let mut b = ProgramBuilder::new();
            let (work, capacity, out) = inputs(&mut b, n)?;
            let outputs = allocate_work(&mut b, n, &work, &capacity, &out)?;
            assert_eq!(outputs.len(), n);

            let circuit = b.circuit();
            assert_eq!(circuit.count(|op| matches!(op, Op::Add(_, _))), n - 1);
            assert_eq!(circuit.count(|op| matches!(op, Op::Div(_, _))), n);
            assert_eq!(circuit.count(|op| matches!(op, Op::Mul(_, _))), n);

            let divisors: Vec<_> = circuit
                .nodes()
                .iter()
                .filter_map(|node| match node.op {
                    Op::Div(_, total) => Some(total),
                    _ => None,
                })
                .collect();
            assert!(divisors.windows(2).all(|w| w[0] == w[1]));
        }
        Ok(())
    }

    #[test]
    fn outputs_are_named_in_collaborator_order() -> Result<(), Error> {
        let mut b = ProgramBuilder::new();
        let (work, capacity, out) = inputs(&mut b, 3)?;
        let outputs = allocate_work(&mut b, 3, &work, &capacity, &out)?;
        let names: Vec<_> = outputs.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "allocated_work_collaborator0",
                "allocated_work_collaborator1",
                "allocated_work_collaborator2"
            ]
        );
        assert!(outputs.iter().all(|o| o.party == out));
        // work[i] * (capacity[i] / total)
        let circuit = b.circuit();
        for (i, output) in outputs.iter().enumerate() {
            let Some(Op::Mul(w, ratio)) = circuit.get(output.value.id()).map(|n| n.op) else {
                panic!("allocation {i} is not a product");
            };
            assert_eq!(w, work[i].id());
            let Some(Op::Div(c, _)) = circuit.get(ratio).map(|n| n.op) else {
                panic!("allocation {i} does not scale by a ratio");
            };
            assert_eq!(c, capacity[i].id());
        }
        Ok(())
    }

    #[test]
    fn zero_collaborators_allocate_nothing() -> Result<(), Error> {
        let mut b = ProgramBuilder::new();
        let out = b.party("OutParty")?;
        assert!(allocate_work(&mut b, 0, &[], &[], &out)?.is_empty());
        assert_eq!(b.node_count(), 0);
        Ok(())
    }

    #[test]
    fn mismatched_lengths_fail() -> Result<(), Error> {
        let mut b = ProgramBuilder::new();
        let (work, capacity, out) = inputs(&mut b, 3)?;
        assert_eq!(
            allocate_work(&mut b, 3, &work[..2], &capacity, &out),
            Err(Error::LengthMismatch {
                expected: 3,
                work: 2,
                capacity: 3
            })
        );
        assert_eq!(
            allocate_work(&mut b, 2, &work, &capacity, &out),
            Err(Error::LengthMismatch {
                expected: 2,
                work: 3,
                capacity: 3
            })
        );
        Ok(())
    }
}
