//! Assembly of the work allocation program: collaborators, their inputs and the allocation.

use tracing::{Level, info, instrument};

use crate::{
    allocator::allocate_work_with_prefix,
    builder::{Error, ProgramBuilder},
    config::AllocationConfig,
    party::Party,
    program::{Output, Program},
    value::SecretValue,
};

/// Declares `nr_collaborators` parties named `<prefix><i>`.
pub fn initialize_collaborators(
    b: &mut ProgramBuilder,
    nr_collaborators: usize,
    prefix: &str,
) -> Result<Vec<Party>, Error> {
    (0..nr_collaborators)
        .map(|i| b.party(format!("{prefix}{i}")))
        .collect()
}

/// Secret per-collaborator work and capacity inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkAndCapacity {
    /// The work to be allocated, one value per collaborator.
    pub work: Vec<SecretValue>,
    /// The ability to do work, one value per collaborator.
    pub capacity: Vec<SecretValue>,
}

/// Binds a secret `work_<i>` and `capacity_<i>` input for every collaborator `i`.
pub fn initialize_work_and_capacity(
    b: &mut ProgramBuilder,
    collaborators: &[Party],
) -> Result<WorkAndCapacity, Error> {
    let defaults = AllocationConfig::default();
    initialize_named_work_and_capacity(
        b,
        collaborators,
        &defaults.work_prefix,
        &defaults.capacity_prefix,
    )
}

fn initialize_named_work_and_capacity(
    b: &mut ProgramBuilder,
    collaborators: &[Party],
    work_prefix: &str,
    capacity_prefix: &str,
) -> Result<WorkAndCapacity, Error> {
    let mut work = Vec::with_capacity(collaborators.len());
    let mut capacity = Vec::with_capacity(collaborators.len());
    for (i, collaborator) in collaborators.iter().enumerate() {
        work.push(b.secret_unsigned_integer(format!("{work_prefix}{i}"), collaborator)?);
        capacity.push(b.secret_unsigned_integer(format!("{capacity_prefix}{i}"), collaborator)?);
    }
    Ok(WorkAndCapacity { work, capacity })
}

/// Assembles the work allocation program.
///
/// The outputs of the returned program are the allocations for all collaborators, delivered to
/// the output party in collaborator order.
#[instrument(level = Level::DEBUG, skip_all, err, fields(collaborators = config.nr_collaborators))]
pub fn work_allocation_program(config: &AllocationConfig) -> Result<Program, Error> {
    let mut b = ProgramBuilder::new();

    let collaborators =
        initialize_collaborators(&mut b, config.nr_collaborators, &config.collaborator_prefix)?;
    let out_party = b.party(config.out_party.as_str())?;

    let WorkAndCapacity { work, capacity } = initialize_named_work_and_capacity(
        &mut b,
        &collaborators,
        &config.work_prefix,
        &config.capacity_prefix,
    )?;

    allocate_work_with_prefix(
        &mut b,
        config.nr_collaborators,
        &work,
        &capacity,
        &out_party,
        &config.output_prefix,
    )?;

    let program = b.build();
    info!("{}", program.report_ops());
    Ok(program)
}

/// The outputs of the work allocation program with the default configuration.
pub fn work_allocation_outputs() -> Result<Vec<Output>, Error> {
    let program = work_allocation_program(&AllocationConfig::default())?;
    Ok(program.outputs().to_vec())
}
