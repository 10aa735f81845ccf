//! Branch-free selection of secret values based on secret boolean flags.
//!
//! Flags are secret integers that are either `0` or `1`. Because they cannot be inspected while
//! the program is built, selection is expressed as arithmetic: a single step recombines the
//! running value with the flag as `flag * acc + (1 - flag) * zero`.

use crate::{
    builder::{Error, ProgramBuilder},
    value::{Literal, SecretValue},
};

/// Folds `flags` from the left over an accumulator seeded with `zero`.
///
/// Every step computes `flag * acc + (1 - flag) * zero`. Note that `val` only determines the
/// domain of the result and never enters a step: the accumulator starts out as `zero` and every
/// step maps `zero` to `zero`. The result therefore evaluates to `0` for every flag sequence,
/// including the empty one, which returns the seed unchanged. Use [`return_val_if_all_true`] for
/// a selection that can actually produce `val`.
pub fn return_val_if_any_false(
    b: &mut ProgramBuilder,
    flags: &[SecretValue],
    val: SecretValue,
) -> Result<SecretValue, Error> {
    let zero = b.literal(Literal::zero(val.ty()));
    fold_flags(b, flags, zero, zero)
}

/// Folds `flags` from the left over an accumulator seeded with `val`.
///
/// Uses the same step as [`return_val_if_any_false`], so the result evaluates to `val` if every
/// flag is `1` and to `0` as soon as one flag is `0`. An empty sequence returns `val`.
pub fn return_val_if_all_true(
    b: &mut ProgramBuilder,
    flags: &[SecretValue],
    val: SecretValue,
) -> Result<SecretValue, Error> {
    let zero = b.literal(Literal::zero(val.ty()));
    fold_flags(b, flags, val, zero)
}

fn fold_flags(
    b: &mut ProgramBuilder,
    flags: &[SecretValue],
    seed: SecretValue,
    zero: SecretValue,
) -> Result<SecretValue, Error> {
    if flags.is_empty() {
        return Ok(seed);
    }
    let one = b.literal(Literal::one(zero.ty()));
    let mut acc = seed;
    for &flag in flags {
        let keep = b.mul(flag, acc)?;
        let not_flag = b.sub(one, flag)?;
        let drop = b.mul(not_flag, zero)?;
        acc = b.add(keep, drop)?;
    }
    Ok(acc)
}
