//! A circuit description layer for secure multi-party computation (MPC) over secret-shared
//! integers.
//!
//! This crate builds, at definition time, a static arithmetic circuit over values contributed by
//! multiple named parties. The circuit is later evaluated by an MPC runtime (not part of this
//! crate) without revealing the individual inputs. Secret values cannot be inspected while the
//! circuit is built, so all conditional logic is expressed arithmetically.
//!
//! ## Main Components
//!
//! * [`builder`]: The [`builder::ProgramBuilder`] which declares parties, inputs, arithmetic and
//!   outputs, and checks names for uniqueness.
//! * [`selector`]: Branch-free selection of a value based on a sequence of secret flags.
//! * [`allocator`]: Proportional allocation of secret work according to secret capacities.
//! * [`assembler`]: The complete work allocation program, configured by [`config`].
//! * [`program`]: The assembled [`program::Program`], which can be serialized for a runtime.
//! * [`eval`]: Cleartext reference evaluation, useful to check what a program computes.
//!
//! ## Example
//!
//! ```
//! use std::collections::HashMap;
//!
//! use polyshare::{
//!     assembler::work_allocation_program,
//!     config::AllocationConfig,
//!     eval::{Ratio, evaluate},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let program = work_allocation_program(&AllocationConfig::with_collaborators(2))?;
//!
//! let inputs = HashMap::from([
//!     ("work_0".to_string(), Ratio::from(100u64)),
//!     ("capacity_0".to_string(), Ratio::from(1u64)),
//!     ("work_1".to_string(), Ratio::from(100u64)),
//!     ("capacity_1".to_string(), Ratio::from(1u64)),
//! ]);
//! let allocated = evaluate(&program, &inputs)?;
//! assert_eq!(allocated, vec![Ratio::from(50u64), Ratio::from(50u64)]);
//! # Ok(())
//! # }
//! ```
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod allocator;
pub mod assembler;
pub mod builder;
pub mod circuit;
pub mod config;
pub mod eval;
pub mod party;
pub mod program;
pub mod selector;
pub mod value;

mod utils;
