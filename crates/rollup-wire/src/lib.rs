//! Wire shapes exchanged with the configuration service.
//!
//! Everything here is id-free and sparse: a field is only present when it is
//! applicable and differs from its implied default.

pub mod operands;
pub mod option;

pub use operands::{OperatorType, RollupOperatorOperands};
pub use option::{
    CapabilityParameters, ConfigurationOption, Constraint, ConstraintOperator, ConstraintType,
    Criterion, SetOperator,
};
