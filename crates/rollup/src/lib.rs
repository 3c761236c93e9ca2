//! Capability rollup tree engine.
//!
//! Trees are hydrated from resolved defaults, edited through copy-on-write
//! operators, revalidated after every edit and diffed against their default
//! at save time. Nothing in here performs I/O.

pub mod command;
pub mod defaults;
pub mod entry;
pub mod error;
pub mod inspect;
pub mod locator;
pub mod mutation;
pub mod save;
pub mod scope;
pub mod serializer;
pub mod session;
pub mod validator;

pub use command::{Command, NodeRef, TreeTarget};
pub use defaults::{DefaultsSource, StationDefaults};
pub use entry::{
    LeafKind, RollupEntry, RollupId, RollupTree, RollupType, Threshold, ThresholdField, same_set,
};
pub use error::{Error, Result};
pub use locator::Location;
pub use save::{OverrideStore, SaveDecision, decide_save};
pub use scope::Scope;
pub use serializer::{ChangeStatus, diff_against_default, hydrate, serialize};
pub use session::{Batch, Session};
pub use validator::{
    ErrorKind, ErrorMap, ErrorRecord, NodeReport, ValidationContext, validate_node, validate_tree,
    validate_tree_records,
};

pub use rollup_wire as wire;
