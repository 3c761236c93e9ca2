use crate::entry::{LeafKind, RollupType};
use crate::scope::Scope;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Engine errors. All of them are caller bugs or load failures; user
/// mistakes in a tree are reported by the validator instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No node with this id in the tree.
    NotFound { id: String },
    /// More than one node carries this id.
    Ambiguous { id: String, matches: usize },
    /// Leaf rollup type of the other kind requested for a tree.
    LeafKindMismatch { kind: LeafKind, requested: RollupType },
    /// No resolved default for a scope, so nothing to diff against.
    MissingDefault { scope: Scope },
    /// The session holds no tree for this scope.
    UnknownScope { scope: Scope },
    /// Child index path does not resolve.
    BadPath { path: Vec<usize> },
    /// Outstanding validation errors block saving.
    ValidationBlocked { errors: usize },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotFound { id } => write!(f, "no rollup entry with id '{id}'"),
            Error::Ambiguous { id, matches } => {
                write!(f, "{matches} rollup entries share id '{id}'")
            }
            Error::LeafKindMismatch { kind, requested } => write!(
                f,
                "{} cannot be used in a tree of {} rollups",
                requested.as_str(),
                kind.plural()
            ),
            Error::MissingDefault { scope } => write!(f, "no resolved default for {scope}"),
            Error::UnknownScope { scope } => write!(f, "no capability tree loaded for {scope}"),
            Error::BadPath { path } => write!(f, "no rollup entry at path {path:?}"),
            Error::ValidationBlocked { errors } => {
                write!(f, "save blocked by {errors} validation error(s)")
            }
        }
    }
}

impl std::error::Error for Error {}
