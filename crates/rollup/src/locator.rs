//! Find-by-id over a rollup tree.

use crate::entry::{RollupEntry, RollupId, RollupTree};
use crate::error::{Error, Result};

/// Where a node sits in its tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    /// 0 for the root, 1 for its children and so on.
    pub depth: usize,
    /// Index within the parent's `rollups`, 0 for the root.
    pub index: usize,
    /// Child indices from the root down to the node.
    pub path: Vec<usize>,
    pub parent: Option<RollupId>,
}

impl RollupTree {
    /// Locate `id`. Root ids resolve by their marker without a search.
    pub fn locate(&self, id: &str) -> Result<Location> {
        if RollupId::is_root_str(id) {
            return Ok(Location {
                depth: 0,
                index: 0,
                path: Vec::new(),
                parent: None,
            });
        }

        let mut matches = Vec::new();
        let mut path = Vec::new();
        collect_matches(&self.root, id, &mut path, &mut matches);

        match matches.len() {
            0 => Err(Error::NotFound { id: id.to_string() }),
            1 => Ok(matches.remove(0)),
            count => Err(Error::Ambiguous {
                id: id.to_string(),
                matches: count,
            }),
        }
    }

    pub fn get(&self, id: &str) -> Result<&RollupEntry> {
        let location = self.locate(id)?;
        self.node_at(&location.path)
    }

    pub fn node_at(&self, path: &[usize]) -> Result<&RollupEntry> {
        let mut node = &self.root;
        for &index in path {
            node = node.rollups.get(index).ok_or_else(|| Error::BadPath {
                path: path.to_vec(),
            })?;
        }
        Ok(node)
    }

    pub(crate) fn node_at_mut(&mut self, path: &[usize]) -> Result<&mut RollupEntry> {
        let mut node = &mut self.root;
        for &index in path {
            node = node.rollups.get_mut(index).ok_or_else(|| Error::BadPath {
                path: path.to_vec(),
            })?;
        }
        Ok(node)
    }

    /// Whether every ancestor of `id` is a rollup of rollups. Nodes below a
    /// leaf rollup type are inert.
    pub fn is_active(&self, id: &str) -> Result<bool> {
        let location = self.locate(id)?;
        let mut node = &self.root;
        for &index in &location.path {
            if !node.is_rollup_of_rollups() {
                return Ok(false);
            }
            node = node.rollups.get(index).ok_or_else(|| Error::BadPath {
                path: location.path.clone(),
            })?;
        }
        Ok(true)
    }

    /// Id of the node reached by following child indices from the root.
    pub fn id_at_path(&self, path: &[usize]) -> Result<RollupId> {
        self.node_at(path).map(|node| node.id.clone())
    }
}

fn collect_matches(
    parent: &RollupEntry,
    id: &str,
    path: &mut Vec<usize>,
    matches: &mut Vec<Location>,
) {
    for (index, child) in parent.rollups.iter().enumerate() {
        path.push(index);
        if child.id.as_str() == id {
            matches.push(Location {
                depth: path.len(),
                index,
                path: path.clone(),
                parent: Some(parent.id.clone()),
            });
        }
        collect_matches(child, id, path, matches);
        path.pop();
    }
}
