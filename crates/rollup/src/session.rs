//! Editing session for one station: every capability tree of the station,
//! the defaults they diff against and the combined error map.
//!
//! Compound edits go through a [`Batch`]: each affected tree gets an
//! ordinary copy-on-write update, and the session only swaps trees and
//! error reports in once the whole batch succeeded.

use std::collections::BTreeMap;

use rollup_wire::RollupOperatorOperands;

use crate::command::Command;
use crate::defaults::{DefaultsSource, StationDefaults};
use crate::entry::{RollupId, RollupTree};
use crate::error::{Error, Result};
use crate::save::{OverrideStore, SaveDecision, decide_save};
use crate::scope::Scope;
use crate::serializer::{ChangeStatus, hydrate};
use crate::validator::{ErrorMap, NodeReport, validate_node, validate_tree};

struct ScopeState {
    tree: RollupTree,
    default: RollupOperatorOperands,
    universe: Vec<String>,
}

pub struct Session {
    station: String,
    scopes: BTreeMap<Scope, ScopeState>,
    errors: ErrorMap,
}

/// Staged updates of one compound edit.
#[derive(Debug, Default)]
pub struct Batch {
    staged: BTreeMap<Scope, RollupTree>,
    reports: Vec<NodeReport>,
    forgotten: Vec<RollupId>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest version of the tree for `scope`, staged or committed.
    pub fn current<'a>(&'a self, session: &'a Session, scope: &Scope) -> Result<&'a RollupTree> {
        match self.staged.get(scope) {
            Some(tree) => Ok(tree),
            None => session.tree(scope),
        }
    }

    pub fn stage(&mut self, scope: Scope, tree: RollupTree, reports: Vec<NodeReport>) {
        self.reports.extend(reports);
        self.staged.insert(scope, tree);
    }

    /// Ids of removed nodes whose errors must be dropped on commit.
    pub fn forget(&mut self, ids: impl IntoIterator<Item = RollupId>) {
        let start = self.forgotten.len();
        self.forgotten.extend(ids);
        let forgotten = &self.forgotten[start..];
        self.reports
            .retain(|report| !forgotten.contains(&report.node_id));
    }
}

impl Session {
    /// Hydrate a station capability tree per group and a channel capability
    /// tree per group and channel. Any scope without a resolved default fails
    /// the whole load.
    pub fn load(
        station: &str,
        groups: &[String],
        channels: &[String],
        source: &dyn DefaultsSource,
    ) -> Result<Self> {
        let mut scopes = BTreeMap::new();
        for group in groups {
            let station_scope = Scope::station(station, group);
            let channel_scopes = channels
                .iter()
                .map(|channel| Scope::channel(station, group, channel));
            for scope in std::iter::once(station_scope).chain(channel_scopes) {
                let default = source
                    .resolved_default(&scope)
                    .ok_or_else(|| Error::MissingDefault {
                        scope: scope.clone(),
                    })?;
                let universe = source.known_universe(&scope);
                let tree = hydrate(&default, scope.leaf_kind(), &universe);
                scopes.insert(
                    scope,
                    ScopeState {
                        tree,
                        default,
                        universe,
                    },
                );
            }
        }

        let mut session = Self {
            station: station.to_string(),
            scopes,
            errors: ErrorMap::new(),
        };
        session.revalidate();
        log::debug!(
            "loaded {} capability trees for station {station}",
            session.scopes.len()
        );
        Ok(session)
    }

    pub fn from_defaults(defaults: &StationDefaults) -> Result<Self> {
        Self::load(
            &defaults.station_name,
            &defaults.groups(),
            &defaults.channels,
            defaults,
        )
    }

    pub fn station(&self) -> &str {
        &self.station
    }

    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.keys()
    }

    pub fn trees(&self) -> impl Iterator<Item = (&Scope, &RollupTree)> {
        self.scopes.iter().map(|(scope, state)| (scope, &state.tree))
    }

    fn state(&self, scope: &Scope) -> Result<&ScopeState> {
        self.scopes.get(scope).ok_or_else(|| Error::UnknownScope {
            scope: scope.clone(),
        })
    }

    pub fn tree(&self, scope: &Scope) -> Result<&RollupTree> {
        self.state(scope).map(|state| &state.tree)
    }

    pub fn universe(&self, scope: &Scope) -> Result<&[String]> {
        self.state(scope).map(|state| state.universe.as_slice())
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// Resume editing from a previously persisted override. The default
    /// stays the diff baseline.
    pub fn restore(&mut self, scope: &Scope, operands: &RollupOperatorOperands) -> Result<()> {
        let state = self.scopes.get_mut(scope).ok_or_else(|| Error::UnknownScope {
            scope: scope.clone(),
        })?;
        let replaced: Vec<RollupId> = state.tree.walk().map(|entry| entry.id.clone()).collect();
        state.tree = hydrate(operands, scope.leaf_kind(), &state.universe);
        self.errors.forget(&replaced);
        self.errors
            .apply_all(validate_tree(&state.tree, &scope.validation_context()));
        log::debug!("{scope}: restored from stored override");
        Ok(())
    }

    /// Rebuild the error map from a full pass over every tree.
    pub fn revalidate(&mut self) {
        let mut errors = ErrorMap::new();
        for (scope, state) in &self.scopes {
            errors.apply_all(validate_tree(&state.tree, &scope.validation_context()));
        }
        self.errors = errors;
    }

    /// Swap in every staged tree, then apply the combined error report.
    pub fn commit(&mut self, batch: Batch) -> Result<usize> {
        for scope in batch.staged.keys() {
            self.state(scope)?;
        }
        let replaced = batch.staged.len();
        for (scope, tree) in batch.staged {
            if let Some(state) = self.scopes.get_mut(&scope) {
                state.tree = tree;
            }
        }
        self.errors.forget(&batch.forgotten);
        self.errors.apply_all(batch.reports);
        log::debug!(
            "committed {replaced} tree update(s), {} error(s) outstanding",
            self.errors.len()
        );
        Ok(replaced)
    }

    /// Include or exclude `channel` in every group's station capability tree.
    pub fn toggle_channel(&mut self, channel: &str, included: bool) -> Result<usize> {
        self.apply(&Command::ToggleChannel {
            channel: channel.to_string(),
            included,
        })
    }

    /// Include or exclude `monitor` in channel capability trees, either all
    /// of them or only those of `channel` under every group.
    pub fn toggle_monitor(
        &mut self,
        monitor: &str,
        included: bool,
        channel: Option<&str>,
    ) -> Result<usize> {
        self.apply(&Command::ToggleMonitor {
            monitor: monitor.to_string(),
            included,
            channel: channel.map(str::to_string),
        })
    }

    /// Apply one command atomically. Returns the number of trees replaced.
    pub fn apply(&mut self, command: &Command) -> Result<usize> {
        self.apply_all(std::slice::from_ref(command))
    }

    /// Apply a sequence of commands as one edit: either all of them land or
    /// none does.
    pub fn apply_all(&mut self, commands: &[Command]) -> Result<usize> {
        let mut batch = Batch::new();
        for command in commands {
            match command {
                Command::ToggleChannel { channel, included } => {
                    let scopes = self.scopes_where(|scope| scope.channel_name.is_none());
                    self.stage_propagation(&mut batch, &scopes, channel, *included)?;
                }
                Command::ToggleMonitor {
                    monitor,
                    included,
                    channel,
                } => {
                    let scopes = self.scopes_where(|scope| match (&scope.channel_name, channel) {
                        (None, _) => false,
                        (Some(_), None) => true,
                        (Some(name), Some(channel)) => name == channel,
                    });
                    self.stage_propagation(&mut batch, &scopes, monitor, *included)?;
                }
                _ => self.stage_tree_command(&mut batch, command)?,
            }
        }
        self.commit(batch)
    }

    fn scopes_where(&self, keep: impl Fn(&Scope) -> bool) -> Vec<Scope> {
        self.scopes.keys().filter(|scope| keep(scope)).cloned().collect()
    }

    fn stage_propagation(
        &self,
        batch: &mut Batch,
        scopes: &[Scope],
        leaf: &str,
        included: bool,
    ) -> Result<()> {
        for scope in scopes {
            let tree = batch.current(self, scope)?;
            let (next, reports) = tree.propagate_toggle(leaf, included, &scope.validation_context());
            batch.stage(scope.clone(), next, reports);
        }
        Ok(())
    }

    fn stage_tree_command(&self, batch: &mut Batch, command: &Command) -> Result<()> {
        let Some(target) = command.target() else {
            return Ok(());
        };
        let scope = target.scope(&self.station);
        let universe = self.universe(&scope)?;
        let context = scope.validation_context();
        let tree = batch.current(self, &scope)?;
        let seed_or_universe =
            |seed: &Option<Vec<String>>| seed.clone().unwrap_or_else(|| universe.to_vec());

        let (next, touched, mut forgotten) = match command {
            Command::ToggleMember {
                node,
                member,
                included,
                ..
            } => {
                let id = node.resolve(tree)?;
                let next = tree.toggle_membership(id.as_str(), member, *included)?;
                (next, vec![id], Vec::new())
            }
            Command::ChangeRollupType {
                node,
                rollup_type,
                seed,
                ..
            } => {
                let id = node.resolve(tree)?;
                let next = tree.change_rollup_type(id.as_str(), *rollup_type, &seed_or_universe(seed))?;
                // children turn active or inert together with their parent
                let touched: Vec<RollupId> = next
                    .get(id.as_str())?
                    .walk()
                    .map(|entry| entry.id.clone())
                    .collect();
                (next, touched, Vec::new())
            }
            Command::ChangeOperatorType {
                node,
                operator_type,
                ..
            } => {
                let id = node.resolve(tree)?;
                let next = tree.change_operator_type(id.as_str(), *operator_type)?;
                (next, vec![id], Vec::new())
            }
            Command::SetThreshold {
                node, field, value, ..
            } => {
                let id = node.resolve(tree)?;
                let next = tree.set_threshold(id.as_str(), *field, *value)?;
                (next, vec![id], Vec::new())
            }
            Command::AddChild { node, seed, .. } => {
                let parent = node.resolve(tree)?;
                let (next, child) = tree.add_child(parent.as_str(), &seed_or_universe(seed))?;
                (next, vec![parent, child], Vec::new())
            }
            Command::DeleteChild { node, .. } => {
                let id = node.resolve(tree)?;
                let location = tree.locate(id.as_str())?;
                let removed: Vec<RollupId> = tree
                    .get(id.as_str())?
                    .walk()
                    .map(|entry| entry.id.clone())
                    .collect();
                let next = tree.delete_child(id.as_str())?;
                match location.parent {
                    Some(parent) => (next, vec![parent], removed),
                    None => (next, Vec::new(), Vec::new()),
                }
            }
            Command::SelectAll { node, .. } => {
                let id = node.resolve(tree)?;
                let next = tree.select_all(id.as_str(), universe)?;
                (next, vec![id], Vec::new())
            }
            Command::DeselectAll { node, .. } => {
                let id = node.resolve(tree)?;
                let next = tree.deselect_all(id.as_str())?;
                (next, vec![id], Vec::new())
            }
            Command::ToggleChannel { .. } | Command::ToggleMonitor { .. } => return Ok(()),
        };

        let mut reports = Vec::new();
        for id in touched {
            if next.is_active(id.as_str())? {
                reports.push(validate_node(next.get(id.as_str())?, &context));
            } else {
                forgotten.push(id);
            }
        }
        batch.forget(forgotten);
        batch.stage(scope, next, reports);
        Ok(())
    }

    /// Save decision of every scope. Outstanding validation errors block
    /// saving altogether.
    pub fn save_decisions(&self, store: &dyn OverrideStore) -> Result<Vec<(Scope, SaveDecision)>> {
        if !self.errors.is_empty() {
            log::warn!(
                "station {}: save blocked by {} validation error(s)",
                self.station,
                self.errors.len()
            );
            return Err(Error::ValidationBlocked {
                errors: self.errors.len(),
            });
        }
        Ok(self
            .scopes
            .iter()
            .map(|(scope, state)| {
                let decision = decide_save(scope, &state.tree, &state.default, &state.universe, store);
                (scope.clone(), decision)
            })
            .collect())
    }

    /// Change status of every scope, regardless of validation state.
    pub fn change_status(&self) -> Vec<(Scope, ChangeStatus)> {
        self.scopes
            .iter()
            .map(|(scope, state)| {
                (
                    scope.clone(),
                    state.tree.diff_against_default(&state.default, &state.universe),
                )
            })
            .collect()
    }

    /// Leaves that active nodes still select but that are no longer in the
    /// scope's universe.
    pub fn conflicts(&self) -> Vec<(Scope, Vec<String>)> {
        self.scopes
            .iter()
            .filter_map(|(scope, state)| {
                let conflicted = state.tree.conflicted_members(&state.universe);
                (!conflicted.is_empty()).then(|| (scope.clone(), conflicted))
            })
            .collect()
    }
}
