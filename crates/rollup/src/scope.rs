use rollup_wire::{Constraint, Criterion};
use serde::{Deserialize, Serialize};

use crate::entry::LeafKind;
use crate::validator::ValidationContext;

/// Key of one independent rollup tree and its override record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub station_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,
}

impl Scope {
    pub const OVERRIDE_SUFFIX: &'static str = "CAPABILITY_ROLLUP";

    /// Station capability of `station` within `group`.
    pub fn station(station: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            station_name: station.into(),
            group_name: Some(group.into()),
            channel_name: None,
        }
    }

    /// Channel capability of `channel` on `station` within `group`.
    pub fn channel(
        station: impl Into<String>,
        group: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            station_name: station.into(),
            group_name: Some(group.into()),
            channel_name: Some(channel.into()),
        }
    }

    /// Channel scopes roll up monitor types, everything else rolls up channels.
    pub fn leaf_kind(&self) -> LeafKind {
        if self.channel_name.is_some() {
            LeafKind::Monitor
        } else {
            LeafKind::Channel
        }
    }

    /// `<Station>[_<Group>][_<Channel>]_CAPABILITY_ROLLUP`
    pub fn override_name(&self) -> String {
        let mut name = self.station_name.clone();
        for part in [&self.group_name, &self.channel_name].into_iter().flatten() {
            name.push('_');
            name.push_str(part);
        }
        name.push('_');
        name.push_str(Self::OVERRIDE_SUFFIX);
        name
    }

    pub fn constraints(&self) -> Vec<Constraint> {
        let mut constraints = vec![Constraint::is_in(Criterion::StationName, &self.station_name)];
        if let Some(group) = &self.group_name {
            constraints.push(Constraint::is_in(Criterion::StationGroupName, group));
        }
        if let Some(channel) = &self.channel_name {
            constraints.push(Constraint::is_in(Criterion::ChannelName, channel));
        }
        constraints
    }

    pub fn validation_context(&self) -> ValidationContext {
        let group = self.group_name.clone().unwrap_or_default();
        match &self.channel_name {
            Some(channel) => ValidationContext::channel(group, channel),
            None => ValidationContext::station(group),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "station {}", self.station_name)?;
        if let Some(group) = &self.group_name {
            write!(f, " group {group}")?;
        }
        if let Some(channel) = &self.channel_name {
            write!(f, " channel {channel}")?;
        }
        Ok(())
    }
}
