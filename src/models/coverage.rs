// Per-group host coverage: which hosts reported, which were dropped for a counter reset.

use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostCoverage {
    all_hosts: BTreeMap<String, BTreeSet<String>>,
    invalid_hosts: BTreeMap<String, BTreeSet<String>>,
}

/// Host counts for one group, as shown in logs and written next to each sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCoverage {
    pub group: String,
    pub total_hosts: usize,
    pub invalid_hosts: usize,
}

impl HostCoverage {
    pub fn record(&mut self, group: &str, host: &str) {
        insert(&mut self.all_hosts, group, host);
    }

    /// Records a host whose series was rejected; it also counts towards the group total.
    pub fn record_invalid(&mut self, group: &str, host: &str) {
        insert(&mut self.all_hosts, group, host);
        insert(&mut self.invalid_hosts, group, host);
    }

    pub fn all_hosts(&self, group: &str) -> Option<&BTreeSet<String>> {
        self.all_hosts.get(group)
    }

    pub fn invalid_hosts(&self, group: &str) -> Option<&BTreeSet<String>> {
        self.invalid_hosts.get(group)
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.all_hosts.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.all_hosts.is_empty()
    }

    /// Counts per group, ordered by group name.
    pub fn summary(&self) -> Vec<GroupCoverage> {
        self.all_hosts
            .iter()
            .map(|(group, hosts)| GroupCoverage {
                group: group.clone(),
                total_hosts: hosts.len(),
                invalid_hosts: self.invalid_hosts.get(group).map_or(0, BTreeSet::len),
            })
            .collect()
    }

    /// Emits the two coverage summaries: total hosts per group, then groups with invalid hosts.
    pub fn log_summary(&self) {
        for (group, hosts) in &self.all_hosts {
            tracing::info!(group = %group, hosts = hosts.len(), "total host count");
        }
        for (group, hosts) in &self.invalid_hosts {
            tracing::info!(
                group = %group,
                hosts = hosts.len(),
                "hosts with invalid metrics (counter reset)"
            );
        }
    }
}

fn insert(map: &mut BTreeMap<String, BTreeSet<String>>, group: &str, host: &str) {
    map.entry(group.to_string())
        .or_default()
        .insert(host.to_string());
}
