//! Resource model.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// A single computing resource: an ordered position in [`Resources`] with a
/// positive processing speed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    pub speed: f64,
}

impl Resource {
    pub fn new(speed: f64) -> Self {
        Self { speed }
    }
}

/// Immutable, validated, ordered sequence of [`Resource`]s.
#[derive(Debug, Clone)]
pub struct Resources(Vec<Resource>);

impl Resources {
    pub fn new(resources: Vec<Resource>) -> Result<Self> {
        if resources.is_empty() {
            return Err(Error::InvalidConfig("resource list must not be empty".into()));
        }
        if let Some(bad) = resources.iter().find(|r| !(r.speed > 0.0)) {
            return Err(Error::InvalidConfig(format!(
                "resource speed must be positive, got {}",
                bad.speed
            )));
        }
        Ok(Self(resources))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.0.iter()
    }

    pub fn speed(&self, id: usize) -> f64 {
        self.0[id].speed
    }

    /// Partitions resource ids into speed groups keyed by the IEEE-754 bit
    /// pattern of their speed, each group's members kept in ascending
    /// resource-id order so that "contiguous within a group" is well
    /// defined. Groups themselves are returned ordered by ascending speed.
    pub fn speed_groups(&self) -> Vec<(f64, Vec<usize>)> {
        let mut groups: IndexMap<u64, (f64, Vec<usize>)> = IndexMap::new();
        for (id, resource) in self.0.iter().enumerate() {
            let key = resource.speed.to_bits();
            groups.entry(key).or_insert_with(|| (resource.speed, Vec::new())).1.push(id);
        }
        let mut groups: Vec<(f64, Vec<usize>)> = groups.into_values().collect();
        groups.sort_by(|a, b| a.0.total_cmp(&b.0));
        groups
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ResourcePoolConfig {
    resources: Vec<Resource>,
}

/// Reads a resource pool from a YAML file.
pub fn read_resource_pool<P: AsRef<Path>>(file: P) -> Result<Resources> {
    let contents = std::fs::read_to_string(&file)
        .map_err(|e| Error::InvalidConfig(format!("can't read {}: {e}", file.as_ref().display())))?;
    let config: ResourcePoolConfig = serde_yaml::from_str(&contents)
        .map_err(|e| Error::InvalidConfig(format!("can't parse YAML from {}: {e}", file.as_ref().display())))?;
    Resources::new(config.resources)
}
