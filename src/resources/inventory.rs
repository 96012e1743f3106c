//! Compute unit discovery
//!
//! Scans the host once at startup for exclusive compute units: NVIDIA GPUs
//! via `nvidia-smi`, an Apple Silicon unified-memory GPU via `sysctl`, or a
//! CPU placeholder when neither is present. Discovery degrades through the
//! tiers instead of failing; probe errors are swallowed.

use serde::{Deserialize, Serialize};
use std::process::Command;
use tracing::debug;
use utoipa::ToSchema;

/// Kind of compute unit backing a [`ResourceUnit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// Dedicated accelerator with its own memory (NVIDIA GPU)
    Dedicated,
    /// Unified-memory accelerator shared with the host (Apple Silicon)
    Shared,
    /// Host processor placeholder; not lock-bearing
    Cpu,
}

impl UnitKind {
    /// Whether units of this kind carry an allocation lock
    pub fn is_lockable(&self) -> bool {
        !matches!(self, UnitKind::Cpu)
    }
}

/// One exclusive-access compute device slot
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResourceUnit {
    pub id: u32,
    pub kind: UnitKind,
    /// Capacity descriptor, e.g. "24576 MiB" or "32GB shared"
    pub memory: String,
    pub name: String,
}

/// Static catalog of compute units, built once at startup
#[derive(Debug, Clone)]
pub struct Inventory {
    units: Vec<ResourceUnit>,
}

impl Inventory {
    /// Scan the host for compute units.
    ///
    /// Never fails: each probe error falls through to the next tier, and the
    /// final tier always yields a CPU placeholder unit.
    pub fn discover() -> Self {
        let mut units = probe_nvidia();

        if units.is_empty() {
            if let Some(unit) = probe_unified_memory() {
                units.push(unit);
            }
        }

        if units.is_empty() {
            units.push(ResourceUnit {
                id: 0,
                kind: UnitKind::Cpu,
                memory: "N/A".to_string(),
                name: format!("CPU: {}", std::env::consts::ARCH),
            });
        }

        Self { units }
    }

    /// Build an inventory from an explicit unit list
    pub fn from_units(units: Vec<ResourceUnit>) -> Self {
        Self { units }
    }

    pub fn units(&self) -> &[ResourceUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Number of units that carry an allocation lock
    pub fn lockable_count(&self) -> usize {
        self.units.iter().filter(|u| u.kind.is_lockable()).count()
    }
}

/// Query `nvidia-smi` for dedicated GPUs. Any failure yields an empty list.
fn probe_nvidia() -> Vec<ResourceUnit> {
    let output = match Command::new("nvidia-smi")
        .args(["--query-gpu=index,memory.total,name", "--format=csv,noheader"])
        .output()
    {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            debug!(status = %output.status, "nvidia-smi exited with failure");
            return Vec::new();
        }
        Err(e) => {
            debug!(error = %e, "nvidia-smi not available");
            return Vec::new();
        }
    };

    let mut units = Vec::new();
    for line in String::from_utf8_lossy(&output.stdout).lines() {
        let fields: Vec<&str> = line.splitn(3, ',').map(str::trim).collect();
        if fields.len() != 3 {
            continue;
        }
        let Ok(id) = fields[0].parse::<u32>() else {
            continue;
        };
        units.push(ResourceUnit {
            id,
            kind: UnitKind::Dedicated,
            memory: fields[1].to_string(),
            name: fields[2].to_string(),
        });
    }
    units
}

/// Synthesize a single shared unit on Apple Silicon hosts
fn probe_unified_memory() -> Option<ResourceUnit> {
    if !(cfg!(target_os = "macos") && cfg!(target_arch = "aarch64")) {
        return None;
    }

    let output = Command::new("sysctl").args(["-n", "hw.memsize"]).output().ok()?;
    if !output.status.success() {
        return None;
    }

    let bytes: u64 = String::from_utf8_lossy(&output.stdout).trim().parse().ok()?;
    Some(ResourceUnit {
        id: 0,
        kind: UnitKind::Shared,
        memory: format!("{}GB shared", bytes / (1024 * 1024 * 1024)),
        name: "Apple Silicon GPU".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_always_yields_at_least_one_unit() {
        let inventory = Inventory::discover();
        assert!(!inventory.is_empty());
    }

    #[test]
    fn test_cpu_units_are_not_lockable() {
        let inventory = Inventory::from_units(vec![ResourceUnit {
            id: 0,
            kind: UnitKind::Cpu,
            memory: "N/A".to_string(),
            name: "CPU: x86_64".to_string(),
        }]);
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory.lockable_count(), 0);
    }

    #[test]
    fn test_lockable_count_mixed_kinds() {
        let inventory = Inventory::from_units(vec![
            ResourceUnit {
                id: 0,
                kind: UnitKind::Dedicated,
                memory: "24576 MiB".to_string(),
                name: "NVIDIA RTX A5000".to_string(),
            },
            ResourceUnit {
                id: 1,
                kind: UnitKind::Shared,
                memory: "32GB shared".to_string(),
                name: "Apple Silicon GPU".to_string(),
            },
            ResourceUnit {
                id: 2,
                kind: UnitKind::Cpu,
                memory: "N/A".to_string(),
                name: "CPU: aarch64".to_string(),
            },
        ]);
        assert_eq!(inventory.lockable_count(), 2);
    }
}
