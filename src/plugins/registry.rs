use crate::core::models::StageKind;
use crate::plugins::types::Stage;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::models::StageKind::{Dirbuster, Httpx, Subfinder};

/// Category name to ordered stage list. Categories may share stages.
pub const CATEGORIES: &[(&str, &[StageKind])] = &[
    ("recon", &[Subfinder, Httpx, Dirbuster]),
    ("subdomains", &[Subfinder, Httpx]),
    ("web", &[Httpx, Dirbuster]),
    ("all", &[Subfinder, Httpx, Dirbuster]),
];

pub fn stages_for(category: &str) -> Option<&'static [StageKind]> {
    let category = category.trim();
    CATEGORIES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(category))
        .map(|(_, stages)| *stages)
}

pub fn category_names() -> impl Iterator<Item = &'static str> {
    CATEGORIES.iter().map(|(name, _)| *name)
}

/// Stage implementations keyed by their static descriptor.
pub struct StageRegistry {
    stages: HashMap<StageKind, Arc<dyn Stage>>,
}

impl StageRegistry {
    pub fn new() -> Self {
        Self {
            stages: HashMap::new(),
        }
        .with_stage(Arc::new(crate::plugins::subfinder::SubfinderStage))
        .with_stage(Arc::new(crate::plugins::httpx_probe::HttpxProbe))
        .with_stage(Arc::new(crate::plugins::dirbuster::DirbusterStage))
    }

    /// Register `stage` under its kind, replacing any earlier registration.
    pub fn with_stage(mut self, stage: Arc<dyn Stage>) -> Self {
        self.stages.insert(stage.kind(), stage);
        self
    }

    pub fn get(&self, kind: StageKind) -> Option<Arc<dyn Stage>> {
        self.stages.get(&kind).cloned()
    }

    pub fn log_summary(&self) {
        tracing::info!("Stage registry: {} stages", self.stages.len());
        for (name, stages) in CATEGORIES {
            let names: Vec<&str> = stages.iter().map(|k| k.name()).collect();
            tracing::info!("  {}: {}", name, names.join(" -> "));
        }
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::new()
    }
}
