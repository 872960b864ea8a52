//! Workflow-scoped shared environment overlay, passed between recipes
//! invoked as part of the same workflow. Grounded on
//! `original_source/src/frago/recipes/env_loader.py`'s `WorkflowContext`.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct WorkflowContext {
    shared_env: BTreeMap<String, String>,
}

impl WorkflowContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.shared_env.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.shared_env.get(key).map(String::as_str)
    }

    pub fn update(&mut self, values: &BTreeMap<String, String>) {
        self.shared_env.extend(values.clone());
    }

    pub fn as_dict(&self) -> &BTreeMap<String, String> {
        &self.shared_env
    }
}
