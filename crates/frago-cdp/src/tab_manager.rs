//! Origin-based tab routing with LRU eviction and on-disk reconciliation.
//!
//! Grounded on `original_source/src/frago/cdp/tab_manager.py` for exact
//! constants and `csa-lock`'s capacity-bounded resource-tracking idiom for
//! the shape of an on-disk, cap-enforced registry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use frago_core::Origin;

use crate::error::CdpError;
use crate::session::CdpSession;

pub const MAX_TABS: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabEntry {
    pub tab_id: String,
    pub origin: String,
    pub url: String,
    pub title: String,
    pub last_activity: f64,
    pub created_at: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct TabState {
    schema_version: u32,
    port: u16,
    tabs: HashMap<String, TabEntry>,
}

pub struct TabManager {
    state_path: PathBuf,
    port: u16,
    entries: HashMap<String, TabEntry>,
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

impl TabManager {
    pub fn new(home: &Path, port: u16) -> Self {
        let state_path = home.join(".frago").join("chrome").join("tab_state.json");
        let entries = load_state(&state_path, port).unwrap_or_default();
        Self {
            state_path,
            port,
            entries,
        }
    }

    fn save(&self) -> Result<(), CdpError> {
        if let Some(parent) = self.state_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let state = TabState {
            schema_version: 1,
            port: self.port,
            tabs: self.entries.clone(),
        };
        std::fs::write(&self.state_path, serde_json::to_vec_pretty(&state)?)?;
        Ok(())
    }

    pub fn get_tab_count(&self) -> usize {
        self.entries.len()
    }

    pub fn get_tracked_tabs(&self) -> Vec<&TabEntry> {
        self.entries.values().collect()
    }

    pub fn clear_state(&mut self) -> Result<(), CdpError> {
        self.entries.clear();
        self.save()
    }

    pub fn track_tab(&mut self, tab_id: &str, url: &str, title: &str) {
        let origin = Origin::extract(url).map(|o| o.to_string()).unwrap_or_default();
        let now = now_secs();
        self.entries.insert(
            tab_id.to_string(),
            TabEntry {
                tab_id: tab_id.to_string(),
                origin,
                url: url.to_string(),
                title: title.to_string(),
                last_activity: now,
                created_at: now,
            },
        );
    }

    pub fn touch_tab(&mut self, tab_id: &str) {
        if let Some(entry) = self.entries.get_mut(tab_id) {
            entry.last_activity = now_secs();
        }
    }

    pub fn untrack_tab(&mut self, tab_id: &str) {
        self.entries.remove(tab_id);
    }

    /// Re-fetches live targets and reconciles tracked state against them:
    /// stale entries are dropped, untracked live tabs are inserted, tracked
    /// tabs have `url`/`title`/`origin` refreshed.
    pub async fn reconcile(&mut self, session: &CdpSession) -> Result<(), CdpError> {
        let resp = session.send_command("Target.getTargets", serde_json::json!({})).await?;
        let targets = resp
            .get("result")
            .and_then(|r| r.get("targetInfos"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let live: HashMap<String, (String, String)> = targets
            .iter()
            .filter(|t| t.get("type").and_then(Value::as_str) == Some("page"))
            .filter_map(|t| {
                let id = t.get("targetId")?.as_str()?.to_string();
                let url = t.get("url").and_then(Value::as_str).unwrap_or_default().to_string();
                let title = t.get("title").and_then(Value::as_str).unwrap_or_default().to_string();
                Some((id, (url, title)))
            })
            .collect();

        self.entries.retain(|id, _| live.contains_key(id));

        for (id, (url, title)) in &live {
            match self.entries.get_mut(id) {
                Some(entry) => {
                    entry.url = url.clone();
                    entry.title = title.clone();
                    entry.origin = Origin::extract(url).map(|o| o.to_string()).unwrap_or_default();
                }
                None => self.track_tab(id, url, title),
            }
        }

        self.save()
    }

    /// `get_or_create_tab` per spec.md §4.3.
    pub async fn get_or_create_tab(&mut self, url: &str, session: &CdpSession) -> Result<String, CdpError> {
        let origin = Origin::extract(url);

        let origin = match origin {
            None => {
                let resp = session.send_command("Target.getTargets", serde_json::json!({})).await?;
                let first_page = resp
                    .get("result")
                    .and_then(|r| r.get("targetInfos"))
                    .and_then(Value::as_array)
                    .and_then(|infos| {
                        infos
                            .iter()
                            .find(|t| t.get("type").and_then(Value::as_str) == Some("page"))
                    })
                    .and_then(|t| t.get("targetId"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                return Ok(first_page);
            }
            Some(o) => o,
        };

        if let Some((best_id, _)) = self
            .entries
            .iter()
            .filter(|(_, e)| e.origin == origin.as_str())
            .max_by(|(_, a), (_, b)| a.last_activity.total_cmp(&b.last_activity))
            .map(|(id, e)| (id.clone(), e.clone()))
        {
            self.touch_tab(&best_id);
            let _ = session
                .send_command("Target.activateTarget", serde_json::json!({ "targetId": best_id }))
                .await;
            self.save()?;
            return Ok(best_id);
        }

        if self.entries.len() >= MAX_TABS {
            if let Some(evict_id) = self
                .entries
                .iter()
                .min_by(|(_, a), (_, b)| a.last_activity.total_cmp(&b.last_activity))
                .map(|(id, _)| id.clone())
            {
                let _ = session
                    .send_command("Target.closeTarget", serde_json::json!({ "targetId": evict_id }))
                    .await;
                self.entries.remove(&evict_id);
            }
        }

        let resp = session
            .send_command("Target.createTarget", serde_json::json!({ "url": url }))
            .await?;
        let target_id = resp
            .get("result")
            .and_then(|r| r.get("targetId"))
            .and_then(Value::as_str)
            .ok_or_else(|| CdpError::Protocol {
                code: 0,
                message: "Target.createTarget returned no targetId".into(),
            })?
            .to_string();

        self.track_tab(&target_id, url, "");
        self.save()?;
        Ok(target_id)
    }
}

fn load_state(path: &Path, port: u16) -> Option<HashMap<String, TabEntry>> {
    let bytes = std::fs::read(path).ok()?;
    let state: TabState = serde_json::from_slice(&bytes).ok()?;
    if state.port != port {
        return None;
    }
    Some(state.tabs)
}
