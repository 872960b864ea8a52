use serde_json::{json, Value};

use crate::error::CdpError;
use crate::session::CdpSession;

/// Used exclusively by the tab manager.
pub struct Target<'a>(pub &'a CdpSession);

impl<'a> Target<'a> {
    pub async fn create_target(&self, url: &str, width: Option<u32>, height: Option<u32>) -> Result<String, CdpError> {
        let mut params = json!({ "url": url });
        if let Some(w) = width {
            params["width"] = json!(w);
        }
        if let Some(h) = height {
            params["height"] = json!(h);
        }
        let resp = self.0.send_command("Target.createTarget", params).await?;
        resp.get("result")
            .and_then(|r| r.get("targetId"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| CdpError::Protocol {
                code: 0,
                message: "Target.createTarget returned no targetId".into(),
            })
    }

    pub async fn close_target(&self, target_id: &str) -> Result<(), CdpError> {
        self.0
            .send_command("Target.closeTarget", json!({ "targetId": target_id }))
            .await?;
        Ok(())
    }

    pub async fn get_targets(&self) -> Result<Vec<Value>, CdpError> {
        let resp = self.0.send_command("Target.getTargets", json!({})).await?;
        Ok(resp
            .get("result")
            .and_then(|r| r.get("targetInfos"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    pub async fn activate_target(&self, target_id: &str) -> Result<(), CdpError> {
        self.0
            .send_command("Target.activateTarget", json!({ "targetId": target_id }))
            .await?;
        Ok(())
    }
}
