use serde_json::{json, Value};

use crate::commands::Input;
use crate::error::CdpError;
use crate::session::CdpSession;

pub struct Dom<'a>(pub &'a CdpSession);

impl<'a> Dom<'a> {
    pub async fn get_document(&self) -> Result<Value, CdpError> {
        self.0.send_command("DOM.getDocument", json!({})).await
    }

    pub async fn query_selector(&self, node_id: i64, selector: &str) -> Result<Option<i64>, CdpError> {
        let resp = self
            .0
            .send_command("DOM.querySelector", json!({ "nodeId": node_id, "selector": selector }))
            .await?;
        Ok(resp.get("result").and_then(|r| r.get("nodeId")).and_then(Value::as_i64))
    }

    pub async fn get_attributes(&self, node_id: i64) -> Result<Vec<String>, CdpError> {
        let resp = self
            .0
            .send_command("DOM.getAttributes", json!({ "nodeId": node_id }))
            .await?;
        Ok(resp
            .get("result")
            .and_then(|r| r.get("attributes"))
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default())
    }

    pub async fn get_box_model(&self, node_id: i64) -> Result<Value, CdpError> {
        self.0
            .send_command("DOM.getBoxModel", json!({ "nodeId": node_id }))
            .await
    }

    /// Higher-level helper: obtains the content quad and clicks its center.
    pub async fn click(&self, selector: &str) -> Result<(), CdpError> {
        let doc = self.get_document().await?;
        let root_id = doc
            .get("result")
            .and_then(|r| r.get("root"))
            .and_then(|r| r.get("nodeId"))
            .and_then(Value::as_i64)
            .ok_or_else(|| CdpError::Protocol {
                code: 0,
                message: "DOM.getDocument returned no root nodeId".into(),
            })?;

        let node_id = self
            .query_selector(root_id, selector)
            .await?
            .ok_or_else(|| CdpError::Protocol {
                code: 0,
                message: format!("selector not found: {selector}"),
            })?;

        let box_model = self.get_box_model(node_id).await?;
        let quad = box_model
            .get("result")
            .and_then(|r| r.get("model"))
            .and_then(|m| m.get("content"))
            .and_then(Value::as_array)
            .ok_or_else(|| CdpError::Protocol {
                code: 0,
                message: "DOM.getBoxModel returned no content quad".into(),
            })?;

        let x1 = quad[0].as_f64().unwrap_or(0.0);
        let y1 = quad[1].as_f64().unwrap_or(0.0);
        let x3 = quad[4].as_f64().unwrap_or(0.0);
        let y5 = quad.get(5).and_then(Value::as_f64).unwrap_or(0.0);

        let cx = (x1 + x3) / 2.0;
        let cy = (y1 + y5) / 2.0;

        Input(self.0).click(cx, cy, "left").await
    }
}
