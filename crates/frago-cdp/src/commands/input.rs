use serde_json::json;

use crate::error::CdpError;
use crate::session::CdpSession;

pub struct Input<'a>(pub &'a CdpSession);

impl<'a> Input<'a> {
    /// Dispatches `mouseMoved -> mousePressed -> mouseReleased`, each a
    /// separate CDP call.
    pub async fn click(&self, x: f64, y: f64, button: &str) -> Result<(), CdpError> {
        for kind in ["mouseMoved", "mousePressed", "mouseReleased"] {
            self.0
                .send_command(
                    "Input.dispatchMouseEvent",
                    json!({ "type": kind, "x": x, "y": y, "button": button, "clickCount": 1 }),
                )
                .await?;
        }
        Ok(())
    }

    /// Dispatches one `Input.dispatchKeyEvent {type:"char"}` per code point.
    pub async fn type_text(&self, text: &str) -> Result<(), CdpError> {
        for ch in text.chars() {
            self.0
                .send_command(
                    "Input.dispatchKeyEvent",
                    json!({ "type": "char", "text": ch.to_string() }),
                )
                .await?;
        }
        Ok(())
    }

    pub async fn scroll(&self, x: f64, y: f64, delta_x: f64, delta_y: f64) -> Result<(), CdpError> {
        self.0
            .send_command(
                "Input.dispatchMouseEvent",
                json!({ "type": "mouseWheel", "x": x, "y": y, "deltaX": delta_x, "deltaY": delta_y }),
            )
            .await?;
        Ok(())
    }
}
