use serde_json::{json, Value};

use crate::error::CdpError;
use crate::session::CdpSession;

pub struct Runtime<'a>(pub &'a CdpSession);

impl<'a> Runtime<'a> {
    /// `Runtime.evaluate`. When `return_by_value`, unwraps
    /// `result.result.value`; else returns the raw remote-object envelope.
    pub async fn evaluate(
        &self,
        expression: &str,
        return_by_value: bool,
        await_promise: bool,
    ) -> Result<Value, CdpError> {
        let resp = self
            .0
            .send_command(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": return_by_value,
                    "awaitPromise": await_promise,
                }),
            )
            .await?;

        let result = resp.get("result").and_then(|r| r.get("result")).cloned().unwrap_or(Value::Null);

        if return_by_value {
            Ok(result.get("value").cloned().unwrap_or(Value::Null))
        } else {
            Ok(result)
        }
    }
}
