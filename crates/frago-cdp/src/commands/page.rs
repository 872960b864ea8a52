use std::time::Duration;

use serde_json::{json, Value};

use crate::error::CdpError;
use crate::session::CdpSession;

pub struct Page<'a>(pub &'a CdpSession);

impl<'a> Page<'a> {
    pub async fn navigate(&self, url: &str) -> Result<(), CdpError> {
        self.0.send_command("Page.navigate", json!({ "url": url })).await?;
        Ok(())
    }

    pub async fn get_title(&self) -> Result<String, CdpError> {
        let resp = crate::commands::Runtime(self.0)
            .evaluate("document.title", true, true)
            .await?;
        Ok(resp.as_str().unwrap_or_default().to_string())
    }

    pub async fn get_content(&self, selector: Option<&str>) -> Result<String, CdpError> {
        let expr = match selector {
            Some(sel) => format!("document.querySelector({sel:?})?.outerHTML ?? \"\""),
            None => "document.documentElement.outerHTML".to_string(),
        };
        let resp = crate::commands::Runtime(self.0).evaluate(&expr, true, true).await?;
        Ok(resp.as_str().unwrap_or_default().to_string())
    }

    /// Resolves when `document.readyState === "complete"`, or on timeout
    /// with the then-current state.
    pub async fn wait_for_load(&self, timeout: Duration) -> Result<bool, CdpError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let resp = crate::commands::Runtime(self.0)
                .evaluate("document.readyState", true, true)
                .await?;
            if resp.as_str() == Some("complete") {
                return Ok(true);
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// Runs a MutationObserver in-page with a timeout; `{found:true}` on
    /// match, timeout error otherwise.
    pub async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
        visible: bool,
    ) -> Result<Value, CdpError> {
        let expr = format!(
            r#"new Promise((resolve, reject) => {{
                const sel = {selector:?};
                const check = () => {{
                    const el = document.querySelector(sel);
                    if (el && ({visible} ? el.offsetParent !== null : true)) {{
                        resolve({{found: true}});
                        return true;
                    }}
                    return false;
                }};
                if (check()) return;
                const obs = new MutationObserver(() => {{ if (check()) obs.disconnect(); }});
                obs.observe(document.documentElement, {{childList: true, subtree: true, attributes: true}});
                setTimeout(() => {{ obs.disconnect(); reject(new Error("timeout")); }}, {ms});
            }})"#,
            ms = timeout.as_millis()
        );
        crate::commands::Runtime(self.0).evaluate(&expr, true, true).await
    }
}
