use serde::Deserialize;

use crate::config::CdpConfig;
use crate::error::CdpError;

/// One entry of `GET /json/list`.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub target_type: String,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "webSocketDebuggerUrl", default)]
    pub web_socket_debugger_url: String,
}

/// `GET /json/version` response shape.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
    #[serde(rename = "Browser")]
    pub browser: String,
    #[serde(rename = "Protocol-Version")]
    pub protocol_version: String,
    #[serde(rename = "User-Agent", default)]
    pub user_agent: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: String,
}

pub async fn list_targets(client: &reqwest::Client, config: &CdpConfig) -> Result<Vec<TargetDescriptor>, CdpError> {
    let url = format!("{}/json/list", config.http_base());
    let resp = client
        .get(&url)
        .timeout(config.connect_timeout)
        .send()
        .await?
        .error_for_status()?;
    Ok(resp.json::<Vec<TargetDescriptor>>().await?)
}

pub async fn version_info(client: &reqwest::Client, config: &CdpConfig) -> Result<VersionInfo, CdpError> {
    let url = format!("{}/json/version", config.http_base());
    let resp = client
        .get(&url)
        .timeout(config.connect_timeout)
        .send()
        .await?
        .error_for_status()?;
    Ok(resp.json::<VersionInfo>().await?)
}

/// Resolves the WebSocket URL to dial, following spec.md §4.2's discovery
/// order: explicit target id, first `page` target, `/json/version`
/// fallback.
pub async fn resolve_websocket_url(client: &reqwest::Client, config: &CdpConfig) -> Result<String, CdpError> {
    match list_targets(client, config).await {
        Ok(targets) => {
            if let Some(target_id) = &config.target_id {
                return targets
                    .into_iter()
                    .find(|t| &t.id == target_id)
                    .map(|t| t.web_socket_debugger_url)
                    .ok_or_else(|| CdpError::TargetNotFound(target_id.clone()));
            }
            if let Some(page) = targets
                .into_iter()
                .find(|t| t.target_type == "page" && !t.web_socket_debugger_url.is_empty())
            {
                return Ok(page.web_socket_debugger_url);
            }
        }
        Err(_) => {}
    }

    let info = version_info(client, config).await?;
    Ok(info.web_socket_debugger_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_descriptor_parses_minimal_fields() {
        let json = r#"{"id":"T1","type":"page","url":"about:blank"}"#;
        let t: TargetDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(t.id, "T1");
        assert_eq!(t.web_socket_debugger_url, "");
    }

    #[test]
    fn version_info_parses_full_fields() {
        let json = r#"{"Browser":"Chrome/120","Protocol-Version":"1.3","User-Agent":"ua","webSocketDebuggerUrl":"ws://x"}"#;
        let v: VersionInfo = serde_json::from_str(json).unwrap();
        assert_eq!(v.browser, "Chrome/120");
        assert_eq!(v.web_socket_debugger_url, "ws://x");
    }
}
