//! On-page visual annotations, injected via `Runtime.evaluate`. Each effect
//! auto-removes after `lifetime_ms` (0 = indefinite, cleared only by
//! `clear()`). Ported from the original Python session's inline JS
//! snippets (`frago/cdp/session.py`), adapted to Rust string templates.

use serde_json::Value;

use crate::commands::Runtime;
use crate::error::CdpError;
use crate::session::CdpSession;

pub struct VisualEffects<'a>(pub &'a CdpSession);

fn auto_remove_snippet(selector: &str, lifetime_ms: u64) -> String {
    if lifetime_ms == 0 {
        String::new()
    } else {
        format!(
            "setTimeout(() => document.querySelectorAll({selector:?}).forEach(e => e.remove()), {lifetime_ms});"
        )
    }
}

impl<'a> VisualEffects<'a> {
    pub async fn highlight(&self, selector: &str, color: &str, lifetime_ms: u64) -> Result<Value, CdpError> {
        let remove = auto_remove_snippet(selector, lifetime_ms);
        let expr = format!(
            r#"(() => {{
                document.querySelectorAll({selector:?}).forEach(el => {{
                    el.setAttribute('data-frago-highlight', 'true');
                    el.style.outline = '3px solid {color}';
                    el.style.outlineOffset = '2px';
                }});
                {remove}
                return {{applied: true}};
            }})()"#
        );
        Runtime(self.0).evaluate(&expr, true, false).await
    }

    pub async fn pointer(&self, x: f64, y: f64, lifetime_ms: u64) -> Result<Value, CdpError> {
        let remove = auto_remove_snippet("#frago-pointer", lifetime_ms);
        let expr = format!(
            r#"(() => {{
                let p = document.getElementById('frago-pointer');
                if (!p) {{
                    p = document.createElement('div');
                    p.id = 'frago-pointer';
                    p.style.position = 'fixed';
                    p.style.width = '16px';
                    p.style.height = '16px';
                    p.style.borderRadius = '50%';
                    p.style.background = 'rgba(255,0,0,0.6)';
                    p.style.zIndex = '2147483647';
                    p.style.pointerEvents = 'none';
                    document.body.appendChild(p);
                }}
                p.style.left = ({x} - 8) + 'px';
                p.style.top = ({y} - 8) + 'px';
                {remove}
                return {{applied: true}};
            }})()"#
        );
        Runtime(self.0).evaluate(&expr, true, false).await
    }

    pub async fn spotlight(&self, selector: &str, lifetime_ms: u64) -> Result<Value, CdpError> {
        let remove = auto_remove_snippet(selector, lifetime_ms);
        let expr = format!(
            r#"(() => {{
                document.querySelectorAll({selector:?}).forEach(el => {{
                    el.style.boxShadow = '0 0 0 9999px rgba(0,0,0,0.5)';
                    el.setAttribute('data-frago-highlight', 'spotlight');
                }});
                {remove}
                return {{applied: true}};
            }})()"#
        );
        Runtime(self.0).evaluate(&expr, true, false).await
    }

    pub async fn annotate(&self, selector: &str, text: &str, lifetime_ms: u64) -> Result<Value, CdpError> {
        let remove = auto_remove_snippet(".frago-annotation", lifetime_ms);
        let expr = format!(
            r#"(() => {{
                const target = document.querySelector({selector:?});
                if (!target) return {{applied: false}};
                const rect = target.getBoundingClientRect();
                const note = document.createElement('div');
                note.className = 'frago-annotation';
                note.textContent = {text:?};
                note.style.position = 'fixed';
                note.style.left = rect.left + 'px';
                note.style.top = (rect.top - 24) + 'px';
                note.style.background = '#222';
                note.style.color = '#fff';
                note.style.padding = '2px 6px';
                note.style.fontSize = '12px';
                note.style.zIndex = '2147483647';
                document.body.appendChild(note);
                {remove}
                return {{applied: true}};
            }})()"#
        );
        Runtime(self.0).evaluate(&expr, true, false).await
    }

    pub async fn underline(&self, selector: &str, lifetime_ms: u64) -> Result<Value, CdpError> {
        let remove = auto_remove_snippet(selector, lifetime_ms);
        let expr = format!(
            r#"(() => {{
                document.querySelectorAll({selector:?}).forEach(el => {{
                    el.classList.add('frago-underline');
                    el.style.textDecoration = 'underline';
                    el.style.textDecorationColor = 'red';
                }});
                {remove}
                return {{applied: true}};
            }})()"#
        );
        Runtime(self.0).evaluate(&expr, true, false).await
    }

    /// Removes all frago visual-effect elements/attributes immediately.
    pub async fn clear(&self) -> Result<Value, CdpError> {
        let expr = r#"(() => {
            document.querySelectorAll('[data-frago-highlight]').forEach(el => {
                el.removeAttribute('data-frago-highlight');
                el.style.outline = '';
                el.style.boxShadow = '';
            });
            document.querySelectorAll('.frago-underline').forEach(el => {
                el.classList.remove('frago-underline');
                el.style.textDecoration = '';
            });
            document.querySelectorAll('.frago-annotation').forEach(e => e.remove());
            const pointer = document.getElementById('frago-pointer');
            if (pointer) pointer.remove();
            return {applied: true};
        })()"#;
        Runtime(self.0).evaluate(expr, true, false).await
    }
}
