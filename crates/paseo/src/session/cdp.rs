//! Chrome DevTools Protocol session via chromiumoxide.
//!
//! Elements are held in an in-page registry (`window.__paseo_handles`):
//! the probe script registers whatever it finds under a fresh id, and every
//! element operation runs against that id. A re-render invalidates the
//! registry entry, which surfaces as a stale-handle error rather than
//! acting on a detached node.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, InsertTextParams,
};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::DeviceProfile;
use crate::locator::Selector;
use crate::result::{PaseoError, PaseoResult};
use crate::session::{ElementHandle, PageSession, ProbeSnapshot};

/// Default page-load timeout (45 seconds)
pub const DEFAULT_NAV_TIMEOUT_MS: u64 = 45_000;

/// Browser launch configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Force headless on/off; `None` means headless only when `CI` is set
    pub headless: Option<bool>,
    /// Device to emulate
    pub device: DeviceProfile,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Path to a chromium binary (`None` = auto-detect)
    pub chromium_path: Option<String>,
    /// Page-load timeout for navigations
    pub nav_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: None,
            device: DeviceProfile::default(),
            sandbox: true,
            chromium_path: None,
            nav_timeout: Duration::from_millis(DEFAULT_NAV_TIMEOUT_MS),
        }
    }
}

impl BrowserConfig {
    /// Create a default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Force headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = Some(headless);
        self
    }

    /// Set the device profile
    #[must_use]
    pub fn with_device(mut self, device: DeviceProfile) -> Self {
        self.device = device;
        self
    }

    /// Disable the sandbox (containers, CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set the chromium binary path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Headless unless overridden; CI always runs headless
    #[must_use]
    pub fn effective_headless(&self) -> bool {
        self.headless
            .unwrap_or_else(|| std::env::var_os("CI").is_some())
    }
}

/// Browser instance owning the CDP connection
pub struct Browser {
    config: BrowserConfig,
    inner: Arc<Mutex<CdpBrowser>>,
    #[allow(dead_code)]
    handle: tokio::task::JoinHandle<()>,
}

impl std::fmt::Debug for Browser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Browser")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Browser {
    /// Launch chromium with mobile-friendly stability flags.
    pub async fn launch(config: BrowserConfig) -> PaseoResult<Self> {
        let mut builder = CdpConfig::builder()
            .window_size(config.device.width, config.device.height)
            .arg("--disable-notifications")
            .arg("--disable-dev-shm-usage")
            .arg("--lang=en-US");

        let headless = config.effective_headless();
        if !headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder.build().map_err(|e| PaseoError::BrowserLaunch {
            message: e.to_string(),
        })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| PaseoError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        info!(headless, device = %config.device.name, "browser launched");
        Ok(Self {
            config,
            inner: Arc::new(Mutex::new(browser)),
            handle,
        })
    }

    /// Open a page with the configured device emulation applied.
    pub async fn new_session(&self) -> PaseoResult<CdpSession> {
        let page = {
            let browser = self.inner.lock().await;
            browser
                .new_page("about:blank")
                .await
                .map_err(|e| PaseoError::session(e.to_string()))?
        };

        let device = &self.config.device;
        let metrics = SetDeviceMetricsOverrideParams::builder()
            .width(i64::from(device.width))
            .height(i64::from(device.height))
            .device_scale_factor(device.scale_factor)
            .mobile(true)
            .build()
            .map_err(PaseoError::session)?;
        page.execute(metrics)
            .await
            .map_err(|e| PaseoError::session(e.to_string()))?;

        let agent = SetUserAgentOverrideParams::builder()
            .user_agent(device.user_agent.clone())
            .build()
            .map_err(PaseoError::session)?;
        page.execute(agent)
            .await
            .map_err(|e| PaseoError::session(e.to_string()))?;

        debug!(device = %device.name, "device emulation applied");
        Ok(CdpSession {
            page,
            nav_timeout: self.config.nav_timeout,
        })
    }

    /// The launch configuration
    #[must_use]
    pub const fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Close the browser
    pub async fn close(self) -> PaseoResult<()> {
        let mut browser = self.inner.lock().await;
        browser
            .close()
            .await
            .map_err(|e| PaseoError::session(e.to_string()))?;
        Ok(())
    }
}

/// Raw probe result shipped back from the page
#[derive(Debug, Deserialize)]
struct RawProbe {
    found: bool,
    #[serde(default)]
    visible: bool,
    #[serde(default)]
    clickable: bool,
    #[serde(default)]
    handle: Option<String>,
}

/// A live CDP page implementing [`PageSession`]
pub struct CdpSession {
    page: CdpPage,
    nav_timeout: Duration,
}

impl std::fmt::Debug for CdpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdpSession")
            .field("nav_timeout", &self.nav_timeout)
            .finish_non_exhaustive()
    }
}

impl CdpSession {
    fn probe_script(selector: &Selector) -> String {
        format!(
            r"(() => {{
    const el = {query};
    if (!el) return {{ found: false }};
    window.__paseo_handles = window.__paseo_handles || {{}};
    window.__paseo_seq = (window.__paseo_seq || 0) + 1;
    const id = String(window.__paseo_seq);
    window.__paseo_handles[id] = el;
    const rect = el.getBoundingClientRect();
    const style = window.getComputedStyle(el);
    const visible = rect.width > 0 && rect.height > 0
        && style.visibility !== 'hidden' && style.display !== 'none';
    const clickable = visible && !el.disabled;
    return {{ found: true, visible, clickable, handle: id }};
}})()",
            query = selector.to_query()
        )
    }

    fn handle_script(id: &str, body: &str) -> String {
        format!(
            r"(() => {{
    const el = (window.__paseo_handles || {{}})[{id:?}];
    if (!el) return {{ stale: true }};
    let value = null;
    {body}
    return {{ stale: false, value }};
}})()"
        )
    }

    async fn run(&self, script: String) -> PaseoResult<Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| PaseoError::script(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    /// Run a script against a registered handle, failing on staleness.
    async fn run_on_handle(&self, handle: &ElementHandle, body: &str) -> PaseoResult<Value> {
        let result = self.run(Self::handle_script(handle.id(), body)).await?;
        if result.get("stale").and_then(Value::as_bool) == Some(true) {
            return Err(PaseoError::StaleHandle {
                handle: handle.id().to_string(),
            });
        }
        Ok(result.get("value").cloned().unwrap_or(Value::Null))
    }

    async fn focus(&self, handle: &ElementHandle) -> PaseoResult<()> {
        self.run_on_handle(handle, "el.focus();").await?;
        Ok(())
    }

    async fn key_event(&self, kind: DispatchKeyEventType) -> PaseoResult<()> {
        let text = matches!(kind, DispatchKeyEventType::KeyDown).then(|| "\r".to_string());
        let mut builder = DispatchKeyEventParams::builder()
            .r#type(kind)
            .key("Enter")
            .code("Enter")
            .windows_virtual_key_code(13)
            .native_virtual_key_code(13);
        if let Some(text) = text {
            builder = builder.text(text);
        }
        let params = builder.build().map_err(PaseoError::session)?;
        self.page
            .execute(params)
            .await
            .map_err(|e| PaseoError::session(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl PageSession for CdpSession {
    async fn navigate(&self, url: &str) -> PaseoResult<()> {
        let goto = self.page.goto(url);
        match tokio::time::timeout(self.nav_timeout, goto).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(PaseoError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(PaseoError::Navigation {
                url: url.to_string(),
                message: format!("load timed out after {}ms", self.nav_timeout.as_millis()),
            }),
        }
    }

    async fn current_url(&self) -> PaseoResult<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| PaseoError::session(e.to_string()))?;
        Ok(url.unwrap_or_default())
    }

    async fn probe(&self, selector: &Selector) -> PaseoResult<ProbeSnapshot> {
        let value = self.run(Self::probe_script(selector)).await?;
        let raw: RawProbe = serde_json::from_value(value)?;
        if !raw.found {
            return Ok(ProbeSnapshot::missing());
        }
        let handle = raw.handle.ok_or_else(|| {
            PaseoError::script("probe reported an element without a registry id")
        })?;
        Ok(ProbeSnapshot::found(
            ElementHandle::new(handle),
            raw.visible,
            raw.clickable,
        ))
    }

    async fn eval(&self, script: &str) -> PaseoResult<Value> {
        self.run(script.to_string()).await
    }

    async fn is_displayed(&self, handle: &ElementHandle) -> PaseoResult<bool> {
        let value = self
            .run_on_handle(
                handle,
                r"const rect = el.getBoundingClientRect();
    const style = window.getComputedStyle(el);
    value = rect.width > 0 && rect.height > 0
        && style.visibility !== 'hidden' && style.display !== 'none';",
            )
            .await?;
        Ok(value.as_bool() == Some(true))
    }

    async fn scroll_into_view(&self, handle: &ElementHandle) -> PaseoResult<()> {
        self.run_on_handle(handle, "el.scrollIntoView({ block: 'center' });")
            .await?;
        Ok(())
    }

    async fn dispatch_click(&self, handle: &ElementHandle) -> PaseoResult<()> {
        self.run_on_handle(
            handle,
            "el.dispatchEvent(new MouseEvent('click', { bubbles: true, cancelable: true }));",
        )
        .await?;
        Ok(())
    }

    async fn clear(&self, handle: &ElementHandle) -> PaseoResult<()> {
        self.run_on_handle(
            handle,
            r"el.value = '';
    el.dispatchEvent(new Event('input', { bubbles: true }));",
        )
        .await?;
        Ok(())
    }

    async fn type_text(&self, handle: &ElementHandle, text: &str) -> PaseoResult<()> {
        self.focus(handle).await?;
        let params = InsertTextParams::builder()
            .text(text)
            .build()
            .map_err(PaseoError::session)?;
        self.page
            .execute(params)
            .await
            .map_err(|e| PaseoError::session(e.to_string()))?;
        Ok(())
    }

    async fn press_enter(&self, handle: &ElementHandle) -> PaseoResult<()> {
        self.focus(handle).await?;
        self.key_event(DispatchKeyEventType::KeyDown).await?;
        self.key_event(DispatchKeyEventType::KeyUp).await?;
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> PaseoResult<bool> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let shot = self
            .page
            .execute(params)
            .await
            .map_err(|e| PaseoError::Screenshot {
                message: e.to_string(),
            })?;

        use base64::Engine;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&shot.data)
            .map_err(|e| PaseoError::Screenshot {
                message: e.to_string(),
            })?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &bytes).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "screenshot written");
        Ok(true)
    }
}
