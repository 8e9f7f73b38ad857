//! Chromium driver over the Chrome DevTools Protocol.
//!
//! Elements are addressed by path (optional frame, then a chain of
//! selector + index steps) and re-resolved in page JavaScript on every call.
//! Each document gets a random token on first contact; when the token
//! changes the driver starts a new epoch and drops every handle, which is how
//! clicks that navigate invalidate earlier handles.
//!
//! The payment form lives in a cross-origin iframe. The browser is launched
//! with site isolation and web security disabled so the frame's
//! `contentDocument` is reachable from the top page.

use crate::config::BrowserSettings;
use crate::driver::{duration_ms, BrowserDriver, ElementHandle};
use crate::locator::Selector;
use crate::result::{ShopperError, ShopperResult};
use crate::wait::{
    Deadline, LoadState, WaitOptions, DEFAULT_POLL_INTERVAL_MS, NETWORK_IDLE_THRESHOLD_MS,
};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::input::InsertTextParams;
use chromiumoxide::page::{Page as CdpPage, ScreenshotParams};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

const DOCUMENT_TOKEN_JS: &str = "(window.__shopperDoc = window.__shopperDoc || Math.random().toString(36).slice(2))";

#[derive(Debug, Clone)]
struct ElementPath {
    frame: Option<Selector>,
    steps: Vec<(Selector, usize)>,
}

impl ElementPath {
    fn root(selector: &Selector, index: usize) -> Self {
        Self {
            frame: None,
            steps: vec![(selector.clone(), index)],
        }
    }

    fn child(&self, selector: &Selector) -> Self {
        let mut steps = self.steps.clone();
        steps.push((selector.clone(), 0));
        Self {
            frame: self.frame.clone(),
            steps,
        }
    }

    /// Expression evaluating to the element or `null`
    fn resolve_js(&self) -> String {
        let mut js = String::from("(() => { let el = document; ");
        if let Some(frame) = &self.frame {
            let _ = write!(
                js,
                "const frame = {}[0]; if (!frame || !frame.contentDocument) return null; el = frame.contentDocument; ",
                frame.to_query_all("document")
            );
        }
        for (selector, index) in &self.steps {
            let _ = write!(
                js,
                "el = {}[{index}]; if (!el) return null; ",
                selector.to_query_all("el")
            );
        }
        js.push_str("return el; })()");
        js
    }

    /// `body` runs with `el` bound; the whole expression is `null` when the
    /// element is gone
    fn with_element(&self, body: &str) -> String {
        format!(
            "(() => {{ const el = {}; if (!el) return null; {body} }})()",
            self.resolve_js()
        )
    }
}

/// Browser driver backed by a real Chromium
pub struct ChromiumDriver {
    browser: Mutex<CdpBrowser>,
    page: CdpPage,
    handler: JoinHandle<()>,
    document: String,
    epoch: u64,
    next_id: u64,
    handles: HashMap<u64, (u64, ElementPath)>,
    closed: bool,
}

impl std::fmt::Debug for ChromiumDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromiumDriver")
            .field("epoch", &self.epoch)
            .field("handles", &self.handles.len())
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl ChromiumDriver {
    /// Launch a new browser instance and open a blank tab
    ///
    /// # Errors
    ///
    /// Returns error if browser cannot be launched
    pub async fn launch(settings: &BrowserSettings) -> ShopperResult<Self> {
        let mut builder = CdpConfig::builder()
            .window_size(settings.viewport_width, settings.viewport_height)
            .arg("--disable-web-security")
            .arg("--disable-features=IsolateOrigins,site-per-process");

        if !settings.headless {
            builder = builder.with_head();
        }

        if !settings.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = settings.chromium_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|message| ShopperError::BrowserLaunch { message })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| ShopperError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ShopperError::BrowserLaunch {
                message: e.to_string(),
            })?;

        info!(headless = settings.headless, "chromium launched");
        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler,
            document: String::new(),
            epoch: 0,
            next_id: 1,
            handles: HashMap::new(),
            closed: false,
        })
    }

    async fn eval<T: DeserializeOwned>(&self, expr: String) -> ShopperResult<T> {
        if self.closed {
            return Err(ShopperError::driver("browser is closed"));
        }
        let result = self
            .page
            .evaluate(expr)
            .await
            .map_err(|e| ShopperError::driver(e.to_string()))?;
        result
            .into_value()
            .map_err(|e| ShopperError::driver(e.to_string()))
    }

    /// Start a new epoch if the page is showing a different document
    async fn sync_epoch(&mut self) -> ShopperResult<()> {
        let token: String = self.eval(DOCUMENT_TOKEN_JS.to_string()).await?;
        if token != self.document {
            self.document = token;
            self.epoch += 1;
            self.handles.clear();
            debug!(epoch = self.epoch, "new document");
        }
        Ok(())
    }

    fn register(&mut self, path: ElementPath, description: String) -> ElementHandle {
        let id = self.next_id;
        self.next_id += 1;
        let _ = self.handles.insert(id, (self.epoch, path));
        ElementHandle::new(id, self.epoch, description)
    }

    async fn path_of(&mut self, handle: &ElementHandle) -> ShopperResult<ElementPath> {
        self.sync_epoch().await?;
        if handle.epoch != self.epoch {
            return Err(handle.stale());
        }
        self.handles
            .get(&handle.id)
            .map(|(_, path)| path.clone())
            .ok_or_else(|| handle.stale())
    }

    /// Run `body` against the handle's element
    async fn on_element<T: DeserializeOwned>(
        &mut self,
        handle: &ElementHandle,
        body: &str,
    ) -> ShopperResult<T> {
        let path = self.path_of(handle).await?;
        let value: Option<T> = self.eval(path.with_element(body)).await?;
        value.ok_or_else(|| ShopperError::ElementNotFound {
            selector: handle.description.clone(),
        })
    }

    async fn exists(&self, path: &ElementPath) -> ShopperResult<bool> {
        self.eval(format!("{} !== null", path.resolve_js())).await
    }

    async fn locate_path(
        &mut self,
        path: ElementPath,
        description: String,
    ) -> ShopperResult<ElementHandle> {
        self.sync_epoch().await?;
        if self.exists(&path).await? {
            Ok(self.register(path, description))
        } else {
            Err(ShopperError::ElementNotFound {
                selector: description,
            })
        }
    }
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn navigate(&mut self, url: &str) -> ShopperResult<()> {
        if self.closed {
            return Err(ShopperError::driver("browser is closed"));
        }
        let _ = self
            .page
            .goto(url)
            .await
            .map_err(|e| ShopperError::driver(format!("{url}: {e}")))?;
        self.sync_epoch().await?;
        debug!(url, epoch = self.epoch, "navigated");
        Ok(())
    }

    async fn locate(&mut self, selector: &Selector) -> ShopperResult<ElementHandle> {
        self.locate_path(ElementPath::root(selector, 0), selector.to_string())
            .await
    }

    async fn locate_all(&mut self, selector: &Selector) -> ShopperResult<Vec<ElementHandle>> {
        self.sync_epoch().await?;
        let count: usize = self
            .eval(format!("{}.length", selector.to_query_all("document")))
            .await?;
        Ok((0..count)
            .map(|index| self.register(ElementPath::root(selector, index), selector.to_string()))
            .collect())
    }

    async fn locate_within(
        &mut self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> ShopperResult<ElementHandle> {
        let path = self.path_of(parent).await?.child(selector);
        self.locate_path(path, format!("{} >> {selector}", parent.description))
            .await
    }

    async fn locate_in_frame(
        &mut self,
        frame: &Selector,
        inner: &Selector,
    ) -> ShopperResult<ElementHandle> {
        let path = ElementPath {
            frame: Some(frame.clone()),
            steps: vec![(inner.clone(), 0)],
        };
        self.locate_path(path, format!("{frame} >> {inner}")).await
    }

    async fn count(&mut self, selector: &Selector) -> ShopperResult<usize> {
        self.eval(format!("{}.length", selector.to_query_all("document")))
            .await
    }

    async fn is_visible(&mut self, handle: &ElementHandle) -> ShopperResult<bool> {
        self.on_element(
            handle,
            "const r = el.getBoundingClientRect(); \
             const s = el.ownerDocument.defaultView.getComputedStyle(el); \
             return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none';",
        )
        .await
    }

    async fn is_enabled(&mut self, handle: &ElementHandle) -> ShopperResult<bool> {
        self.on_element(handle, "return !el.disabled;").await
    }

    async fn click(&mut self, handle: &ElementHandle) -> ShopperResult<()> {
        let _: bool = self
            .on_element(
                handle,
                "el.scrollIntoView({block: 'center'}); el.click(); return true;",
            )
            .await?;
        debug!(element = %handle.description, "clicked");
        Ok(())
    }

    async fn fill(&mut self, handle: &ElementHandle, text: &str) -> ShopperResult<()> {
        let _: bool = self
            .on_element(
                handle,
                "el.focus(); if (el.select) { el.select(); } el.value = ''; \
                 el.dispatchEvent(new Event('input', {bubbles: true})); return true;",
            )
            .await?;
        let _ = self
            .page
            .execute(InsertTextParams::new(text))
            .await
            .map_err(|e| ShopperError::driver(e.to_string()))?;
        Ok(())
    }

    async fn text_content(&mut self, handle: &ElementHandle) -> ShopperResult<String> {
        let text: String = self
            .on_element(
                handle,
                "return el.tagName === 'INPUT' ? el.value : (el.textContent || '');",
            )
            .await?;
        Ok(text.trim().to_string())
    }

    async fn current_url(&mut self) -> ShopperResult<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| ShopperError::driver(e.to_string()))?;
        Ok(url.unwrap_or_default())
    }

    async fn title(&mut self) -> ShopperResult<String> {
        let title = self
            .page
            .get_title()
            .await
            .map_err(|e| ShopperError::driver(e.to_string()))?;
        Ok(title.unwrap_or_default())
    }

    async fn wait_for_load_state(
        &mut self,
        state: LoadState,
        timeout: Duration,
    ) -> ShopperResult<()> {
        let options = WaitOptions::new(duration_ms(timeout), DEFAULT_POLL_INTERVAL_MS);
        let mut deadline = Deadline::start(options, format!("load state {state}"));
        let mut resources = usize::MAX;
        let mut quiet_since = Instant::now();
        loop {
            let ready: String = self.eval("document.readyState".to_string()).await?;
            let reached = match state {
                LoadState::DomContentLoaded => ready != "loading",
                LoadState::Load => ready == "complete",
                LoadState::NetworkIdle => {
                    let now: usize = self
                        .eval("performance.getEntriesByType('resource').length".to_string())
                        .await?;
                    if now != resources {
                        resources = now;
                        quiet_since = Instant::now();
                    }
                    ready == "complete"
                        && quiet_since.elapsed() >= Duration::from_millis(NETWORK_IDLE_THRESHOLD_MS)
                }
            };
            if reached {
                return Ok(());
            }
            deadline.tick().await?;
        }
    }

    async fn screenshot(&mut self, path: &Path) -> ShopperResult<()> {
        let _ = self
            .page
            .save_screenshot(ScreenshotParams::builder().full_page(true).build(), path)
            .await
            .map_err(|e| ShopperError::driver(e.to_string()))?;
        Ok(())
    }

    async fn html_dump(&mut self, path: &Path) -> ShopperResult<()> {
        let html = self
            .page
            .content()
            .await
            .map_err(|e| ShopperError::driver(e.to_string()))?;
        tokio::fs::write(path, html).await?;
        Ok(())
    }

    async fn close(&mut self) -> ShopperResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let browser = self.browser.get_mut();
        let result = browser.close().await;
        if let Err(e) = browser.wait().await {
            warn!(error = %e, "browser process did not exit cleanly");
        }
        self.handler.abort();
        result
            .map(|_| ())
            .map_err(|e| ShopperError::driver(e.to_string()))
    }
}
