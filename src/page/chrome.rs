use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use headless_chrome::{Browser, LaunchOptions, Tab};
use scraper::Html;
use serde_json::Value;
use tracing::warn;

use super::{Control, ControlId, Page};
use crate::error::PageError;

const CONTROL_ATTR: &str = "data-pc-control";

/// A real browser tab. Every operation is a small script evaluated in the page.
pub struct ChromePage {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromePage {
    pub fn open(url: &str, headless: bool) -> Result<Self> {
        let options = LaunchOptions::default_builder()
            .headless(headless)
            .build()
            .map_err(|e| anyhow!("Invalid browser options: {}", e))?;
        let browser = Browser::new(options).context("Failed to launch Chrome")?;
        let tab = browser.new_tab().context("Failed to open tab")?;
        tab.navigate_to(url)
            .and_then(|t| t.wait_until_navigated())
            .with_context(|| format!("Failed to load {}", url))?;
        Ok(ChromePage {
            _browser: browser,
            tab,
        })
    }

    fn eval(&self, script: &str) -> Result<Value, PageError> {
        self.tab
            .evaluate(script, false)
            .map(|obj| obj.value.unwrap_or(Value::Null))
            .map_err(|e| PageError::Evaluate(e.to_string()))
    }

    fn eval_number(&self, script: &str) -> u32 {
        match self.eval(script) {
            Ok(v) => v.as_f64().map(|n| n.max(0.0) as u32).unwrap_or(0),
            Err(e) => {
                warn!(error = %e, "Page read failed");
                0
            }
        }
    }

    /// Run `body` with `el` bound to the tagged control; false when it is gone.
    fn on_control(&self, id: ControlId, body: &str) -> Result<bool, PageError> {
        let script = format!(
            "(() => {{ const el = document.querySelector('[{attr}=\"{id}\"]'); if (!el) return false; {body}; return true; }})()",
            attr = CONTROL_ATTR,
            id = id,
            body = body,
        );
        Ok(self.eval(&script)?.as_bool().unwrap_or(false))
    }
}

impl Page for ChromePage {
    fn url(&self) -> String {
        self.tab.get_url()
    }

    fn snapshot(&self) -> Html {
        match self.tab.get_content() {
            Ok(html) => Html::parse_document(&html),
            Err(e) => {
                warn!(error = %e, "Could not read page content");
                Html::new_document()
            }
        }
    }

    fn has_match(&self, selector: &str) -> bool {
        let Ok(quoted) = serde_json::to_string(selector) else {
            return false;
        };
        let script = format!("document.querySelector({}) !== null", quoted);
        matches!(self.eval(&script), Ok(Value::Bool(true)))
    }

    fn controls(&self) -> Vec<Control> {
        let script = format!(
            "JSON.stringify(Array.from(document.querySelectorAll('button, a')).map((el, i) => {{ \
                el.setAttribute('{attr}', String(i)); \
                return {{ id: i, text: el.textContent.trim(), ariaLabel: el.getAttribute('aria-label') }}; \
            }}))",
            attr = CONTROL_ATTR,
        );
        let raw = match self.eval(&script) {
            Ok(Value::String(s)) => s,
            Ok(_) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Could not list controls");
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }

    fn is_live(&self, id: ControlId) -> bool {
        let script = format!(
            "(() => {{ const el = document.querySelector('[{}=\"{}\"]'); return !!el && document.body.contains(el) && el.offsetParent !== null; }})()",
            CONTROL_ATTR, id
        );
        matches!(self.eval(&script), Ok(Value::Bool(true)))
    }

    fn scroll_into_view(&mut self, id: ControlId) -> Result<(), PageError> {
        if self.on_control(id, "el.scrollIntoView({ behavior: 'smooth', block: 'center' })")? {
            Ok(())
        } else {
            Err(PageError::Detached(id))
        }
    }

    fn click(&mut self, id: ControlId) -> Result<(), PageError> {
        if self.on_control(id, "el.click()")? {
            Ok(())
        } else {
            Err(PageError::Detached(id))
        }
    }

    fn scroll_height(&self) -> u32 {
        self.eval_number("document.body.scrollHeight")
    }

    fn scroll_y(&self) -> u32 {
        self.eval_number("window.scrollY")
    }

    fn scroll_by(&mut self, dy: u32) -> Result<(), PageError> {
        self.eval(&format!("window.scrollBy(0, {})", dy)).map(|_| ())
    }

    fn scroll_to_top(&mut self) -> Result<(), PageError> {
        self.eval("window.scrollTo(0, 0)").map(|_| ())
    }
}
