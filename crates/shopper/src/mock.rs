//! Scripted fake of the Weather Shopper site.
//!
//! [`MockDriver`] implements [`BrowserDriver`] over an in-memory model of the
//! four pages: the same selectors the page objects use resolve against
//! generated element trees, clicks move between pages, the cart counter
//! follows the cart, and the payment frame appears after "Pay with Card".
//! Faults ([`MockSite::dropping_add_clicks`], [`MockSite::with_total_offset`],
//! ...) let tests drive every failure path without a browser.
//!
//! Selectors match an element when the CSS part equals the element's tag
//! string exactly and, for text-filtered selectors, the element's text
//! contains the filter.

use crate::config::{DEFAULT_BASE_URL, DEFAULT_PAYMENT_FRAME, DEFAULT_SUCCESS_TEXT};
use crate::criteria::ProductCategory;
use crate::driver::{BrowserDriver, ElementHandle};
use crate::locator::Selector;
use crate::result::{ShopperError, ShopperResult};
use crate::wait::LoadState;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// A product card on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockProduct {
    /// Displayed name
    pub name: String,
    /// Displayed price; `None` renders a card without a price line
    pub price: Option<u32>,
}

impl MockProduct {
    /// Complete product card
    #[must_use]
    pub fn new(name: impl Into<String>, price: u32) -> Self {
        Self {
            name: name.into(),
            price: Some(price),
        }
    }

    /// Card without a price line
    #[must_use]
    pub fn without_price(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: None,
        }
    }
}

/// What the fake site serves
#[derive(Debug, Clone)]
pub struct MockSite {
    /// Base URL (must match the configuration's)
    pub base_url: String,
    /// Home page temperature readout text
    pub temperature_text: String,
    /// Moisturizer listing
    pub moisturizers: Vec<MockProduct>,
    /// Sunscreen listing
    pub sunscreens: Vec<MockProduct>,
    /// Payment frame selector
    pub payment_frame: String,
    /// Confirmation banner text
    pub success_text: String,
    /// Whether the payment form shows a ZIP field
    pub show_zip: bool,
    /// Ignore clicks on add buttons
    pub drop_add_clicks: bool,
    /// Added to the displayed cart total
    pub total_offset: i64,
    /// Screenshots fail
    pub fail_screenshots: bool,
    /// Navigation fails as if the host were down
    pub offline: bool,
    /// Element lookups that fail with a driver error after each page change
    pub unsettled_lookups: usize,
}

impl Default for MockSite {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature_text: "10 ℃".to_string(),
            moisturizers: vec![
                MockProduct::new("Aloe Body Lotion", 250),
                MockProduct::new("Almond Cream", 180),
                MockProduct::new("Aloe Vera Gel", 120),
                MockProduct::new("Vassily Almond Moisturizer", 95),
                MockProduct::new("Forest Moisturizer", 60),
                MockProduct::new("Zero Almond Butter", 310),
            ],
            sunscreens: vec![
                MockProduct::new("Vassily SPF-50", 300),
                MockProduct::new("Jeff SPF-30", 150),
                MockProduct::new("Nivea SPF-50 Lotion", 210),
                MockProduct::new("Boring SPF-30", 290),
                MockProduct::new("Sun Block SPF-15", 50),
            ],
            payment_frame: DEFAULT_PAYMENT_FRAME.to_string(),
            success_text: DEFAULT_SUCCESS_TEXT.to_string(),
            show_zip: true,
            drop_add_clicks: false,
            total_offset: 0,
            fail_screenshots: false,
            offline: false,
            unsettled_lookups: 0,
        }
    }
}

impl MockSite {
    /// Default site
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve under another base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Temperature readout text, e.g. `"36 ℃"`
    #[must_use]
    pub fn with_temperature(mut self, text: impl Into<String>) -> Self {
        self.temperature_text = text.into();
        self
    }

    /// Replace the moisturizer listing
    #[must_use]
    pub fn with_moisturizers(mut self, products: Vec<MockProduct>) -> Self {
        self.moisturizers = products;
        self
    }

    /// Replace the sunscreen listing
    #[must_use]
    pub fn with_sunscreens(mut self, products: Vec<MockProduct>) -> Self {
        self.sunscreens = products;
        self
    }

    /// Confirmation banner text
    #[must_use]
    pub fn with_success_text(mut self, text: impl Into<String>) -> Self {
        self.success_text = text.into();
        self
    }

    /// Payment form without a ZIP field
    #[must_use]
    pub const fn without_zip(mut self) -> Self {
        self.show_zip = false;
        self
    }

    /// Add buttons do nothing
    #[must_use]
    pub const fn dropping_add_clicks(mut self) -> Self {
        self.drop_add_clicks = true;
        self
    }

    /// Displayed total is off by `offset`
    #[must_use]
    pub const fn with_total_offset(mut self, offset: i64) -> Self {
        self.total_offset = offset;
        self
    }

    /// Screenshots fail
    #[must_use]
    pub const fn failing_screenshots(mut self) -> Self {
        self.fail_screenshots = true;
        self
    }

    /// Host unreachable
    #[must_use]
    pub const fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    /// The first `lookups` element queries after every page change fail with
    /// a driver error, as while a new document is still committing
    #[must_use]
    pub const fn with_unsettled_lookups(mut self, lookups: usize) -> Self {
        self.unsettled_lookups = lookups;
        self
    }

    const fn listing(&self, category: ProductCategory) -> &Vec<MockProduct> {
        match category {
            ProductCategory::Moisturizer => &self.moisturizers,
            ProductCategory::Sunscreen => &self.sunscreens,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MockPage {
    Blank,
    Home,
    Listing(ProductCategory),
    Cart,
    Confirmation,
    Missing,
}

#[derive(Debug, Clone)]
enum Action {
    GoTo(&'static str),
    AddToCart(usize),
    OpenPayment,
    SubmitPayment,
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    text: String,
    visible: bool,
    enabled: bool,
    frame: bool,
    action: Option<Action>,
    children: Vec<Node>,
}

impl Node {
    fn new(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: text.into(),
            visible: true,
            enabled: true,
            frame: false,
            action: None,
            children: Vec::new(),
        }
    }

    fn action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    fn children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }

    fn matches(&self, selector: &Selector) -> bool {
        self.tag == selector.css_part()
            && selector
                .text_filter()
                .map_or(true, |text| self.text.contains(text))
    }

    fn at(&self, path: &[usize]) -> Option<&Self> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    /// Preorder search below `self`, not descending into frames
    fn find_all(&self, selector: &Selector, prefix: &[usize], out: &mut Vec<Vec<usize>>) {
        for (index, child) in self.children.iter().enumerate() {
            let mut path = prefix.to_vec();
            path.push(index);
            if child.matches(selector) {
                out.push(path.clone());
            }
            if !child.frame {
                child.find_all(selector, &path, out);
            }
        }
    }

    fn render(&self, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        let _ = writeln!(out, "{indent}<div data-selector={:?}>{}", self.tag, self.text);
        for child in &self.children {
            child.render(depth + 1, out);
        }
        let _ = writeln!(out, "{indent}</div>");
    }
}

/// Mock driver serving a [`MockSite`]
#[derive(Debug)]
pub struct MockDriver {
    site: MockSite,
    page: MockPage,
    url: String,
    epoch: u64,
    next_id: u64,
    handles: HashMap<u64, (u64, Vec<usize>)>,
    cart: Vec<(String, u32)>,
    payment_open: bool,
    fields: HashMap<String, String>,
    closed: bool,
    unsettled: usize,
    /// Call history for verification
    pub call_history: Vec<String>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new(MockSite::default())
    }
}

impl MockDriver {
    /// Create new mock driver on `about:blank`
    #[must_use]
    pub fn new(site: MockSite) -> Self {
        Self {
            site,
            page: MockPage::Blank,
            url: "about:blank".to_string(),
            epoch: 0,
            next_id: 1,
            handles: HashMap::new(),
            cart: Vec::new(),
            payment_open: false,
            fields: HashMap::new(),
            closed: false,
            unsettled: 0,
            call_history: Vec::new(),
        }
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.call_history
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history.iter().any(|c| c.starts_with(method))
    }

    /// Names of the products in the cart
    #[must_use]
    pub fn cart_names(&self) -> Vec<&str> {
        self.cart.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Current URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Current document epoch
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Value typed into the payment field with this selector
    #[must_use]
    pub fn filled(&self, selector: &str) -> Option<&str> {
        self.fields.get(selector).map(String::as_str)
    }

    /// Whether `close` has been called
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    fn record(&mut self, call: impl Into<String>) {
        self.call_history.push(call.into());
    }

    fn ensure_open(&self) -> ShopperResult<()> {
        if self.closed {
            Err(ShopperError::driver("browser is closed"))
        } else {
            Ok(())
        }
    }

    fn settle(&mut self) -> ShopperResult<()> {
        if self.unsettled == 0 {
            return Ok(());
        }
        self.unsettled -= 1;
        Err(ShopperError::driver(
            "Execution context was destroyed, most likely because of a navigation",
        ))
    }

    fn base(&self) -> &str {
        self.site.base_url.trim_end_matches('/')
    }

    fn go_to(&mut self, path: &str) {
        let page = match path.trim_matches('/') {
            "" => MockPage::Home,
            "moisturizer" => MockPage::Listing(ProductCategory::Moisturizer),
            "sunscreen" => MockPage::Listing(ProductCategory::Sunscreen),
            "cart" => MockPage::Cart,
            "confirmation" => MockPage::Confirmation,
            _ => MockPage::Missing,
        };
        self.url = if path.is_empty() {
            format!("{}/", self.base())
        } else {
            format!("{}/{}", self.base(), path.trim_matches('/'))
        };
        self.page = page;
        self.epoch += 1;
        self.handles.clear();
        self.payment_open = false;
        self.fields.clear();
        self.unsettled = self.site.unsettled_lookups;
    }

    fn title_text(&self) -> &'static str {
        match self.page {
            MockPage::Blank => "",
            MockPage::Home => "Current Temperature",
            MockPage::Listing(ProductCategory::Moisturizer) => "The Best Moisturizers in the World!",
            MockPage::Listing(ProductCategory::Sunscreen) => "The Best Sunscreens in the World!",
            MockPage::Cart => "Cart Items",
            MockPage::Confirmation => "Confirmation",
            MockPage::Missing => "Not Found",
        }
    }

    fn cart_label(&self) -> String {
        if self.cart.is_empty() {
            "Empty".to_string()
        } else {
            format!("{} item(s)", self.cart.len())
        }
    }

    fn displayed_total(&self) -> i64 {
        let sum: i64 = self.cart.iter().map(|(_, price)| i64::from(*price)).sum();
        (sum + self.site.total_offset).max(0)
    }

    fn document(&self) -> Node {
        let children = match self.page {
            MockPage::Blank => Vec::new(),
            MockPage::Missing => vec![Node::new("h2", "Not Found")],
            MockPage::Home => vec![
                Node::new("h2", "Current temperature"),
                Node::new("#temperature", self.site.temperature_text.clone()),
                Node::new("button", "Buy moisturizers").action(Action::GoTo("moisturizer")),
                Node::new("button", "Buy sunscreens").action(Action::GoTo("sunscreen")),
            ],
            MockPage::Listing(category) => {
                let mut nodes = vec![
                    Node::new("h2", category.heading()),
                    Node::new("button.thin-text.nav-link", format!("Cart - {}", self.cart_label()))
                        .action(Action::GoTo("cart")),
                ];
                for (index, product) in self.site.listing(category).iter().enumerate() {
                    let mut card = vec![Node::new("p.font-weight-bold", product.name.clone())];
                    if let Some(price) = product.price {
                        card.push(Node::new("p", format!("Price: Rs. {price}")));
                    }
                    card.push(Node::new("button.btn.btn-primary", "Add").action(Action::AddToCart(index)));
                    nodes.push(Node::new(".container .row .text-center.col-4", "").children(card));
                }
                nodes
            }
            MockPage::Cart => {
                let mut nodes = vec![Node::new("h2", "Checkout")];
                for (name, price) in &self.cart {
                    nodes.push(Node::new("table.table-striped tbody tr", "").children(vec![
                        Node::new("td:nth-child(1)", name.clone()),
                        Node::new("td:nth-child(2)", price.to_string()),
                    ]));
                }
                nodes.push(Node::new("p#total", format!("Total: Rupees {}", self.displayed_total())));
                nodes.push(Node::new("button.stripe-button-el", "Pay with Card").action(Action::OpenPayment));
                if self.payment_open {
                    nodes.push(self.payment_frame());
                }
                nodes
            }
            MockPage::Confirmation => vec![
                Node::new("h2", self.site.success_text.clone()),
                Node::new("p.text-justify", "Your payment was successful."),
            ],
        };
        Node::new("html", "").children(children)
    }

    fn payment_frame(&self) -> Node {
        let input = |tag: &str| {
            Node::new(tag, self.fields.get(tag).cloned().unwrap_or_default())
        };
        let mut fields = vec![
            input("input[type='email']"),
            input("input[placeholder='Card number']"),
            input("input[placeholder='MM / YY']"),
            input("input[placeholder='CVC']"),
        ];
        if self.site.show_zip {
            fields.push(input("input[placeholder='ZIP Code']"));
        }
        fields.push(Node::new("button[type='submit']", "Pay").action(Action::SubmitPayment));
        let mut frame = Node::new(self.site.payment_frame.clone(), "").children(fields);
        frame.frame = true;
        frame
    }

    fn register(&mut self, path: Vec<usize>, description: String) -> ElementHandle {
        let id = self.next_id;
        self.next_id += 1;
        let _ = self.handles.insert(id, (self.epoch, path));
        ElementHandle::new(id, self.epoch, description)
    }

    fn path_of(&self, handle: &ElementHandle) -> ShopperResult<Vec<usize>> {
        self.ensure_open()?;
        if handle.epoch != self.epoch {
            return Err(handle.stale());
        }
        match self.handles.get(&handle.id) {
            Some((epoch, path)) if *epoch == self.epoch => Ok(path.clone()),
            _ => Err(handle.stale()),
        }
    }

    fn resolve(&self, handle: &ElementHandle) -> ShopperResult<Node> {
        let path = self.path_of(handle)?;
        self.document()
            .at(&path)
            .cloned()
            .ok_or_else(|| ShopperError::ElementNotFound {
                selector: handle.description.clone(),
            })
    }

    fn search(&self, root: &[usize], selector: &Selector) -> ShopperResult<Vec<Vec<usize>>> {
        let document = self.document();
        let start = document.at(root).ok_or_else(|| ShopperError::ElementNotFound {
            selector: selector.to_string(),
        })?;
        let mut found = Vec::new();
        start.find_all(selector, root, &mut found);
        Ok(found)
    }

    fn first(
        &mut self,
        root: &[usize],
        selector: &Selector,
        description: String,
    ) -> ShopperResult<ElementHandle> {
        self.ensure_open()?;
        let path = self
            .search(root, selector)?
            .into_iter()
            .next()
            .ok_or_else(|| ShopperError::ElementNotFound {
                selector: description.clone(),
            })?;
        Ok(self.register(path, description))
    }

    fn perform(&mut self, action: Action) {
        match action {
            Action::GoTo(path) => self.go_to(path),
            Action::AddToCart(index) => {
                if self.site.drop_add_clicks {
                    return;
                }
                if let MockPage::Listing(category) = self.page {
                    if let Some(product) = self.site.listing(category).get(index) {
                        self.cart
                            .push((product.name.clone(), product.price.unwrap_or(0)));
                    }
                }
            }
            Action::OpenPayment => self.payment_open = true,
            Action::SubmitPayment => {
                let required = [
                    "input[type='email']",
                    "input[placeholder='Card number']",
                    "input[placeholder='MM / YY']",
                    "input[placeholder='CVC']",
                ];
                let complete = required
                    .iter()
                    .all(|field| self.fields.get(*field).is_some_and(|v| !v.is_empty()));
                if complete {
                    self.cart.clear();
                    self.go_to("confirmation");
                }
            }
        }
    }
}

#[async_trait]
impl BrowserDriver for MockDriver {
    async fn navigate(&mut self, url: &str) -> ShopperResult<()> {
        self.ensure_open()?;
        self.record(format!("navigate:{url}"));
        if self.site.offline {
            return Err(ShopperError::driver(format!("net::ERR_NAME_NOT_RESOLVED at {url}")));
        }
        let base = self.base().to_string();
        let path = url
            .strip_prefix(&base)
            .ok_or_else(|| ShopperError::driver(format!("no route to {url}")))?
            .to_string();
        self.go_to(&path);
        Ok(())
    }

    async fn locate(&mut self, selector: &Selector) -> ShopperResult<ElementHandle> {
        self.ensure_open()?;
        self.settle()?;
        self.first(&[], selector, selector.to_string())
    }

    async fn locate_all(&mut self, selector: &Selector) -> ShopperResult<Vec<ElementHandle>> {
        self.ensure_open()?;
        let paths = self.search(&[], selector)?;
        Ok(paths
            .into_iter()
            .map(|path| self.register(path, selector.to_string()))
            .collect())
    }

    async fn locate_within(
        &mut self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> ShopperResult<ElementHandle> {
        let root = self.path_of(parent)?;
        self.first(&root, selector, format!("{} >> {selector}", parent.description))
    }

    async fn locate_in_frame(
        &mut self,
        frame: &Selector,
        inner: &Selector,
    ) -> ShopperResult<ElementHandle> {
        self.ensure_open()?;
        self.settle()?;
        let frame_path = self
            .search(&[], frame)?
            .into_iter()
            .next()
            .ok_or_else(|| ShopperError::ElementNotFound {
                selector: frame.to_string(),
            })?;
        self.first(&frame_path, inner, format!("{frame} >> {inner}"))
    }

    async fn count(&mut self, selector: &Selector) -> ShopperResult<usize> {
        self.ensure_open()?;
        Ok(self.search(&[], selector)?.len())
    }

    async fn is_visible(&mut self, handle: &ElementHandle) -> ShopperResult<bool> {
        Ok(self.resolve(handle)?.visible)
    }

    async fn is_enabled(&mut self, handle: &ElementHandle) -> ShopperResult<bool> {
        Ok(self.resolve(handle)?.enabled)
    }

    async fn click(&mut self, handle: &ElementHandle) -> ShopperResult<()> {
        let node = self.resolve(handle)?;
        self.record(format!("click:{}", handle.description));
        if !(node.visible && node.enabled) {
            return Err(ShopperError::driver(format!(
                "{} is not clickable",
                handle.description
            )));
        }
        if let Some(action) = node.action {
            self.perform(action);
        }
        Ok(())
    }

    async fn fill(&mut self, handle: &ElementHandle, text: &str) -> ShopperResult<()> {
        let node = self.resolve(handle)?;
        self.record(format!("fill:{}", node.tag));
        if !node.tag.starts_with("input") {
            return Err(ShopperError::driver(format!(
                "{} is not an input",
                handle.description
            )));
        }
        let _ = self.fields.insert(node.tag, text.to_string());
        Ok(())
    }

    async fn text_content(&mut self, handle: &ElementHandle) -> ShopperResult<String> {
        let node = self.resolve(handle)?;
        self.record(format!("text:{}", handle.description));
        Ok(node.text.trim().to_string())
    }

    async fn current_url(&mut self) -> ShopperResult<String> {
        self.ensure_open()?;
        Ok(self.url.clone())
    }

    async fn title(&mut self) -> ShopperResult<String> {
        self.ensure_open()?;
        Ok(self.title_text().to_string())
    }

    async fn wait_for_load_state(
        &mut self,
        state: LoadState,
        _timeout: Duration,
    ) -> ShopperResult<()> {
        self.ensure_open()?;
        self.record(format!("wait:{state}"));
        Ok(())
    }

    async fn screenshot(&mut self, path: &Path) -> ShopperResult<()> {
        self.ensure_open()?;
        self.record(format!("screenshot:{}", path.display()));
        if self.site.fail_screenshots {
            return Err(ShopperError::driver("screenshot capture is broken"));
        }
        tokio::fs::write(path, PNG_SIGNATURE).await?;
        Ok(())
    }

    async fn html_dump(&mut self, path: &Path) -> ShopperResult<()> {
        self.ensure_open()?;
        self.record(format!("html:{}", path.display()));
        let mut html = format!("<!-- {} -->\n", self.url);
        self.document().render(0, &mut html);
        tokio::fs::write(path, html).await?;
        Ok(())
    }

    async fn close(&mut self) -> ShopperResult<()> {
        self.record("close");
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base() -> String {
        DEFAULT_BASE_URL.to_string()
    }

    mod mock_driver_tests {
        use super::*;

        #[test]
        fn test_mock_driver_creation() {
            let driver = MockDriver::default();
            assert!(driver.history().is_empty());
            assert_eq!(driver.epoch(), 0);
            assert!(driver.cart_names().is_empty());
        }

        #[tokio::test]
        async fn test_navigate_bumps_epoch() {
            let mut driver = MockDriver::default();
            driver.navigate(&base()).await.unwrap();
            assert_eq!(driver.epoch(), 1);
            assert_eq!(driver.title().await.unwrap(), "Current Temperature");
            assert!(driver.was_called("navigate"));
        }

        #[tokio::test]
        async fn test_text_filter_selects_button() {
            let mut driver = MockDriver::default();
            driver.navigate(&base()).await.unwrap();
            let button = driver
                .locate(&Selector::css("button").with_text("Buy sunscreens"))
                .await
                .unwrap();
            driver.click(&button).await.unwrap();
            assert!(driver.current_url().await.unwrap().ends_with("/sunscreen"));
        }

        #[tokio::test]
        async fn test_missing_element() {
            let mut driver = MockDriver::default();
            driver.navigate(&base()).await.unwrap();
            let err = driver.locate(&Selector::css("#nope")).await.unwrap_err();
            assert!(err.is_not_found());
        }

        #[tokio::test]
        async fn test_frame_contents_hidden_from_page_queries() {
            let mut driver = MockDriver::default();
            driver.navigate(&format!("{}cart", base())).await.unwrap();
            let pay = driver
                .locate(&Selector::css("button.stripe-button-el"))
                .await
                .unwrap();
            driver.click(&pay).await.unwrap();
            let email = Selector::css("input[type='email']");
            assert_eq!(driver.count(&email).await.unwrap(), 0);
            let handle = driver
                .locate_in_frame(&Selector::css(DEFAULT_PAYMENT_FRAME), &email)
                .await
                .unwrap();
            driver.fill(&handle, "a@b.c").await.unwrap();
            assert_eq!(driver.filled("input[type='email']"), Some("a@b.c"));
        }

        #[tokio::test]
        async fn test_closed_driver_refuses_calls() {
            let mut driver = MockDriver::default();
            driver.close().await.unwrap();
            assert!(driver.is_closed());
            assert!(driver.navigate(&base()).await.is_err());
        }

        #[tokio::test]
        async fn test_offline_navigation_fails() {
            let mut driver = MockDriver::new(MockSite::new().offline());
            let err = driver.navigate(&base()).await.unwrap_err();
            assert_eq!(err.kind(), "driver");
        }

        #[tokio::test]
        async fn test_unsettled_lookups_reset_on_navigation() {
            let mut driver = MockDriver::new(MockSite::new().with_unsettled_lookups(1));
            let heading = Selector::css("h2");
            driver.navigate(&base()).await.unwrap();
            let err = driver.locate(&heading).await.unwrap_err();
            assert!(err.is_transient());
            assert!(!err.is_not_found());
            assert!(driver.locate(&heading).await.is_ok());

            driver.navigate(&format!("{}cart", base())).await.unwrap();
            assert!(driver.locate(&heading).await.is_err());
            assert!(driver.locate(&heading).await.is_ok());
        }
    }
}
