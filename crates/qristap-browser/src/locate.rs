/// Selection recipe for one upstream site version.
///
/// The upstream page is an implicit, versionless contract: controls are found
/// by exact text and DOM structure rather than stable identifiers. When the
/// markup changes upstream, the fix is a new implementation of this trait,
/// not a change to the session or the loop.
pub trait LocateStrategy: Send + Sync {
    /// JS expression that clicks the labeled category toggle. Evaluates to
    /// `true` once the control was found and clicked.
    fn category_toggle_click(&self) -> String;

    /// JS expression that clicks the action button structurally adjacent to
    /// the uniquely-named candidate entry.
    fn candidate_action_click(&self) -> String;

    /// CSS selector for the form submission control.
    fn submit_control(&self) -> &str;

    /// CSS selector for the content region that renders the payment QR.
    fn qr_region(&self) -> &str;
}

/// Locator for the current vote-event markup.
pub struct VoteEventLocator {
    category_label: String,
    candidate_name: String,
}

impl VoteEventLocator {
    pub fn new(category_label: impl Into<String>, candidate_name: impl Into<String>) -> Self {
        Self {
            category_label: category_label.into(),
            candidate_name: candidate_name.into(),
        }
    }
}

impl Default for VoteEventLocator {
    fn default() -> Self {
        Self::new("TV", "I Gede Agus Kusuma Ariawan")
    }
}

impl LocateStrategy for VoteEventLocator {
    fn category_toggle_click(&self) -> String {
        // The toggle is a button wrapping a span with the exact label text.
        xpath_click_expr(&format!(
            r#"//span[text()="{}"]/ancestor::button"#,
            self.category_label
        ))
    }

    fn candidate_action_click(&self) -> String {
        // The candidate heading carries no id; walk two parents up from the
        // exact-text match and take the following sibling button.
        xpath_click_expr(&format!(
            r#"//h3[contains(@class, "text-xl") and contains(@class, "truncate") and normalize-space(text())="{}"]/../../following-sibling::button[1]"#,
            self.candidate_name
        ))
    }

    fn submit_control(&self) -> &str {
        r#"button[type="submit"]"#
    }

    fn qr_region(&self) -> &str {
        "div.absolute.inset-0.flex.items-center.justify-center.p-6"
    }
}

/// Wrap an XPath in a self-evaluating JS expression that clicks the first
/// match and reports whether anything was hit.
fn xpath_click_expr(xpath: &str) -> String {
    format!(
        "(() => {{ \
         const hit = document.evaluate('{xpath}', document, null, \
         XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue; \
         if (!hit) return false; \
         hit.click(); \
         return true; \
         }})()"
    )
}
