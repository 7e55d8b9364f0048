use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::notify::NoticeKind;

static MAIN_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("main[data-page]").expect("main page selector"));
static ID_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[id]").expect("id selector"));
static CSRF_META_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[name=csrf-token]").expect("csrf meta selector"));
static CSRF_INPUT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("input[name=csrfmiddlewaretoken]").expect("csrf input selector")
});
static CSRF_NAMED_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"[name="csrfmiddlewaretoken"]"#).expect("csrf named selector")
});
static CATEGORY_BUTTON_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".category-filter-btn[data-category]").expect("category button selector")
});

/// Value of the `data-page` attribute on the page's `<main>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Index,
    Vendors,
    Events,
    Profile,
    VendorDashboard,
}

impl PageKind {
    pub fn from_attr(value: &str) -> Option<Self> {
        match value.trim() {
            "index" => Some(PageKind::Index),
            "vendors" => Some(PageKind::Vendors),
            "events" => Some(PageKind::Events),
            "profile" => Some(PageKind::Profile),
            "vendor-dashboard" => Some(PageKind::VendorDashboard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Container {
    pub html: String,
    pub hidden: bool,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: NoticeKind,
    pub message: String,
    pub shown_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Toast {
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Anti-forgery token candidates found in the document markup.
#[derive(Debug, Clone, Default)]
pub struct CsrfMarkup {
    pub meta: Option<String>,
    pub input: Option<String>,
    pub named: Option<String>,
}

#[derive(Debug, Default)]
struct PageState {
    kind: Option<PageKind>,
    location: String,
    cookies: String,
    csrf: CsrfMarkup,
    containers: HashMap<String, Container>,
    open_dialogs: HashSet<String>,
    category_buttons: Vec<String>,
    active_category: Option<String>,
    toasts: Vec<Toast>,
}

/// Shared model of the server-rendered page: every element carrying an `id`
/// becomes a named container whose inner HTML the renderers replace.
#[derive(Debug, Clone, Default)]
pub struct Page {
    inner: Arc<Mutex<PageState>>,
}

impl Page {
    pub fn parse(document: &str, location: &str, cookies: &str) -> Self {
        let html = Html::parse_document(document);

        let kind = html
            .select(&MAIN_SELECTOR)
            .next()
            .and_then(|main| main.value().attr("data-page"))
            .and_then(PageKind::from_attr);

        let mut containers = HashMap::new();
        for element in html.select(&ID_SELECTOR) {
            let Some(id) = element.value().attr("id") else {
                continue;
            };
            containers.insert(
                id.to_string(),
                Container {
                    html: element.inner_html().trim().to_string(),
                    hidden: starts_hidden(&element),
                },
            );
        }

        let csrf = CsrfMarkup {
            meta: first_attr(&html, &CSRF_META_SELECTOR, "content"),
            input: first_attr(&html, &CSRF_INPUT_SELECTOR, "value"),
            named: first_attr(&html, &CSRF_NAMED_SELECTOR, "value"),
        };

        let category_buttons = html
            .select(&CATEGORY_BUTTON_SELECTOR)
            .filter_map(|btn| btn.value().attr("data-category"))
            .map(str::to_string)
            .collect();

        Self {
            inner: Arc::new(Mutex::new(PageState {
                kind,
                location: location.to_string(),
                cookies: cookies.to_string(),
                csrf,
                containers,
                category_buttons,
                ..PageState::default()
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, PageState> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn kind(&self) -> Option<PageKind> {
        self.state().kind
    }

    pub fn location(&self) -> String {
        self.state().location.clone()
    }

    /// Value of a query parameter of the current location.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let location = self.location();
        let (_, query) = location.split_once('?')?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    pub fn navigate(&self, location: &str) {
        tracing::debug!("navigating to {location}");
        self.state().location = location.to_string();
    }

    pub fn cookies(&self) -> String {
        self.state().cookies.clone()
    }

    pub fn csrf_markup(&self) -> CsrfMarkup {
        self.state().csrf.clone()
    }

    pub fn has(&self, id: &str) -> bool {
        self.state().containers.contains_key(id)
    }

    pub fn html(&self, id: &str) -> Option<String> {
        self.state().containers.get(id).map(|c| c.html.clone())
    }

    /// Replaces a container's content. Returns false when the page has no
    /// such container.
    pub fn set_html(&self, id: &str, html: impl Into<String>) -> bool {
        match self.state().containers.get_mut(id) {
            Some(container) => {
                container.html = html.into();
                true
            }
            None => false,
        }
    }

    pub fn prepend_html(&self, id: &str, html: &str) -> bool {
        match self.state().containers.get_mut(id) {
            Some(container) => {
                container.html.insert_str(0, html);
                true
            }
            None => false,
        }
    }

    /// Rewrites a container's content in place.
    pub fn patch<F>(&self, id: &str, transform: F) -> bool
    where
        F: FnOnce(&str) -> String,
    {
        match self.state().containers.get_mut(id) {
            Some(container) => {
                container.html = transform(&container.html);
                true
            }
            None => false,
        }
    }

    /// Rewrites every container. Returns how many changed.
    pub fn patch_all<F>(&self, mut transform: F) -> usize
    where
        F: FnMut(&str) -> String,
    {
        let mut changed = 0;
        for container in self.state().containers.values_mut() {
            let updated = transform(&container.html);
            if updated != container.html {
                container.html = updated;
                changed += 1;
            }
        }
        changed
    }

    pub fn show(&self, id: &str) {
        if let Some(container) = self.state().containers.get_mut(id) {
            container.hidden = false;
        }
    }

    pub fn hide(&self, id: &str) {
        if let Some(container) = self.state().containers.get_mut(id) {
            container.hidden = true;
        }
    }

    pub fn toggle(&self, id: &str) {
        if let Some(container) = self.state().containers.get_mut(id) {
            container.hidden = !container.hidden;
        }
    }

    pub fn is_hidden(&self, id: &str) -> Option<bool> {
        self.state().containers.get(id).map(|c| c.hidden)
    }

    /// Writes an inline error message and reveals its container.
    pub fn show_error(&self, id: &str, message: &str) {
        if let Some(container) = self.state().containers.get_mut(id) {
            container.html = crate::utils::escape_html(message);
            container.hidden = false;
        }
    }

    pub fn open_dialog(&self, id: &str) {
        self.state().open_dialogs.insert(id.to_string());
    }

    pub fn close_dialog(&self, id: &str) {
        self.state().open_dialogs.remove(id);
    }

    pub fn is_dialog_open(&self, id: &str) -> bool {
        self.state().open_dialogs.contains(id)
    }

    pub fn category_buttons(&self) -> Vec<String> {
        self.state().category_buttons.clone()
    }

    pub fn active_category(&self) -> Option<String> {
        self.state().active_category.clone()
    }

    /// Marks the filter button for `category` active, falling back to the
    /// "all" button when no button matches.
    pub fn set_active_category(&self, category: Option<&str>) {
        let mut state = self.state();
        let matched = category
            .filter(|c| state.category_buttons.iter().any(|b| b == c))
            .map(str::to_string);
        let fallback = state
            .category_buttons
            .iter()
            .find(|b| b.as_str() == "all")
            .cloned();
        state.active_category = matched.or(fallback);
    }

    pub fn has_toast_surface(&self) -> bool {
        let state = self.state();
        state.containers.contains_key("toast") && state.containers.contains_key("toast-message")
    }

    pub fn push_toast(&self, toast: Toast) {
        let mut state = self.state();
        if let Some(message) = state.containers.get_mut("toast-message") {
            message.html = crate::utils::escape_html(&toast.message);
        }
        state.toasts.push(toast);
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.state().toasts.clone()
    }

    pub fn visible_toasts(&self, now: DateTime<Utc>) -> Vec<Toast> {
        self.state()
            .toasts
            .iter()
            .filter(|t| t.is_visible(now))
            .cloned()
            .collect()
    }

    /// Ids and content of every container, sorted by id.
    pub fn snapshot(&self) -> Vec<(String, Container)> {
        let mut all: Vec<_> = self
            .state()
            .containers
            .iter()
            .map(|(id, c)| (id.clone(), c.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }
}

fn starts_hidden(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    let by_class = value.classes().any(|class| class == "d-none");
    let by_style = value
        .attr("style")
        .map(|style| style.replace(' ', "").contains("display:none"))
        .unwrap_or(false);
    by_class || by_style
}

fn first_attr(html: &Html, selector: &Selector, attr: &str) -> Option<String> {
    html.select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::to_string)
}
