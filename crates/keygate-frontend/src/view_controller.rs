//! Tab navigation over a loaded fragment, independent of the UI toolkit.
//!
//! Every fetch gets an id from a counter that only grows. A pane remembers the
//! id of its latest fetch and ignores responses carrying any other, so an
//! older response that arrives late never overwrites a newer one.

use keygate_bridge::{
    FetchRequest,
    fragment::{DetailLink, Fragment, TabAction, TabTrigger},
};
use serde_json::Value;

/// One rendered entry of a fetched list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub text: String,
    /// The record's `id`, when it has one. Needed to follow a detail link.
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PaneContent {
    #[default]
    Empty,
    Loading,
    Text(String),
    Items(Vec<ListItem>),
    Error(String),
}

/// How the response to the pane's latest fetch is rendered.
#[derive(Debug, Clone)]
struct PendingRender {
    request_id: u64,
    field: String,
    detail: Option<DetailLink>,
}

#[derive(Debug, Clone)]
pub struct Pane {
    pub id: String,
    pub title: String,
    pub content: PaneContent,
    /// Detail link of the committed list, if its items can be followed.
    detail: Option<DetailLink>,
    pending: Option<PendingRender>,
}

impl Pane {
    fn clear(&mut self, content: PaneContent) {
        self.content = content;
        self.detail = None;
    }

    /// Whether clicking the pane's items leads anywhere.
    pub fn has_detail(&self) -> bool {
        self.detail.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The pane was updated in place.
    Rendered,
    /// The pane is loading; the request must be sent to the backend.
    Fetch(FetchRequest),
    /// Nothing to do: unknown tab, pane or item.
    Ignored,
}

#[derive(Debug, Default)]
pub struct ViewController {
    title: String,
    panes: Vec<Pane>,
    tabs: Vec<TabTrigger>,
    active_tab: Option<String>,
    next_request_id: u64,
}

impl ViewController {
    /// Wires up a freshly loaded fragment, replacing any previous one.
    pub fn setup(&mut self, fragment: Fragment) {
        self.title = fragment.title;
        self.panes = fragment
            .panes
            .into_iter()
            .map(|pane| Pane {
                id: pane.id,
                title: pane.title,
                content: PaneContent::Empty,
                detail: None,
                pending: None,
            })
            .collect();

        let mut tabs = fragment.tabs;
        tabs.retain(|tab| {
            let found = self.panes.iter().any(|pane| pane.id == tab.pane);
            if !found {
                log::warn!("Tab {} targets missing pane {}, skipping", tab.id, tab.pane);
            }
            found
        });
        self.tabs = tabs;
        self.active_tab = None;
    }

    /// Forgets the fragment. The request counter keeps counting so responses
    /// to requests issued before the reset stay stale.
    pub fn reset(&mut self) {
        self.title.clear();
        self.panes.clear();
        self.tabs.clear();
        self.active_tab = None;
    }

    pub fn is_loaded(&self) -> bool {
        !self.panes.is_empty()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tabs(&self) -> &[TabTrigger] {
        &self.tabs
    }

    pub fn active_tab(&self) -> Option<&TabTrigger> {
        let active = self.active_tab.as_deref()?;
        self.tabs.iter().find(|tab| tab.id == active)
    }

    pub fn pane(&self, id: &str) -> Option<&Pane> {
        self.panes.iter().find(|pane| pane.id == id)
    }

    /// The pane the active tab renders into.
    pub fn active_pane(&self) -> Option<&Pane> {
        self.pane(&self.active_tab()?.pane)
    }

    /// The pane the active tab's items open their details in.
    pub fn detail_pane(&self) -> Option<&Pane> {
        match &self.active_tab()?.action {
            TabAction::Fetch {
                detail: Some(detail),
                ..
            } => self.pane(&detail.pane),
            _ => None,
        }
    }

    fn pane_mut(&mut self, id: &str) -> Option<&mut Pane> {
        self.panes.iter_mut().find(|pane| pane.id == id)
    }

    pub fn click_tab(&mut self, tab_id: &str) -> ClickOutcome {
        let Some(tab) = self.tabs.iter().find(|tab| tab.id == tab_id).cloned() else {
            log::warn!("Unknown tab {tab_id}");
            return ClickOutcome::Ignored;
        };
        self.active_tab = Some(tab.id);

        match tab.action {
            TabAction::Static { content } => {
                if let Some(pane) = self.pane_mut(&tab.pane) {
                    pane.pending = None;
                    pane.clear(PaneContent::Text(content));
                }
                ClickOutcome::Rendered
            }
            TabAction::Fetch {
                path,
                field,
                detail,
            } => {
                if let Some(detail_pane) = detail
                    .as_ref()
                    .and_then(|detail| self.pane_mut(&detail.pane))
                {
                    detail_pane.pending = None;
                    detail_pane.clear(PaneContent::Empty);
                }
                self.issue_fetch(&tab.pane, path, field, detail)
            }
        }
    }

    /// Opens the details of the `index`-th item of `pane_id`.
    pub fn click_item(&mut self, pane_id: &str, index: usize) -> ClickOutcome {
        let Some(pane) = self.pane(pane_id) else {
            return ClickOutcome::Ignored;
        };
        let (Some(detail), PaneContent::Items(items)) = (&pane.detail, &pane.content) else {
            return ClickOutcome::Ignored;
        };
        let Some(id) = items.get(index).and_then(|item| item.id.clone()) else {
            return ClickOutcome::Ignored;
        };
        let detail = detail.clone();
        if self.pane(&detail.pane).is_none() {
            log::warn!("Detail pane {} does not exist", detail.pane);
            return ClickOutcome::Ignored;
        }

        self.issue_fetch(&detail.pane, detail.resolve(&id), detail.field, None)
    }

    fn issue_fetch(
        &mut self,
        pane_id: &str,
        path: String,
        field: String,
        detail: Option<DetailLink>,
    ) -> ClickOutcome {
        self.next_request_id += 1;
        let request_id = self.next_request_id;

        let Some(pane) = self.pane_mut(pane_id) else {
            return ClickOutcome::Ignored;
        };
        pane.clear(PaneContent::Loading);
        pane.pending = Some(PendingRender {
            request_id,
            field,
            detail,
        });

        ClickOutcome::Fetch(FetchRequest {
            pane: pane_id.to_owned(),
            request_id,
            path,
        })
    }

    /// Renders a fetch result into its pane if it answers the pane's latest
    /// request. Returns whether it did.
    pub fn commit_response(
        &mut self,
        pane_id: &str,
        request_id: u64,
        result: Result<Value, String>,
    ) -> bool {
        let Some(pane) = self.pane_mut(pane_id) else {
            return false;
        };
        let Some(pending) = pane
            .pending
            .take_if(|pending| pending.request_id == request_id)
        else {
            log::debug!("Discarding stale response {request_id} for pane {pane_id}");
            return false;
        };

        match result {
            Ok(value) => {
                pane.clear(PaneContent::Items(render_items(&value, &pending.field)));
                pane.detail = pending.detail;
            }
            Err(message) => pane.clear(PaneContent::Error(message)),
        }
        true
    }
}

/// Turns a JSON response into list items.
///
/// Arrays give one item per element in order: objects contribute their
/// `field`, strings themselves, anything else is skipped. An object gives one
/// `key: value` line per entry.
pub fn render_items(value: &Value, field: &str) -> Vec<ListItem> {
    match value {
        Value::Array(elements) => elements
            .iter()
            .filter_map(|element| match element {
                Value::Object(record) => record.get(field).map(|text| ListItem {
                    text: display(text),
                    id: record.get("id").map(display),
                }),
                Value::String(text) => Some(ListItem {
                    text: text.clone(),
                    id: None,
                }),
                _ => None,
            })
            .collect(),
        Value::Object(record) => record
            .iter()
            .map(|(key, value)| ListItem {
                text: format!("{key}: {}", display(value)),
                id: None,
            })
            .collect(),
        Value::Null => Vec::new(),
        scalar => vec![ListItem {
            text: display(scalar),
            id: None,
        }],
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
