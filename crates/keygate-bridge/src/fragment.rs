//! The secondary view document loaded after authentication.
//!
//! A fragment names its content panes and the tab triggers that render into
//! them. Nothing here is bound to a UI toolkit; the frontend locates panes and
//! triggers by their identifiers.

use serde::{Deserialize, Serialize};

/// A named content container.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContentPane {
    pub id: String,
    pub title: String,
}

/// Fetch a record's children into another pane when one of its items is
/// clicked.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DetailLink {
    /// Resource path with an `{id}` placeholder.
    pub path: String,
    /// Pane the detail response is rendered into.
    pub pane: String,
    /// Record field rendered for each detail item.
    #[serde(default = "default_field")]
    pub field: String,
}

impl DetailLink {
    /// Substitutes the record id into the path template.
    pub fn resolve(&self, id: &str) -> String {
        self.path.replace("{id}", id)
    }
}

/// What a tab trigger does when clicked.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TabAction {
    /// Render fixed text into the pane, without any network call.
    Static { content: String },
    /// Fetch `path` with the bearer token and render one item per record.
    Fetch {
        path: String,
        #[serde(default = "default_field")]
        field: String,
        #[serde(default)]
        detail: Option<DetailLink>,
    },
}

/// An interactive element switching the displayed pane.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TabTrigger {
    pub id: String,
    pub label: String,
    /// Identifier of the pane this trigger renders into.
    pub pane: String,
    pub action: TabAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Fragment {
    pub title: String,
    #[serde(default)]
    pub panes: Vec<ContentPane>,
    #[serde(default)]
    pub tabs: Vec<TabTrigger>,
}

fn default_field() -> String {
    "name".to_owned()
}
