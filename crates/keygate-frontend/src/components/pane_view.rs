use std::rc::Rc;

use gpui::{App, IntoElement, ParentElement, SharedString, Styled, Window, div};
use gpui_component::{
    ActiveTheme, StyledExt,
    button::{Button, ButtonVariants},
};

use crate::view_controller::{Pane, PaneContent};

type ItemClickHandler = Rc<dyn Fn(usize, &mut Window, &mut App)>;

/// Renders one content pane of the fragment.
#[derive(IntoElement)]
pub struct PaneView {
    id: SharedString,
    title: SharedString,
    content: PaneContent,
    on_item_click: Option<ItemClickHandler>,
}

impl PaneView {
    pub fn new(pane: &Pane) -> Self {
        Self {
            id: pane.id.clone().into(),
            title: pane.title.clone().into(),
            content: pane.content.clone(),
            on_item_click: None,
        }
    }

    /// Makes items with an id clickable.
    pub fn on_item_click(
        mut self,
        handler: impl Fn(usize, &mut Window, &mut App) + 'static,
    ) -> Self {
        self.on_item_click = Some(Rc::new(handler));
        self
    }
}

impl gpui::RenderOnce for PaneView {
    fn render(self, _: &mut Window, cx: &mut App) -> impl IntoElement {
        let muted = cx.theme().muted_foreground;
        let body = match self.content {
            PaneContent::Empty => div().text_color(muted).child("Nothing here yet."),
            PaneContent::Loading => div().text_color(muted).child("Loading..."),
            PaneContent::Text(text) => div().child(text),
            PaneContent::Error(message) => div().text_color(cx.theme().danger).child(message),
            PaneContent::Items(items) if items.is_empty() => {
                div().text_color(muted).child("No entries.")
            }
            PaneContent::Items(items) => {
                items
                    .into_iter()
                    .enumerate()
                    .fold(div().flex().flex_col().gap_1(), |list, (ix, item)| {
                        match (&self.on_item_click, item.id) {
                            (Some(handler), Some(_)) => {
                                let handler = handler.clone();
                                let id = SharedString::from(format!("{}-item-{ix}", self.id));
                                list.child(
                                    Button::new(id)
                                        .ghost()
                                        .label(item.text)
                                        .on_click(move |_, window, cx| handler(ix, window, cx)),
                                )
                            }
                            _ => list.child(div().px_2().child(item.text)),
                        }
                    })
            }
        };

        div()
            .flex()
            .flex_col()
            .gap_3()
            .child(div().child(self.title).text_xl().font_bold())
            .child(body)
    }
}
