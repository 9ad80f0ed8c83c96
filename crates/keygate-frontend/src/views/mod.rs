mod connection_page;
mod login_page;

use gpui::{
    App, AppContext, Context, Entity, IntoElement, ParentElement, Render, Styled, Window, div,
};
use gpui_component::{
    ActiveTheme, IconName, Root, Side, StyledExt,
    sidebar::{Sidebar, SidebarGroup, SidebarHeader, SidebarMenu, SidebarMenuItem},
};

use crate::{
    BackendBridge,
    components::pane_view::PaneView,
    entities::{DataEntities, view_entity::ViewEntity},
    view_controller::{ClickOutcome, Pane},
    views::{connection_page::ConnectionPage, login_page::LoginPage},
};

#[derive(Clone, PartialEq, Eq)]
pub enum PageUi {
    Tab(String),
    Connection,
}

pub struct FrontendUi {
    data: DataEntities,
    active_page: Option<PageUi>,
    login_page: Entity<LoginPage>,
    connection_page: Entity<ConnectionPage>,
}

impl FrontendUi {
    pub fn new(data: &DataEntities, _: &mut Window, cx: &mut Context<Self>) -> Self {
        cx.observe(&data.session, |_, _, cx| cx.notify()).detach();
        cx.observe(&data.view, |this, view, cx| {
            if !view.read(cx).controller.is_loaded() {
                this.active_page = None;
            }
            cx.notify();
        })
        .detach();

        Self {
            data: data.clone(),
            active_page: None,
            login_page: cx.new(|cx| LoginPage::new(data, cx)),
            connection_page: cx.new(|cx| ConnectionPage::new(data, cx)),
        }
    }

    fn open_tab(&mut self, tab_id: String, cx: &mut Context<Self>) {
        let outcome = self.data.view.update(cx, |view, cx| {
            let outcome = view.controller.click_tab(&tab_id);
            cx.notify();
            outcome
        });
        self.active_page = Some(PageUi::Tab(tab_id));
        forward_fetch(outcome, cx);
        cx.notify();
    }

    fn open_connection(&mut self, cx: &mut Context<Self>) {
        self.active_page = Some(PageUi::Connection);
        cx.notify();
    }

    fn pane_view(&self, pane: &Pane) -> PaneView {
        let view = PaneView::new(pane);
        if !pane.has_detail() {
            return view;
        }
        let entity = self.data.view.clone();
        let pane_id = pane.id.clone();
        view.on_item_click(move |index, _, cx| open_item(&entity, &pane_id, index, cx))
    }

    fn render_tab_content(&self, cx: &App) -> gpui::AnyElement {
        let controller = &self.data.view.read(cx).controller;
        let Some(pane) = controller.active_pane() else {
            return div().into_any_element();
        };

        div()
            .flex()
            .flex_col()
            .gap_6()
            .child(self.pane_view(pane))
            .children(controller.detail_pane().map(|detail| self.pane_view(detail)))
            .into_any_element()
    }
}

/// Follows an item's detail link and sends the resulting fetch.
fn open_item(view: &Entity<ViewEntity>, pane_id: &str, index: usize, cx: &mut App) {
    let outcome = view.update(cx, |view, cx| {
        let outcome = view.controller.click_item(pane_id, index);
        cx.notify();
        outcome
    });
    forward_fetch(outcome, cx);
}

fn forward_fetch(outcome: ClickOutcome, cx: &mut App) {
    if let ClickOutcome::Fetch(request) = outcome {
        let bridge = cx.global::<BackendBridge>().clone();
        cx.spawn(async move |_| bridge.fetch_resource(request).await)
            .detach();
    }
}

impl Render for FrontendUi {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let notification_layer = Root::render_notification_layer(window, cx);

        let (title, tabs) = {
            let controller = &self.data.view.read(cx).controller;
            (controller.title().to_owned(), controller.tabs().to_vec())
        };
        if tabs.is_empty() && title.is_empty() {
            return div()
                .size_full()
                .child(self.login_page.clone())
                .children(notification_layer);
        }

        let menu = tabs.into_iter().fold(SidebarMenu::new(), |menu, tab| {
            let active = self.active_page == Some(PageUi::Tab(tab.id.clone()));
            let tab_id = tab.id;
            menu.child(
                SidebarMenuItem::new(tab.label)
                    .active(active)
                    .icon(IconName::LayoutDashboard)
                    .on_click(cx.listener(move |this, _, _, cx| {
                        this.open_tab(tab_id.clone(), cx);
                    })),
            )
        });

        let content = match &self.active_page {
            Some(PageUi::Connection) => div()
                .size_full()
                .child(self.connection_page.clone())
                .into_any_element(),
            Some(PageUi::Tab(_)) => self.render_tab_content(cx),
            None => div()
                .text_color(cx.theme().muted_foreground)
                .child("Pick a tab to get started.")
                .into_any_element(),
        };

        div()
            .flex()
            .size_full()
            .child(
                Sidebar::new(Side::Left)
                    .header(SidebarHeader::new().child(title.clone()))
                    .child(SidebarGroup::new("Navigation").child(menu))
                    .child(
                        SidebarGroup::new("Application").child(
                            SidebarMenu::new().child(
                                SidebarMenuItem::new("Connection")
                                    .active(self.active_page == Some(PageUi::Connection))
                                    .icon(IconName::Settings)
                                    .on_click(cx.listener(|this, _, _, cx| {
                                        this.open_connection(cx);
                                    })),
                            ),
                        ),
                    ),
            )
            .child(
                div()
                    .p_5()
                    .size_full()
                    .flex()
                    .flex_col()
                    .gap_6()
                    .child(div().child(title).text_2xl().font_bold())
                    .child(content),
            )
            .children(notification_layer)
    }
}
