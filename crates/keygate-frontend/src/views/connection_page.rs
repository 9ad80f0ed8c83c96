use gpui::{Context, Entity, IntoElement, ParentElement, Render, Styled, Window, div};
use gpui_component::{
    StyledExt,
    group_box::{GroupBox, GroupBoxVariants},
};

use crate::{
    components::settings_item::SettingsItem,
    entities::{DataEntities, settings_entity::SettingsEntity},
};

/// Read-only view of the settings the backend runs with.
pub struct ConnectionPage {
    settings: Entity<SettingsEntity>,
}

impl ConnectionPage {
    pub fn new(data: &DataEntities, cx: &mut Context<Self>) -> Self {
        cx.observe(&data.settings, |_, _, cx| cx.notify()).detach();
        Self {
            settings: data.settings.clone(),
        }
    }
}

impl Render for ConnectionPage {
    fn render(&mut self, _: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let config = self.settings.read(cx).config.clone();
        let fragment = config
            .fragment_path
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "bundled".to_owned());

        div()
            .size_full()
            .flex()
            .flex_col()
            .gap_6()
            .child(div().child("Connection").text_2xl().font_bold())
            .child(
                GroupBox::new()
                    .outline()
                    .child(div().child("Identity provider").text_xl().font_bold())
                    .child(SettingsItem::new().label("Address").child(config.identity.url))
                    .child(SettingsItem::new().label("Realm").child(config.identity.realm))
                    .child(
                        SettingsItem::new()
                            .label("Client")
                            .child(config.identity.client_id),
                    ),
            )
            .child(
                GroupBox::new()
                    .outline()
                    .child(div().child("Session").text_xl().font_bold())
                    .child(
                        SettingsItem::new()
                            .label("Backend")
                            .child(config.backend.origin),
                    )
                    .child(SettingsItem::new().label("Token refresh").child(format!(
                        "every {} s, when valid for less than {} s",
                        config.session.refresh_interval_secs, config.session.min_validity_secs
                    )))
                    .child(SettingsItem::new().label("View").child(fragment)),
            )
    }
}
