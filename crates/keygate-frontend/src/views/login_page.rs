use gpui::{Context, Entity, IntoElement, ParentElement, Render, Styled, Window, div};
use gpui_component::{
    ActiveTheme, IconName, StyledExt,
    button::{Button, ButtonVariants},
};
use keygate_bridge::session::SessionPhase;

use crate::{
    BackendBridge,
    entities::{DataEntities, session_entity::SessionEntity},
    formatting::{display_url, format_eta},
};

/// Shown until the session is authenticated and its view is loaded.
pub struct LoginPage {
    session: Entity<SessionEntity>,
}

impl LoginPage {
    pub fn new(data: &DataEntities, cx: &mut Context<Self>) -> Self {
        cx.observe(&data.session, |_, _, cx| cx.notify()).detach();
        Self {
            session: data.session.clone(),
        }
    }
}

impl Render for LoginPage {
    fn render(&mut self, _: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let session = self.session.read(cx).clone();
        let muted = cx.theme().muted_foreground;

        let body = match (session.phase, session.prompt) {
            (SessionPhase::Authenticating, Some(prompt)) => {
                let target = prompt
                    .verification_uri_complete
                    .clone()
                    .unwrap_or_else(|| prompt.verification_uri.clone());
                div()
                    .flex()
                    .flex_col()
                    .items_center()
                    .gap_3()
                    .child(format!(
                        "Open {} and enter the code:",
                        display_url(&prompt.verification_uri)
                    ))
                    .child(div().child(prompt.user_code).text_2xl().font_bold())
                    .child(
                        div()
                            .text_sm()
                            .text_color(muted)
                            .child(format!(
                                "The code expires in {}.",
                                format_eta(prompt.expires_in)
                            )),
                    )
                    .child(
                        Button::new("open_verification")
                            .primary()
                            .icon(IconName::ExternalLink)
                            .label("Open in browser")
                            .on_click(move |_, _, cx| cx.open_url(&target)),
                    )
            }
            (SessionPhase::Initial | SessionPhase::Authenticating, _) => div()
                .text_color(muted)
                .child("Connecting to the identity provider..."),
            (SessionPhase::Authenticated, _) => div()
                .text_color(muted)
                .child("Signed in. Waiting for the main view..."),
            (SessionPhase::Unauthenticated, _) => div()
                .flex()
                .flex_col()
                .items_center()
                .gap_3()
                .child("Login did not complete.")
                .child(
                    Button::new("retry_login")
                        .primary()
                        .label("Try again")
                        .on_click(|_, _, cx| {
                            let bridge = cx.global::<BackendBridge>().clone();
                            cx.spawn(async move |_| bridge.start_session().await)
                                .detach();
                        }),
                ),
        };

        div()
            .size_full()
            .flex()
            .flex_col()
            .items_center()
            .justify_center()
            .gap_6()
            .child(div().child("Sign in").text_2xl().font_bold())
            .child(body)
    }
}
