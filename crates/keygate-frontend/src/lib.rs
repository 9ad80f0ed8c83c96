use gpui::{AnyWindowHandle, AppContext, Application, AsyncApp, Global, WindowOptions};
use gpui_component::{
    Root, WindowExt,
    notification::{Notification, NotificationType},
};
use keygate_bridge::{FetchRequest, MessageFromBackend, MessageToBackend};
use tokio::sync::mpsc;

use crate::entities::{
    session_entity::SessionEntity, settings_entity::SettingsEntity, view_entity::ViewEntity,
};

pub mod components;
pub mod entities;
pub mod formatting;
pub mod view_controller;
mod views;

#[derive(Clone)]
pub struct BackendBridge {
    pub to_backend: mpsc::Sender<MessageToBackend>,
}

impl BackendBridge {
    async fn send(&self, message: MessageToBackend) {
        if let Err(error) = self.to_backend.send(message).await {
            log::error!("Backend is gone, dropping {:?}", error.0);
        }
    }

    pub async fn request_config(&self) {
        self.send(MessageToBackend::ConfigurationRequest).await;
    }

    pub async fn start_session(&self) {
        self.send(MessageToBackend::StartSession).await;
    }

    pub async fn fetch_resource(&self, request: FetchRequest) {
        self.send(MessageToBackend::FetchResource(request)).await;
    }
}

impl Global for BackendBridge {}

fn push_notification(
    window_handle: AnyWindowHandle,
    notification_type: NotificationType,
    message: String,
    cx: &mut AsyncApp,
) {
    let pushed = window_handle.update(cx, |_, window, cx| {
        let notification = Notification::new()
            .message(message)
            .with_type(notification_type);
        window.push_notification(notification, cx);
    });
    if let Err(error) = pushed {
        log::warn!("Failed to push a notification: {error}");
    }
}

fn notification_type(kind: keygate_bridge::notification::NotificationType) -> NotificationType {
    use keygate_bridge::notification::NotificationType as Kind;
    match kind {
        Kind::Info => NotificationType::Info,
        Kind::Success => NotificationType::Success,
        Kind::Warning => NotificationType::Warning,
        Kind::Error => NotificationType::Error,
    }
}

pub fn run(
    mut rx: mpsc::Receiver<MessageFromBackend>,
    tx: mpsc::Sender<MessageToBackend>,
) -> anyhow::Result<()> {
    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(move |cx| {
        gpui_component::init(cx);

        let data = entities::DataEntities {
            settings: cx.new(|_| SettingsEntity::default()),
            session: cx.new(|_| SessionEntity::default()),
            view: cx.new(|_| ViewEntity::default()),
        };
        let listener_data = data.clone();

        let bridge = BackendBridge {
            to_backend: tx.clone(),
        };
        cx.set_global(bridge.clone());

        cx.spawn(async move |cx| {
            cx.open_window(WindowOptions::default(), |window, cx| {
                let window_handle = window.window_handle();
                let listener_bridge = bridge.clone();
                cx.spawn(async move |cx| {
                    while let Some(message) = rx.recv().await {
                        log::debug!("Got a message from backend: {message:?}");
                        match message {
                            MessageFromBackend::ConfigurationResponse(config) => {
                                SettingsEntity::update(&listener_data.settings, config, cx)
                            }
                            MessageFromBackend::NotificationMessage(notification) => {
                                push_notification(
                                    window_handle,
                                    notification_type(notification.notification_type),
                                    notification.message,
                                    cx,
                                );
                            }
                            MessageFromBackend::SessionPhaseUpdate(phase) => {
                                SessionEntity::set_phase(&listener_data.session, phase, cx)
                            }
                            MessageFromBackend::LoginPrompt(prompt) => {
                                SessionEntity::set_prompt(&listener_data.session, prompt, cx)
                            }
                            MessageFromBackend::ReloadRequested => {
                                log::info!("Login was not granted, starting over");
                                ViewEntity::reset(&listener_data.view, cx);
                                SessionEntity::reset(&listener_data.session, cx);
                                listener_bridge.start_session().await;
                            }
                            MessageFromBackend::FragmentLoaded(fragment) => {
                                ViewEntity::install(&listener_data.view, fragment, cx)
                            }
                            MessageFromBackend::ResourceResponse(response) => {
                                let view = listener_data.view.clone();
                                let failure = cx
                                    .update(|cx| ViewEntity::commit(&view, response, cx))
                                    .ok()
                                    .flatten();
                                if let Some(message) = failure {
                                    push_notification(
                                        window_handle,
                                        NotificationType::Error,
                                        message,
                                        cx,
                                    );
                                }
                            }
                        }
                    }
                })
                .detach();

                cx.spawn(async move |_| {
                    bridge.request_config().await;
                    bridge.start_session().await;
                })
                .detach();

                let view = cx.new(|cx| crate::views::FrontendUi::new(&data, window, cx));
                cx.new(|cx| Root::new(view, window, cx))
            })?;

            Ok::<_, anyhow::Error>(())
        })
        .detach();
    });

    Ok(())
}
