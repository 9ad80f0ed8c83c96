use gpui::Entity;

pub mod session_entity;
pub mod settings_entity;
pub mod view_entity;

#[derive(Debug, Clone)]
pub struct DataEntities {
    pub settings: Entity<settings_entity::SettingsEntity>,
    pub session: Entity<session_entity::SessionEntity>,
    pub view: Entity<view_entity::ViewEntity>,
}
