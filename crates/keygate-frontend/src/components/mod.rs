pub mod pane_view;
pub mod settings_item;
