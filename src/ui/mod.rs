pub mod console;
pub mod editor_view;
pub mod minimap;
pub mod status_bar;
pub mod toolbar;
