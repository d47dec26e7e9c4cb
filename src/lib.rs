pub mod list;
pub mod render;
pub mod theme;
