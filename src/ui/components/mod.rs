//! Widgets for the companion window

pub mod control_bar;
pub mod tile_layout;
pub mod transcript;
pub mod welcome_view;

pub use control_bar::ControlBarView;
pub use tile_layout::TileLayout;
pub use transcript::Transcript;
pub use welcome_view::WelcomeView;
