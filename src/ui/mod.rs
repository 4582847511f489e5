//! egui/eframe front end
//!
//! Renders the welcome view, the tile grid, the control bar and the chat
//! transcript from [`AppState`].

mod app;
pub mod components;
mod state;
mod theme;

pub use app::CompanionApp;
pub use components::{ControlBarView, TileLayout, Transcript, WelcomeView};
pub use state::{AppPhase, AppState, LayoutSnapshot};
pub use theme::Theme;
