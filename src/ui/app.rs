//! Main application struct and eframe integration

use crate::config::WidgetConfig;
use crate::controls::DeviceChoiceStore;
use crate::ui::components::{tile_layout, ControlBarView, TileLayout, Transcript, WelcomeView};
use crate::ui::state::{AppPhase, AppState};
use crate::ui::theme::Theme;
use egui::{CentralPanel, SidePanel, TopBottomPanel};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::info;

pub struct CompanionApp {
    state: AppState,
    theme: Theme,
}

impl CompanionApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: WidgetConfig,
        runtime: Handle,
        store: Arc<dyn DeviceChoiceStore>,
    ) -> Self {
        let theme = Theme::from_choice(config.theme);
        theme.apply(&cc.egui_ctx);

        Self {
            state: AppState::new(config, runtime, store),
            theme,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Render one frame into `ctx`; shared by eframe and UI tests
    pub fn show(state: &mut AppState, theme: &Theme, ctx: &egui::Context) {
        state.poll();

        match state.phase {
            AppPhase::Welcome => {
                CentralPanel::default()
                    .frame(egui::Frame::none().fill(theme.bg_primary))
                    .show(ctx, |ui| {
                        WelcomeView::new(state, theme).show(ui);
                    });
            }
            AppPhase::Session => {
                TopBottomPanel::bottom("control_bar")
                    .frame(
                        egui::Frame::none()
                            .fill(theme.bg_primary)
                            .inner_margin(theme.spacing),
                    )
                    .show(ctx, |ui| {
                        ControlBarView::new(state, theme).show(ui);
                    });

                if state.chat_open() {
                    SidePanel::right("transcript")
                        .resizable(true)
                        .default_width(300.0)
                        .min_width(220.0)
                        .frame(
                            egui::Frame::none()
                                .fill(theme.bg_secondary)
                                .inner_margin(theme.spacing),
                        )
                        .show(ctx, |ui| {
                            Transcript::new(state, theme).show(ui);
                        });
                }

                CentralPanel::default()
                    .frame(
                        egui::Frame::none()
                            .fill(theme.bg_primary)
                            .inner_margin(theme.spacing),
                    )
                    .show(ctx, |ui| match state.layout.as_ref() {
                        Some(snapshot) => TileLayout::new(snapshot, theme).show(ui),
                        None => tile_layout::show_connecting(ui, theme),
                    });
            }
        }

        if state.needs_repaint() {
            ctx.request_repaint();
        }
    }
}

impl eframe::App for CompanionApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        Self::show(&mut self.state, &self.theme, ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if self.state.is_in_session() {
            self.state.leave();
        }
        info!("Companion shutting down");
    }
}
