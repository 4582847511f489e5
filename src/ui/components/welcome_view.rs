//! Start screen shown before a session is connected

use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{RichText, Vec2};

pub struct WelcomeView<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> WelcomeView<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        let start_text = self.state.config.start_button_text.clone();

        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.25);

            ui.label(
                RichText::new(&self.state.config.app_name)
                    .heading()
                    .strong()
                    .color(self.theme.text_primary),
            );
            ui.add_space(self.theme.spacing_sm);
            ui.label(
                RichText::new("A short voice check-in on how you are feeling today.")
                    .color(self.theme.text_muted),
            );
            ui.add_space(self.theme.spacing_lg);

            let button = egui::Button::new(
                RichText::new(&start_text)
                    .size(16.0)
                    .strong()
                    .color(egui::Color32::WHITE),
            )
            .min_size(Vec2::new(200.0, 44.0))
            .rounding(self.theme.button_rounding)
            .fill(self.theme.primary);

            let response = ui.add(button);
            response.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::Button, true, &start_text)
            });
            if response.clicked() {
                self.state.start_session();
            }
        });
    }
}
