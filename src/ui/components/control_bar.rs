//! Bottom control bar: device toggles, device pickers, transcript toggle
//! and the leave button

use crate::controls::{DeviceKind, ToggleView};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{RichText, Vec2};

const BUTTON_SIZE: f32 = 40.0;

pub struct ControlBarView<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> ControlBarView<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        let Some(bar) = self.state.control_bar.as_ref() else {
            return;
        };
        let visible = bar.visible_controls();
        let chat_open = bar.chat_open();
        let leave_enabled = bar.leave_enabled();
        let views: Vec<ToggleView> = DeviceKind::ALL
            .iter()
            .filter(|kind| visible.is_visible(**kind))
            .map(|kind| bar.input().view(*kind))
            .collect();

        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.tile_rounding)
            .inner_margin(self.theme.spacing_sm)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    for view in &views {
                        self.show_toggle(ui, view);
                        if view.kind.is_selectable() {
                            self.show_device_picker(ui, view);
                        }
                    }

                    self.show_chat_toggle(ui, chat_open);

                    if visible.leave {
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            self.show_leave(ui, leave_enabled);
                        });
                    }
                });
            });

        if let Some(status) = &self.state.status {
            ui.add_space(self.theme.spacing_sm);
            ui.label(RichText::new(status).size(12.0).color(self.theme.error));
        }
    }

    fn show_toggle(&mut self, ui: &mut egui::Ui, view: &ToggleView) {
        let (icon, label) = match view.kind {
            DeviceKind::Microphone => ("🎤", "Toggle microphone"),
            DeviceKind::Camera => ("📷", "Toggle camera"),
            DeviceKind::ScreenShare => ("🖥", "Toggle screen share"),
        };
        let icon = if view.pending { "⏳" } else { icon };

        let button = egui::Button::new(RichText::new(icon).size(18.0))
            .min_size(Vec2::splat(BUTTON_SIZE))
            .rounding(self.theme.button_rounding)
            .fill(self.theme.toggle_fill(view.enabled));

        let enabled = !view.pending;
        let response = ui.add_enabled(enabled, button);
        response.widget_info(|| {
            egui::WidgetInfo::selected(egui::WidgetType::Button, enabled, view.enabled, label)
        });

        let tooltip = match &view.last_error {
            Some(error) => error.kind.user_message().to_string(),
            None if view.enabled => format!("Turn {} off", view.kind),
            None => format!("Turn {} on", view.kind),
        };
        if response.on_hover_text(tooltip).clicked() {
            self.state.toggle_device(view.kind);
        }
    }

    fn show_device_picker(&mut self, ui: &mut egui::Ui, view: &ToggleView) {
        let devices = self.state.devices(view.kind);
        if devices.len() < 2 {
            return;
        }

        let current = view
            .device_id
            .as_deref()
            .and_then(|id| devices.iter().find(|d| d.device_id == id))
            .map(|d| d.label.clone())
            .unwrap_or_else(|| "Default".to_string());

        let mut chosen = None;
        egui::ComboBox::from_id_salt(("device_picker", view.kind))
            .selected_text(RichText::new(current).size(12.0))
            .width(120.0)
            .show_ui(ui, |ui| {
                for device in &devices {
                    let selected = view.device_id.as_deref() == Some(device.device_id.as_str());
                    if ui.selectable_label(selected, &device.label).clicked() {
                        chosen = Some(device.device_id.clone());
                    }
                }
            });

        if let Some(device_id) = chosen {
            self.state.select_device(view.kind, &device_id);
        }
    }

    fn show_chat_toggle(&mut self, ui: &mut egui::Ui, chat_open: bool) {
        let button = egui::Button::new(RichText::new("💬").size(18.0))
            .min_size(Vec2::splat(BUTTON_SIZE))
            .rounding(self.theme.button_rounding)
            .fill(self.theme.toggle_fill(chat_open));

        let response = ui.add(button);
        response.widget_info(|| {
            let label = "Toggle transcript";
            egui::WidgetInfo::selected(egui::WidgetType::Button, true, chat_open, label)
        });
        if response.on_hover_text("Transcript").clicked() {
            self.state.toggle_chat();
        }
    }

    fn show_leave(&mut self, ui: &mut egui::Ui, enabled: bool) {
        let button = egui::Button::new(
            RichText::new("End")
                .size(14.0)
                .strong()
                .color(self.theme.text_primary),
        )
        .min_size(Vec2::new(BUTTON_SIZE * 2.0, BUTTON_SIZE))
        .rounding(self.theme.button_rounding)
        .fill(self.theme.leave);

        let response = ui.add_enabled(enabled, button);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, enabled, "End session")
        });
        if response.clicked() {
            self.state.leave();
        }
    }
}
