//! Chat transcript with the message input

use crate::messages::{DeliveryStatus, Message};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{Key, RichText};

pub struct Transcript<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> Transcript<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        let Some(bar) = self.state.control_bar.as_ref() else {
            return;
        };
        let chat = bar.chat();
        let messages = bar.session().transcript().get_all();

        egui::ScrollArea::vertical()
            .id_salt("transcript")
            .stick_to_bottom(true)
            .auto_shrink([false, true])
            .max_height((ui.available_height() - 60.0).max(0.0))
            .show(ui, |ui| {
                if messages.is_empty() {
                    ui.label(
                        RichText::new("Say hello or type a message to start.")
                            .color(self.theme.text_muted),
                    );
                }
                for message in &messages {
                    self.show_message(ui, message);
                }
            });

        if !chat.input_visible {
            return;
        }

        ui.separator();
        ui.horizontal(|ui| {
            let input = egui::TextEdit::singleline(&mut self.state.chat_draft)
                .hint_text("Type a message...")
                .desired_width(ui.available_width() - 80.0)
                .id(egui::Id::new("message_input"));
            let input_response = ui.add(input);
            input_response.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, true, "Message input")
            });

            let send_enabled = chat.send_enabled && !self.state.chat_draft.trim().is_empty();
            let send_response = ui.add_enabled(send_enabled, egui::Button::new("Send"));
            send_response.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::Button, send_enabled, "Send message")
            });
            if !chat.send_enabled {
                ui.label(
                    RichText::new("Waiting for agent…")
                        .size(11.0)
                        .color(self.theme.text_muted),
                );
            }

            let submitted =
                input_response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
            if send_response.clicked() || (submitted && send_enabled) {
                self.state.send_chat();
            }
        });
    }

    fn show_message(&self, ui: &mut egui::Ui, message: &Message) {
        let (prefix, color, a11y) = if message.is_from_user() {
            ("You", self.theme.text_primary, "User message")
        } else {
            ("Agent", self.theme.primary, "Agent message")
        };

        ui.horizontal_wrapped(|ui| {
            ui.label(RichText::new(format!("{prefix}:")).strong().color(color));
            let response = ui.label(RichText::new(&message.text).color(self.theme.text_secondary));
            let label = format!("{}: {}", a11y, message.text);
            response.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::Label, true, &label)
            });

            match &message.delivery {
                DeliveryStatus::Sending => {
                    ui.label(RichText::new("…").color(self.theme.text_muted));
                }
                DeliveryStatus::Delivered => {}
                DeliveryStatus::Failed(reason) => {
                    ui.label(RichText::new("⚠").color(self.theme.error))
                        .on_hover_text(reason.as_str());
                }
            }
        });
    }
}
