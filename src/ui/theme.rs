//! Colors, spacing and egui styling for the companion window

use crate::config::ThemeChoice;
use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Vec2, Visuals};

#[derive(Clone, Debug)]
pub struct Theme {
    /// Gradient start of the agent tile and primary buttons
    pub primary: Color32,
    /// Gradient end of the agent tile
    pub secondary: Color32,
    pub success: Color32,
    pub warning: Color32,
    pub error: Color32,

    pub bg_primary: Color32,
    pub bg_secondary: Color32,
    pub bg_tertiary: Color32,

    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_muted: Color32,

    /// Toggle fill while the device is on
    pub toggle_on: Color32,
    /// Leave button fill
    pub leave: Color32,

    /// Visualizer bar colors
    pub bar_active: Color32,
    pub bar_idle: Color32,

    pub dark: bool,

    pub button_rounding: Rounding,
    pub tile_rounding: Rounding,

    pub spacing: f32,
    pub spacing_lg: f32,
    pub spacing_sm: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn from_choice(choice: ThemeChoice) -> Self {
        match choice {
            ThemeChoice::Dark => Self::dark(),
            ThemeChoice::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            primary: Color32::from_rgb(102, 126, 234),  // #667eea
            secondary: Color32::from_rgb(118, 75, 162), // #764ba2
            success: Color32::from_rgb(34, 197, 94),
            warning: Color32::from_rgb(234, 179, 8),
            error: Color32::from_rgb(239, 68, 68),

            bg_primary: Color32::from_rgb(15, 17, 26),
            bg_secondary: Color32::from_rgb(28, 31, 45),
            bg_tertiary: Color32::from_rgb(48, 52, 72),

            text_primary: Color32::from_rgb(249, 250, 251),
            text_secondary: Color32::from_rgb(209, 213, 219),
            text_muted: Color32::from_rgb(156, 163, 175),

            toggle_on: Color32::from_rgb(102, 126, 234),
            leave: Color32::from_rgb(220, 38, 38),

            bar_active: Color32::from_rgb(255, 255, 255),
            bar_idle: Color32::from_rgb(165, 170, 210),

            dark: true,

            button_rounding: Rounding::same(20.0),
            tile_rounding: Rounding::same(16.0),

            spacing: 16.0,
            spacing_lg: 24.0,
            spacing_sm: 8.0,
        }
    }

    pub fn light() -> Self {
        Self {
            primary: Color32::from_rgb(102, 126, 234),
            secondary: Color32::from_rgb(118, 75, 162),
            success: Color32::from_rgb(22, 163, 74),
            warning: Color32::from_rgb(202, 138, 4),
            error: Color32::from_rgb(220, 38, 38),

            bg_primary: Color32::from_rgb(255, 255, 255),
            bg_secondary: Color32::from_rgb(243, 244, 246),
            bg_tertiary: Color32::from_rgb(229, 231, 235),

            text_primary: Color32::from_rgb(17, 24, 39),
            text_secondary: Color32::from_rgb(55, 65, 81),
            text_muted: Color32::from_rgb(107, 114, 128),

            toggle_on: Color32::from_rgb(102, 126, 234),
            leave: Color32::from_rgb(220, 38, 38),

            bar_active: Color32::from_rgb(255, 255, 255),
            bar_idle: Color32::from_rgb(199, 204, 240),

            dark: false,

            button_rounding: Rounding::same(20.0),
            tile_rounding: Rounding::same(16.0),

            spacing: 16.0,
            spacing_lg: 24.0,
            spacing_sm: 8.0,
        }
    }

    /// Apply this theme to egui
    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = if self.dark {
            Visuals::dark()
        } else {
            Visuals::light()
        };

        visuals.panel_fill = self.bg_primary;
        visuals.window_fill = self.bg_secondary;
        visuals.extreme_bg_color = self.bg_tertiary;

        visuals.widgets.noninteractive.bg_fill = self.bg_secondary;
        visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text_muted);

        visuals.widgets.inactive.bg_fill = self.bg_tertiary;
        visuals.widgets.inactive.weak_bg_fill = self.bg_tertiary;
        visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.text_secondary);

        visuals.widgets.hovered.bg_fill = self.primary.gamma_multiply(0.8);
        visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, self.text_primary);

        visuals.widgets.active.bg_fill = self.primary;
        visuals.widgets.active.fg_stroke = Stroke::new(1.0, self.text_primary);

        visuals.selection.bg_fill = self.toggle_on;
        visuals.selection.stroke = Stroke::new(1.0, self.text_primary);

        visuals.hyperlink_color = self.primary;
        visuals.window_rounding = self.tile_rounding;
        visuals.window_stroke = Stroke::new(1.0, self.bg_tertiary);

        ctx.set_visuals(visuals);

        let mut style = (*ctx.style()).clone();
        style.spacing.item_spacing = Vec2::splat(self.spacing_sm);
        style.spacing.window_margin = egui::Margin::same(self.spacing);
        style.spacing.button_padding = Vec2::new(self.spacing_sm, self.spacing_sm);

        style.text_styles.insert(
            egui::TextStyle::Heading,
            FontId::new(26.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Body,
            FontId::new(14.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Button,
            FontId::new(15.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Small,
            FontId::new(12.0, FontFamily::Proportional),
        );

        ctx.set_style(style);
    }

    /// Fill for a device toggle in the given state
    pub fn toggle_fill(&self, enabled: bool) -> Color32 {
        if enabled {
            self.toggle_on
        } else {
            self.bg_tertiary
        }
    }
}
