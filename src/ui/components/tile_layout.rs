//! Paints the agent tile and the optional second tile on the layout grid

use crate::layout::{
    AgentEmphasis, AgentTile, Align, GridArea, LayoutFrame, SecondTile, EDGE_ROW_HEIGHT,
    GRID_COLUMNS,
};
use crate::session::SecondTileSource;
use crate::ui::state::LayoutSnapshot;
use crate::ui::theme::Theme;
use egui::{Id, Pos2, Rect, RichText, Sense, Vec2};

const MOVE_SECONDS: f32 = 0.35;
const FADE_SECONDS: f32 = 0.25;

/// Tile sizes per slot
const AGENT_EXPANDED_SIZE: f32 = 220.0;
const AGENT_COMPACT_SIZE: f32 = 80.0;
const SECOND_TILE_SIZE: Vec2 = Vec2::new(160.0, 90.0);

pub struct TileLayout<'a> {
    snapshot: &'a LayoutSnapshot,
    theme: &'a Theme,
}

impl<'a> TileLayout<'a> {
    pub fn new(snapshot: &'a LayoutSnapshot, theme: &'a Theme) -> Self {
        Self { snapshot, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let bounds = ui.available_rect_before_wrap();
        ui.allocate_rect(bounds, Sense::hover());

        let frame = &self.snapshot.frame;
        // hold the previous slots until the delay has passed
        let elapsed_ms = self.snapshot.changed_at.elapsed().as_millis();
        let delay_ms = u128::from(frame.agent_animation.delay_ms);
        let settled = elapsed_ms >= delay_ms;
        let shown = if settled {
            frame
        } else {
            self.snapshot.previous.as_ref().unwrap_or(frame)
        };
        if !settled {
            ui.ctx().request_repaint();
        }

        self.show_agent(ui, bounds, shown);
        self.show_second_tile(ui, bounds, shown);
    }

    fn show_agent(&self, ui: &mut egui::Ui, bounds: Rect, frame: &LayoutFrame) {
        let size = match frame.emphasis {
            AgentEmphasis::Expanded => Vec2::splat(AGENT_EXPANDED_SIZE),
            AgentEmphasis::Compact => Vec2::splat(AGENT_COMPACT_SIZE),
        };
        let target = place(bounds, &frame.agent_slot().grid_area(), size);
        let id = Id::new("agent_tile");
        let rect = animate_rect(ui.ctx(), id, target);

        // a mode switch replaces the occupant, so restart the fade-in
        let mode_id = id.with(format!("{:?}", frame.agent.mode()));
        let opacity = ui.ctx().animate_bool_with_time(mode_id, true, FADE_SECONDS);

        let painter = ui.painter();
        match frame.agent {
            AgentTile::AudioVisualizer { bar_count, state } => {
                painter.rect_filled(
                    rect,
                    self.theme.tile_rounding,
                    self.theme.primary.gamma_multiply(opacity),
                );
                let bar_width = rect.width() / (bar_count as f32 * 2.0 + 1.0);
                let time = ui.input(|i| i.time) as f32;
                for index in 0..bar_count {
                    let level = if state.is_speaking() {
                        0.35 + 0.3 * ((time * 6.0 + index as f32).sin() + 1.0)
                    } else if state.is_engaged() {
                        0.3
                    } else {
                        0.15
                    };
                    let height = rect.height() * level.min(0.9);
                    let x = rect.left() + bar_width * (index as f32 * 2.0 + 1.0);
                    let bar = Rect::from_min_size(
                        Pos2::new(x, rect.center().y - height / 2.0),
                        Vec2::new(bar_width, height),
                    );
                    let color = if state.is_speaking() {
                        self.theme.bar_active
                    } else {
                        self.theme.bar_idle
                    };
                    painter.rect_filled(bar, bar_width / 2.0, color.gamma_multiply(opacity));
                }
                if state.is_speaking() {
                    ui.ctx().request_repaint();
                }
            }
            AgentTile::Avatar { dimensions } => {
                painter.rect_filled(
                    rect,
                    self.theme.tile_rounding,
                    self.theme.secondary.gamma_multiply(opacity),
                );
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    format!("{}×{}", dimensions.width, dimensions.height),
                    egui::FontId::proportional(12.0),
                    self.theme.text_primary.gamma_multiply(opacity),
                );
            }
        }

        let label = match frame.agent {
            AgentTile::AudioVisualizer { state, .. } => format!("Agent tile: {}", state),
            AgentTile::Avatar { .. } => "Agent tile: avatar".to_string(),
        };
        let response = ui.interact(rect, id.with("a11y"), Sense::hover());
        response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Label, true, &label));
    }

    fn show_second_tile(&self, ui: &mut egui::Ui, bounds: Rect, frame: &LayoutFrame) {
        let id = Id::new("second_tile");
        let visible = frame.second_tile.is_some();
        let opacity = ui.ctx().animate_bool_with_time(id, visible, FADE_SECONDS);

        // the exiting tile keeps its last source while it fades out
        let remembered = ui
            .ctx()
            .data_mut(|d| {
                if let Some(tile) = frame.second_tile {
                    d.insert_temp(id.with("last"), tile);
                }
                d.get_temp::<SecondTile>(id.with("last"))
            });
        let Some(tile) = frame.second_tile.or(remembered) else {
            return;
        };
        let target = place(bounds, &tile.slot.grid_area(), SECOND_TILE_SIZE);
        let rect = animate_rect(ui.ctx(), id, target);

        let (name, icon) = match tile.source {
            SecondTileSource::Camera => ("Camera", "📷"),
            SecondTileSource::ScreenShare => ("Screen share", "🖥"),
        };
        if visible {
            let label = format!("{} tile", name);
            let response = ui.interact(rect, id.with("a11y"), Sense::hover());
            response
                .widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Label, true, &label));
        }
        if opacity <= 0.0 {
            return;
        }

        let painter = ui.painter();
        painter.rect_filled(
            rect,
            self.theme.tile_rounding,
            self.theme.bg_tertiary.gamma_multiply(opacity),
        );
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            icon,
            egui::FontId::proportional(24.0),
            self.theme.text_secondary.gamma_multiply(opacity),
        );
    }
}

/// Placeholder shown while no layout has been resolved yet
pub fn show_connecting(ui: &mut egui::Ui, theme: &Theme) {
    ui.centered_and_justified(|ui| {
        ui.label(RichText::new("Connecting…").color(theme.text_muted));
    });
}

/// Rectangle of `area` inside `bounds`, with a tile of `size` aligned in it
fn place(bounds: Rect, area: &GridArea, size: Vec2) -> Rect {
    let column_width = bounds.width() / f32::from(GRID_COLUMNS);
    let middle_height = (bounds.height() - 2.0 * EDGE_ROW_HEIGHT).max(0.0);
    let row_top = |row: u8| match row {
        1 => bounds.top(),
        2 => bounds.top() + EDGE_ROW_HEIGHT,
        _ => bounds.top() + EDGE_ROW_HEIGHT + middle_height,
    };
    let row_height = |row: u8| if row == 2 { middle_height } else { EDGE_ROW_HEIGHT };

    let left = bounds.left() + column_width * f32::from(area.column - 1);
    let top = row_top(area.row);
    let width = column_width * f32::from(area.column_span);
    let height: f32 = (area.row..area.row + area.row_span).map(row_height).sum();
    let cell = Rect::from_min_size(Pos2::new(left, top), Vec2::new(width, height));

    let size = size.min(cell.size());
    let x = align(cell.left(), cell.width(), size.x, area.align_x);
    let y = align(cell.top(), cell.height(), size.y, area.align_y);
    Rect::from_min_size(Pos2::new(x, y), size)
}

fn align(start: f32, available: f32, size: f32, align: Align) -> f32 {
    match align {
        Align::Start => start,
        Align::Center => start + (available - size) / 2.0,
        Align::End => start + available - size,
    }
}

fn animate_rect(ctx: &egui::Context, id: Id, target: Rect) -> Rect {
    let animate = |suffix: &str, value: f32| {
        ctx.animate_value_with_time(id.with(suffix), value, MOVE_SECONDS)
    };
    let min = Pos2::new(animate("x", target.min.x), animate("y", target.min.y));
    let size = Vec2::new(animate("w", target.width()), animate("h", target.height()));
    Rect::from_min_size(min, size)
}
