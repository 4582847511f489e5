//! Tile placement on the fixed layout grid
//!
//! The grid has two equal columns and three rows: a 90px top row, a
//! flexible middle row and a 90px bottom row.
//!
//! | chat open | second tile | agent         | second tile  |
//! |-----------|-------------|---------------|--------------|
//! | no        | any         | `Expanded`    | `BottomRight`|
//! | yes       | yes         | `WithSibling` | `TopRight`   |
//! | yes       | no          | `TopRow`      | not rendered |

pub const GRID_COLUMNS: u8 = 2;
pub const GRID_ROWS: u8 = 3;
/// Height of the top and bottom grid rows in logical pixels
pub const EDGE_ROW_HEIGHT: f32 = 90.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgentSlot {
    /// Whole grid, centered (chat closed)
    Expanded,
    /// Top-left cell, aligned to the right edge (chat open, second tile shown)
    WithSibling,
    /// Top row across both columns, centered (chat open, no second tile)
    TopRow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SecondTileSlot {
    /// Top-right cell, aligned to the left edge
    TopRight,
    /// Bottom-right corner
    BottomRight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Align {
    Start,
    Center,
    End,
}

/// A rectangle of grid cells plus alignment of the tile inside it
///
/// `column` and `row` are 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridArea {
    pub column: u8,
    pub row: u8,
    pub column_span: u8,
    pub row_span: u8,
    pub align_x: Align,
    pub align_y: Align,
}

impl AgentSlot {
    pub fn grid_area(&self) -> GridArea {
        match self {
            AgentSlot::Expanded => GridArea {
                column: 1,
                row: 1,
                column_span: GRID_COLUMNS,
                row_span: GRID_ROWS,
                align_x: Align::Center,
                align_y: Align::Center,
            },
            AgentSlot::WithSibling => GridArea {
                column: 1,
                row: 1,
                column_span: 1,
                row_span: 1,
                align_x: Align::End,
                align_y: Align::Center,
            },
            AgentSlot::TopRow => GridArea {
                column: 1,
                row: 1,
                column_span: GRID_COLUMNS,
                row_span: 1,
                align_x: Align::Center,
                align_y: Align::Center,
            },
        }
    }
}

impl SecondTileSlot {
    pub fn grid_area(&self) -> GridArea {
        match self {
            SecondTileSlot::TopRight => GridArea {
                column: 2,
                row: 1,
                column_span: 1,
                row_span: 1,
                align_x: Align::Start,
                align_y: Align::Center,
            },
            SecondTileSlot::BottomRight => GridArea {
                column: 2,
                row: 3,
                column_span: 1,
                row_span: 1,
                align_x: Align::End,
                align_y: Align::End,
            },
        }
    }
}

/// Slot of every tile for one render
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TilePlacement {
    pub agent: AgentSlot,
    /// `None` when no second tile is rendered
    pub second_tile: Option<SecondTileSlot>,
}

/// Place the tiles; total over both flags
pub fn resolve(chat_open: bool, has_second_tile: bool) -> TilePlacement {
    match (chat_open, has_second_tile) {
        (false, false) => TilePlacement {
            agent: AgentSlot::Expanded,
            second_tile: None,
        },
        (false, true) => TilePlacement {
            agent: AgentSlot::Expanded,
            second_tile: Some(SecondTileSlot::BottomRight),
        },
        (true, true) => TilePlacement {
            agent: AgentSlot::WithSibling,
            second_tile: Some(SecondTileSlot::TopRight),
        },
        (true, false) => TilePlacement {
            agent: AgentSlot::TopRow,
            second_tile: None,
        },
    }
}
