//! Where tiles go and how they move between renders

pub mod animation;
pub mod tile;

pub use animation::{
    agent_intent, delay_ms, resolve_layout, second_tile_intent, AgentEmphasis, AgentMode,
    AgentTile, AnimationIntent, LayoutFrame, LayoutTracker, SecondTile, CHAT_CLOSED_DELAY_MS,
    VISUALIZER_BAR_COUNT,
};
pub use tile::{
    resolve, AgentSlot, Align, GridArea, SecondTileSlot, TilePlacement, EDGE_ROW_HEIGHT,
    GRID_COLUMNS, GRID_ROWS,
};
