//! Animation intents for tile changes between renders
//!
//! The mapper only says *what* should animate; timing curves belong to the
//! renderer. Switching the agent between audio visualizer and avatar video
//! replaces the occupant (old exits, new enters). Switching the second tile
//! between camera and screen share keeps its identity.

use crate::layout::tile::{resolve, AgentSlot, SecondTileSlot, TilePlacement};
use crate::session::signals::{AgentState, Dimensions, SecondTileSource, SessionSignals};

/// Delay applied while chat is closed so the second tile settles first
pub const CHAT_CLOSED_DELAY_MS: u32 = 150;
/// Bars drawn by the audio visualizer
pub const VISUALIZER_BAR_COUNT: usize = 5;

pub fn delay_ms(chat_open: bool) -> u32 {
    if chat_open {
        0
    } else {
        CHAT_CLOSED_DELAY_MS
    }
}

/// What represents the agent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgentMode {
    AudioVisualizer,
    Avatar,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentTile {
    AudioVisualizer { bar_count: usize, state: AgentState },
    Avatar { dimensions: Dimensions },
}

impl AgentTile {
    pub fn from_signals(signals: &SessionSignals) -> Self {
        if signals.is_avatar_mode {
            AgentTile::Avatar {
                dimensions: signals.avatar_dimensions,
            }
        } else {
            AgentTile::AudioVisualizer {
                bar_count: VISUALIZER_BAR_COUNT,
                state: signals.agent_state,
            }
        }
    }

    pub fn mode(&self) -> AgentMode {
        match self {
            AgentTile::AudioVisualizer { .. } => AgentMode::AudioVisualizer,
            AgentTile::Avatar { .. } => AgentMode::Avatar,
        }
    }
}

/// Compact while chat is open, expanded otherwise
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentEmphasis {
    Compact,
    Expanded,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnimationIntent {
    /// The current occupant animates in
    pub enter: bool,
    /// The previous occupant animates out
    pub exit: bool,
    /// Same occupant moved to another slot
    pub relayout: bool,
    pub delay_ms: u32,
}

impl AnimationIntent {
    pub fn is_idle(&self) -> bool {
        !self.enter && !self.exit && !self.relayout
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SecondTile {
    pub slot: SecondTileSlot,
    pub source: SecondTileSource,
}

/// Everything the renderer needs for one render of the tile layout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutFrame {
    pub chat_open: bool,
    pub placement: TilePlacement,
    pub agent: AgentTile,
    pub emphasis: AgentEmphasis,
    pub second_tile: Option<SecondTile>,
    pub agent_animation: AnimationIntent,
    pub second_tile_animation: AnimationIntent,
}

impl LayoutFrame {
    pub fn agent_slot(&self) -> AgentSlot {
        self.placement.agent
    }

    pub fn is_animating(&self) -> bool {
        !self.agent_animation.is_idle() || !self.second_tile_animation.is_idle()
    }
}

/// Intent for the agent tile; `previous` is `None` on the first render
pub fn agent_intent(
    previous: Option<(AgentSlot, AgentMode)>,
    current: (AgentSlot, AgentMode),
    chat_open: bool,
) -> AnimationIntent {
    let delay_ms = delay_ms(chat_open);
    match previous {
        None => AnimationIntent {
            enter: true,
            delay_ms,
            ..Default::default()
        },
        Some((_, mode)) if mode != current.1 => AnimationIntent {
            enter: true,
            exit: true,
            relayout: false,
            delay_ms,
        },
        Some((slot, _)) => AnimationIntent {
            relayout: slot != current.0,
            delay_ms,
            ..Default::default()
        },
    }
}

/// Intent for the second tile from its previous and current slot
pub fn second_tile_intent(
    previous: Option<SecondTileSlot>,
    current: Option<SecondTileSlot>,
    chat_open: bool,
) -> AnimationIntent {
    let delay_ms = delay_ms(chat_open);
    match (previous, current) {
        (None, Some(_)) => AnimationIntent {
            enter: true,
            delay_ms,
            ..Default::default()
        },
        (Some(_), None) => AnimationIntent {
            exit: true,
            delay_ms,
            ..Default::default()
        },
        (Some(before), Some(after)) => AnimationIntent {
            relayout: before != after,
            delay_ms,
            ..Default::default()
        },
        (None, None) => AnimationIntent {
            delay_ms,
            ..Default::default()
        },
    }
}

/// Resolve slots, tile content and animation intents for `signals`
///
/// Pure: the same signals and previous frame always give the same frame.
pub fn resolve_layout(signals: &SessionSignals, previous: Option<&LayoutFrame>) -> LayoutFrame {
    let placement = resolve(signals.chat_open, signals.has_second_tile());
    let agent = AgentTile::from_signals(signals);

    let second_tile = placement
        .second_tile
        .zip(signals.second_tile_source())
        .map(|(slot, source)| SecondTile { slot, source });

    let agent_animation = agent_intent(
        previous.map(|p| (p.placement.agent, p.agent.mode())),
        (placement.agent, agent.mode()),
        signals.chat_open,
    );
    let second_tile_animation = second_tile_intent(
        previous.and_then(|p| p.placement.second_tile),
        placement.second_tile,
        signals.chat_open,
    );

    LayoutFrame {
        chat_open: signals.chat_open,
        placement,
        agent,
        emphasis: if signals.chat_open {
            AgentEmphasis::Compact
        } else {
            AgentEmphasis::Expanded
        },
        second_tile,
        agent_animation,
        second_tile_animation,
    }
}

/// Keeps the previous frame so each render gets transition intents
#[derive(Debug, Default)]
pub struct LayoutTracker {
    current: Option<LayoutFrame>,
}

impl LayoutTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a new frame against the last one
    ///
    /// Identical signals keep the previous frame (and its intents) so a
    /// transition is reported to the renderer until the signals change.
    pub fn update(&mut self, signals: &SessionSignals) -> LayoutFrame {
        if let Some(current) = &self.current {
            if Self::same_inputs(current, signals) {
                return *current;
            }
        }
        let frame = resolve_layout(signals, self.current.as_ref());
        self.current = Some(frame);
        frame
    }

    pub fn current(&self) -> Option<&LayoutFrame> {
        self.current.as_ref()
    }

    pub fn reset(&mut self) {
        self.current = None;
    }

    fn same_inputs(frame: &LayoutFrame, signals: &SessionSignals) -> bool {
        frame.chat_open == signals.chat_open
            && frame.agent == AgentTile::from_signals(signals)
            && frame.second_tile.map(|t| t.source) == signals.second_tile_source()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(chat_open: bool, has_camera: bool, has_screen_share: bool) -> SessionSignals {
        SessionSignals {
            chat_open,
            has_camera,
            has_screen_share,
            agent_state: AgentState::Listening,
            ..Default::default()
        }
    }

    #[test]
    fn test_delay_policy() {
        assert_eq!(delay_ms(true), 0);
        assert_eq!(delay_ms(false), 150);
    }

    #[test]
    fn test_chat_closed_with_both_tracks_prefers_screen_share() {
        let frame = resolve_layout(&signals(false, true, true), None);
        assert_eq!(frame.placement.agent, AgentSlot::Expanded);
        assert_eq!(
            frame.second_tile,
            Some(SecondTile {
                slot: SecondTileSlot::BottomRight,
                source: SecondTileSource::ScreenShare,
            })
        );
        assert_eq!(frame.emphasis, AgentEmphasis::Expanded);
    }

    #[test]
    fn test_chat_open_without_second_tile() {
        let frame = resolve_layout(&signals(true, false, false), None);
        assert_eq!(frame.placement.agent, AgentSlot::TopRow);
        assert_eq!(frame.second_tile, None);
        assert_eq!(frame.agent_animation.delay_ms, 0);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let s = signals(true, true, false);
        assert_eq!(resolve_layout(&s, None), resolve_layout(&s, None));

        let previous = resolve_layout(&signals(false, false, false), None);
        assert_eq!(
            resolve_layout(&s, Some(&previous)),
            resolve_layout(&s, Some(&previous))
        );
    }

    #[test]
    fn test_first_render_enters() {
        let frame = resolve_layout(&signals(false, false, false), None);
        assert!(frame.agent_animation.enter);
        assert!(!frame.agent_animation.exit);
        assert_eq!(frame.agent_animation.delay_ms, CHAT_CLOSED_DELAY_MS);
    }

    #[test]
    fn test_opening_chat_relayouts_agent() {
        let closed = resolve_layout(&signals(false, false, false), None);
        let open = resolve_layout(&signals(true, false, false), Some(&closed));
        assert!(open.agent_animation.relayout);
        assert!(!open.agent_animation.enter);
        assert_eq!(open.emphasis, AgentEmphasis::Compact);
    }

    #[test]
    fn test_mode_switch_replaces_occupant() {
        let audio = resolve_layout(&signals(false, false, false), None);
        let mut avatar_signals = signals(false, false, false);
        avatar_signals.is_avatar_mode = true;
        avatar_signals.avatar_dimensions = Dimensions::new(512, 512);

        let avatar = resolve_layout(&avatar_signals, Some(&audio));
        assert!(avatar.agent_animation.enter);
        assert!(avatar.agent_animation.exit);
        assert!(!avatar.agent_animation.relayout);
        assert_eq!(
            avatar.agent,
            AgentTile::Avatar {
                dimensions: Dimensions::new(512, 512)
            }
        );
    }

    #[test]
    fn test_second_tile_enter_and_exit() {
        let none = resolve_layout(&signals(false, false, false), None);
        let camera = resolve_layout(&signals(false, true, false), Some(&none));
        assert!(camera.second_tile_animation.enter);

        let gone = resolve_layout(&signals(false, false, false), Some(&camera));
        assert!(gone.second_tile_animation.exit);
        assert!(!gone.second_tile_animation.enter);
    }

    #[test]
    fn test_occupant_swap_keeps_identity() {
        let camera = resolve_layout(&signals(true, true, false), None);
        let screen = resolve_layout(&signals(true, true, true), Some(&camera));
        assert!(screen.second_tile_animation.is_idle());
        assert_eq!(
            screen.second_tile.map(|t| t.source),
            Some(SecondTileSource::ScreenShare)
        );
    }

    #[test]
    fn test_second_tile_moves_with_chat() {
        let closed = resolve_layout(&signals(false, true, false), None);
        let open = resolve_layout(&signals(true, true, false), Some(&closed));
        assert!(open.second_tile_animation.relayout);
        assert_eq!(open.second_tile_animation.delay_ms, 0);
    }

    #[test]
    fn test_tracker_holds_frame_for_identical_signals() {
        let mut tracker = LayoutTracker::new();
        let first = tracker.update(&signals(false, false, false));
        let again = tracker.update(&signals(false, false, false));
        assert_eq!(first, again);

        let open = tracker.update(&signals(true, false, false));
        assert!(open.agent_animation.relayout);
        assert_eq!(tracker.current(), Some(&open));
    }

    #[test]
    fn test_agent_state_flows_to_visualizer() {
        let mut s = signals(false, false, false);
        s.agent_state = AgentState::Speaking;
        let frame = resolve_layout(&s, None);
        assert_eq!(
            frame.agent,
            AgentTile::AudioVisualizer {
                bar_count: VISUALIZER_BAR_COUNT,
                state: AgentState::Speaking
            }
        );
    }
}
