//! Session-side inputs: live signals, collaborator traits and the session
//! controller that owns chat delivery and teardown ordering.

pub mod backend;
pub mod controller;
pub mod signals;
pub mod simulated;

pub use backend::{MediaDevices, SendError, SessionBackend};
pub use controller::{SendErrorCallback, SessionController};
pub use signals::{
    AgentState, Dimensions, RemoteParticipant, SecondTileSource, SessionSignals, TrackInfo,
    TrackPresence,
};
pub use simulated::SimulatedSession;
