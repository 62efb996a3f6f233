//! AR Tap-to-Place
//!
//! ```text
//! Idle ──session_start──▶ AwaitingPlacement ──commit (with hit)──▶ Placed
//!  ▲                        ▲        │ frame: reticle follows hits   │
//!  │                        └────────┼───────request_replace─────────┘
//!  └──────────session_end (any state)┘
//! ```
//!
//! The host XR runtime is reached only through [`XrHitTestProvider`].

mod controller;
mod provider;

pub use controller::{PlacementController, PlacementNodes, PlacementOverlay, PlacementState};
pub use provider::{HitTestSource, ReferenceSpace, ReferenceSpaceKind, XrHitTestProvider};
