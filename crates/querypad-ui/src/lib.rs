//! Querypad UI crate - headless control logic for the notebook frontend.
//!
//! Currently hosts the owner-gated visibility toggle; rendering itself is
//! left to whatever shell embeds these controls.

pub mod toggle;

pub use toggle::{
    HttpVisibilityEndpoint, ToggleOutcome, ToggleState, VisibilityEndpoint, VisibilityToggle,
};
