//! folio Effects
//!
//! Applies the visual behaviour of tagged spans once they are in the DOM:
//!
//! - `shake`: one inline-block span per character with a random start delay
//! - `fade`: animation duration from the `speed` attribute
//! - `glitch`: periodic random character substitution from the original text
//!
//! `instant` and `slow` only change typing speed and are ignored here.
//! Every element is processed at most once, and every glitch interval is
//! registered under its element so it can be cancelled when the element
//! leaves the page.

mod engine;
mod glitch;
mod settings;

pub use engine::{EffectEngine, EffectRuntimeState, GlitchTick};
pub use glitch::{glitch_text, GLITCH_ALPHABET};
pub use settings::EffectSettings;
