//! folio Engine
//!
//! Plays a branching book: story text goes through the markup parser, is
//! typed into the current page character by character, and effect-bearing
//! spans are handed to the effect engine as they land. A [`Session`] owns
//! the navigation state, the page DOM, the event loop and the saved
//! progress.
//!
//! # Example
//! ```rust,ignore
//! use folio_engine::{Config, Session, StorySource, NullAudio};
//! use folio_runtime::Storage;
//!
//! let mut session = Session::new(Config::default(), Storage::session(), Box::new(NullAudio))?;
//! session.start(&StorySource::parse("storyNodes.json"));
//! session.finish_page()?;
//! let selection = session.select_option(0)?;
//! ```

mod audio;
mod config;
mod error;
mod navigation;
mod pacing;
mod session;
mod story;
mod typewriter;

pub use audio::{AudioCue, AudioEvent, NullAudio, RecordingAudio, Sound};
pub use config::Config;
pub use error::{ConfigError, NavigationError, StoryError};
pub use navigation::{NavigationState, ProgressStore};
pub use pacing::{NodeTiming, Pacing, Pause};
pub use session::{BookLayout, Selection, Session, Task, ERROR_TEXT, RULES_TEXT};
pub use story::{IntegrityIssue, Story, StoryNode, StoryOption, StorySource};
pub use typewriter::{RenderCursor, RenderToken, Stage, Step, Typewriter};

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
