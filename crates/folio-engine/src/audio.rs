//! Sound cues
//!
//! Playback itself lives outside the engine. The engine only says when the
//! typing and heartbeat sounds should start, stop and rewind.

use std::cell::RefCell;
use std::rc::Rc;

/// Sounds the engine drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    Typing,
    Heartbeat,
}

/// Sound sink
pub trait AudioCue {
    fn play(&mut self, sound: Sound);
    fn pause(&mut self, sound: Sound);
    /// Seek back to the start without changing play state
    fn rewind(&mut self, sound: Sound);
}

/// Silent sink
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioCue for NullAudio {
    fn play(&mut self, _sound: Sound) {}
    fn pause(&mut self, _sound: Sound) {}
    fn rewind(&mut self, _sound: Sound) {}
}

/// One recorded cue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEvent {
    Play(Sound),
    Pause(Sound),
    Rewind(Sound),
}

/// Sink that records every cue; clones share the same log
#[derive(Debug, Default, Clone)]
pub struct RecordingAudio {
    log: Rc<RefCell<Vec<AudioEvent>>>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AudioEvent> {
        self.log.borrow().clone()
    }

    /// Whether `sound` is playing after replaying the log
    pub fn is_playing(&self, sound: Sound) -> bool {
        self.log.borrow().iter().fold(false, |playing, event| match *event {
            AudioEvent::Play(s) if s == sound => true,
            AudioEvent::Pause(s) if s == sound => false,
            _ => playing,
        })
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

impl AudioCue for RecordingAudio {
    fn play(&mut self, sound: Sound) {
        self.log.borrow_mut().push(AudioEvent::Play(sound));
    }

    fn pause(&mut self, sound: Sound) {
        self.log.borrow_mut().push(AudioEvent::Pause(sound));
    }

    fn rewind(&mut self, sound: Sound) {
        self.log.borrow_mut().push(AudioEvent::Rewind(sound));
    }
}
