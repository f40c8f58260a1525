//! Incremental typewriter
//!
//! Reveals a page's top-level nodes one step at a time. Text and `slow`
//! nodes are typed one character per step, each character becoming its own
//! text node in the sink. Any other element is attached whole and handed to
//! the effect engine. Every step answers how long to wait before the next
//! one, so the caller owns the clock.
//!
//! Exhausting a typed node costs one more wait of the node's last delay
//! before the next node starts.

use folio_dom::{DomResult, DomTree, NodeId};
use folio_effects::{EffectEngine, GlitchTick};
use folio_markup::{materialize, TaggedNode};
use folio_runtime::EventLoop;

use crate::audio::{AudioCue, Sound};
use crate::pacing::{NodeTiming, Pacing, Pause};

/// Identity of one render invocation. A scheduled continuation carrying a
/// token that is no longer current must be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderToken(pub u64);

impl std::fmt::Display for RenderToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "render-{}", self.0)
    }
}

/// Position of the typewriter in its node list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderCursor {
    pub node_index: usize,
    pub char_index: usize,
}

/// Outcome of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Call `step` again after this many milliseconds
    Wait(u64),
    /// Every node has been revealed. Reported exactly once.
    Complete,
    /// Nothing left to do
    Idle,
}

/// Everything a step touches
pub struct Stage<'a, T> {
    pub tree: &'a mut DomTree,
    pub effects: &'a mut EffectEngine,
    pub timers: &'a mut EventLoop<T>,
    pub audio: &'a mut dyn AudioCue,
}

#[derive(Debug)]
enum Phase {
    /// About to start the node under the cursor
    Between,
    /// Typing the node under the cursor
    Typing { chars: Vec<char>, timing: NodeTiming, last_delay: u64 },
    Done,
}

/// Typewriter over one page
#[derive(Debug)]
pub struct Typewriter {
    token: RenderToken,
    nodes: Vec<TaggedNode>,
    sink: NodeId,
    pacing: Pacing,
    cursor: RenderCursor,
    phase: Phase,
}

impl Typewriter {
    /// Start a render into `sink`. The sink's previous content is torn down
    /// and removed, and the typing sound is rewound and started.
    pub fn start<T>(
        token: RenderToken,
        nodes: Vec<TaggedNode>,
        sink: NodeId,
        pacing: Pacing,
        stage: &mut Stage<'_, T>,
    ) -> Self
    where
        T: Clone,
    {
        for child in stage.tree.children(sink).to_vec() {
            stage.effects.teardown_subtree(stage.tree, child, stage.timers);
        }
        stage.tree.clear_children(sink);

        stage.audio.rewind(Sound::Typing);
        stage.audio.play(Sound::Typing);
        tracing::debug!("Started {} with {} nodes into {}", token, nodes.len(), sink);

        Self {
            token,
            nodes,
            sink,
            pacing,
            cursor: RenderCursor::default(),
            phase: Phase::Between,
        }
    }

    pub fn token(&self) -> RenderToken {
        self.token
    }

    pub fn cursor(&self) -> RenderCursor {
        self.cursor
    }

    pub fn sink(&self) -> NodeId {
        self.sink
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    /// Advance by one step
    pub fn step<T>(&mut self, stage: &mut Stage<'_, T>) -> DomResult<Step>
    where
        T: From<GlitchTick> + Clone,
    {
        if let Phase::Typing { chars, timing, last_delay } = &mut self.phase {
            if let Some(&c) = chars.get(self.cursor.char_index) {
                let text = stage.tree.create_text(c.to_string());
                stage.tree.append_child(self.sink, text)?;

                stage.audio.play(Sound::Typing);
                if Pause::of(c).is_punctuation() {
                    stage.audio.pause(Sound::Typing);
                }

                let delay = self.pacing.delay_after(c, *timing);
                *last_delay = delay;
                self.cursor.char_index += 1;
                return Ok(Step::Wait(delay));
            }

            let delay = *last_delay;
            self.phase = Phase::Between;
            self.cursor = RenderCursor {
                node_index: self.cursor.node_index + 1,
                char_index: 0,
            };
            return Ok(Step::Wait(delay));
        }

        if matches!(self.phase, Phase::Done) {
            return Ok(Step::Idle);
        }

        let Some(node) = self.nodes.get(self.cursor.node_index) else {
            self.phase = Phase::Done;
            stage.audio.pause(Sound::Typing);
            stage.audio.rewind(Sound::Typing);
            tracing::debug!("Completed {}", self.token);
            return Ok(Step::Complete);
        };

        match self.pacing.timing_of(node) {
            NodeTiming::Attached => {
                let element = materialize(node, stage.tree)?;
                stage.tree.append_child(self.sink, element)?;
                stage.effects.scan(stage.tree, self.sink, stage.timers)?;
                self.cursor.node_index += 1;
                Ok(Step::Wait(self.pacing.base_ms))
            }
            timing => {
                self.phase = Phase::Typing {
                    chars: node.text_content().chars().collect(),
                    timing,
                    last_delay: self.pacing.base_ms,
                };
                self.step(stage)
            }
        }
    }
}
