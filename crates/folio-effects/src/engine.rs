//! Effect Engine
//!
//! Runtime state lives here, keyed by element id, instead of on the DOM
//! element: the `processed` flag, the glitch's captured original text, and
//! the handle of its recurring pass. Teardown cancels the handle and drops
//! the state, so an element that leaves the page can never keep a timer alive.

use std::collections::HashMap;

use folio_dom::{DomResult, DomTree, NodeId};
use folio_markup::EffectClass;
use folio_runtime::{EventLoop, TimerId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{glitch_text, EffectSettings};

/// Effects applied by [`EffectEngine::scan`], in order
const SCAN_ORDER: [EffectClass; 3] = [EffectClass::Shake, EffectClass::Fade, EffectClass::Glitch];

/// Event loop payload for a glitch element's recurring pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlitchTick(pub NodeId);

/// Per-element effect state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectRuntimeState {
    pub processed: bool,
    /// Text before the first glitch pass; captured once
    pub original_text: Option<String>,
    /// Recurring glitch pass
    pub interval: Option<TimerId>,
}

/// Applies effects to rendered elements, exactly once per element
#[derive(Debug)]
pub struct EffectEngine {
    settings: EffectSettings,
    states: HashMap<NodeId, EffectRuntimeState>,
    rng: StdRng,
}

impl EffectEngine {
    /// Engine seeded from OS entropy
    pub fn new(settings: EffectSettings) -> Self {
        Self::with_rng(settings, StdRng::from_entropy())
    }

    /// Deterministic engine
    pub fn with_seed(settings: EffectSettings, seed: u64) -> Self {
        Self::with_rng(settings, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(settings: EffectSettings, rng: StdRng) -> Self {
        Self { settings, states: HashMap::new(), rng }
    }

    pub fn settings(&self) -> &EffectSettings {
        &self.settings
    }

    /// State of an element, if the engine has seen it
    pub fn state(&self, element: NodeId) -> Option<&EffectRuntimeState> {
        self.states.get(&element)
    }

    pub fn is_processed(&self, element: NodeId) -> bool {
        self.states.get(&element).is_some_and(|s| s.processed)
    }

    /// Number of live recurring passes
    pub fn active_intervals(&self) -> usize {
        self.states.values().filter(|s| s.interval.is_some()).count()
    }

    /// Elements with a live recurring pass
    pub fn interval_owners(&self) -> Vec<NodeId> {
        let mut owners: Vec<_> = self
            .states
            .iter()
            .filter(|(_, s)| s.interval.is_some())
            .map(|(&id, _)| id)
            .collect();
        owners.sort();
        owners
    }

    /// Apply every visual effect to the not yet processed descendants of
    /// `root`. Safe to call again after more content is attached. Returns
    /// how many elements were processed by this call.
    pub fn scan<T>(&mut self, tree: &mut DomTree, root: NodeId, timers: &mut EventLoop<T>) -> DomResult<usize>
    where
        T: From<GlitchTick> + Clone,
    {
        let mut applied = 0;
        for effect in SCAN_ORDER {
            // re-query per effect: shake may have replaced children
            for element in tree.get_elements_by_class_name(root, effect.class_name()) {
                if self.apply(tree, element, effect, timers)? {
                    applied += 1;
                }
            }
        }
        Ok(applied)
    }

    /// Apply one effect to one element. No-op (returns `false`) when the
    /// element was already processed or the class has no visual effect.
    pub fn apply<T>(
        &mut self,
        tree: &mut DomTree,
        element: NodeId,
        effect: EffectClass,
        timers: &mut EventLoop<T>,
    ) -> DomResult<bool>
    where
        T: From<GlitchTick> + Clone,
    {
        if effect.is_timing_directive() || tree.element(element).is_none() {
            return Ok(false);
        }

        let state = self.states.entry(element).or_default();
        if effect == EffectClass::Glitch && state.original_text.is_none() {
            state.original_text = Some(tree.text_content(element));
        }
        if state.processed {
            return Ok(false);
        }
        state.processed = true;

        match effect {
            EffectClass::Shake => self.apply_shake(tree, element, timers)?,
            EffectClass::Fade => self.apply_fade(tree, element),
            EffectClass::Glitch => self.apply_glitch(tree, element, timers)?,
            EffectClass::Instant | EffectClass::Slow => {}
        }
        tracing::debug!("Applied {} to element {}", effect, element);
        Ok(true)
    }

    fn apply_shake<T>(&mut self, tree: &mut DomTree, element: NodeId, timers: &mut EventLoop<T>) -> DomResult<()>
    where
        T: From<GlitchTick> + Clone,
    {
        let force = dataset_number(tree, element, "force").unwrap_or(self.settings.default_shake_force);
        let text = tree.text_content(element);

        for child in tree.children(element).to_vec() {
            self.teardown_subtree(tree, child, timers);
        }
        tree.clear_children(element);

        if let Some(data) = tree.element_mut(element) {
            data.style.set_property("--shake-force", force.to_string());
        }
        for letter in text.chars() {
            let delay = if self.settings.shake_max_delay > 0.0 {
                self.rng.gen_range(0.0..self.settings.shake_max_delay)
            } else {
                0.0
            };
            let span = tree.create_element("span");
            tree.set_text_content(span, letter.encode_utf8(&mut [0; 4]))?;
            if let Some(data) = tree.element_mut(span) {
                data.style.set_property("display", "inline-block");
                data.style.set_property("animation-delay", format!("{delay}s"));
            }
            tree.append_child(element, span)?;
        }
        Ok(())
    }

    fn apply_fade(&mut self, tree: &mut DomTree, element: NodeId) {
        let speed = dataset_number(tree, element, "speed")
            .filter(|&s| s > 0)
            .unwrap_or(self.settings.default_fade_speed);
        if let Some(data) = tree.element_mut(element) {
            data.style.set_property("animation-duration", format!("{speed}s"));
        }
    }

    fn apply_glitch<T>(&mut self, tree: &mut DomTree, element: NodeId, timers: &mut EventLoop<T>) -> DomResult<()>
    where
        T: From<GlitchTick> + Clone,
    {
        self.glitch_pass(tree, element)?;
        let handle = timers.set_interval(T::from(GlitchTick(element)), self.settings.glitch_period_ms);
        if let Some(previous) = self.states.entry(element).or_default().interval.replace(handle) {
            timers.clear_timer(previous);
        }
        Ok(())
    }

    /// Rebuild a glitch element's text from its original text
    pub fn glitch_pass(&mut self, tree: &mut DomTree, element: NodeId) -> DomResult<bool> {
        let Some(original) = self.states.get(&element).and_then(|s| s.original_text.clone()) else {
            return Ok(false);
        };
        let text = glitch_text(&original, self.settings.glitch_probability, &mut self.rng);
        tree.set_text_content(element, &text)?;
        if let Some(data) = tree.element_mut(element) {
            data.dataset.set("text", text);
        }
        Ok(true)
    }

    /// Handle a fired glitch interval. A tick whose handle is no longer
    /// registered for its element is stale: the timer is cancelled and
    /// nothing is drawn.
    pub fn on_glitch_tick<T>(
        &mut self,
        tree: &mut DomTree,
        tick: GlitchTick,
        timer: TimerId,
        timers: &mut EventLoop<T>,
    ) -> DomResult<bool>
    where
        T: Clone,
    {
        let GlitchTick(element) = tick;
        let registered = self.states.get(&element).and_then(|s| s.interval);
        if registered != Some(timer) {
            tracing::warn!("Cancelling orphaned glitch {} of element {}", timer, element);
            timers.clear_timer(timer);
            return Ok(false);
        }
        self.glitch_pass(tree, element)
    }

    /// Cancel the recurring pass of one element. Its other state is kept, so
    /// it will not be processed again.
    pub fn teardown<T: Clone>(&mut self, element: NodeId, timers: &mut EventLoop<T>) -> bool {
        match self.states.get_mut(&element).and_then(|s| s.interval.take()) {
            Some(handle) => {
                timers.clear_timer(handle);
                tracing::debug!("Cancelled glitch {} of element {}", handle, element);
                true
            }
            None => false,
        }
    }

    /// Cancel the recurring passes of `root` and its descendants and forget
    /// their state. Returns the number of cancelled intervals.
    pub fn teardown_subtree<T: Clone>(&mut self, tree: &DomTree, root: NodeId, timers: &mut EventLoop<T>) -> usize {
        let mut cancelled = 0;
        for id in std::iter::once(root).chain(tree.descendants(root)) {
            if self.teardown(id, timers) {
                cancelled += 1;
            }
            self.states.remove(&id);
        }
        cancelled
    }

    /// Cancel and forget every element no longer connected to the document
    pub fn prune_detached<T: Clone>(&mut self, tree: &DomTree, timers: &mut EventLoop<T>) -> usize {
        let detached: Vec<NodeId> = self
            .states
            .keys()
            .copied()
            .filter(|&id| !tree.is_connected(id))
            .collect();
        let mut cancelled = 0;
        for id in detached {
            if self.teardown(id, timers) {
                cancelled += 1;
            }
            self.states.remove(&id);
        }
        cancelled
    }
}

/// `data-<key>` of an element as an integer
fn dataset_number(tree: &DomTree, element: NodeId, key: &str) -> Option<u64> {
    let raw = tree.element(element)?.dataset.get(key)?;
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(raw.parse().unwrap_or(u64::MAX))
}
