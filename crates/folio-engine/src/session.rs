//! Story session
//!
//! Owns everything one reader's book needs: the loaded story, where the
//! reader is, the page DOM, the event loop driving typing and glitches, and
//! the saved progress. Time only moves when the caller advances it.

use folio_dom::{DomResult, DomTree, NodeId};
use folio_effects::{EffectEngine, GlitchTick};
use folio_markup::{parse, render_static};
use folio_runtime::{EventLoop, Fired, Storage, TimerId};

use crate::audio::{AudioCue, Sound};
use crate::config::Config;
use crate::error::{ConfigError, NavigationError};
use crate::navigation::{NavigationState, ProgressStore};
use crate::story::{IntegrityIssue, Story, StoryOption, StorySource};
use crate::typewriter::{RenderToken, Stage, Step, Typewriter};

/// Shown in the previous-page panel when the story cannot be loaded
pub const ERROR_TEXT: &str = "Error al cargar la historia :(";

/// Shown in the previous-page panel before the first choice
pub const RULES_TEXT: &str = "Rules:\nChoose between the two options and discover where your decisions lead you!\nTip: You can save your progress by clicking the bookmark icon!";

const HEARTBEAT_CLASS: &str = "heartbeat-effect";

/// Event loop payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Resume the typewriter holding this token
    Type(RenderToken),
    /// Recurring glitch pass
    Glitch(GlitchTick),
}

impl From<GlitchTick> for Task {
    fn from(tick: GlitchTick) -> Self {
        Task::Glitch(tick)
    }
}

/// Regions of the book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookLayout {
    pub book: NodeId,
    pub previous_text: NodeId,
    pub previous_choices: NodeId,
    pub current_text: NodeId,
    pub current_choices: NodeId,
}

impl BookLayout {
    fn build(tree: &mut DomTree) -> DomResult<Self> {
        let root = tree.root();
        let book = page_region(tree, root, "book")?;
        let previous = page_region(tree, book, "previous-page")?;
        let current = page_region(tree, book, "current-page")?;
        Ok(Self {
            book,
            previous_text: page_region(tree, previous, "previous-text")?,
            previous_choices: page_region(tree, previous, "previous-choices")?,
            current_text: page_region(tree, current, "current-text")?,
            current_choices: page_region(tree, current, "current-choices")?,
        })
    }
}

fn page_region(tree: &mut DomTree, parent: NodeId, class: &str) -> DomResult<NodeId> {
    let id = tree.create_element("div");
    if let Some(element) = tree.element_mut(id) {
        element.classes.add(class);
    }
    tree.append_child(parent, id)?;
    Ok(id)
}

/// Outcome of a choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// The chosen option lands on an ending
    pub leads_to_ending: bool,
    /// Navigation state after the move
    pub state: NavigationState,
}

/// One reader's book
pub struct Session {
    config: Config,
    story: Option<Story>,
    load_error: Option<String>,
    integrity: Vec<IntegrityIssue>,
    state: NavigationState,
    progress: ProgressStore,
    tree: DomTree,
    layout: BookLayout,
    effects: EffectEngine,
    timers: EventLoop<Task>,
    audio: Box<dyn AudioCue>,
    writer: Option<Typewriter>,
    continuation: Option<TimerId>,
    renders: u64,
    options_ready: bool,
    heartbeat: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("now", &self.timers.now())
            .field("options_ready", &self.options_ready)
            .field("heartbeat", &self.heartbeat)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session with nothing loaded
    pub fn new(config: Config, storage: Storage, audio: Box<dyn AudioCue>) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut tree = DomTree::new();
        let layout = BookLayout::build(&mut tree).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let effects = match config.rng_seed {
            Some(seed) => EffectEngine::with_seed(config.effect_settings(), seed),
            None => EffectEngine::new(config.effect_settings()),
        };
        Ok(Self {
            state: NavigationState::fresh(&config.start_node),
            progress: ProgressStore::new(storage, config.storage_key.clone()),
            config,
            story: None,
            load_error: None,
            integrity: Vec::new(),
            tree,
            layout,
            effects,
            timers: EventLoop::new(),
            audio,
            writer: None,
            continuation: None,
            renders: 0,
            options_ready: false,
            heartbeat: false,
        })
    }

    /// Load the story from `source` and show the saved (or first) page. A
    /// story that cannot be loaded puts the session in error mode.
    pub fn start(&mut self, source: &StorySource) -> Result<(), NavigationError> {
        match Story::load(source) {
            Ok(story) => self.open(story),
            Err(e) => {
                tracing::error!("Failed to load story from {}: {}", source, e);
                self.fail(e.to_string())
            }
        }
    }

    /// Show an already loaded story
    pub fn open(&mut self, story: Story) -> Result<(), NavigationError> {
        let start = self.config.start_node.clone();
        self.integrity = story.integrity_report(&start);
        for issue in &self.integrity {
            tracing::warn!("Story integrity: {}", issue);
        }
        self.state = self.progress.load(&start).reconcile(&story, &start);
        self.story = Some(story);
        self.load_error = None;
        tracing::info!("Opening story at {}", self.state.current_node);

        self.display_previous_page()?;
        self.display_current_page()
    }

    fn fail(&mut self, reason: String) -> Result<(), NavigationError> {
        self.cancel_continuation();
        self.writer = None;
        self.story = None;
        self.load_error = Some(reason);
        self.options_ready = false;
        for region in [
            self.layout.previous_text,
            self.layout.previous_choices,
            self.layout.current_text,
            self.layout.current_choices,
        ] {
            clear_region(&mut self.tree, &mut self.effects, &mut self.timers, region);
        }
        self.tree.set_text_content(self.layout.previous_text, ERROR_TEXT)?;
        Ok(())
    }

    /// Render the previous node statically, with the reader's choice
    /// highlighted, or the rules when there is no previous node
    pub fn display_previous_page(&mut self) -> Result<(), NavigationError> {
        let story = self.story.as_ref().ok_or(NavigationError::StoryUnavailable)?;
        let text_region = self.layout.previous_text;
        let choices_region = self.layout.previous_choices;
        clear_region(&mut self.tree, &mut self.effects, &mut self.timers, text_region);
        clear_region(&mut self.tree, &mut self.effects, &mut self.timers, choices_region);

        let Some(previous) = self.state.previous_node.as_deref().and_then(|id| story.get(id)) else {
            self.tree.set_text_content(text_region, RULES_TEXT)?;
            return Ok(());
        };

        render_static(&previous.text, &mut self.tree, text_region)?;
        self.effects.scan(&mut self.tree, text_region, &mut self.timers)?;

        for (index, option) in previous.options.iter().enumerate() {
            let span = self.tree.create_element("span");
            if let Some(element) = self.tree.element_mut(span) {
                element.classes.add("previous-choice");
                if self.state.previous_choice_index == Some(index) {
                    element.style.set_property("font-weight", "bold");
                } else {
                    element.style.set_property("opacity", "0.5");
                }
            }
            render_static(&option.text, &mut self.tree, span)?;
            self.tree.append_child(choices_region, span)?;
            self.effects.scan(&mut self.tree, span, &mut self.timers)?;
        }
        Ok(())
    }

    /// Start typing the current node. Tears down the page being typed or
    /// shown, including its pending continuation and glitch passes.
    pub fn display_current_page(&mut self) -> Result<(), NavigationError> {
        let story = self.story.as_ref().ok_or(NavigationError::StoryUnavailable)?;
        let Some(text) = story.get(&self.state.current_node).map(|node| node.text.clone()) else {
            tracing::error!("Current node {} is not in the story", self.state.current_node);
            let reason = format!("unknown node {}", self.state.current_node);
            return self.fail(reason);
        };

        self.cancel_continuation();
        self.options_ready = false;
        clear_region(&mut self.tree, &mut self.effects, &mut self.timers, self.layout.current_choices);

        self.renders += 1;
        let token = RenderToken(self.renders);
        let mut stage = Stage {
            tree: &mut self.tree,
            effects: &mut self.effects,
            timers: &mut self.timers,
            audio: self.audio.as_mut(),
        };
        let writer = Typewriter::start(
            token,
            parse(&text),
            self.layout.current_text,
            self.config.pacing.clone(),
            &mut stage,
        );
        self.writer = Some(writer);
        tracing::debug!("Displaying {} with {}", self.state.current_node, token);
        self.step_writer()
    }

    fn cancel_continuation(&mut self) {
        if let Some(handle) = self.continuation.take() {
            self.timers.clear_timer(handle);
            tracing::debug!("Cancelled pending continuation {}", handle);
        }
    }

    fn step_writer(&mut self) -> Result<(), NavigationError> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        let token = writer.token();
        let mut stage = Stage {
            tree: &mut self.tree,
            effects: &mut self.effects,
            timers: &mut self.timers,
            audio: self.audio.as_mut(),
        };
        match writer.step(&mut stage)? {
            Step::Wait(delay) => {
                self.continuation = Some(self.timers.set_timeout(Task::Type(token), delay));
            }
            Step::Complete => {
                self.continuation = None;
                self.generate_option_buttons()?;
            }
            Step::Idle => {}
        }
        Ok(())
    }

    fn generate_option_buttons(&mut self) -> Result<(), NavigationError> {
        let story = self.story.as_ref().ok_or(NavigationError::StoryUnavailable)?;
        let region = self.layout.current_choices;
        clear_region(&mut self.tree, &mut self.effects, &mut self.timers, region);

        let options = story
            .get(&self.state.current_node)
            .map(|node| node.options.as_slice())
            .unwrap_or_default();
        let mut any_ending = false;
        for (index, option) in options.iter().enumerate() {
            let button = self.tree.create_element("button");
            if let Some(element) = self.tree.element_mut(button) {
                element.classes.add("option");
                element.dataset.set("index", index.to_string());
            }
            render_static(&option.text, &mut self.tree, button)?;
            self.tree.append_child(region, button)?;
            self.effects.scan(&mut self.tree, button, &mut self.timers)?;
            any_ending |= story.leads_to_ending(option);
        }
        tracing::debug!("Showing {} options for {}", options.len(), self.state.current_node);
        self.options_ready = true;
        self.set_heartbeat(any_ending);
        Ok(())
    }

    fn set_heartbeat(&mut self, on: bool) {
        if let Some(book) = self.tree.element_mut(self.layout.book) {
            book.classes.remove(HEARTBEAT_CLASS);
            if on {
                book.classes.add(HEARTBEAT_CLASS);
            }
        }
        if on {
            self.audio.rewind(Sound::Heartbeat);
            self.audio.play(Sound::Heartbeat);
        } else {
            self.audio.pause(Sound::Heartbeat);
            self.audio.rewind(Sound::Heartbeat);
        }
        self.heartbeat = on;
    }

    /// Run every task due within the next `ms` milliseconds
    pub fn advance(&mut self, ms: u64) -> Result<(), NavigationError> {
        let until = self.timers.now().saturating_add(ms);
        while let Some(fired) = self.timers.pop_due(until) {
            self.dispatch(fired)?;
        }
        self.timers.advance_to(until);
        Ok(())
    }

    /// Run tasks until the current page is fully typed. Returns the elapsed
    /// virtual time. Stops early when no continuation is pending, since
    /// glitch intervals alone never finish a page.
    pub fn finish_page(&mut self) -> Result<u64, NavigationError> {
        let started = self.timers.now();
        while self.is_typing() {
            if self.continuation.is_none() {
                tracing::warn!("No pending continuation for {}", self.state.current_node);
                break;
            }
            let Some(due) = self.timers.next_due() else {
                break;
            };
            while let Some(fired) = self.timers.pop_due(due) {
                self.dispatch(fired)?;
            }
        }
        Ok(self.timers.now() - started)
    }

    fn dispatch(&mut self, fired: Fired<Task>) -> Result<(), NavigationError> {
        match fired.payload {
            Task::Type(token) => {
                let current = self.writer.as_ref().map(Typewriter::token);
                if current != Some(token) || self.continuation != Some(fired.id) {
                    tracing::debug!("Dropping stale continuation of {}", token);
                    return Ok(());
                }
                self.continuation = None;
                self.step_writer()
            }
            Task::Glitch(tick) => {
                self.effects.on_glitch_tick(&mut self.tree, tick, fired.id, &mut self.timers)?;
                Ok(())
            }
        }
    }

    /// Follow option `index` of the current node
    pub fn select_option(&mut self, index: usize) -> Result<Selection, NavigationError> {
        let story = self.story.as_ref().ok_or(NavigationError::StoryUnavailable)?;
        if !self.options_ready {
            return Err(NavigationError::OptionsNotReady);
        }
        let node = self.state.current_node.clone();
        let option = story
            .get(&node)
            .and_then(|n| n.options.get(index))
            .ok_or_else(|| NavigationError::NoSuchOption { node: node.clone(), index })?;
        if !story.contains(&option.next) {
            return Err(NavigationError::UnknownNode {
                node,
                index,
                target: option.next.clone(),
            });
        }
        let leads_to_ending = story.leads_to_ending(option);
        let next = option.next.clone();

        self.state.advance(index, &next);
        tracing::info!("Chose option {} of {}, now at {}", index, node, next);
        self.display_previous_page()?;
        self.display_current_page()?;
        Ok(Selection {
            leads_to_ending,
            state: self.state.clone(),
        })
    }

    /// Whether option `index` of the current node lands on an ending
    pub fn leads_to_ending(&self, index: usize) -> Result<bool, NavigationError> {
        let story = self.story.as_ref().ok_or(NavigationError::StoryUnavailable)?;
        let option = self.current_options().get(index).ok_or_else(|| NavigationError::NoSuchOption {
            node: self.state.current_node.clone(),
            index,
        })?;
        Ok(story.leads_to_ending(option))
    }

    /// Store the navigation state under the configured key
    pub fn save_progress(&mut self) -> Result<(), NavigationError> {
        if self.story.is_none() {
            return Err(NavigationError::StoryUnavailable);
        }
        self.progress.save(&self.state)?;
        tracing::info!("Progress saved at {}", self.state.current_node);
        Ok(())
    }

    /// Forget saved progress and start the story over
    pub fn restart(&mut self) -> Result<(), NavigationError> {
        if self.story.is_none() {
            return Err(NavigationError::StoryUnavailable);
        }
        self.progress.clear()?;
        self.state = NavigationState::fresh(&self.config.start_node);
        self.set_heartbeat(false);
        tracing::info!("Restarting story");
        self.display_previous_page()?;
        self.display_current_page()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn story(&self) -> Option<&Story> {
        self.story.as_ref()
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn layout(&self) -> BookLayout {
        self.layout
    }

    pub fn effects(&self) -> &EffectEngine {
        &self.effects
    }

    pub fn storage(&self) -> &Storage {
        self.progress.storage()
    }

    /// Current virtual time (ms)
    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    /// When the next task is due
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_due()
    }

    /// Number of scheduled glitch passes
    pub fn active_glitches(&self) -> usize {
        self.timers.intervals()
    }

    /// Reason the story could not be loaded
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.load_error.is_some()
    }

    pub fn integrity_issues(&self) -> &[IntegrityIssue] {
        &self.integrity
    }

    pub fn is_typing(&self) -> bool {
        self.writer.as_ref().is_some_and(|writer| !writer.is_complete())
    }

    /// Options can be chosen once the page has finished typing
    pub fn options_ready(&self) -> bool {
        self.options_ready
    }

    pub fn current_options(&self) -> &[StoryOption] {
        self.story
            .as_ref()
            .and_then(|story| story.get(&self.state.current_node))
            .map(|node| node.options.as_slice())
            .unwrap_or_default()
    }

    pub fn heartbeat_active(&self) -> bool {
        self.heartbeat
    }

    /// Text typed so far on the current page
    pub fn page_text(&self) -> String {
        self.tree.text_content(self.layout.current_text)
    }

    pub fn previous_text(&self) -> String {
        self.tree.text_content(self.layout.previous_text)
    }

    /// Option button texts, once the page is complete
    pub fn option_labels(&self) -> Vec<String> {
        self.tree
            .children(self.layout.current_choices)
            .iter()
            .map(|&button| self.tree.text_content(button))
            .collect()
    }

    /// Previous-page choice texts with whether each was the one taken
    pub fn previous_choices(&self) -> Vec<(String, bool)> {
        self.tree
            .children(self.layout.previous_choices)
            .iter()
            .map(|&span| {
                let chosen = self
                    .tree
                    .element(span)
                    .is_some_and(|e| e.style.get_property("font-weight") == Some("bold"));
                (self.tree.text_content(span), chosen)
            })
            .collect()
    }
}

/// Tear down effects under `region` and empty it, then drop any effect
/// state left on elements that are no longer in the document
fn clear_region(tree: &mut DomTree, effects: &mut EffectEngine, timers: &mut EventLoop<Task>, region: NodeId) {
    for child in tree.children(region).to_vec() {
        effects.teardown_subtree(tree, child, timers);
    }
    tree.clear_children(region);
    let pruned = effects.prune_detached(tree, timers);
    if pruned > 0 {
        tracing::debug!("Pruned {} detached glitch intervals", pruned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{NullAudio, RecordingAudio};

    const STORY: &str = r#"{
        "portada": {
            "text": "Hi.",
            "options": [
                { "text": "Look <glitch>closer</glitch>", "next": "c1" },
                { "text": "Leave", "next": "ending_good" }
            ]
        },
        "c1": {
            "text": "<glitch>ERROR</glitch> found",
            "options": [{ "text": "Back", "next": "portada" }]
        },
        "ending_good": { "text": "Bye!", "isEnding": true }
    }"#;

    fn session() -> Session {
        let config = Config { rng_seed: Some(11), ..Config::default() };
        let mut session = Session::new(config, Storage::session(), Box::new(NullAudio)).unwrap();
        session.open(Story::from_json(STORY).unwrap()).unwrap();
        session
    }

    #[test]
    fn test_first_page() {
        let mut session = session();
        assert_eq!(session.previous_text(), RULES_TEXT);
        assert!(session.is_typing());
        assert_eq!(session.page_text(), "H");

        let elapsed = session.finish_page().unwrap();
        assert_eq!(session.page_text(), "Hi.");
        // H, i, '.' then the exhausted node wait
        assert_eq!(elapsed, 20 + 20 + 300 + 300);
        assert!(session.options_ready());
        assert_eq!(session.option_labels().len(), 2);
    }

    #[test]
    fn test_options_not_ready_while_typing() {
        let mut session = session();
        assert!(matches!(session.select_option(0), Err(NavigationError::OptionsNotReady)));
        assert!(session.option_labels().is_empty());
    }

    #[test]
    fn test_select_and_previous_panel() {
        let mut session = session();
        session.finish_page().unwrap();
        let selection = session.select_option(0).unwrap();
        assert!(!selection.leads_to_ending);
        assert_eq!(selection.state.current_node, "c1");

        assert_eq!(session.previous_text(), "Hi.");
        let choices = session.previous_choices();
        assert_eq!(choices.len(), 2);
        assert!(choices[0].1);
        assert!(!choices[1].1);
    }

    #[test]
    fn test_no_such_option() {
        let mut session = session();
        session.finish_page().unwrap();
        assert!(matches!(
            session.select_option(5),
            Err(NavigationError::NoSuchOption { index: 5, .. })
        ));
    }

    #[test]
    fn test_stale_continuation_ignored() {
        let mut session = session();
        session.advance(20).unwrap();
        assert_eq!(session.page_text(), "Hi");
        session.restart().unwrap();
        assert_eq!(session.page_text(), "H");
        session.finish_page().unwrap();
        assert_eq!(session.page_text(), "Hi.");
    }

    #[test]
    fn test_heartbeat_cue() {
        let audio = RecordingAudio::new();
        let config = Config { rng_seed: Some(1), ..Config::default() };
        let mut session = Session::new(config, Storage::session(), Box::new(audio.clone())).unwrap();
        session.open(Story::from_json(STORY).unwrap()).unwrap();
        session.finish_page().unwrap();

        assert!(session.heartbeat_active());
        assert!(audio.is_playing(Sound::Heartbeat));
        let book = session.tree().element(session.layout().book).unwrap();
        assert!(book.classes.contains(HEARTBEAT_CLASS));

        session.select_option(0).unwrap();
        session.finish_page().unwrap();
        assert!(!session.heartbeat_active());
        assert!(!audio.is_playing(Sound::Heartbeat));
        assert!(!audio.is_playing(Sound::Typing));
    }

    #[test]
    fn test_finish_page_without_continuation() {
        let mut session = session();
        session.finish_page().unwrap();
        session.select_option(0).unwrap();
        assert!(session.is_typing());
        assert!(session.active_glitches() > 0);

        session.cancel_continuation();
        let elapsed = session.finish_page().unwrap();
        assert_eq!(elapsed, 0);
        assert!(session.is_typing());
        assert!(!session.options_ready());
    }

    #[test]
    fn test_clearing_a_region_prunes_detached_glitches() {
        let mut session = session();
        session.finish_page().unwrap();

        let stray = session.tree.create_element("div");
        render_static("<glitch>lost</glitch>", &mut session.tree, stray).unwrap();
        session.effects.scan(&mut session.tree, stray, &mut session.timers).unwrap();
        let lost = session.tree.get_elements_by_class_name(stray, "glitch")[0];
        assert!(session.effects.state(lost).is_some());

        session.select_option(1).unwrap();
        assert!(session.effects.state(lost).is_none());
        assert!(!session.effects.interval_owners().contains(&lost));
    }
}
