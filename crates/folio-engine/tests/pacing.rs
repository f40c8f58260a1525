//! Typing delays depend only on the character and the node's tag

use folio_dom::DomTree;
use folio_effects::{EffectEngine, EffectSettings};
use folio_engine::{NodeTiming, NullAudio, Pacing, RenderToken, Stage, Step, Task, Typewriter};
use folio_markup::parse;
use folio_runtime::EventLoop;
use proptest::prelude::*;

/// Delays of every step up to completion
fn delays(markup: &str, pacing: &Pacing) -> (Vec<u64>, String) {
    let mut tree = DomTree::new();
    let sink = tree.create_element("div");
    tree.append_child(tree.root(), sink).unwrap();
    let mut effects = EffectEngine::with_seed(EffectSettings::default(), 0);
    let mut timers: EventLoop<Task> = EventLoop::new();
    let mut audio = NullAudio;
    let mut stage = Stage {
        tree: &mut tree,
        effects: &mut effects,
        timers: &mut timers,
        audio: &mut audio,
    };

    let mut writer = Typewriter::start(RenderToken(1), parse(markup), sink, pacing.clone(), &mut stage);
    let mut out = Vec::new();
    loop {
        match writer.step(&mut stage).unwrap() {
            Step::Wait(ms) => out.push(ms),
            Step::Complete => break,
            Step::Idle => panic!("idle before completion"),
        }
    }
    (out, tree.text_content(sink))
}

proptest! {
    #[test]
    fn typed_text_delays(text in "[a-zA-Z .,;:!?]{1,40}") {
        let pacing = Pacing::default();
        let (steps, typed) = delays(&text, &pacing);

        prop_assert_eq!(&typed, &text);
        // one wait per character plus the exhausted-node wait
        let chars: Vec<char> = text.chars().collect();
        prop_assert_eq!(steps.len(), chars.len() + 1);
        for (c, delay) in chars.iter().zip(&steps) {
            prop_assert_eq!(*delay, pacing.delay_after(*c, NodeTiming::Typed));
            prop_assert!([20, 150, 200, 300].contains(delay));
        }
        prop_assert_eq!(steps.last(), steps.get(chars.len() - 1));
    }

    #[test]
    fn slow_text_delays(text in "[a-z .!?]{1,20}", speed in 0u64..500) {
        let pacing = Pacing::default();
        let (steps, typed) = delays(&format!("<slow speed={speed}>{text}</slow>"), &pacing);
        prop_assert_eq!(&typed, &text);
        prop_assert!(steps.iter().all(|&d| d == speed));
    }

    #[test]
    fn delay_is_position_independent(prefix in "[a-z ,.]{0,10}", c in "[a-z,.;:!?]") {
        let pacing = Pacing::default();
        let (alone, _) = delays(&c, &pacing);
        let (steps, _) = delays(&format!("{prefix}{c}"), &pacing);
        prop_assert_eq!(steps[prefix.chars().count()], alone[0]);
    }
}

#[test]
fn test_empty_slow_advances_at_base() {
    let (steps, typed) = delays("<slow></slow>", &Pacing::default());
    assert_eq!(typed, "");
    assert_eq!(steps, vec![20]);
}
