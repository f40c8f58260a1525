//! Typing pace
//!
//! The delay after a character depends only on that character and on the
//! tag of the node being typed.

use folio_markup::{EffectClass, TaggedNode};
use serde::{Deserialize, Serialize};

/// Delays (ms) used by the typewriter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pacing {
    /// Ordinary characters, and the gap after an attached element
    pub base_ms: u64,
    /// After `.`, `!`, `?`
    pub sentence_ms: u64,
    /// After `,`, `;`
    pub clause_ms: u64,
    /// After `:`
    pub colon_ms: u64,
    /// Per character inside `<slow>` without a `speed`
    pub slow_default_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            base_ms: 20,
            sentence_ms: 300,
            clause_ms: 150,
            colon_ms: 200,
            slow_default_ms: 100,
        }
    }
}

/// Pause class of a typed character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    Base,
    Clause,
    Colon,
    Sentence,
}

impl Pause {
    pub fn of(c: char) -> Self {
        match c {
            '.' | '!' | '?' => Self::Sentence,
            ',' | ';' => Self::Clause,
            ':' => Self::Colon,
            _ => Self::Base,
        }
    }

    /// Punctuation pauses silence the typing sound
    pub fn is_punctuation(self) -> bool {
        self != Self::Base
    }
}

/// How the typewriter handles a top-level node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTiming {
    /// Character by character, punctuation-sensitive
    Typed,
    /// Character by character at a fixed delay
    Slow { speed_ms: u64 },
    /// Attached whole, effects applied
    Attached,
}

impl Pacing {
    pub fn pause_ms(&self, pause: Pause) -> u64 {
        match pause {
            Pause::Base => self.base_ms,
            Pause::Clause => self.clause_ms,
            Pause::Colon => self.colon_ms,
            Pause::Sentence => self.sentence_ms,
        }
    }

    /// Delay after typing `c` in a node with the given timing
    pub fn delay_after(&self, c: char, timing: NodeTiming) -> u64 {
        match timing {
            NodeTiming::Slow { speed_ms } => speed_ms,
            NodeTiming::Typed | NodeTiming::Attached => self.pause_ms(Pause::of(c)),
        }
    }

    /// Timing for a top-level node; `slow` defaults are applied here
    pub fn timing_of(&self, node: &TaggedNode) -> NodeTiming {
        match node.effect() {
            None => NodeTiming::Typed,
            Some(EffectClass::Slow) => NodeTiming::Slow {
                speed_ms: node.attribute_number("speed").unwrap_or(self.slow_default_ms),
            },
            Some(_) => NodeTiming::Attached,
        }
    }

    /// Every pace scaled by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |ms: u64| (ms as f64 * factor).round().max(0.0) as u64;
        Self {
            base_ms: scale(self.base_ms),
            sentence_ms: scale(self.sentence_ms),
            clause_ms: scale(self.clause_ms),
            colon_ms: scale(self.colon_ms),
            slow_default_ms: scale(self.slow_default_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_markup::parse;

    #[test]
    fn test_delay_classes() {
        let pacing = Pacing::default();
        let cases = [('a', 20), ('.', 300), ('!', 300), ('?', 300), (',', 150), (';', 150), (':', 200), (' ', 20)];
        for (c, expected) in cases {
            assert_eq!(pacing.delay_after(c, NodeTiming::Typed), expected, "char {c:?}");
        }
    }

    #[test]
    fn test_slow_overrides_punctuation() {
        let pacing = Pacing::default();
        assert_eq!(pacing.delay_after('.', NodeTiming::Slow { speed_ms: 80 }), 80);
    }

    #[test]
    fn test_timing_of_nodes() {
        let pacing = Pacing::default();
        let nodes = parse("a<slow>b</slow><slow speed=250>c</slow><slow speed=0>d</slow><instant>e</instant><glitch>f</glitch>");
        let timings: Vec<_> = nodes.iter().map(|n| pacing.timing_of(n)).collect();
        assert_eq!(
            timings,
            vec![
                NodeTiming::Typed,
                NodeTiming::Slow { speed_ms: 100 },
                NodeTiming::Slow { speed_ms: 250 },
                NodeTiming::Slow { speed_ms: 0 },
                NodeTiming::Attached,
                NodeTiming::Attached,
            ]
        );
    }

    #[test]
    fn test_scaled() {
        let pacing = Pacing::default().scaled(0.5);
        assert_eq!(pacing.base_ms, 10);
        assert_eq!(pacing.sentence_ms, 150);
        assert_eq!(Pacing::default().scaled(0.0).sentence_ms, 0);
    }
}
