//! Real-time playback
//!
//! Drives a session's virtual clock against the wall clock, printing
//! characters as they are typed, then reads the reader's choice.

use std::io::{BufRead, Write};
use std::thread;
use std::time::Duration;

use folio_engine::{Session, ERROR_TEXT};

/// Prompt command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Choose(usize),
    Save,
    Restart,
    Quit,
}

impl Command {
    /// Options are numbered from 1 on screen
    fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "s" | "save" => Some(Self::Save),
            "r" | "restart" => Some(Self::Restart),
            "q" | "quit" => Some(Self::Quit),
            other => other
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .map(Self::Choose),
        }
    }
}

pub struct Player {
    session: Session,
    speed: f64,
    /// Characters of the current page already printed
    printed: usize,
}

impl Player {
    pub fn new(session: Session, speed: f64) -> Self {
        Self {
            session,
            speed: speed.max(0.0),
            printed: 0,
        }
    }

    pub fn run(&mut self, mut input: impl BufRead, mut out: impl Write) -> anyhow::Result<()> {
        if self.session.is_error() {
            writeln!(out, "{ERROR_TEXT}")?;
            return Ok(());
        }

        loop {
            self.play_page(&mut out)?;
            self.show_options(&mut out)?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Ok(());
            }
            match Command::parse(&line) {
                Some(Command::Choose(index)) => match self.session.select_option(index) {
                    Ok(selection) => {
                        tracing::debug!("Moved to {}", selection.state.current_node);
                        self.new_page(&mut out)?;
                    }
                    Err(e) => writeln!(out, "{e}")?,
                },
                Some(Command::Save) => match self.session.save_progress() {
                    Ok(()) => writeln!(out, "Progress saved.")?,
                    Err(e) => writeln!(out, "Could not save: {e}")?,
                },
                Some(Command::Restart) => {
                    self.session.restart()?;
                    self.new_page(&mut out)?;
                }
                Some(Command::Quit) => return Ok(()),
                None => writeln!(out, "Type an option number, s, r or q.")?,
            }
        }
    }

    fn new_page(&mut self, out: &mut impl Write) -> anyhow::Result<()> {
        self.printed = 0;
        writeln!(out, "\n----------------------------------------")?;
        Ok(())
    }

    /// Type the current page out, waiting between steps
    fn play_page(&mut self, out: &mut impl Write) -> anyhow::Result<()> {
        self.flush_text(out)?;
        while self.session.is_typing() {
            let Some(deadline) = self.session.next_deadline() else {
                break;
            };
            let wait = deadline.saturating_sub(self.session.now());
            if self.speed > 0.0 && wait > 0 {
                thread::sleep(Duration::from_secs_f64(wait as f64 * self.speed / 1000.0));
            }
            self.session.advance(wait)?;
            self.flush_text(out)?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn flush_text(&mut self, out: &mut impl Write) -> anyhow::Result<()> {
        let text = self.session.page_text();
        let fresh: String = text.chars().skip(self.printed).collect();
        if !fresh.is_empty() {
            self.printed += fresh.chars().count();
            write!(out, "{fresh}")?;
            out.flush()?;
        }
        Ok(())
    }

    fn show_options(&mut self, out: &mut impl Write) -> anyhow::Result<()> {
        let labels = self.session.option_labels();
        if labels.is_empty() {
            writeln!(out, "\n(The end. r to start over, q to quit)")?;
        } else {
            for (i, label) in labels.iter().enumerate() {
                writeln!(out, "  [{}] {}", i + 1, label)?;
            }
        }
        write!(out, "> ")?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_engine::{Config, NullAudio, Story};
    use folio_runtime::Storage;
    use std::io::Cursor;

    const STORY: &str = r#"{
        "portada": {
            "text": "Once, <slow speed=5>slowly</slow>.",
            "options": [{ "text": "Go", "next": "end" }]
        },
        "end": { "text": "<instant>Fin.</instant>", "isEnding": true }
    }"#;

    fn player(storage: Storage) -> Player {
        let config = Config { rng_seed: Some(1), ..Config::default() };
        let mut session = Session::new(config, storage, Box::new(NullAudio)).unwrap();
        session.open(Story::from_json(STORY).unwrap()).unwrap();
        Player::new(session, 0.0)
    }

    fn run(player: &mut Player, input: &str) -> String {
        let mut out = Vec::new();
        player.run(Cursor::new(input.to_string()), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("1\n"), Some(Command::Choose(0)));
        assert_eq!(Command::parse(" s "), Some(Command::Save));
        assert_eq!(Command::parse("q"), Some(Command::Quit));
        assert_eq!(Command::parse("0"), None);
        assert_eq!(Command::parse("what"), None);
    }

    #[test]
    fn test_reads_to_the_end() {
        let mut player = player(Storage::session());
        let out = run(&mut player, "1\nq\n");
        assert!(out.contains("Once, slowly."));
        assert!(out.contains("[1] Go"));
        assert!(out.contains("Fin."));
        assert!(out.contains("The end."));
        assert_eq!(player.session.state().current_node, "end");
    }

    #[test]
    fn test_bad_choice_is_reported() {
        let mut player = player(Storage::session());
        let out = run(&mut player, "7\nq\n");
        assert!(out.contains("has no option 6"));
        assert_eq!(player.session.state().current_node, "portada");
    }

    #[test]
    fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.tsv");
        let mut player = player(Storage::local(&path).unwrap());
        let out = run(&mut player, "1\ns\n");
        assert!(out.contains("Progress saved."));

        let reopened = Storage::local(&path).unwrap();
        assert!(reopened.get_item("storyState").unwrap().contains(r#""currentNode":"end""#));
    }
}
