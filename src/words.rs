use std::collections::HashSet;
use std::fs;
use std::path::Path;

use smallvec::SmallVec;
use thiserror::Error;

use crate::{WordId, MAX_SLOT_LENGTH};

/// A word that can be chosen for a slot. `chars` is kept alongside the
/// original text for O(1) access to the letter at a crossing position.
#[derive(Debug, Clone)]
pub struct Word {
    pub text: String,
    pub chars: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum WordlistError {
    #[error("failed to read word list: {0}")]
    Io(#[from] std::io::Error),
}

/// The vocabulary shared by every slot's initial domain.
#[derive(Debug, Clone)]
pub struct Wordlist {
    words: Vec<Word>,
}

impl Wordlist {
    /// Load a word list from text, one word per line. Words are trimmed and
    /// uppercased; blank lines and repeats are dropped (set semantics, with
    /// first-seen order preserved).
    pub fn load(text: &str) -> Wordlist {
        let mut seen: HashSet<String> = HashSet::new();
        let mut words = Vec::new();

        for line in text.lines() {
            let word = line.trim().to_uppercase();
            if word.is_empty() || !seen.insert(word.clone()) {
                continue;
            }
            words.push(Word {
                chars: word.chars().collect(),
                text: word,
            });
        }

        Wordlist { words }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Wordlist, WordlistError> {
        let text = fs::read_to_string(path)?;
        Ok(Wordlist::load(&text))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word(&self, id: WordId) -> &Word {
        &self.words[id]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Word> {
        self.words.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::Wordlist;

    #[test]
    fn load_uppercases_and_dedups() {
        let words = Wordlist::load("abc\n\n  def \nABC\nghi");

        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["ABC", "DEF", "GHI"]);
    }

    #[test]
    fn word_length_counts_chars() {
        let words = Wordlist::load("abcde");
        assert_eq!(words.word(0).len(), 5);
        assert_eq!(words.word(0).chars[3], 'D');
    }

    #[test]
    fn empty_input_gives_empty_list() {
        assert!(Wordlist::load("").is_empty());
    }
}
