use rand::seq::SliceRandom;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Immutable list of candidate secret words, loaded once at startup and shared by every
/// room.
#[derive(Debug)]
pub struct WordBank {
    words: Vec<String>,
}

#[derive(Deserialize)]
struct WordsFile {
    words: Vec<String>,
}

impl WordBank {
    pub fn load(file_path: &str) -> Self {
        match WordBank::read_words_from_file(file_path) {
            Ok(words) if !words.is_empty() => {
                log::info!(
                    "Words loaded. File: '{}', Words: '{}'.",
                    file_path,
                    words.len()
                );
                WordBank { words }
            }
            Ok(_) => {
                log::error!("The words file has no words, using the built-in list of words. File: '{file_path}'.");
                WordBank::default()
            }
            Err(error) => {
                log::error!("Could not load the words file, using the built-in list of words. File: '{file_path}', Error: '{error}'.");
                WordBank::default()
            }
        }
    }

    /// Falls back to the built-in list when `words` is empty, so the bank is never empty.
    pub fn from_words(words: Vec<String>) -> Self {
        let words: Vec<String> = WordBank::clean(words);
        if words.is_empty() {
            WordBank::default()
        } else {
            WordBank { words }
        }
    }

    pub fn pick_random(&self) -> String {
        self.words
            .choose(&mut rand::thread_rng())
            .cloned()
            // Unreachable: every constructor guarantees at least one word
            .unwrap_or_else(|| WordBank::default_words()[0].clone())
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    fn read_words_from_file(file_path: &str) -> Result<Vec<String>, String> {
        let content = fs::read_to_string(Path::new(file_path)).map_err(|error| error.to_string())?;
        let file: WordsFile = serde_json::from_str(&content).map_err(|error| error.to_string())?;
        Ok(WordBank::clean(file.words))
    }

    fn clean(words: Vec<String>) -> Vec<String> {
        words
            .into_iter()
            .map(|word| word.trim().to_string())
            .filter(|word| !word.is_empty())
            .collect()
    }

    fn default_words() -> Vec<String> {
        ["Pizza", "Hamburguesa", "Empanada", "Sushi", "Taco", "Arepa"]
            .iter()
            .map(|word| word.to_string())
            .collect()
    }
}

impl Default for WordBank {
    fn default() -> Self {
        WordBank {
            words: WordBank::default_words(),
        }
    }
}
