//! Hunspell dictionary wrapper.
//!
//! Wraps a [`spellbook::Dictionary`] with a session word list so declared
//! exceptions can be layered on per file and withdrawn afterwards without
//! touching the dictionary itself.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use spellbook::Dictionary;

use crate::error::{Result, WmlError};

/// A loaded dictionary plus the current session exceptions.
///
/// Session words are stored lowercased; [`check`](SpellDict::check) consults
/// them before the dictionary so an exception always wins.
#[derive(Debug)]
pub struct SpellDict {
    dict: Dictionary,
    session: HashSet<String>,
}

impl SpellDict {
    /// Load `en_US.aff`/`en_US.dic` from the first directory that has both.
    ///
    /// `dict_dir` is searched first when given; otherwise the usual system
    /// and development locations are tried.
    pub fn load(dict_dir: Option<&Path>) -> Result<SpellDict> {
        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Some(dir) = dict_dir {
            candidates.push(dir.to_path_buf());
        } else {
            candidates.push(PathBuf::from("dictionaries"));
            candidates.push(PathBuf::from("/usr/share/hunspell"));
            candidates.push(PathBuf::from("/usr/share/myspell/dicts"));
        }
        for base in &candidates {
            let aff_path = base.join("en_US.aff");
            let dic_path = base.join("en_US.dic");
            if aff_path.exists() && dic_path.exists() {
                let aff = fs::read_to_string(&aff_path)?;
                let dic = fs::read_to_string(&dic_path)?;
                return SpellDict::from_contents(&aff, &dic);
            }
        }
        Err(WmlError::Config {
            message: "no en_US hunspell dictionary found".to_string(),
            help: Some("pass --dict-dir pointing at en_US.aff and en_US.dic".to_string()),
        })
    }

    pub fn from_contents(aff: &str, dic: &str) -> Result<SpellDict> {
        let dict = Dictionary::new(aff, dic).map_err(|e| WmlError::Config {
            message: format!("dictionary parse failure: {}", e),
            help: None,
        })?;
        Ok(SpellDict {
            dict,
            session: HashSet::new(),
        })
    }

    /// Whether the word is accepted, by session exception or dictionary.
    pub fn check(&self, word: &str) -> bool {
        if self.session.contains(&word.to_lowercase()) {
            return true;
        }
        self.dict.check(word)
    }

    /// Whether the dictionary proper accepts the word, ignoring the session.
    pub fn dict_check(&self, word: &str) -> bool {
        self.dict.check(word)
    }

    pub fn add_session(&mut self, word: &str) {
        self.session.insert(word.to_lowercase());
    }

    pub fn remove_session(&mut self, word: &str) {
        self.session.remove(&word.to_lowercase());
    }
}
