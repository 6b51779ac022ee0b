//! Short, unique FROM-clause aliases.
//!
//! Aliases are spreadsheet-column style: the counter is written in
//! bijective base-N over a fixed alphabet, so with the default 24 letters
//! the first call yields `A`, the 24th `Z` and the 25th `AA`.

use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::Lazy;

use crate::error::{Result, SqlqubeError};
use crate::views::ViewRef;

/// Default alphabet. `J` and `W` are left out.
pub const DEFAULT_LETTERS: &str = "ABCDEFGHIKLMNOPQRSTUVXYZ";

static GLOBAL: Lazy<AliasAllocator> = Lazy::new(AliasAllocator::new);

#[derive(Debug)]
pub struct AliasAllocator {
    letters: Vec<char>,
    counter: AtomicUsize,
}

impl Default for AliasAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl AliasAllocator {
    pub fn new() -> Self {
        Self {
            letters: DEFAULT_LETTERS.chars().collect(),
            counter: AtomicUsize::new(1),
        }
    }

    /// Build an allocator over a custom alphabet.
    pub fn with_letters(letters: &str) -> Result<Self> {
        let letters: Vec<char> = letters.chars().collect();
        if letters.is_empty() {
            return Err(SqlqubeError::Config(
                "alias alphabet must not be empty".to_string(),
            ));
        }
        for (idx, letter) in letters.iter().enumerate() {
            if letters[..idx].contains(letter) {
                return Err(SqlqubeError::Config(format!(
                    "alias alphabet repeats letter {letter}"
                )));
            }
        }
        Ok(Self {
            letters,
            counter: AtomicUsize::new(1),
        })
    }

    /// The process-wide allocator shared by every builder that was not
    /// given its own.
    pub fn global() -> &'static AliasAllocator {
        &GLOBAL
    }

    pub fn letters(&self) -> &[char] {
        &self.letters
    }

    /// Hand out the next alias. Never returns the same string twice for
    /// the lifetime of this allocator.
    pub fn next(&self) -> String {
        let value = self.counter.fetch_add(1, Ordering::Relaxed);
        encode(value, &self.letters)
    }
}

/// A view occurrence in one query's FROM clause.
#[derive(Debug, Clone)]
pub struct ViewAlias {
    view: ViewRef,
    alias: String,
}

impl ViewAlias {
    pub fn new(view: ViewRef, alias: impl Into<String>) -> Self {
        Self {
            view,
            alias: alias.into(),
        }
    }

    pub fn view(&self) -> &ViewRef {
        &self.view
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }
}

fn encode(mut value: usize, letters: &[char]) -> String {
    let base = letters.len();
    let mut digits = Vec::new();
    while value > 0 {
        value -= 1;
        digits.push(letters[value % base]);
        value /= base;
    }
    digits.iter().rev().collect()
}
