//! Speller: routes printable characters into the raw input buffer,
//! enforcing the alphabet/delimiter rules a schema declares and deciding
//! when an accumulating input auto-commits or auto-selects.
//!
//! Grounded in the teacher's `PhoneticEditor::handle_char`
//! (`editor.rs`) for the accept-or-reject-a-char shape, generalized to a
//! schema-driven alphabet instead of a hardcoded pinyin charset, plus the
//! auto-select/auto-commit behavior the teacher's editor never had to do
//! because the python rime the pack descends from always punted selection
//! to the user.

use regex::Regex;

#[derive(Debug, Clone)]
pub struct SpellerConfig {
    pub alphabet: Vec<char>,
    pub initials: Vec<char>,
    pub finals: Vec<char>,
    pub delimiters: Vec<char>,
    pub max_code_length: usize,
    pub auto_select: bool,
    pub auto_select_pattern: Option<Regex>,
}

impl SpellerConfig {
    pub fn new(alphabet: Vec<char>, delimiters: Vec<char>, max_code_length: usize) -> Self {
        Self {
            alphabet,
            initials: Vec::new(),
            finals: Vec::new(),
            delimiters,
            max_code_length,
            auto_select: false,
            auto_select_pattern: None,
        }
    }

    pub fn with_auto_select(mut self, auto_select: bool) -> Self {
        self.auto_select = auto_select;
        self
    }

    pub fn with_auto_select_pattern(mut self, pattern: Regex) -> Self {
        self.auto_select_pattern = Some(pattern);
        self
    }
}

pub struct Speller {
    config: SpellerConfig,
}

impl Speller {
    pub fn new(config: SpellerConfig) -> Self {
        Self { config }
    }

    /// Whether `ch` belongs in the raw input: part of the declared
    /// alphabet, or a delimiter separating syllables.
    pub fn accepts(&self, ch: char) -> bool {
        self.config.alphabet.contains(&ch) || self.config.delimiters.contains(&ch)
    }

    pub fn is_delimiter(&self, ch: char) -> bool {
        self.config.delimiters.contains(&ch)
    }

    /// Whether appending one more syllable-length character to `input`
    /// would exceed `max_code_length` and should instead force a commit
    /// of whatever is already composed.
    pub fn should_auto_commit(&self, input: &str) -> bool {
        self.config.max_code_length > 0 && input.chars().count() >= self.config.max_code_length
    }

    /// Auto-select the sole candidate when exactly one remains and either
    /// `auto_select` is on or the input matches `auto_select_pattern`.
    pub fn should_auto_select_unique(&self, input: &str, candidate_count: usize) -> bool {
        if candidate_count != 1 {
            return false;
        }
        if self.config.auto_select {
            return true;
        }
        match &self.config.auto_select_pattern {
            Some(pattern) => pattern.is_match(input),
            None => false,
        }
    }

    /// When the full `input` fails to match anything, look for the
    /// longest strict prefix that matched on some earlier keystroke and
    /// report the unmatched tail, so the engine can commit the matched
    /// head and reopen composition at that earlier boundary.
    ///
    /// `is_resolvable` is asked with shrinking prefixes of `input`; the
    /// first one it accepts wins.
    pub fn auto_select_previous_match<'a>(
        &self,
        input: &'a str,
        is_resolvable: impl Fn(&str) -> bool,
    ) -> Option<(&'a str, &'a str)> {
        let chars: Vec<(usize, char)> = input.char_indices().collect();
        for split in (1..chars.len()).rev() {
            let byte_pos = chars[split].0;
            let (head, tail) = input.split_at(byte_pos);
            if is_resolvable(head) {
                return Some((head, tail));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pinyin_speller() -> Speller {
        Speller::new(SpellerConfig::new(
            "abcdefghijklmnopqrstuvwxyz".chars().collect(),
            vec!['\''],
            6,
        ))
    }

    #[test]
    fn accepts_alphabet_and_delimiter_only() {
        let speller = pinyin_speller();
        assert!(speller.accepts('n'));
        assert!(speller.accepts('\''));
        assert!(!speller.accepts('1'));
    }

    #[test]
    fn auto_commit_triggers_at_max_length() {
        let speller = pinyin_speller();
        assert!(!speller.should_auto_commit("nihao"));
        assert!(speller.should_auto_commit("nihaoa"));
    }

    #[test]
    fn auto_select_unique_respects_flag() {
        let mut config = SpellerConfig::new(vec!['a'], vec![], 0);
        config.auto_select = true;
        let speller = Speller::new(config);
        assert!(speller.should_auto_select_unique("a", 1));
        assert!(!speller.should_auto_select_unique("a", 2));
    }

    #[test]
    fn auto_select_previous_match_finds_longest_resolvable_prefix() {
        let speller = pinyin_speller();
        let resolvable = |s: &str| s == "ni" || s == "nihao";
        let result = speller.auto_select_previous_match("nihaox", resolvable);
        assert_eq!(result, Some(("nihao", "x")));
    }
}
