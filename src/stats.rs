use std::collections::BTreeMap;
use std::fmt;

use unicode_properties::{GeneralCategoryGroup, UnicodeGeneralCategory};

/// A running fold over the lines of the input that ends in a single statistic.
///
/// `finalize` takes the accumulator by value, so a statistic can only ever be produced once.
pub trait Accumulator {
    /// Short name used for thread names and log messages.
    const NAME: &'static str;

    fn consume(&mut self, line: &str);

    fn finalize(self) -> Report;
}

/// The finished value of one statistic. `Display` renders the line printed for it.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    LineCount(usize),
    WordCount(usize),
    AverageLettersPerWord(f64),
    MostCommonLetter(Option<char>),
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::LineCount(count) => write!(f, "The line count is: {}", count),
            Report::WordCount(count) => write!(f, "The word count is: {}", count),
            Report::AverageLettersPerWord(average) => {
                write!(f, "The average number of letters per word is: {:.2}", average)
            }
            Report::MostCommonLetter(Some(letter)) => {
                write!(f, "Most common letter is: {}", letter)
            }
            Report::MostCommonLetter(None) => {
                write!(f, "Could not calculate the most common letter")
            }
        }
    }
}

fn count_words(line: &str) -> usize {
    line.split_whitespace().count()
}

/// Letters are general category L*. Letter numerals (Ⅻ) and combining vowel signs are not.
fn letters(line: &str) -> impl Iterator<Item = char> + '_ {
    line.chars()
        .filter(|c| c.general_category_group() == GeneralCategoryGroup::Letter)
}

#[derive(Debug, Default)]
pub struct LineCount {
    lines: usize,
}

impl Accumulator for LineCount {
    const NAME: &'static str = "line-count";

    fn consume(&mut self, _line: &str) {
        self.lines += 1;
    }

    fn finalize(self) -> Report {
        Report::LineCount(self.lines)
    }
}

#[derive(Debug, Default)]
pub struct WordCount {
    words: usize,
}

impl Accumulator for WordCount {
    const NAME: &'static str = "word-count";

    fn consume(&mut self, line: &str) {
        self.words += count_words(line);
    }

    fn finalize(self) -> Report {
        Report::WordCount(self.words)
    }
}

#[derive(Debug, Default)]
pub struct AverageLettersPerWord {
    letters: usize,
    words: usize,
}

impl Accumulator for AverageLettersPerWord {
    const NAME: &'static str = "average-letters-per-word";

    fn consume(&mut self, line: &str) {
        self.letters += letters(line).count();
        self.words += count_words(line);
    }

    fn finalize(self) -> Report {
        if self.words == 0 {
            return Report::AverageLettersPerWord(0.0);
        }
        Report::AverageLettersPerWord(self.letters as f64 / self.words as f64)
    }
}

/// Ties go to the lowest code point, so the answer never depends on map iteration order.
#[derive(Debug, Default)]
pub struct MostCommonLetter {
    frequency: BTreeMap<char, usize>,
}

impl Accumulator for MostCommonLetter {
    const NAME: &'static str = "most-common-letter";

    fn consume(&mut self, line: &str) {
        for letter in letters(line) {
            // some letters lowercase to several chars ('İ'); count the leading one
            let lower = letter.to_lowercase().next().unwrap_or(letter);
            *self.frequency.entry(lower).or_insert(0) += 1;
        }
    }

    fn finalize(self) -> Report {
        let mut best: Option<(char, usize)> = None;
        for (letter, count) in self.frequency {
            match best {
                Some((_, max)) if count <= max => {}
                _ => best = Some((letter, count)),
            }
        }
        Report::MostCommonLetter(best.map(|(letter, _)| letter))
    }
}
