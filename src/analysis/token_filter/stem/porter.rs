//! Porter stemming algorithm implementation.
//!
//! Implements the original five-step algorithm by Martin Porter (1980) over
//! an ASCII byte buffer. Words containing non-ASCII characters, and words of
//! two characters or fewer, are returned lowercased but otherwise unchanged.

use super::Stemmer;

const STEP2_SUFFIXES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("bli", "ble"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
    ("logi", "log"),
];

const STEP3_SUFFIXES: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

const STEP4_SUFFIXES: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou",
    "ism", "ate", "iti", "ous", "ive", "ize",
];

/// Porter stemmer for English.
#[derive(Clone, Debug, Default)]
pub struct PorterStemmer;

impl PorterStemmer {
    /// Create a new Porter stemmer.
    pub fn new() -> Self {
        PorterStemmer
    }
}

impl Stemmer for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        let word = word.to_lowercase();
        if word.len() <= 2 || !word.is_ascii() {
            return word;
        }

        let mut buffer = StemBuffer::new(word.into_bytes());
        buffer.step1ab();
        buffer.step1c();
        buffer.step2();
        buffer.step3();
        buffer.step4();
        buffer.step5();
        buffer.into_string()
    }

    fn name(&self) -> &'static str {
        "porter"
    }
}

/// Working state of one word. `stem_end` is the exclusive end of the stem
/// left over by the last successful suffix match.
struct StemBuffer {
    bytes: Vec<u8>,
    stem_end: usize,
}

impl StemBuffer {
    fn new(bytes: Vec<u8>) -> Self {
        let stem_end = bytes.len();
        StemBuffer { bytes, stem_end }
    }

    fn into_string(self) -> String {
        // Only ASCII bytes are ever written.
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn is_consonant(&self, i: usize) -> bool {
        match self.bytes[i] {
            b'a' | b'e' | b'i' | b'o' | b'u' => false,
            b'y' => i == 0 || !self.is_consonant(i - 1),
            _ => true,
        }
    }

    /// Number of vowel-consonant sequences in the stem.
    fn measure(&self) -> usize {
        let mut count = 0;
        let mut prev_vowel = false;
        for i in 0..self.stem_end {
            let consonant = self.is_consonant(i);
            if consonant && prev_vowel {
                count += 1;
            }
            prev_vowel = !consonant;
        }
        count
    }

    fn vowel_in_stem(&self) -> bool {
        (0..self.stem_end).any(|i| !self.is_consonant(i))
    }

    fn double_consonant(&self, i: usize) -> bool {
        i >= 1 && self.bytes[i] == self.bytes[i - 1] && self.is_consonant(i)
    }

    /// consonant-vowel-consonant ending at `i`, where the last is not w, x or y.
    fn cvc(&self, i: usize) -> bool {
        i >= 2
            && self.is_consonant(i)
            && !self.is_consonant(i - 1)
            && self.is_consonant(i - 2)
            && !matches!(self.bytes[i], b'w' | b'x' | b'y')
    }

    fn ends(&mut self, suffix: &str) -> bool {
        if self.bytes.ends_with(suffix.as_bytes()) {
            self.stem_end = self.len() - suffix.len();
            true
        } else {
            false
        }
    }

    fn set_to(&mut self, replacement: &str) {
        self.bytes.truncate(self.stem_end);
        self.bytes.extend_from_slice(replacement.as_bytes());
    }

    fn replace_if_measured(&mut self, replacement: &str) {
        if self.measure() > 0 {
            self.set_to(replacement);
        }
    }

    fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len);
    }

    /// Plurals and -ed or -ing endings.
    fn step1ab(&mut self) {
        if self.bytes.last() == Some(&b's') {
            if self.ends("sses") {
                self.truncate(self.len() - 2);
            } else if self.ends("ies") {
                self.set_to("i");
            } else if self.bytes[self.len() - 2] != b's' {
                self.truncate(self.len() - 1);
            }
        }

        if self.ends("eed") {
            if self.measure() > 0 {
                self.truncate(self.len() - 1);
            }
        } else if (self.ends("ed") || self.ends("ing")) && self.vowel_in_stem() {
            self.truncate(self.stem_end);
            if self.ends("at") {
                self.set_to("ate");
            } else if self.ends("bl") {
                self.set_to("ble");
            } else if self.ends("iz") {
                self.set_to("ize");
            } else if self.double_consonant(self.len() - 1) {
                if !matches!(self.bytes[self.len() - 1], b'l' | b's' | b'z') {
                    self.truncate(self.len() - 1);
                }
            } else if self.measure() == 1 && self.cvc(self.len() - 1) {
                self.stem_end = self.len();
                self.set_to("e");
            }
        }
    }

    /// Terminal y to i when there is another vowel in the stem.
    fn step1c(&mut self) {
        if self.ends("y") && self.vowel_in_stem() {
            let last = self.len() - 1;
            self.bytes[last] = b'i';
        }
    }

    fn step2(&mut self) {
        for (suffix, replacement) in STEP2_SUFFIXES {
            if self.ends(suffix) {
                self.replace_if_measured(replacement);
                return;
            }
        }
    }

    fn step3(&mut self) {
        for (suffix, replacement) in STEP3_SUFFIXES {
            if self.ends(suffix) {
                self.replace_if_measured(replacement);
                return;
            }
        }
    }

    fn step4(&mut self) {
        for suffix in STEP4_SUFFIXES {
            if !self.ends(suffix) {
                continue;
            }
            if *suffix == "ion"
                && !(self.stem_end >= 1 && matches!(self.bytes[self.stem_end - 1], b's' | b't'))
            {
                continue;
            }
            if self.measure() > 1 {
                self.truncate(self.stem_end);
            }
            return;
        }
    }

    /// Final -e and double l.
    fn step5(&mut self) {
        self.stem_end = self.len();
        if self.bytes.last() == Some(&b'e') {
            let m = self.measure();
            let cvc = self.len() >= 2 && self.cvc(self.len() - 2);
            if m > 1 || (m == 1 && !cvc) {
                self.truncate(self.len() - 1);
            }
        }
        if self.bytes.last() == Some(&b'l')
            && self.double_consonant(self.len() - 1)
            && self.measure() > 1
        {
            self.truncate(self.len() - 1);
        }
    }
}
