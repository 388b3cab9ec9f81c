/// Invisible separator some editors scatter through their text
pub const ZERO_WIDTH_NON_JOINER: char = '\u{200c}';

pub trait Preprocessor {
    /// Turn collected page text into dictionary search text
    fn process(&self, text: &str) -> String {
        text.chars().filter(|&c| c != ZERO_WIDTH_NON_JOINER).collect()
    }
}

pub struct DefaultPreprocessor;
impl Preprocessor for DefaultPreprocessor {}

/// Whether a lookup starting at `c` is worth a round trip
pub fn is_lookup_candidate(c: char) -> bool {
    matches!(
        c,
        '\u{3007}'
            | '\u{25cb}'
            | '\u{3400}'..='\u{9fff}'
            | '\u{f900}'..='\u{faff}'
            | '\u{ff21}'..='\u{ff3a}'
            | '\u{ff41}'..='\u{ff5a}'
    )
}
