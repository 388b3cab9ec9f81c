use unicode_normalization::UnicodeNormalization;

/// Combining marks for tones 1-4
const TONE_MARKS: [char; 4] = ['\u{0304}', '\u{0301}', '\u{030c}', '\u{0300}'];

/// Convert numbered pinyin (`ni3 hao3`, `lu:4`) into tone-marked pinyin (`nǐ hǎo`, `lǜ`).
///
/// Syllables without a trailing tone digit pass through unchanged; tone 5 just
/// drops the digit.
pub fn numbered_to_marks(pinyin: &str) -> String {
    pinyin
        .split(' ')
        .map(convert_syllable)
        .collect::<Vec<_>>()
        .join(" ")
}

fn convert_syllable(syllable: &str) -> String {
    let Some(last) = syllable.chars().last() else {
        return String::new();
    };
    let Some(tone) = last.to_digit(10).filter(|t| (1..=5).contains(t)) else {
        return syllable.to_string();
    };

    let body = syllable[..syllable.len() - 1]
        .replace("u:", "ü")
        .replace("U:", "Ü")
        .replace('v', "ü")
        .replace('V', "Ü");

    if tone == 5 {
        return body;
    }

    let chars: Vec<char> = body.chars().collect();
    let Some(position) = mark_position(&chars) else {
        return body;
    };

    let mut out: String = chars[..=position].iter().collect();
    out.push(TONE_MARKS[tone as usize - 1]);
    out.extend(&chars[position + 1..]);
    out.nfc().collect()
}

/// Index of the vowel carrying the tone mark: `a`/`e` win, then the `o` of
/// `ou`, otherwise the last vowel.
fn mark_position(chars: &[char]) -> Option<usize> {
    let lower: Vec<char> = chars
        .iter()
        .map(|c| c.to_lowercase().next().unwrap_or(*c))
        .collect();
    let is_vowel = |c: &char| matches!(*c, 'a' | 'e' | 'i' | 'o' | 'u' | 'ü');

    if let Some(i) = lower.iter().position(|c| matches!(*c, 'a' | 'e')) {
        return Some(i);
    }
    if let Some(i) = lower.windows(2).position(|w| *w == ['o', 'u']) {
        return Some(i);
    }
    lower.iter().rposition(is_vowel)
}
