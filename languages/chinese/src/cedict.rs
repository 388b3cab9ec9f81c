use hanzi_core::dictionary::{LoadError, RawEntry};

/// Parse CC-CEDICT text into raw entries, one per non-comment line.
///
/// Expected form: `Traditional Simplified [pin1 yin1] /Definition 0/Definition 1/`
pub fn parse(content: &str) -> Result<Vec<RawEntry>, LoadError> {
    let mut entries = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        entries.push(parse_line(index + 1, line)?);
    }

    Ok(entries)
}

pub fn parse_line(line_no: usize, line: &str) -> Result<RawEntry, LoadError> {
    let invalid = |reason: &str| LoadError::InvalidLine {
        line: line_no,
        reason: reason.to_string(),
    };

    let (traditional, rest) = line
        .split_once(' ')
        .ok_or_else(|| invalid("missing simplified form"))?;
    let (simplified, rest) = rest
        .split_once(' ')
        .ok_or_else(|| invalid("missing pinyin"))?;

    let rest = rest
        .strip_prefix('[')
        .ok_or_else(|| invalid("pinyin must start with '['"))?;
    let (pinyin, rest) = rest
        .split_once(']')
        .ok_or_else(|| invalid("unterminated pinyin"))?;

    let english = rest.trim();
    if !english.starts_with('/') {
        return Err(invalid("missing definitions"));
    }

    let definitions: Vec<String> = english
        .split('/')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from)
        .collect();

    Ok(RawEntry::new(simplified, traditional, pinyin.trim(), definitions))
}
