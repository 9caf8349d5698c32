use std::path::Path;

/// Split a word list into words: one per line, with surrounding whitespace trimmed.
/// Blank lines are kept as empty words so that the output lines up with the input.
pub fn parse_words(text: &str) -> Vec<String> {
    text.lines().map(|line| line.trim().to_string()).collect()
}

/// Read and [parse_words] a word list file
pub fn load_words<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_words(&text))
}
