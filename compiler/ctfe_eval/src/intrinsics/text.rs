//! `trimIndent` and `trimMargin`.
//!
//! Both split on `\n` (dropping a trailing `\r` per line), rewrite each
//! line, drop the first and last lines when blank and join with `\n`.

pub fn is_blank(line: &str) -> bool {
    line.chars().all(char::is_whitespace)
}

fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Leading whitespace in chars; the whole length for blank lines.
fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn reindent(lines: &[&str], cut: impl Fn(&str) -> Option<String>) -> String {
    let last = lines.len().saturating_sub(1);
    let kept: Vec<String> = lines
        .iter()
        .enumerate()
        .filter(|&(index, line)| !((index == 0 || index == last) && is_blank(line)))
        .map(|(_, line)| cut(line).unwrap_or_else(|| (*line).to_owned()))
        .collect();
    kept.join("\n")
}

/// Removes the common minimal indent of the non-blank lines.
pub fn trim_indent(text: &str) -> String {
    let lines = split_lines(text);
    let min_indent = lines
        .iter()
        .filter(|line| !is_blank(line))
        .map(|line| indent_width(line))
        .min()
        .unwrap_or(0);
    reindent(&lines, |line| Some(line.chars().skip(min_indent).collect()))
}

/// Strips leading whitespace followed by `prefix` from every line that
/// has it; other lines are kept as they are. `prefix` must not be blank.
pub fn trim_margin(text: &str, prefix: &str) -> String {
    let lines = split_lines(text);
    reindent(&lines, |line| {
        let (start, _) = line.char_indices().find(|(_, c)| !c.is_whitespace())?;
        line[start..]
            .strip_prefix(prefix)
            .map(str::to_owned)
    })
}
