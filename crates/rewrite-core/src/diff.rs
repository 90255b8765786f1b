//! Unified diff generation.
//!
//! Used when an opt-in print-idempotence check fails: the reprinted source is
//! diffed against the original so the resulting `ParseError` explains what
//! changed.

use difference::{Changeset, Difference};

/// Lines of unchanged context kept around each change.
const CONTEXT_LINES: usize = 3;

/// Generates a unified diff between `before` and `after` for `path`.
/// Returns an empty string when the texts are identical.
pub fn unified_diff(path: &str, before: &str, after: &str) -> String {
    if before == after {
        return String::new();
    }

    let changeset = Changeset::new(before, after, "\n");
    let mut lines: Vec<(char, &str)> = Vec::new();
    for diff in &changeset.diffs {
        let (tag, text) = match diff {
            Difference::Same(text) => (' ', text.as_str()),
            Difference::Rem(text) => ('-', text.as_str()),
            Difference::Add(text) => ('+', text.as_str()),
        };
        for line in text.split('\n') {
            lines.push((tag, line));
        }
    }

    let mut diff = String::new();
    diff.push_str(&format!("--- a/{}\n", path));
    diff.push_str(&format!("+++ b/{}\n", path));

    let changed: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, (tag, _))| *tag != ' ')
        .map(|(i, _)| i)
        .collect();

    // Group changed lines into hunks separated by more than twice the context.
    let mut hunks: Vec<(usize, usize)> = Vec::new();
    for &index in &changed {
        let start = index.saturating_sub(CONTEXT_LINES);
        let end = (index + CONTEXT_LINES + 1).min(lines.len());
        match hunks.last_mut() {
            Some(last) if start <= last.1 => last.1 = end,
            _ => hunks.push((start, end)),
        }
    }

    for (start, end) in hunks {
        let old_start = lines[..start].iter().filter(|(t, _)| *t != '+').count() + 1;
        let new_start = lines[..start].iter().filter(|(t, _)| *t != '-').count() + 1;
        let old_len = lines[start..end].iter().filter(|(t, _)| *t != '+').count();
        let new_len = lines[start..end].iter().filter(|(t, _)| *t != '-').count();
        diff.push_str(&format!(
            "@@ -{},{} +{},{} @@\n",
            old_start, old_len, new_start, new_len
        ));
        for (tag, line) in &lines[start..end] {
            diff.push(*tag);
            diff.push_str(line);
            diff.push('\n');
        }
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_texts_produce_no_diff() {
        assert!(unified_diff("a.py", "x = 1\n", "x = 1\n").is_empty());
    }

    #[test]
    fn single_line_change() {
        let diff = unified_diff("a.py", "x = 1\ny = 2\n", "x = 1\ny = 3\n");
        assert!(diff.contains("--- a/a.py"));
        assert!(diff.contains("+++ b/a.py"));
        assert!(diff.contains("-y = 2"));
        assert!(diff.contains("+y = 3"));
        assert!(diff.contains(" x = 1"));
    }

    #[test]
    fn distant_changes_form_separate_hunks() {
        let before: String = (0..20).map(|i| format!("line{i}\n")).collect();
        let after = before.replace("line1\n", "LINE1\n").replace("line18\n", "LINE18\n");
        let diff = unified_diff("big.py", &before, &after);
        assert_eq!(diff.matches("@@ -").count(), 2);
    }
}
