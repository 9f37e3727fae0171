//! Splitting scripts into batches on `GO` separator lines.

/// One batch of a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch<'a> {
    /// The batch text, without the separator line.
    pub text: &'a str,
    /// Byte offset of the batch in the script.
    pub offset: usize,
    /// One-based line number of the first line of the batch.
    pub line: usize,
}

impl Batch<'_> {
    /// Returns true if the batch holds only whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Splits `script` on lines holding only `GO` (any case, surrounding
/// whitespace allowed). Blank batches are dropped.
///
/// `GO` is a client-side separator, not T-SQL, so a `GO` inside a comment or
/// string that spans lines still splits the script.
///
/// ```
/// use oxide_tsql_core::split_batches;
///
/// let batches = split_batches("create table t (a int)\ngo\nselect 1\n");
/// assert_eq!(batches.len(), 2);
/// assert_eq!(batches[1].text, "select 1\n");
/// assert_eq!(batches[1].line, 3);
/// ```
#[must_use]
pub fn split_batches(script: &str) -> Vec<Batch<'_>> {
    let mut batches = Vec::new();
    let mut start = 0;
    let mut start_line = 1;
    let mut offset = 0;

    for (index, line) in script.split_inclusive('\n').enumerate() {
        if line.trim().eq_ignore_ascii_case("go") {
            push_batch(&mut batches, script, start, offset, start_line);
            start = offset + line.len();
            start_line = index + 2;
        }
        offset += line.len();
    }
    push_batch(&mut batches, script, start, script.len(), start_line);

    batches
}

fn push_batch<'a>(
    batches: &mut Vec<Batch<'a>>,
    script: &'a str,
    start: usize,
    end: usize,
    line: usize,
) {
    let batch = Batch {
        text: &script[start..end],
        offset: start,
        line,
    };
    if !batch.is_blank() {
        batches.push(batch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_batches() {
        let sql = "CREATE TABLE t1 (id INT)\nGO\nCREATE TABLE t2 (id INT)";
        let batches = split_batches(sql);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].text, "CREATE TABLE t1 (id INT)\n");
        assert_eq!(batches[1].text, "CREATE TABLE t2 (id INT)");
        assert_eq!(batches[1].offset, 28);
    }

    #[test]
    fn test_split_batches_no_go() {
        let sql = "CREATE TABLE t1 (id INT)";
        let batches = split_batches(sql);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].line, 1);
    }

    #[test]
    fn test_separator_variants() {
        let sql = "select 1\r\n  go  \r\nselect 2\nGo\n\ngo\nselect 3\ngoto x\n";
        let batches = split_batches(sql);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[1].text, "select 2\n");
        assert_eq!(batches[2].text, "select 3\ngoto x\n");
        assert_eq!(batches[2].line, 7);
    }

    #[test]
    fn test_blank_batches_dropped() {
        assert!(split_batches("go\n\ngo\n").is_empty());
        assert!(split_batches("").is_empty());
    }
}
