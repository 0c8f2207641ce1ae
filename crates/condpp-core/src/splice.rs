use std::ops::Range;

/// Collects the source ranges of disabled branches and assembles the output
/// from what remains.
#[derive(Debug, Clone, Default)]
pub struct TextSplicer {
    removed: Vec<Range<usize>>,
}

impl TextSplicer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `start..end` for removal. Ranges must arrive in source order and
    /// must not overlap; empty ranges are ignored.
    pub fn mark_disabled(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        debug_assert!(
            self.removed.last().map_or(true, |last| last.end <= start),
            "removed ranges must be ordered and disjoint"
        );
        match self.removed.last_mut() {
            Some(last) if last.end == start => last.end = end,
            _ => self.removed.push(start..end),
        }
    }

    pub fn removed(&self) -> &[Range<usize>] {
        &self.removed
    }

    pub fn removed_bytes(&self) -> usize {
        self.removed.iter().map(|r| r.len()).sum()
    }

    /// The non-empty ranges of a source of length `len` that survive
    pub fn retained(&self, len: usize) -> Vec<Range<usize>> {
        let mut retained = Vec::with_capacity(self.removed.len() + 1);
        let mut cursor = 0;
        for range in &self.removed {
            if range.start > cursor {
                retained.push(cursor..range.start);
            }
            cursor = range.end;
        }
        if cursor < len {
            retained.push(cursor..len);
        }
        retained
    }

    /// Concatenate the retained ranges of `source`
    pub fn build(&self, source: &str) -> String {
        let mut out = String::with_capacity(source.len() - self.removed_bytes());
        for range in self.retained(source.len()) {
            out.push_str(&source[range]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_without_removals_is_identity() {
        let splicer = TextSplicer::new();
        assert_eq!(splicer.build("hello\nworld"), "hello\nworld");
        assert_eq!(splicer.retained(11), vec![0..11]);
    }

    #[test]
    fn test_build_removes_marked_ranges() {
        let mut splicer = TextSplicer::new();
        splicer.mark_disabled(1, 3);
        splicer.mark_disabled(5, 5);
        splicer.mark_disabled(6, 8);
        assert_eq!(splicer.build("0123456789"), "034589");
        assert_eq!(splicer.retained(10), vec![0..1, 3..6, 8..10]);
        assert_eq!(splicer.removed_bytes(), 4);
    }

    #[test]
    fn test_adjacent_ranges_coalesce() {
        let mut splicer = TextSplicer::new();
        splicer.mark_disabled(0, 2);
        splicer.mark_disabled(2, 4);
        assert_eq!(splicer.removed(), &[0..4]);
        assert_eq!(splicer.build("abcdef"), "ef");
    }
}
