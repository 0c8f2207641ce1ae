use std::ops::Range;

use serde::Serialize;

/// Start of one retained span: `output` in the transformed text maps to
/// `source` in the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Breakpoint {
    pub output: usize,
    pub source: usize,
}

/// Maps byte offsets in transformed output back to the original source.
///
/// Holds one breakpoint per retained span, ordered by output offset. Any
/// output offset resolves through the nearest preceding breakpoint plus the
/// distance into its span, giving exact per-character positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionMap {
    breakpoints: Vec<Breakpoint>,
    output_len: usize,
}

/// A retained span seen from both sides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedSpan {
    pub output: Range<usize>,
    pub source: Range<usize>,
}

impl PositionMap {
    /// Build the map from the retained source ranges, in order
    pub fn build(retained: &[Range<usize>]) -> Self {
        let mut breakpoints = Vec::with_capacity(retained.len());
        let mut output = 0;
        for range in retained.iter().filter(|r| !r.is_empty()) {
            breakpoints.push(Breakpoint {
                output,
                source: range.start,
            });
            output += range.len();
        }
        Self {
            breakpoints,
            output_len: output,
        }
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    pub fn output_len(&self) -> usize {
        self.output_len
    }

    /// Source offset for `output_offset`. The end of the output maps to the
    /// end of the last retained span; anything beyond is `None`.
    pub fn lookup(&self, output_offset: usize) -> Option<usize> {
        if output_offset > self.output_len {
            return None;
        }
        let index = self
            .breakpoints
            .partition_point(|b| b.output <= output_offset)
            .checked_sub(1)?;
        let breakpoint = self.breakpoints[index];
        Some(breakpoint.source + (output_offset - breakpoint.output))
    }

    /// Every retained span with its output and source ranges
    pub fn spans(&self) -> impl Iterator<Item = MappedSpan> + '_ {
        self.breakpoints.iter().enumerate().map(|(i, b)| {
            let output_end = self
                .breakpoints
                .get(i + 1)
                .map_or(self.output_len, |next| next.output);
            let len = output_end - b.output;
            MappedSpan {
                output: b.output..output_end,
                source: b.source..b.source + len,
            }
        })
    }
}
