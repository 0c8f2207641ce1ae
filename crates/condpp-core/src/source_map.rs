//! Source Map v3 export.
//!
//! Every retained, non-newline character gets its own mapping segment, so a
//! debugger can resolve any column of the output back to the original file.
//! Columns are counted in UTF-16 code units as JavaScript tooling expects.

use serde::Serialize;

use crate::position_map::PositionMap;

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<String>>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    /// Build a high-resolution map for `output`, which must be the text the
    /// position map was built for.
    pub fn from_position_map(
        map: &PositionMap,
        source: &str,
        output: &str,
        file: Option<&str>,
        source_name: &str,
        include_content: bool,
    ) -> Self {
        let mut encoder = MappingsEncoder::default();
        let line_starts = line_starts(source);
        let mut generated = Position::default();

        for span in map.spans() {
            let line = line_starts.partition_point(|&start| start <= span.source.start) - 1;
            let mut original = Position {
                line,
                column: utf16_len(&source[line_starts[line]..span.source.start]),
            };

            for ch in output[span.output].chars() {
                if ch == '\n' {
                    generated.next_line();
                    original.next_line();
                    continue;
                }
                encoder.push(generated, original);
                generated.column += ch.len_utf16();
                original.column += ch.len_utf16();
            }
        }

        Self {
            version: 3,
            file: file.map(str::to_string),
            sources: vec![source_name.to_string()],
            sources_content: include_content.then(|| vec![source.to_string()]),
            names: Vec::new(),
            mappings: encoder.finish(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Trailing comment that points a consumer at a map file
pub fn mapping_url_comment(map_file_name: &str) -> String {
    format!("//# sourceMappingURL={map_file_name}")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Position {
    line: usize,
    column: usize,
}

impl Position {
    fn next_line(&mut self) {
        self.line += 1;
        self.column = 0;
    }
}

/// Delta-encodes segments into the `mappings` field
#[derive(Default)]
struct MappingsEncoder {
    out: String,
    line: usize,
    line_has_segment: bool,
    prev_generated_column: usize,
    prev_original: Position,
}

impl MappingsEncoder {
    fn push(&mut self, generated: Position, original: Position) {
        while self.line < generated.line {
            self.out.push(';');
            self.line += 1;
            self.line_has_segment = false;
            self.prev_generated_column = 0;
        }
        if self.line_has_segment {
            self.out.push(',');
        }

        encode_vlq(&mut self.out, delta(generated.column, self.prev_generated_column));
        // single source, index delta is always zero
        encode_vlq(&mut self.out, 0);
        encode_vlq(&mut self.out, delta(original.line, self.prev_original.line));
        encode_vlq(&mut self.out, delta(original.column, self.prev_original.column));

        self.line_has_segment = true;
        self.prev_generated_column = generated.column;
        self.prev_original = original;
    }

    fn finish(self) -> String {
        self.out
    }
}

fn delta(current: usize, previous: usize) -> i64 {
    current as i64 - previous as i64
}

fn encode_vlq(out: &mut String, value: i64) {
    let mut vlq = if value < 0 {
        (value.unsigned_abs() << 1) | 1
    } else {
        (value as u64) << 1
    };
    loop {
        let mut digit = (vlq & 0b1_1111) as usize;
        vlq >>= 5;
        if vlq > 0 {
            digit |= 0b10_0000;
        }
        out.push(BASE64[digit] as char);
        if vlq == 0 {
            break;
        }
    }
}

fn line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}
