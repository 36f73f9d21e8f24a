//! The managed block inside a descriptor.
//!
//! A managed block is four logical lines:
//!
//! ```toml
//! # Uncomment the section below to use the local spyglass-sdk for development
//! # This assumes spyglass-sdk is located at ../../spyglass-sdk relative to this file
//! [tool.uv.sources]
//! spyglass-ai = { path = "../../spyglass-sdk", editable = true }
//! ```
//!
//! In published mode the last two lines carry a `# ` prefix. The parser
//! accepts either prefix independently on the header and the declaration,
//! and lets any number of lines sit between the header and the first
//! matching declaration. Rendering always produces the canonical four lines
//! in the descriptor's own line ending, so text outside the block is never
//! touched.

use super::SourceMode;
use crate::config::ToggleConfig;
use crate::{Error, Result};
use regex::Regex;
use std::ops::Range;

const COMMENT_MARKER: char = '#';

/// Line terminator convention of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    /// CRLF if the text contains any `\r\n`, LF otherwise.
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// One managed block found in a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedBlock {
    /// Byte range from the first notice line to the end of the declaration
    pub span: Range<usize>,
    pub header_commented: bool,
    pub declaration_commented: bool,
}

impl ManagedBlock {
    /// Local when both lines are live, Published when both are commented.
    pub fn mode(&self) -> SourceMode {
        match (self.header_commented, self.declaration_commented) {
            (false, false) => SourceMode::Local,
            (true, true) => SourceMode::Published,
            _ => SourceMode::Unrecognized,
        }
    }
}

/// Matcher and serializer for the managed block of one dependency.
#[derive(Debug, Clone)]
pub struct BlockGrammar {
    notice: [String; 2],
    section: String,
    header: String,
    declaration: String,
    declaration_re: Regex,
}

impl BlockGrammar {
    pub fn new(config: &ToggleConfig) -> Result<Self> {
        let dep = &config.dependency;
        let editable = if dep.editable { "true" } else { "false" };

        let pattern = format!(
            r#"^\s*(?P<marker>{marker}\s*)?{name}\s*=\s*\{{\s*path\s*=\s*"{path}",\s*editable\s*=\s*{editable}\s*\}}"#,
            marker = COMMENT_MARKER,
            name = regex::escape(&dep.name),
            path = regex::escape(&dep.path),
            editable = editable,
        );
        let declaration_re = Regex::new(&pattern)
            .map_err(|e| Error::Other(format!("Invalid dependency pattern: {}", e)))?;

        Ok(Self {
            notice: config.notice.clone(),
            section: config.section.clone(),
            header: format!("[{}]", config.section),
            declaration: format!(
                r#"{} = {{ path = "{}", editable = {} }}"#,
                dep.name, dep.path, editable
            ),
            declaration_re,
        })
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    /// Detect the mode of the whole descriptor.
    pub fn detect(&self, text: &str) -> SourceMode {
        super::detect(text, &self.section)
    }

    /// Find every managed block, in order of appearance.
    pub fn find_all(&self, text: &str) -> Vec<ManagedBlock> {
        let lines = split_lines(text);
        let mut blocks = Vec::new();
        let mut i = 0;

        while i + 3 < lines.len() {
            match self.match_at(&lines, i) {
                Some((block, last_line)) => {
                    blocks.push(block);
                    i = last_line + 1;
                }
                None => i += 1,
            }
        }

        blocks
    }

    /// Mode shared by all managed blocks, or `None` when there are none.
    ///
    /// Blocks in differing modes yield [`SourceMode::Unrecognized`].
    pub fn block_mode(&self, text: &str) -> Option<SourceMode> {
        let blocks = self.find_all(text);
        let first = blocks.first()?.mode();
        if blocks.iter().all(|b| b.mode() == first) {
            Some(first)
        } else {
            Some(SourceMode::Unrecognized)
        }
    }

    /// Render the canonical block for `mode` (no trailing line ending).
    ///
    /// `mode` must be Local or Published.
    pub fn render(&self, mode: SourceMode, eol: LineEnding) -> String {
        let prefix = match mode {
            SourceMode::Local => String::new(),
            _ => format!("{} ", COMMENT_MARKER),
        };
        let eol = eol.as_str();

        format!(
            "{m} {n0}{eol}{m} {n1}{eol}{p}{header}{eol}{p}{decl}",
            m = COMMENT_MARKER,
            n0 = self.notice[0],
            n1 = self.notice[1],
            p = prefix,
            header = self.header,
            decl = self.declaration,
            eol = eol,
        )
    }

    /// Replace every managed block with its rendering for `mode`.
    ///
    /// Returns the new text and the number of blocks found. Text outside the
    /// blocks is copied through unchanged.
    pub fn rewrite(&self, text: &str, mode: SourceMode) -> (String, usize) {
        let blocks = self.find_all(text);
        if blocks.is_empty() {
            return (text.to_string(), 0);
        }

        let replacement = self.render(mode, LineEnding::detect(text));
        let mut out = String::with_capacity(text.len() + replacement.len());
        let mut cursor = 0;
        for block in &blocks {
            out.push_str(&text[cursor..block.span.start]);
            out.push_str(&replacement);
            cursor = block.span.end;
        }
        out.push_str(&text[cursor..]);

        (out, blocks.len())
    }

    /// Try to match a block whose first notice line is `lines[i]`.
    ///
    /// Returns the block and the index of its declaration line.
    fn match_at(&self, lines: &[Line<'_>], i: usize) -> Option<(ManagedBlock, usize)> {
        if !self.is_notice(lines[i].content, 0) || !self.is_notice(lines[i + 1].content, 1) {
            return None;
        }

        let (header_commented, header) = strip_comment(lines[i + 2].content);
        if !header.starts_with(&self.header) {
            return None;
        }

        // Non-greedy: the first matching declaration after the header closes the block.
        for (j, line) in lines.iter().enumerate().skip(i + 3) {
            if let Some(caps) = self.declaration_re.captures(line.content) {
                let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
                let block = ManagedBlock {
                    span: lines[i].start..line.start + end,
                    header_commented,
                    declaration_commented: caps.name("marker").is_some(),
                };
                return Some((block, j));
            }
        }

        None
    }

    fn is_notice(&self, content: &str, index: usize) -> bool {
        match strip_comment(content) {
            (true, rest) => rest.starts_with(self.notice[index].as_str()),
            (false, _) => false,
        }
    }
}

/// A line of descriptor text without its terminator.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    /// Byte offset of the line start in the full text
    start: usize,
    content: &'a str,
}

fn split_lines(text: &str) -> Vec<Line<'_>> {
    let mut offset = 0;
    text.split_inclusive('\n')
        .map(|raw| {
            let content = raw
                .strip_suffix('\n')
                .map(|l| l.strip_suffix('\r').unwrap_or(l))
                .unwrap_or(raw);
            let line = Line {
                start: offset,
                content,
            };
            offset += raw.len();
            line
        })
        .collect()
}

/// Split off a leading comment marker, ignoring surrounding whitespace.
fn strip_comment(content: &str) -> (bool, &str) {
    let trimmed = content.trim_start();
    match trimmed.strip_prefix(COMMENT_MARKER) {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    }
}
