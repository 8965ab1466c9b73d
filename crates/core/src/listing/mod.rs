//! Rendered microcode listings.
//!
//! A listing is produced in one pass over the printer output. Each line is
//! tagged at render time with the navigation markers it carries, so later
//! navigation never re-parses text:
//! - a leading `<block>.<serial>` marker (`1. 0`, `3.12`)
//! - a trailing `; <hex address>` comment
//!
//! Two post-passes consume the tagged lines: [`concat_lines`] (one string, for
//! graph node text) and [`LineIndex::build`] (navigation lookups).

use crate::model::print::{remove_prefix_tags, strip_color_tags};
use crate::model::{Address, IrFunction, LineSink};

mod index;

pub use index::LineIndex;

/// A `<block>.<serial>` marker at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockMarker {
    pub block: usize,
    pub serial: usize,
    /// The marker heads a comment line (`1. 0 ; 2WAY-BLOCK ...`) rather than
    /// an instruction.
    pub is_comment: bool,
}

/// Navigation markers found on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineTag {
    pub block: Option<BlockMarker>,
    pub address: Option<Address>,
}

impl LineTag {
    pub fn parse(plain: &str) -> Self {
        Self { block: parse_block_marker(plain), address: parse_address_marker(plain) }
    }

    pub fn is_plain(&self) -> bool {
        self.block.is_none() && self.address.is_none()
    }
}

/// One listing line: the coloured text as printed, its tag-free form, and its
/// markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    text: String,
    plain: String,
    tag: LineTag,
}

impl TextLine {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let plain = strip_color_tags(&text);
        let tag = LineTag::parse(&plain);
        Self { text, plain, tag }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn plain(&self) -> &str {
        &self.plain
    }

    pub fn tag(&self) -> &LineTag {
        &self.tag
    }
}

/// Lines plus their navigation index, built together from one rendering.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    lines: Vec<TextLine>,
    index: LineIndex,
}

impl Listing {
    /// Render the whole function through its printer.
    pub fn render(ir: &dyn IrFunction) -> Self {
        let mut collector = LineCollector::default();
        ir.print(&mut collector);
        Self::from_lines(collector.lines)
    }

    pub fn from_lines(lines: Vec<TextLine>) -> Self {
        let index = LineIndex::build(&lines);
        Self { lines, index }
    }

    /// Build a listing from raw printer strings.
    pub fn from_strings<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = raw.into_iter().map(|s| TextLine::new(remove_prefix_tags(s.as_ref())));
        Self::from_lines(lines.collect())
    }

    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    pub fn line(&self, n: usize) -> Option<&TextLine> {
        self.lines.get(n)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn index(&self) -> &LineIndex {
        &self.index
    }
}

/// Collects printer output into tagged lines.
#[derive(Debug, Default)]
struct LineCollector {
    lines: Vec<TextLine>,
}

impl LineSink for LineCollector {
    fn emit(&mut self, line: String) {
        self.lines.push(TextLine::new(remove_prefix_tags(&line)));
    }
}

/// Accumulates printer output into one newline-separated string.
struct StringSink<'a> {
    buf: &'a mut String,
}

impl LineSink for StringSink<'_> {
    fn emit(&mut self, line: String) {
        if !self.buf.is_empty() {
            self.buf.push('\n');
        }
        self.buf.push_str(&remove_prefix_tags(&line));
    }
}

/// Join lines into one string, newline-separated.
pub fn concat_lines(lines: &[TextLine]) -> String {
    lines.iter().map(TextLine::text).collect::<Vec<_>>().join("\n")
}

/// Re-render one block into `buf`, replacing its previous contents.
///
/// Returns `false` (and leaves `buf` empty) when the block does not exist.
pub fn render_block_into(ir: &dyn IrFunction, block: usize, buf: &mut String) -> bool {
    buf.clear();
    if block >= ir.block_count() {
        return false;
    }
    ir.print_block(block, &mut StringSink { buf });
    true
}

fn leading_number(s: &str) -> Option<(usize, &str)> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let value = s[..digits].parse().ok()?;
    Some((value, &s[digits..]))
}

/// Parse a leading `<block>.<serial>` marker. The serial may be space-padded.
pub fn parse_block_marker(plain: &str) -> Option<BlockMarker> {
    let (block, rest) = leading_number(plain.trim_start())?;
    let rest = rest.strip_prefix('.')?;
    let (serial, rest) = leading_number(rest.trim_start_matches(' '))?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let is_comment = rest.trim_start().starts_with(';');
    Some(BlockMarker { block, serial, is_comment })
}

/// Parse the hex address following the last `;` on the line.
///
/// Operands may contain `;` (string literals), so only the trailing comment
/// counts. The token must be hex digits (optionally `0x`-prefixed) ending at
/// whitespace or end of line, and non-zero.
pub fn parse_address_marker(plain: &str) -> Option<Address> {
    let (_, comment) = plain.rsplit_once(';')?;
    let token = comment.trim_start().split_whitespace().next()?;
    let digits = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")).unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match Address::from_str_radix(digits, 16) {
        Ok(0) | Err(_) => None,
        Ok(ea) => Some(ea),
    }
}

/// Find the block number a cursor at `column` refers to.
///
/// `column` counts characters, not bytes. An explicit `@N` reference anywhere
/// on the line wins. Otherwise the run of digits under (or immediately
/// before) the cursor is used.
pub fn block_reference_at(plain: &str, column: usize) -> Option<usize> {
    if let Some((_, after)) = plain.split_once('@') {
        return leading_number(after).map(|(n, _)| n);
    }
    let bytes = plain.as_bytes();
    let mut start = plain.char_indices().nth(column).map_or(bytes.len(), |(i, _)| i);
    while start > 0 && bytes[start - 1].is_ascii_digit() {
        start -= 1;
    }
    leading_number(&plain[start..]).map(|(n, _)| n)
}
