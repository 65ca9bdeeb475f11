//! Total parser from source text to an instruction stream.
//!
//! The parser never fails. Every construct is matched speculatively: an
//! attempt saves the cursor and the length of the output, and an aborted
//! attempt restores both, so whatever could not be matched is re-read as
//! plain text.
//!
//! # Grammar
//!
//! ```text
//! document  := piece*
//! piece     := escape | directive | text
//! escape    := '\' escapable
//! directive := '\' name ('[' arguments ']')? ('{' piece* '}')?
//! arguments := argument (',' argument)*
//! argument  := ws* (name ws* '=')? ws* piece* ws*
//! ```

use std::collections::HashSet;

use crate::chars::{is_ascii_blank_byte, is_escapable, is_name_char, is_name_start};
use crate::instruction::{Instruction, InstructionKind};
use crate::unicode;

/// Maximum nesting of blocks and argument lists.
///
/// Deeper constructs degrade to text.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Parses `source` into an instruction stream.
///
/// # Example
///
/// ```
/// use quill_syntax::{parse, InstructionKind};
///
/// let instructions = parse("\\b{hi}");
/// let kinds: Vec<_> = instructions.iter().map(|i| i.kind).collect();
/// assert_eq!(
///     kinds,
///     [
///         InstructionKind::PushDocument,
///         InstructionKind::PushDirective,
///         InstructionKind::PushBlock,
///         InstructionKind::Text,
///         InstructionKind::PopBlock,
///         InstructionKind::PopDirective,
///         InstructionKind::PopDocument,
///     ]
/// );
/// ```
#[must_use]
pub fn parse(source: &str) -> Vec<Instruction> {
    parse_bytes(source.as_bytes())
}

/// Parses arbitrary bytes into an instruction stream.
///
/// Bytes that are not valid UTF-8 never form names and end up in text.
#[must_use]
pub fn parse_bytes(source: &[u8]) -> Vec<Instruction> {
    let mut parser = Parser::new(source);
    parser.parse_document();
    tracing::trace!(
        bytes = source.len(),
        instructions = parser.out.len(),
        "parsed document"
    );
    parser.out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentContext {
    Document,
    ArgumentValue,
    Block,
}

/// Bracket nesting within a single content sequence.
#[derive(Debug, Default)]
struct BracketLevels {
    square: usize,
    brace: usize,
}

#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    pos: usize,
    emitted: usize,
}

struct Parser<'a> {
    source: &'a [u8],
    pos: usize,
    out: Vec<Instruction>,
    depth: usize,
    depth_limit_hits: usize,
    /// Positions of `{` and `[` whose block or argument list is known not to match.
    failed: HashSet<usize>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            pos: 0,
            out: Vec::new(),
            depth: 0,
            depth_limit_hits: 0,
            failed: HashSet::new(),
        }
    }

    fn parse_document(&mut self) {
        let index = self.emit(InstructionKind::PushDocument, 0);
        let pieces = self.match_content_sequence(ContentContext::Document);
        self.out[index].operand = pieces;
        self.emit_bare(InstructionKind::PopDocument);
    }

    // Cursor helpers

    fn eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn expect(&mut self, c: u8) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn char_at(&self, pos: usize) -> Option<(char, usize)> {
        self.source
            .get(pos..)
            .and_then(|rest| unicode::decode(rest).ok())
    }

    fn emit(&mut self, kind: InstructionKind, operand: usize) -> usize {
        self.out.push(Instruction::new(kind, operand));
        self.out.len() - 1
    }

    fn emit_bare(&mut self, kind: InstructionKind) {
        self.out.push(Instruction::bare(kind));
    }

    // Backtracking

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            emitted: self.out.len(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.out.truncate(checkpoint.emitted);
    }

    /// Runs `f`; if it returns `None`, everything it consumed and emitted is undone.
    fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let checkpoint = self.checkpoint();
        let result = f(self);
        if result.is_none() {
            self.restore(checkpoint);
        }
        result
    }

    /// Like [`attempt`](Self::attempt), for constructs that open a nesting level.
    ///
    /// Failures are remembered by start position so that the same construct is
    /// not re-parsed after an enclosing attempt backtracks.
    fn attempt_nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let start = self.pos;
        if self.failed.contains(&start) {
            return None;
        }
        if self.depth >= MAX_NESTING_DEPTH {
            self.depth_limit_hits += 1;
            return None;
        }
        let hits_before = self.depth_limit_hits;

        self.depth += 1;
        let result = self.attempt(f);
        self.depth -= 1;

        if result.is_none() && self.depth_limit_hits == hits_before {
            self.failed.insert(start);
        }
        result
    }

    // Matchers

    fn match_whitespace(&mut self) -> usize {
        let initial = self.pos;
        while self.peek().is_some_and(is_ascii_blank_byte) {
            self.pos += 1;
        }
        self.pos - initial
    }

    fn skip_whitespace(&mut self) {
        let length = self.match_whitespace();
        if length != 0 {
            self.emit(InstructionKind::Skip, length);
        }
    }

    /// Matches a directive or argument name, returning its length in bytes.
    fn match_name(&mut self) -> usize {
        let initial = self.pos;
        match self.char_at(self.pos) {
            Some((c, _)) if is_name_start(c) => {}
            _ => return 0,
        }
        while let Some((c, length)) = self.char_at(self.pos) {
            if !is_name_char(c) {
                break;
            }
            self.pos += length;
        }
        self.pos - initial
    }

    fn is_terminated(&self, context: ContentContext, levels: &BracketLevels) -> bool {
        match (context, self.peek()) {
            (ContentContext::Document, _) | (_, None) => false,
            (ContentContext::ArgumentValue, Some(b',')) => true,
            (ContentContext::ArgumentValue, Some(b']')) => levels.square == 0,
            (ContentContext::ArgumentValue | ContentContext::Block, Some(b'}')) => {
                levels.brace == 0
            }
            _ => false,
        }
    }

    /// Matches pieces until end of input or a terminator of `context`.
    fn match_content_sequence(&mut self, context: ContentContext) -> usize {
        let mut levels = BracketLevels::default();
        let mut pieces = 0;
        while !self.eof() && !self.is_terminated(context, &levels) {
            if !self.try_match_piece(context, &mut levels) {
                break;
            }
            pieces += 1;
        }
        pieces
    }

    fn try_match_piece(&mut self, context: ContentContext, levels: &mut BracketLevels) -> bool {
        if self.peek() == Some(b'\\') && (self.try_match_escape() || self.try_match_directive()) {
            return true;
        }
        self.try_match_text(context, levels)
    }

    fn try_match_escape(&mut self) -> bool {
        if self.peek() == Some(b'\\') && self.peek_at(1).is_some_and(is_escapable) {
            self.pos += 2;
            self.emit(InstructionKind::Escape, 2);
            return true;
        }
        false
    }

    /// Returns `true` if the backslash at `pos` begins an escape or a directive.
    fn backslash_starts_piece(&self, pos: usize) -> bool {
        match self.source.get(pos + 1) {
            None => false,
            Some(&next) if is_escapable(next) => true,
            Some(_) => self.char_at(pos + 1).is_some_and(|(c, _)| is_name_start(c)),
        }
    }

    fn try_match_text(&mut self, context: ContentContext, levels: &mut BracketLevels) -> bool {
        let initial = self.pos;

        while let Some(c) = self.peek() {
            if c == b'\\' {
                if self.backslash_starts_piece(self.pos) {
                    break;
                }
                self.pos += 1;
                continue;
            }
            match (context, c) {
                (ContentContext::Document, _) => {}
                (ContentContext::ArgumentValue, b',') => break,
                (ContentContext::ArgumentValue, b'[') => levels.square += 1,
                (ContentContext::ArgumentValue, b']') => {
                    if levels.square == 0 {
                        break;
                    }
                    levels.square -= 1;
                }
                (_, b'{') => levels.brace += 1,
                (_, b'}') => {
                    if levels.brace == 0 {
                        break;
                    }
                    levels.brace -= 1;
                }
                _ => {}
            }
            self.pos += 1;
        }

        if self.pos == initial {
            return false;
        }
        self.emit(InstructionKind::Text, self.pos - initial);
        true
    }

    fn try_match_directive(&mut self) -> bool {
        self.attempt(|p| {
            if !p.expect(b'\\') {
                return None;
            }
            let name_length = p.match_name();
            if name_length == 0 {
                return None;
            }
            p.emit(InstructionKind::PushDirective, name_length + 1);
            p.try_match_argument_list();
            p.try_match_block();
            p.emit_bare(InstructionKind::PopDirective);
            Some(())
        })
        .is_some()
    }

    fn try_match_argument_list(&mut self) -> bool {
        if self.peek() != Some(b'[') {
            return false;
        }
        self.attempt_nested(|p| {
            p.pos += 1;
            let index = p.emit(InstructionKind::PushArguments, 0);

            if p.expect(b']') {
                p.emit_bare(InstructionKind::PopArguments);
                return Some(());
            }

            let mut count = 0;
            loop {
                if !p.try_match_argument() {
                    return None;
                }
                count += 1;
                if p.expect(b',') {
                    p.emit_bare(InstructionKind::ArgumentComma);
                    continue;
                }
                // Argument values only stop at `,` and `]`.
                if !p.expect(b']') {
                    return None;
                }
                p.out[index].operand = count;
                p.emit_bare(InstructionKind::PopArguments);
                return Some(());
            }
        })
        .is_some()
    }

    fn try_match_argument(&mut self) -> bool {
        if self.eof() {
            return false;
        }
        self.attempt(|p| {
            let index = p.emit(InstructionKind::PushArgument, 0);
            p.try_match_argument_name();
            let pieces = p.try_match_trimmed_argument_value()?;
            p.out[index].operand = pieces;
            p.emit_bare(InstructionKind::PopArgument);
            Some(())
        })
        .is_some()
    }

    /// Matches `ws* name ws* =`.
    fn try_match_argument_name(&mut self) -> bool {
        self.attempt(|p| {
            p.skip_whitespace();
            let name_length = p.match_name();
            if name_length == 0 {
                return None;
            }
            p.emit(InstructionKind::ArgumentName, name_length);
            p.skip_whitespace();
            if !p.expect(b'=') {
                return None;
            }
            p.emit_bare(InstructionKind::ArgumentEqual);
            Some(())
        })
        .is_some()
    }

    /// Matches an argument value with surrounding whitespace split off into skips.
    ///
    /// Returns the number of pieces in the value.
    fn try_match_trimmed_argument_value(&mut self) -> Option<usize> {
        self.attempt(|p| {
            p.skip_whitespace();
            let mut pieces = p.match_content_sequence(ContentContext::ArgumentValue);
            if !matches!(p.peek(), Some(b',' | b']')) {
                return None;
            }
            if p.trim_trailing_whitespace() {
                pieces -= 1;
            }
            Some(pieces)
        })
    }

    /// Splits trailing whitespace off the most recent text instruction.
    ///
    /// Returns `true` if the instruction was whitespace only and became a skip.
    fn trim_trailing_whitespace(&mut self) -> bool {
        let Some(latest) = self.out.last().copied() else {
            return false;
        };
        if latest.kind != InstructionKind::Text {
            return false;
        }
        let text = &self.source[self.pos - latest.operand..self.pos];
        let trailing = text
            .iter()
            .rev()
            .take_while(|&&b| is_ascii_blank_byte(b))
            .count();

        if trailing == latest.operand {
            if let Some(last) = self.out.last_mut() {
                last.kind = InstructionKind::Skip;
            }
            return true;
        }
        if trailing != 0 {
            if let Some(last) = self.out.last_mut() {
                last.operand -= trailing;
            }
            self.emit(InstructionKind::Skip, trailing);
        }
        false
    }

    fn try_match_block(&mut self) -> bool {
        if self.peek() != Some(b'{') {
            return false;
        }
        self.attempt_nested(|p| {
            p.pos += 1;
            let index = p.emit(InstructionKind::PushBlock, 0);
            let pieces = p.match_content_sequence(ContentContext::Block);
            if !p.expect(b'}') {
                return None;
            }
            p.out[index].operand = pieces;
            p.emit_bare(InstructionKind::PopBlock);
            Some(())
        })
        .is_some()
    }
}
