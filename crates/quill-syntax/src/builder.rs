//! Builds the document tree from an instruction stream.

use crate::ast::{Argument, Content, Directive, Escaped, Text};
use crate::instruction::{Instruction, InstructionKind};
use crate::parser::parse;
use crate::span::SourceSpan;

/// Builds the document tree for `source` from `instructions`.
///
/// # Panics
///
/// Panics if `instructions` is not a well-formed stream for `source`.
/// Output of [`parse`](crate::parse) for the same source is always well-formed.
#[must_use]
pub fn build_ast(source: &str, instructions: &[Instruction]) -> Vec<Content> {
    let mut builder = AstBuilder {
        instructions,
        index: 0,
        pos: 0,
    };
    let document = builder.expect(InstructionKind::PushDocument);
    let content = builder.build_pieces(document.operand);
    builder.expect(InstructionKind::PopDocument);
    debug_assert_eq!(builder.pos, source.len(), "instructions do not cover the source");
    content
}

/// Parses `source` and builds its document tree.
///
/// # Example
///
/// ```
/// use quill_syntax::{parse_and_build, Content};
///
/// let source = "\\b{hi}";
/// let content = parse_and_build(source);
/// let Content::Directive(directive) = &content[0] else {
///     panic!("expected a directive");
/// };
/// assert_eq!(directive.name(source), "b");
/// assert_eq!(directive.content.len(), 1);
/// ```
#[must_use]
pub fn parse_and_build(source: &str) -> Vec<Content> {
    build_ast(source, &parse(source))
}

struct AstBuilder<'a> {
    instructions: &'a [Instruction],
    index: usize,
    /// Source position after the last consumed instruction.
    pos: usize,
}

impl AstBuilder<'_> {
    fn peek_kind(&self) -> Option<InstructionKind> {
        self.instructions.get(self.index).map(|i| i.kind)
    }

    fn next(&mut self) -> Instruction {
        let instruction = *self
            .instructions
            .get(self.index)
            .unwrap_or_else(|| panic!("instruction stream ended early at {}", self.index));
        self.index += 1;
        self.pos += instruction.advance();
        instruction
    }

    fn skip(&mut self) {
        while self.peek_kind() == Some(InstructionKind::Skip) {
            self.next();
        }
    }

    fn expect(&mut self, kind: InstructionKind) -> Instruction {
        self.skip();
        let instruction = self.next();
        assert_eq!(
            instruction.kind,
            kind,
            "malformed instruction stream at {}",
            self.index - 1
        );
        instruction
    }

    fn build_pieces(&mut self, count: usize) -> Vec<Content> {
        let mut content = Vec::with_capacity(count);
        for _ in 0..count {
            self.skip();
            let start = self.pos;
            let instruction = self.next();
            let piece = match instruction.kind {
                InstructionKind::Text => Content::Text(Text {
                    span: SourceSpan::new(start, instruction.operand),
                }),
                InstructionKind::Escape => Content::Escaped(Escaped {
                    span: SourceSpan::new(start, instruction.operand),
                }),
                InstructionKind::PushDirective => {
                    Content::Directive(self.build_directive(start, instruction.operand - 1))
                }
                other => panic!("unexpected {other} where content was expected"),
            };
            content.push(piece);
        }
        content
    }

    fn build_directive(&mut self, start: usize, name_length: usize) -> Directive {
        let arguments = if self.peek_kind() == Some(InstructionKind::PushArguments) {
            self.build_arguments()
        } else {
            Vec::new()
        };
        let content = if self.peek_kind() == Some(InstructionKind::PushBlock) {
            let block = self.next();
            let content = self.build_pieces(block.operand);
            self.expect(InstructionKind::PopBlock);
            content
        } else {
            Vec::new()
        };
        self.expect(InstructionKind::PopDirective);

        Directive {
            span: SourceSpan::new(start, self.pos - start),
            name_length,
            arguments,
            content,
        }
    }

    fn build_arguments(&mut self) -> Vec<Argument> {
        let list = self.expect(InstructionKind::PushArguments);
        let mut arguments = Vec::with_capacity(list.operand);
        for i in 0..list.operand {
            if i != 0 {
                self.expect(InstructionKind::ArgumentComma);
            }
            arguments.push(self.build_argument());
        }
        self.expect(InstructionKind::PopArguments);
        arguments
    }

    fn build_argument(&mut self) -> Argument {
        let argument = self.expect(InstructionKind::PushArgument);
        let start = self.pos;

        self.skip();
        let name_span = if self.peek_kind() == Some(InstructionKind::ArgumentName) {
            let name_start = self.pos;
            let name = self.next();
            self.expect(InstructionKind::ArgumentEqual);
            SourceSpan::new(name_start, name.operand)
        } else {
            SourceSpan::new(start, 0)
        };

        let content = self.build_pieces(argument.operand);
        self.expect(InstructionKind::PopArgument);

        Argument {
            span: SourceSpan::new(start, self.pos - start),
            name_span,
            content,
        }
    }
}
