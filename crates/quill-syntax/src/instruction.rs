//! The flat instruction stream produced by the parser.
//!
//! The stream is a pre-order serialization of the document tree. Every
//! instruction advances a cursor over the source by a known amount, so the
//! stream together with the source is enough to rebuild the tree and to
//! recover the exact byte range of every token.

/// Kind of an [`Instruction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    /// Ignore the next `operand` bytes (whitespace around arguments).
    Skip,
    /// The next `operand` bytes (always 2) are an escape sequence such as `\{`.
    Escape,
    /// The next `operand` bytes are literal text.
    Text,
    /// The next `operand` bytes are an argument name.
    ArgumentName,
    /// Advance past the `=` following an argument name.
    ArgumentEqual,
    /// Advance past the `,` between arguments.
    ArgumentComma,
    /// Begin the document; the operand is the number of top-level pieces.
    PushDocument,
    PopDocument,
    /// Begin a directive; the operand is the length of the name including the leading `\`.
    PushDirective,
    PopDirective,
    /// Begin an argument list; the operand is the number of arguments. Advances past `[`.
    PushArguments,
    /// Advance past `]`.
    PopArguments,
    /// Begin an argument; the operand is the number of pieces in its value.
    PushArgument,
    PopArgument,
    /// Begin a block; the operand is the number of pieces inside. Advances past `{`.
    PushBlock,
    /// Advance past `}`.
    PopBlock,
}

impl InstructionKind {
    /// Returns `true` if the operand of this kind carries meaning.
    #[must_use]
    pub const fn has_operand(self) -> bool {
        !matches!(
            self,
            Self::PopDocument
                | Self::PopDirective
                | Self::PopArguments
                | Self::PopArgument
                | Self::PopBlock
                | Self::ArgumentEqual
                | Self::ArgumentComma
        )
    }

    /// Number of source bytes this instruction advances over, given its operand.
    #[must_use]
    pub const fn advance(self, operand: usize) -> usize {
        match self {
            Self::Skip
            | Self::Escape
            | Self::Text
            | Self::ArgumentName
            | Self::PushDirective => operand,
            Self::ArgumentEqual
            | Self::ArgumentComma
            | Self::PushArguments
            | Self::PopArguments
            | Self::PushBlock
            | Self::PopBlock => 1,
            Self::PushDocument
            | Self::PopDocument
            | Self::PopDirective
            | Self::PushArgument
            | Self::PopArgument => 0,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Escape => "escape",
            Self::Text => "text",
            Self::ArgumentName => "argument_name",
            Self::ArgumentEqual => "argument_equal",
            Self::ArgumentComma => "argument_comma",
            Self::PushDocument => "push_document",
            Self::PopDocument => "pop_document",
            Self::PushDirective => "push_directive",
            Self::PopDirective => "pop_directive",
            Self::PushArguments => "push_arguments",
            Self::PopArguments => "pop_arguments",
            Self::PushArgument => "push_argument",
            Self::PopArgument => "pop_argument",
            Self::PushBlock => "push_block",
            Self::PopBlock => "pop_block",
        }
    }

    /// The matching pop kind for a push kind.
    #[must_use]
    pub const fn closing(self) -> Option<Self> {
        match self {
            Self::PushDocument => Some(Self::PopDocument),
            Self::PushDirective => Some(Self::PopDirective),
            Self::PushArguments => Some(Self::PopArguments),
            Self::PushArgument => Some(Self::PopArgument),
            Self::PushBlock => Some(Self::PopBlock),
            _ => None,
        }
    }
}

impl std::fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One step of the instruction stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub kind: InstructionKind,
    pub operand: usize,
}

impl Instruction {
    #[must_use]
    pub const fn new(kind: InstructionKind, operand: usize) -> Self {
        Self { kind, operand }
    }

    /// Instruction whose operand is irrelevant.
    #[must_use]
    pub const fn bare(kind: InstructionKind) -> Self {
        Self { kind, operand: 0 }
    }

    /// Number of source bytes this instruction advances over.
    #[must_use]
    pub const fn advance(self) -> usize {
        self.kind.advance(self.operand)
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.kind.has_operand() {
            write!(f, "{}({})", self.kind, self.operand)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

/// Returns `true` if `instructions` is balanced and every counting operand
/// matches the number of pieces or arguments actually emitted.
///
/// Intended for tests and debug assertions.
#[must_use]
pub fn is_well_formed(instructions: &[Instruction]) -> bool {
    let mut stack: Vec<Frame> = Vec::new();

    for instruction in instructions {
        let kind = instruction.kind;
        match kind {
            InstructionKind::Escape | InstructionKind::Text => {
                if !count_piece(&mut stack) {
                    return false;
                }
            }
            InstructionKind::PushDocument => {
                if !stack.is_empty() {
                    return false;
                }
                stack.push(Frame::open(*instruction));
            }
            InstructionKind::PushDirective => {
                if !count_piece(&mut stack) {
                    return false;
                }
                stack.push(Frame::open(*instruction));
            }
            InstructionKind::PushArguments | InstructionKind::PushBlock => {
                if !matches!(stack.last(), Some(f) if f.kind == InstructionKind::PushDirective) {
                    return false;
                }
                stack.push(Frame::open(*instruction));
            }
            InstructionKind::PushArgument => match stack.last_mut() {
                Some(f) if f.kind == InstructionKind::PushArguments => {
                    f.seen += 1;
                    stack.push(Frame::open(*instruction));
                }
                _ => return false,
            },
            InstructionKind::PopDocument
            | InstructionKind::PopDirective
            | InstructionKind::PopArguments
            | InstructionKind::PopArgument
            | InstructionKind::PopBlock => {
                let Some(frame) = stack.pop() else {
                    return false;
                };
                if frame.kind.closing() != Some(kind) {
                    return false;
                }
                if frame.kind != InstructionKind::PushDirective && frame.declared != frame.seen {
                    return false;
                }
            }
            InstructionKind::Skip
            | InstructionKind::ArgumentName
            | InstructionKind::ArgumentEqual
            | InstructionKind::ArgumentComma => {}
        }
    }

    stack.is_empty()
}

struct Frame {
    kind: InstructionKind,
    declared: usize,
    seen: usize,
}

impl Frame {
    fn open(instruction: Instruction) -> Self {
        Self {
            kind: instruction.kind,
            declared: instruction.operand,
            seen: 0,
        }
    }
}

/// Counts a piece towards the innermost piece container.
fn count_piece(stack: &mut [Frame]) -> bool {
    match stack.last_mut() {
        Some(frame)
            if matches!(
                frame.kind,
                InstructionKind::PushDocument
                    | InstructionKind::PushArgument
                    | InstructionKind::PushBlock
            ) =>
        {
            frame.seen += 1;
            true
        }
        _ => false,
    }
}
