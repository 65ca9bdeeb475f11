//! `quill ast` command implementation.

use std::fmt::Write;
use std::path::PathBuf;

use clap::Args;
use quill_syntax::{Instruction, parse, parse_and_build, print_ast};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the ast command.
#[derive(Args)]
pub(crate) struct AstArgs {
    /// Path to the Quill document.
    file: PathBuf,

    /// Print the flat instruction stream instead of the tree.
    #[arg(long)]
    instructions: bool,
}

impl AstArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let source = std::fs::read_to_string(&self.file)?;

        let text = if self.instructions {
            format_instructions(&parse(&source))
        } else {
            print_ast(&source, &parse_and_build(&source))
        };
        output.document(None, &text)?;
        Ok(())
    }
}

/// One instruction per line, with the operand where it carries meaning.
fn format_instructions(instructions: &[Instruction]) -> String {
    let mut out = String::new();
    for instruction in instructions {
        if instruction.kind.has_operand() {
            let _ = writeln!(out, "{:?} {}", instruction.kind, instruction.operand);
        } else {
            let _ = writeln!(out, "{:?}", instruction.kind);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_instructions() {
        assert_eq!(
            format_instructions(&parse("x\\b{y}")),
            "PushDocument 2\nText 1\nPushDirective 2\nPushBlock 1\nText 1\nPopBlock\nPopDirective\nPopDocument\n"
        );
    }
}
