//! `quill highlight` command implementation.

use std::path::PathBuf;

use clap::Args;
use quill_config::Config;
use quill_render::HtmlWriter;
use quill_syntax::highlight::highlight_markup_source;
use quill_syntax::{HighlightOptions, HighlightSpan};

use crate::error::CliError;
use crate::output::Output;

/// Element wrapping each highlighted span.
const HIGHLIGHT_TAG: &str = "h-";

/// Arguments for the highlight command.
#[derive(Args)]
pub(crate) struct HighlightArgs {
    /// Path to the Quill document.
    file: PathBuf,

    /// Write the result to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover quill.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl HighlightArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;

        let source = std::fs::read_to_string(&self.file)?;
        let spans = highlight_markup_source(
            &source,
            HighlightOptions {
                coalescing: config.highlight.coalesce,
            },
        );
        tracing::info!(file = %self.file.display(), spans = spans.len(), "Highlighted markup");

        output.document(self.output.as_deref(), &highlighted_html(&source, &spans))?;
        Ok(())
    }
}

/// Render `source` as a code block with every span wrapped in an `<h->` element.
///
/// Spans must be sorted and must not overlap.
fn highlighted_html(source: &str, spans: &[HighlightSpan]) -> String {
    let mut out = HtmlWriter::new();
    out.open_tag("pre");
    out.open_tag("code");
    let mut pos = 0;
    for span in spans {
        if span.begin < pos || span.end() > source.len() {
            tracing::debug!(begin = span.begin, length = span.length, "skipping invalid span");
            continue;
        }
        out.write_inner_text(&source[pos..span.begin]);
        out.open_tag_with_attributes(HIGHLIGHT_TAG)
            .write_attribute("data-h", span.kind.short_id());
        out.write_inner_text(&source[span.begin..span.end()]);
        out.close_tag(HIGHLIGHT_TAG);
        pos = span.end();
    }
    out.write_inner_text(&source[pos..]);
    out.close_tag("code");
    out.close_tag("pre");
    out.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_highlighted_html() {
        let source = "a \\b{<x>}";
        let spans = highlight_markup_source(source, HighlightOptions { coalescing: true });
        assert_eq!(
            highlighted_html(source, &spans),
            "<pre><code>a <h- data-h=tag>\\b</h-><h- data-h=sym_imp>{</h->&lt;x&gt;<h- data-h=sym_imp>}</h-></code></pre>"
        );
    }

    #[test]
    fn test_highlighted_html_without_spans() {
        assert_eq!(highlighted_html("plain", &[]), "<pre><code>plain</code></pre>");
    }
}
