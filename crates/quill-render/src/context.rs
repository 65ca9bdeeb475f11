//! Processing context shared by all directives of one generation pass.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use bumpalo::Bump;
use quill_syntax::{Directive, SourceSpan};

use crate::behavior::{DirectiveBehavior, NameResolver};
use crate::diagnostic::{Diagnostic, IgnorantLogger, Logger, Severity};
use crate::highlighter::{NoSupportHighlighter, SyntaxHighlighter};

/// Type alias for the file reading callback function.
pub type ReadFileFn = dyn Fn(&Path) -> io::Result<String> + Send;

/// Suggestions further than this from the unknown name are not offered.
pub(crate) const MAX_SUGGESTION_DISTANCE: usize = 2;

pub(crate) static IGNORANT_LOGGER: IgnorantLogger = IgnorantLogger;
pub(crate) static NO_SUPPORT_HIGHLIGHTER: NoSupportHighlighter = NoSupportHighlighter;

/// Default file reading function.
pub(crate) fn default_read_file(path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
}

/// Document variables, set by `\set` and read by `\get`.
///
/// Variables survive between the preprocessing and generation passes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Variables {
    values: HashMap<String, String>,
}

impl Variables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: &str, value: String) {
        if let Some(existing) = self.values.get_mut(name) {
            *existing = value;
        } else {
            self.values.insert(name.to_owned(), value);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// State of one processing pass over a document.
///
/// A context borrows everything it works with: the source, the persistent
/// [`Variables`], and a transient arena that the owner resets once the pass
/// is over. Anything allocated in [`transient`](Self::transient) must not
/// outlive the pass.
///
/// # Example
///
/// ```
/// use bumpalo::Bump;
/// use quill_render::{BuiltinDirectiveSet, Context, Variables, to_plaintext};
/// use quill_syntax::parse_and_build;
///
/// let source = "\\b{bold} text";
/// let content = parse_and_build(source);
/// let builtins = BuiltinDirectiveSet::new();
/// let mut variables = Variables::new();
/// let arena = Bump::new();
/// let mut context = Context::new(source, &mut variables, &arena).with_resolver(&builtins);
///
/// let mut out = String::new();
/// to_plaintext(&mut out, &content, &mut context);
/// assert_eq!(out, "bold text");
/// ```
pub struct Context<'a> {
    source: &'a str,
    source_path: Option<&'a Path>,
    base_dir: &'a Path,
    resolvers: Vec<&'a dyn NameResolver>,
    variables: &'a mut Variables,
    transient: &'a Bump,
    logger: &'a dyn Logger,
    highlighter: &'a dyn SyntaxHighlighter,
    read_file: &'a ReadFileFn,
    error_behavior: Option<&'a dyn DirectiveBehavior>,
}

impl<'a> Context<'a> {
    /// Creates a context with no resolvers, no diagnostics, no highlighting
    /// and the current directory as base for relative paths.
    #[must_use]
    pub fn new(source: &'a str, variables: &'a mut Variables, transient: &'a Bump) -> Self {
        Self {
            source,
            source_path: None,
            base_dir: Path::new("."),
            resolvers: Vec::new(),
            variables,
            transient,
            logger: &IGNORANT_LOGGER,
            highlighter: &NO_SUPPORT_HIGHLIGHTER,
            read_file: &default_read_file,
            error_behavior: None,
        }
    }

    /// Pushes a resolver; later resolvers take precedence.
    #[must_use]
    pub fn with_resolver(mut self, resolver: &'a dyn NameResolver) -> Self {
        self.resolvers.push(resolver);
        self
    }

    #[must_use]
    pub fn with_logger(mut self, logger: &'a dyn Logger) -> Self {
        self.logger = logger;
        self
    }

    #[must_use]
    pub fn with_highlighter(mut self, highlighter: &'a dyn SyntaxHighlighter) -> Self {
        self.highlighter = highlighter;
        self
    }

    /// Behavior used in place of directives that cannot be resolved.
    #[must_use]
    pub fn with_error_behavior(mut self, behavior: &'a dyn DirectiveBehavior) -> Self {
        self.error_behavior = Some(behavior);
        self
    }

    #[must_use]
    pub fn with_read_file(mut self, read_file: &'a ReadFileFn) -> Self {
        self.read_file = read_file;
        self
    }

    /// Base directory for resolving relative paths.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: &'a Path) -> Self {
        self.base_dir = base_dir;
        self
    }

    #[must_use]
    pub fn with_source_path(mut self, source_path: &'a Path) -> Self {
        self.source_path = Some(source_path);
        self
    }

    pub fn push_resolver(&mut self, resolver: &'a dyn NameResolver) {
        self.resolvers.push(resolver);
    }

    #[must_use]
    pub fn source(&self) -> &'a str {
        self.source
    }

    #[must_use]
    pub fn source_path(&self) -> Option<&'a Path> {
        self.source_path
    }

    /// Arena for allocations that only live until the end of the pass.
    #[must_use]
    pub fn transient(&self) -> &'a Bump {
        self.transient
    }

    #[must_use]
    pub fn variables(&self) -> &Variables {
        &*self.variables
    }

    pub fn variables_mut(&mut self) -> &mut Variables {
        &mut *self.variables
    }

    #[must_use]
    pub fn highlighter(&self) -> &'a dyn SyntaxHighlighter {
        self.highlighter
    }

    #[must_use]
    pub fn error_behavior(&self) -> Option<&'a dyn DirectiveBehavior> {
        self.error_behavior
    }

    /// Looks up a behavior, most recently pushed resolver first.
    #[must_use]
    pub fn find_behavior(&self, name: &str) -> Option<&'a dyn DirectiveBehavior> {
        self.resolvers
            .iter()
            .rev()
            .find_map(|&resolver| resolver.resolve(name))
    }

    /// Looks up the behavior of `directive`.
    #[must_use]
    pub fn find_directive(&self, directive: &Directive) -> Option<&'a dyn DirectiveBehavior> {
        self.find_behavior(directive.name(self.source))
    }

    /// Closest known directive name to `name`, if it is close enough to suggest.
    #[must_use]
    pub fn suggest_name(&self, name: &str) -> Option<String> {
        self.resolvers
            .iter()
            .rev()
            .filter_map(|&resolver| resolver.fuzzy_resolve(name))
            .min_by_key(|d| d.distance)
            .filter(|d| d.distance <= MAX_SUGGESTION_DISTANCE)
            .map(|d| d.value)
    }

    /// Resolves `relative` against the base directory.
    #[must_use]
    pub fn resolve_path(&self, relative: &str) -> PathBuf {
        self.base_dir.join(relative)
    }

    /// Resolves `relative` against the base directory, refusing paths that escape it.
    ///
    /// Returns `None` if the path does not exist or leaves the base directory.
    #[must_use]
    pub fn resolve_path_safe(&self, relative: &str) -> Option<PathBuf> {
        let canonical = self.base_dir.join(relative).canonicalize().ok()?;
        let canonical_base = self.base_dir.canonicalize().ok()?;
        canonical.starts_with(&canonical_base).then_some(canonical)
    }

    /// Reads a file through the context's file loader.
    pub fn read_file(&self, path: &Path) -> io::Result<String> {
        (self.read_file)(path)
    }

    #[must_use]
    pub fn can_log(&self, severity: Severity) -> bool {
        self.logger.can_log(severity)
    }

    /// Emits a diagnostic if the logger accepts its severity.
    pub fn diagnose(
        &self,
        severity: Severity,
        id: &'static str,
        span: Option<SourceSpan>,
        message: impl Into<String>,
    ) {
        if self.logger.can_log(severity) {
            self.logger.log(Diagnostic {
                severity,
                span,
                id,
                message: message.into(),
            });
        }
    }

    pub fn try_warning(&self, id: &'static str, span: SourceSpan, message: impl Into<String>) {
        self.diagnose(Severity::Warning, id, Some(span), message);
    }

    pub fn try_soft_warning(&self, id: &'static str, span: SourceSpan, message: impl Into<String>) {
        self.diagnose(Severity::SoftWarning, id, Some(span), message);
    }

    pub fn try_error(&self, id: &'static str, span: SourceSpan, message: impl Into<String>) {
        self.diagnose(Severity::Error, id, Some(span), message);
    }

    /// Reports that `directive` has no behavior.
    pub fn try_lookup_error(&self, directive: &Directive) {
        if !self.can_log(Severity::Error) {
            return;
        }
        let name = directive.name(self.source);
        let message = match self.suggest_name(name) {
            Some(suggestion) => format!(
                "No directive with this name exists. Did you mean \\{suggestion}?"
            ),
            None => "No directive with this name exists.".to_owned(),
        };
        tracing::debug!(name = %name, "unresolved directive");
        self.try_error("directive_lookup.unresolved", directive.span, message);
    }
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("source_len", &self.source.len())
            .field("source_path", &self.source_path)
            .field("base_dir", &self.base_dir)
            .field("resolvers", &self.resolvers.len())
            .field("variables", &self.variables)
            .field("has_error_behavior", &self.error_behavior.is_some())
            .finish_non_exhaustive()
    }
}
