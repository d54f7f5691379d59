//! The batch scanner: a pull-based iterator of fully expanded batches.
//!
//! One forward pass per script. Each batch starts in substring mode, where
//! the batch-to-be is a zero-copy slice of the input; the first substitution
//! or directive forces the one-way transition to builder mode, which
//! accumulates into the preprocessor's scratch buffer. Included files are
//! scanned through a segment stack so their content behaves as if spliced at
//! the directive line, inside the same batch and mode.

use alloc::{
    borrow::{Cow, ToOwned},
    string::String,
    vec::Vec,
};

use crate::{
    directive,
    error::{DirectiveKind, PreprocessError},
    loader::ScriptLoader,
    matcher::{self, TokenKind},
    options::PreprocessorOptions,
    scratch::ScratchBuffer,
    variables::VariableTable,
};

/// The script preprocessor.
///
/// One instance owns the variable table and the scratch buffer, both reused
/// across [`process`] calls. The `&mut self` receiver on [`process`] makes
/// concurrent or reentrant use a compile error rather than a runtime hazard.
///
/// [`process`]: Preprocessor::process
pub struct Preprocessor<L> {
    loader: L,
    options: PreprocessorOptions,
    variables: VariableTable,
    scratch: ScratchBuffer,
}

impl<L: ScriptLoader> Preprocessor<L> {
    /// Creates a preprocessor resolving `:r` targets through `loader`.
    pub fn with_loader(loader: L, options: PreprocessorOptions) -> Self {
        Self {
            loader,
            options,
            variables: VariableTable::new(),
            scratch: ScratchBuffer::new(),
        }
    }

    /// The variable table.
    #[must_use]
    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    /// The variable table, for the host to populate before or between
    /// [`process`](Preprocessor::process) calls.
    pub fn variables_mut(&mut self) -> &mut VariableTable {
        &mut self.variables
    }

    /// Splits `script` into fully expanded batches, lazily.
    ///
    /// Nothing is scanned until the returned iterator is pulled, and the
    /// scan for a batch does not begin until the previous one has been
    /// consumed. An empty script yields an empty sequence. After an error
    /// the iterator is fused; batches already yielded remain valid.
    pub fn process<'p, 'src>(&'p mut self, script: &'src str) -> Batches<'p, 'src, L> {
        self.scratch.clear();
        Batches {
            pre: self,
            script,
            root_pos: 0,
            frames: Vec::new(),
            mode: Mode::Substring,
            batch_start: 0,
            done: false,
        }
    }
}

#[cfg(feature = "std")]
impl Preprocessor<crate::loader::FileLoader> {
    /// Creates a preprocessor reading include targets from the filesystem
    /// as strict UTF-8.
    #[must_use]
    pub fn new(options: PreprocessorOptions) -> Self {
        Self::with_loader(crate::loader::FileLoader::default(), options)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Substring,
    Builder,
}

/// One level of `:r` inclusion: the loaded text and the scan position in it.
#[derive(Debug)]
struct Frame {
    text: String,
    pos: usize,
}

/// Lazy sequence of batches produced by [`Preprocessor::process`].
///
/// Yields `Cow::Borrowed` slices of the input for batches that required no
/// expansion and lie entirely in the root script, and owned strings
/// otherwise. Fused after the first error or the final batch.
pub struct Batches<'p, 'src, L: ScriptLoader> {
    pre: &'p mut Preprocessor<L>,
    script: &'src str,
    root_pos: usize,
    frames: Vec<Frame>,
    mode: Mode,
    /// Start of the current batch within the segment that was current when
    /// the batch began. Only meaningful in substring mode, which never
    /// crosses segments.
    batch_start: usize,
    done: bool,
}

enum Step<'src> {
    Continue,
    Batch(Cow<'src, str>),
    End(Option<Cow<'src, str>>),
}

impl<'src, L: ScriptLoader> Batches<'_, 'src, L> {
    /// Consumes one token (or one segment end) and reports what happened.
    fn step(&mut self) -> Result<Step<'src>, PreprocessError<L::Error>> {
        let (tok, pos) = match self.frames.last() {
            Some(f) => (matcher::next_token(&f.text, f.pos), f.pos),
            None => (matcher::next_token(self.script, self.root_pos), self.root_pos),
        };
        let Some(tok) = tok else {
            return Ok(self.end_of_segment());
        };

        // In builder mode the plain text between the previous position and
        // this token belongs to the batch and is copied through.
        if self.mode == Mode::Builder && tok.start > pos {
            let text = match self.frames.last() {
                Some(f) => f.text.as_str(),
                None => self.script,
            };
            self.pre.scratch.push_str(&text[pos..tok.start]);
        }

        match tok.kind {
            TokenKind::LineComment | TokenKind::BlockComment => {
                // Comments are inert: skipped over in substring mode, echoed
                // verbatim in builder mode.
                if self.mode == Mode::Builder {
                    let text = match self.frames.last() {
                        Some(f) => f.text.as_str(),
                        None => self.script,
                    };
                    self.pre.scratch.push_str(&text[tok.start..tok.end]);
                }
                self.advance(tok.end);
            }
            TokenKind::QuotedString | TokenKind::QuotedIdentifier => {
                let has_reference = {
                    let text = match self.frames.last() {
                        Some(f) => f.text.as_str(),
                        None => self.script,
                    };
                    matcher::contains_reference(&text[tok.start..tok.end])
                };
                if has_reference {
                    self.ensure_builder(tok.start);
                    self.substitute_span(tok.start, tok.end)?;
                } else if self.mode == Mode::Builder {
                    let text = match self.frames.last() {
                        Some(f) => f.text.as_str(),
                        None => self.script,
                    };
                    self.pre.scratch.push_str(&text[tok.start..tok.end]);
                }
                self.advance(tok.end);
            }
            TokenKind::VariableReference {
                name_start,
                name_end,
            } => {
                self.ensure_builder(tok.start);
                let text = match self.frames.last() {
                    Some(f) => f.text.as_str(),
                    None => self.script,
                };
                let name = &text[name_start..name_end];
                match self.pre.variables.get(name) {
                    Some(value) => self.pre.scratch.push_str(value),
                    None => {
                        return Err(PreprocessError::UndefinedVariable {
                            name: name.to_owned(),
                        });
                    }
                }
                self.advance(tok.end);
            }
            TokenKind::BatchSeparator => {
                let batch = self.finish_batch(tok.start);
                self.advance(tok.end);
                self.mode = Mode::Substring;
                self.batch_start = match self.frames.last() {
                    Some(f) => f.pos,
                    None => self.root_pos,
                };
                return Ok(match batch {
                    Some(b) => Step::Batch(b),
                    None => Step::Continue,
                });
            }
            TokenKind::Include {
                args_start,
                args_end,
            } => {
                self.ensure_builder(tok.start);
                let path = {
                    let text = match self.frames.last() {
                        Some(f) => f.text.as_str(),
                        None => self.script,
                    };
                    directive::parse_include_args(&text[args_start..args_end])
                };
                let Some(path) = path else {
                    return Err(PreprocessError::DirectiveSyntax {
                        directive: DirectiveKind::Include,
                    });
                };
                self.advance(tok.end);
                let loaded = self
                    .pre
                    .loader
                    .load(&path)
                    .map_err(|source| PreprocessError::Include {
                        path: path.clone(),
                        source,
                    })?;
                self.frames.push(Frame {
                    text: loaded,
                    pos: 0,
                });
            }
            TokenKind::Setvar {
                args_start,
                args_end,
            } => {
                self.ensure_builder(tok.start);
                let parsed = {
                    let text = match self.frames.last() {
                        Some(f) => f.text.as_str(),
                        None => self.script,
                    };
                    directive::parse_setvar_args(&text[args_start..args_end])
                };
                let Some((name, value)) = parsed else {
                    return Err(PreprocessError::DirectiveSyntax {
                        directive: DirectiveKind::Setvar,
                    });
                };
                let value = if self.pre.options.variable_replacement_in_setvar {
                    let mut expanded = String::new();
                    directive::substitute(&value, &self.pre.variables, |s| {
                        expanded.push_str(s);
                    })
                    .map_err(|name| PreprocessError::UndefinedVariable { name })?;
                    expanded
                } else {
                    value
                };
                self.pre.variables.set(&name, value);
                self.advance(tok.end);
            }
        }
        Ok(Step::Continue)
    }

    /// Moves the scan position of the current segment to `to`.
    fn advance(&mut self, to: usize) {
        match self.frames.last_mut() {
            Some(f) => f.pos = to,
            None => self.root_pos = to,
        }
    }

    /// One-way transition into builder mode: everything scanned so far in
    /// this batch is copied into the scratch buffer before the triggering
    /// token's effect is applied, so substring-mode progress is never lost.
    fn ensure_builder(&mut self, upto: usize) {
        if self.mode == Mode::Substring {
            let text = match self.frames.last() {
                Some(f) => f.text.as_str(),
                None => self.script,
            };
            self.pre.scratch.push_str(&text[self.batch_start..upto]);
            self.mode = Mode::Builder;
        }
    }

    /// Substitutes every reference inside a quoted span, copying the
    /// non-reference remainder verbatim. Builder mode only.
    fn substitute_span(&mut self, start: usize, end: usize) -> Result<(), PreprocessError<L::Error>> {
        let text = match self.frames.last() {
            Some(f) => f.text.as_str(),
            None => self.script,
        };
        let scratch = &mut self.pre.scratch;
        directive::substitute(&text[start..end], &self.pre.variables, |s| {
            scratch.push_str(s);
        })
        .map_err(|name| PreprocessError::UndefinedVariable { name })
    }

    /// Closes the batch at `upto` in the current segment. Returns `None` for
    /// an empty batch, which is suppressed rather than yielded.
    fn finish_batch(&mut self, upto: usize) -> Option<Cow<'src, str>> {
        match self.mode {
            Mode::Substring => match self.frames.last() {
                Some(f) => {
                    let s = &f.text[self.batch_start..upto];
                    if s.is_empty() {
                        None
                    } else {
                        Some(Cow::Owned(s.to_owned()))
                    }
                }
                None => {
                    let script: &'src str = self.script;
                    let s = &script[self.batch_start..upto];
                    if s.is_empty() { None } else { Some(Cow::Borrowed(s)) }
                }
            },
            Mode::Builder => {
                if self.pre.scratch.is_empty() {
                    None
                } else {
                    Some(Cow::Owned(self.pre.scratch.take_batch()))
                }
            }
        }
    }

    /// Handles a segment running out of tokens: an exhausted include frame
    /// merges into the enclosing segment within the same batch, while the
    /// root segment's end closes the final batch and the whole scan.
    fn end_of_segment(&mut self) -> Step<'src> {
        if self.frames.is_empty() {
            let batch = match self.mode {
                Mode::Substring => {
                    let script: &'src str = self.script;
                    let s = &script[self.batch_start..];
                    if s.is_empty() { None } else { Some(Cow::Borrowed(s)) }
                }
                Mode::Builder => {
                    let script = self.script;
                    self.pre.scratch.push_str(&script[self.root_pos..]);
                    self.root_pos = script.len();
                    if self.pre.scratch.is_empty() {
                        None
                    } else {
                        Some(Cow::Owned(self.pre.scratch.take_batch()))
                    }
                }
            };
            return Step::End(batch);
        }
        if self.mode == Mode::Substring {
            if let Some(f) = self.frames.last() {
                self.pre.scratch.push_str(&f.text[self.batch_start..]);
            }
            self.mode = Mode::Builder;
        } else if let Some(f) = self.frames.last() {
            // Builder mode: trailing unscanned text of the frame (plain text
            // after its last token) still belongs to the batch.
            self.pre.scratch.push_str(&f.text[f.pos..]);
        }
        self.frames.pop();
        Step::Continue
    }
}

impl<'src, L: ScriptLoader> Iterator for Batches<'_, 'src, L> {
    type Item = Result<Cow<'src, str>, PreprocessError<L::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.step() {
                Ok(Step::Continue) => {}
                Ok(Step::Batch(b)) => return Some(Ok(b)),
                Ok(Step::End(b)) => {
                    self.done = true;
                    return b.map(Ok);
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<L: ScriptLoader> core::iter::FusedIterator for Batches<'_, '_, L> {}
