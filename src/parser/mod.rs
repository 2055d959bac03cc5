//! The backtracking recursive-descent engine.
//!
//! A [`Parser`] owns the token cursor, a stack of in-progress nodes, the
//! arena of completed nodes, a stack of backtrack marks, and the recovery
//! matchers registered by enclosing `match_node_within` calls. Grammar rules
//! drive it through the methods below and never touch that state directly.
//!
//! # Node lifecycle
//!
//! `match_node` pushes a frame, runs the construct's `parse`, and pops the
//! frame again. What happens next depends on how `parse` ended:
//!
//! - **Ok**: the node is attached to its parent (or becomes the root), or its
//!   children are spliced into the parent when the construct is a helper.
//! - **Parse error before the node was sufficient**: the cursor, arena and
//!   any token insertions or splits roll back to where the node started and
//!   the error propagates. Diagnostics already reported stay; only
//!   `backtrack` erases those.
//! - **Parse error after the node was sufficient**: nothing rolls back. With
//!   recovery matchers registered for the call, the error is reported and a
//!   panic scan resynchronizes on them; otherwise the partial node is kept
//!   and the error propagates for an ancestor to handle.
//! - **Recovery interrupt**: the partial node is kept. The interrupt stops
//!   at the call whose registration it matched.
//! - **Backtrack**: the node is dropped and the interrupt propagates to the
//!   rule that set the mark.

pub mod error;
pub mod iterator;
pub mod matcher;

use std::sync::Arc;

use crate::ast::{Ast, Node, NodeId, Syntax};
use crate::diagnostics::{Diagnostic, Sentinel};
use crate::source::{SourceSegment, SourceTable};
use crate::token::{Token, TokenClass};

pub use error::{ExpectationMode, ParseError, ParseResult, ParseSignal, RecoveryInterrupt, SignalExt};
pub use iterator::TokenIterator;
pub use matcher::{Matcher, ScopeDetector};

// ============================================================================
// ENGINE STATE
// ============================================================================

/// A node whose `parse` is still running.
#[derive(Debug)]
struct Frame {
    rule: &'static str,
    helper: bool,
    /// Token position when the node started.
    start: usize,
    /// Segment of the look-ahead token when the node started.
    lookahead: SourceSegment,
    segment_start: Option<SourceSegment>,
    segment: Option<SourceSegment>,
    sufficient: bool,
    pending_sufficient: bool,
    children: Vec<NodeId>,
    arena_len: usize,
    edits_len: usize,
    marks_len: usize,
    recovery_len: usize,
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    position: usize,
    diagnostics_len: usize,
    arena_len: usize,
    edits_len: usize,
    /// Frame depth and child count of the frame that set the mark.
    depth: usize,
    children_len: usize,
}

#[derive(Debug)]
struct Registration {
    id: usize,
    matchers: Vec<Matcher>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    /// Attach on success, propagate failures.
    Match,
    /// Attach on success, report an uncommitted failure as `false`.
    Probe,
    /// Drop the node on success.
    Skip,
}

pub struct Parser<S: Syntax> {
    table: Arc<SourceTable>,
    tokens: TokenIterator,
    arena: Vec<Node<S>>,
    frames: Vec<Frame>,
    marks: Vec<Mark>,
    recovery: Vec<Registration>,
    next_registration: usize,
    diagnostics: Vec<Diagnostic>,
    root: Option<NodeId>,
}

impl<S: Syntax> Parser<S> {
    pub fn new(table: Arc<SourceTable>, tokens: Vec<Token>) -> Self {
        let tokens = TokenIterator::new(tokens, table.len());
        Self {
            table,
            tokens,
            arena: Vec::new(),
            frames: Vec::new(),
            marks: Vec::new(),
            recovery: Vec::new(),
            next_registration: 0,
            diagnostics: Vec::new(),
            root: None,
        }
    }

    // ========================================================================
    // PUBLIC API: ENTRY POINT
    // ========================================================================

    /// Parses the whole token stream as `root` and forwards every collected
    /// diagnostic to `sentinel`.
    ///
    /// Returns `Ok(None)` when the root construct failed outright. `Err` only
    /// comes from a throwing sentinel.
    pub fn parse(mut self, root: S, sentinel: &mut Sentinel) -> Result<Option<Ast<S>>, Diagnostic> {
        let rule = root.rule_name();
        match self.descend(root, &[], Call::Match) {
            Ok(_) => {}
            Err(ParseSignal::Error(error)) => self.report_in(&error, rule),
            Err(ParseSignal::Recovery(interrupt)) => {
                log::trace!("recovery interrupt {} escaped {rule}", interrupt.target);
            }
            Err(ParseSignal::Backtrack) => {
                self.internal(format!("backtrack escaped {rule} without a mark"));
            }
        }

        log::debug!(
            "parsed {}: {} nodes, {} diagnostics",
            self.table.name(),
            self.arena.len(),
            self.diagnostics.len()
        );

        let ast = self.root.map(|root| Ast::new(self.arena, root));
        for diagnostic in self.diagnostics {
            sentinel.raise(diagnostic)?;
        }
        Ok(ast)
    }

    // ========================================================================
    // PUBLIC API: STATE
    // ========================================================================

    pub fn table(&self) -> &Arc<SourceTable> {
        &self.table
    }

    pub fn tokens(&self) -> &TokenIterator {
        &self.tokens
    }

    pub fn look_ahead(&self) -> &Token {
        self.tokens.look_ahead()
    }

    pub fn latest(&self) -> &Token {
        self.tokens.latest()
    }

    pub fn position(&self) -> usize {
        self.tokens.position()
    }

    /// Diagnostics reported so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of children the current node has.
    pub fn degree(&self) -> usize {
        self.frames.last().map_or(0, |frame| frame.children.len())
    }

    pub fn is_sufficient(&self) -> bool {
        self.frames.last().is_some_and(|frame| frame.sufficient)
    }

    // ========================================================================
    // PUBLIC API: TOKEN MATCHING
    // ========================================================================

    /// Consumes the tokens described by `matcher` or fails with a parse
    /// error at the first token that does not fit. Returns the first token
    /// consumed.
    pub fn match_token(&mut self, matcher: impl Into<Matcher>) -> ParseResult<Token> {
        let matcher = matcher.into();
        match matcher.mismatch(&self.tokens) {
            None => {
                let first = self.tokens.look_ahead().clone();
                for _ in 0..matcher.len() {
                    self.tokens.next();
                }
                self.settle();
                Ok(first)
            }
            Some(offset) => Err(self.unexpected_at(matcher.describe_at(offset), offset as isize)),
        }
    }

    /// Consumes the tokens described by `matcher` if they are next.
    pub fn matches(&mut self, matcher: impl Into<Matcher>) -> bool {
        let matcher = matcher.into();
        if !matcher.matches(&self.tokens) {
            return false;
        }
        for _ in 0..matcher.len() {
            self.tokens.next();
        }
        self.settle();
        true
    }

    /// Checks the upcoming tokens without consuming them.
    pub fn lookahead_is(&self, matcher: impl Into<Matcher>) -> bool {
        matcher.into().matches(&self.tokens)
    }

    /// Like [`Parser::match_token`], but reports a mismatch instead of
    /// failing. Returns whether the tokens were there.
    pub fn match_or_report(&mut self, matcher: impl Into<Matcher>) -> bool {
        match self.match_token(matcher) {
            Ok(_) => true,
            Err(signal) => {
                if let ParseSignal::Error(error) = signal {
                    self.report(&error);
                }
                false
            }
        }
    }

    /// Consumes the look-ahead token whatever it is.
    pub fn skip_token(&mut self) -> Token {
        self.tokens.next().clone()
    }

    /// Builds a parse error expecting `expected` at the look-ahead token.
    pub fn unexpected(&self, expected: impl Into<String>) -> ParseSignal {
        self.unexpected_at(expected, 0)
    }

    /// Inserts a zero-length synthetic token at the cursor, so a rule can
    /// continue as if a missing token had been written.
    pub fn substitute(&mut self, class: TokenClass, text: &str) {
        log::trace!("substituting {class} at token {}", self.tokens.position());
        self.tokens.insert_synthetic(class, text);
    }

    /// Splits the look-ahead token after `at` bytes, e.g. `>>` into `>` `>`.
    pub fn split_look_ahead(&mut self, at: usize, first: TokenClass, second: TokenClass) {
        self.tokens.split_look_ahead(at, first, second);
    }

    // ========================================================================
    // PUBLIC API: NODE MATCHING
    // ========================================================================

    /// Parses `syntax` as a child of the current node.
    pub fn match_node(&mut self, syntax: S) -> ParseResult {
        self.match_node_within(syntax, &[])
    }

    /// Parses `syntax` as a child of the current node with `recovery`
    /// registered as resynchronization points for the duration of the call.
    pub fn match_node_within(&mut self, syntax: S, recovery: &[Matcher]) -> ParseResult {
        self.descend(syntax, recovery, Call::Match).map(drop)
    }

    /// Tries to parse `syntax`. An uncommitted failure leaves the parser as
    /// it was and returns `false`.
    pub fn matches_node(&mut self, syntax: S) -> ParseResult<bool> {
        self.descend(syntax, &[], Call::Probe)
    }

    /// Parses `syntax` and throws the node away, keeping only the consumed
    /// tokens.
    pub fn skip_node(&mut self, syntax: S) -> ParseResult {
        self.descend(syntax, &[], Call::Skip).map(drop)
    }

    // ========================================================================
    // PUBLIC API: SUFFICIENCY
    // ========================================================================

    /// Commits the current node once the next token or node match succeeds.
    pub fn next_is_sufficient(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.pending_sufficient = true;
        }
    }

    /// Commits the current node immediately.
    pub fn now_is_sufficient(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.sufficient = true;
            frame.pending_sufficient = false;
        }
    }

    // ========================================================================
    // PUBLIC API: BACKTRACKING
    // ========================================================================

    /// Snapshots the cursor, token edits, diagnostics and current node.
    pub fn mark(&mut self) {
        self.marks.push(Mark {
            position: self.tokens.position(),
            diagnostics_len: self.diagnostics.len(),
            arena_len: self.arena.len(),
            edits_len: self.tokens.edit_count(),
            depth: self.frames.len(),
            children_len: self.degree(),
        });
    }

    /// Discards the latest mark.
    pub fn unmark(&mut self) {
        self.marks.pop();
    }

    /// Pops the latest mark and returns the backtrack signal for the caller
    /// to raise. With `remark`, everything consumed, built or reported since
    /// the mark is undone first, including synthetic tokens and splits.
    pub fn backtrack(&mut self, remark: bool) -> ParseSignal {
        if let Some(mark) = self.marks.pop() {
            if remark {
                self.tokens.revert_edits(mark.edits_len);
                self.tokens.seek(mark.position);
                self.diagnostics.truncate(mark.diagnostics_len);
                self.arena.truncate(mark.arena_len);
                if let Some(frame) = mark.depth.checked_sub(1).and_then(|i| self.frames.get_mut(i)) {
                    frame.children.truncate(mark.children_len);
                }
            }
            log::trace!("backtrack to token {} (remark: {remark})", mark.position);
        }
        ParseSignal::Backtrack
    }

    // ========================================================================
    // PUBLIC API: PANIC-MODE RECOVERY
    // ========================================================================

    /// Skips tokens until one of `targets` matches outside every scope
    /// `detector` tracks, or the stream ends. Returns whether anything was
    /// skipped; callers check [`TokenClass::EndOfStream`] to tell the two
    /// stops apart.
    ///
    /// A token matching a recovery point registered by an enclosing call
    /// wins over skipping further, even inside a nested scope: the scan stops
    /// and raises a recovery interrupt aimed at that call. The one exception
    /// is a closer that balances a scope the scan itself opened.
    pub fn panic_until(&mut self, targets: &[Matcher], mut detector: ScopeDetector) -> ParseResult<bool> {
        let mut skipped = false;
        loop {
            let look_ahead = self.tokens.look_ahead();
            if look_ahead.is_end() {
                log::trace!("panic scan reached end of stream");
                return Ok(skipped);
            }
            if detector.is_outside() && targets.iter().any(|target| target.matches(&self.tokens)) {
                return Ok(skipped);
            }
            if !detector.closes_open_scope(look_ahead.class) {
                let ancestor = self
                    .recovery
                    .iter()
                    .rev()
                    .find(|registration| registration.matchers.iter().any(|m| m.matches(&self.tokens)));
                if let Some(registration) = ancestor {
                    log::trace!(
                        "panic scan hit recovery point {} at {} (depth {})",
                        registration.id,
                        look_ahead,
                        detector.depth()
                    );
                    return Err(ParseSignal::Recovery(RecoveryInterrupt {
                        target: registration.id,
                        skipped,
                    }));
                }
            }
            let class = self.tokens.next().class;
            detector.feed(class);
            skipped = true;
        }
    }

    // ========================================================================
    // PUBLIC API: REASSOCIATION
    // ========================================================================

    /// Makes the child at `index` adopt every sibling before and after it:
    /// `[a, op, b]` under `1` becomes `[op(a, b)]`. Children the adopting node
    /// already had stay between the two groups.
    ///
    /// Misuse (outside a node, or `index` past the children) leaves the tree
    /// alone and records an internal diagnostic.
    pub fn reassociate_under(&mut self, index: usize) {
        let Some(children) = self.children_for("reassociate_under", index + 1) else {
            return;
        };

        let target = children[index];
        let after: Vec<NodeId> = children.drain(index + 1..).collect();
        let before: Vec<NodeId> = children.drain(..index).collect();

        let segment = before
            .iter()
            .chain(after.iter())
            .fold(self.arena[target.0].segment, |acc, id| acc | self.arena[id.0].segment);
        let node = &mut self.arena[target.0];
        let existing = std::mem::take(&mut node.children);
        node.children = before.into_iter().chain(existing).chain(after).collect();
        node.segment = segment;
    }

    /// `[.., op, x]` becomes `[.., op(x)]`.
    pub fn reassociate_pre_unary(&mut self) {
        let Some(children) = self.children_for("reassociate_pre_unary", 2) else {
            return;
        };
        let operand = children[children.len() - 1];
        children.pop();
        let operator = children[children.len() - 1];
        self.adopt(operator, operand, false);
    }

    /// `[.., x, op]` becomes `[.., op(x)]`.
    pub fn reassociate_post_unary(&mut self) {
        let Some(children) = self.children_for("reassociate_post_unary", 2) else {
            return;
        };
        let operator = children[children.len() - 1];
        let operand = children[children.len() - 2];
        children.remove(children.len() - 2);
        self.adopt(operator, operand, true);
    }

    // ========================================================================
    // PUBLIC API: SEGMENTS AND REPORTING
    // ========================================================================

    /// Starts the current node's segment at the look-ahead token.
    pub fn begin_segment(&mut self) {
        let lookahead = self.tokens.look_ahead().segment;
        if let Some(frame) = self.frames.last_mut() {
            frame.segment_start = Some(lookahead);
        }
    }

    /// Ends the current node's segment at the latest token. The segment is
    /// kept as is when the node completes.
    pub fn end_segment(&mut self) {
        let latest = self.tokens.latest().segment;
        if let Some(frame) = self.frames.last_mut() {
            let start = frame.segment_start.unwrap_or(frame.lookahead);
            frame.segment = Some(if latest.position >= start.position {
                start | latest
            } else {
                start
            });
        }
    }

    pub fn override_segment(&mut self, segment: SourceSegment) {
        if let Some(frame) = self.frames.last_mut() {
            frame.segment = Some(segment);
        }
    }

    /// Records `error` as a diagnostic, labelled with the innermost named
    /// construct being parsed.
    pub fn report(&mut self, error: &ParseError) {
        let rule = self
            .frames
            .iter()
            .rev()
            .find(|frame| !frame.helper)
            .map_or("input", |frame| frame.rule);
        self.report_in(error, rule);
    }

    // ========================================================================
    // PRIVATE HELPERS
    // ========================================================================

    /// Children of the current node, provided there are at least `needed`.
    /// Anything else is a grammar bug and becomes an internal diagnostic.
    fn children_for(&mut self, operation: &str, needed: usize) -> Option<&mut Vec<NodeId>> {
        let found = self.frames.last().map(|frame| frame.children.len());
        match found {
            Some(len) if len >= needed => self.frames.last_mut().map(|frame| &mut frame.children),
            Some(len) => {
                self.internal(format!("{operation} needs {needed} children, the node has {len}"));
                None
            }
            None => {
                self.internal(format!("{operation} called outside of a node"));
                None
            }
        }
    }

    fn internal(&mut self, message: String) {
        log::error!("{message}");
        let diagnostic = Diagnostic::internal(message).at(&self.table, self.tokens.look_ahead().segment);
        self.diagnostics.push(diagnostic);
    }

    fn adopt(&mut self, parent: NodeId, child: NodeId, prepend: bool) {
        let segment = self.arena[parent.0].segment | self.arena[child.0].segment;
        let node = &mut self.arena[parent.0];
        if prepend {
            node.children.insert(0, child);
        } else {
            node.children.push(child);
        }
        node.segment = segment;
    }

    /// Applies a pending sufficiency request after a successful match.
    fn settle(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            if frame.pending_sufficient {
                frame.sufficient = true;
                frame.pending_sufficient = false;
            }
        }
    }

    fn unexpected_at(&self, expected: impl Into<String>, offset: isize) -> ParseSignal {
        let found = self.tokens.peek(offset).clone();
        let previous = self.tokens.peek(offset - 1);
        let (anchor, mode) = if previous.is(TokenClass::NoToken) {
            (None, ExpectationMode::Before)
        } else if found.is_end() || self.starts_new_line(previous, &found) {
            (Some(previous.clone()), ExpectationMode::After)
        } else {
            (Some(previous.clone()), ExpectationMode::InsteadOf)
        };
        ParseSignal::Error(ParseError::new(expected, found, anchor, mode))
    }

    fn starts_new_line(&self, previous: &Token, found: &Token) -> bool {
        self.table.coords_of(found.segment.position).row
            > self.table.coords_of(previous.segment.end().saturating_sub(1)).row
    }

    fn report_in(&mut self, error: &ParseError, rule: &str) {
        log::trace!("report in {rule}: {error}");
        let diagnostic = Diagnostic::syntax(error.message())
            .at(&self.table, error.segment())
            .within(format!("while parsing {rule}"));
        self.diagnostics.push(diagnostic);
    }

    fn descend(&mut self, mut syntax: S, recovery: &[Matcher], call: Call) -> ParseResult<bool> {
        let recovery_len = self.recovery.len();
        let registration = if recovery.is_empty() {
            None
        } else {
            let id = self.next_registration;
            self.next_registration += 1;
            self.recovery.push(Registration {
                id,
                matchers: recovery.to_vec(),
            });
            Some(id)
        };

        self.frames.push(Frame {
            rule: syntax.rule_name(),
            helper: syntax.is_helper(),
            start: self.tokens.position(),
            lookahead: self.tokens.look_ahead().segment,
            segment_start: None,
            segment: None,
            sufficient: false,
            pending_sufficient: false,
            children: Vec::new(),
            arena_len: self.arena.len(),
            edits_len: self.tokens.edit_count(),
            marks_len: self.marks.len(),
            recovery_len,
        });

        let outcome = syntax.parse(self);

        let Some(frame) = self.frames.pop() else {
            self.recovery.truncate(recovery_len);
            self.internal(format!("node stack underflow after parsing {}", syntax.rule_name()));
            return Ok(false);
        };
        self.recovery.truncate(frame.recovery_len);
        self.marks.truncate(frame.marks_len);

        match outcome {
            Ok(()) => {
                self.complete(syntax, frame, call);
                self.settle();
                Ok(true)
            }
            Err(ParseSignal::Error(error)) if !frame.sufficient => {
                self.arena.truncate(frame.arena_len);
                self.tokens.revert_edits(frame.edits_len);
                self.tokens.seek(frame.start);
                match call {
                    Call::Probe => Ok(false),
                    _ => Err(ParseSignal::Error(error)),
                }
            }
            Err(ParseSignal::Error(error)) => {
                if recovery.is_empty() {
                    self.complete(syntax, frame, call);
                    return Err(ParseSignal::Error(error));
                }
                self.report_in(&error, frame.rule);
                let resync = self.panic_until(recovery, ScopeDetector::standard());
                self.complete(syntax, frame, call);
                resync?;
                self.settle();
                Ok(true)
            }
            Err(ParseSignal::Recovery(interrupt)) => {
                self.complete(syntax, frame, call);
                if registration == Some(interrupt.target) {
                    log::trace!("recovery interrupt {} caught", interrupt.target);
                    self.settle();
                    Ok(true)
                } else {
                    Err(ParseSignal::Recovery(interrupt))
                }
            }
            Err(ParseSignal::Backtrack) => {
                self.arena.truncate(frame.arena_len);
                Err(ParseSignal::Backtrack)
            }
        }
    }

    /// Pops a finished node into the tree.
    fn complete(&mut self, syntax: S, frame: Frame, call: Call) {
        if call == Call::Skip {
            self.arena.truncate(frame.arena_len);
            return;
        }

        if frame.helper {
            if let Some(parent) = self.frames.last_mut() {
                parent.children.extend(frame.children);
                return;
            }
        }

        let segment = frame.segment.unwrap_or_else(|| {
            if self.tokens.position() > frame.start {
                frame.lookahead | self.tokens.latest().segment
            } else {
                frame.lookahead
            }
        });
        let id = NodeId(self.arena.len());
        self.arena.push(Node {
            syntax,
            segment,
            sufficient: frame.sufficient,
            children: frame.children,
        });
        match self.frames.last_mut() {
            Some(parent) => parent.children.push(id),
            None => self.root = Some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    /// `list := '[' item (',' item)* ']'`, `item := identifier`, committed
    /// after the opening bracket. `Lopsided` folds children it does not have.
    #[derive(Debug, Clone, PartialEq)]
    enum Probe {
        List,
        Item(String),
        Lopsided,
    }

    impl Syntax for Probe {
        fn rule_name(&self) -> &'static str {
            match self {
                Probe::List => "list",
                Probe::Item(_) => "item",
                Probe::Lopsided => "lopsided",
            }
        }

        fn detail(&self) -> Option<String> {
            match self {
                Probe::Item(name) => Some(name.clone()),
                Probe::List | Probe::Lopsided => None,
            }
        }

        fn parse(&mut self, parser: &mut Parser<Self>) -> ParseResult {
            match self {
                Probe::List => {
                    parser.next_is_sufficient();
                    parser.match_token(TokenClass::OpenBracket)?;
                    loop {
                        parser.match_node(Probe::Item(String::new()))?;
                        if !parser.matches(TokenClass::Comma) {
                            break;
                        }
                    }
                    parser.match_token(TokenClass::CloseBracket)?;
                    Ok(())
                }
                Probe::Item(name) => {
                    *name = parser.match_token(TokenClass::Identifier)?.text;
                    Ok(())
                }
                Probe::Lopsided => {
                    parser.match_node(Probe::Item(String::new()))?;
                    parser.reassociate_under(1);
                    parser.reassociate_post_unary();
                    Ok(())
                }
            }
        }
    }

    fn parser(src: &str) -> Parser<Probe> {
        let table = Arc::new(SourceTable::from_text("probe", src));
        let (tokens, _) = tokenize(&table);
        Parser::new(table, tokens)
    }

    #[test]
    fn builds_a_tree() {
        let mut sentinel = Sentinel::collecting();
        let ast = parser("[a, b]").parse(Probe::List, &mut sentinel).unwrap().unwrap();
        assert_eq!(ast.sexp(ast.root()), "(list (item a) (item b))");
        assert!(sentinel.is_empty());
    }

    #[test]
    fn uncommitted_root_failure_yields_no_tree() {
        let mut sentinel = Sentinel::collecting();
        let ast = parser("a").parse(Probe::List, &mut sentinel).unwrap();
        assert!(ast.is_none());
        assert_eq!(sentinel.diagnostics()[0].message(), "expected '[' before 'a'");
    }

    #[test]
    fn committed_failure_keeps_the_partial_tree() {
        let mut sentinel = Sentinel::collecting();
        let ast = parser("[a, ]").parse(Probe::List, &mut sentinel).unwrap().unwrap();
        assert_eq!(ast.sexp(ast.root()), "(list (item a))");
        assert_eq!(
            sentinel.diagnostics()[0].message(),
            "expected identifier instead of ']'"
        );
    }

    #[test]
    fn misused_reassociation_becomes_an_internal_diagnostic() {
        let mut sentinel = Sentinel::collecting();
        let ast = parser("a").parse(Probe::Lopsided, &mut sentinel).unwrap().unwrap();
        assert_eq!(ast.sexp(ast.root()), "(lopsided (item a))");
        let messages: Vec<&str> = sentinel.diagnostics().iter().map(|d| d.message()).collect();
        assert_eq!(
            messages,
            [
                "reassociate_under needs 2 children, the node has 1",
                "reassociate_post_unary needs 2 children, the node has 1",
            ]
        );
        assert!(sentinel
            .diagnostics()
            .iter()
            .all(|d| d.kind() == crate::diagnostics::DiagnosticKind::Internal));
    }
}
