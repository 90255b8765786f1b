// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The tree visitor trait.

use std::rc::Rc;

use crate::tree::*;
use crate::visitor::cursor::Cursor;

/// Result of visiting an element that lives in a list.
///
/// Statements in a block can be removed or replaced by several statements;
/// everywhere else a visit returns exactly one value.
#[derive(Debug, Clone)]
pub enum Transform<T> {
    /// Keep the (possibly rewritten) element.
    Keep(T),
    /// Drop the element from its list.
    Remove,
    /// Replace the element with several elements.
    Flatten(Vec<T>),
}

impl<T> Transform<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep(_))
    }

    pub fn map<U, F: FnMut(T) -> U>(self, mut f: F) -> Transform<U> {
        match self {
            Transform::Keep(t) => Transform::Keep(f(t)),
            Transform::Remove => Transform::Remove,
            Transform::Flatten(v) => Transform::Flatten(v.into_iter().map(f).collect()),
        }
    }
}

impl<T> From<T> for Transform<T> {
    fn from(value: T) -> Self {
        Transform::Keep(value)
    }
}

/// Traversal state every visitor carries.
#[derive(Debug, Default)]
pub struct VisitState {
    pub cursor: Cursor,
    stop_after: Option<TreeId>,
    stopped: bool,
    renew_ids: bool,
}

impl VisitState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State whose cursor starts at `cursor` instead of the root.
    pub fn with_cursor(cursor: Cursor) -> Self {
        VisitState {
            cursor,
            ..Self::default()
        }
    }

    /// State for a traversal that gives every visited node a fresh id, so a
    /// copied subtree can live next to its original.
    pub fn renewing_ids() -> Self {
        VisitState {
            renew_ids: true,
            ..Self::default()
        }
    }

    pub fn renews_ids(&self) -> bool {
        self.renew_ids
    }

    /// Ends the traversal once the node with `id` has been visited.
    pub fn stop_after(&mut self, id: TreeId) {
        self.stop_after = Some(id);
    }

    /// Ends the traversal now; the remaining nodes are returned untouched.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub(crate) fn finished(&mut self, id: TreeId) {
        if self.stop_after == Some(id) {
            self.stopped = true;
        }
    }
}

/// Generates one `visit_<kind>` method per node kind. The default walks the
/// node's children and rebuilds it only when one of them changed.
macro_rules! visitor_methods {
    ($($node:ident),* $(,)?) => {
        paste::paste! {
            $(
                #[doc = concat!("Visit a [`", stringify!($node), "`].")]
                fn [<visit_ $node:snake>](&mut self, node: Rc<$node>, p: &mut P) -> Rc<$node> {
                    node.walk_children(self, p)
                }
            )*
        }
    };
}

/// A depth-first rewriting traversal.
///
/// Each node kind has a `visit_*` method taking the node and returning its
/// replacement; returning the same `Rc` means "unchanged", and ancestors are
/// rebuilt only along paths where something changed. Replacing a node with a
/// different kind happens one level up, in [`visit_expression`] or
/// [`visit_statement`].
///
/// [`visit_expression`]: TreeVisitor::visit_expression
/// [`visit_statement`]: TreeVisitor::visit_statement
///
/// # Example
///
/// ```ignore
/// struct Rename(VisitState);
///
/// impl<P> TreeVisitor<P> for Rename {
///     fn state(&self) -> &VisitState { &self.0 }
///     fn state_mut(&mut self) -> &mut VisitState { &mut self.0 }
///
///     fn visit_identifier(&mut self, node: Rc<Identifier>, _p: &mut P) -> Rc<Identifier> {
///         if node.simple_name == "old" {
///             return node.with_simple_name("new".to_string());
///         }
///         node
///     }
/// }
/// ```
pub trait TreeVisitor<P> {
    fn state(&self) -> &VisitState;
    fn state_mut(&mut self) -> &mut VisitState;

    fn cursor(&self) -> &Cursor {
        &self.state().cursor
    }

    fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.state_mut().cursor
    }

    /// Whether this visitor should run on `source` at all.
    fn is_acceptable(&self, _source: &SourceFile, _p: &P) -> bool {
        true
    }

    /// Called for every node before its `visit_*` method.
    fn pre_visit(&mut self, _tree: &Tree, _p: &mut P) {}

    /// Called for every node after its `visit_*` method, with the result.
    fn post_visit(&mut self, _tree: &Tree, _p: &mut P) {}

    /// Visits any node.
    fn visit(&mut self, tree: Tree, p: &mut P) -> Tree {
        tree.accept_variant(self, p)
    }

    fn visit_source_file(&mut self, source: SourceFile, p: &mut P) -> SourceFile {
        source.accept_variant(self, p)
    }

    /// Visits a node in value position; override to replace it with another
    /// kind of expression.
    fn visit_expression(&mut self, expression: Expression, p: &mut P) -> Expression {
        expression.accept_variant(self, p)
    }

    fn visit_statement(&mut self, statement: Statement, p: &mut P) -> Statement {
        statement.accept_variant(self, p)
    }

    /// Visits a statement held in a list; override to remove it or splice
    /// in several statements.
    fn visit_statement_in_list(&mut self, statement: Statement, p: &mut P) -> Transform<Statement> {
        Transform::Keep(self.visit_statement(statement, p))
    }

    fn visit_space(&mut self, space: Space, _p: &mut P) -> Space {
        space
    }

    /// The space after a right-padded element, before its delimiter.
    fn visit_right_padding(&mut self, after: Space, p: &mut P) -> Space {
        self.visit_space(after, p)
    }

    /// The space before a left-padded element's keyword or operator.
    fn visit_left_padding(&mut self, before: Space, p: &mut P) -> Space {
        self.visit_space(before, p)
    }

    /// The space before a container's opening delimiter.
    fn visit_container_padding(&mut self, before: Space, p: &mut P) -> Space {
        self.visit_space(before, p)
    }

    fn visit_markers(&mut self, markers: Markers, p: &mut P) -> Markers {
        if markers.is_empty() {
            return markers;
        }
        let id = markers.id;
        let visited = markers
            .iter()
            .cloned()
            .map(|marker| self.visit_marker(marker, p))
            .collect::<Vec<_>>();
        if visited == markers.markers {
            return markers;
        }
        Markers {
            id,
            markers: visited,
        }
    }

    fn visit_marker(&mut self, marker: Marker, _p: &mut P) -> Marker {
        marker
    }

    visitor_methods! {
        // Shared
        Identifier,
        Literal,
        Assignment,
        AssignmentOp,
        Binary,
        Unary,
        FieldAccess,
        MethodInvocation,
        ArrayAccess,
        ArrayDimension,
        Parentheses,
        ControlParentheses,
        Block,
        If,
        Else,
        WhileLoop,
        ForEachLoop,
        ForEachControl,
        Try,
        Catch,
        Resource,
        Throw,
        Return,
        Break,
        Continue,
        Assert,
        Switch,
        Case,
        Lambda,
        LambdaParameters,
        MethodDeclaration,
        ClassDeclaration,
        ClassKind,
        VariableDeclarations,
        NamedVariable,
        Import,
        Annotation,
        NewArray,
        Modifier,
        Ternary,
        Yield,
        ParameterizedType,
        TypeParameter,
        TypeParameters,
        Empty,
        ParseError,
    }

    visitor_methods! {
        // Python
        CompilationUnit,
        Async,
        Await,
        PyBinary,
        ChainedAssignment,
        CollectionLiteral,
        ComprehensionExpression,
        ComprehensionClause,
        ComprehensionCondition,
        Del,
        DictLiteral,
        ErrorFrom,
        ExceptionType,
        ExpressionStatement,
        ExpressionTypeTree,
        FormattedString,
        FormattedStringValue,
        KeyValue,
        LiteralType,
        MatchCase,
        MatchPattern,
        MultiImport,
        NamedArgument,
        Pass,
        Slice,
        SpecialParameter,
        Star,
        StatementExpression,
        TrailingElseWrapper,
        TypeAlias,
        TypeHint,
        TypeHintedExpression,
        UnionType,
        VariableScope,
        YieldFrom,
    }
}

/// Visits one node: maintains the cursor, calls the hooks and dispatches to
/// the node's `visit_*` method.
pub fn visit_node<P, V: TreeVisitor<P> + ?Sized, T: Node>(
    v: &mut V,
    node: Rc<T>,
    p: &mut P,
) -> Rc<T> {
    if v.state().is_stopped() {
        return node;
    }
    let id = node.id();
    let tree = node.clone().into_tree();
    v.cursor_mut().push(tree.clone());
    v.pre_visit(&tree, p);
    let mut result = node.accept(v, p);
    if v.state().renews_ids() {
        result = result.with_id(random_id());
    }
    v.post_visit(&result.clone().into_tree(), p);
    v.cursor_mut().pop();
    v.state_mut().finished(id);
    result
}

/// A visitor with no behavior of its own; useful for walking a tree only
/// for the cursor hooks.
#[derive(Debug, Default)]
pub struct NoopVisitor {
    state: VisitState,
}

impl<P> TreeVisitor<P> for NoopVisitor {
    fn state(&self) -> &VisitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VisitState {
        &mut self.state
    }
}
