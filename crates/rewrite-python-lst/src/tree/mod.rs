// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The lossless semantic tree.
//!
//! Every node is an immutable struct behind an `Rc`. Nodes carry an id, the
//! whitespace and comments before them (`prefix`) and a set of markers; the
//! rest of their formatting lives in the padding wrappers around their
//! children. Printing a tree reproduces its source byte for byte.
//!
//! Node kinds are grouped by the positions they may occupy:
//! - [`Expression`]: anything that produces a value
//! - [`Statement`]: anything that can stand in a block
//! - [`SourceFile`]: the root of a parse
//! - [`Tree`]: any node at all

#[macro_use]
mod macros;

pub mod adapters;
pub mod j;
pub mod kinds;
pub mod literal;
pub mod markers;
pub mod matching;
pub mod padding;
pub mod py;
pub mod registry;
pub mod source;
pub mod space;

use std::fmt::Debug;
use std::rc::Rc;

pub use adapters::{ExpressionStatement, StatementExpression};
pub use j::*;
pub use kinds::*;
pub use markers::{Marker, Markers, QuoteStyle};
pub use padding::{Container, LeftPadded, RightPadded};
pub use py::*;
pub use source::{Checksum, CompilationUnit, FileAttributes, ParseError};
pub use space::{Comment, Space};

use crate::tree::matching::Matcher;
use crate::visitor::TreeVisitor;

/// Node ids are random UUIDs; they survive every transformation that keeps
/// the node.
pub type TreeId = uuid::Uuid;

pub fn random_id() -> TreeId {
    uuid::Uuid::new_v4()
}

/// Which printer owns a node kind: the shared delegate or the Python one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Family {
    Shared,
    Python,
}

/// Behavior common to every node struct.
pub trait Node: Sized + Clone + Debug + 'static {
    /// Fully qualified type name used on the wire.
    const WIRE_TYPE: &'static str;
    const FAMILY: Family;
    /// Short kind name, e.g. `Binary`.
    const KIND: &'static str;

    fn id(&self) -> TreeId;
    fn prefix(&self) -> &Space;
    fn markers(&self) -> &Markers;

    fn with_id(self: Rc<Self>, id: TreeId) -> Rc<Self>;
    fn with_prefix(self: Rc<Self>, prefix: Space) -> Rc<Self>;
    fn with_markers(self: Rc<Self>, markers: Markers) -> Rc<Self>;

    fn into_tree(self: Rc<Self>) -> Tree;
    fn from_tree(tree: &Tree) -> Option<&Rc<Self>>;

    /// Dispatches to the visitor method for this kind.
    fn accept<P, V: TreeVisitor<P> + ?Sized>(self: Rc<Self>, v: &mut V, p: &mut P) -> Rc<Self>;

    /// Visits prefix, markers and children in print order and rebuilds the
    /// node only where something changed.
    fn walk_children<P, V: TreeVisitor<P> + ?Sized>(
        self: Rc<Self>,
        v: &mut V,
        p: &mut P,
    ) -> Rc<Self>;

    /// Structural comparison of the semantic fields.
    fn match_fields(&self, other: &Self, m: &mut dyn Matcher) -> bool;
}

/// Narrowing conversion from [`Tree`] into a category.
pub trait FromTree: Sized {
    fn from_tree(tree: Tree) -> Result<Self, Tree>;
}

tree_category! {
    /// A node in value position.
    Expression {
        Identifier,
        Literal,
        Assignment,
        Binary,
        Unary,
        FieldAccess,
        MethodInvocation,
        ArrayAccess,
        Parentheses,
        Lambda,
        NewArray,
        Ternary,
        Yield,
        ParameterizedType,
        Empty,
        Await,
        PyBinary,
        CollectionLiteral,
        ComprehensionExpression,
        DictLiteral,
        ErrorFrom,
        ExpressionTypeTree,
        FormattedString,
        FormattedStringValue,
        KeyValue,
        LiteralType,
        MatchCase,
        MatchPattern,
        NamedArgument,
        Slice,
        SpecialParameter,
        Star,
        StatementExpression,
        TypeHintedExpression,
        UnionType,
        YieldFrom,
    }
}

tree_category! {
    /// A node that can stand in a block.
    Statement {
        Assignment,
        AssignmentOp,
        Block,
        If,
        WhileLoop,
        ForEachLoop,
        Try,
        Throw,
        Return,
        Break,
        Continue,
        Assert,
        Switch,
        Case,
        MethodDeclaration,
        ClassDeclaration,
        VariableDeclarations,
        Empty,
        Async,
        ChainedAssignment,
        Del,
        ExpressionStatement,
        MultiImport,
        Pass,
        TrailingElseWrapper,
        TypeAlias,
        VariableScope,
    }
}

tree_category! {
    /// The root of a parse: a compilation unit, or the verbatim text of a
    /// file that failed to parse.
    SourceFile {
        CompilationUnit,
        ParseError,
    }
}

tree_category! {
    @define
    /// Any node.
    Tree {
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

impl Tree {
    pub fn to_tree(&self) -> Tree {
        self.clone()
    }

    /// The node as an expression, if its kind can stand in value position.
    pub fn as_expression(&self) -> Option<Expression> {
        Expression::from_tree(self.clone()).ok()
    }

    pub fn as_statement(&self) -> Option<Statement> {
        Statement::from_tree(self.clone()).ok()
    }

    pub fn as_source_file(&self) -> Option<SourceFile> {
        SourceFile::from_tree(self.clone()).ok()
    }

    /// Borrows the node as a concrete kind.
    pub fn downcast<T: Node>(&self) -> Option<&Rc<T>> {
        T::from_tree(self)
    }

    pub fn is<T: Node>(&self) -> bool {
        T::from_tree(self).is_some()
    }
}

impl FromTree for Tree {
    fn from_tree(tree: Tree) -> Result<Self, Tree> {
        Ok(tree)
    }
}

impl matching::Match for Tree {
    fn matches(&self, other: &Self, m: &mut dyn Matcher) -> bool {
        matching::trees_match(self, other, m)
    }

    fn as_tree(&self) -> Option<Tree> {
        Some(self.clone())
    }
}

impl Expression {
    /// Wraps the expression so it can stand in a block.
    pub fn into_statement(self) -> Statement {
        match self {
            Expression::StatementExpression(wrapper) => wrapper.statement.clone(),
            Expression::Assignment(node) => Statement::Assignment(node),
            Expression::Empty(node) => Statement::Empty(node),
            other => Statement::ExpressionStatement(Rc::new(ExpressionStatement::new(other))),
        }
    }
}

impl Statement {
    /// Unwraps or wraps the statement so it can stand in value position.
    pub fn into_expression(self) -> Expression {
        match self {
            Statement::ExpressionStatement(wrapper) => wrapper.expression.clone(),
            Statement::Assignment(node) => Expression::Assignment(node),
            Statement::Empty(node) => Expression::Empty(node),
            other => Expression::StatementExpression(Rc::new(StatementExpression::new(other))),
        }
    }
}

impl SourceFile {
    pub fn source_path(&self) -> &str {
        match self {
            SourceFile::CompilationUnit(cu) => &cu.source_path,
            SourceFile::ParseError(error) => &error.source_path,
        }
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, SourceFile::ParseError(_))
    }
}

/// An empty node with no formatting.
pub fn empty() -> Rc<Empty> {
    Rc::new(Empty::new(Space::EMPTY, Markers::EMPTY))
}

/// An identifier with the given prefix.
pub fn identifier(prefix: Space, name: impl Into<String>) -> Rc<Identifier> {
    Rc::new(Identifier::new(prefix, Markers::EMPTY, name.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_narrow_from_tree() {
        let tree = identifier(Space::EMPTY, "x").into_tree();
        assert!(tree.as_expression().is_some());
        assert!(tree.as_statement().is_none());
        assert_eq!(tree.kind(), "Identifier");
        assert_eq!(tree.family(), Family::Shared);
        assert!(tree.is::<Identifier>());
    }

    #[test]
    fn expression_statement_round_trip() {
        let call: Expression = identifier(Space::new(" "), "f").into();
        let statement = call.clone().into_statement();
        assert!(matches!(statement, Statement::ExpressionStatement(_)));
        let back = statement.into_expression();
        assert_eq!(back.id(), call.id());
    }

    #[test]
    fn assignment_sits_in_both_categories() {
        let assignment = Rc::new(Assignment::new(
            Space::EMPTY,
            Markers::EMPTY,
            identifier(Space::EMPTY, "x").into(),
            LeftPadded::build(Space::single_space(), empty().into()),
        ));
        let expression = Expression::Assignment(assignment);
        assert!(matches!(expression.into_statement(), Statement::Assignment(_)));
    }

    #[test]
    fn wire_types_are_qualified() {
        assert_eq!(
            <MethodInvocation as Node>::WIRE_TYPE,
            "org.openrewrite.java.tree.J$MethodInvocation"
        );
        assert_eq!(<Pass as Node>::FAMILY, Family::Python);
    }
}
