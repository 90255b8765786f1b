// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Wire type name to node constructor.
//!
//! A field typed as a category (`Expression`, `Statement`) can hold any of
//! several node kinds; the receiver learns which one from the `valueType` of
//! the `ADD` record and looks up its codec here.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::LazyLock;

use rewrite_core::error::{RpcError, RpcResult};
use rewrite_core::rpc::{ReceiveQueue, RpcObject};

use crate::tree::*;

type Receiver = fn(&mut ReceiveQueue<'_>) -> RpcResult<Tree>;

fn receive_as_tree<T: Node + RpcObject>(q: &mut ReceiveQueue<'_>) -> RpcResult<Tree> {
    T::receive_object(None, q).map(|node| Rc::new(node).into_tree())
}

macro_rules! registry {
    ($($node:ident),* $(,)?) => {
        static RECEIVERS: LazyLock<HashMap<&'static str, Receiver>> = LazyLock::new(|| {
            let mut receivers: HashMap<&'static str, Receiver> = HashMap::new();
            $( receivers.insert(<$node as Node>::WIRE_TYPE, receive_as_tree::<$node>); )*
            receivers
        });
    };
}

registry!(
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
);

/// Receives the fields of a node whose `ADD` header named `value_type`.
pub fn receive_tree(value_type: &str, q: &mut ReceiveQueue<'_>) -> RpcResult<Tree> {
    let receiver = RECEIVERS
        .get(value_type)
        .ok_or_else(|| RpcError::UnknownValueType(value_type.to_string()))?;
    receiver(q)
}

/// Whether `value_type` names a node this crate can build.
pub fn is_known(value_type: &str) -> bool {
    RECEIVERS.contains_key(value_type)
}

/// Number of registered node kinds.
pub fn len() -> usize {
    RECEIVERS.len()
}
