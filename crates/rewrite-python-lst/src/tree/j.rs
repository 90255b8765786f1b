// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Node kinds shared with the other languages of the rewrite ecosystem.
//!
//! These travel under `org.openrewrite.java.tree.J$...` wire names, so a
//! host that only understands the shared family can still read most of a
//! Python tree.

use std::rc::Rc;

use crate::tokenizer::normalize_identifier;
use crate::tree::kinds::{
    AssignmentOperator, BinaryOperator, ClassType, LiteralKind, ModifierKind, TypeParameterKind,
    UnaryOperator,
};
use crate::tree::padding::{Container, LeftPadded, RightPadded};
use crate::tree::py::{ExceptionType, TypeHint};
use crate::tree::space::Space;
use crate::tree::{Expression, Statement};

tree_node! {
    /// A name. Empty text stands for an absent name (the unnamed `*`
    /// parameter, a call without a receiver).
    Identifier => "org.openrewrite.java.tree.J$Identifier", Shared {
        simple_name: String,
    }
}

impl Identifier {
    /// Whether both spell the same Python name, comparing NFKC forms.
    pub fn same_name(&self, other: &Identifier) -> bool {
        self.simple_name == other.simple_name
            || normalize_identifier(&self.simple_name) == normalize_identifier(&other.simple_name)
    }
}

tree_node! {
    /// A literal as written; see [`crate::tree::literal`] for decoding.
    Literal => "org.openrewrite.java.tree.J$Literal", Shared {
        value_source: String,
        kind: LiteralKind,
    }
}

tree_node! {
    /// `x = value` as a statement, `x := value` as an expression.
    Assignment => "org.openrewrite.java.tree.J$Assignment", Shared {
        variable: Expression,
        assignment: LeftPadded<Expression>,
    }
}

tree_node! {
    /// Augmented assignment: `x += 1`.
    AssignmentOp => "org.openrewrite.java.tree.J$AssignmentOperation", Shared {
        variable: Expression,
        operator: LeftPadded<AssignmentOperator>,
        assignment: Expression,
    }
}

tree_node! {
    Binary => "org.openrewrite.java.tree.J$Binary", Shared {
        left: Expression,
        operator: LeftPadded<BinaryOperator>,
        right: Expression,
    }
}

tree_node! {
    Unary => "org.openrewrite.java.tree.J$Unary", Shared {
        operator: LeftPadded<UnaryOperator>,
        expression: Expression,
    }
}

tree_node! {
    /// Attribute access: `target.name`.
    FieldAccess => "org.openrewrite.java.tree.J$FieldAccess", Shared {
        target: Expression,
        name: LeftPadded<Rc<Identifier>>,
    }
}

tree_node! {
    /// A call. `select` is the receiver with the space before its dot; an
    /// empty `name` marks a call of an arbitrary expression, printed without
    /// a dot. An empty argument list is one `Empty` element.
    MethodInvocation => "org.openrewrite.java.tree.J$MethodInvocation", Shared {
        select: Option<RightPadded<Expression>>,
        name: Rc<Identifier>,
        arguments: Container<Expression>,
    }
}

tree_node! {
    /// Subscript: `indexed[dimension]`.
    ArrayAccess => "org.openrewrite.java.tree.J$ArrayAccess", Shared {
        indexed: Expression,
        dimension: Rc<ArrayDimension>,
    }
}

tree_node! {
    /// The bracketed part of a subscript; the prefix is the space before `[`.
    ArrayDimension => "org.openrewrite.java.tree.J$ArrayDimension", Shared {
        index: RightPadded<Expression>,
    }
}

tree_node! {
    Parentheses => "org.openrewrite.java.tree.J$Parentheses", Shared {
        tree: RightPadded<Expression>,
    }
}

tree_node! {
    /// The condition of `if`/`while`/`match`; never printed with parentheses.
    ControlParentheses => "org.openrewrite.java.tree.J$ControlParentheses", Shared {
        tree: RightPadded<Expression>,
    }
}

tree_node! {
    /// An indented suite or a same-line body. The prefix is the space before
    /// the `:` that opens it; `end` holds trailing space after the last
    /// statement that belongs to the block.
    Block => "org.openrewrite.java.tree.J$Block", Shared {
        statements: Vec<RightPadded<Statement>>,
        end: Space,
    }
}

tree_node! {
    If => "org.openrewrite.java.tree.J$If", Shared {
        condition: Rc<ControlParentheses>,
        then_part: RightPadded<Statement>,
        else_part: Option<Rc<Else>>,
    }
}

tree_node! {
    /// `else:` or, when the body is an `If`, `elif`.
    Else => "org.openrewrite.java.tree.J$If$Else", Shared {
        body: RightPadded<Statement>,
    }
}

tree_node! {
    WhileLoop => "org.openrewrite.java.tree.J$WhileLoop", Shared {
        condition: Rc<ControlParentheses>,
        body: RightPadded<Statement>,
    }
}

tree_node! {
    ForEachLoop => "org.openrewrite.java.tree.J$ForEachLoop", Shared {
        control: Rc<ForEachControl>,
        body: RightPadded<Statement>,
    }
}

tree_node! {
    /// `target in iterable`; `variable.after` is the space before `in`.
    ForEachControl => "org.openrewrite.java.tree.J$ForEachLoop$Control", Shared {
        variable: RightPadded<Expression>,
        iterable: RightPadded<Expression>,
    }
}

tree_node! {
    /// `try` statements, and `with` statements when `resources` is present.
    Try => "org.openrewrite.java.tree.J$Try", Shared {
        resources: Option<Container<Rc<Resource>>>,
        body: Rc<Block>,
        catches: Vec<Rc<Catch>>,
        else_block: Option<LeftPadded<Rc<Block>>>,
        finally: Option<LeftPadded<Rc<Block>>>,
    }
}

tree_node! {
    /// An `except` clause; `exception` is absent for a bare `except:`.
    Catch => "org.openrewrite.java.tree.J$Try$Catch", Shared {
        exception: Option<Rc<ExceptionType>>,
        body: Rc<Block>,
    }
}

tree_node! {
    /// One `with` item: `expression as alias`.
    Resource => "org.openrewrite.java.tree.J$Try$Resource", Shared {
        expression: Expression,
        alias: Option<LeftPadded<Expression>>,
    }
}

tree_node! {
    /// `raise`; a bare re-raise has no exception.
    Throw => "org.openrewrite.java.tree.J$Throw", Shared {
        exception: Option<Expression>,
    }
}

tree_node! {
    Return => "org.openrewrite.java.tree.J$Return", Shared {
        expression: Option<Expression>,
    }
}

tree_node! {
    Break => "org.openrewrite.java.tree.J$Break", Shared {}
}

tree_node! {
    Continue => "org.openrewrite.java.tree.J$Continue", Shared {}
}

tree_node! {
    Assert => "org.openrewrite.java.tree.J$Assert", Shared {
        condition: Expression,
        detail: Option<LeftPadded<Expression>>,
    }
}

tree_node! {
    /// `match subject:`; the cases block holds one `Case` per arm.
    Switch => "org.openrewrite.java.tree.J$Switch", Shared {
        selector: Rc<ControlParentheses>,
        cases: Rc<Block>,
    }
}

tree_node! {
    /// One `case` arm. The label is a `MatchCase` expression.
    Case => "org.openrewrite.java.tree.J$Case", Shared {
        label: Expression,
        body: Rc<Block>,
    }
}

tree_node! {
    /// `lambda params: body`; `arrow` is the space before `:`.
    Lambda => "org.openrewrite.java.tree.J$Lambda", Shared {
        parameters: Rc<LambdaParameters>,
        arrow: Space,
        body: Expression,
    }
}

tree_node! {
    LambdaParameters => "org.openrewrite.java.tree.J$Lambda$Parameters", Shared {
        parameters: Vec<RightPadded<Statement>>,
    }
}

tree_node! {
    /// A `def`. Decorators come first, then the `async`/`def` keywords as
    /// modifiers.
    MethodDeclaration => "org.openrewrite.java.tree.J$MethodDeclaration", Shared {
        leading_annotations: Vec<Rc<Annotation>>,
        modifiers: Vec<Rc<Modifier>>,
        name: Rc<Identifier>,
        type_parameters: Option<Rc<TypeParameters>>,
        parameters: Container<Statement>,
        return_type: Option<Rc<TypeHint>>,
        body: Rc<Block>,
    }
}

tree_node! {
    ClassDeclaration => "org.openrewrite.java.tree.J$ClassDeclaration", Shared {
        leading_annotations: Vec<Rc<Annotation>>,
        kind: Rc<ClassKind>,
        name: Rc<Identifier>,
        type_parameters: Option<Rc<TypeParameters>>,
        implements: Option<Container<Expression>>,
        body: Rc<Block>,
    }
}

tree_node! {
    /// The `class` keyword.
    ClassKind => "org.openrewrite.java.tree.J$ClassDeclaration$Kind", Shared {
        kind: ClassType,
    }
}

tree_node! {
    /// A parameter or an annotated assignment. Python prints the type hint
    /// after the name: `name: hint = initializer`.
    VariableDeclarations => "org.openrewrite.java.tree.J$VariableDeclarations", Shared {
        modifiers: Vec<Rc<Modifier>>,
        type_expression: Option<Rc<TypeHint>>,
        variables: Vec<RightPadded<Rc<NamedVariable>>>,
    }
}

tree_node! {
    NamedVariable => "org.openrewrite.java.tree.J$VariableDeclarations$NamedVariable", Shared {
        name: Expression,
        initializer: Option<LeftPadded<Expression>>,
    }
}

tree_node! {
    /// One imported name with its optional alias.
    Import => "org.openrewrite.java.tree.J$Import", Shared {
        qualid: Expression,
        alias: Option<LeftPadded<Rc<Identifier>>>,
    }
}

tree_node! {
    /// A decorator: `@annotation_type`.
    Annotation => "org.openrewrite.java.tree.J$Annotation", Shared {
        annotation_type: Expression,
    }
}

tree_node! {
    /// A bracketed expression list used where Python allows `[...]` as a
    /// type argument list.
    NewArray => "org.openrewrite.java.tree.J$NewArray", Shared {
        initializer: Container<Expression>,
    }
}

tree_node! {
    /// A keyword modifier such as `def` or `async`.
    Modifier => "org.openrewrite.java.tree.J$Modifier", Shared {
        keyword: String,
        kind: ModifierKind,
    }
}

tree_node! {
    /// `true_part if condition else false_part`, kept in source order.
    Ternary => "org.openrewrite.java.tree.J$Ternary", Shared {
        true_part: Expression,
        condition: LeftPadded<Expression>,
        false_part: LeftPadded<Expression>,
    }
}

tree_node! {
    Yield => "org.openrewrite.java.tree.J$Yield", Shared {
        value: Option<Expression>,
    }
}

tree_node! {
    /// A subscripted type: `list[int]`.
    ParameterizedType => "org.openrewrite.java.tree.J$ParameterizedType", Shared {
        clazz: Expression,
        type_parameters: Container<Expression>,
    }
}

tree_node! {
    /// A PEP 695 type parameter: `T: bound = default`.
    TypeParameter => "org.openrewrite.java.tree.J$TypeParameter", Shared {
        kind: TypeParameterKind,
        name: Expression,
        bounds: Option<LeftPadded<Expression>>,
        default: Option<LeftPadded<Expression>>,
    }
}

tree_node! {
    /// `[T, U]`; the prefix is the space before `[`.
    TypeParameters => "org.openrewrite.java.tree.J$TypeParameters", Shared {
        parameters: Vec<RightPadded<Rc<TypeParameter>>>,
    }
}

tree_node! {
    /// Stands in for something absent: an omitted slice bound, an empty
    /// argument list, the missing left side of a bare `*`.
    Empty => "org.openrewrite.java.tree.J$Empty", Shared {}
}
