// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Node kinds that only Python has.

use std::rc::Rc;

use crate::tree::j::{Block, Identifier, Import, TypeParameters};
use crate::tree::kinds::{
    CollectionKind, ComprehensionKind, Conversion, PatternKind, PyBinaryOperator,
    SpecialParameterKind, StarKind, TypeHintKind, VariableScopeKind,
};
use crate::tree::padding::{Container, LeftPadded, RightPadded};
use crate::tree::space::Space;
use crate::tree::{Expression, Statement};

tree_node! {
    /// `async` in front of a `def`-less statement (`async for`, `async with`).
    Async => "org.openrewrite.python.tree.Py$Async", Python {
        statement: Statement,
    }
}

tree_node! {
    Await => "org.openrewrite.python.tree.Py$Await", Python {
        expression: Expression,
    }
}

tree_node! {
    /// Operators outside the shared set. For `is not` and `not in`,
    /// `negation` is the space between the two keywords.
    PyBinary => "org.openrewrite.python.tree.Py$Binary", Python {
        left: Expression,
        operator: LeftPadded<PyBinaryOperator>,
        negation: Option<Space>,
        right: Expression,
    }
}

tree_node! {
    /// `a = b = value`; each variable carries the space before its `=`.
    ChainedAssignment => "org.openrewrite.python.tree.Py$ChainedAssignment", Python {
        variables: Vec<RightPadded<Expression>>,
        assignment: Expression,
    }
}

tree_node! {
    /// A list, set or tuple display. A tuple written without parentheses
    /// carries `OmitParentheses`.
    CollectionLiteral => "org.openrewrite.python.tree.Py$CollectionLiteral", Python {
        kind: CollectionKind,
        elements: Container<Expression>,
    }
}

tree_node! {
    /// `[result for ...]`; `suffix` is the space before the closing bracket.
    ComprehensionExpression => "org.openrewrite.python.tree.Py$ComprehensionExpression", Python {
        kind: ComprehensionKind,
        result: Expression,
        clauses: Vec<Rc<ComprehensionClause>>,
        suffix: Space,
    }
}

tree_node! {
    /// `for target in iterable if ...`. When the clause is asynchronous the
    /// prefix precedes `async` and `async_space` follows it.
    ComprehensionClause => "org.openrewrite.python.tree.Py$ComprehensionExpression$Clause", Python {
        async_space: Option<Space>,
        iterator_variable: Expression,
        iterated_list: LeftPadded<Expression>,
        conditions: Vec<Rc<ComprehensionCondition>>,
    }
}

tree_node! {
    ComprehensionCondition => "org.openrewrite.python.tree.Py$ComprehensionExpression$Condition", Python {
        expression: Expression,
    }
}

tree_node! {
    Del => "org.openrewrite.python.tree.Py$Del", Python {
        targets: Vec<RightPadded<Expression>>,
    }
}

tree_node! {
    /// `{key: value, **rest}`; elements are `KeyValue` or `Star`.
    DictLiteral => "org.openrewrite.python.tree.Py$DictLiteral", Python {
        elements: Container<Expression>,
    }
}

tree_node! {
    /// `raise error from cause`.
    ErrorFrom => "org.openrewrite.python.tree.Py$ErrorFrom", Python {
        error: Expression,
        from: LeftPadded<Expression>,
    }
}

tree_node! {
    /// What an `except` clause catches. `exception_group` marks `except*`.
    ExceptionType => "org.openrewrite.python.tree.Py$ExceptionType", Python {
        exception_group: bool,
        expression: Expression,
        alias: Option<LeftPadded<Rc<Identifier>>>,
    }
}

tree_node! {
    /// An arbitrary expression in a type position.
    ExpressionTypeTree => "org.openrewrite.python.tree.Py$ExpressionTypeTree", Python {
        reference: Expression,
    }
}

tree_node! {
    /// An f-string. `delimiter` is the opening prefix and quotes, e.g.
    /// `f"` or `rf'''`; parts are literal text and `FormattedStringValue`s.
    /// A format spec is a nested `FormattedString` with an empty delimiter.
    FormattedString => "org.openrewrite.python.tree.Py$FormattedString", Python {
        delimiter: String,
        parts: Vec<Expression>,
    }
}

tree_node! {
    /// A replacement field `{expression=!r:spec}`.
    FormattedStringValue => "org.openrewrite.python.tree.Py$FormattedString$Value", Python {
        expression: RightPadded<Expression>,
        debug: Option<RightPadded<bool>>,
        conversion: Option<Conversion>,
        format: Option<Expression>,
    }
}

tree_node! {
    /// `key: value` inside a dict display; `key.after` is the space before `:`.
    KeyValue => "org.openrewrite.python.tree.Py$KeyValue", Python {
        key: RightPadded<Expression>,
        value: Expression,
    }
}

tree_node! {
    /// A literal in a type position: `Literal["a"]` arguments, `None`.
    LiteralType => "org.openrewrite.python.tree.Py$LiteralType", Python {
        literal: Expression,
    }
}

tree_node! {
    /// The pattern and guard of one `case`.
    MatchCase => "org.openrewrite.python.tree.Py$MatchCase", Python {
        pattern: Rc<MatchPattern>,
        guard: Option<LeftPadded<Expression>>,
    }
}

tree_node! {
    /// One pattern. Children depend on the kind: a class pattern's first
    /// child is the class name, whose `after` is the space before `(`.
    MatchPattern => "org.openrewrite.python.tree.Py$MatchCase$Pattern", Python {
        kind: PatternKind,
        children: Container<Expression>,
    }
}

tree_node! {
    /// `import a, b` or `from module import (a, b)`.
    MultiImport => "org.openrewrite.python.tree.Py$MultiImport", Python {
        from: Option<RightPadded<Expression>>,
        parenthesized: bool,
        names: Container<Rc<Import>>,
    }
}

tree_node! {
    /// `name=value` in a call.
    NamedArgument => "org.openrewrite.python.tree.Py$NamedArgument", Python {
        name: Rc<Identifier>,
        value: LeftPadded<Expression>,
    }
}

tree_node! {
    Pass => "org.openrewrite.python.tree.Py$Pass", Python {}
}

tree_node! {
    /// `start:stop:step` inside a subscript. Absent bounds are `Empty`; an
    /// absent step (no second colon) is `None`.
    Slice => "org.openrewrite.python.tree.Py$Slice", Python {
        start: RightPadded<Expression>,
        stop: RightPadded<Expression>,
        step: Option<RightPadded<Expression>>,
    }
}

tree_node! {
    /// `*args` or `**kwargs` in a parameter list. The bare `*` separator has
    /// an empty name.
    SpecialParameter => "org.openrewrite.python.tree.Py$SpecialParameter", Python {
        kind: SpecialParameterKind,
        name: Rc<Identifier>,
    }
}

tree_node! {
    /// Unpacking: `*xs` or `**mapping`.
    Star => "org.openrewrite.python.tree.Py$Star", Python {
        kind: StarKind,
        expression: Expression,
    }
}

tree_node! {
    /// `while`/`for`/`try` with a trailing `else:` block.
    TrailingElseWrapper => "org.openrewrite.python.tree.Py$TrailingElseWrapper", Python {
        statement: Statement,
        else_block: LeftPadded<Rc<Block>>,
    }
}

tree_node! {
    /// `type Name[T] = value`.
    TypeAlias => "org.openrewrite.python.tree.Py$TypeAlias", Python {
        name: Rc<Identifier>,
        type_parameters: Option<Rc<TypeParameters>>,
        value: LeftPadded<Expression>,
    }
}

tree_node! {
    /// `: hint` on a variable or `-> hint` on a function. The prefix is the
    /// space before the `:` or `->`.
    TypeHint => "org.openrewrite.python.tree.Py$TypeHint", Python {
        kind: TypeHintKind,
        type_tree: Expression,
    }
}

tree_node! {
    /// An annotated target that is not a simple name: `self.x: int = 0`.
    TypeHintedExpression => "org.openrewrite.python.tree.Py$TypeHintedExpression", Python {
        expression: Expression,
        type_hint: Rc<TypeHint>,
    }
}

tree_node! {
    /// `A | B` in a type position; each member keeps the space before `|`.
    UnionType => "org.openrewrite.python.tree.Py$UnionType", Python {
        types: Vec<RightPadded<Expression>>,
    }
}

tree_node! {
    /// `global a, b` / `nonlocal a`.
    VariableScope => "org.openrewrite.python.tree.Py$VariableScope", Python {
        kind: VariableScopeKind,
        names: Vec<RightPadded<Rc<Identifier>>>,
    }
}

tree_node! {
    /// `yield from expression`; `from` is the space before `from`.
    YieldFrom => "org.openrewrite.python.tree.Py$YieldFrom", Python {
        from: Space,
        expression: Expression,
    }
}
