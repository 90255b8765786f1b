// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Operator and kind enumerations carried by tree nodes.

use rewrite_core::error::{RpcError, RpcResult};
use rewrite_core::rpc::{ReceiveQueue, RpcObjectData, RpcValue};
use serde_json::Value;

/// Declares a plain enum that travels as its wire name and is compared by
/// value everywhere (identity, templates, traversal).
macro_rules! tree_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $wire:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )*
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $wire, )*
                }
            }

            pub fn from_wire(value: &str) -> Option<Self> {
                match value {
                    $( $wire => Some($name::$variant), )*
                    _ => None,
                }
            }
        }

        rewrite_core::identity_by_value!($name);

        impl RpcValue for $name {
            fn to_wire(&self) -> Value {
                Value::String(self.as_str().to_string())
            }

            fn receive_new(message: &RpcObjectData, _q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
                let wire = message.value.as_ref().and_then(Value::as_str);
                wire.and_then($name::from_wire)
                    .ok_or_else(|| RpcError::CodecMismatch {
                        expected: stringify!($name).to_string(),
                        found: wire.unwrap_or("<none>").to_string(),
                    })
            }

            fn receive_change(
                _before: Self,
                message: &RpcObjectData,
                q: &mut ReceiveQueue<'_>,
            ) -> RpcResult<Self> {
                Self::receive_new(message, q)
            }
        }

        rewrite_core::rpc_required_field!($name);

        impl crate::visitor::Walk for $name {
            fn walk<P, V: crate::visitor::TreeVisitor<P> + ?Sized>(
                self,
                _v: &mut V,
                _p: &mut P,
            ) -> Self {
                self
            }
        }

        impl crate::tree::matching::Match for $name {
            fn matches(&self, other: &Self, _m: &mut dyn crate::tree::matching::Matcher) -> bool {
                self == other
            }
        }
    };
}

tree_enum! {
    /// Operators shared with other languages.
    BinaryOperator {
        Addition = "Addition",
        Subtraction = "Subtraction",
        Multiplication = "Multiplication",
        Division = "Division",
        Modulo = "Modulo",
        LessThan = "LessThan",
        GreaterThan = "GreaterThan",
        LessThanOrEqual = "LessThanOrEqual",
        GreaterThanOrEqual = "GreaterThanOrEqual",
        Equal = "Equal",
        NotEqual = "NotEqual",
        BitAnd = "BitAnd",
        BitOr = "BitOr",
        BitXor = "BitXor",
        LeftShift = "LeftShift",
        RightShift = "RightShift",
        And = "And",
        Or = "Or",
    }
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Addition => "+",
            BinaryOperator::Subtraction => "-",
            BinaryOperator::Multiplication => "*",
            BinaryOperator::Division => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::LeftShift => "<<",
            BinaryOperator::RightShift => ">>",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+" => BinaryOperator::Addition,
            "-" => BinaryOperator::Subtraction,
            "*" => BinaryOperator::Multiplication,
            "/" => BinaryOperator::Division,
            "%" => BinaryOperator::Modulo,
            "<" => BinaryOperator::LessThan,
            ">" => BinaryOperator::GreaterThan,
            "<=" => BinaryOperator::LessThanOrEqual,
            ">=" => BinaryOperator::GreaterThanOrEqual,
            "==" => BinaryOperator::Equal,
            "!=" => BinaryOperator::NotEqual,
            "&" => BinaryOperator::BitAnd,
            "|" => BinaryOperator::BitOr,
            "^" => BinaryOperator::BitXor,
            "<<" => BinaryOperator::LeftShift,
            ">>" => BinaryOperator::RightShift,
            "and" => BinaryOperator::And,
            "or" => BinaryOperator::Or,
            _ => return None,
        })
    }
}

tree_enum! {
    /// Operators only Python has.
    PyBinaryOperator {
        In = "In",
        Is = "Is",
        IsNot = "IsNot",
        NotIn = "NotIn",
        FloorDivision = "FloorDivision",
        MatrixMultiplication = "MatrixMultiplication",
        Power = "Power",
        /// Implicit concatenation of adjacent string literals.
        StringConcatenation = "StringConcatenation",
    }
}

impl PyBinaryOperator {
    /// Source text of the operator. `is not` and `not in` print their
    /// second keyword separately, after the node's `negation` space.
    pub fn symbol(self) -> &'static str {
        match self {
            PyBinaryOperator::In => "in",
            PyBinaryOperator::Is | PyBinaryOperator::IsNot => "is",
            PyBinaryOperator::NotIn => "not",
            PyBinaryOperator::FloorDivision => "//",
            PyBinaryOperator::MatrixMultiplication => "@",
            PyBinaryOperator::Power => "**",
            PyBinaryOperator::StringConcatenation => "",
        }
    }
}

tree_enum! {
    UnaryOperator {
        Negative = "Negative",
        Positive = "Positive",
        Complement = "Complement",
        Not = "Not",
    }
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Negative => "-",
            UnaryOperator::Positive => "+",
            UnaryOperator::Complement => "~",
            UnaryOperator::Not => "not",
        }
    }
}

tree_enum! {
    AssignmentOperator {
        Addition = "Addition",
        Subtraction = "Subtraction",
        Multiplication = "Multiplication",
        Division = "Division",
        Modulo = "Modulo",
        BitAnd = "BitAnd",
        BitOr = "BitOr",
        BitXor = "BitXor",
        LeftShift = "LeftShift",
        RightShift = "RightShift",
        FloorDivision = "FloorDivision",
        Exponentiation = "Exponentiation",
        MatrixMultiplication = "MatrixMultiplication",
    }
}

impl AssignmentOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignmentOperator::Addition => "+=",
            AssignmentOperator::Subtraction => "-=",
            AssignmentOperator::Multiplication => "*=",
            AssignmentOperator::Division => "/=",
            AssignmentOperator::Modulo => "%=",
            AssignmentOperator::BitAnd => "&=",
            AssignmentOperator::BitOr => "|=",
            AssignmentOperator::BitXor => "^=",
            AssignmentOperator::LeftShift => "<<=",
            AssignmentOperator::RightShift => ">>=",
            AssignmentOperator::FloorDivision => "//=",
            AssignmentOperator::Exponentiation => "**=",
            AssignmentOperator::MatrixMultiplication => "@=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+=" => AssignmentOperator::Addition,
            "-=" => AssignmentOperator::Subtraction,
            "*=" => AssignmentOperator::Multiplication,
            "/=" => AssignmentOperator::Division,
            "%=" => AssignmentOperator::Modulo,
            "&=" => AssignmentOperator::BitAnd,
            "|=" => AssignmentOperator::BitOr,
            "^=" => AssignmentOperator::BitXor,
            "<<=" => AssignmentOperator::LeftShift,
            ">>=" => AssignmentOperator::RightShift,
            "//=" => AssignmentOperator::FloorDivision,
            "**=" => AssignmentOperator::Exponentiation,
            "@=" => AssignmentOperator::MatrixMultiplication,
            _ => return None,
        })
    }
}

tree_enum! {
    /// How a literal's source text is interpreted.
    LiteralKind {
        None = "None",
        Boolean = "Boolean",
        Integer = "Integer",
        Float = "Float",
        Complex = "Complex",
        String = "String",
        Bytes = "Bytes",
        Ellipsis = "Ellipsis",
    }
}

tree_enum! {
    CollectionKind {
        List = "LIST",
        Set = "SET",
        Tuple = "TUPLE",
    }
}

tree_enum! {
    ComprehensionKind {
        List = "LIST",
        Set = "SET",
        Dict = "DICT",
        Generator = "GENERATOR",
    }
}

impl ComprehensionKind {
    pub fn delimiters(self) -> (&'static str, &'static str) {
        match self {
            ComprehensionKind::List => ("[", "]"),
            ComprehensionKind::Set | ComprehensionKind::Dict => ("{", "}"),
            ComprehensionKind::Generator => ("(", ")"),
        }
    }
}

tree_enum! {
    /// The `!r`, `!s` or `!a` suffix of an f-string replacement field.
    Conversion {
        Str = "STR",
        Repr = "REPR",
        Ascii = "ASCII",
    }
}

impl Conversion {
    pub fn letter(self) -> char {
        match self {
            Conversion::Str => 's',
            Conversion::Repr => 'r',
            Conversion::Ascii => 'a',
        }
    }

    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "s" => Some(Conversion::Str),
            "r" => Some(Conversion::Repr),
            "a" => Some(Conversion::Ascii),
            _ => None,
        }
    }
}

tree_enum! {
    PatternKind {
        As = "AS",
        Capture = "CAPTURE",
        ClassName = "CLASS",
        DoubleStar = "DOUBLE_STAR",
        Group = "GROUP",
        KeyValue = "KEY_VALUE",
        Keyword = "KEYWORD",
        Literal = "LITERAL",
        Mapping = "MAPPING",
        Or = "OR",
        SequenceList = "SEQUENCE_LIST",
        SequenceTuple = "SEQUENCE_TUPLE",
        /// A sequence pattern written without brackets: `case a, b:`.
        Sequence = "SEQUENCE",
        Star = "STAR",
        Value = "VALUE",
        Wildcard = "WILDCARD",
    }
}

tree_enum! {
    SpecialParameterKind {
        Args = "ARGS",
        Kwargs = "KWARGS",
    }
}

tree_enum! {
    StarKind {
        List = "LIST",
        Dict = "DICT",
    }
}

tree_enum! {
    TypeHintKind {
        VariableType = "VARIABLE_TYPE",
        ReturnType = "RETURN_TYPE",
    }
}

tree_enum! {
    VariableScopeKind {
        Global = "GLOBAL",
        Nonlocal = "NONLOCAL",
    }
}

tree_enum! {
    ModifierKind {
        Default = "Default",
        Async = "Async",
    }
}

tree_enum! {
    ClassType {
        Class = "Class",
    }
}

tree_enum! {
    /// The `TypeVar`-like flavor of a PEP 695 type parameter.
    TypeParameterKind {
        TypeVar = "TYPE_VAR",
        TypeVarTuple = "TYPE_VAR_TUPLE",
        ParamSpec = "PARAM_SPEC",
    }
}

impl TypeParameterKind {
    pub fn stars(self) -> &'static str {
        match self {
            TypeParameterKind::TypeVar => "",
            TypeParameterKind::TypeVarTuple => "*",
            TypeParameterKind::ParamSpec => "**",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        assert_eq!(
            PatternKind::from_wire(PatternKind::ClassName.as_str()),
            Some(PatternKind::ClassName)
        );
        assert_eq!(CollectionKind::Tuple.as_str(), "TUPLE");
        assert_eq!(BinaryOperator::from_wire("Modulo"), Some(BinaryOperator::Modulo));
        assert_eq!(UnaryOperator::from_wire("Bogus"), None);
    }

    #[test]
    fn symbols_map_both_ways() {
        for symbol in ["+", "<=", "and", ">>"] {
            let op = BinaryOperator::from_symbol(symbol).unwrap();
            assert_eq!(op.symbol(), symbol);
        }
        assert_eq!(AssignmentOperator::from_symbol("**=").unwrap().symbol(), "**=");
        assert_eq!(Conversion::from_letter("r"), Some(Conversion::Repr));
    }
}
