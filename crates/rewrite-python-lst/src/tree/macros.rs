// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Declarative macros that generate node types and the enums over them.
//!
//! `tree_node!` turns a field list into a node struct with:
//! - `id`, `prefix` and `markers` ahead of the declared fields
//! - `with_<field>` combinators that return the original `Rc` when the new
//!   value is identical to the current one
//! - traversal, structural matching and the delta codec, all visiting the
//!   fields in declaration order
//!
//! `tree_category!` builds an enum over a set of node types and forwards
//! the common accessors to the variant.

macro_rules! tree_node {
    (
        $(#[$meta:meta])*
        $name:ident => $wire:literal, $family:ident {
            $( $(#[$fmeta:meta])* $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $name {
            pub id: $crate::tree::TreeId,
            pub prefix: $crate::tree::Space,
            pub markers: $crate::tree::Markers,
            $( $(#[$fmeta])* pub $field: $ty, )*
        }

        paste::paste! {
            impl $name {
                /// Builds a node with a fresh id.
                pub fn new(
                    prefix: $crate::tree::Space,
                    markers: $crate::tree::Markers,
                    $( $field: $ty ),*
                ) -> Self {
                    $name {
                        id: $crate::tree::random_id(),
                        prefix,
                        markers,
                        $( $field, )*
                    }
                }

                $(
                    pub fn [<with_ $field>](self: std::rc::Rc<Self>, $field: $ty) -> std::rc::Rc<Self> {
                        use rewrite_core::identity::Identity;
                        if self.$field.is_identical(&$field) {
                            return self;
                        }
                        let mut node = std::rc::Rc::unwrap_or_clone(self);
                        node.$field = $field;
                        std::rc::Rc::new(node)
                    }
                )*
            }

            impl $crate::tree::Node for $name {
                const WIRE_TYPE: &'static str = $wire;
                const FAMILY: $crate::tree::Family = $crate::tree::Family::$family;
                const KIND: &'static str = stringify!($name);

                fn id(&self) -> $crate::tree::TreeId {
                    self.id
                }

                fn prefix(&self) -> &$crate::tree::Space {
                    &self.prefix
                }

                fn markers(&self) -> &$crate::tree::Markers {
                    &self.markers
                }

                fn with_id(self: std::rc::Rc<Self>, id: $crate::tree::TreeId) -> std::rc::Rc<Self> {
                    if self.id == id {
                        return self;
                    }
                    let mut node = std::rc::Rc::unwrap_or_clone(self);
                    node.id = id;
                    std::rc::Rc::new(node)
                }

                fn with_prefix(self: std::rc::Rc<Self>, prefix: $crate::tree::Space) -> std::rc::Rc<Self> {
                    if self.prefix == prefix {
                        return self;
                    }
                    let mut node = std::rc::Rc::unwrap_or_clone(self);
                    node.prefix = prefix;
                    std::rc::Rc::new(node)
                }

                fn with_markers(
                    self: std::rc::Rc<Self>,
                    markers: $crate::tree::Markers,
                ) -> std::rc::Rc<Self> {
                    if self.markers == markers {
                        return self;
                    }
                    let mut node = std::rc::Rc::unwrap_or_clone(self);
                    node.markers = markers;
                    std::rc::Rc::new(node)
                }

                fn into_tree(self: std::rc::Rc<Self>) -> $crate::tree::Tree {
                    $crate::tree::Tree::$name(self)
                }

                fn from_tree(tree: &$crate::tree::Tree) -> Option<&std::rc::Rc<Self>> {
                    match tree {
                        $crate::tree::Tree::$name(node) => Some(node),
                        _ => None,
                    }
                }

                fn accept<P, V: $crate::visitor::TreeVisitor<P> + ?Sized>(
                    self: std::rc::Rc<Self>,
                    v: &mut V,
                    p: &mut P,
                ) -> std::rc::Rc<Self> {
                    v.[<visit_ $name:snake>](self, p)
                }

                #[allow(unused_variables)]
                fn walk_children<P, V: $crate::visitor::TreeVisitor<P> + ?Sized>(
                    self: std::rc::Rc<Self>,
                    v: &mut V,
                    p: &mut P,
                ) -> std::rc::Rc<Self> {
                    let prefix = v.visit_space(self.prefix.clone(), p);
                    let markers = v.visit_markers(self.markers.clone(), p);
                    $( let $field = $crate::visitor::Walk::walk(self.$field.clone(), v, p); )*
                    let node = <Self as $crate::tree::Node>::with_prefix(self, prefix);
                    let node = <Self as $crate::tree::Node>::with_markers(node, markers);
                    $( let node = node.[<with_ $field>]($field); )*
                    node
                }

                #[allow(unused_variables)]
                fn match_fields(
                    &self,
                    other: &Self,
                    m: &mut dyn $crate::tree::matching::Matcher,
                ) -> bool {
                    true $( && $crate::tree::matching::Match::matches(&self.$field, &other.$field, m) )*
                }
            }
        }

        impl rewrite_core::rpc::RpcObject for $name {
            const VALUE_TYPE: &'static str = $wire;

            fn object_id(&self) -> String {
                self.id.to_string()
            }

            fn send_object(
                &self,
                before: Option<&Self>,
                q: &mut rewrite_core::rpc::SendQueue<'_>,
            ) -> rewrite_core::error::RpcResult<()> {
                use rewrite_core::rpc::RpcField;
                self.id.send_field(before.map(|b| &b.id), q)?;
                self.prefix.send_field(before.map(|b| &b.prefix), q)?;
                self.markers.send_field(before.map(|b| &b.markers), q)?;
                $( self.$field.send_field(before.map(|b| &b.$field), q)?; )*
                Ok(())
            }

            fn receive_object(
                before: Option<&Self>,
                q: &mut rewrite_core::rpc::ReceiveQueue<'_>,
            ) -> rewrite_core::error::RpcResult<Self> {
                use rewrite_core::rpc::RpcField;
                Ok($name {
                    id: RpcField::receive_field(before.map(|b| &b.id), q)?,
                    prefix: RpcField::receive_field(before.map(|b| &b.prefix), q)?,
                    markers: RpcField::receive_field(before.map(|b| &b.markers), q)?,
                    $( $field: RpcField::receive_field(before.map(|b| &b.$field), q)?, )*
                })
            }
        }
    };
}

macro_rules! tree_category {
    (
        $(#[$meta:meta])*
        $enum:ident { $( $variant:ident ),* $(,)? }
    ) => {
        tree_category!(@define $(#[$meta])* $enum { $( $variant ),* });

        impl $enum {
            pub fn to_tree(&self) -> $crate::tree::Tree {
                match self {
                    $( $enum::$variant(node) => $crate::tree::Tree::$variant(node.clone()), )*
                }
            }
        }

        impl $crate::tree::FromTree for $enum {
            fn from_tree(tree: $crate::tree::Tree) -> Result<Self, $crate::tree::Tree> {
                match tree {
                    $( $crate::tree::Tree::$variant(node) => Ok($enum::$variant(node)), )*
                    other => Err(other),
                }
            }
        }

        impl From<$enum> for $crate::tree::Tree {
            fn from(value: $enum) -> Self {
                value.to_tree()
            }
        }

        impl $crate::tree::matching::Match for $enum {
            fn matches(&self, other: &Self, m: &mut dyn $crate::tree::matching::Matcher) -> bool {
                $crate::tree::matching::trees_match(&self.to_tree(), &other.to_tree(), m)
            }

            fn as_tree(&self) -> Option<$crate::tree::Tree> {
                Some(self.to_tree())
            }
        }
    };

    (
        @define
        $(#[$meta:meta])*
        $enum:ident { $( $variant:ident ),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub enum $enum {
            $( $variant(std::rc::Rc<$crate::tree::$variant>), )*
        }

        $(
            impl From<std::rc::Rc<$crate::tree::$variant>> for $enum {
                fn from(node: std::rc::Rc<$crate::tree::$variant>) -> Self {
                    $enum::$variant(node)
                }
            }
        )*

        impl $enum {
            pub fn id(&self) -> $crate::tree::TreeId {
                use $crate::tree::Node;
                match self {
                    $( $enum::$variant(node) => node.id(), )*
                }
            }

            pub fn prefix(&self) -> &$crate::tree::Space {
                use $crate::tree::Node;
                match self {
                    $( $enum::$variant(node) => node.prefix(), )*
                }
            }

            pub fn markers(&self) -> &$crate::tree::Markers {
                use $crate::tree::Node;
                match self {
                    $( $enum::$variant(node) => node.markers(), )*
                }
            }

            pub fn with_prefix(self, prefix: $crate::tree::Space) -> Self {
                use $crate::tree::Node;
                match self {
                    $( $enum::$variant(node) => $enum::$variant(node.with_prefix(prefix)), )*
                }
            }

            pub fn with_markers(self, markers: $crate::tree::Markers) -> Self {
                use $crate::tree::Node;
                match self {
                    $( $enum::$variant(node) => $enum::$variant(node.with_markers(markers)), )*
                }
            }

            /// Short kind name, e.g. `MethodInvocation`.
            pub fn kind(&self) -> &'static str {
                match self {
                    $( $enum::$variant(_) => <$crate::tree::$variant as $crate::tree::Node>::KIND, )*
                }
            }

            pub fn wire_type(&self) -> &'static str {
                match self {
                    $( $enum::$variant(_) => <$crate::tree::$variant as $crate::tree::Node>::WIRE_TYPE, )*
                }
            }

            pub fn family(&self) -> $crate::tree::Family {
                match self {
                    $( $enum::$variant(_) => <$crate::tree::$variant as $crate::tree::Node>::FAMILY, )*
                }
            }

            /// Visits the wrapped node with `v`, keeping the variant.
            pub fn accept_variant<P, V: $crate::visitor::TreeVisitor<P> + ?Sized>(
                self,
                v: &mut V,
                p: &mut P,
            ) -> Self {
                match self {
                    $( $enum::$variant(node) => $enum::$variant($crate::visitor::visit_node(v, node, p)), )*
                }
            }

            /// Compares the fields of two values of the same variant.
            pub fn match_same_kind(
                &self,
                other: &Self,
                m: &mut dyn $crate::tree::matching::Matcher,
            ) -> bool {
                use $crate::tree::Node;
                #[allow(unreachable_patterns)]
                match (self, other) {
                    $( ($enum::$variant(a), $enum::$variant(b)) => a.match_fields(b, m), )*
                    _ => false,
                }
            }
        }

        impl rewrite_core::identity::Identity for $enum {
            fn is_identical(&self, other: &Self) -> bool {
                #[allow(unreachable_patterns)]
                match (self, other) {
                    $( ($enum::$variant(a), $enum::$variant(b)) => std::rc::Rc::ptr_eq(a, b), )*
                    _ => false,
                }
            }
        }

        impl rewrite_core::rpc::RpcValue for $enum {
            fn value_type(&self) -> Option<&'static str> {
                Some(self.wire_type())
            }

            fn same_kind(&self, other: &Self) -> bool {
                std::mem::discriminant(self) == std::mem::discriminant(other)
            }

            fn list_id(&self) -> Option<String> {
                Some(self.id().to_string())
            }

            fn send_fields(
                &self,
                before: Option<&Self>,
                q: &mut rewrite_core::rpc::SendQueue<'_>,
            ) -> rewrite_core::error::RpcResult<()> {
                use rewrite_core::rpc::RpcObject;
                match self {
                    $(
                        $enum::$variant(node) => {
                            #[allow(unreachable_patterns)]
                            let before = match before {
                                Some($enum::$variant(b)) => Some(&**b),
                                _ => None,
                            };
                            node.send_object(before, q)
                        }
                    )*
                }
            }

            fn receive_new(
                message: &rewrite_core::rpc::RpcObjectData,
                q: &mut rewrite_core::rpc::ReceiveQueue<'_>,
            ) -> rewrite_core::error::RpcResult<Self> {
                let value_type = message.value_type.as_deref().ok_or_else(|| {
                    rewrite_core::error::RpcError::desync("tree ADD without a value type")
                })?;
                let tree = $crate::tree::registry::receive_tree(value_type, q)?;
                <$enum as $crate::tree::FromTree>::from_tree(tree).map_err(|tree| {
                    rewrite_core::error::RpcError::CodecMismatch {
                        expected: stringify!($enum).to_string(),
                        found: tree.kind().to_string(),
                    }
                })
            }

            fn receive_change(
                before: Self,
                _message: &rewrite_core::rpc::RpcObjectData,
                q: &mut rewrite_core::rpc::ReceiveQueue<'_>,
            ) -> rewrite_core::error::RpcResult<Self> {
                use rewrite_core::rpc::RpcObject;
                Ok(match before {
                    $(
                        $enum::$variant(b) => $enum::$variant(std::rc::Rc::new(
                            <$crate::tree::$variant as RpcObject>::receive_object(Some(&b), q)?,
                        )),
                    )*
                })
            }
        }

        rewrite_core::rpc_required_field!($enum);
    };
}
