// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Markers: out-of-band facts attached to tree elements.
//!
//! Markers record syntax the node shape cannot express (a trailing
//! semicolon, an omitted pair of parentheses) and annotations added by
//! recipes (search results).

use rewrite_core::error::{RpcError, RpcResult};
use rewrite_core::identity_by_value;
use rewrite_core::rpc::{ReceiveQueue, RpcField, RpcObjectData, RpcValue, SendQueue};
use uuid::Uuid;

use crate::tree::space::{expect_type, Space};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuoteStyle {
    Single,
    Double,
}

impl QuoteStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            QuoteStyle::Single => "SINGLE",
            QuoteStyle::Double => "DOUBLE",
        }
    }

    pub fn quote(self) -> char {
        match self {
            QuoteStyle::Single => '\'',
            QuoteStyle::Double => '"',
        }
    }

    fn from_wire(value: &str) -> RpcResult<Self> {
        match value {
            "SINGLE" => Ok(QuoteStyle::Single),
            "DOUBLE" => Ok(QuoteStyle::Double),
            other => Err(RpcError::UnknownValueType(format!("QuoteStyle {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Marker {
    /// The statement ended with `;`.
    Semicolon { id: Uuid },
    /// The list ended with `,`; `suffix` is the space between the comma and
    /// the closing delimiter.
    TrailingComma { id: Uuid, suffix: Space },
    /// A construct that is usually parenthesized was written without them.
    OmitParentheses { id: Uuid },
    /// A type hint written as a string.
    Quoted { id: Uuid, style: QuoteStyle },
    /// The last statement of the file has no terminating newline.
    SuppressNewline { id: Uuid },
    /// Why a source file could not be parsed.
    ParseExceptionResult {
        id: Uuid,
        parser_type: String,
        exception_type: String,
        message: String,
    },
    SearchResult {
        id: Uuid,
        description: Option<String>,
    },
}

impl Marker {
    pub fn semicolon() -> Self {
        Marker::Semicolon { id: Uuid::new_v4() }
    }

    pub fn trailing_comma(suffix: Space) -> Self {
        Marker::TrailingComma {
            id: Uuid::new_v4(),
            suffix,
        }
    }

    pub fn omit_parentheses() -> Self {
        Marker::OmitParentheses { id: Uuid::new_v4() }
    }

    pub fn quoted(style: QuoteStyle) -> Self {
        Marker::Quoted {
            id: Uuid::new_v4(),
            style,
        }
    }

    pub fn suppress_newline() -> Self {
        Marker::SuppressNewline { id: Uuid::new_v4() }
    }

    pub fn parse_exception(
        parser_type: impl Into<String>,
        exception_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Marker::ParseExceptionResult {
            id: Uuid::new_v4(),
            parser_type: parser_type.into(),
            exception_type: exception_type.into(),
            message: message.into(),
        }
    }

    pub fn search_result(description: Option<String>) -> Self {
        Marker::SearchResult {
            id: Uuid::new_v4(),
            description,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Marker::Semicolon { id }
            | Marker::TrailingComma { id, .. }
            | Marker::OmitParentheses { id }
            | Marker::Quoted { id, .. }
            | Marker::SuppressNewline { id }
            | Marker::ParseExceptionResult { id, .. }
            | Marker::SearchResult { id, .. } => *id,
        }
    }

    pub fn wire_type(&self) -> &'static str {
        match self {
            Marker::Semicolon { .. } => "org.openrewrite.java.marker.Semicolon",
            Marker::TrailingComma { .. } => "org.openrewrite.java.marker.TrailingComma",
            Marker::OmitParentheses { .. } => "org.openrewrite.java.marker.OmitParentheses",
            Marker::Quoted { .. } => "org.openrewrite.python.marker.Quoted",
            Marker::SuppressNewline { .. } => "org.openrewrite.python.marker.SuppressNewline",
            Marker::ParseExceptionResult { .. } => "org.openrewrite.ParseExceptionResult",
            Marker::SearchResult { .. } => "org.openrewrite.marker.SearchResult",
        }
    }
}

/// An immutable set of markers with its own id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Markers {
    pub id: Uuid,
    pub markers: Vec<Marker>,
}

impl Default for Markers {
    fn default() -> Self {
        Markers::EMPTY
    }
}

impl Markers {
    pub const EMPTY: Markers = Markers {
        id: Uuid::nil(),
        markers: Vec::new(),
    };

    pub fn build(markers: Vec<Marker>) -> Self {
        Markers {
            id: Uuid::new_v4(),
            markers,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn add(mut self, marker: Marker) -> Self {
        if self.id.is_nil() {
            self.id = Uuid::new_v4();
        }
        self.markers.push(marker);
        self
    }

    pub fn remove_where(mut self, predicate: impl Fn(&Marker) -> bool) -> Self {
        self.markers.retain(|m| !predicate(m));
        self
    }

    pub fn has_semicolon(&self) -> bool {
        self.iter().any(|m| matches!(m, Marker::Semicolon { .. }))
    }

    pub fn has_omit_parentheses(&self) -> bool {
        self.iter().any(|m| matches!(m, Marker::OmitParentheses { .. }))
    }

    pub fn has_suppress_newline(&self) -> bool {
        self.iter().any(|m| matches!(m, Marker::SuppressNewline { .. }))
    }

    pub fn trailing_comma(&self) -> Option<&Space> {
        self.iter().find_map(|m| match m {
            Marker::TrailingComma { suffix, .. } => Some(suffix),
            _ => None,
        })
    }

    pub fn quoted(&self) -> Option<QuoteStyle> {
        self.iter().find_map(|m| match m {
            Marker::Quoted { style, .. } => Some(*style),
            _ => None,
        })
    }

    pub fn search_result(&self) -> Option<&Marker> {
        self.iter()
            .find(|m| matches!(m, Marker::SearchResult { .. }))
    }

    pub fn parse_exception(&self) -> Option<&Marker> {
        self.iter()
            .find(|m| matches!(m, Marker::ParseExceptionResult { .. }))
    }
}

identity_by_value!(Marker, Markers);

// ============================================================================
// Codecs
// ============================================================================

const MARKERS_TYPE: &str = "org.openrewrite.marker.Markers";

impl RpcValue for Markers {
    fn value_type(&self) -> Option<&'static str> {
        Some(MARKERS_TYPE)
    }

    fn send_fields(&self, before: Option<&Self>, q: &mut SendQueue<'_>) -> RpcResult<()> {
        self.id.send_field(before.map(|b| &b.id), q)?;
        self.markers.send_field(before.map(|b| &b.markers), q)
    }

    fn receive_new(message: &RpcObjectData, q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
        expect_type(message, MARKERS_TYPE)?;
        receive_markers(None, q)
    }

    fn receive_change(
        before: Self,
        _message: &RpcObjectData,
        q: &mut ReceiveQueue<'_>,
    ) -> RpcResult<Self> {
        receive_markers(Some(&before), q)
    }
}

fn receive_markers(before: Option<&Markers>, q: &mut ReceiveQueue<'_>) -> RpcResult<Markers> {
    Ok(Markers {
        id: RpcField::receive_field(before.map(|b| &b.id), q)?,
        markers: RpcField::receive_field(before.map(|b| &b.markers), q)?,
    })
}

impl RpcValue for Marker {
    fn value_type(&self) -> Option<&'static str> {
        Some(self.wire_type())
    }

    fn same_kind(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    fn list_id(&self) -> Option<String> {
        Some(self.id().to_string())
    }

    /// Stateless markers are interned; everything else is sent in full.
    fn ref_key(&self) -> Option<String> {
        match self {
            Marker::Semicolon { id }
            | Marker::OmitParentheses { id }
            | Marker::SuppressNewline { id } => Some(format!("{}:{}", self.wire_type(), id)),
            _ => None,
        }
    }

    fn send_fields(&self, before: Option<&Self>, q: &mut SendQueue<'_>) -> RpcResult<()> {
        let id = self.id();
        let before_id = before.map(Marker::id);
        id.send_field(before_id.as_ref(), q)?;
        match (self, before) {
            (
                Marker::TrailingComma { suffix, .. },
                Some(Marker::TrailingComma { suffix: b, .. }),
            ) => suffix.send_field(Some(b), q),
            (Marker::TrailingComma { suffix, .. }, _) => suffix.send_field(None, q),
            (Marker::Quoted { style, .. }, Some(Marker::Quoted { style: b, .. })) => {
                style.as_str().to_string().send_field(Some(&b.as_str().to_string()), q)
            }
            (Marker::Quoted { style, .. }, _) => style.as_str().to_string().send_field(None, q),
            (
                Marker::ParseExceptionResult {
                    parser_type,
                    exception_type,
                    message,
                    ..
                },
                before,
            ) => {
                let before = match before {
                    Some(Marker::ParseExceptionResult {
                        parser_type,
                        exception_type,
                        message,
                        ..
                    }) => Some((parser_type, exception_type, message)),
                    _ => None,
                };
                parser_type.send_field(before.map(|b| b.0), q)?;
                exception_type.send_field(before.map(|b| b.1), q)?;
                message.send_field(before.map(|b| b.2), q)
            }
            (Marker::SearchResult { description, .. }, before) => {
                let before = match before {
                    Some(Marker::SearchResult { description, .. }) => Some(description),
                    _ => None,
                };
                description.send_field(before, q)
            }
            _ => Ok(()),
        }
    }

    fn receive_new(message: &RpcObjectData, q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
        let value_type = message
            .value_type
            .as_deref()
            .ok_or_else(|| RpcError::desync("marker ADD without a value type"))?;
        let template = match value_type {
            "org.openrewrite.java.marker.Semicolon" => Marker::Semicolon { id: Uuid::nil() },
            "org.openrewrite.java.marker.TrailingComma" => Marker::TrailingComma {
                id: Uuid::nil(),
                suffix: Space::EMPTY,
            },
            "org.openrewrite.java.marker.OmitParentheses" => {
                Marker::OmitParentheses { id: Uuid::nil() }
            }
            "org.openrewrite.python.marker.Quoted" => Marker::Quoted {
                id: Uuid::nil(),
                style: QuoteStyle::Double,
            },
            "org.openrewrite.python.marker.SuppressNewline" => {
                Marker::SuppressNewline { id: Uuid::nil() }
            }
            "org.openrewrite.ParseExceptionResult" => Marker::ParseExceptionResult {
                id: Uuid::nil(),
                parser_type: String::new(),
                exception_type: String::new(),
                message: String::new(),
            },
            "org.openrewrite.marker.SearchResult" => Marker::SearchResult {
                id: Uuid::nil(),
                description: None,
            },
            other => return Err(RpcError::UnknownValueType(other.to_string())),
        };
        receive_marker(template, None, q)
    }

    fn receive_change(
        before: Self,
        _message: &RpcObjectData,
        q: &mut ReceiveQueue<'_>,
    ) -> RpcResult<Self> {
        receive_marker(before.clone(), Some(&before), q)
    }
}

/// Fills `shape` with the fields that follow a marker header. `before` is
/// the previous value for a `CHANGE`, `None` for an `ADD`.
fn receive_marker(
    shape: Marker,
    before: Option<&Marker>,
    q: &mut ReceiveQueue<'_>,
) -> RpcResult<Marker> {
    let before_id = before.map(Marker::id);
    let id: Uuid = RpcField::receive_field(before_id.as_ref(), q)?;
    Ok(match shape {
        Marker::Semicolon { .. } => Marker::Semicolon { id },
        Marker::OmitParentheses { .. } => Marker::OmitParentheses { id },
        Marker::SuppressNewline { .. } => Marker::SuppressNewline { id },
        Marker::TrailingComma { suffix, .. } => {
            let before = before.map(|_| &suffix);
            Marker::TrailingComma {
                id,
                suffix: RpcField::receive_field(before, q)?,
            }
        }
        Marker::Quoted { style, .. } => {
            let before = before.map(|_| style.as_str().to_string());
            let wire: String = RpcField::receive_field(before.as_ref(), q)?;
            Marker::Quoted {
                id,
                style: QuoteStyle::from_wire(&wire)?,
            }
        }
        Marker::ParseExceptionResult {
            parser_type,
            exception_type,
            message,
            ..
        } => {
            let known = before.is_some();
            Marker::ParseExceptionResult {
                id,
                parser_type: RpcField::receive_field(known.then_some(&parser_type), q)?,
                exception_type: RpcField::receive_field(known.then_some(&exception_type), q)?,
                message: RpcField::receive_field(known.then_some(&message), q)?,
            }
        }
        Marker::SearchResult { description, .. } => Marker::SearchResult {
            id,
            description: RpcField::receive_field(before.map(|_| &description), q)?,
        },
    })
}

rewrite_core::rpc_required_field!(Markers, Marker);
