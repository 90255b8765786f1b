// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Padding wrappers: whitespace that belongs to a position between
//! elements rather than to an element itself.
//!
//! - [`RightPadded`]: an element followed by the space before a delimiter
//!   (`x ,` keeps `" "` as the `after` of `x`)
//! - [`LeftPadded`]: an element preceded by the space before an operator or
//!   keyword (`= value` keeps the space before `=`)
//! - [`Container`]: a delimited list; `before` is the space before the
//!   opening delimiter and each element is right-padded up to its separator

use rewrite_core::error::{RpcError, RpcResult};
use rewrite_core::identity::Identity;
use rewrite_core::rpc::{ReceiveQueue, RpcField, RpcObjectData, RpcValue, SendQueue};

use crate::tree::markers::Markers;
use crate::tree::space::{expect_type, Space};

#[derive(Clone, Debug)]
pub struct RightPadded<T> {
    pub element: T,
    pub after: Space,
    pub markers: Markers,
}

impl<T> RightPadded<T> {
    pub fn new(element: T) -> Self {
        RightPadded {
            element,
            after: Space::EMPTY,
            markers: Markers::EMPTY,
        }
    }

    pub fn build(element: T, after: Space) -> Self {
        RightPadded {
            element,
            after,
            markers: Markers::EMPTY,
        }
    }

    pub fn with_element(mut self, element: T) -> Self {
        self.element = element;
        self
    }

    pub fn with_after(mut self, after: Space) -> Self {
        self.after = after;
        self
    }

    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RightPadded<U> {
        RightPadded {
            element: f(self.element),
            after: self.after,
            markers: self.markers,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LeftPadded<T> {
    pub before: Space,
    pub element: T,
    pub markers: Markers,
}

impl<T> LeftPadded<T> {
    pub fn new(element: T) -> Self {
        LeftPadded {
            before: Space::EMPTY,
            element,
            markers: Markers::EMPTY,
        }
    }

    pub fn build(before: Space, element: T) -> Self {
        LeftPadded {
            before,
            element,
            markers: Markers::EMPTY,
        }
    }

    pub fn with_element(mut self, element: T) -> Self {
        self.element = element;
        self
    }

    pub fn with_before(mut self, before: Space) -> Self {
        self.before = before;
        self
    }

    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LeftPadded<U> {
        LeftPadded {
            before: self.before,
            element: f(self.element),
            markers: self.markers,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Container<T> {
    pub before: Space,
    pub elements: Vec<RightPadded<T>>,
    pub markers: Markers,
}

impl<T> Container<T> {
    pub fn build(before: Space, elements: Vec<RightPadded<T>>) -> Self {
        Container {
            before,
            elements,
            markers: Markers::EMPTY,
        }
    }

    pub fn empty() -> Self {
        Container::build(Space::EMPTY, Vec::new())
    }

    pub fn elements(&self) -> impl Iterator<Item = &T> {
        self.elements.iter().map(|rp| &rp.element)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn with_before(mut self, before: Space) -> Self {
        self.before = before;
        self
    }

    pub fn with_elements(mut self, elements: Vec<RightPadded<T>>) -> Self {
        self.elements = elements;
        self
    }

    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }
}

// ============================================================================
// Identity
// ============================================================================

impl<T: Identity> Identity for RightPadded<T> {
    fn is_identical(&self, other: &Self) -> bool {
        self.element.is_identical(&other.element)
            && self.after == other.after
            && self.markers == other.markers
    }
}

impl<T: Identity> Identity for LeftPadded<T> {
    fn is_identical(&self, other: &Self) -> bool {
        self.before == other.before
            && self.element.is_identical(&other.element)
            && self.markers == other.markers
    }
}

impl<T: Identity> Identity for Container<T> {
    fn is_identical(&self, other: &Self) -> bool {
        self.before == other.before
            && self.elements.is_identical(&other.elements)
            && self.markers == other.markers
    }
}

// ============================================================================
// Codecs
// ============================================================================

const RIGHT_PADDED_TYPE: &str = "org.openrewrite.java.tree.JRightPadded";
const LEFT_PADDED_TYPE: &str = "org.openrewrite.java.tree.JLeftPadded";
const CONTAINER_TYPE: &str = "org.openrewrite.java.tree.JContainer";

fn required<T: RpcValue>(before: Option<&T>, q: &mut ReceiveQueue<'_>) -> RpcResult<T> {
    q.receive(before.cloned())?
        .ok_or_else(|| RpcError::desync("a padded element was deleted"))
}

impl<T: RpcValue> RpcValue for RightPadded<T> {
    fn value_type(&self) -> Option<&'static str> {
        Some(RIGHT_PADDED_TYPE)
    }

    fn list_id(&self) -> Option<String> {
        self.element.list_id()
    }

    fn send_fields(&self, before: Option<&Self>, q: &mut SendQueue<'_>) -> RpcResult<()> {
        q.send(Some(&self.element), before.map(|b| &b.element))?;
        self.after.send_field(before.map(|b| &b.after), q)?;
        self.markers.send_field(before.map(|b| &b.markers), q)
    }

    fn receive_new(message: &RpcObjectData, q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
        expect_type(message, RIGHT_PADDED_TYPE)?;
        receive_right_padded(None, q)
    }

    fn receive_change(
        before: Self,
        _message: &RpcObjectData,
        q: &mut ReceiveQueue<'_>,
    ) -> RpcResult<Self> {
        receive_right_padded(Some(&before), q)
    }
}

fn receive_right_padded<T: RpcValue>(
    before: Option<&RightPadded<T>>,
    q: &mut ReceiveQueue<'_>,
) -> RpcResult<RightPadded<T>> {
    Ok(RightPadded {
        element: required(before.map(|b| &b.element), q)?,
        after: RpcField::receive_field(before.map(|b| &b.after), q)?,
        markers: RpcField::receive_field(before.map(|b| &b.markers), q)?,
    })
}

impl<T: RpcValue> RpcValue for LeftPadded<T> {
    fn value_type(&self) -> Option<&'static str> {
        Some(LEFT_PADDED_TYPE)
    }

    fn send_fields(&self, before: Option<&Self>, q: &mut SendQueue<'_>) -> RpcResult<()> {
        self.before.send_field(before.map(|b| &b.before), q)?;
        q.send(Some(&self.element), before.map(|b| &b.element))?;
        self.markers.send_field(before.map(|b| &b.markers), q)
    }

    fn receive_new(message: &RpcObjectData, q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
        expect_type(message, LEFT_PADDED_TYPE)?;
        receive_left_padded(None, q)
    }

    fn receive_change(
        before: Self,
        _message: &RpcObjectData,
        q: &mut ReceiveQueue<'_>,
    ) -> RpcResult<Self> {
        receive_left_padded(Some(&before), q)
    }
}

fn receive_left_padded<T: RpcValue>(
    before: Option<&LeftPadded<T>>,
    q: &mut ReceiveQueue<'_>,
) -> RpcResult<LeftPadded<T>> {
    Ok(LeftPadded {
        before: RpcField::receive_field(before.map(|b| &b.before), q)?,
        element: required(before.map(|b| &b.element), q)?,
        markers: RpcField::receive_field(before.map(|b| &b.markers), q)?,
    })
}

impl<T: RpcValue> RpcValue for Container<T> {
    fn value_type(&self) -> Option<&'static str> {
        Some(CONTAINER_TYPE)
    }

    fn send_fields(&self, before: Option<&Self>, q: &mut SendQueue<'_>) -> RpcResult<()> {
        self.before.send_field(before.map(|b| &b.before), q)?;
        self.elements.send_field(before.map(|b| &b.elements), q)?;
        self.markers.send_field(before.map(|b| &b.markers), q)
    }

    fn receive_new(message: &RpcObjectData, q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
        expect_type(message, CONTAINER_TYPE)?;
        receive_container(None, q)
    }

    fn receive_change(
        before: Self,
        _message: &RpcObjectData,
        q: &mut ReceiveQueue<'_>,
    ) -> RpcResult<Self> {
        receive_container(Some(&before), q)
    }
}

fn receive_container<T: RpcValue>(
    before: Option<&Container<T>>,
    q: &mut ReceiveQueue<'_>,
) -> RpcResult<Container<T>> {
    Ok(Container {
        before: RpcField::receive_field(before.map(|b| &b.before), q)?,
        elements: RpcField::receive_field(before.map(|b| &b.elements), q)?,
        markers: RpcField::receive_field(before.map(|b| &b.markers), q)?,
    })
}

impl<T: RpcValue> RpcField for RightPadded<T> {
    fn send_field(&self, before: Option<&Self>, q: &mut SendQueue<'_>) -> RpcResult<()> {
        q.send(Some(self), before)
    }

    fn receive_field(before: Option<&Self>, q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
        required(before, q)
    }
}

impl<T: RpcValue> RpcField for LeftPadded<T> {
    fn send_field(&self, before: Option<&Self>, q: &mut SendQueue<'_>) -> RpcResult<()> {
        q.send(Some(self), before)
    }

    fn receive_field(before: Option<&Self>, q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
        required(before, q)
    }
}

impl<T: RpcValue> RpcField for Container<T> {
    fn send_field(&self, before: Option<&Self>, q: &mut SendQueue<'_>) -> RpcResult<()> {
        q.send(Some(self), before)
    }

    fn receive_field(before: Option<&Self>, q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
        required(before, q)
    }
}
