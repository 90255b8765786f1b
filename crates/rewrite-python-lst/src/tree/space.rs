// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Whitespace and comments attached to tree elements.
//!
//! Every piece of non-semantic source text lives in a [`Space`]: the
//! whitespace before the first comment, then each comment followed by its
//! `suffix` (the whitespace up to the next comment or the end of the space).
//! Python comments are always single-line; their text excludes the leading
//! `#` and the terminating newline.

use std::fmt;

use rewrite_core::error::{RpcError, RpcResult};
use rewrite_core::identity_by_value;
use rewrite_core::rpc::{ReceiveQueue, RpcField, RpcObjectData, RpcValue, SendQueue};

use crate::tree::markers::Markers;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub multiline: bool,
    pub text: String,
    pub suffix: String,
    pub markers: Markers,
}

impl Comment {
    pub fn new(text: impl Into<String>, suffix: impl Into<String>) -> Self {
        Comment {
            multiline: false,
            text: text.into(),
            suffix: suffix.into(),
            markers: Markers::EMPTY,
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn print(&self, out: &mut String) {
        out.push('#');
        out.push_str(&self.text);
        out.push_str(&self.suffix);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Space {
    pub whitespace: String,
    pub comments: Vec<Comment>,
}

impl Space {
    pub const EMPTY: Space = Space {
        whitespace: String::new(),
        comments: Vec::new(),
    };

    pub fn new(whitespace: impl Into<String>) -> Self {
        Space {
            whitespace: whitespace.into(),
            comments: Vec::new(),
        }
    }

    pub fn single_space() -> Self {
        Space::new(" ")
    }

    pub fn build(whitespace: impl Into<String>, comments: Vec<Comment>) -> Self {
        Space {
            whitespace: whitespace.into(),
            comments,
        }
    }

    /// Splits raw formatting text into whitespace and comments.
    ///
    /// Everything outside a comment is treated as whitespace, including line
    /// continuations.
    pub fn format(text: &str) -> Space {
        if !text.contains('#') {
            return Space::new(text);
        }
        let mut whitespace = String::new();
        let mut comments: Vec<Comment> = Vec::new();
        let mut rest = text;
        while let Some(hash) = rest.find('#') {
            let before = &rest[..hash];
            match comments.last_mut() {
                Some(last) => last.suffix.push_str(before),
                None => whitespace.push_str(before),
            }
            let body = &rest[hash + 1..];
            let end = body.find(['\n', '\r']).unwrap_or(body.len());
            comments.push(Comment::new(&body[..end], ""));
            rest = &body[end..];
        }
        if let Some(last) = comments.last_mut() {
            last.suffix.push_str(rest);
        }
        Space::build(whitespace, comments)
    }

    pub fn is_empty(&self) -> bool {
        self.whitespace.is_empty() && self.comments.is_empty()
    }

    pub fn contains_newline(&self) -> bool {
        self.whitespace.contains('\n') || self.comments.iter().any(|c| c.suffix.contains('\n'))
    }

    /// The whitespace that ends this space: the last comment's suffix, or
    /// the leading whitespace when there are no comments.
    pub fn last_whitespace(&self) -> &str {
        match self.comments.last() {
            Some(comment) => &comment.suffix,
            None => &self.whitespace,
        }
    }

    pub fn with_last_whitespace(mut self, whitespace: impl Into<String>) -> Self {
        match self.comments.last_mut() {
            Some(comment) => comment.suffix = whitespace.into(),
            None => self.whitespace = whitespace.into(),
        }
        self
    }

    pub fn with_whitespace(mut self, whitespace: impl Into<String>) -> Self {
        self.whitespace = whitespace.into();
        self
    }

    pub fn with_comments(mut self, comments: Vec<Comment>) -> Self {
        self.comments = comments;
        self
    }

    /// Indentation of the last line this space ends on, or `None` when the
    /// space never breaks a line.
    pub fn indent(&self) -> Option<&str> {
        let last = self.last_whitespace();
        if let Some(newline) = last.rfind('\n') {
            return Some(&last[newline + 1..]);
        }
        if self.contains_newline() {
            return Some(last);
        }
        None
    }

    /// Number of line breaks in this space.
    pub fn newlines(&self) -> usize {
        self.whitespace.matches('\n').count()
            + self
                .comments
                .iter()
                .map(|c| c.suffix.matches('\n').count())
                .sum::<usize>()
    }

    pub fn print(&self, out: &mut String) {
        out.push_str(&self.whitespace);
        for comment in &self.comments {
            comment.print(out);
        }
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.print(&mut out);
        f.write_str(&out)
    }
}

identity_by_value!(Space, Comment);

// ============================================================================
// Codecs
// ============================================================================

impl RpcValue for Comment {
    fn value_type(&self) -> Option<&'static str> {
        Some("org.openrewrite.java.tree.TextComment")
    }

    fn list_id(&self) -> Option<String> {
        Some(format!("{}#{}", self.text, self.suffix))
    }

    fn send_fields(&self, before: Option<&Self>, q: &mut SendQueue<'_>) -> RpcResult<()> {
        self.multiline
            .send_field(before.map(|b| &b.multiline), q)?;
        self.text.send_field(before.map(|b| &b.text), q)?;
        self.suffix.send_field(before.map(|b| &b.suffix), q)?;
        self.markers.send_field(before.map(|b| &b.markers), q)
    }

    fn receive_new(message: &RpcObjectData, q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
        expect_type(message, "org.openrewrite.java.tree.TextComment")?;
        receive_comment(None, q)
    }

    fn receive_change(
        before: Self,
        _message: &RpcObjectData,
        q: &mut ReceiveQueue<'_>,
    ) -> RpcResult<Self> {
        receive_comment(Some(&before), q)
    }
}

fn receive_comment(before: Option<&Comment>, q: &mut ReceiveQueue<'_>) -> RpcResult<Comment> {
    Ok(Comment {
        multiline: RpcField::receive_field(before.map(|b| &b.multiline), q)?,
        text: RpcField::receive_field(before.map(|b| &b.text), q)?,
        suffix: RpcField::receive_field(before.map(|b| &b.suffix), q)?,
        markers: RpcField::receive_field(before.map(|b| &b.markers), q)?,
    })
}

impl RpcValue for Space {
    fn value_type(&self) -> Option<&'static str> {
        Some("org.openrewrite.java.tree.Space")
    }

    fn send_fields(&self, before: Option<&Self>, q: &mut SendQueue<'_>) -> RpcResult<()> {
        self.comments.send_field(before.map(|b| &b.comments), q)?;
        self.whitespace.send_field(before.map(|b| &b.whitespace), q)
    }

    fn receive_new(message: &RpcObjectData, q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
        expect_type(message, "org.openrewrite.java.tree.Space")?;
        receive_space(None, q)
    }

    fn receive_change(
        before: Self,
        _message: &RpcObjectData,
        q: &mut ReceiveQueue<'_>,
    ) -> RpcResult<Self> {
        receive_space(Some(&before), q)
    }
}

fn receive_space(before: Option<&Space>, q: &mut ReceiveQueue<'_>) -> RpcResult<Space> {
    Ok(Space {
        comments: RpcField::receive_field(before.map(|b| &b.comments), q)?,
        whitespace: RpcField::receive_field(before.map(|b| &b.whitespace), q)?,
    })
}

rewrite_core::rpc_required_field!(Space, Comment);

pub(crate) fn expect_type(message: &RpcObjectData, expected: &str) -> RpcResult<()> {
    match message.value_type.as_deref() {
        Some(found) if found == expected => Ok(()),
        found => Err(RpcError::CodecMismatch {
            expected: expected.to_string(),
            found: found.unwrap_or("<none>").to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_splits_comments() {
        let space = Space::format("  # first\n    # second\n    ");
        assert_eq!(space.whitespace, "  ");
        assert_eq!(space.comments.len(), 2);
        assert_eq!(space.comments[0].text, " first");
        assert_eq!(space.comments[0].suffix, "\n    ");
        assert_eq!(space.comments[1].text, " second");
        assert_eq!(space.comments[1].suffix, "\n    ");
        assert_eq!(space.to_string(), "  # first\n    # second\n    ");
    }

    #[test]
    fn format_without_comments_is_plain_whitespace() {
        let space = Space::format("\n\n  ");
        assert!(space.comments.is_empty());
        assert_eq!(space.whitespace, "\n\n  ");
        assert_eq!(space.newlines(), 2);
    }

    #[test]
    fn indent_follows_last_newline() {
        assert_eq!(Space::new("\n    ").indent(), Some("    "));
        assert_eq!(Space::format("\n# c\n  ").indent(), Some("  "));
        assert_eq!(Space::new(" ").indent(), None);
    }

    #[test]
    fn last_whitespace_prefers_comment_suffix() {
        let space = Space::format(" # c\n").with_last_whitespace("\n\n");
        assert_eq!(space.to_string(), " # c\n\n");
        let plain = Space::new(" ").with_last_whitespace("  ");
        assert_eq!(plain.whitespace, "  ");
    }
}
