// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Tokenization of Python source.
//!
//! [`core`] produces the significant tokens; [`adapter`] fills the gaps
//! between them so the parser sees every byte of the input.

pub mod adapter;
pub mod core;

#[cfg(test)]
mod tests;

pub use adapter::{LineIndex, TokenStream};
pub use core::{normalize_identifier, tokenize, TokError, TokState, TokType, Token};
