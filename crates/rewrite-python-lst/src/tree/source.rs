// Copyright (c) OpenRewrite Python contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Source-file carriers: the compilation unit, the parse-error stand-in and
//! their file metadata.

use std::path::Path;
use std::rc::Rc;
use std::time::UNIX_EPOCH;

use rewrite_core::error::RpcResult;
use rewrite_core::identity_by_value;
use rewrite_core::rpc::{ReceiveQueue, RpcField, RpcObjectData, RpcValue, SendQueue};
use sha2::{Digest, Sha256};

use crate::tree::j::Import;
use crate::tree::padding::RightPadded;
use crate::tree::space::{expect_type, Space};
use crate::tree::Statement;

/// Byte-order mark re-emitted in front of BOM-marked units.
pub const BOM: char = '\u{feff}';

tree_node! {
    /// The root of a parsed Python file.
    CompilationUnit => "org.openrewrite.python.tree.Py$CompilationUnit", Python {
        source_path: String,
        charset_name: Option<String>,
        charset_bom_marked: bool,
        checksum: Option<Checksum>,
        file_attributes: Option<FileAttributes>,
        imports: Vec<RightPadded<Rc<Import>>>,
        statements: Vec<RightPadded<Statement>>,
        eof: Space,
    }
}

tree_node! {
    /// A file that failed to parse. Prints its original text verbatim; the
    /// reason is a `ParseExceptionResult` marker.
    ParseError => "org.openrewrite.tree.ParseError", Shared {
        source_path: String,
        charset_name: Option<String>,
        charset_bom_marked: bool,
        checksum: Option<Checksum>,
        file_attributes: Option<FileAttributes>,
        text: String,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Checksum {
    pub algorithm: String,
    /// Lowercase hex digest.
    pub value: String,
}

impl Checksum {
    pub fn sha256(bytes: &[u8]) -> Self {
        Checksum {
            algorithm: "SHA-256".to_string(),
            value: hex::encode(Sha256::digest(bytes)),
        }
    }
}

/// File metadata captured when a source is read from disk.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FileAttributes {
    pub creation_time_ms: i64,
    pub last_modified_time_ms: i64,
    pub last_access_time_ms: i64,
    pub is_readable: bool,
    pub is_writable: bool,
    pub is_executable: bool,
    pub size: i64,
}

impl FileAttributes {
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let millis = |time: std::io::Result<std::time::SystemTime>| -> i64 {
            time.ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as i64)
                .unwrap_or(0)
        };
        #[cfg(unix)]
        let is_executable = {
            use std::os::unix::fs::PermissionsExt;
            metadata.permissions().mode() & 0o111 != 0
        };
        #[cfg(not(unix))]
        let is_executable = false;
        Ok(FileAttributes {
            creation_time_ms: millis(metadata.created()),
            last_modified_time_ms: millis(metadata.modified()),
            last_access_time_ms: millis(metadata.accessed()),
            is_readable: true,
            is_writable: !metadata.permissions().readonly(),
            is_executable,
            size: metadata.len() as i64,
        })
    }
}

identity_by_value!(Checksum, FileAttributes);

// ============================================================================
// Codecs
// ============================================================================

const CHECKSUM_TYPE: &str = "org.openrewrite.Checksum";
const FILE_ATTRIBUTES_TYPE: &str = "org.openrewrite.FileAttributes";

impl RpcValue for Checksum {
    fn value_type(&self) -> Option<&'static str> {
        Some(CHECKSUM_TYPE)
    }

    fn send_fields(&self, before: Option<&Self>, q: &mut SendQueue<'_>) -> RpcResult<()> {
        self.algorithm.send_field(before.map(|b| &b.algorithm), q)?;
        self.value.send_field(before.map(|b| &b.value), q)
    }

    fn receive_new(message: &RpcObjectData, q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
        expect_type(message, CHECKSUM_TYPE)?;
        receive_checksum(None, q)
    }

    fn receive_change(
        before: Self,
        _message: &RpcObjectData,
        q: &mut ReceiveQueue<'_>,
    ) -> RpcResult<Self> {
        receive_checksum(Some(&before), q)
    }
}

fn receive_checksum(before: Option<&Checksum>, q: &mut ReceiveQueue<'_>) -> RpcResult<Checksum> {
    Ok(Checksum {
        algorithm: RpcField::receive_field(before.map(|b| &b.algorithm), q)?,
        value: RpcField::receive_field(before.map(|b| &b.value), q)?,
    })
}

impl RpcValue for FileAttributes {
    fn value_type(&self) -> Option<&'static str> {
        Some(FILE_ATTRIBUTES_TYPE)
    }

    fn send_fields(&self, before: Option<&Self>, q: &mut SendQueue<'_>) -> RpcResult<()> {
        self.creation_time_ms
            .send_field(before.map(|b| &b.creation_time_ms), q)?;
        self.last_modified_time_ms
            .send_field(before.map(|b| &b.last_modified_time_ms), q)?;
        self.last_access_time_ms
            .send_field(before.map(|b| &b.last_access_time_ms), q)?;
        self.is_readable.send_field(before.map(|b| &b.is_readable), q)?;
        self.is_writable.send_field(before.map(|b| &b.is_writable), q)?;
        self.is_executable
            .send_field(before.map(|b| &b.is_executable), q)?;
        self.size.send_field(before.map(|b| &b.size), q)
    }

    fn receive_new(message: &RpcObjectData, q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
        expect_type(message, FILE_ATTRIBUTES_TYPE)?;
        receive_file_attributes(None, q)
    }

    fn receive_change(
        before: Self,
        _message: &RpcObjectData,
        q: &mut ReceiveQueue<'_>,
    ) -> RpcResult<Self> {
        receive_file_attributes(Some(&before), q)
    }
}

fn receive_file_attributes(
    before: Option<&FileAttributes>,
    q: &mut ReceiveQueue<'_>,
) -> RpcResult<FileAttributes> {
    Ok(FileAttributes {
        creation_time_ms: RpcField::receive_field(before.map(|b| &b.creation_time_ms), q)?,
        last_modified_time_ms: RpcField::receive_field(
            before.map(|b| &b.last_modified_time_ms),
            q,
        )?,
        last_access_time_ms: RpcField::receive_field(before.map(|b| &b.last_access_time_ms), q)?,
        is_readable: RpcField::receive_field(before.map(|b| &b.is_readable), q)?,
        is_writable: RpcField::receive_field(before.map(|b| &b.is_writable), q)?,
        is_executable: RpcField::receive_field(before.map(|b| &b.is_executable), q)?,
        size: RpcField::receive_field(before.map(|b| &b.size), q)?,
    })
}
