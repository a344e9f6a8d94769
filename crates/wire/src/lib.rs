// SPDX-License-Identifier: MIT

//! cairn-wire: the Unix-socket request/response protocol spoken between
//! `cairn-cli` and `cairn-daemon`.
//!
//! Wire format: a 4-byte big-endian length prefix followed by a JSON
//! payload, matching this workspace's existing daemon/CLI IPC convention.

mod codec;
mod error;
mod protocol;

pub use codec::{read_message, write_message};
pub use error::ProtocolError;
pub use protocol::{Request, Response};
