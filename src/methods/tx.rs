//! Transaction class methods (class id 90). All of them carry no
//! arguments.

use super::args::Reader;
use super::{Method, CLASS_TX};
use crate::error::Error;

/// Method id of `tx.select`.
pub const SELECT: u16 = 10;
/// Method id of `tx.select-ok`.
pub const SELECT_OK: u16 = 11;
/// Method id of `tx.commit`.
pub const COMMIT: u16 = 20;
/// Method id of `tx.commit-ok`.
pub const COMMIT_OK: u16 = 21;
/// Method id of `tx.rollback`.
pub const ROLLBACK: u16 = 30;
/// Method id of `tx.rollback-ok`.
pub const ROLLBACK_OK: u16 = 31;

pub(crate) fn decode(method_id: u16, _r: &mut Reader<'_>) -> Result<Method, Error> {
    let method = match method_id {
        SELECT => Method::TxSelect,
        SELECT_OK => Method::TxSelectOk,
        COMMIT => Method::TxCommit,
        COMMIT_OK => Method::TxCommitOk,
        ROLLBACK => Method::TxRollback,
        ROLLBACK_OK => Method::TxRollbackOk,
        _ => {
            return Err(Error::UnknownMethod {
                class_id: CLASS_TX,
                method_id,
            })
        }
    };
    Ok(method)
}
