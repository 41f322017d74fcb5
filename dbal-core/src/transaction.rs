use crate::Result;

/// Transaction control of a driver.
///
/// The flag is owned by the driver: `disconnect` always clears it and so do
/// `commit` and `rollback`, whatever the outcome of the native call.
pub trait Transactional {
    fn in_transaction(&self) -> bool;
    /// Connect if needed, raise the flag and start the native transaction.
    fn begin(&self) -> Result<&Self>;
    fn commit(&self) -> Result<&Self>;
    /// Fails with a protocol error when connected outside of a transaction.
    fn rollback(&self) -> Result<&Self>;
}
