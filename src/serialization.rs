//! Byte-level persistence of fitted parameters.
//!
//! Fitted components expose a plain-data parameter struct; this module turns
//! such structs into bytes and back without knowing anything about backends.

use std::error::Error;

/// Parameter representation that can round-trip through a byte buffer.
///
/// Implementors hold only plain numerical data (`Vec<f64>`, scalars, names),
/// never backend tensors.
pub trait SerializableParams: Sized {
    type Error: Error + Send + Sync + 'static;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error>;

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error>;
}

impl<T> SerializableParams for T
where
    T: serde::Serialize + for<'de> serde::Deserialize<'de>,
{
    type Error = bincode::Error;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error> {
        bincode::serialize(self)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error> {
        bincode::deserialize(bytes)
    }
}
