//! On-disk record format: tab-indented JSON followed by a single `\n`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::core::{Error, Result};

const INDENT: &[u8] = b"\t";

/// Encodes `value` into its canonical record bytes.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(128);
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer).map_err(Error::Encode)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Decodes record bytes into `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(Error::Decode)
}
