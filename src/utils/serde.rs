use serde::{Serialize, de::DeserializeOwned};

pub(crate) fn serialize<T: Serialize>(val: &T) -> Result<Vec<u8>, bincode::Error> {
    bincode::serialize(val)
}

pub(crate) fn deserialize<T: DeserializeOwned>(slice: &[u8]) -> Result<T, bincode::Error> {
    bincode::deserialize(slice)
}
