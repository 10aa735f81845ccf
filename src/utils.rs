pub(crate) mod serde;

pub(crate) use self::serde::{deserialize, serialize};
