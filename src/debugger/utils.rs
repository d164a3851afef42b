use serde::{Deserialize, Deserializer};

/// Decode an explicit `null` the same way as a missing field.
///
/// Postgres json aggregates over zero rows produce `null` instead of an empty array or object.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
