//! String-backed enums that tolerate unknown values.
//!
//! Content is authored in a dashboard that evolves faster than the renderer, so
//! an unrecognized value maps to the type's `Default` instead of failing the
//! whole payload.

/// Implements `Serialize`/`Deserialize` for an enum exposing `as_str` and
/// `parse_lenient`. `null` and unknown strings deserialize to `Default`.
macro_rules! lenient_str_enum {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <Option<String> as serde::Deserialize>::deserialize(deserializer)?;
                Ok(raw.as_deref().map(<$ty>::parse_lenient).unwrap_or_default())
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use lenient_str_enum;
