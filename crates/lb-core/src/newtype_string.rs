//! Macro for the string newtypes of the catalog graph.
//!
//! Every name in a catalog graph is a plain string on the wire, but mixing a
//! qualified name with an application name is always a bug. Each name gets
//! its own type; on the wire it stays a bare string.

/// Define a non-empty string name.
///
/// The generated type serializes as a bare string, refuses empty strings on
/// deserialization, derefs to `str` and compares equal to string values.
macro_rules! define_newtype_string {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
        #[serde(transparent)]
        $vis struct $Name(String);

        impl<'de> serde::Deserialize<'de> for $Name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                $Name::try_new(String::deserialize(deserializer)?).ok_or_else(|| {
                    serde::de::Error::custom(concat!(stringify!($Name), " must not be empty"))
                })
            }
        }

        impl $Name {
            /// Wrap a name already known to be non-empty.
            ///
            /// Panics on an empty name; event and catalog input goes through
            /// [`try_new`](Self::try_new) or deserialization instead.
            pub fn new(name: impl Into<String>) -> Self {
                let name = name.into();
                assert!(!name.is_empty(), concat!(stringify!($Name), " must not be empty"));
                Self(name)
            }

            pub fn try_new(name: impl Into<String>) -> Option<Self> {
                let name = name.into();
                (!name.is_empty()).then_some(Self(name))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::ops::Deref for $Name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $Name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $Name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<String> for $Name {
            fn eq(&self, other: &String) -> bool {
                &self.0 == other
            }
        }
    };
}

pub(crate) use define_newtype_string;
