/// Open identifier enum: known variants plus `Other(String)` for anything a
/// job file names that this build does not know about.
///
/// Each variant lists its wire name and any aliases; matching is
/// case-insensitive and the wire name is what gets serialized and displayed.
#[macro_export]
macro_rules! define_id_enum {
    (
        $(#[$enum_meta:meta])*
        $enum_name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $wire_name:literal $( | $alias:literal )*
            ),* $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $enum_name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
            Other(String),
        }

        impl $enum_name {
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $wire_name, )*
                    Self::Other(name) => name,
                }
            }

            /// Known variant for `name` or one of its aliases
            pub fn known(name: &str) -> Option<Self> {
                let lowered = name.trim().to_lowercase();
                $(
                    if lowered == $wire_name $( || lowered == $alias )* {
                        return Some(Self::$variant);
                    }
                )*
                None
            }

            /// Like `known`, falling back to `Other` with the name as given
            pub fn parse(name: &str) -> Self {
                Self::known(name).unwrap_or_else(|| Self::Other(name.trim().to_string()))
            }

            pub fn known_variants() -> &'static [Self] {
                &[ $( Self::$variant, )* ]
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Other(_))
            }
        }

        impl serde::Serialize for $enum_name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $enum_name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Ok(Self::parse(&s))
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}
