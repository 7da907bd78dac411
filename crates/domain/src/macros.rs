//! Macro for implementing Display and FromStr for string-backed enums
//!
//! Configuration values such as the session backend or the sort order arrive
//! as strings from env vars and query params. This macro gives each enum a
//! single case-insensitive mapping for both directions.
//!
//! # Example
//!
//! ```rust
//! use crmdesk_domain::impl_enum_str_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Theme {
//!     Light,
//!     Dark,
//! }
//!
//! impl_enum_str_conversions!(Theme {
//!     Light => "light",
//!     Dark => "dark",
//! });
//!
//! assert_eq!("DARK".parse::<Theme>().unwrap(), Theme::Dark);
//! ```

/// Implements Display and FromStr traits for string-backed enums
///
/// - Display writes the lowercase string form
/// - FromStr parses case-insensitively and reports the enum name on failure
#[macro_export]
macro_rules! impl_enum_str_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
