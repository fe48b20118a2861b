#![forbid(unsafe_code)]

//! Registration errors.

use std::fmt;

use pinboard_layout::{NodeId, SelectorError};

/// Why a draggable or sortable registration was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The element (or list) is not attached to the surface.
    MissingElement(NodeId),
    /// A locator option did not parse.
    InvalidSelector {
        /// Option name, e.g. `"handle"`.
        option: &'static str,
        error: SelectorError,
    },
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingElement(node) => write!(f, "registration target {node} is not attached"),
            Self::InvalidSelector { option, error } => {
                write!(f, "invalid `{option}` selector: {error}")
            }
        }
    }
}

impl std::error::Error for RegistrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Self::InvalidSelector { error, .. } = self {
            return Some(error);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_messages() {
        let missing = RegistrationError::MissingElement(NodeId::new(4));
        assert_eq!(missing.to_string(), "registration target #4 is not attached");
        assert!(missing.source().is_none());

        let invalid = RegistrationError::InvalidSelector {
            option: "handle",
            error: SelectorError::Empty,
        };
        assert_eq!(invalid.to_string(), "invalid `handle` selector: empty selector");
        assert!(invalid.source().is_some());
    }
}
