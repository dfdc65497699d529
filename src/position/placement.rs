//! Placement kinds and priority lists.

use std::fmt;
use std::str::FromStr;

use super::PositionError;

/// Which side of the anchor a popup is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    Top,
    Right,
    Bottom,
    Left,
    /// Context-menu style: a popup corner touches an anchor corner.
    Context,
}

/// Priority order used when the caller supplies none.
pub const DEFAULT_PRIORITIES: [Placement; 4] =
    [Placement::Bottom, Placement::Right, Placement::Top, Placement::Left];

impl Placement {
    /// Whether the popup sits above or below the anchor (main axis is vertical).
    #[inline]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Placement::Top | Placement::Bottom)
    }

    /// Lowercase name, matching the accepted [`FromStr`] input.
    pub const fn as_str(self) -> &'static str {
        match self {
            Placement::Top => "top",
            Placement::Right => "right",
            Placement::Bottom => "bottom",
            Placement::Left => "left",
            Placement::Context => "context",
        }
    }

    /// Parse a comma- or whitespace-separated priority list such as
    /// `"bottom, right, top"`.
    pub fn parse_priorities(input: &str) -> Result<Vec<Placement>, PositionError> {
        input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Placement {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Placement::Top),
            "right" => Ok(Placement::Right),
            "bottom" => Ok(Placement::Bottom),
            "left" => Ok(Placement::Left),
            "context" => Ok(Placement::Context),
            other => Err(PositionError::UnknownPlacement(other.to_owned())),
        }
    }
}
