use alloc::string::ToString;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use tessera_protocol::WireCoord;

use crate::{CoordParseError, DenseIndex};

/// Cell key in the engine's own coordinate space.
///
/// The pair is opaque here: only a [`CoordinateTable`](crate::CoordinateTable)
/// knows where it lands in the dense grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NativeCoord(pub i32, pub i32);

impl NativeCoord {
    pub const fn to_wire(self) -> WireCoord {
        [self.0, self.1]
    }
}

impl From<DenseIndex> for NativeCoord {
    fn from((row, col): DenseIndex) -> Self {
        Self(row.into(), col.into())
    }
}

impl fmt::Display for NativeCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// Parses the engine's `"(a, b)"` keys.
impl FromStr for NativeCoord {
    type Err = CoordParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let inner = text
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or(CoordParseError::MissingDelimiters)?;

        let arity = inner.split(',').count();
        if arity != 2 {
            return Err(CoordParseError::Arity(arity));
        }

        let mut parts = inner.split(',').map(|part| {
            let part = part.trim();
            part.parse::<i32>()
                .map_err(|_| CoordParseError::InvalidComponent(part.to_string()))
        });

        match (parts.next(), parts.next()) {
            (Some(first), Some(second)) => Ok(Self(first?, second?)),
            _ => Err(CoordParseError::Arity(arity)),
        }
    }
}
