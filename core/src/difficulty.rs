use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// The three fixed presets a round can be started with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
}

/// Board orientation. Compact swaps the wide boards for tall, narrow ones of the same size.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layout {
    #[default]
    Wide,
    Compact,
}

impl Layout {
    pub const fn for_viewport(width: u32, compact_below: u32) -> Self {
        if width < compact_below {
            Self::Compact
        } else {
            Self::Wide
        }
    }
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Beginner, Self::Intermediate, Self::Expert];

    /// Numeric level as used by the difficulty picker, 1 to 3.
    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Beginner),
            2 => Some(Self::Intermediate),
            3 => Some(Self::Expert),
            _ => None,
        }
    }

    pub const fn level(self) -> u8 {
        match self {
            Self::Beginner => 1,
            Self::Intermediate => 2,
            Self::Expert => 3,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Expert => "Expert",
        }
    }

    pub const fn board_config(self, layout: Layout) -> BoardConfig {
        use Difficulty::*;
        use Layout::*;
        match (self, layout) {
            (Beginner, _) => BoardConfig::new_unchecked(9, 9, 10),
            (Intermediate, Wide) => BoardConfig::new_unchecked(16, 16, 40),
            (Intermediate, Compact) => BoardConfig::new_unchecked(32, 8, 40),
            (Expert, Wide) => BoardConfig::new_unchecked(16, 30, 99),
            (Expert, Compact) => BoardConfig::new_unchecked(48, 10, 99),
        }
    }

    /// Board-size key of this preset, identical for both layouts.
    pub const fn record_key(self) -> CellCount {
        self.board_config(Layout::Wide).total_cells()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
