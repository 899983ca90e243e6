//! Per-unit processing flags.

/// Which transforms a unit goes through.
///
/// Three independent capabilities. Only a unit with all three set can be
/// merged into a combined artifact.
///
/// The legacy integer mode (`0..=7`) is accepted through [`ProcessFlags::from_mode`]:
///
/// | bit | value | flag        |
/// |-----|-------|-------------|
/// | 0   | 1     | `packed`    |
/// | 1   | 2     | `versioned` |
/// | 2   | 4     | `relocated` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessFlags {
    /// Rename to `<stem>.v<version>.<ext>`.
    pub versioned: bool,
    /// Copy into the cache root under a flattened name.
    pub relocated: bool,
    /// Run the transformer and write `<name>.pack.<ext>`.
    pub packed: bool,
}

impl ProcessFlags {
    pub const PACK: u8 = 1;
    pub const VERSION: u8 = 2;
    pub const MOVE: u8 = 4;

    pub const ALL: Self = Self {
        versioned: true,
        relocated: true,
        packed: true,
    };

    pub const NONE: Self = Self {
        versioned: false,
        relocated: false,
        packed: false,
    };

    /// Decode the legacy bit mode. Returns `None` above 7.
    pub const fn from_mode(mode: u8) -> Option<Self> {
        if mode > 7 {
            return None;
        }
        Some(Self {
            versioned: mode & Self::VERSION != 0,
            relocated: mode & Self::MOVE != 0,
            packed: mode & Self::PACK != 0,
        })
    }

    /// Encode back into the legacy bit mode.
    pub const fn mode(self) -> u8 {
        (self.packed as u8) * Self::PACK
            | (self.versioned as u8) * Self::VERSION
            | (self.relocated as u8) * Self::MOVE
    }

    /// All three transforms enabled.
    #[inline]
    pub const fn is_full(self) -> bool {
        self.versioned && self.relocated && self.packed
    }
}

impl Default for ProcessFlags {
    fn default() -> Self {
        Self::ALL
    }
}
