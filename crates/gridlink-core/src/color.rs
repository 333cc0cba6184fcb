//! Cable colors.

/// Color category of a device or cable.
///
/// Two nodes may only connect when their colors match: equal colors
/// match, and [`Color::Transparent`] matches everything. The ordinal is
/// packed into five bits of the connection criteria word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    #[allow(missing_docs)]
    White = 0,
    #[allow(missing_docs)]
    Orange,
    #[allow(missing_docs)]
    Magenta,
    #[allow(missing_docs)]
    LightBlue,
    #[allow(missing_docs)]
    Yellow,
    #[allow(missing_docs)]
    Lime,
    #[allow(missing_docs)]
    Pink,
    #[allow(missing_docs)]
    Gray,
    #[allow(missing_docs)]
    LightGray,
    #[allow(missing_docs)]
    Cyan,
    #[allow(missing_docs)]
    Purple,
    #[allow(missing_docs)]
    Blue,
    #[allow(missing_docs)]
    Brown,
    #[allow(missing_docs)]
    Green,
    #[allow(missing_docs)]
    Red,
    #[allow(missing_docs)]
    Black,
    /// Uncolored; connects to any color.
    #[default]
    Transparent,
}

impl Color {
    /// Every color in ordinal order.
    pub const ALL: [Color; 17] = [
        Color::White,
        Color::Orange,
        Color::Magenta,
        Color::LightBlue,
        Color::Yellow,
        Color::Lime,
        Color::Pink,
        Color::Gray,
        Color::LightGray,
        Color::Cyan,
        Color::Purple,
        Color::Blue,
        Color::Brown,
        Color::Green,
        Color::Red,
        Color::Black,
        Color::Transparent,
    ];

    /// Ordinal index in `0..17`.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Color for an ordinal, or `None` when out of range.
    pub fn from_ordinal(ordinal: u8) -> Option<Color> {
        Self::ALL.get(ordinal as usize).copied()
    }

    /// Whether a node of this color may connect to a node of `other`.
    pub fn matches(self, other: Color) -> bool {
        self == Color::Transparent || other == Color::Transparent || self == other
    }
}
