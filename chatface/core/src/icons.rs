//! Status Bar Icon Library
//!
//! Glyphs from the Font Awesome private-use area, as rendered by the
//! symbol font the draw engine loads for the status bar.

/// Battery level glyphs
pub mod battery {
    /// 0-19%
    pub const EMPTY: &str = "\u{f244}";
    /// 20-39%
    pub const QUARTER: &str = "\u{f243}";
    /// 40-59%
    pub const HALF: &str = "\u{f242}";
    /// 60-79%
    pub const THREE_QUARTERS: &str = "\u{f241}";
    /// 80-100%
    pub const FULL: &str = "\u{f240}";
    /// Charging, any level
    pub const CHARGING: &str = "\u{f376}";
}

/// Audio glyphs
pub mod audio {
    /// Output volume is zero
    pub const MUTE: &str = "\u{f6a9}";
}

/// Boot placeholder shown in the emotion slot before the first emotion
pub const AI_CHIP: &str = "\u{f2db}";

/// Text of the low-battery banner
pub const LOW_BATTERY_TEXT: &str = "Battery low, please charge";
