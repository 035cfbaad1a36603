//! Font, orientation and justification modifiers

use std::fmt;
use std::str::FromStr;

use crate::error::ZplError;

/// Field rotation, bucketed from an angle in degrees
///
/// `[0, 90)` is normal, `[90, 180)` rotated, `[180, 270)` inverted and
/// anything from 270 up reads bottom-up. Negative angles count as normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Normal,
    Rotated,
    Inverted,
    BottomUp,
}

impl Orientation {
    pub fn from_degrees(degrees: f64) -> Self {
        if degrees >= 270.0 {
            Self::BottomUp
        } else if degrees >= 180.0 {
            Self::Inverted
        } else if degrees >= 90.0 {
            Self::Rotated
        } else {
            Self::Normal
        }
    }

    /// Single-letter code used by `^A`
    pub fn code(self) -> char {
        match self {
            Self::Normal => 'N',
            Self::Rotated => 'R',
            Self::Inverted => 'I',
            Self::BottomUp => 'B',
        }
    }

    /// Absolute angle used by `^FW`
    pub fn degrees(self) -> u16 {
        match self {
            Self::Normal => 0,
            Self::Rotated => 90,
            Self::Inverted => 180,
            Self::BottomUp => 270,
        }
    }
}

/// Text block justification (`^FB`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    Left,
    Center,
    Right,
    Justified,
}

impl Justify {
    pub fn code(self) -> char {
        match self {
            Self::Left => 'L',
            Self::Center => 'C',
            Self::Right => 'R',
            Self::Justified => 'J',
        }
    }
}

impl FromStr for Justify {
    type Err = ZplError;

    /// Accepts full names or the single-letter codes, case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "l" | "left" => Ok(Self::Left),
            "c" | "center" => Ok(Self::Center),
            "r" | "right" => Ok(Self::Right),
            "j" | "justify" => Ok(Self::Justified),
            _ => Err(ZplError::InvalidJustify(s.to_string())),
        }
    }
}

/// Scalable/bitmap font selection, rendered as `^A{code}{o},{h}[,{w}]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSelector {
    pub code: char,
    pub orientation: Orientation,
    /// Character height in dots
    pub height: u32,
    /// Character width in dots; printer scales proportionally when absent
    pub width: Option<u32>,
}

impl FontSelector {
    /// `^CF` form that makes this font the label default
    pub fn default_directive(&self) -> String {
        match self.width {
            Some(w) => format!("^CF{},{},{}", self.code, self.height, w),
            None => format!("^CF{},{}", self.code, self.height),
        }
    }
}

impl fmt::Display for FontSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "^A{}{},{}", self.code, self.orientation.code(), self.height)?;
        if let Some(w) = self.width {
            write!(f, ",{}", w)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_buckets() {
        assert_eq!(Orientation::from_degrees(-45.0), Orientation::Normal);
        assert_eq!(Orientation::from_degrees(0.0), Orientation::Normal);
        assert_eq!(Orientation::from_degrees(89.9), Orientation::Normal);
        assert_eq!(Orientation::from_degrees(90.0), Orientation::Rotated);
        assert_eq!(Orientation::from_degrees(179.0), Orientation::Rotated);
        assert_eq!(Orientation::from_degrees(180.0), Orientation::Inverted);
        assert_eq!(Orientation::from_degrees(269.0), Orientation::Inverted);
        assert_eq!(Orientation::from_degrees(270.0), Orientation::BottomUp);
        assert_eq!(Orientation::from_degrees(720.0), Orientation::BottomUp);
    }

    #[test]
    fn test_justify_parse() {
        assert_eq!("LEFT".parse::<Justify>().unwrap(), Justify::Left);
        assert_eq!("c".parse::<Justify>().unwrap(), Justify::Center);
        assert_eq!("Right".parse::<Justify>().unwrap(), Justify::Right);
        assert_eq!("J".parse::<Justify>().unwrap(), Justify::Justified);
        assert!(matches!(
            "x".parse::<Justify>(),
            Err(ZplError::InvalidJustify(s)) if s == "x"
        ));
    }

    #[test]
    fn test_font_display() {
        let font = FontSelector {
            code: '0',
            orientation: Orientation::Rotated,
            height: 64,
            width: None,
        };
        assert_eq!(font.to_string(), "^A0R,64");
        assert_eq!(font.default_directive(), "^CF0,64");

        let font = FontSelector { width: Some(32), ..font };
        assert_eq!(font.to_string(), "^A0R,64,32");
        assert_eq!(font.default_directive(), "^CF0,64,32");
    }
}
