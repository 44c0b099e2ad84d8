use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use knuffel::errors::DecodeError;

bitflags! {
    /// Raw orientation bits as they appear in layout attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OrientationBits: u32 {
        const TOP_DOWN = 1;
        const BOTTOM_UP = 1 << 1;
        const LEFT_TO_RIGHT = 1 << 2;
        const RIGHT_TO_LEFT = 1 << 3;
    }
}

/// Direction in which the drawer opens.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Handle starts at the top edge and slides down to open.
    TopDown,
    /// Handle starts at the bottom edge and slides up to open.
    BottomUp,
    /// Handle starts at the left edge and slides right to open.
    #[default]
    LeftToRight,
    /// Handle starts at the right edge and slides left to open.
    RightToLeft,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrientationError {
    #[error("orientation {0:#x} must have exactly one of the bits 0x1, 0x2, 0x4, 0x8 set")]
    InvalidBits(u32),
    #[error(
        "unknown orientation {0:?}, expected \"top-down\", \"bottom-up\", \"left-to-right\" \
         or \"right-to-left\""
    )]
    UnknownName(String),
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::TopDown,
        Orientation::BottomUp,
        Orientation::LeftToRight,
        Orientation::RightToLeft,
    ];

    /// Validates a raw bit value.
    ///
    /// Exactly one known bit must be set.
    pub fn from_bits(bits: u32) -> Result<Self, OrientationError> {
        let Some(flags) = OrientationBits::from_bits(bits) else {
            return Err(OrientationError::InvalidBits(bits));
        };

        if flags == OrientationBits::TOP_DOWN {
            Ok(Self::TopDown)
        } else if flags == OrientationBits::BOTTOM_UP {
            Ok(Self::BottomUp)
        } else if flags == OrientationBits::LEFT_TO_RIGHT {
            Ok(Self::LeftToRight)
        } else if flags == OrientationBits::RIGHT_TO_LEFT {
            Ok(Self::RightToLeft)
        } else {
            Err(OrientationError::InvalidBits(bits))
        }
    }

    pub fn bits(self) -> OrientationBits {
        match self {
            Self::TopDown => OrientationBits::TOP_DOWN,
            Self::BottomUp => OrientationBits::BOTTOM_UP,
            Self::LeftToRight => OrientationBits::LEFT_TO_RIGHT,
            Self::RightToLeft => OrientationBits::RIGHT_TO_LEFT,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Self::TopDown | Self::BottomUp)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::TopDown => "top-down",
            Self::BottomUp => "bottom-up",
            Self::LeftToRight => "left-to-right",
            Self::RightToLeft => "right-to-left",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Orientation {
    type Err = OrientationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|o| o.name() == s)
            .ok_or_else(|| OrientationError::UnknownName(s.to_owned()))
    }
}

impl TryFrom<u32> for Orientation {
    type Error = OrientationError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        Self::from_bits(bits)
    }
}

impl<S: knuffel::traits::ErrorSpan> knuffel::DecodeScalar<S> for Orientation {
    fn type_check(
        type_name: &Option<knuffel::span::Spanned<knuffel::ast::TypeName, S>>,
        ctx: &mut knuffel::decode::Context<S>,
    ) {
        if let Some(type_name) = &type_name {
            ctx.emit_error(DecodeError::unexpected(
                type_name,
                "type name",
                "no type name expected for this node",
            ));
        }
    }

    fn raw_decode(
        val: &knuffel::span::Spanned<knuffel::ast::Literal, S>,
        ctx: &mut knuffel::decode::Context<S>,
    ) -> Result<Self, DecodeError<S>> {
        let parsed = match &**val {
            knuffel::ast::Literal::String(ref name) => name.parse::<Orientation>(),
            knuffel::ast::Literal::Int(ref value) => match value.try_into() {
                Ok(bits) => Orientation::from_bits(bits),
                Err(e) => {
                    ctx.emit_error(DecodeError::conversion(val, e));
                    return Ok(Orientation::default());
                }
            },
            _ => {
                ctx.emit_error(DecodeError::unsupported(
                    val,
                    "expected an orientation name or a bit value",
                ));
                return Ok(Orientation::default());
            }
        };

        match parsed {
            Ok(orientation) => Ok(orientation),
            Err(e) => {
                ctx.emit_error(DecodeError::conversion(val, e));
                Ok(Orientation::default())
            }
        }
    }
}
