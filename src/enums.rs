// src/enums.rs
//! Public enum types used throughout the crate
//!
//! Central location for the file format versions and the input signals fed
//! to the security monitor.

use serde::{Deserialize, Serialize};

/// Supported vault file versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[non_exhaustive]
pub enum FormatVersion {
    /// PBKDF2-HMAC-SHA256 @ 250k / AES-256-GCM
    #[default]
    V1,
    // Future:
    // V2: higher PBKDF2 round count
}

impl FormatVersion {
    pub fn from_wire(v: u32) -> Option<Self> {
        match v {
            1 => Some(Self::V1),
            _ => None,
        }
    }

    pub fn to_wire(self) -> u32 {
        match self {
            Self::V1 => 1,
        }
    }
}

/// User activity that postpones the idle lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivitySignal {
    PointerMove,
    KeyPress,
    Click,
    Scroll,
    TouchStart,
}

/// Window focus transitions observed for privacy blur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusEvent {
    Focused,
    Blurred,
    Minimized,
    Restored,
}
