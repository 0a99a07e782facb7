//=========================================================================
// Platform Events
//
// Lifecycle and window occurrences delivered from the host to the game.
//
// Each event is created by the window thread when the OS reports
// something, crosses to the game-loop thread through the event channel,
// and is handed to the game exactly once.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::abi::{
    RawEventData, RawPlatformEvent, RawResize, PLATFORM_EVENT_CLOSE, PLATFORM_EVENT_RENDER,
    PLATFORM_EVENT_RESIZE,
};

//=== PlatformEvent =======================================================

/// An input or lifecycle occurrence forwarded to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    /// The window needs repainting. At most one is pending at a time.
    Render,

    /// The user or OS asked to close the window.
    ///
    /// The host does not exit on its own; the game acknowledges by
    /// calling `quit` on the platform.
    Close,

    /// The window's client area changed size, in physical pixels.
    Resize { width: i32, height: i32 },
}

impl PlatformEvent {
    /// Returns the ABI tag for this event.
    pub fn kind(&self) -> i32 {
        match self {
            Self::Render => PLATFORM_EVENT_RENDER,
            Self::Close => PLATFORM_EVENT_CLOSE,
            Self::Resize { .. } => PLATFORM_EVENT_RESIZE,
        }
    }

    /// Decodes an event received across the ABI.
    ///
    /// Returns `None` for tags this crate does not know about.
    pub fn from_raw(raw: &RawPlatformEvent) -> Option<Self> {
        match raw.kind {
            PLATFORM_EVENT_RENDER => Some(Self::Render),
            PLATFORM_EVENT_CLOSE => Some(Self::Close),
            PLATFORM_EVENT_RESIZE => {
                // SAFETY: the resize tag guarantees the resize member is set.
                let RawResize { width, height } = unsafe { raw.data.resize };
                Some(Self::Resize { width, height })
            }
            _ => None,
        }
    }
}

impl From<&PlatformEvent> for RawPlatformEvent {
    fn from(event: &PlatformEvent) -> Self {
        let resize = match *event {
            PlatformEvent::Resize { width, height } => RawResize { width, height },
            PlatformEvent::Render | PlatformEvent::Close => RawResize::default(),
        };

        RawPlatformEvent {
            kind: event.kind(),
            data: RawEventData { resize },
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
