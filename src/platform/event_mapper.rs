//=========================================================================
// Platform Event Mapper
//
// Converts Winit window events to the `PlatformEvent`s the game sees.
//
// Responsibilities:
// - Translate close, resize and redraw requests
// - Ignore every other Winit event
//
//=========================================================================

use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;

use crate::core::PlatformEvent;

//=== Size Conversion =====================================================
//
// Winit reports physical sizes as `u32`; the ABI carries `c_int`.
// Sizes beyond `i32::MAX` saturate instead of wrapping negative.
//

fn to_extent(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn resize_event(size: PhysicalSize<u32>) -> PlatformEvent {
    PlatformEvent::Resize {
        width: to_extent(size.width),
        height: to_extent(size.height),
    }
}

//=== Full Event Conversion ===============================================
//
// Notes:
// - `CloseRequested` only informs the game; the game decides to quit.
// - `Resized` carries the new client-area size in physical pixels.
// - `RedrawRequested` becomes `Render`.
//

/// Maps a Winit window event, or returns `None` for events the game
/// does not receive.
pub(crate) fn map_window_event(event: &WindowEvent) -> Option<PlatformEvent> {
    match event {
        WindowEvent::CloseRequested => Some(PlatformEvent::Close),
        WindowEvent::Resized(size) => Some(resize_event(*size)),
        WindowEvent::RedrawRequested => Some(PlatformEvent::Render),
        _ => None,
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
