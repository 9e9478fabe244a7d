// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `wl_seat` and `wl_pointer`.

use wayland_client::protocol::{wl_pointer, wl_seat, wl_surface::WlSurface};
use wayland_client::{Connection, Dispatch, Proxy, QueueHandle, WEnum};
use wlshim_core::{Capabilities, Error, GlobalId, PointerId, SurfaceId};

use crate::event::{Event, ScrollAxis};
use crate::state::{GlobalProxy, WaylandState, log_rejected_event};

/// `wl_pointer.release` exists from this version.
const POINTER_RELEASE_SINCE: u32 = 3;
/// `wl_seat.release` exists from this version.
pub(crate) const SEAT_RELEASE_SINCE: u32 = 5;

fn session_surface(surface: &WlSurface) -> Option<SurfaceId> {
    surface.data::<SurfaceId>().copied()
}

fn scroll_axis(axis: WEnum<wl_pointer::Axis>) -> Option<ScrollAxis> {
    match axis {
        WEnum::Value(wl_pointer::Axis::VerticalScroll) => Some(ScrollAxis::Vertical),
        WEnum::Value(wl_pointer::Axis::HorizontalScroll) => Some(ScrollAxis::Horizontal),
        _ => None,
    }
}

impl Dispatch<wl_seat::WlSeat, GlobalId> for WaylandState {
    fn event(
        state: &mut Self,
        _seat: &wl_seat::WlSeat,
        event: wl_seat::Event,
        seat: &GlobalId,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let wl_seat::Event::Capabilities { capabilities } = event {
            let bits = match capabilities {
                WEnum::Value(capabilities) => capabilities.bits(),
                WEnum::Unknown(bits) => bits,
            };
            let capabilities = Capabilities::from_bits(bits);
            match state.session.seat_capabilities(*seat, capabilities) {
                Ok(()) => state.events.push(Event::SeatCapabilities {
                    seat: *seat,
                    capabilities,
                }),
                Err(err) => log_rejected_event("wl_seat.capabilities", &err),
            }
        }
    }
}

impl Dispatch<wl_pointer::WlPointer, PointerId> for WaylandState {
    fn event(
        state: &mut Self,
        _pointer: &wl_pointer::WlPointer,
        event: wl_pointer::Event,
        pointer: &PointerId,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        let pointer = *pointer;
        let event = match event {
            wl_pointer::Event::Enter {
                serial,
                surface,
                surface_x,
                surface_y,
            } => Event::PointerEnter {
                pointer,
                surface: session_surface(&surface),
                serial,
                x: surface_x,
                y: surface_y,
            },
            wl_pointer::Event::Leave { surface, .. } => Event::PointerLeave {
                pointer,
                surface: session_surface(&surface),
            },
            wl_pointer::Event::Motion {
                time,
                surface_x,
                surface_y,
            } => Event::PointerMotion {
                pointer,
                time_ms: time,
                x: surface_x,
                y: surface_y,
            },
            wl_pointer::Event::Button {
                serial,
                time,
                button,
                state: button_state,
            } => Event::PointerButton {
                pointer,
                serial,
                time_ms: time,
                button,
                pressed: button_state == WEnum::Value(wl_pointer::ButtonState::Pressed),
            },
            wl_pointer::Event::Axis { time, axis, value } => {
                let Some(axis) = scroll_axis(axis) else {
                    return;
                };
                Event::PointerAxis {
                    pointer,
                    time_ms: time,
                    axis,
                    value,
                }
            }
            // Frame grouping and discrete/high-resolution scroll steps are
            // folded into the plain axis events above.
            _ => return,
        };
        state.events.push(event);
    }
}

impl WaylandState {
    /// Obtains a pointer from `seat`.
    pub fn get_pointer(&mut self, seat: GlobalId) -> Result<PointerId, Error> {
        let id = self.session.get_pointer(seat)?;
        let GlobalProxy::Seat(wl_seat) = self.global_proxy(seat)? else {
            return Err(Error::StaleHandle { kind: "global" });
        };
        let wl_pointer = wl_seat.get_pointer(&self.qh, id);
        self.pointers.insert(id, wl_pointer);
        Ok(id)
    }

    /// Releases a pointer. Release every pointer before its seat.
    pub fn release_pointer(&mut self, pointer: PointerId) -> Result<(), Error> {
        self.session.release_pointer(pointer)?;
        if let Some(wl_pointer) = self.pointers.remove(&pointer) {
            if wl_pointer.version() >= POINTER_RELEASE_SINCE {
                wl_pointer.release();
            }
        }
        Ok(())
    }

    /// Releases a seat whose pointers are all released.
    pub fn release_seat(&mut self, seat: GlobalId) -> Result<(), Error> {
        self.session.release_seat(seat)?;
        if let Some(GlobalProxy::Seat(wl_seat)) = self.globals.remove(&seat) {
            if wl_seat.version() >= SEAT_RELEASE_SINCE {
                wl_seat.release();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::scroll_axis;
    use crate::event::ScrollAxis;
    use wayland_client::WEnum;
    use wayland_client::protocol::wl_pointer::Axis;

    #[test]
    fn scroll_axes_map_to_both_directions() {
        assert_eq!(
            scroll_axis(WEnum::Value(Axis::VerticalScroll)),
            Some(ScrollAxis::Vertical)
        );
        assert_eq!(
            scroll_axis(WEnum::Value(Axis::HorizontalScroll)),
            Some(ScrollAxis::Horizontal)
        );
        assert_eq!(scroll_axis(WEnum::Unknown(7)), None);
    }
}
