// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Opens a fixed-size toplevel and animates a gradient into two `wl_shm`
//! buffers, repainting on each frame callback until the window is closed.
//!
//! Run with `RUST_LOG=wlshim_core=debug,wlshim_wayland=debug` to watch the
//! session validate each request.

use std::fs::File;
use std::os::fd::AsFd;
use std::os::unix::fs::FileExt;

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;
use wlshim_wayland::wlshim_core::{BufferId, BufferSpec, PixelFormat, Rect, SurfaceId};
use wlshim_wayland::{Client, Config, Event, WaylandState, create_shm_file};

const WIDTH: i32 = 256;
const HEIGHT: i32 = 256;
const FORMAT: PixelFormat = PixelFormat::Xrgb8888;

struct Slot {
    buffer: BufferId,
    offset: i32,
}

/// Fills `slot` with frame `tick` of the animation and shows it on `surface`.
fn paint(
    state: &mut WaylandState,
    file: &File,
    surface: SurfaceId,
    slot: &Slot,
    tick: u32,
) -> Result<()> {
    let spec = BufferSpec::packed(slot.offset, WIDTH, HEIGHT, FORMAT);
    let mut pixels = Vec::with_capacity(usize::try_from(spec.byte_len())?);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let r = (x as u32).wrapping_add(tick) & 0xff;
            let g = (y as u32).wrapping_add(tick / 2) & 0xff;
            let b = tick & 0xff;
            pixels.extend_from_slice(&(0xff00_0000 | (r << 16) | (g << 8) | b).to_le_bytes());
        }
    }
    file.write_all_at(&pixels, u64::try_from(slot.offset)?)
        .context("writing pixels into the pool")?;

    state.attach(surface, slot.buffer, 0, 0)?;
    state.damage(surface, Rect::new(0, 0, WIDTH, HEIGHT))?;
    if state.session().pending_frame(surface)?.is_none() {
        state.request_frame(surface)?;
    }
    state.commit(surface)?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut client = Client::connect(Config::default())?;
    let globals = client.state_mut().bind_globals()?;
    if !client
        .state()
        .session()
        .shm_formats(globals.shm)?
        .contains(&FORMAT.wl_shm_code())
    {
        // Every compositor must support XRGB8888, but formats arrive
        // asynchronously; a roundtrip guarantees they are in.
        client.roundtrip()?;
    }

    let state = client.state_mut();
    let surface = state.create_surface(globals.compositor)?;
    let toplevel = state.get_toplevel(globals.wm_base, surface)?;
    state.set_title(toplevel, "wlshim")?;
    state.set_app_id(toplevel, "org.wlshim.WaylandWindow")?;
    state.set_min_size(toplevel, WIDTH, HEIGHT)?;
    state.set_max_size(toplevel, WIDTH, HEIGHT)?;
    let pointer = match globals.seat {
        Some(seat) => Some(state.get_pointer(seat)?),
        None => None,
    };
    // A bufferless commit asks the compositor for the first configure.
    state.commit(surface)?;

    let frame_len = BufferSpec::packed(0, WIDTH, HEIGHT, FORMAT).byte_len();
    let pool_size = i32::try_from(frame_len * 2)?;
    let file = create_shm_file(u64::try_from(pool_size)?)?;
    let pool = state.create_pool(globals.shm, file.as_fd(), pool_size)?;
    let mut slots = Vec::with_capacity(2);
    for index in 0..2 {
        let offset = i32::try_from(frame_len * index)?;
        let buffer = state.create_buffer(pool, BufferSpec::packed(offset, WIDTH, HEIGHT, FORMAT))?;
        slots.push(Slot { buffer, offset });
    }

    let mut tick = 0_u32;
    let mut needs_paint = false;
    let mut running = true;
    while running {
        client.blocking_dispatch()?;
        let events: Vec<Event> = client.state_mut().drain_events().collect();
        let state = client.state_mut();
        for event in events {
            match event {
                Event::Configure {
                    toplevel: configured,
                    serial,
                    ..
                } if configured == toplevel => {
                    state.ack_configure(toplevel, serial)?;
                    needs_paint = true;
                }
                Event::Ping { wm_base, serial } => state.pong(wm_base, serial)?,
                Event::FrameDone { surface: done, .. } if done == surface => {
                    tick = tick.wrapping_add(1);
                    needs_paint = true;
                }
                Event::CloseRequested { .. } => running = false,
                Event::PointerButton {
                    button,
                    pressed: true,
                    ..
                } => tracing::info!(button, tick, "click"),
                Event::PointerAxis { axis, value, .. } => tracing::debug!(?axis, value, "scroll"),
                Event::GlobalRemoved { global } => {
                    if global == globals.compositor || global == globals.wm_base {
                        bail!("compositor withdrew a required global");
                    }
                    tracing::warn!(?global, "global removed");
                }
                other => tracing::trace!(?other, "event"),
            }
        }

        if running && needs_paint {
            let free = slots
                .iter()
                .find(|slot| !state.session().buffer(slot.buffer).is_ok_and(|b| b.in_flight));
            match free {
                Some(slot) => {
                    paint(state, &file, surface, slot, tick)?;
                    needs_paint = false;
                }
                // Both buffers held; wait for a release.
                None => tracing::debug!("no free buffer"),
            }
        }
    }

    let state = client.state_mut();
    if let Some(pointer) = pointer {
        state.release_pointer(pointer)?;
    }
    state.destroy_toplevel(toplevel)?;
    state.destroy_surface(surface)?;
    for slot in slots {
        state.destroy_buffer(slot.buffer)?;
    }
    state.destroy_pool(pool)?;
    state.release_globals(globals)?;
    debug_assert!(state.session().live_counts().is_empty(), "teardown left live objects");
    client.flush()?;
    Ok(())
}
