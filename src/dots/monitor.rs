use crate::dots::model::Viewport;
use anyhow::{anyhow, Result};

/// Geometry of one attached display in desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub scale_factor: f32,
    pub is_primary: bool,
}

/// Union of every display, converted to window points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DesktopBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl DesktopBounds {
    pub fn position(&self) -> [f32; 2] {
        [self.x, self.y]
    }

    pub fn size(&self) -> [f32; 2] {
        [self.width, self.height]
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }
}

pub fn union_of(displays: &[DisplayRect]) -> Option<(i32, i32, i32, i32)> {
    let first = displays.first()?;
    let mut left = first.x;
    let mut top = first.y;
    let mut right = first.x + first.width as i32;
    let mut bottom = first.y + first.height as i32;
    for display in &displays[1..] {
        left = left.min(display.x);
        top = top.min(display.y);
        right = right.max(display.x + display.width as i32);
        bottom = bottom.max(display.y + display.height as i32);
    }
    Some((left, top, right - left, bottom - top))
}

/// Points-per-pixel used to place the window. The primary display wins.
pub fn window_scale(displays: &[DisplayRect]) -> f32 {
    if cfg!(target_os = "macos") {
        // display geometry is already reported in points
        return 1.0;
    }
    displays
        .iter()
        .find(|d| d.is_primary)
        .or_else(|| displays.first())
        .map(|d| d.scale_factor)
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(1.0)
}

pub fn desktop_bounds(displays: &[DisplayRect]) -> Option<DesktopBounds> {
    let (x, y, width, height) = union_of(displays)?;
    let scale = window_scale(displays);
    Some(DesktopBounds {
        x: x as f32 / scale,
        y: y as f32 / scale,
        width: width as f32 / scale,
        height: height as f32 / scale,
    })
}

pub fn enumerate_displays() -> Result<Vec<DisplayRect>> {
    let screens = screenshots::Screen::all()?;
    Ok(screens
        .iter()
        .map(|screen| {
            let info = &screen.display_info;
            DisplayRect {
                x: info.x,
                y: info.y,
                width: info.width,
                height: info.height,
                scale_factor: info.scale_factor,
                is_primary: info.is_primary,
            }
        })
        .collect())
}

/// Enumerate displays once and compute the overlay bounds.
pub fn resolve_desktop_bounds() -> Result<DesktopBounds> {
    let displays = enumerate_displays()?;
    tracing::debug!(count = displays.len(), ?displays, "enumerated displays");
    desktop_bounds(&displays).ok_or_else(|| anyhow!("no displays attached"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(x: i32, y: i32, width: u32, height: u32, primary: bool) -> DisplayRect {
        DisplayRect {
            x,
            y,
            width,
            height,
            scale_factor: 1.0,
            is_primary: primary,
        }
    }

    #[test]
    fn union_spans_side_by_side_monitors() {
        let displays = [
            display(-1920, 0, 1920, 1080, false),
            display(0, 0, 2560, 1440, true),
        ];
        assert_eq!(union_of(&displays), Some((-1920, 0, 4480, 1440)));
    }

    #[test]
    fn union_handles_stacked_offset_monitors() {
        let displays = [
            display(0, 0, 1920, 1080, true),
            display(320, -900, 1600, 900, false),
        ];
        assert_eq!(union_of(&displays), Some((0, -900, 1920, 1980)));
    }

    #[test]
    fn no_displays_yields_none() {
        assert_eq!(union_of(&[]), None);
        assert_eq!(desktop_bounds(&[]), None);
    }

    #[test]
    fn bounds_viewport_matches_union_size() {
        let displays = [display(0, 0, 800, 600, true)];
        let bounds = desktop_bounds(&displays).expect("bounds");
        assert_eq!(bounds.viewport(), Viewport::new(800.0, 600.0));
        assert_eq!(bounds.position(), [0.0, 0.0]);
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn primary_scale_converts_pixels_to_points() {
        let mut primary = display(0, 0, 3840, 2160, true);
        primary.scale_factor = 2.0;
        let secondary = display(3840, 0, 1920, 1080, false);

        assert_eq!(window_scale(&[secondary, primary]), 2.0);
        let bounds = desktop_bounds(&[primary, secondary]).expect("bounds");
        assert_eq!(bounds.size(), [2880.0, 1080.0]);
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn invalid_scale_falls_back_to_one() {
        let mut d = display(0, 0, 100, 100, true);
        d.scale_factor = 0.0;
        assert_eq!(window_scale(&[d]), 1.0);
    }
}
