//! Zone map: normalized position → zone label.
//!
//! `zone_at` is a total, deterministic function of `(x, y, config)`; it holds
//! no state and the engine re-evaluates it only at session start. Evaluation
//! order is first-match-wins: corners, middle-click, vertical edges,
//! horizontal edge, center.

use trackpal_core::config::{Corner, EngineConfig, HorizontalPosition, VerticalEdgeMode};

/// Labeled region of the normalized trackpad surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Zone {
    /// No zone assigned (fresh or reset session).
    #[default]
    None,
    LeftEdge,
    RightEdge,
    BottomEdge,
    TopEdge,
    TopLeftCorner,
    TopRightCorner,
    BottomLeftCorner,
    BottomRightCorner,
    MiddleClick,
    Center,
}

/// Scroll axis a zone drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Zone {
    /// Zones that scroll vertically.
    pub fn is_vertical_scroll(self) -> bool {
        matches!(self, Zone::LeftEdge | Zone::RightEdge)
    }

    /// Zones that scroll horizontally.
    pub fn is_horizontal_scroll(self) -> bool {
        matches!(self, Zone::BottomEdge | Zone::TopEdge)
    }

    pub fn is_scroll_zone(self) -> bool {
        self.is_vertical_scroll() || self.is_horizontal_scroll()
    }

    pub fn is_corner(self) -> bool {
        self.corner().is_some()
    }

    pub fn corner(self) -> Option<Corner> {
        match self {
            Zone::TopLeftCorner => Some(Corner::TopLeft),
            Zone::TopRightCorner => Some(Corner::TopRight),
            Zone::BottomLeftCorner => Some(Corner::BottomLeft),
            Zone::BottomRightCorner => Some(Corner::BottomRight),
            _ => None,
        }
    }

    /// The scroll axis this zone drives, if it is a scroll zone.
    pub fn axis(self) -> Option<Axis> {
        if self.is_vertical_scroll() {
            Some(Axis::Vertical)
        } else if self.is_horizontal_scroll() {
            Some(Axis::Horizontal)
        } else {
            None
        }
    }

    /// Stable token for logging and the persisted threshold map.
    pub fn token(self) -> &'static str {
        match self {
            Zone::None => "none",
            Zone::LeftEdge => "leftEdge",
            Zone::RightEdge => "rightEdge",
            Zone::BottomEdge => "bottomEdge",
            Zone::TopEdge => "topEdge",
            Zone::TopLeftCorner => "topLeftCorner",
            Zone::TopRightCorner => "topRightCorner",
            Zone::BottomLeftCorner => "bottomLeftCorner",
            Zone::BottomRightCorner => "bottomRightCorner",
            Zone::MiddleClick => "middleClick",
            Zone::Center => "center",
        }
    }
}

/// The two scroll edges adjacent to a corner: `(horizontal, vertical)`.
pub fn adjacent_edges(corner: Corner) -> (Zone, Zone) {
    match corner {
        Corner::TopLeft => (Zone::TopEdge, Zone::LeftEdge),
        Corner::TopRight => (Zone::TopEdge, Zone::RightEdge),
        Corner::BottomLeft => (Zone::BottomEdge, Zone::LeftEdge),
        Corner::BottomRight => (Zone::BottomEdge, Zone::RightEdge),
    }
}

/// Whether the configuration actually scrolls on the given edge.
pub fn edge_enabled(zone: Zone, config: &EngineConfig) -> bool {
    match zone {
        Zone::LeftEdge => matches!(
            config.vertical_edge_mode,
            VerticalEdgeMode::Left | VerticalEdgeMode::Both
        ),
        Zone::RightEdge => matches!(
            config.vertical_edge_mode,
            VerticalEdgeMode::Right | VerticalEdgeMode::Both
        ),
        Zone::BottomEdge => config.horizontal_position == HorizontalPosition::Bottom,
        Zone::TopEdge => config.horizontal_position == HorizontalPosition::Top,
        _ => false,
    }
}

/// Maps a normalized position to its zone.
pub fn zone_at(x: f32, y: f32, config: &EngineConfig) -> Zone {
    if config.corner_trigger_enabled {
        let s = config.corner_trigger_zone_size;
        let corner = if x <= s && y >= 1.0 - s {
            Some(Zone::TopLeftCorner)
        } else if x >= 1.0 - s && y >= 1.0 - s {
            Some(Zone::TopRightCorner)
        } else if x <= s && y <= s {
            Some(Zone::BottomLeftCorner)
        } else if x >= 1.0 - s && y <= s {
            Some(Zone::BottomRightCorner)
        } else {
            None
        };
        if let Some(corner) = corner {
            return corner;
        }
    }

    if config.middle_click_enabled && in_middle_click_zone(x, y, config) {
        return Zone::MiddleClick;
    }

    if x < config.edge_zone_width && edge_enabled(Zone::LeftEdge, config) {
        return Zone::LeftEdge;
    }
    if x > 1.0 - config.edge_zone_width && edge_enabled(Zone::RightEdge, config) {
        return Zone::RightEdge;
    }

    match config.horizontal_position {
        HorizontalPosition::Bottom if y < config.horizontal_zone_height => return Zone::BottomEdge,
        HorizontalPosition::Top if y > 1.0 - config.horizontal_zone_height => return Zone::TopEdge,
        _ => {}
    }

    Zone::Center
}

/// The middle-click rectangle sits centered horizontally on the side opposite
/// the horizontal scroll band.
fn in_middle_click_zone(x: f32, y: f32, config: &EngineConfig) -> bool {
    let half_width = config.middle_click_zone_width / 2.0;
    if (x - 0.5).abs() > half_width {
        return false;
    }
    match config.horizontal_position {
        HorizontalPosition::Bottom => y > 1.0 - config.middle_click_zone_height,
        HorizontalPosition::Top => y < config.middle_click_zone_height,
    }
}

/// How far inside its zone a touch starts, in `[0, 1]`.
///
/// Measured from the zone's inner boundary toward the trackpad rim, so a
/// touch hugging the physical edge scores 1.0. Non-scroll zones score 0.
pub fn zone_depth(zone: Zone, x: f32, y: f32, config: &EngineConfig) -> f32 {
    let depth = match zone {
        Zone::LeftEdge => (config.edge_zone_width - x) / config.edge_zone_width,
        Zone::RightEdge => (x - (1.0 - config.edge_zone_width)) / config.edge_zone_width,
        Zone::BottomEdge => {
            (config.horizontal_zone_height - y) / config.horizontal_zone_height
        }
        Zone::TopEdge => {
            (y - (1.0 - config.horizontal_zone_height)) / config.horizontal_zone_height
        }
        Zone::TopLeftCorner
        | Zone::TopRightCorner
        | Zone::BottomLeftCorner
        | Zone::BottomRightCorner => {
            let s = config.corner_trigger_zone_size;
            let dx = match zone {
                Zone::TopLeftCorner | Zone::BottomLeftCorner => x,
                _ => 1.0 - x,
            };
            let dy = match zone {
                Zone::BottomLeftCorner | Zone::BottomRightCorner => y,
                _ => 1.0 - y,
            };
            1.0 - dx.max(dy) / s
        }
        _ => 0.0,
    };
    depth.clamp(0.0, 1.0)
}
