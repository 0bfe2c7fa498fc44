//! Engine configuration.
//!
//! Every tunable lives here with its legal range and default. Values are
//! clamped on construction and again on load, so an out-of-range persisted
//! value can never reject startup.
//!
//! Option enums persist as stable ASCII tokens. One historical release wrote
//! localized raw values instead; [`EngineConfig::load`] accepts those once,
//! rewrites the stored value as the ASCII token, and the save path only ever
//! writes ASCII.

use indexmap::IndexMap;

use crate::capabilities::SettingsStore;

// ============================================================================
// Option enums
// ============================================================================

/// Which side(s) of the trackpad act as a vertical scroll strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalEdgeMode {
    Left,
    #[default]
    Right,
    Both,
}

/// Where the horizontal scroll strip sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalPosition {
    #[default]
    Bottom,
    Top,
}

/// Shaping applied to raw deltas before accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccelerationCurve {
    #[default]
    Linear,
    Quadratic,
    Cubic,
    Ease,
}

/// The four trackpad corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];
}

/// Action fired by a corner tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CornerAction {
    #[default]
    None,
    MissionControl,
    AppWindows,
    ShowDesktop,
    Launchpad,
    NotificationCenter,
    RightClick,
}

/// Result of parsing a persisted enum token.
struct ParsedToken<T> {
    value: T,
    /// The stored value was a legacy localized token and must be rewritten.
    legacy: bool,
}

macro_rules! token_enum {
    ($ty:ty, $( $variant:path => $token:literal, $legacy:literal );+ $(;)?) => {
        impl $ty {
            /// Stable ASCII persistence token.
            pub fn as_token(self) -> &'static str {
                match self {
                    $( $variant => $token, )+
                }
            }

            fn parse(text: &str) -> Option<ParsedToken<Self>> {
                match text {
                    $( $token => Some(ParsedToken { value: $variant, legacy: false }), )+
                    $( $legacy => Some(ParsedToken { value: $variant, legacy: true }), )+
                    _ => None,
                }
            }

            /// Parses a stable ASCII token (legacy tokens are rejected here;
            /// only the load path migrates them).
            pub fn from_token(text: &str) -> Option<Self> {
                match Self::parse(text) {
                    Some(ParsedToken { value, legacy: false }) => Some(value),
                    _ => None,
                }
            }
        }
    };
}

token_enum!(VerticalEdgeMode,
    VerticalEdgeMode::Left => "left", "左側";
    VerticalEdgeMode::Right => "right", "右側";
    VerticalEdgeMode::Both => "both", "兩側";
);

token_enum!(HorizontalPosition,
    HorizontalPosition::Bottom => "bottom", "底部";
    HorizontalPosition::Top => "top", "頂部";
);

token_enum!(AccelerationCurve,
    AccelerationCurve::Linear => "linear", "線性";
    AccelerationCurve::Quadratic => "quadratic", "二次";
    AccelerationCurve::Cubic => "cubic", "三次";
    AccelerationCurve::Ease => "ease", "緩動";
);

token_enum!(CornerAction,
    CornerAction::None => "none", "無";
    CornerAction::MissionControl => "missionControl", "調度中心";
    CornerAction::AppWindows => "appWindows", "應用程式視窗";
    CornerAction::ShowDesktop => "showDesktop", "顯示桌面";
    CornerAction::Launchpad => "launchpad", "啟動台";
    CornerAction::NotificationCenter => "notificationCenter", "通知中心";
    CornerAction::RightClick => "rightClick", "右鍵選單";
);

// ============================================================================
// Persisted keys
// ============================================================================

/// Persisted key names, shared by the engine and any host settings UI.
pub mod keys {
    pub const SCROLL_MULTIPLIER: &str = "scrollMultiplier";
    pub const EDGE_ZONE_WIDTH: &str = "edgeZoneWidth";
    pub const BOTTOM_ZONE_HEIGHT: &str = "bottomZoneHeight";
    pub const CORNER_TRIGGER_ZONE_SIZE: &str = "cornerTriggerZoneSize";
    pub const VERTICAL_EDGE_MODE: &str = "verticalEdgeMode";
    pub const HORIZONTAL_POSITION: &str = "horizontalPosition";
    pub const MIDDLE_CLICK_ENABLED: &str = "middleClickEnabled";
    pub const MIDDLE_CLICK_ZONE_WIDTH: &str = "middleClickZoneWidth";
    pub const MIDDLE_CLICK_ZONE_HEIGHT: &str = "middleClickZoneHeight";
    pub const CORNER_TRIGGER_ENABLED: &str = "cornerTriggerEnabled";
    pub const FILTER_LIGHT_TOUCHES: &str = "filterLightTouches";
    pub const FILTER_LARGE_TOUCHES: &str = "filterLargeTouches";
    pub const LAUNCH_AT_LOGIN: &str = "launchAtLogin";
    pub const IS_ENABLED: &str = "isEnabled";
    pub const CORNER_ACTION_TOP_LEFT: &str = "cornerActionTopLeft";
    pub const CORNER_ACTION_TOP_RIGHT: &str = "cornerActionTopRight";
    pub const CORNER_ACTION_BOTTOM_LEFT: &str = "cornerActionBottomLeft";
    pub const CORNER_ACTION_BOTTOM_RIGHT: &str = "cornerActionBottomRight";
    pub const ACCELERATION_CURVE_TYPE: &str = "accelerationCurveType";
    pub const LIGHT_TOUCH_DENSITY_THRESHOLD: &str = "lightTouchDensityThreshold";
    pub const LARGE_TOUCH_MAJOR_AXIS_THRESHOLD: &str = "largeTouchMajorAxisThreshold";
    pub const LARGE_TOUCH_MINOR_AXIS_THRESHOLD: &str = "largeTouchMinorAxisThreshold";
}

fn corner_key(corner: Corner) -> &'static str {
    match corner {
        Corner::TopLeft => keys::CORNER_ACTION_TOP_LEFT,
        Corner::TopRight => keys::CORNER_ACTION_TOP_RIGHT,
        Corner::BottomLeft => keys::CORNER_ACTION_BOTTOM_LEFT,
        Corner::BottomRight => keys::CORNER_ACTION_BOTTOM_RIGHT,
    }
}

// ============================================================================
// EngineConfig
// ============================================================================

/// All engine tunables.
///
/// `launch_at_login` and `is_enabled` belong to the host surface; they are
/// round-tripped here so one store owns the whole schema.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Fraction of trackpad width used as left/right scroll strip. 0.05..=0.30.
    pub edge_zone_width: f32,
    /// Fraction of trackpad height used as the horizontal strip. 0.10..=0.40.
    pub horizontal_zone_height: f32,
    /// Scroll speed multiplier. 1.0..=10.0.
    pub scroll_multiplier: f32,
    pub vertical_edge_mode: VerticalEdgeMode,
    pub horizontal_position: HorizontalPosition,
    pub middle_click_enabled: bool,
    pub middle_click_zone_width: f32,
    pub middle_click_zone_height: f32,
    pub corner_trigger_enabled: bool,
    /// Side of the square corner zones. 0.05..=0.25.
    pub corner_trigger_zone_size: f32,
    pub corner_actions: IndexMap<Corner, CornerAction>,
    pub acceleration_curve: AccelerationCurve,
    pub filter_light_touches: bool,
    pub light_touch_density_threshold: f32,
    pub filter_large_touches: bool,
    pub large_touch_major_axis_threshold: f32,
    pub large_touch_minor_axis_threshold: f32,
    pub launch_at_login: bool,
    pub is_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let mut corner_actions = IndexMap::new();
        for corner in Corner::ALL {
            corner_actions.insert(corner, CornerAction::None);
        }
        Self {
            edge_zone_width: 0.15,
            horizontal_zone_height: 0.30,
            scroll_multiplier: 3.0,
            vertical_edge_mode: VerticalEdgeMode::default(),
            horizontal_position: HorizontalPosition::default(),
            middle_click_enabled: false,
            middle_click_zone_width: 0.30,
            middle_click_zone_height: 0.15,
            corner_trigger_enabled: false,
            corner_trigger_zone_size: 0.10,
            corner_actions,
            acceleration_curve: AccelerationCurve::default(),
            filter_light_touches: true,
            light_touch_density_threshold: 0.02,
            filter_large_touches: true,
            large_touch_major_axis_threshold: 15.0,
            large_touch_minor_axis_threshold: 12.0,
            launch_at_login: false,
            is_enabled: true,
        }
    }
}

impl EngineConfig {
    /// Clamps every numeric field to its legal range, in place.
    pub fn clamp_ranges(&mut self) {
        self.edge_zone_width = self.edge_zone_width.clamp(0.05, 0.30);
        self.horizontal_zone_height = self.horizontal_zone_height.clamp(0.10, 0.40);
        self.scroll_multiplier = self.scroll_multiplier.clamp(1.0, 10.0);
        self.middle_click_zone_width = self.middle_click_zone_width.clamp(0.10, 0.50);
        self.middle_click_zone_height = self.middle_click_zone_height.clamp(0.05, 0.30);
        self.corner_trigger_zone_size = self.corner_trigger_zone_size.clamp(0.05, 0.25);
        self.light_touch_density_threshold = self.light_touch_density_threshold.clamp(0.0, 0.20);
        self.large_touch_major_axis_threshold =
            self.large_touch_major_axis_threshold.clamp(5.0, 50.0);
        self.large_touch_minor_axis_threshold =
            self.large_touch_minor_axis_threshold.clamp(5.0, 50.0);
    }

    pub fn corner_action(&self, corner: Corner) -> CornerAction {
        self.corner_actions
            .get(&corner)
            .copied()
            .unwrap_or(CornerAction::None)
    }

    /// Loads the configuration from the store, clamping every value and
    /// migrating legacy localized enum tokens to ASCII as a side effect.
    pub fn load(store: &mut dyn SettingsStore) -> Self {
        let mut config = Self::default();

        if let Some(v) = store.get_f32(keys::EDGE_ZONE_WIDTH) {
            config.edge_zone_width = v;
        }
        if let Some(v) = store.get_f32(keys::BOTTOM_ZONE_HEIGHT) {
            config.horizontal_zone_height = v;
        }
        if let Some(v) = store.get_f32(keys::SCROLL_MULTIPLIER) {
            config.scroll_multiplier = v;
        }
        if let Some(v) = store.get_f32(keys::MIDDLE_CLICK_ZONE_WIDTH) {
            config.middle_click_zone_width = v;
        }
        if let Some(v) = store.get_f32(keys::MIDDLE_CLICK_ZONE_HEIGHT) {
            config.middle_click_zone_height = v;
        }
        if let Some(v) = store.get_f32(keys::CORNER_TRIGGER_ZONE_SIZE) {
            config.corner_trigger_zone_size = v;
        }
        if let Some(v) = store.get_f32(keys::LIGHT_TOUCH_DENSITY_THRESHOLD) {
            config.light_touch_density_threshold = v;
        }
        if let Some(v) = store.get_f32(keys::LARGE_TOUCH_MAJOR_AXIS_THRESHOLD) {
            config.large_touch_major_axis_threshold = v;
        }
        if let Some(v) = store.get_f32(keys::LARGE_TOUCH_MINOR_AXIS_THRESHOLD) {
            config.large_touch_minor_axis_threshold = v;
        }
        if let Some(v) = store.get_bool(keys::MIDDLE_CLICK_ENABLED) {
            config.middle_click_enabled = v;
        }
        if let Some(v) = store.get_bool(keys::CORNER_TRIGGER_ENABLED) {
            config.corner_trigger_enabled = v;
        }
        if let Some(v) = store.get_bool(keys::FILTER_LIGHT_TOUCHES) {
            config.filter_light_touches = v;
        }
        if let Some(v) = store.get_bool(keys::FILTER_LARGE_TOUCHES) {
            config.filter_large_touches = v;
        }
        if let Some(v) = store.get_bool(keys::LAUNCH_AT_LOGIN) {
            config.launch_at_login = v;
        }
        if let Some(v) = store.get_bool(keys::IS_ENABLED) {
            config.is_enabled = v;
        }

        config.vertical_edge_mode = load_enum(
            store,
            keys::VERTICAL_EDGE_MODE,
            VerticalEdgeMode::parse,
            VerticalEdgeMode::as_token,
            config.vertical_edge_mode,
        );
        config.horizontal_position = load_enum(
            store,
            keys::HORIZONTAL_POSITION,
            HorizontalPosition::parse,
            HorizontalPosition::as_token,
            config.horizontal_position,
        );
        config.acceleration_curve = load_enum(
            store,
            keys::ACCELERATION_CURVE_TYPE,
            AccelerationCurve::parse,
            AccelerationCurve::as_token,
            config.acceleration_curve,
        );
        for corner in Corner::ALL {
            let action = load_enum(
                store,
                corner_key(corner),
                CornerAction::parse,
                CornerAction::as_token,
                config.corner_action(corner),
            );
            config.corner_actions.insert(corner, action);
        }

        config.clamp_ranges();
        config
    }

    /// Writes the full configuration. Only ASCII tokens are ever written.
    pub fn save(&self, store: &mut dyn SettingsStore) {
        store.set_f32(keys::EDGE_ZONE_WIDTH, self.edge_zone_width);
        store.set_f32(keys::BOTTOM_ZONE_HEIGHT, self.horizontal_zone_height);
        store.set_f32(keys::SCROLL_MULTIPLIER, self.scroll_multiplier);
        store.set_f32(keys::MIDDLE_CLICK_ZONE_WIDTH, self.middle_click_zone_width);
        store.set_f32(
            keys::MIDDLE_CLICK_ZONE_HEIGHT,
            self.middle_click_zone_height,
        );
        store.set_f32(
            keys::CORNER_TRIGGER_ZONE_SIZE,
            self.corner_trigger_zone_size,
        );
        store.set_f32(
            keys::LIGHT_TOUCH_DENSITY_THRESHOLD,
            self.light_touch_density_threshold,
        );
        store.set_f32(
            keys::LARGE_TOUCH_MAJOR_AXIS_THRESHOLD,
            self.large_touch_major_axis_threshold,
        );
        store.set_f32(
            keys::LARGE_TOUCH_MINOR_AXIS_THRESHOLD,
            self.large_touch_minor_axis_threshold,
        );
        store.set_bool(keys::MIDDLE_CLICK_ENABLED, self.middle_click_enabled);
        store.set_bool(keys::CORNER_TRIGGER_ENABLED, self.corner_trigger_enabled);
        store.set_bool(keys::FILTER_LIGHT_TOUCHES, self.filter_light_touches);
        store.set_bool(keys::FILTER_LARGE_TOUCHES, self.filter_large_touches);
        store.set_bool(keys::LAUNCH_AT_LOGIN, self.launch_at_login);
        store.set_bool(keys::IS_ENABLED, self.is_enabled);
        store.set_text(
            keys::VERTICAL_EDGE_MODE,
            self.vertical_edge_mode.as_token(),
        );
        store.set_text(
            keys::HORIZONTAL_POSITION,
            self.horizontal_position.as_token(),
        );
        store.set_text(
            keys::ACCELERATION_CURVE_TYPE,
            self.acceleration_curve.as_token(),
        );
        for corner in Corner::ALL {
            store.set_text(corner_key(corner), self.corner_action(corner).as_token());
        }
    }
}

/// Loads one enum setting, rewriting legacy tokens in place.
fn load_enum<T: Copy>(
    store: &mut dyn SettingsStore,
    key: &str,
    parse: impl Fn(&str) -> Option<ParsedToken<T>>,
    as_token: impl Fn(T) -> &'static str,
    default: T,
) -> T {
    let Some(text) = store.get_text(key) else {
        return default;
    };
    match parse(&text) {
        Some(ParsedToken { value, legacy }) => {
            if legacy {
                log::info!("migrating legacy setting {key}={text:?} to {:?}", as_token(value));
                store.set_text(key, as_token(value));
            }
            value
        }
        None => {
            log::warn!("unrecognized value {text:?} for setting {key}, using default");
            default
        }
    }
}
