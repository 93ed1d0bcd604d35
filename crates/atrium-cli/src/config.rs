//! CLI configuration from the environment.

use atrium_scene::{ReconcileConfig, RoomMatching};
use tracing::warn;

use crate::codec::CoordinateSystem;

/// Settings for the `atrium` binary.
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// Remove rooms a later snapshot no longer reports.
    pub remove_missing_rooms: bool,
    /// Also match re-scanned rooms by floor footprint.
    pub match_footprints: bool,
    pub footprint_tolerance: f32,
    /// Frame written by `export` and `build`.
    pub coordinate_system: CoordinateSystem,
    /// Keep global mesh anchors when exporting.
    pub include_mesh: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            remove_missing_rooms: true,
            match_footprints: false,
            footprint_tolerance: ReconcileConfig::default().footprint_tolerance,
            coordinate_system: CoordinateSystem::RightHandedYUp,
            include_mesh: false,
        }
    }
}

impl CliConfig {
    /// Read `ATRIUM_*` variables, keeping defaults for unset or unparsable
    /// values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`CliConfig::from_env`] over an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| match lookup(key).as_deref().map(str::trim) {
            None | Some("") => default,
            Some("1" | "true" | "yes" | "on") => true,
            Some("0" | "false" | "no" | "off") => false,
            Some(other) => {
                warn!(%key, value = %other, "ignoring unparsable flag");
                default
            }
        };

        let footprint_tolerance = match lookup("ATRIUM_FOOTPRINT_TOLERANCE") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "ignoring unparsable ATRIUM_FOOTPRINT_TOLERANCE");
                defaults.footprint_tolerance
            }),
            None => defaults.footprint_tolerance,
        };

        let coordinate_system = match lookup("ATRIUM_COORDINATES") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "ignoring unknown ATRIUM_COORDINATES");
                defaults.coordinate_system
            }),
            None => defaults.coordinate_system,
        };

        Self {
            remove_missing_rooms: flag("ATRIUM_REMOVE_MISSING", defaults.remove_missing_rooms),
            match_footprints: flag("ATRIUM_MATCH_FOOTPRINTS", defaults.match_footprints),
            footprint_tolerance,
            coordinate_system,
            include_mesh: flag("ATRIUM_INCLUDE_MESH", defaults.include_mesh),
        }
    }

    pub fn reconcile_config(&self) -> ReconcileConfig {
        let matching = if self.match_footprints {
            RoomMatching::UuidOrFootprint
        } else {
            RoomMatching::Uuid
        };
        ReconcileConfig::default()
            .with_remove_missing_rooms(self.remove_missing_rooms)
            .with_room_matching(matching)
            .with_footprint_tolerance(self.footprint_tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(CliConfig::from_lookup(lookup(&[])), CliConfig::default());
    }

    #[test]
    fn reads_flags_and_values() {
        let config = CliConfig::from_lookup(lookup(&[
            ("ATRIUM_REMOVE_MISSING", "false"),
            ("ATRIUM_MATCH_FOOTPRINTS", "1"),
            ("ATRIUM_FOOTPRINT_TOLERANCE", "0.1"),
            ("ATRIUM_COORDINATES", "left-handed-y-up"),
        ]));
        assert!(!config.remove_missing_rooms);
        assert!(config.match_footprints);
        assert_eq!(config.footprint_tolerance, 0.1);
        assert_eq!(config.coordinate_system, CoordinateSystem::LeftHandedYUp);

        let reconcile = config.reconcile_config();
        assert!(!reconcile.remove_missing_rooms);
        assert_eq!(reconcile.room_matching, RoomMatching::UuidOrFootprint);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let config = CliConfig::from_lookup(lookup(&[
            ("ATRIUM_REMOVE_MISSING", "maybe"),
            ("ATRIUM_FOOTPRINT_TOLERANCE", "wide"),
            ("ATRIUM_COORDINATES", "polar"),
        ]));
        assert_eq!(config, CliConfig::default());
    }
}
