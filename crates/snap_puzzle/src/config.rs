use core::time::Duration;

use bevy::prelude::*;

/// Installs the default [`PuzzleConfig`] unless the app already provides one.
pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PuzzleConfig>();
    }
}

/// Which free tiles the auto-completer may pull into the last open slot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutoCompleteMatching {
    /// Any free tile close enough, even one that belongs elsewhere. A wrong
    /// tile pulled in this way keeps the board from being won until moved.
    #[default]
    AnyTile,
    /// Only the tile whose id matches the slot.
    MatchingTileOnly,
}

/// Resource holding every tunable of the puzzle.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PuzzleConfig {
    // Board layout
    /// Number of slot columns
    pub columns: u32,
    /// Number of slot rows
    pub rows: u32,
    /// Side of a square tile and of a slot, in logical pixels
    pub tile_size: f32,
    /// Distance between the top of the viewport and the first slot row
    pub grid_top_margin: f32,

    // Placement rules
    /// A released tile snaps to a free slot strictly closer than this
    pub snap_threshold: f32,
    /// A tile counts as correctly placed when both axes differ by less than this
    pub placement_tolerance: f32,
    /// Which tiles auto-completion may pull into the last slot
    pub auto_complete: AutoCompleteMatching,

    // Stacking
    /// z-order of a tile that was never touched
    pub resting_z: f32,
    /// z-order of a tile sitting in a slot
    pub snapped_z: f32,
    /// z-order of a tile being dragged, and of one dropped outside any slot
    pub dragging_z: f32,

    // Completion feedback
    /// Vibration pattern played on completion, alternating on/off milliseconds
    pub haptic_pattern: Vec<u32>,
    /// Particle burst played on completion
    pub confetti: ConfettiConfig,
    /// How long the result banner stays before a tap starts a new round
    pub result_delay: Duration,
}

impl PuzzleConfig {
    pub const fn tile_count(&self) -> u32 {
        self.columns * self.rows
    }

    pub const fn tile_extent(&self) -> Vec2 {
        Vec2::splat(self.tile_size)
    }
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            columns: 4,
            rows: 6,
            tile_size: 80.0,
            grid_top_margin: 60.0,
            snap_threshold: 50.0,
            placement_tolerance: 5.0,
            auto_complete: AutoCompleteMatching::default(),
            resting_z: 1.0,
            snapped_z: 5.0,
            dragging_z: 10.0,
            haptic_pattern: vec![100, 50, 400],
            confetti: ConfettiConfig::default(),
            result_delay: Duration::from_secs(2),
        }
    }
}

/// Shape of the completion particle burst.
///
/// Velocities and gravity are in pixels per 60 Hz tick, angles in degrees
/// with 90 pointing straight up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfettiConfig {
    pub particle_count: u32,
    pub spread_degrees: f32,
    pub start_velocity: f32,
    pub angle_degrees: f32,
    /// Size multiplier applied to every particle
    pub scalar: f32,
    pub gravity: f32,
    /// Fraction of speed kept after each tick
    pub decay: f32,
    /// Vertical origin as a fraction of the viewport height, from the top
    pub origin_y: f32,
    /// Lifetime of the burst
    pub duration: Duration,
    /// Side of a particle at `scalar == 1`
    pub particle_size: f32,
}

impl Default for ConfettiConfig {
    fn default() -> Self {
        Self {
            particle_count: 100,
            spread_degrees: 30.0,
            start_velocity: 90.0,
            angle_degrees: 90.0,
            scalar: 1.0,
            gravity: 5.0,
            decay: 0.9,
            origin_y: 0.9,
            duration: Duration::from_millis(1500),
            particle_size: 8.0,
        }
    }
}
