//! Activity-to-color mapping and the heartbeat pulse waveform.
//!
//! Everything here is a pure function of its arguments. In particular the
//! pulse functions take wall-clock milliseconds and keep no phase, so any
//! number of observers sampling the same instant agree exactly.

use std::f64::consts::PI;

use frontier_types::{Room, RoomHeat};

/// An 8-bit-per-channel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Construct a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` form.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// `rgba(r, g, b, alpha)` form for strokes and halos.
    pub fn to_rgba(self, alpha: f64) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.r,
            self.g,
            self.b,
            alpha.clamp(0.0, 1.0)
        )
    }

    /// Channel-wise linear interpolation, rounded to the nearest integer.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: lerp_channel(self.r, other.r, t),
            g: lerp_channel(self.g, other.g, t),
            b: lerp_channel(self.b, other.b, t),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp_channel(a: u8, b: u8, t: f64) -> u8 {
    let v = f64::from(a).mul_add(1.0 - t, f64::from(b) * t);
    // Clamped to the u8 range before the cast.
    v.round().clamp(0.0, 255.0) as u8
}

/// Color of an idle room.
pub const LOW: Rgb = Rgb::new(0x3b, 0x82, 0xf6);
/// Color at half activity.
pub const MEDIUM: Rgb = Rgb::new(0xfa, 0xcc, 0x15);
/// Color of a room at full activity.
pub const HIGH: Rgb = Rgb::new(0xef, 0x44, 0x44);

/// Map activity in `[0, 1]` to a color on the LOW → MEDIUM → HIGH ramp.
///
/// Each half of the range interpolates linearly between its two anchors.
/// Inputs outside `[0, 1]` are clamped; NaN maps to LOW.
pub fn activity_color(activity: f64) -> Rgb {
    let a = if activity.is_nan() {
        0.0
    } else {
        activity.clamp(0.0, 1.0)
    };
    if a <= 0.5 {
        LOW.lerp(MEDIUM, a / 0.5)
    } else {
        MEDIUM.lerp(HIGH, (a - 0.5) / 0.5)
    }
}

/// [`activity_color`] as `#rrggbb`.
pub fn activity_color_hex(activity: f64) -> String {
    activity_color(activity).to_hex()
}

/// [`activity_color`] as `rgba(...)` with the given alpha.
pub fn activity_color_rgba(activity: f64, alpha: f64) -> String {
    activity_color(activity).to_rgba(alpha)
}

/// Alpha of the halo drawn around a room.
pub const HALO_ALPHA: f64 = 0.4;

/// Heat-map values for a room at its current activity.
pub fn room_heat(room: &Room) -> RoomHeat {
    let color = activity_color(room.activity);
    RoomHeat {
        room_id: room.id.clone(),
        heat_color: color.to_hex(),
        halo_color: color.to_rgba(HALO_ALPHA),
        pulse_intensity: pulse_intensity(room.activity),
    }
}

/// [`room_heat`] for every room, in order.
pub fn floor_heat(rooms: &[Room]) -> Vec<RoomHeat> {
    rooms.iter().map(room_heat).collect()
}

// ---------------------------------------------------------------------------
// Pulse
// ---------------------------------------------------------------------------

/// Length of one heartbeat cycle.
pub const PULSE_CYCLE_MS: u64 = 2_000;

/// Phase window of the first beat.
const BEAT_ONE: (f64, f64) = (0.0, 0.15);
/// Phase window of the second beat.
const BEAT_TWO: (f64, f64) = (0.30, 0.45);
/// Relative amplitude of the second beat.
const BEAT_TWO_AMPLITUDE: f64 = 0.8;
/// Largest fractional growth at full beat and full intensity.
const PULSE_GAIN: f64 = 0.2;

/// Pulse strength for an activity level: never silent, never above 1.
pub fn pulse_intensity(activity: f64) -> f64 {
    let a = if activity.is_nan() {
        0.0
    } else {
        activity.clamp(0.0, 1.0)
    };
    a.mul_add(0.9, 0.1)
}

/// Heartbeat waveform value in `[0, 1]` at `time_ms`.
///
/// Two sine-shaped beats per 2000 ms cycle: full amplitude over the first
/// 15 % of the cycle, 0.8 amplitude over 30 %–45 %, rest elsewhere.
#[allow(clippy::cast_precision_loss)]
pub fn heartbeat(time_ms: u64) -> f64 {
    // Both operands are below 2^53, so the conversions are exact.
    let phase = (time_ms % PULSE_CYCLE_MS) as f64 / PULSE_CYCLE_MS as f64;
    beat(phase, BEAT_ONE, 1.0) + beat(phase, BEAT_TWO, BEAT_TWO_AMPLITUDE)
}

fn beat(phase: f64, (start, end): (f64, f64), amplitude: f64) -> f64 {
    if phase < start || phase >= end {
        return 0.0;
    }
    amplitude * (PI * (phase - start) / (end - start)).sin()
}

/// Visual scale multiplier at `time_ms`:
/// `base_scale * (1 + heartbeat * intensity * 0.2)`.
pub fn pulse_scale(time_ms: u64, intensity: f64, base_scale: f64) -> f64 {
    base_scale * (heartbeat(time_ms) * intensity).mul_add(PULSE_GAIN, 1.0)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn anchors_are_exact() {
        assert_eq!(activity_color(0.0), LOW);
        assert_eq!(activity_color(0.5), MEDIUM);
        assert_eq!(activity_color(1.0), HIGH);
    }

    #[test]
    fn out_of_range_is_clamped() {
        assert_eq!(activity_color(-3.0), LOW);
        assert_eq!(activity_color(7.0), HIGH);
        assert_eq!(activity_color(f64::NAN), LOW);
    }

    #[test]
    fn linear_within_each_half() {
        // Quarter point is the channel midpoint of LOW and MEDIUM.
        let quarter = activity_color(0.25);
        let expected_r = ((f64::from(LOW.r) + f64::from(MEDIUM.r)) / 2.0).round();
        assert_eq!(f64::from(quarter.r), expected_r);

        let three_quarter = activity_color(0.75);
        let expected_g = ((f64::from(MEDIUM.g) + f64::from(HIGH.g)) / 2.0).round();
        assert_eq!(f64::from(three_quarter.g), expected_g);
    }

    #[test]
    fn progression_is_monotonic_per_half() {
        // Red rises monotonically across the lower half (LOW.r < MEDIUM.r).
        let mut last = 0_u8;
        for step in 0..=50 {
            let c = activity_color(f64::from(step) / 100.0);
            assert!(c.r >= last);
            last = c.r;
        }
        // Green falls monotonically across the upper half (MEDIUM.g > HIGH.g).
        let mut last = u8::MAX;
        for step in 50..=100 {
            let c = activity_color(f64::from(step) / 100.0);
            assert!(c.g <= last);
            last = c.g;
        }
    }

    #[test]
    fn room_heat_follows_activity() {
        let room = Room {
            id: frontier_types::RoomId::from("lab"),
            name: "Lab".to_owned(),
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            capacity: 4,
            activity: 1.0,
        };
        let heat = room_heat(&room);
        assert_eq!(heat.heat_color, "#ef4444");
        assert_eq!(heat.halo_color, "rgba(239, 68, 68, 0.4)");
        assert_eq!(heat.pulse_intensity, 1.0);

        let idle = room_heat(&Room { activity: 0.0, ..room });
        assert_eq!(idle.heat_color, "#3b82f6");
        assert_eq!(idle.pulse_intensity, 0.1);
    }

    #[test]
    fn hex_and_rgba_formats() {
        assert_eq!(activity_color_hex(0.0), "#3b82f6");
        assert_eq!(activity_color_hex(1.0), "#ef4444");
        assert_eq!(activity_color_rgba(0.5, 0.4), "rgba(250, 204, 21, 0.4)");
        assert_eq!(LOW.to_rgba(3.0), "rgba(59, 130, 246, 1)");
    }

    #[test]
    fn intensity_bounds() {
        assert_eq!(pulse_intensity(0.0), 0.1);
        assert_eq!(pulse_intensity(1.0), 1.0);
        assert_eq!(pulse_intensity(-1.0), 0.1);
        assert_eq!(pulse_intensity(2.0), 1.0);
    }

    #[test]
    fn heartbeat_shape() {
        // Rest at cycle start, peaks mid-beat, rest between and after beats.
        assert_eq!(heartbeat(0), 0.0);
        assert!((heartbeat(150) - 1.0).abs() < 1e-12);
        assert_eq!(heartbeat(400), 0.0);
        assert!((heartbeat(750) - 0.8).abs() < 1e-12);
        assert_eq!(heartbeat(1_000), 0.0);
        assert_eq!(heartbeat(1_999), 0.0);
        // Periodic.
        assert_eq!(heartbeat(150), heartbeat(150 + 7 * PULSE_CYCLE_MS));
    }

    #[test]
    fn pulse_scale_is_pure() {
        let t = 1_717_243_200_123_u64;
        let a = pulse_scale(t, 0.7, 1.5);
        let b = pulse_scale(t, 0.7, 1.5);
        assert_eq!(a, b);
    }

    #[test]
    fn pulse_scale_at_rest_and_peak() {
        assert_eq!(pulse_scale(1_000, 1.0, 2.0), 2.0);
        let peak = pulse_scale(150, 1.0, 1.0);
        assert!((peak - 1.2).abs() < 1e-12);
    }
}
