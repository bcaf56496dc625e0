//! Camera transition controller.
//!
//! A small state machine over a frame clock:
//!
//! ```text
//! Idle --retarget--> Animating --complete--> Idle
//!                        |
//!                        +--complete (orbit)--> Orbiting
//! ```
//!
//! Time is a [`Duration`] since the frame clock's origin. Sampling with
//! [`CameraController::pose_at`] never mutates anything; [`CameraController::tick`]
//! only moves the phase forward once an animation has run its course.
//! Exactly one animation is live at a time: a retarget snapshots the pose
//! the camera is showing at that instant and starts a fresh animation from
//! there.

use std::f64::consts::TAU;
use std::time::Duration;

use frontier_types::{BoundingBox, CameraMode, CameraPhase, CameraPose, CameraView, Easing, Vec3};

use crate::bubbles::FLOOR_HEIGHT;
use crate::config::CameraConfig;

/// Height of the focus camera above the floor, as a fraction of the
/// floor's largest horizontal extent.
const FOCUS_HEIGHT: f64 = 0.8;
/// Forward offset of the focus camera, as a fraction of the floor's extent.
const FOCUS_DISTANCE: f64 = 0.9;
/// Overview camera offsets, as fractions of the tower's horizontal extent.
const OVERVIEW_SIDE: f64 = 1.0;
const OVERVIEW_HEIGHT: f64 = 0.75;
const OVERVIEW_DISTANCE: f64 = 1.5;
/// Orbit radius and lift, as fractions of the tower's horizontal extent.
const ORBIT_RADIUS: f64 = 1.5;
const ORBIT_LIFT: f64 = 0.5;
/// Lower bound on the extent used for framing, so a tiny layout still
/// gets a usable camera distance.
const MIN_FRAME_SPAN: f64 = 100.0;

// ---------------------------------------------------------------------------
// Easing
// ---------------------------------------------------------------------------

/// Cubic ease-in-out on `[0, 1]`.
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0_f64).mul_add(t, 2.0).powi(3) / 2.0
    }
}

/// Quartic ease-in-out on `[0, 1]`.
pub fn ease_in_out_quartic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        8.0 * t * t * t * t
    } else {
        1.0 - (-2.0_f64).mul_add(t, 2.0).powi(4) / 2.0
    }
}

/// Apply an easing curve.
pub fn ease(easing: Easing, t: f64) -> f64 {
    match easing {
        Easing::Cubic => ease_in_out_cubic(t),
        Easing::Quartic => ease_in_out_quartic(t),
    }
}

// ---------------------------------------------------------------------------
// Framing targets
// ---------------------------------------------------------------------------

/// Geometry needed to frame one floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorFrame {
    /// Padded room extents on the layout plane.
    pub bounds: BoundingBox,
    /// Elevation of the floor's base plane.
    pub elevation: f64,
}

/// Geometry needed to frame the whole tower.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TowerFrame {
    /// Union of all floor bounds.
    pub bounds: BoundingBox,
    /// Total height of the stacked floor bands.
    pub height: f64,
}

/// What the camera should be framing after a focus change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraTarget {
    /// Frame a single floor.
    Floor(FloorFrame),
    /// Frame the whole tower from a fixed vantage point.
    Overview(TowerFrame),
    /// Circle the tower.
    Orbit(TowerFrame),
}

impl CameraTarget {
    /// Transition kind used to reach this target.
    pub const fn transition(&self) -> Transition {
        match self {
            Self::Floor(_) => Transition::Focus,
            Self::Overview(_) => Transition::Overview,
            Self::Orbit(_) => Transition::Orbit,
        }
    }

    /// Framing mode the camera is in once this target is reached.
    pub const fn mode(&self) -> CameraMode {
        match self {
            Self::Floor(_) => CameraMode::Focused,
            Self::Overview(_) => CameraMode::Overview,
            Self::Orbit(_) => CameraMode::Orbital,
        }
    }

    /// Resting pose for this target (the orbit's entry point for orbits).
    pub fn pose(&self) -> CameraPose {
        match self {
            Self::Floor(frame) => focus_pose(frame),
            Self::Overview(frame) => overview_pose(frame),
            Self::Orbit(frame) => orbit_pose(frame, 0.0),
        }
    }
}

/// Largest horizontal extent of a box, floored at [`MIN_FRAME_SPAN`].
fn frame_span(bounds: &BoundingBox) -> f64 {
    bounds.width().max(bounds.depth()).max(MIN_FRAME_SPAN)
}

/// Pose that frames one floor from above and in front.
pub fn focus_pose(frame: &FloorFrame) -> CameraPose {
    let (cx, cz) = frame.bounds.center();
    let span = frame_span(&frame.bounds);
    let band_center = FLOOR_HEIGHT.mul_add(0.5, frame.elevation);
    CameraPose::new(
        Vec3::new(
            cx,
            span.mul_add(FOCUS_HEIGHT, band_center),
            span.mul_add(FOCUS_DISTANCE, cz),
        ),
        Vec3::new(cx, band_center, cz),
    )
}

/// Pose that frames the whole tower.
pub fn overview_pose(frame: &TowerFrame) -> CameraPose {
    let (cx, cz) = frame.bounds.center();
    let span = frame_span(&frame.bounds);
    let mid = frame.height * 0.5;
    CameraPose::new(
        Vec3::new(
            span.mul_add(OVERVIEW_SIDE, cx),
            span.mul_add(OVERVIEW_HEIGHT, mid),
            span.mul_add(OVERVIEW_DISTANCE, cz),
        ),
        Vec3::new(cx, mid, cz),
    )
}

/// Pose on the orbit path at `angle` radians around the tower center.
pub fn orbit_pose(frame: &TowerFrame, angle: f64) -> CameraPose {
    let (cx, cz) = frame.bounds.center();
    let span = frame_span(&frame.bounds);
    let radius = span * ORBIT_RADIUS;
    let mid = frame.height * 0.5;
    CameraPose::new(
        Vec3::new(
            radius.mul_add(angle.sin(), cx),
            span.mul_add(ORBIT_LIFT, mid),
            radius.mul_add(angle.cos(), cz),
        ),
        Vec3::new(cx, mid, cz),
    )
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Kind of camera move, which fixes its easing and duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Entering or switching floor focus.
    Focus,
    /// Returning to the tower overview.
    Overview,
    /// Flying onto the orbit path.
    Orbit,
}

impl Transition {
    /// Easing curve for this kind of move.
    pub const fn easing(self) -> Easing {
        match self {
            Self::Focus => Easing::Cubic,
            Self::Overview | Self::Orbit => Easing::Quartic,
        }
    }
}

/// Transition durations and orbit speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraTimings {
    /// Duration of [`Transition::Focus`].
    pub focus: Duration,
    /// Duration of [`Transition::Overview`] and [`Transition::Orbit`].
    pub overview: Duration,
    /// Time for one full orbit.
    pub orbit_period: Duration,
}

impl CameraTimings {
    /// Duration for a kind of move.
    pub const fn duration(&self, transition: Transition) -> Duration {
        match transition {
            Transition::Focus => self.focus,
            Transition::Overview | Transition::Orbit => self.overview,
        }
    }
}

impl Default for CameraTimings {
    fn default() -> Self {
        Self::from(&CameraConfig::default())
    }
}

impl From<&CameraConfig> for CameraTimings {
    fn from(config: &CameraConfig) -> Self {
        Self {
            focus: Duration::from_millis(config.focus_duration_ms),
            overview: Duration::from_millis(config.overview_duration_ms),
            orbit_period: Duration::from_millis(config.orbit_period_ms),
        }
    }
}

/// One interpolation from a start pose to a target pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraAnimation {
    /// Pose at `started_at`.
    pub start: CameraPose,
    /// Pose at `started_at + duration`.
    pub target: CameraPose,
    /// Frame-clock time the animation began.
    pub started_at: Duration,
    /// Length of the animation.
    pub duration: Duration,
    /// Easing curve.
    pub easing: Easing,
}

impl CameraAnimation {
    /// Normalized progress in `[0, 1]` at `now`.
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Frame-clock time the animation reaches its target.
    pub fn ends_at(&self) -> Duration {
        self.started_at.saturating_add(self.duration)
    }

    /// Whether the animation has reached its target at `now`.
    pub fn is_complete(&self, now: Duration) -> bool {
        now >= self.ends_at()
    }

    /// Interpolated pose at `now`.
    pub fn sample(&self, now: Duration) -> CameraPose {
        let t = self.progress(now);
        if t >= 1.0 {
            return self.target;
        }
        if t <= 0.0 {
            return self.start;
        }
        self.start.lerp(self.target, ease(self.easing, t))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle(CameraPose),
    Animating {
        animation: CameraAnimation,
        then_orbit: Option<TowerFrame>,
    },
    Orbiting {
        frame: TowerFrame,
        started_at: Duration,
    },
}

/// Drives the virtual camera between anchor poses.
#[derive(Debug, Clone)]
pub struct CameraController {
    phase: Phase,
    mode: CameraMode,
    timings: CameraTimings,
}

impl CameraController {
    /// Controller resting at `initial` in overview mode.
    pub const fn new(initial: CameraPose, timings: CameraTimings) -> Self {
        Self {
            phase: Phase::Idle(initial),
            mode: CameraMode::Overview,
            timings,
        }
    }

    /// Current framing mode.
    pub const fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Current state machine phase.
    pub const fn phase(&self) -> CameraPhase {
        match self.phase {
            Phase::Idle(_) => CameraPhase::Idle,
            Phase::Animating { .. } => CameraPhase::Animating,
            Phase::Orbiting { .. } => CameraPhase::Orbiting,
        }
    }

    /// The live animation, if one is running.
    pub const fn animation(&self) -> Option<&CameraAnimation> {
        match &self.phase {
            Phase::Animating { animation, .. } => Some(animation),
            Phase::Idle(_) | Phase::Orbiting { .. } => None,
        }
    }

    /// Start animating toward `target`, superseding any running animation.
    ///
    /// The new animation starts from the pose the camera shows at `now`.
    pub fn retarget(&mut self, target: CameraPose, transition: Transition, now: Duration) {
        let start = self.pose_at(now);
        self.phase = Phase::Animating {
            animation: CameraAnimation {
                start,
                target,
                started_at: now,
                duration: self.timings.duration(transition),
                easing: transition.easing(),
            },
            then_orbit: None,
        };
    }

    /// Retarget toward a framing target, switching mode accordingly.
    ///
    /// Orbit targets continue onto the orbit path once the approach
    /// animation completes.
    pub fn follow(&mut self, target: &CameraTarget, now: Duration) {
        self.retarget(target.pose(), target.transition(), now);
        self.mode = target.mode();
        if let (CameraTarget::Orbit(frame), Phase::Animating { then_orbit, .. }) =
            (target, &mut self.phase)
        {
            *then_orbit = Some(*frame);
        }
    }

    /// Pose the camera shows at `now`. Pure.
    pub fn pose_at(&self, now: Duration) -> CameraPose {
        match &self.phase {
            Phase::Idle(pose) => *pose,
            Phase::Animating {
                animation,
                then_orbit: Some(frame),
            } if animation.is_complete(now) => {
                orbit_pose(frame, self.orbit_angle(animation.ends_at(), now))
            }
            Phase::Animating { animation, .. } => animation.sample(now),
            Phase::Orbiting { frame, started_at } => {
                orbit_pose(frame, self.orbit_angle(*started_at, now))
            }
        }
    }

    /// Advance the state machine to `now` and return the resulting phase.
    pub fn tick(&mut self, now: Duration) -> CameraPhase {
        if let Phase::Animating {
            animation,
            then_orbit,
        } = self.phase
        {
            if animation.is_complete(now) {
                self.phase = match then_orbit {
                    Some(frame) => Phase::Orbiting {
                        frame,
                        started_at: animation.ends_at(),
                    },
                    None => Phase::Idle(animation.target),
                };
            }
        }
        self.phase()
    }

    /// Read-only view for the renderer at `now`.
    pub fn view(&self, now: Duration) -> CameraView {
        let pose = self.pose_at(now);
        let target = match &self.phase {
            Phase::Animating {
                animation,
                then_orbit: None,
            } => animation.target,
            Phase::Animating { .. } | Phase::Idle(_) | Phase::Orbiting { .. } => pose,
        };
        CameraView {
            mode: self.mode,
            phase: self.phase(),
            pose,
            target,
        }
    }

    /// Angle along the orbit path after orbiting since `since`.
    fn orbit_angle(&self, since: Duration, now: Duration) -> f64 {
        let period = self.timings.orbit_period;
        if period.is_zero() {
            return 0.0;
        }
        let elapsed = now.saturating_sub(since).as_secs_f64();
        TAU * (elapsed / period.as_secs_f64()).fract()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn pose(x: f64) -> CameraPose {
        CameraPose::new(Vec3::new(x, x * 2.0, x * 3.0), Vec3::new(-x, 0.0, x))
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn controller() -> CameraController {
        CameraController::new(pose(0.0), CameraTimings::default())
    }

    fn tower() -> TowerFrame {
        TowerFrame {
            bounds: BoundingBox {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 400.0,
                max_y: 200.0,
            },
            height: 300.0,
        }
    }

    #[test]
    fn easing_endpoints() {
        for easing in [Easing::Cubic, Easing::Quartic] {
            assert_eq!(ease(easing, 0.0), 0.0);
            assert_eq!(ease(easing, 1.0), 1.0);
            assert_eq!(ease(easing, 0.5), 0.5);
        }
        assert_eq!(ease_in_out_cubic(0.25), 0.0625);
        assert_eq!(ease_in_out_quartic(0.25), 0.031_25);
    }

    #[test]
    fn easing_is_monotonic() {
        let mut last_cubic = 0.0;
        let mut last_quartic = 0.0;
        for step in 0..=100 {
            let t = f64::from(step) / 100.0;
            let c = ease_in_out_cubic(t);
            let q = ease_in_out_quartic(t);
            assert!(c >= last_cubic);
            assert!(q >= last_quartic);
            last_cubic = c;
            last_quartic = q;
        }
    }

    #[test]
    fn endpoints_are_exact() {
        let mut cam = controller();
        let start = cam.pose_at(ms(1_000));
        cam.retarget(pose(7.3), Transition::Focus, ms(1_000));

        assert_eq!(cam.pose_at(ms(1_000)), start);
        assert_eq!(cam.pose_at(ms(2_500)), pose(7.3));
        assert_eq!(cam.pose_at(ms(9_000)), pose(7.3));
    }

    #[test]
    fn retarget_mid_flight_starts_from_current_pose() {
        let mut cam = controller();
        cam.retarget(pose(10.0), Transition::Focus, ms(0));
        let halfway = cam.pose_at(ms(750));

        cam.retarget(pose(-4.0), Transition::Overview, ms(750));
        let animation = cam.animation().copied();
        assert_eq!(animation.map(|a| a.start), Some(halfway));
        assert_eq!(animation.map(|a| a.easing), Some(Easing::Quartic));
        assert_eq!(cam.pose_at(ms(750)), halfway);
        assert_eq!(cam.pose_at(ms(2_750)), pose(-4.0));
    }

    #[test]
    fn halfway_focus_is_linear_midpoint() {
        let mut cam = controller();
        cam.retarget(pose(10.0), Transition::Focus, ms(0));
        // Cubic ease-in-out is exactly 0.5 at t = 0.5.
        let mid = cam.pose_at(ms(750));
        assert_eq!(mid, pose(0.0).lerp(pose(10.0), 0.5));
    }

    #[test]
    fn tick_completes_to_idle() {
        let mut cam = controller();
        cam.retarget(pose(3.0), Transition::Overview, ms(100));
        assert_eq!(cam.tick(ms(1_000)), CameraPhase::Animating);
        assert_eq!(cam.tick(ms(2_100)), CameraPhase::Idle);
        assert_eq!(cam.pose_at(ms(50_000)), pose(3.0));
        assert!(cam.animation().is_none());
    }

    #[test]
    fn view_reports_target_while_animating() {
        let mut cam = controller();
        cam.retarget(pose(5.0), Transition::Focus, ms(0));
        let view = cam.view(ms(300));
        assert_eq!(view.phase, CameraPhase::Animating);
        assert_eq!(view.target, pose(5.0));
        assert_ne!(view.pose, view.target);
    }

    #[test]
    fn orbit_follows_path_after_approach() {
        let frame = tower();
        let mut cam = controller();
        cam.follow(&CameraTarget::Orbit(frame), ms(0));
        assert_eq!(cam.mode(), CameraMode::Orbital);

        // Approach lands exactly on the orbit entry point.
        assert_eq!(cam.pose_at(ms(2_000)), orbit_pose(&frame, 0.0));
        assert_eq!(cam.tick(ms(2_000)), CameraPhase::Orbiting);

        // A quarter period later the camera is a quarter turn around.
        let quarter = cam.pose_at(ms(2_000 + 15_000));
        let expected = orbit_pose(&frame, TAU / 4.0);
        assert!((quarter.position.x - expected.position.x).abs() < 1e-9);
        assert!((quarter.position.z - expected.position.z).abs() < 1e-9);
        assert_eq!(quarter.look_at, expected.look_at);
    }

    #[test]
    fn refocus_leaves_orbit() {
        let frame = tower();
        let mut cam = controller();
        cam.follow(&CameraTarget::Orbit(frame), ms(0));
        cam.tick(ms(5_000));

        let floor = FloorFrame {
            bounds: frame.bounds,
            elevation: 60.0,
        };
        cam.follow(&CameraTarget::Floor(floor), ms(5_000));
        assert_eq!(cam.mode(), CameraMode::Focused);
        assert_eq!(cam.tick(ms(6_500)), CameraPhase::Idle);
        assert_eq!(cam.pose_at(ms(6_500)), focus_pose(&floor));
    }

    #[test]
    fn focus_pose_looks_at_floor_center() {
        let floor = FloorFrame {
            bounds: BoundingBox {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 200.0,
                max_y: 100.0,
            },
            elevation: 120.0,
        };
        let p = focus_pose(&floor);
        assert_eq!(p.look_at, Vec3::new(100.0, 150.0, 50.0));
        assert!(p.position.y > p.look_at.y);
        assert!(p.position.z > p.look_at.z);
    }

    #[test]
    fn zero_duration_jumps_to_target() {
        let timings = CameraTimings {
            focus: Duration::ZERO,
            overview: Duration::ZERO,
            orbit_period: Duration::ZERO,
        };
        let mut cam = CameraController::new(pose(0.0), timings);
        cam.retarget(pose(1.0), Transition::Focus, ms(10));
        assert_eq!(cam.pose_at(ms(10)), pose(1.0));
    }
}
