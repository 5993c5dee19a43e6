//! Camera orbit control.
//!
//! [`OrbitController`] owns the camera transform. In [`CameraMode::Follow`]
//! it circles the origin on its own, at a rotation speed that eases
//! toward its target instead of jumping:
//!
//! ```text
//! speed   += (target - speed) / 10        (snaps once |gap| < 1e-4)
//! time    += delta * speed
//! orbit    = radius * zoom
//! position = (cos(time) * orbit, y_offset * zoom, sin(time) * orbit)
//! ```
//!
//! [`CameraMode::Free`] hands yaw/pitch to mouse drag through
//! [`OrbitCamera`]; the follow state keeps advancing underneath so
//! switching back resumes smoothly.

use glam::{Mat4, Vec3};

/// Target rotation speed while running, in radians per second.
pub const ROTATION_SPEED: f32 = 0.2;
/// Each frame closes `1 / SMOOTHING` of the gap to the target speed.
pub const SMOOTHING: f32 = 10.0;
/// Gap below which the speed snaps to its target.
pub const SPEED_EPSILON: f32 = 1e-4;
pub const ZOOM_MIN: f32 = 0.1;
pub const ZOOM_MAX: f32 = 5.0;
/// Zoom change per unit of wheel delta (pixels).
pub const ZOOM_SENSITIVITY: f32 = 0.001;

/// Vertical field of view in degrees.
pub const FOV_DEGREES: f32 = 75.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 100.0;

/// Who writes the camera transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    /// The controller circles the origin. Drag input is ignored.
    #[default]
    Follow,
    /// Mouse drag orbits the origin.
    Free,
}

/// Camera position and look-at target for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    /// Right-handed view matrix looking at `target` with +Y up.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// Perspective projection for the given aspect ratio.
    pub fn projection(aspect: f32) -> Mat4 {
        Mat4::perspective_rh(FOV_DEGREES.to_radians(), aspect, NEAR, FAR)
    }
}

/// Yaw/pitch orbit around a target point, driven by mouse drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
}

impl OrbitCamera {
    /// Radians of rotation per pixel of drag.
    pub const DRAG_SENSITIVITY: f32 = 0.005;
    pub const PITCH_LIMIT: f32 = 1.5;

    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.3,
            target: Vec3::ZERO,
        }
    }

    /// Orient so that `position` lies on this orbit.
    pub fn look_from(position: Vec3) -> Self {
        let horizontal = (position.x * position.x + position.z * position.z).sqrt();
        Self {
            yaw: position.x.atan2(position.z),
            pitch: position.y.atan2(horizontal).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT),
            target: Vec3::ZERO,
        }
    }

    /// Apply a drag of `(dx, dy)` pixels.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * Self::DRAG_SENSITIVITY;
        self.pitch = (self.pitch + dy * Self::DRAG_SENSITIVITY)
            .clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
    }

    /// World position at `distance` from the target.
    pub fn position(&self, distance: f32) -> Vec3 {
        let x = distance * self.pitch.cos() * self.yaw.sin();
        let y = distance * self.pitch.sin();
        let z = distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

/// Rotation and zoom state of the follow camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    pub paused: bool,
    /// Current speed, easing toward the target.
    pub rotation_speed: f32,
    /// Accumulated orbit angle.
    pub running_time: f32,
    /// Always within `ZOOM_MIN..=ZOOM_MAX`.
    pub zoom: f32,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            paused: false,
            rotation_speed: ROTATION_SPEED,
            running_time: 0.0,
            zoom: 1.0,
        }
    }
}

/// The sole writer of the camera transform.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitController {
    state: ControlState,
    y_offset: f32,
    mode: CameraMode,
    free: OrbitCamera,
    last_pose: Option<CameraPose>,
}

impl OrbitController {
    /// Default height of the follow camera before zoom.
    pub const DEFAULT_Y_OFFSET: f32 = 3.0;

    pub fn new() -> Self {
        Self {
            state: ControlState::default(),
            y_offset: Self::DEFAULT_Y_OFFSET,
            mode: CameraMode::Follow,
            free: OrbitCamera::new(),
            last_pose: None,
        }
    }

    pub fn with_y_offset(mut self, y_offset: f32) -> Self {
        self.y_offset = y_offset;
        self
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.set_zoom(zoom);
        self
    }

    pub fn with_mode(mut self, mode: CameraMode) -> Self {
        self.set_mode(mode);
        self
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn y_offset(&self) -> f32 {
        self.y_offset
    }

    pub fn set_y_offset(&mut self, y_offset: f32) {
        self.y_offset = y_offset;
    }

    pub fn zoom(&self) -> f32 {
        self.state.zoom
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    /// Speed the current one is easing toward.
    pub fn target_speed(&self) -> f32 {
        if self.state.paused {
            0.0
        } else {
            ROTATION_SPEED
        }
    }

    /// Flip between running and paused. Speed eases, it never jumps.
    pub fn toggle_pause(&mut self) {
        self.state.paused = !self.state.paused;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.state.paused = paused;
    }

    /// Add a wheel delta (pixels, positive zooms out).
    pub fn zoom_by(&mut self, wheel_delta: f32) {
        self.set_zoom(self.state.zoom + wheel_delta * ZOOM_SENSITIVITY);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.state.zoom = if zoom.is_nan() {
            self.state.zoom
        } else {
            zoom.clamp(ZOOM_MIN, ZOOM_MAX)
        };
    }

    /// Switch modes. Entering `Free` starts from the last follow pose.
    pub fn set_mode(&mut self, mode: CameraMode) {
        if mode == CameraMode::Free && self.mode == CameraMode::Follow {
            if let Some(pose) = self.last_pose {
                self.free = OrbitCamera::look_from(pose.position);
            }
        }
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(match self.mode {
            CameraMode::Follow => CameraMode::Free,
            CameraMode::Free => CameraMode::Follow,
        });
    }

    /// Mouse drag. Only has an effect in [`CameraMode::Free`].
    pub fn drag(&mut self, dx: f32, dy: f32) {
        if self.mode == CameraMode::Free {
            self.free.drag(dx, dy);
        }
    }

    /// Ease the rotation speed one frame toward its target.
    fn step_speed(&mut self) {
        let target = self.target_speed();
        let gap = target - self.state.rotation_speed;
        if gap.abs() < SPEED_EPSILON {
            self.state.rotation_speed = target;
        } else {
            self.state.rotation_speed += gap / SMOOTHING;
        }
    }

    /// Advance one frame and return the camera pose.
    ///
    /// `radius` is the galaxy radius; the orbit scales with it and zoom.
    pub fn update(&mut self, delta: f32, radius: f32) -> CameraPose {
        self.step_speed();
        self.state.running_time += delta * self.state.rotation_speed;

        let zoom = self.state.zoom;
        let pose = match self.mode {
            CameraMode::Follow => {
                let orbit = radius * zoom;
                let t = self.state.running_time;
                CameraPose {
                    position: Vec3::new(t.cos() * orbit, self.y_offset * zoom, t.sin() * orbit),
                    target: Vec3::ZERO,
                }
            }
            CameraMode::Free => {
                let distance = (radius * radius + self.y_offset * self.y_offset).sqrt() * zoom;
                CameraPose {
                    position: self.free.position(distance),
                    target: self.free.target,
                }
            }
        };
        self.last_pose = Some(pose);
        pose
    }
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn test_follow_pose_matches_formula() {
        let mut ctl = OrbitController::new().with_y_offset(2.0).with_zoom(0.5);
        let pose = ctl.update(0.0, 10.0);
        let t = ctl.state().running_time;
        assert_eq!(t, 0.0);
        assert!((pose.position - Vec3::new(5.0, 1.0, 0.0)).length() < 1e-5);
        assert_eq!(pose.target, Vec3::ZERO);
    }

    #[test]
    fn test_running_time_accumulates_speed() {
        let mut ctl = OrbitController::new();
        ctl.update(0.5, 5.0);
        assert!((ctl.state().running_time - 0.5 * ROTATION_SPEED).abs() < 1e-6);
    }

    #[test]
    fn test_speed_snaps_within_epsilon() {
        let mut ctl = OrbitController::new();
        ctl.state.rotation_speed = ROTATION_SPEED - SPEED_EPSILON * 0.5;
        ctl.step_speed();
        assert_eq!(ctl.state().rotation_speed, ROTATION_SPEED);
    }

    #[test]
    fn test_paused_freezes_running_time() {
        let mut ctl = OrbitController::new();
        ctl.toggle_pause();
        for _ in 0..200 {
            ctl.update(FRAME, 5.0);
        }
        assert_eq!(ctl.state().rotation_speed, 0.0);
        let frozen = ctl.state().running_time;
        ctl.update(1.0, 5.0);
        assert_eq!(ctl.state().running_time, frozen);
    }

    #[test]
    fn test_zoom_clamps() {
        let mut ctl = OrbitController::new();
        ctl.zoom_by(-1_000_000.0);
        assert_eq!(ctl.zoom(), ZOOM_MIN);
        ctl.zoom_by(1_000_000.0);
        assert_eq!(ctl.zoom(), ZOOM_MAX);
        ctl.set_zoom(f32::NAN);
        assert_eq!(ctl.zoom(), ZOOM_MAX);
    }

    #[test]
    fn test_drag_ignored_in_follow_mode() {
        let mut ctl = OrbitController::new();
        let before = ctl.update(0.0, 5.0);
        ctl.drag(300.0, 50.0);
        let after = ctl.update(0.0, 5.0);
        assert_eq!(before, after);
    }

    #[test]
    fn test_free_mode_starts_at_follow_pose() {
        let mut ctl = OrbitController::new();
        let follow = ctl.update(2.0, 5.0);
        ctl.toggle_mode();
        assert_eq!(ctl.mode(), CameraMode::Free);
        let free = ctl.update(0.0, 5.0);
        assert!((follow.position - free.position).length() < 1e-3);

        ctl.drag(100.0, 0.0);
        let dragged = ctl.update(0.0, 5.0);
        assert!((dragged.position - free.position).length() > 0.1);
        // Distance is preserved by a drag
        assert!((dragged.position.length() - free.position.length()).abs() < 1e-3);
    }

    #[test]
    fn test_orbit_camera_pitch_limit() {
        let mut cam = OrbitCamera::new();
        cam.drag(0.0, 10_000.0);
        assert_eq!(cam.pitch, OrbitCamera::PITCH_LIMIT);
    }
}
