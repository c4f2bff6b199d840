//! Input module - PlayerInput resource and capture_input system
//!
//! Keyboard, mouse and gamepad are fused into one `PlayerInput`, which
//! `copy_player_input` then hands to the human tank's `TankInput`.

use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::constants::*;
use crate::helpers::apply_radial_dead_zone;
use crate::tank::{AimInput, PlayerControlled, Tank, TankInput};

/// Which device last moved the cannon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AimDevice {
    #[default]
    Mouse,
    Stick,
    Keys,
}

/// Buffered input state for the human-controlled tank
#[derive(Resource, Default)]
pub struct PlayerInput {
    pub throttle: f32,
    pub steer: f32,
    pub aim: AimInput,
    pub fire_held: bool,
    pub aim_device: AimDevice,
    // Scene controls, held until consumed
    pub restart_pressed: bool,
    pub next_level_pressed: bool,
    pub prev_level_pressed: bool,
    pub confirm_pressed: bool,
}

/// Combine keyboard axes (x = steer, y = throttle) with the left stick.
/// The stick gets a radial dead zone; the sum is clamped per axis.
pub fn fuse_drive_axes(keys: Vec2, stick: Vec2) -> (f32, f32) {
    let stick = apply_radial_dead_zone(stick, STICK_DEADZONE);
    let combined = keys + stick;
    (combined.y.clamp(-1.0, 1.0), combined.x.clamp(-1.0, 1.0))
}

/// Pick the aim for this frame and remember which device produced it.
/// Right stick beats keys, keys beat the mouse; the cursor is only used
/// while the mouse is the last aim device.
pub fn resolve_aim(
    right_stick: Vec2,
    rotate_keys: f32,
    cursor_world: Option<Vec2>,
    mouse_moved: bool,
    last_device: AimDevice,
) -> (AimInput, AimDevice) {
    let stick = apply_radial_dead_zone(right_stick, AIM_DEADZONE);
    if stick != Vec2::ZERO {
        return (AimInput::Direction(stick), AimDevice::Stick);
    }
    if rotate_keys.abs() > INPUT_EPSILON {
        return (AimInput::Rotate(rotate_keys.clamp(-1.0, 1.0)), AimDevice::Keys);
    }

    let device = if mouse_moved { AimDevice::Mouse } else { last_device };
    match (device, cursor_world) {
        (AimDevice::Mouse, Some(point)) => (AimInput::Point(point), device),
        _ => (AimInput::Hold, device),
    }
}

fn key_axis(keyboard: &ButtonInput<KeyCode>, negative: [KeyCode; 2], positive: [KeyCode; 2]) -> f32 {
    let mut value = 0.0;
    if negative.iter().any(|k| keyboard.pressed(*k)) {
        value -= 1.0;
    }
    if positive.iter().any(|k| keyboard.pressed(*k)) {
        value += 1.0;
    }
    value
}

/// Runs in Update to capture input state before it's cleared
#[allow(clippy::too_many_arguments)]
pub fn capture_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    gamepads: Query<&Gamepad>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut input: ResMut<PlayerInput>,
) {
    // Drive
    let keys = Vec2::new(
        key_axis(&keyboard, [KeyCode::KeyA, KeyCode::ArrowLeft], [KeyCode::KeyD, KeyCode::ArrowRight]),
        key_axis(&keyboard, [KeyCode::KeyS, KeyCode::ArrowDown], [KeyCode::KeyW, KeyCode::ArrowUp]),
    );
    let mut left_stick = Vec2::ZERO;
    let mut right_stick = Vec2::ZERO;
    let mut trigger = 0.0_f32;
    for gamepad in &gamepads {
        left_stick += gamepad.left_stick();
        right_stick += gamepad.right_stick();
        trigger = trigger.max(gamepad.get(GamepadButton::RightTrigger2).unwrap_or(0.0));
    }
    let (throttle, steer) = fuse_drive_axes(keys, left_stick);
    input.throttle = throttle;
    input.steer = steer;

    // Aim
    // Q turns the cannon counter-clockwise, E clockwise
    let mut rotate_keys = 0.0;
    if keyboard.pressed(KeyCode::KeyQ) {
        rotate_keys += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyE) {
        rotate_keys -= 1.0;
    }
    let cursor_world = windows
        .single()
        .ok()
        .and_then(|window| window.cursor_position())
        .and_then(|cursor| {
            let (camera, camera_transform) = cameras.single().ok()?;
            camera.viewport_to_world_2d(camera_transform, cursor).ok()
        });
    let mouse_moved = mouse_motion.delta != Vec2::ZERO || mouse_buttons.just_pressed(MouseButton::Left);
    let (aim, device) = resolve_aim(right_stick, rotate_keys, cursor_world, mouse_moved, input.aim_device);
    input.aim = aim;
    input.aim_device = device;

    // Fire
    input.fire_held = keyboard.pressed(KeyCode::Space)
        || mouse_buttons.pressed(MouseButton::Left)
        || trigger > TRIGGER_THRESHOLD;

    // Scene controls - accumulate until consumed
    if keyboard.just_pressed(KeyCode::KeyR) || gamepads.iter().any(|gp| gp.just_pressed(GamepadButton::Start)) {
        input.restart_pressed = true;
    }
    if keyboard.just_pressed(KeyCode::BracketRight) {
        input.next_level_pressed = true;
    }
    if keyboard.just_pressed(KeyCode::BracketLeft) {
        input.prev_level_pressed = true;
    }
    if keyboard.just_pressed(KeyCode::Enter) || gamepads.iter().any(|gp| gp.just_pressed(GamepadButton::South)) {
        input.confirm_pressed = true;
    }
}

/// Copy the captured input into the human tank's TankInput.
/// Runs in Update after capture_input; FixedUpdate reads TankInput.
pub fn copy_player_input(
    input: Res<PlayerInput>,
    mut tanks: Query<&mut TankInput, (With<Tank>, With<PlayerControlled>)>,
) {
    let Ok(mut tank_input) = tanks.single_mut() else {
        return;
    };
    tank_input.throttle = input.throttle;
    tank_input.steer = input.steer;
    tank_input.aim = input.aim;
    tank_input.fire_held = input.fire_held;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuse_clamps_sum() {
        // W + stick pushed forward: still full throttle, not more
        let (throttle, steer) = fuse_drive_axes(Vec2::new(0.0, 1.0), Vec2::new(0.0, 1.0));
        assert_eq!(throttle, 1.0);
        assert_eq!(steer, 0.0);

        // Opposing inputs cancel
        let (throttle, _) = fuse_drive_axes(Vec2::new(0.0, -1.0), Vec2::new(0.0, 1.0));
        assert!(throttle.abs() < 1e-5);
    }

    #[test]
    fn test_fuse_drops_stick_drift() {
        let (throttle, steer) = fuse_drive_axes(Vec2::ZERO, Vec2::new(0.1, -0.12));
        assert_eq!((throttle, steer), (0.0, 0.0));
    }

    #[test]
    fn test_aim_priority_and_memory() {
        let cursor = Some(Vec2::new(50.0, 60.0));

        let (aim, device) = resolve_aim(Vec2::new(1.0, 0.0), 1.0, cursor, true, AimDevice::Mouse);
        assert!(matches!(aim, AimInput::Direction(_)));
        assert_eq!(device, AimDevice::Stick);

        let (aim, device) = resolve_aim(Vec2::ZERO, -1.0, cursor, true, AimDevice::Stick);
        assert_eq!(aim, AimInput::Rotate(-1.0));
        assert_eq!(device, AimDevice::Keys);

        // Released stick without mouse movement: hold the cannon still
        let (aim, device) = resolve_aim(Vec2::ZERO, 0.0, cursor, false, AimDevice::Stick);
        assert_eq!(aim, AimInput::Hold);
        assert_eq!(device, AimDevice::Stick);

        // Moving the mouse takes aim back to the cursor
        let (aim, device) = resolve_aim(Vec2::ZERO, 0.0, cursor, true, AimDevice::Stick);
        assert_eq!(aim, AimInput::Point(Vec2::new(50.0, 60.0)));
        assert_eq!(device, AimDevice::Mouse);
    }
}
