use bevy::{
    input::mouse::{AccumulatedMouseMotion, MouseScrollUnit, MouseWheel},
    prelude::*,
};
use bevy_egui::EguiContexts;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            .add_systems(Update, camera_control_system);
    }
}

fn spawn_camera(mut commands: Commands, mut clearcolor: ResMut<ClearColor>) {
    *clearcolor = ClearColor(Color::BLACK);

    let camera_main = CameraMain::looking_from(Vec3::new(3.0, 3.0, 3.0));
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 75f32.to_radians(),
            near: 0.1,
            far: 100.0,
            ..default()
        }),
        Transform::from_translation(camera_main.translation()).looking_at(Vec3::ZERO, Vec3::Y),
        camera_main,
    ));
}

/// Orbits the origin. Angles in radians.
#[derive(Component, Clone, Debug)]
pub struct CameraMain {
    yaw: f32,
    pitch: f32,
    distance: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
    smooth_zoom_buffer: f32,
}

impl CameraMain {
    const MIN_DISTANCE: f32 = 0.5;
    const MAX_DISTANCE: f32 = 60.0;
    const MAX_PITCH: f32 = 1.5;
    // fraction of orbit velocity kept every frame
    const DAMPING: f32 = 0.85;

    pub fn looking_from(position: Vec3) -> Self {
        let distance = position.length();
        Self {
            yaw: position.x.atan2(position.z),
            pitch: (position.y / distance).asin(),
            distance,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            smooth_zoom_buffer: 0.0,
        }
    }

    fn translation(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    fn orbit(&mut self, delta: Vec2) {
        self.yaw_velocity -= delta.x * 0.005;
        self.pitch_velocity += delta.y * 0.005;
    }

    fn step(&mut self) {
        self.yaw += self.yaw_velocity;
        self.pitch = (self.pitch + self.pitch_velocity).clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
        self.yaw_velocity *= Self::DAMPING;
        self.pitch_velocity *= Self::DAMPING;

        // scroll delta is cached to a buffer
        // buffer is converted to actual zoom over time for a smooth zooming effect
        let smooth_zoom_min = 0.001f32;
        let smooth_zoom_factor = 0.2f32;

        let smooth_zoom_amount = if self.smooth_zoom_buffer < 0.0 {
            f32::min(
                self.smooth_zoom_buffer * smooth_zoom_factor,
                (-smooth_zoom_min).max(self.smooth_zoom_buffer),
            )
        } else {
            f32::max(
                self.smooth_zoom_buffer * smooth_zoom_factor,
                smooth_zoom_min.min(self.smooth_zoom_buffer),
            )
        };
        self.distance = (self.distance * (1.0 - smooth_zoom_amount.clamp(-0.5, 0.5)))
            .clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
        self.smooth_zoom_buffer -= smooth_zoom_amount;
    }
}

pub fn camera_control_system(
    mut query: Query<(&mut Transform, &mut CameraMain)>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mut scroll_evr: EventReader<MouseWheel>,
    mut contexts: EguiContexts,
) {
    let Ok((mut transform, mut camera_main)) = query.single_mut() else {
        return;
    };

    let egui_busy = contexts
        .try_ctx_mut()
        .is_some_and(|ctx| ctx.wants_pointer_input() || ctx.is_pointer_over_area());

    if egui_busy {
        scroll_evr.clear();
    } else {
        if mouse_buttons.pressed(MouseButton::Left) {
            camera_main.orbit(mouse_motion.delta);
        }
        for ev in scroll_evr.read() {
            match ev.unit {
                MouseScrollUnit::Line => {
                    camera_main.smooth_zoom_buffer += ev.y * 0.1;
                }
                MouseScrollUnit::Pixel => {
                    camera_main.smooth_zoom_buffer += ev.y * 0.002;
                }
            }
        }
    }

    camera_main.step();

    transform.translation = camera_main.translation();
    transform.look_at(Vec3::ZERO, Vec3::Y);
}
