//! Bevy front-end: keyboard snapshot, frame tick, gizmo replay and HUD.
//!
//! ## Update chain (runs in order every frame)
//!
//! 1. [`sync_viewport_system`] — keeps the [`DrawList`] the size of the window.
//! 2. [`keyboard_to_input_system`] — copies held keys into [`InputState`].
//! 3. [`game_tick_system`] — runs [`Game::tick`] against a fresh [`DrawList`].
//! 4. [`draw_list_gizmo_system`] — replays the list with [`Gizmos`].
//! 5. [`hud_readout_system`] — pushes the two telemetry lines into UI text.
//!
//! Gizmos only stroke, so filled primitives are approximated: discs are
//! concentric rings, rectangles and gradients are stacked lines, polygons
//! are an outline plus a fan.  Text commands are skipped; the HUD uses Bevy
//! UI instead.

use crate::config::{load_flight_config, FlightConfig};
use crate::game::Game;
use crate::input::{Control, InputState};
use crate::surface::{DrawCommand, DrawList, Surface};
use bevy::color::Mix;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

const BINDINGS: &[(Control, &[KeyCode])] = &[
    (Control::Up, &[KeyCode::KeyW, KeyCode::ArrowUp]),
    (Control::Down, &[KeyCode::KeyS, KeyCode::ArrowDown]),
    (Control::Left, &[KeyCode::KeyA, KeyCode::ArrowLeft]),
    (Control::Right, &[KeyCode::KeyD, KeyCode::ArrowRight]),
    (Control::Overdrive, &[KeyCode::ShiftLeft, KeyCode::ShiftRight]),
    (Control::Scan, &[KeyCode::Space]),
    (Control::GearUp, &[KeyCode::KeyE]),
    (Control::ZoomIn, &[KeyCode::Equal, KeyCode::NumpadAdd]),
    (Control::ZoomOut, &[KeyCode::Minus, KeyCode::NumpadSubtract]),
];

/// Upper bound on strokes used to fake one filled shape.
const MAX_FILL_STROKES: usize = 24;

pub struct FlightPlugin;

impl Plugin for FlightPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FlightConfig>()
            .init_resource::<InputState>()
            .init_resource::<DrawList>()
            .add_systems(
                Startup,
                (
                    load_flight_config,
                    start_game.after(load_flight_config),
                    setup_camera,
                    setup_hud,
                ),
            )
            .add_systems(
                Update,
                (
                    sync_viewport_system,
                    keyboard_to_input_system,
                    game_tick_system,
                    draw_list_gizmo_system,
                    hud_readout_system,
                )
                    .chain(),
            );
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

#[derive(Component)]
pub struct SpeedReadout;

#[derive(Component)]
pub struct ObjectsReadout;

pub fn start_game(mut commands: Commands, config: Res<FlightConfig>) {
    commands.insert_resource(Game::new(config.clone()));
}

pub fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

pub fn setup_hud(mut commands: Commands) {
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(4.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("Speed: 0.0 | Gear: 1"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.85, 0.9, 1.0)),
                SpeedReadout,
            ));
            parent.spawn((
                Text::new("Objects: 0 | Ship: (0, 0)"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.85, 0.9, 1.0)),
                ObjectsReadout,
            ));
        });
}

// ── Update ────────────────────────────────────────────────────────────────────

pub fn sync_viewport_system(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut list: ResMut<DrawList>,
) {
    if let Ok(window) = windows.single() {
        let size = Vec2::new(window.width(), window.height());
        if list.size() != size {
            list.resize(size);
        }
    }
}

/// Snapshot the held keys into [`InputState`].  Every control is written
/// each frame, so releases are never missed.
pub fn keyboard_to_input_system(keys: Res<ButtonInput<KeyCode>>, mut input: ResMut<InputState>) {
    for (control, codes) in BINDINGS {
        input.set(*control, keys.any_pressed(codes.iter().copied()));
    }
}

pub fn game_tick_system(
    time: Res<Time>,
    input: Res<InputState>,
    mut game: ResMut<Game>,
    mut list: ResMut<DrawList>,
) {
    list.reset();
    game.tick(time.elapsed_secs_f64() * 1_000.0, &input, &mut *list);
}

/// Replay the recorded frame with gizmos, mapping screen pixels (y down,
/// origin top-left) onto the 2D camera's world space (y up, origin centre).
pub fn draw_list_gizmo_system(
    list: Res<DrawList>,
    mut gizmos: Gizmos,
    mut clear: ResMut<ClearColor>,
) {
    let size = list.size();
    let to_world = |p: Vec2| Vec2::new(p.x - size.x * 0.5, size.y * 0.5 - p.y);

    for command in list.commands() {
        match command {
            DrawCommand::Clear(color) => {
                if clear.0 != *color {
                    clear.0 = *color;
                }
            }
            DrawCommand::FillRect { min, size, color } => {
                fill_rect(&mut gizmos, to_world, *min, *size, *color, *color);
            }
            DrawCommand::LinearGradient {
                min,
                size,
                top,
                bottom,
            } => fill_rect(&mut gizmos, to_world, *min, *size, *top, *bottom),
            DrawCommand::FillCircle {
                center,
                radius,
                color,
            } => fill_disc(&mut gizmos, to_world(*center), *radius, *color, *color),
            DrawCommand::RadialGradient {
                center,
                radius,
                inner,
                outer,
            } => fill_disc(&mut gizmos, to_world(*center), *radius, *inner, *outer),
            DrawCommand::StrokeCircle {
                center,
                radius,
                color,
                ..
            } => {
                gizmos.circle_2d(to_world(*center), *radius, *color);
            }
            DrawCommand::Line {
                from, to, color, ..
            } => {
                gizmos.line_2d(to_world(*from), to_world(*to), *color);
            }
            DrawCommand::FillPolygon { points, color } => {
                let world: Vec<Vec2> = points.iter().map(|&p| to_world(p)).collect();
                let centroid = world.iter().copied().sum::<Vec2>() / world.len() as f32;
                gizmos.linestrip_2d(world.iter().copied().chain(world.first().copied()), *color);
                for &corner in &world {
                    gizmos.line_2d(centroid, corner, *color);
                }
            }
            DrawCommand::Text { .. } => {}
        }
    }
}

fn fill_rect(
    gizmos: &mut Gizmos,
    to_world: impl Fn(Vec2) -> Vec2,
    min: Vec2,
    size: Vec2,
    top: Color,
    bottom: Color,
) {
    let rows = (size.y.ceil() as usize).clamp(1, MAX_FILL_STROKES);
    let (top, bottom) = (top.to_linear(), bottom.to_linear());
    for row in 0..rows {
        let t = if rows > 1 {
            row as f32 / (rows - 1) as f32
        } else {
            0.0
        };
        let y = min.y + size.y * t;
        let color = Color::from(top.mix(&bottom, t));
        gizmos.line_2d(
            to_world(Vec2::new(min.x, y)),
            to_world(Vec2::new(min.x + size.x.max(1.0), y)),
            color,
        );
    }
}

fn fill_disc(gizmos: &mut Gizmos, center: Vec2, radius: f32, inner: Color, outer: Color) {
    let rings = ((radius / 2.0).ceil() as usize).clamp(1, MAX_FILL_STROKES);
    let (inner, outer) = (inner.to_linear(), outer.to_linear());
    for ring in 1..=rings {
        let t = ring as f32 / rings as f32;
        gizmos.circle_2d(center, radius * t, Color::from(inner.mix(&outer, t)));
    }
}

pub fn hud_readout_system(
    game: Res<Game>,
    mut speed: Query<&mut Text, (With<SpeedReadout>, Without<ObjectsReadout>)>,
    mut objects: Query<&mut Text, (With<ObjectsReadout>, Without<SpeedReadout>)>,
) {
    for mut text in speed.iter_mut() {
        if text.0 != game.readout.speed {
            text.0.clone_from(&game.readout.speed);
        }
    }
    for mut text in objects.iter_mut() {
        if text.0 != game.readout.objects {
            text.0.clone_from(&game.readout.objects);
        }
    }
}
