use bevy::prelude::*;
use bevy::window::WindowResolution;
use voidrunner::config::FlightConfig;
use voidrunner::plugin::FlightPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Voidrunner".into(),
                resolution: WindowResolution::new(1280, 720),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.0, 0.0, 0.067)))
        // Compiled defaults; load_flight_config overwrites them from
        // assets/flight.toml (if present) in the Startup schedule.
        .insert_resource(FlightConfig::default())
        .add_plugins(FlightPlugin)
        .run();
}
