//! Voidrunner flight simulation library
//!
//! A 2D space-flight arcade core: gear-based ship physics with an overdrive
//! burst, an infinite region-streamed world, destructible megastructures, and
//! a particle effects engine.  The simulation is plain data driven through
//! [`game::Game::tick`]; [`plugin::FlightPlugin`] is the Bevy front-end.

pub mod camera;
pub mod config;
pub mod constants;
pub mod effects;
pub mod error;
pub mod game;
pub mod indicator;
pub mod input;
pub mod math;
pub mod megastructure;
pub mod particle;
pub mod plugin;
pub mod ship;
pub mod space_object;
pub mod surface;
pub mod world;
