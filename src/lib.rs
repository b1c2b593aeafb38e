//! Top-down horde survival: the simulation core plus a terminal front end.
//!
//! [`world::World`] is the entry point for the simulation. Everything under it
//! is plain single-threaded state advanced once per frame; the terminal
//! renderer, input mapping and network link sit at the edges.

pub mod combat;
pub mod config;
pub mod constants;
pub mod entities;
pub mod game;
pub mod hud;
pub mod input;
pub mod net;
pub mod pickups;
pub mod rendering;
pub mod respawn;
pub mod steering;
pub mod types;
pub mod waves;
pub mod world;
