//! Core data structures of the assembly engine.
//!
//! This module defines the containment tree (particles, ports, compounds held in one arena),
//! bonded connectivity, the typed topology handed back by an external typer, and the tables
//! produced from it. These types are built up by recipes, moved by the geometry kernel and the
//! docking engine, and read by the flattening and classification operations.

pub mod assembly;
pub mod compound;
pub mod error;
pub mod particle;
pub mod port;
pub mod table;
pub mod topology;
pub mod typed;
pub mod types;
