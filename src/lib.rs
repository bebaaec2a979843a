//! # GraftForge
//!
//! **GraftForge** is a pure-Rust engine for assembling molecular systems out of rigid building blocks that connect through oriented attachment points. It is aimed at grafted monolayers, functionalized chains, and similar systems that are easier to describe as "dock this piece onto that site" than as raw coordinates.
//!
//! ## Features
//!
//! - **Containment tree** – Particles, ports, and compounds live in one arena [`Assembly`] with labelled children, hoisted aliases, and flatten-order queries.
//! - **Port docking** – [`ops::force_overlap`] moves a subtree rigidly so one port coincides with another, consumes both, and optionally bonds their anchors.
//! - **Geometry kernel** – [`ops::Transform`] translates and rotates whole subtrees, keeping attached ports in step.
//! - **Recipes** – Methylene, methyl, silane, carboxylate, alkylsilane chains, surfaces, and two-sided monolayers under [`recipes`].
//! - **Typed tables** – A pluggable [`Typer`] turns the bonded [`ParticleGraph`] into a [`TypedTopology`], which [`ops::flatten_topology`] lays out as atom, bond, angle, and dihedral [`Table`]s.
//! - **Index groups** – [`ops::classify`] partitions a two-sided system into surface, chain, frozen, and terminal groups.

mod model;

pub mod ops;
pub mod recipes;

pub use model::assembly::{AncestorIds, Assembly, Descendants, Node, NodeKind};
pub use model::compound::Compound;
pub use model::error::{StructureError, TopologyError};
pub use model::particle::Particle;
pub use model::port::Port;
pub use model::table::{Column, Table, Value};
pub use model::topology::{Bond, GraphAtom, ParticleGraph};
pub use model::typed::{
    Charge, ParameterUnits, TypedAngle, TypedAtom, TypedBond, TypedDihedral, TypedTopology, Typer,
};
pub use model::types::{Axis, ELEMENTARY_CHARGE, Element, NodeId, Point, Vector};
