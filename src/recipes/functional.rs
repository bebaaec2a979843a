//! Functional groups and silane-anchored chains.

use super::chain::alkane;
use super::labelled;
use super::moieties::{ch3, hydrogen, silane};
use crate::model::assembly::Assembly;
use crate::model::error::StructureError;
use crate::model::particle::Particle;
use crate::model::port::Port;
use crate::model::types::{Element, NodeId, Vector};
use crate::ops::{Error, Transform, force_overlap};
use log::debug;
use std::f64::consts::PI;

const CARBONYL_HALF_BOND: f64 = 0.062;
const CARBOXYL_HALF_BOND: f64 = 0.07;
const HYDROXYL_HALF_BOND: f64 = 0.0485;

/// Group docked onto the second open port of an alkylsilane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Secondary {
    #[default]
    Methyl,
    Ethyl,
}

/// Linkage written into the backbone near the free end of an alkylsilane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainGroup {
    /// `-C(=O)-CH2-`
    #[default]
    Carbonyl,
    /// `-C(=O)-O-`
    Ester,
    /// `-CH2-O-`
    Ether,
    /// `-C(=O)-NH-`
    Amide,
}

/// Cap placed on the free end of a grafted chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Terminal {
    #[default]
    Methyl,
    Carboxylate,
    Hydrogen,
}

/// Methyl group exposing its carbon port as `up`.
pub fn methyl(assembly: &mut Assembly) -> Result<NodeId, Error> {
    let root = assembly.create_compound("Methyl");
    let inner = ch3(assembly)?;
    assembly.add(root, inner, None)?;
    let up = labelled(assembly, inner, "up")?;
    assembly.hoist(root, up, "up")?;
    Ok(root)
}

/// Ethyl group: two methyls joined carbon to carbon, with one hydrogen of the first removed
/// to free the `up` port.
pub fn ethyl(assembly: &mut Assembly) -> Result<NodeId, Error> {
    let root = assembly.create_compound("Ethyl");
    let first = ch3(assembly)?;
    assembly.add(root, first, None)?;

    let second = ch3(assembly)?;
    let from = labelled(assembly, second, "up")?;
    let to = labelled(assembly, first, "up")?;
    force_overlap(assembly, second, from, to, true)?;
    assembly.add(root, second, None)?;

    let hydrogen = labelled(assembly, first, "H[0]")?;
    let freed = assembly.remove(root, hydrogen)?;
    let up = freed
        .first()
        .copied()
        .ok_or_else(|| Error::missing_label(root, "CH3[0]/port[0]"))?;
    assembly.hoist(root, up, "up")?;
    Ok(root)
}

/// Carboxylic acid group `C(=O)OH` with its free carbon port labelled `anterior`.
pub fn carboxylate(assembly: &mut Assembly) -> Result<NodeId, Error> {
    let root = assembly.create_compound("Carboxylate");
    let z = Vector::z_axis();
    let c = assembly.insert_particle(root, Particle::named("C"), None)?;

    let double = assembly.insert_port(root, Port::toward(c, Vector::y(), CARBONYL_HALF_BOND), Some("double"))?;
    let posterior = assembly.insert_port(root, Port::toward(c, Vector::y(), CARBOXYL_HALF_BOND), Some("posterior"))?;
    Transform::spin(assembly, posterior, 2.0 * PI / 3.0, &z);
    let anterior = assembly.insert_port(root, Port::toward(c, Vector::y(), CARBOXYL_HALF_BOND), Some("anterior"))?;
    Transform::spin(assembly, anterior, -2.0 * PI / 3.0, &z);

    let carbonyl_o = assembly.insert_particle(root, Particle::named("O"), None)?;
    let o_double = assembly.insert_port(
        root,
        Port::toward(carbonyl_o, Vector::y(), CARBONYL_HALF_BOND),
        Some("Odouble"),
    )?;
    force_overlap(assembly, carbonyl_o, o_double, double, true)?;

    let hydroxyl_o = assembly.insert_particle(root, Particle::named("O"), None)?;
    let o_anterior = assembly.insert_port(
        root,
        Port::toward(hydroxyl_o, Vector::y(), CARBOXYL_HALF_BOND),
        Some("Oanterior"),
    )?;
    force_overlap(assembly, hydroxyl_o, o_anterior, posterior, true)?;
    let o_posterior = assembly.insert_port(
        root,
        Port::toward(hydroxyl_o, -Vector::y(), HYDROXYL_HALF_BOND),
        Some("Oposterior"),
    )?;

    let h = assembly.insert_particle(root, Particle::named("H"), None)?;
    let h_bond = assembly.insert_port(root, Port::toward(h, Vector::y(), HYDROXYL_HALF_BOND), Some("Hbond"))?;
    force_overlap(assembly, h, h_bond, o_posterior, true)?;

    debug_assert_eq!(assembly.all_ports(root), vec![anterior]);
    Ok(root)
}

/// Hydroxy-silane anchored alkane, `H-O-Si(O)(O)-(CH2)n`.
///
/// One hydrogen of the last methylene is removed, leaving two open ports on the terminal
/// carbon: the freed one is hoisted as `primary` and the backbone `up` port as `secondary`.
pub fn alkylsilane(assembly: &mut Assembly, chain_length: usize) -> Result<NodeId, Error> {
    let root = assembly.create_compound("Alkylsilane");
    let h = assembly.insert_particle(root, Particle::named("H"), None)?;
    let o_h = assembly.insert_port(root, Port::toward(h, -Vector::y(), Element::H.covalent_radius()), Some("oH"))?;

    let o = assembly.insert_particle(root, Particle::named("O"), None)?;
    let h_o = assembly.insert_port(root, Port::toward(o, -Vector::y(), Element::O.covalent_radius()), Some("Oh"))?;
    force_overlap(assembly, h, o_h, h_o, true)?;
    let alcohol = assembly.insert_port(root, Port::toward(o, Vector::y(), Element::O.covalent_radius()), Some("alcohol"))?;

    let anchor = silane(assembly)?;
    let down = labelled(assembly, anchor, "down")?;
    force_overlap(assembly, anchor, down, alcohol, true)?;
    assembly.add(root, anchor, Some("silane"))?;

    let backbone = alkane(assembly, chain_length)?;
    let down = labelled(assembly, backbone, "down")?;
    let up = labelled(assembly, anchor, "up")?;
    force_overlap(assembly, backbone, down, up, true)?;
    assembly.add(root, backbone, Some("alkane"))?;

    let last_h = format!("alkane/CH2[{}]/H[1]", chain_length.saturating_sub(1));
    let hydrogen = labelled(assembly, root, &last_h)?;
    let freed = assembly.remove(root, hydrogen)?;
    let primary = freed
        .first()
        .copied()
        .ok_or_else(|| Error::missing_label(root, &last_h))?;
    let secondary = labelled(assembly, root, "alkane/up")?;
    assembly.hoist(root, secondary, "secondary")?;
    assembly.hoist(root, primary, "primary")?;
    debug!("built alkylsilane with {chain_length} methylene units");
    Ok(root)
}

/// Removes the particle at `path` below `root` and discards the ports its removal frees.
fn strip(assembly: &mut Assembly, root: NodeId, path: &str) -> Result<(), Error> {
    let particle = labelled(assembly, root, path)?;
    for port in assembly.remove(root, particle)? {
        assembly.remove(root, port)?;
    }
    Ok(())
}

/// Turns the particle at `path` into an `element` atom in place.
fn convert(
    assembly: &mut Assembly,
    root: NodeId,
    path: &str,
    element: Element,
) -> Result<NodeId, Error> {
    let id = labelled(assembly, root, path)?;
    if let Some(particle) = assembly.particle_mut(id) {
        particle.name = element.symbol().into();
        particle.element = element;
    }
    Ok(id)
}

/// Alkylsilane whose backbone is rewritten into a carbonyl, ester, ether, or amide linkage
/// just below the chain end.
///
/// With `n` methylene units, unit `n - 3` becomes a carbonyl carbon: one hydrogen is stripped
/// and the other becomes an oxygen at double-bond distance. Unit `n - 2` becomes the linking
/// heteroatom: an oxygen without hydrogens for esters and ethers, an N-H for amides. Ethers
/// keep unit `n - 3` as a plain methylene. Particles keep their labels (`H[0]`, `C[0]`) after
/// their element changes. The `primary` and `secondary` ports of the last unit are hoisted
/// unchanged.
///
/// # Errors
///
/// Returns [`Error::ChainTooShort`] when the chain has fewer than 3 units, or 2 for ethers.
pub fn modified_chain(
    assembly: &mut Assembly,
    chain_length: usize,
    group: ChainGroup,
) -> Result<NodeId, Error> {
    let minimum = if group == ChainGroup::Ether { 2 } else { 3 };
    if chain_length < minimum {
        return Err(Error::ChainTooShort {
            length: chain_length,
            minimum,
        });
    }

    let root = assembly.create_compound("ModifiedChain");
    let chain = alkylsilane(assembly, chain_length)?;
    assembly.add(root, chain, None)?;

    if group != ChainGroup::Ether {
        let unit = format!("alkane/CH2[{}]", chain_length - 3);
        strip(assembly, chain, &format!("{unit}/H[1]"))?;
        let oxygen = convert(assembly, chain, &format!("{unit}/H[0]"), Element::O)?;
        let carbon = labelled(assembly, chain, &format!("{unit}/C[0]"))?;
        let stretch = match (assembly.particle(carbon), assembly.particle(oxygen)) {
            (Some(c), Some(o)) => {
                let bond = o.pos - c.pos;
                bond.normalize() * (2.0 * CARBONYL_HALF_BOND - bond.norm())
            }
            _ => Vector::zeros(),
        };
        if let Some(o) = assembly.particle_mut(oxygen) {
            o.translate_by(&stretch);
        }
    }

    let linker = format!("alkane/CH2[{}]", chain_length - 2);
    match group {
        ChainGroup::Carbonyl => {}
        ChainGroup::Ester | ChainGroup::Ether => {
            convert(assembly, chain, &format!("{linker}/C[0]"), Element::O)?;
            strip(assembly, chain, &format!("{linker}/H[1]"))?;
            strip(assembly, chain, &format!("{linker}/H[0]"))?;
        }
        ChainGroup::Amide => {
            convert(assembly, chain, &format!("{linker}/C[0]"), Element::N)?;
            strip(assembly, chain, &format!("{linker}/H[1]"))?;
        }
    }

    let primary = labelled(assembly, chain, "primary")?;
    let secondary = labelled(assembly, chain, "secondary")?;
    assembly.hoist(root, primary, "primary")?;
    assembly.hoist(root, secondary, "secondary")?;
    debug!("built {group:?}-modified chain with {chain_length} units");
    Ok(root)
}

/// Alkylsilane carrying a carboxylate on its `primary` port and a small alkyl group on its
/// `secondary` port.
///
/// With a `modification`, the chain is built by [`modified_chain`] instead of [`alkylsilane`].
pub fn functionalized_alkylsilane(
    assembly: &mut Assembly,
    chain_length: usize,
    secondary: Secondary,
    modification: Option<ChainGroup>,
) -> Result<NodeId, Error> {
    let root = assembly.create_compound("FunctionalizedAlkylsilane");
    let chain = match modification {
        Some(group) => modified_chain(assembly, chain_length, group)?,
        None => alkylsilane(assembly, chain_length)?,
    };

    let acid = carboxylate(assembly)?;
    let from = labelled(assembly, acid, "anterior")?;
    let to = labelled(assembly, chain, "primary")?;
    force_overlap(assembly, acid, from, to, true)?;
    assembly.add(root, chain, None)?;
    assembly.add(root, acid, Some("Carboxylate"))?;

    let (group, label) = match secondary {
        Secondary::Methyl => (methyl(assembly)?, "Methyl"),
        Secondary::Ethyl => (ethyl(assembly)?, "Ethyl"),
    };
    let from = labelled(assembly, group, "up")?;
    let to = labelled(assembly, chain, "secondary")?;
    force_overlap(assembly, group, from, to, true)?;
    assembly.add(root, group, Some(label))?;
    Ok(root)
}

/// Caps every open port of `molecule` with a hydrogen.
///
/// `molecule` must be a detached root; it ends up as the last child of the returned `HCap`
/// compound, after the hydrogens.
///
/// # Errors
///
/// Returns [`StructureError::AlreadyOwned`] before docking anything when `molecule` has an
/// owner.
pub fn h_cap(assembly: &mut Assembly, molecule: NodeId) -> Result<NodeId, Error> {
    if let Some(owner) = assembly.parent(molecule) {
        return Err(StructureError::AlreadyOwned {
            child: molecule,
            owner,
        }
        .into());
    }
    let root = assembly.create_compound("HCap");
    let ports = assembly.all_ports(molecule);
    for port in &ports {
        let cap = hydrogen(assembly)?;
        let up = labelled(assembly, cap, "up")?;
        force_overlap(assembly, cap, up, *port, true)?;
        assembly.add(root, cap, None)?;
    }
    assembly.add(root, molecule, None)?;
    debug!("capped {} open ports", ports.len());
    Ok(root)
}

/// Acetic acid: a methyl docked onto the `anterior` port of a carboxylate.
pub fn acetic_acid(assembly: &mut Assembly) -> Result<NodeId, Error> {
    let root = assembly.create_compound("AceticAcid");
    let acid = carboxylate(assembly)?;
    assembly.add(root, acid, Some("Carboxylate"))?;

    let methyl = ch3(assembly)?;
    let up = labelled(assembly, methyl, "up")?;
    let anterior = labelled(assembly, acid, "anterior")?;
    force_overlap(assembly, methyl, up, anterior, true)?;
    assembly.add(root, methyl, Some("CH3"))?;
    Ok(root)
}

/// Surface-graftable chain named `Alkylsilane`: silane, alkane backbone, and a terminal cap.
///
/// The silane `down` port is hoisted as `down` for docking onto a surface site.
pub fn grafted_chain(
    assembly: &mut Assembly,
    chain_length: usize,
    terminal: Terminal,
) -> Result<NodeId, Error> {
    let root = assembly.create_compound("Alkylsilane");
    let anchor = silane(assembly)?;
    assembly.add(root, anchor, Some("silane"))?;

    let backbone = alkane(assembly, chain_length)?;
    let down = labelled(assembly, backbone, "down")?;
    let up = labelled(assembly, anchor, "up")?;
    force_overlap(assembly, backbone, down, up, true)?;
    assembly.add(root, backbone, Some("alkane"))?;

    let (cap, port, label) = match terminal {
        Terminal::Methyl => {
            let cap = methyl(assembly)?;
            (cap, labelled(assembly, cap, "up")?, "Methyl")
        }
        Terminal::Carboxylate => {
            let cap = carboxylate(assembly)?;
            (cap, labelled(assembly, cap, "anterior")?, "Carboxylate")
        }
        Terminal::Hydrogen => {
            let cap = hydrogen(assembly)?;
            (cap, labelled(assembly, cap, "up")?, "H")
        }
    };
    let end = labelled(assembly, backbone, "up")?;
    force_overlap(assembly, cap, port, end, true)?;
    assembly.add(root, cap, Some(label))?;

    let down = labelled(assembly, anchor, "down")?;
    assembly.hoist(root, down, "down")?;
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::Point;

    fn names(assembly: &Assembly, root: NodeId) -> Vec<String> {
        assembly
            .particles(root)
            .map(|(_, p)| p.name.to_string())
            .collect()
    }

    #[test]
    fn methyl_hoists_its_only_port() {
        let mut assembly = Assembly::new();
        let group = methyl(&mut assembly).unwrap();

        assert_eq!(assembly.particle_count(group), 4);
        assert_eq!(assembly.all_ports(group), vec![assembly.child(group, "up").unwrap()]);
        assert_eq!(assembly.lookup(group, "CH3[0]/up"), assembly.child(group, "up"));
    }

    #[test]
    fn ethyl_has_two_carbons_five_hydrogens_and_one_port() {
        let mut assembly = Assembly::new();
        let group = ethyl(&mut assembly).unwrap();

        let names = names(&assembly, group);
        assert_eq!(names.iter().filter(|n| *n == "C").count(), 2);
        assert_eq!(names.iter().filter(|n| *n == "H").count(), 5);
        assert_eq!(assembly.bond_count(group), 6);
        let up = assembly.child(group, "up").unwrap();
        assert_eq!(assembly.all_ports(group), vec![up]);
        let first_carbon = assembly.lookup(group, "CH3[0]/C[0]").unwrap();
        assert_eq!(assembly.port(up).unwrap().anchor, Some(first_carbon));
    }

    #[test]
    fn carboxylate_geometry_and_open_anterior_port() {
        let mut assembly = Assembly::new();
        let group = carboxylate(&mut assembly).unwrap();

        assert_eq!(names(&assembly, group), vec!["C", "O", "O", "H"]);
        assert_eq!(assembly.bond_count(group), 3);
        let anterior = assembly.child(group, "anterior").unwrap();
        assert_eq!(assembly.all_ports(group), vec![anterior]);
        assert!(assembly.port(assembly.child(group, "double").unwrap()).unwrap().is_consumed());

        let c = assembly.particle_at(group, 0).unwrap();
        let carbonyl = assembly.particle_at(group, 1).unwrap();
        let hydroxyl = assembly.particle_at(group, 2).unwrap();
        let hydrogen = assembly.particle_at(group, 3).unwrap();
        let distance = |a, b| {
            let pa = assembly.particle(a).unwrap();
            pa.distance(assembly.particle(b).unwrap())
        };
        assert!((distance(c, carbonyl) - 0.124).abs() < 1e-9);
        assert!((distance(c, hydroxyl) - 0.14).abs() < 1e-9);
        assert!((distance(hydroxyl, hydrogen) - 0.097).abs() < 1e-9);
        let carbonyl_pos = assembly.particle(carbonyl).unwrap().pos;
        assert!((carbonyl_pos - Point::new(0.0, 0.124, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn alkylsilane_composition_and_labelled_ports() {
        let mut assembly = Assembly::new();
        let chain = alkylsilane(&mut assembly, 3).unwrap();

        // H, O, Si, O, O, then three CH2 units minus one hydrogen.
        assert_eq!(assembly.particle_count(chain), 5 + 9 - 1);
        let primary = assembly.child(chain, "primary").unwrap();
        let secondary = assembly.child(chain, "secondary").unwrap();
        assert_eq!(assembly.all_ports(chain), vec![secondary, primary]);
        let last_carbon = assembly.lookup(chain, "alkane/CH2[2]/C[0]").unwrap();
        assert_eq!(assembly.port(primary).unwrap().anchor, Some(last_carbon));
        assert_eq!(assembly.port(secondary).unwrap().anchor, Some(last_carbon));
        assert!(assembly.lookup(chain, "alkane/CH2[2]/H[1]").is_none());
        let ancestors: Vec<&str> = assembly.ancestors(last_carbon).collect();
        assert_eq!(ancestors, vec!["CH2", "Alkane", "Alkylsilane"]);
    }

    #[test]
    fn functionalized_alkylsilane_consumes_both_chain_ports() {
        let mut assembly = Assembly::new();
        let molecule = functionalized_alkylsilane(&mut assembly, 3, Secondary::Methyl, None).unwrap();

        assert_eq!(assembly.particle_count(molecule), 13 + 4 + 4);
        assert!(assembly.all_ports(molecule).is_empty());
        let acid_carbon = assembly.lookup(molecule, "Carboxylate/C[0]").unwrap();
        let chain_carbon = assembly
            .lookup(molecule, "Alkylsilane[0]/alkane/CH2[2]/C[0]")
            .unwrap();
        assert!(assembly.neighbors(chain_carbon).contains(&acid_carbon));
    }

    #[test]
    fn functionalized_alkylsilane_with_ethyl() {
        let mut assembly = Assembly::new();
        let molecule = functionalized_alkylsilane(&mut assembly, 2, Secondary::Ethyl, None).unwrap();

        assert_eq!(assembly.particle_count(molecule), (5 + 6 - 1) + 4 + 7);
        assert!(assembly.child(molecule, "Ethyl").is_some());
    }

    #[test]
    fn h_cap_fills_every_open_port() {
        let mut assembly = Assembly::new();
        let chain = alkane(&mut assembly, 2).unwrap();

        let capped = h_cap(&mut assembly, chain).unwrap();

        assert_eq!(assembly.particle_count(capped), 8);
        assert_eq!(assembly.bond_count(capped), 7);
        assert!(assembly.all_ports(capped).is_empty());
        assert_eq!(assembly.parent(chain), Some(capped));
    }

    #[test]
    fn grafted_chain_exposes_down_port_only() {
        let mut assembly = Assembly::new();
        let chain = grafted_chain(&mut assembly, 4, Terminal::Methyl).unwrap();

        assert_eq!(assembly.compound(chain).unwrap().name, "Alkylsilane");
        assert_eq!(assembly.particle_count(chain), 3 + 12 + 4);
        let down = assembly.child(chain, "down").unwrap();
        assert_eq!(assembly.all_ports(chain), vec![down]);
        let methyl_carbon = assembly.lookup(chain, "Methyl/CH3[0]/C[0]").unwrap();
        let ancestors: Vec<&str> = assembly.ancestors(methyl_carbon).collect();
        assert_eq!(ancestors, vec!["CH3", "Methyl", "Alkylsilane"]);
    }

    #[test]
    fn grafted_chain_terminal_variants() {
        let mut assembly = Assembly::new();
        let acid = grafted_chain(&mut assembly, 2, Terminal::Carboxylate).unwrap();
        let capped = grafted_chain(&mut assembly, 2, Terminal::Hydrogen).unwrap();

        assert_eq!(assembly.particle_count(acid), 3 + 6 + 4);
        assert_eq!(assembly.particle_count(capped), 3 + 6 + 1);
        assert!(assembly.child(acid, "Carboxylate").is_some());
    }

    fn count(assembly: &Assembly, root: NodeId, element: Element) -> usize {
        assembly
            .particles(root)
            .filter(|(_, p)| p.element == element)
            .count()
    }

    #[test]
    fn modified_chain_compositions() {
        // (group, particles, H, O, C, N) for four methylene units.
        let cases = [
            (ChainGroup::Carbonyl, 15, 6, 4, 4, 0),
            (ChainGroup::Ester, 13, 4, 5, 3, 0),
            (ChainGroup::Amide, 14, 5, 4, 3, 1),
            (ChainGroup::Ether, 14, 6, 4, 3, 0),
        ];
        for (group, particles, h, o, c, n) in cases {
            let mut assembly = Assembly::new();
            let chain = modified_chain(&mut assembly, 4, group).unwrap();

            assert_eq!(assembly.particle_count(chain), particles, "{group:?}");
            assert_eq!(count(&assembly, chain, Element::H), h, "{group:?}");
            assert_eq!(count(&assembly, chain, Element::O), o, "{group:?}");
            assert_eq!(count(&assembly, chain, Element::C), c, "{group:?}");
            assert_eq!(count(&assembly, chain, Element::N), n, "{group:?}");
            let primary = assembly.child(chain, "primary").unwrap();
            let secondary = assembly.child(chain, "secondary").unwrap();
            assert_eq!(assembly.all_ports(chain), vec![secondary, primary], "{group:?}");
        }
    }

    #[test]
    fn carbonyl_oxygen_sits_at_double_bond_distance() {
        let mut assembly = Assembly::new();
        let chain = modified_chain(&mut assembly, 3, ChainGroup::Carbonyl).unwrap();

        let carbon = assembly.lookup(chain, "Alkylsilane[0]/alkane/CH2[0]/C[0]").unwrap();
        let oxygen = assembly.lookup(chain, "Alkylsilane[0]/alkane/CH2[0]/H[0]").unwrap();
        let o = assembly.particle(oxygen).unwrap();

        assert_eq!(o.element, Element::O);
        assert_eq!(o.name, "O");
        assert!((o.distance(assembly.particle(carbon).unwrap()) - 0.124).abs() < 1e-9);
        assert_eq!(assembly.neighbors(carbon).len(), 3);
        assert!(assembly.lookup(chain, "Alkylsilane[0]/alkane/CH2[0]/H[1]").is_none());
    }

    #[test]
    fn ester_and_amide_linkers_have_expected_valence() {
        let mut assembly = Assembly::new();
        let ester = modified_chain(&mut assembly, 4, ChainGroup::Ester).unwrap();
        let amide = modified_chain(&mut assembly, 4, ChainGroup::Amide).unwrap();

        let ester_o = assembly.lookup(ester, "Alkylsilane[0]/alkane/CH2[2]/C[0]").unwrap();
        let amide_n = assembly.lookup(amide, "Alkylsilane[0]/alkane/CH2[2]/C[0]").unwrap();

        assert_eq!(assembly.particle(ester_o).unwrap().element, Element::O);
        assert_eq!(assembly.neighbors(ester_o).len(), 2);
        assert_eq!(assembly.particle(amide_n).unwrap().element, Element::N);
        assert_eq!(assembly.neighbors(amide_n).len(), 3);
    }

    #[test]
    fn modified_chain_rejects_short_chains() {
        let mut assembly = Assembly::new();

        assert_eq!(
            modified_chain(&mut assembly, 2, ChainGroup::Ester),
            Err(Error::ChainTooShort { length: 2, minimum: 3 })
        );
        assert!(modified_chain(&mut assembly, 2, ChainGroup::Ether).is_ok());
    }

    #[test]
    fn functionalized_alkylsilane_on_modified_chain() {
        let mut assembly = Assembly::new();
        let molecule =
            functionalized_alkylsilane(&mut assembly, 4, Secondary::Methyl, Some(ChainGroup::Ester))
                .unwrap();

        assert_eq!(assembly.particle_count(molecule), 13 + 4 + 4);
        assert!(assembly.all_ports(molecule).is_empty());
        assert!(assembly.child(molecule, "ModifiedChain[0]").is_some());
    }

    #[test]
    fn h_cap_rejects_owned_molecule_without_docking() {
        let mut assembly = Assembly::new();
        let holder = assembly.create_compound("Holder");
        let chain = alkane(&mut assembly, 2).unwrap();
        assembly.add(holder, chain, None).unwrap();
        let bonds = assembly.bond_count(chain);

        let result = h_cap(&mut assembly, chain);

        assert!(matches!(
            result,
            Err(Error::Structure(StructureError::AlreadyOwned { .. }))
        ));
        assert_eq!(assembly.all_ports(chain).len(), 2);
        assert_eq!(assembly.bond_count(chain), bonds);
    }

    #[test]
    fn acetic_acid_joins_methyl_to_carboxyl_carbon() {
        let mut assembly = Assembly::new();
        let acid = acetic_acid(&mut assembly).unwrap();

        assert_eq!(assembly.particle_count(acid), 8);
        assert_eq!(assembly.bond_count(acid), 7);
        assert!(assembly.all_ports(acid).is_empty());
        let carboxyl = assembly.lookup(acid, "Carboxylate/C[0]").unwrap();
        let methyl = assembly.lookup(acid, "CH3/C[0]").unwrap();
        assert!(assembly.neighbors(carboxyl).contains(&methyl));
        let distance = assembly
            .particle(carboxyl)
            .unwrap()
            .distance(assembly.particle(methyl).unwrap());
        assert!((distance - 0.146).abs() < 1e-9);
    }
}
