use nalgebra::{Point3, Unit, Vector3};
use std::fmt;
use std::str::FromStr;

pub type Point = Point3<f64>;

pub type Vector = Vector3<f64>;

pub type Axis = Unit<Vector3<f64>>;

slotmap::new_key_type! {
    /// Stable handle of a particle, port, or compound inside an [`Assembly`](super::assembly::Assembly).
    pub struct NodeId;
}

/// Elementary charge in coulombs.
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Element {
    H = 1,
    B = 5,
    C = 6,
    N = 7,
    O = 8,
    F = 9,
    Na = 11,
    Mg = 12,
    Al = 13,
    Si = 14,
    P = 15,
    S = 16,
    Cl = 17,
    K = 19,
    Ca = 20,
    Ti = 22,
    Br = 35,
    I = 53,
    Au = 79,
    Unknown = 0,
}

const ELEMENTS: [Element; 19] = [
    Element::H,
    Element::B,
    Element::C,
    Element::N,
    Element::O,
    Element::F,
    Element::Na,
    Element::Mg,
    Element::Al,
    Element::Si,
    Element::P,
    Element::S,
    Element::Cl,
    Element::K,
    Element::Ca,
    Element::Ti,
    Element::Br,
    Element::I,
    Element::Au,
];

impl Element {
    pub fn symbol(&self) -> &'static str {
        match self {
            Element::H => "H",
            Element::B => "B",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::F => "F",
            Element::Na => "Na",
            Element::Mg => "Mg",
            Element::Al => "Al",
            Element::Si => "Si",
            Element::P => "P",
            Element::S => "S",
            Element::Cl => "Cl",
            Element::K => "K",
            Element::Ca => "Ca",
            Element::Ti => "Ti",
            Element::Br => "Br",
            Element::I => "I",
            Element::Au => "Au",
            Element::Unknown => "Unknown",
        }
    }

    pub fn atomic_number(&self) -> u8 {
        *self as u8
    }

    pub fn atomic_mass(&self) -> f64 {
        match self {
            Element::H => 1.00794,
            Element::B => 10.811,
            Element::C => 12.0107,
            Element::N => 14.0067,
            Element::O => 15.9994,
            Element::F => 18.9984032,
            Element::Na => 22.98976928,
            Element::Mg => 24.3050,
            Element::Al => 26.9815386,
            Element::Si => 28.0855,
            Element::P => 30.973762,
            Element::S => 32.065,
            Element::Cl => 35.453,
            Element::K => 39.0983,
            Element::Ca => 40.078,
            Element::Ti => 47.867,
            Element::Br => 79.904,
            Element::I => 126.90447,
            Element::Au => 196.966569,
            Element::Unknown => 0.0,
        }
    }

    /// Single-bond covalent radius in nanometres.
    ///
    /// Building blocks place a port one radius away from its anchor, so two docked ports leave
    /// their particles at the sum of both radii.
    pub fn covalent_radius(&self) -> f64 {
        match self {
            Element::H => 0.031,
            Element::B => 0.084,
            Element::C => 0.076,
            Element::N => 0.071,
            Element::O => 0.066,
            Element::F => 0.057,
            Element::Na => 0.166,
            Element::Mg => 0.141,
            Element::Al => 0.121,
            Element::Si => 0.111,
            Element::P => 0.107,
            Element::S => 0.105,
            Element::Cl => 0.102,
            Element::K => 0.203,
            Element::Ca => 0.176,
            Element::Ti => 0.160,
            Element::Br => 0.120,
            Element::I => 0.139,
            Element::Au => 0.136,
            Element::Unknown => 0.075,
        }
    }

    /// Resolves an element from a particle label such as `"C"`, `"Si"`, or `"H2"`.
    ///
    /// Trailing digits and bracketed suffixes are ignored. Unrecognized labels map to
    /// [`Element::Unknown`].
    pub fn from_label(label: &str) -> Self {
        let symbol: String = label
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect();
        symbol.parse().unwrap_or(Element::Unknown)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Element {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(num) = s.parse::<u8>() {
            return Ok(ELEMENTS
                .iter()
                .copied()
                .find(|e| e.atomic_number() == num)
                .unwrap_or(Element::Unknown));
        }

        if s == "Unknown" {
            return Ok(Element::Unknown);
        }

        ELEMENTS
            .iter()
            .copied()
            .find(|e| e.symbol().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid element symbol: {}", s))
    }
}
