//! Reaction-network model.
//!
//! A `Model` is the parsed form of a model document: compartments, species, parameters
//! and reactions in declaration order. Construction validates the structure and builds
//! two lookup tables:
//!
//! - a variable registry that tags every identifier as a species, parameter or
//!   compartment together with its index in the matching list
//! - compiled rate expressions for all kinetic laws, bound to the slot layout
//!
//! # Slot layout
//!
//! Rate expressions read from a flat slot vector: species concentrations first, then
//! parameter values, then compartment sizes, each block in declaration order.
//!
//! # Example
//!
//! ```
//! use reactsim::model::{Compartment, Model, Parameter, Reaction, Species};
//!
//! let model = Model::new(
//!     Some("decay".to_string()),
//!     vec![Compartment::new("cell", 1.0)],
//!     vec![Species::new("A", "cell", 10.0, false)],
//!     vec![Parameter::new("k", 0.1)],
//!     vec![Reaction::new("R1", "k * A").reactant("A", 1.0)],
//! )
//! .unwrap();
//!
//! assert_eq!(model.slot_values(), vec![10.0, 0.1, 1.0]);
//! ```

use std::collections::HashMap;

use crate::errors::ModelError;
use crate::kinetics::{self, RateExpr};

/// A compartment with a fixed size.
#[derive(Debug, Clone, PartialEq)]
pub struct Compartment {
    pub id: String,
    pub size: f64,
}

impl Compartment {
    pub fn new(id: impl Into<String>, size: f64) -> Self {
        Self {
            id: id.into(),
            size,
        }
    }
}

/// A chemical species.
///
/// Boundary species are held constant by the integrator; floating species evolve with
/// the reactions.
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    pub id: String,
    pub compartment: String,
    pub initial_concentration: f64,
    pub boundary_condition: bool,
}

impl Species {
    pub fn new(
        id: impl Into<String>,
        compartment: impl Into<String>,
        initial_concentration: f64,
        boundary_condition: bool,
    ) -> Self {
        Self {
            id: id.into(),
            compartment: compartment.into(),
            initial_concentration,
            boundary_condition,
        }
    }
}

/// A named numeric parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub id: String,
    pub value: f64,
}

impl Parameter {
    pub fn new(id: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}

/// Participation of a species in a reaction.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesReference {
    pub species: String,
    pub stoichiometry: f64,
}

/// A reaction with its kinetic-law formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    pub id: String,
    pub reactants: Vec<SpeciesReference>,
    pub products: Vec<SpeciesReference>,
    pub kinetic_law: String,
}

impl Reaction {
    pub fn new(id: impl Into<String>, kinetic_law: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reactants: Vec::new(),
            products: Vec::new(),
            kinetic_law: kinetic_law.into(),
        }
    }

    pub fn reactant(mut self, species: impl Into<String>, stoichiometry: f64) -> Self {
        self.reactants.push(SpeciesReference {
            species: species.into(),
            stoichiometry,
        });
        self
    }

    pub fn product(mut self, species: impl Into<String>, stoichiometry: f64) -> Self {
        self.products.push(SpeciesReference {
            species: species.into(),
            stoichiometry,
        });
        self
    }
}

/// Tagged entry of the variable registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableRef {
    Species(usize),
    Parameter(usize),
    Compartment(usize),
}

/// A reaction-network model with its registry and compiled kinetic laws.
#[derive(Debug, Clone)]
pub struct Model {
    id: Option<String>,
    compartments: Vec<Compartment>,
    species: Vec<Species>,
    parameters: Vec<Parameter>,
    reactions: Vec<Reaction>,
    registry: HashMap<String, VariableRef>,
    rate_laws: Vec<RateExpr>,
    /// Net stoichiometry per reaction as (species index, coefficient)
    stoichiometry: Vec<Vec<(usize, f64)>>,
}

impl Model {
    /// Assembles and validates a model.
    ///
    /// All structural problems are collected rather than stopping at the first one, so
    /// a parser can report every offending declaration at once.
    pub fn new(
        id: Option<String>,
        compartments: Vec<Compartment>,
        species: Vec<Species>,
        parameters: Vec<Parameter>,
        reactions: Vec<Reaction>,
    ) -> Result<Self, Vec<ModelError>> {
        let mut problems = Vec::new();
        let mut registry = HashMap::new();

        let entries = compartments
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.as_str(), VariableRef::Compartment(i)))
            .chain(
                species
                    .iter()
                    .enumerate()
                    .map(|(i, s)| (s.id.as_str(), VariableRef::Species(i))),
            )
            .chain(
                parameters
                    .iter()
                    .enumerate()
                    .map(|(i, p)| (p.id.as_str(), VariableRef::Parameter(i))),
            );
        for (name, entry) in entries {
            if registry.contains_key(name) {
                problems.push(ModelError::DuplicateIdentifier(name.to_string()));
            } else {
                registry.insert(name.to_string(), entry);
            }
        }

        for s in &species {
            if !matches!(
                registry.get(&s.compartment),
                Some(VariableRef::Compartment(_))
            ) {
                problems.push(ModelError::UnknownCompartment {
                    species: s.id.clone(),
                    compartment: s.compartment.clone(),
                });
            }
        }

        let slots = slot_map(&species, &parameters, &compartments);
        let mut rate_laws = Vec::with_capacity(reactions.len());
        let mut stoichiometry = Vec::with_capacity(reactions.len());
        for reaction in &reactions {
            match kinetics::compile(&reaction.kinetic_law, &slots) {
                Ok(rate) => rate_laws.push(rate),
                Err(source) => problems.push(ModelError::KineticLaw {
                    reaction: reaction.id.clone(),
                    source,
                }),
            }

            let mut net = Vec::new();
            let participants = reaction
                .reactants
                .iter()
                .map(|r| (r, -1.0))
                .chain(reaction.products.iter().map(|p| (p, 1.0)));
            for (reference, sign) in participants {
                match registry.get(&reference.species) {
                    Some(VariableRef::Species(index)) => {
                        net.push((*index, sign * reference.stoichiometry))
                    }
                    _ => problems.push(ModelError::UnknownSpecies {
                        reaction: reaction.id.clone(),
                        species: reference.species.clone(),
                    }),
                }
            }
            stoichiometry.push(net);
        }

        if !problems.is_empty() {
            return Err(problems);
        }

        Ok(Self {
            id,
            compartments,
            species,
            parameters,
            reactions,
            registry,
            rate_laws,
            stoichiometry,
        })
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn compartments(&self) -> &[Compartment] {
        &self.compartments
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    /// Resolves an identifier against the variable registry.
    pub fn lookup(&self, id: &str) -> Option<VariableRef> {
        self.registry.get(id).copied()
    }

    /// Sets the initial concentration of the species at `index`.
    ///
    /// Returns `false` and leaves the model unchanged if `index` is out of range.
    pub fn set_species_concentration(&mut self, index: usize, value: f64) -> bool {
        match self.species.get_mut(index) {
            Some(species) => {
                species.initial_concentration = value;
                true
            }
            None => false,
        }
    }

    /// Sets the value of the parameter at `index`.
    ///
    /// Returns `false` and leaves the model unchanged if `index` is out of range.
    pub fn set_parameter_value(&mut self, index: usize, value: f64) -> bool {
        match self.parameters.get_mut(index) {
            Some(parameter) => {
                parameter.value = value;
                true
            }
            None => false,
        }
    }

    /// Compiled rate expressions, one per reaction.
    pub fn rate_laws(&self) -> &[RateExpr] {
        &self.rate_laws
    }

    /// Net stoichiometric coefficients of the reaction at `index`.
    pub fn net_stoichiometry(&self, index: usize) -> &[(usize, f64)] {
        &self.stoichiometry[index]
    }

    /// Size of the compartment holding the species at `index`.
    pub fn species_volume(&self, index: usize) -> f64 {
        match self.lookup(&self.species[index].compartment) {
            Some(VariableRef::Compartment(c)) => self.compartments[c].size,
            _ => 1.0,
        }
    }

    /// Current values laid out as the slot vector read by the rate expressions.
    pub fn slot_values(&self) -> Vec<f64> {
        self.species
            .iter()
            .map(|s| s.initial_concentration)
            .chain(self.parameters.iter().map(|p| p.value))
            .chain(self.compartments.iter().map(|c| c.size))
            .collect()
    }
}

fn slot_map(
    species: &[Species],
    parameters: &[Parameter],
    compartments: &[Compartment],
) -> HashMap<String, usize> {
    species
        .iter()
        .map(|s| s.id.clone())
        .chain(parameters.iter().map(|p| p.id.clone()))
        .chain(compartments.iter().map(|c| c.id.clone()))
        .enumerate()
        .map(|(i, name)| (name, i))
        .collect()
}
