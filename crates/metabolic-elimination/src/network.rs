//! Metabolic network shape needed by the PARADIGM stage: reactions grouped
//! into subsystems (pathways) and the metabolites they connect.
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metabolite {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: String,
    /// Reactions without a subsystem are left out of every pathway file.
    #[serde(default)]
    pub subsystem: Option<String>,
    /// Participating metabolite ids, in model order.
    #[serde(default)]
    pub metabolites: Vec<String>,
}

/// A named pathway, the unit of one external-tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Subsystem {
    pub name: String,
    /// `name` with `/` and spaces replaced by `-`.
    pub file_stem: String,
    /// Transport/exchange pathways are never run through the tool.
    pub excluded: bool,
}

impl Subsystem {
    pub fn pathway_file_name(&self) -> String {
        format!("pathway_{}.tab", self.file_stem)
    }
}

pub fn file_stem(name: &str) -> String {
    name.replace(['/', ' '], "-")
}

#[derive(Debug, Clone)]
pub struct PathwayModel {
    metabolites: Vec<Metabolite>,
    reactions: Vec<Reaction>,
    subsystems: Vec<Subsystem>,
    reaction_ids: HashSet<String>,
}

impl PathwayModel {
    /// Builds the model and classifies every subsystem once: it is excluded
    /// when its file stem starts with one of `excluded_prefixes`.
    pub fn new(metabolites: Vec<Metabolite>, reactions: Vec<Reaction>, excluded_prefixes: &[String]) -> Self {
        let mut subsystems: Vec<Subsystem> = Vec::new();
        for name in reactions.iter().filter_map(|r| r.subsystem.as_deref()) {
            if name.is_empty() || subsystems.iter().any(|s| s.name == name) {
                continue;
            }
            let stem = file_stem(name);
            let excluded = excluded_prefixes.iter().any(|p| stem.starts_with(p.as_str()));
            subsystems.push(Subsystem {
                name: name.to_string(),
                file_stem: stem,
                excluded,
            });
        }

        let reaction_ids = reactions.iter().map(|r| r.id.clone()).collect();
        PathwayModel {
            metabolites,
            reactions,
            subsystems,
            reaction_ids,
        }
    }

    pub fn metabolites(&self) -> &[Metabolite] {
        &self.metabolites
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    /// Non-empty subsystem names in order of first appearance.
    pub fn subsystems(&self) -> &[Subsystem] {
        &self.subsystems
    }

    pub fn reaction_ids(&self) -> &HashSet<String> {
        &self.reaction_ids
    }

    /// Distinct non-empty subsystems of the reactions `metabolite` takes part in.
    pub fn connected_subsystems(&self, metabolite: &str) -> Vec<&str> {
        let mut connected: Vec<&str> = Vec::new();
        for reaction in &self.reactions {
            if let Some(subsystem) = reaction.subsystem.as_deref() {
                if !subsystem.is_empty()
                    && reaction.metabolites.iter().any(|m| m == metabolite)
                    && !connected.contains(&subsystem)
                {
                    connected.push(subsystem);
                }
            }
        }
        connected
    }

    /// Reactions assigned to `subsystem`, in model order.
    pub fn reactions_in<'a>(&'a self, subsystem: &'a str) -> impl Iterator<Item = &'a Reaction> + 'a {
        self.reactions
            .iter()
            .filter(move |r| r.subsystem.as_deref() == Some(subsystem))
    }
}
