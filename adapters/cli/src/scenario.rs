use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use skirmish_core::{CellCoord, UnitSpec};

const SUPPORTED_SCENARIO_VERSION: u32 = 1;

const DEFAULT_SCENARIO: &str = r#"
version = 1
points = 1500

[[units]]
unit_type = "Swordsman"
health = 140
base_attack = 18
cost = 20
attack_type = "melee"
attack_bonuses = { Pikeman = 1.5 }
defence_bonuses = { Archer = 1.25 }

[[units]]
unit_type = "Pikeman"
health = 110
base_attack = 20
cost = 15
attack_type = "melee"
attack_bonuses = { Knight = 2.0 }

[[units]]
unit_type = "Archer"
health = 60
base_attack = 25
cost = 12
attack_type = "ranged"
attack_bonuses = { Swordsman = 1.5 }

[[units]]
unit_type = "Knight"
health = 200
base_attack = 30
cost = 35
attack_type = "melee"
defence_bonuses = { Swordsman = 1.5 }
"#;

/// Unit templates and the points budget both armies are drafted from.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Scenario {
    pub(crate) points: u32,
    pub(crate) templates: Vec<UnitSpec>,
}

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    version: u32,
    points: u32,
    units: Vec<TemplateEntry>,
}

#[derive(Debug, Deserialize)]
struct TemplateEntry {
    unit_type: String,
    health: i32,
    base_attack: u32,
    cost: u32,
    attack_type: String,
    #[serde(default)]
    attack_bonuses: BTreeMap<String, f64>,
    #[serde(default)]
    defence_bonuses: BTreeMap<String, f64>,
}

impl Scenario {
    /// Built-in roster used when no scenario file is given.
    pub(crate) fn builtin() -> Result<Self> {
        parse_scenario(DEFAULT_SCENARIO).context("built-in scenario is malformed")
    }

    /// Reads a scenario from a TOML file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        parse_scenario(&contents)
            .with_context(|| format!("invalid scenario in {}", path.display()))
    }
}

fn parse_scenario(contents: &str) -> Result<Scenario> {
    let file: ScenarioFile =
        toml::from_str(contents).context("failed to parse scenario toml contents")?;
    if file.version != SUPPORTED_SCENARIO_VERSION {
        bail!(
            "unsupported scenario version {}; expected {}",
            file.version,
            SUPPORTED_SCENARIO_VERSION
        );
    }
    if file.units.is_empty() {
        bail!("scenario lists no unit templates");
    }

    let mut templates = Vec::with_capacity(file.units.len());
    for entry in file.units {
        if templates
            .iter()
            .any(|existing: &UnitSpec| existing.unit_type == entry.unit_type)
        {
            bail!("scenario lists unit type `{}` twice", entry.unit_type);
        }
        templates.push(UnitSpec {
            name: entry.unit_type.clone(),
            unit_type: entry.unit_type,
            health: entry.health,
            base_attack: entry.base_attack,
            cost: entry.cost,
            attack_type: entry.attack_type,
            attack_bonuses: entry.attack_bonuses,
            defence_bonuses: entry.defence_bonuses,
            cell: CellCoord::new(0, 0),
        });
    }

    Ok(Scenario {
        points: file.points,
        templates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_scenario_lists_four_unit_types() {
        let scenario = Scenario::builtin().expect("built-in scenario parses");
        let types: Vec<_> = scenario
            .templates
            .iter()
            .map(|template| template.unit_type.as_str())
            .collect();

        assert_eq!(types, vec!["Swordsman", "Pikeman", "Archer", "Knight"]);
        assert_eq!(scenario.points, 1500);
        assert_eq!(
            scenario.templates[0].attack_bonuses.get("Pikeman"),
            Some(&1.5)
        );
        assert!(scenario.templates[2].defence_bonuses.is_empty());
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let error = parse_scenario("version = 2\npoints = 10\nunits = []\n")
            .expect_err("version 2 is unknown");
        assert!(error.to_string().contains("unsupported scenario version"));
    }

    #[test]
    fn duplicate_unit_types_are_rejected() {
        let contents = r#"
version = 1
points = 100

[[units]]
unit_type = "Archer"
health = 10
base_attack = 5
cost = 3
attack_type = "ranged"

[[units]]
unit_type = "Archer"
health = 12
base_attack = 4
cost = 3
attack_type = "ranged"
"#;
        let error = parse_scenario(contents).expect_err("duplicate type");
        assert!(error.to_string().contains("twice"));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let error = Scenario::load(Path::new("/nonexistent/skirmish.toml"))
            .expect_err("file does not exist");
        assert!(format!("{error:#}").contains("/nonexistent/skirmish.toml"));
    }
}
