#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded army drafting for the computer side.
//!
//! Templates are ranked by how much attack and health each point buys, then
//! drafted greedily: every template contributes copies until the per-type cap
//! or the points budget stops it. Each copy lands on a distinct random cell
//! of the placement field.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use skirmish_core::{Army, CellCoord, GridSize, UnitSpec, COMBAT_GRID, PLACEMENT_GRID};
use thiserror::Error;

/// Copies of a single unit type a preset may contain.
pub const MAX_COPIES_PER_TYPE: u32 = 11;

/// Configuration parameters required to construct the preset generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    field: GridSize,
    per_type_cap: u32,
    column_offset: u32,
    seed: u64,
}

impl Config {
    /// Creates a configuration drafting onto the standard placement field.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            field: PLACEMENT_GRID,
            per_type_cap: MAX_COPIES_PER_TYPE,
            column_offset: 0,
            seed,
        }
    }

    /// Shifts every drafted cell right by `offset` columns on the combat grid.
    #[must_use]
    pub const fn with_column_offset(mut self, offset: u32) -> Self {
        self.column_offset = offset;
        self
    }

    /// Overrides the placement field.
    #[must_use]
    pub const fn with_field(mut self, field: GridSize) -> Self {
        self.field = field;
        self
    }

    /// Overrides the number of copies allowed per unit type.
    #[must_use]
    pub const fn with_per_type_cap(mut self, cap: u32) -> Self {
        self.per_type_cap = cap;
        self
    }

    /// Placement field units are drafted onto.
    #[must_use]
    pub const fn field(&self) -> GridSize {
        self.field
    }

    /// Copies allowed per unit type.
    #[must_use]
    pub const fn per_type_cap(&self) -> u32 {
        self.per_type_cap
    }

    /// Column offset applied when mapping the field onto the combat grid.
    #[must_use]
    pub const fn column_offset(&self) -> u32 {
        self.column_offset
    }

    /// Seed of the placement generator.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Reasons a preset cannot be drafted.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PresetError {
    /// A template costs nothing, so its efficiency is undefined.
    #[error("unit type `{unit_type}` has zero cost")]
    ZeroCost {
        /// Offending unit type.
        unit_type: String,
    },
    /// The shifted placement field does not fit on the combat grid.
    #[error("placement field {width}x{height} at column {column_offset} leaves the combat grid")]
    FieldOutsideGrid {
        /// Configured column offset.
        column_offset: u32,
        /// Placement field width.
        width: u32,
        /// Placement field height.
        height: u32,
    },
}

/// Drafts armies from unit templates using a seeded generator.
#[derive(Debug)]
pub struct PresetGenerator {
    config: Config,
    rng: ChaCha8Rng,
}

impl PresetGenerator {
    /// Creates a generator using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        }
    }

    /// Configuration the generator was created with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Drafts an army costing at most `max_points`.
    ///
    /// The cells of `templates` are ignored; every drafted copy is named
    /// `"<unit type> <index>"` and placed on an unused cell.
    pub fn generate(
        &mut self,
        templates: &[UnitSpec],
        max_points: u32,
    ) -> Result<Army, PresetError> {
        self.validate_field()?;
        if let Some(template) = templates.iter().find(|template| template.cost == 0) {
            return Err(PresetError::ZeroCost {
                unit_type: template.unit_type.clone(),
            });
        }

        let mut ranked: Vec<&UnitSpec> = templates.iter().collect();
        ranked.sort_by(|a, b| efficiency(b).total_cmp(&efficiency(a)));

        let field = self.config.field;
        let mut free: Vec<CellCoord> = (0..field.cell_count())
            .filter_map(|index| field.cell_at(index))
            .collect();
        let mut units = Vec::new();
        let mut spent = 0u32;

        'templates: for template in ranked {
            let mut copies = 0u32;
            while copies < self.config.per_type_cap
                && spent
                    .checked_add(template.cost)
                    .is_some_and(|total| total <= max_points)
            {
                if free.is_empty() {
                    tracing::warn!(
                        drafted = units.len(),
                        "placement field is full, stopping the draft"
                    );
                    break 'templates;
                }

                let slot = free.swap_remove(self.rng.gen_range(0..free.len()));
                let cell = CellCoord::new(slot.x() + self.config.column_offset, slot.y());
                let name = format!("{} {copies}", template.unit_type);
                tracing::debug!(unit = %name, %cell, "drafted unit");

                units.push(UnitSpec {
                    name,
                    cell,
                    ..template.clone()
                });
                spent += template.cost;
                copies += 1;
            }
        }

        let army = Army::new(units);
        tracing::info!(
            units = army.len(),
            points = army.points(),
            max_points,
            "preset drafted"
        );
        Ok(army)
    }

    fn validate_field(&self) -> Result<(), PresetError> {
        let field = self.config.field;
        let fits = self
            .config
            .column_offset
            .checked_add(field.width())
            .is_some_and(|right| right <= COMBAT_GRID.width())
            && field.height() <= COMBAT_GRID.height();
        if fits {
            Ok(())
        } else {
            Err(PresetError::FieldOutsideGrid {
                column_offset: self.config.column_offset,
                width: field.width(),
                height: field.height(),
            })
        }
    }
}

/// Drafts a single army with a fresh generator.
pub fn generate(
    templates: &[UnitSpec],
    max_points: u32,
    config: Config,
) -> Result<Army, PresetError> {
    PresetGenerator::new(config).generate(templates, max_points)
}

fn efficiency(template: &UnitSpec) -> f64 {
    (f64::from(template.base_attack) + f64::from(template.health)) / f64::from(template.cost)
}
