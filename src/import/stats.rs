//! Counters for one import run.

use std::fmt;

use crate::repository::DimensionKind;

/// Dimension rows created during one run, per lookup table.
#[derive(Debug, Default, Clone)]
pub struct DimensionCounts {
    pub countries: usize,
    pub purposes: usize,
    pub base_types: usize,
    pub warhead_types: usize,
    pub guidance_systems: usize,
}

impl DimensionCounts {
    pub fn record(&mut self, kind: DimensionKind) {
        match kind {
            DimensionKind::Country => self.countries += 1,
            DimensionKind::Purpose => self.purposes += 1,
            DimensionKind::BaseType => self.base_types += 1,
            DimensionKind::WarheadType => self.warhead_types += 1,
            DimensionKind::GuidanceSystem => self.guidance_systems += 1,
        }
    }

    pub fn merge(&mut self, other: &DimensionCounts) {
        self.countries += other.countries;
        self.purposes += other.purposes;
        self.base_types += other.base_types;
        self.warhead_types += other.warhead_types;
        self.guidance_systems += other.guidance_systems;
    }
}

/// What an import run did, per entity kind.
#[derive(Debug, Default, Clone)]
pub struct ImportStats {
    pub missiles_created: usize,
    pub missiles_updated: usize,
    pub missiles_skipped: usize,
    pub detailed_imported: usize,
    pub detailed_skipped: usize,
    pub structured_fields: usize,
    pub characteristics: usize,
    pub images: usize,
    pub dimensions: DimensionCounts,
    pub errors: usize,
}

impl ImportStats {
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// Session status string recorded in the database.
    pub fn status(&self) -> &'static str {
        if self.has_errors() {
            "completed_with_errors"
        } else {
            "completed"
        }
    }
}

impl fmt::Display for ImportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Missiles: {} created, {} updated, {} skipped",
            self.missiles_created, self.missiles_updated, self.missiles_skipped
        )?;
        writeln!(
            f,
            "Detail records: {} imported, {} skipped",
            self.detailed_imported, self.detailed_skipped
        )?;
        writeln!(
            f,
            "Children: {} structured fields, {} characteristics, {} images",
            self.structured_fields, self.characteristics, self.images
        )?;
        writeln!(
            f,
            "New dimensions: {} countries, {} purposes, {} base types, \
             {} warhead types, {} guidance systems",
            self.dimensions.countries,
            self.dimensions.purposes,
            self.dimensions.base_types,
            self.dimensions.warhead_types,
            self.dimensions.guidance_systems
        )?;
        write!(f, "Errors: {}", self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reflects_errors() {
        let mut stats = ImportStats::default();
        assert_eq!(stats.status(), "completed");
        stats.errors = 1;
        assert_eq!(stats.status(), "completed_with_errors");
    }
}
