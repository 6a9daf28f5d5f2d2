//! Constellation line figures.
//!
//! Segments reference stars by proper name; the scene processor resolves
//! them against the processed-star index and silently drops any segment
//! whose endpoints are missing from the loaded catalog.

/// A constellation stick figure.
#[derive(Debug, Clone, Copy)]
pub struct ConstellationFigure {
    pub name: &'static str,
    pub abbreviation: &'static str,
    /// Line segments as (from, to) star names
    pub segments: &'static [(&'static str, &'static str)],
}

pub const FIGURES: &[ConstellationFigure] = &[
    ConstellationFigure {
        name: "Orion",
        abbreviation: "Ori",
        segments: &[
            ("Betelgeuse", "Bellatrix"),
            ("Bellatrix", "Mintaka"),
            ("Mintaka", "Alnilam"),
            ("Alnilam", "Alnitak"),
            ("Alnitak", "Betelgeuse"),
            ("Mintaka", "Rigel"),
            ("Alnitak", "Saiph"),
            ("Rigel", "Saiph"),
        ],
    },
    ConstellationFigure {
        name: "Ursa Major",
        abbreviation: "UMa",
        segments: &[
            ("Dubhe", "Merak"),
            ("Merak", "Phecda"),
            ("Phecda", "Megrez"),
            ("Megrez", "Dubhe"),
            ("Megrez", "Alioth"),
            ("Alioth", "Mizar"),
            ("Mizar", "Alkaid"),
        ],
    },
    ConstellationFigure {
        name: "Ursa Minor",
        abbreviation: "UMi",
        segments: &[("Polaris", "Kochab"), ("Kochab", "Pherkad")],
    },
    ConstellationFigure {
        name: "Cassiopeia",
        abbreviation: "Cas",
        segments: &[
            ("Caph", "Schedar"),
            ("Schedar", "Navi"),
            ("Navi", "Ruchbah"),
            ("Ruchbah", "Segin"),
        ],
    },
    ConstellationFigure {
        name: "Crux",
        abbreviation: "Cru",
        segments: &[("Acrux", "Gacrux"), ("Mimosa", "Imai")],
    },
    ConstellationFigure {
        name: "Scorpius",
        abbreviation: "Sco",
        segments: &[
            ("Dschubba", "Antares"),
            ("Antares", "Sargas"),
            ("Sargas", "Shaula"),
        ],
    },
    ConstellationFigure {
        name: "Cygnus",
        abbreviation: "Cyg",
        segments: &[
            ("Deneb", "Sadr"),
            ("Sadr", "Albireo"),
            ("Sadr", "Aljanah"),
        ],
    },
    ConstellationFigure {
        name: "Lyra",
        abbreviation: "Lyr",
        segments: &[
            ("Vega", "Sheliak"),
            ("Sheliak", "Sulafat"),
            ("Sulafat", "Vega"),
        ],
    },
    ConstellationFigure {
        name: "Canis Major",
        abbreviation: "CMa",
        segments: &[
            ("Sirius", "Mirzam"),
            ("Sirius", "Adhara"),
            ("Adhara", "Wezen"),
            ("Wezen", "Aludra"),
        ],
    },
    ConstellationFigure {
        name: "Leo",
        abbreviation: "Leo",
        segments: &[
            ("Regulus", "Algieba"),
            ("Algieba", "Zosma"),
            ("Zosma", "Denebola"),
        ],
    },
    ConstellationFigure {
        name: "Gemini",
        abbreviation: "Gem",
        segments: &[("Castor", "Pollux"), ("Pollux", "Alhena")],
    },
    ConstellationFigure {
        name: "Taurus",
        abbreviation: "Tau",
        segments: &[("Aldebaran", "Elnath")],
    },
    ConstellationFigure {
        name: "Aquila",
        abbreviation: "Aql",
        segments: &[("Altair", "Tarazed")],
    },
    ConstellationFigure {
        name: "Bootes",
        abbreviation: "Boo",
        segments: &[("Arcturus", "Izar")],
    },
    ConstellationFigure {
        name: "Centaurus",
        abbreviation: "Cen",
        segments: &[("Rigil Kentaurus", "Hadar"), ("Hadar", "Menkent")],
    },
    ConstellationFigure {
        name: "Carina",
        abbreviation: "Car",
        segments: &[("Canopus", "Avior"), ("Avior", "Miaplacidus")],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StarCatalog;
    use std::collections::HashSet;

    #[test]
    fn test_every_figure_star_is_in_bundled_catalog() {
        // The bundled fallback must be able to draw every figure.
        let catalog = StarCatalog::bundled();
        let names: HashSet<String> = catalog
            .stars()
            .iter()
            .map(|s| s.name.to_lowercase())
            .collect();

        for figure in FIGURES {
            for (a, b) in figure.segments {
                assert!(
                    names.contains(&a.to_lowercase()),
                    "{}: `{a}` missing from bundled catalog",
                    figure.name
                );
                assert!(
                    names.contains(&b.to_lowercase()),
                    "{}: `{b}` missing from bundled catalog",
                    figure.name
                );
            }
        }
    }

    #[test]
    fn test_abbreviations_unique() {
        let mut seen = HashSet::new();
        for figure in FIGURES {
            assert!(seen.insert(figure.abbreviation), "duplicate {}", figure.abbreviation);
            assert!(!figure.segments.is_empty());
        }
    }

    #[test]
    fn test_no_degenerate_segments() {
        for figure in FIGURES {
            for (a, b) in figure.segments {
                assert_ne!(a, b, "{}: segment from a star to itself", figure.name);
            }
        }
    }
}
