use serde::{Deserialize, Serialize};

/// Seed used when no seeding is configured, so fixtures replay identically.
pub const DEFAULT_SEED: u64 = 123;

/// Where the random result source draws its seed from.
///
/// Written as `{ fixed = 7 }` / `fixed: 7` or as the keyword `entropy`, the
/// same shape in every config format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SeedingRepr", into = "SeedingRepr")]
pub enum Seeding {
    /// Deterministic sequence for reproducible test suites.
    Fixed(u64),
    /// Fresh operating-system entropy on every construction.
    Entropy,
}

#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum SeedingRepr {
    Fixed { fixed: u64 },
    Keyword(SeedingKeyword),
}

#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum SeedingKeyword {
    Entropy,
}

impl From<SeedingRepr> for Seeding {
    fn from(repr: SeedingRepr) -> Self {
        match repr {
            SeedingRepr::Fixed { fixed } => Seeding::Fixed(fixed),
            SeedingRepr::Keyword(SeedingKeyword::Entropy) => Seeding::Entropy,
        }
    }
}

impl From<Seeding> for SeedingRepr {
    fn from(seeding: Seeding) -> Self {
        match seeding {
            Seeding::Fixed(fixed) => SeedingRepr::Fixed { fixed },
            Seeding::Entropy => SeedingRepr::Keyword(SeedingKeyword::Entropy),
        }
    }
}

impl Default for Seeding {
    fn default() -> Self {
        Seeding::Fixed(DEFAULT_SEED)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MeshConfig {
    #[serde(default)]
    pub seeding: Seeding,
}

impl MeshConfig {
    pub fn fixed(seed: u64) -> Self {
        Self {
            seeding: Seeding::Fixed(seed),
        }
    }

    pub fn entropy() -> Self {
        Self {
            seeding: Seeding::Entropy,
        }
    }
}
