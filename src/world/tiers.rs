//! Decorative object tiers: unlock thresholds, scatter parameters, and models.

/// Decorative object categories, in unlock order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectTier {
    Tree,
    Bush,
    Rock,
    Grass,
    Stump,
    Flowers,
}

/// How many instances of a tier to scatter, and how.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierPlacement {
    pub count: usize,
    /// Side of the square the instances land in, centred on the origin.
    pub area: f32,
    pub base_scale: f32,
    /// Seconds between the tier appearing and its entrance animation starting.
    pub delay: f32,
}

impl ObjectTier {
    pub const ALL: [ObjectTier; 6] = [
        ObjectTier::Tree,
        ObjectTier::Bush,
        ObjectTier::Rock,
        ObjectTier::Grass,
        ObjectTier::Stump,
        ObjectTier::Flowers,
    ];

    /// Minimum xp at which the tier is shown.
    pub const fn threshold(self) -> u32 {
        match self {
            Self::Tree => 50,
            Self::Bush => 120,
            Self::Rock => 250,
            Self::Grass => 400,
            Self::Stump => 600,
            Self::Flowers => 800,
        }
    }

    pub const fn placement(self) -> TierPlacement {
        let (count, area, base_scale, delay) = match self {
            Self::Tree => (5, 12.0, 0.9, 0.1),
            Self::Bush => (6, 10.0, 0.7, 0.3),
            Self::Rock => (6, 10.0, 0.6, 0.5),
            Self::Grass => (8, 12.0, 0.5, 0.7),
            Self::Stump => (4, 8.0, 0.8, 0.9),
            Self::Flowers => (10, 10.0, 0.6, 1.1),
        };
        TierPlacement {
            count,
            area,
            base_scale,
            delay,
        }
    }

    pub const fn model_path(self) -> &'static str {
        match self {
            Self::Tree => "models/nature/Tree_01.glb",
            Self::Bush => "models/nature/Bush_01.glb",
            Self::Rock => "models/nature/Rock_01.glb",
            Self::Grass => "models/nature/Grass_01.glb",
            Self::Stump => "models/nature/Stump_01.glb",
            Self::Flowers => "models/nature/Flowers_01.glb",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Tree => "trees",
            Self::Bush => "bushes",
            Self::Rock => "rocks",
            Self::Grass => "grass",
            Self::Stump => "stumps",
            Self::Flowers => "flowers",
        }
    }

    pub fn is_unlocked(self, xp: u32) -> bool {
        self.threshold() <= xp
    }

    /// Tiers unlocked at `xp`, in tier order.
    pub fn unlocked_at(xp: u32) -> Vec<ObjectTier> {
        Self::ALL
            .into_iter()
            .filter(|tier| tier.is_unlocked(xp))
            .collect()
    }
}
