use serde::{Deserialize, Serialize};

/// Level is derived from lifetime experience: `level = floor(sqrt(xp / 50)) + 1`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Progression {
    pub experience: u64,
    pub level: u32,
    pub experience_to_next_level: u64,
}

impl Progression {
    pub fn new() -> Self {
        let mut progression = Self {
            experience: 0,
            level: 1,
            experience_to_next_level: 0,
        };

        progression.recompute();
        progression
    }

    /// Adds experience and recomputes the derived fields.
    /// Returns the new level if the gain crossed a level boundary.
    pub fn add_experience(&mut self, amount: u64) -> Option<u32> {
        let previous_level = self.level;
        self.experience += amount;
        self.recompute();

        (self.level > previous_level).then_some(self.level)
    }

    fn recompute(&mut self) {
        self.level = level_for_experience(self.experience);
        let next_threshold = (self.level as u64 + 1).pow(2) * 50;
        self.experience_to_next_level = next_threshold - self.experience;
    }
}

impl Default for Progression {
    fn default() -> Self {
        Self::new()
    }
}

pub fn level_for_experience(experience: u64) -> u32 {
    (experience as f64 / 50.0).sqrt().floor() as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_experience() {
        assert_eq!(level_for_experience(0), 1);
        assert_eq!(level_for_experience(49), 1);
        assert_eq!(level_for_experience(50), 2);
        assert_eq!(level_for_experience(199), 2);
        assert_eq!(level_for_experience(200), 3);
        assert_eq!(level_for_experience(450), 4);
    }

    #[test]
    fn test_add_experience_recomputes_derived_fields() {
        let mut progression = Progression::new();
        assert_eq!(progression.level, 1);
        assert_eq!(progression.experience_to_next_level, 200);

        let leveled = progression.add_experience(200);
        assert_eq!(leveled, Some(3));
        assert_eq!(progression.level, 3);
        // (3 + 1)^2 * 50 - 200 = 600
        assert_eq!(progression.experience_to_next_level, 600);
    }

    #[test]
    fn test_add_experience_without_level_up() {
        let mut progression = Progression::new();
        assert_eq!(progression.add_experience(10), None);
        assert_eq!(progression.level, 1);
        assert_eq!(progression.experience, 10);
    }

    #[test]
    fn test_formula_holds_across_range() {
        let mut progression = Progression::new();
        for amount in [1, 7, 42, 50, 99, 500, 1234] {
            progression.add_experience(amount);
            let e = progression.experience;
            assert_eq!(progression.level, level_for_experience(e));
            assert_eq!(
                progression.experience_to_next_level,
                (progression.level as u64 + 1).pow(2) * 50 - e
            );
        }
    }
}
