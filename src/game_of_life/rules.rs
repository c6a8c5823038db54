//! Birth/survival rules and the rule-string parser

use super::grid::CellState;
use crate::utils::ColorOutput;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Rule used when no rule string is given or the given one is malformed
pub const DEFAULT_RULE: &str = "B3/S23/A6";

/// Maximum life-force of the default weighted rule
pub const DEFAULT_STRENGTH: CellState = 6;

/// Why a rule string was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("missing 'B' marker")]
    MissingBirthMarker,

    #[error("missing '/S' marker")]
    MissingSurviveMarker,

    #[error("invalid character '{found}' in {section} counts")]
    InvalidDigit { section: &'static str, found: char },

    #[error("invalid strength '{0}', expected an integer between 1 and 255")]
    InvalidStrength(String),
}

/// Birth and survival neighbor counts plus the maximum life-force a newborn
/// cell receives. Binary Life is the special case `strength == 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    pub birth: BTreeSet<u8>,
    pub survive: BTreeSet<u8>,
    pub strength: CellState,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            birth: BTreeSet::from([3]),
            survive: BTreeSet::from([2, 3]),
            strength: DEFAULT_STRENGTH,
        }
    }
}

impl RuleSet {
    pub fn new(
        birth: impl IntoIterator<Item = u8>,
        survive: impl IntoIterator<Item = u8>,
        strength: CellState,
    ) -> Self {
        Self {
            birth: birth.into_iter().collect(),
            survive: survive.into_iter().collect(),
            strength,
        }
    }

    /// Classic two-state Conway rules (B3/S23)
    pub fn conway() -> Self {
        Self::new([3], [2, 3], 1)
    }

    /// Parse a rule string, falling back to [`RuleSet::default`] with a
    /// warning on stderr when the string is malformed. Never fails.
    pub fn parse(rule: &str) -> Self {
        match rule.parse() {
            Ok(rules) => rules,
            Err(e) => {
                let fallback = Self::default();
                let message = format!("Warning: invalid rule '{}' ({}), using {}", rule, e, fallback);
                eprintln!("{}", ColorOutput::warning(&message));
                fallback
            }
        }
    }

    /// Parse an optional rule string; `None` selects the default rules
    pub fn parse_or_default(rule: Option<&str>) -> Self {
        rule.map(Self::parse).unwrap_or_default()
    }

    /// Two-state mode: no life-force gradient and no fertility gate
    pub fn is_binary(&self) -> bool {
        self.strength <= 1
    }

    /// Inclusive bounds `(min + 2, max - 2)` of the fertile life-force values,
    /// where `[min, max] = [0, strength]`. Empty when `strength < 4`.
    pub fn fertility_bounds(&self) -> (i16, i16) {
        (2, self.strength as i16 - 2)
    }

    /// Whether a neighbor with this life-force counts toward a birth
    pub fn is_fertile(&self, value: CellState) -> bool {
        let (low, high) = self.fertility_bounds();
        (low..=high).contains(&(value as i16))
    }

    pub fn allows_birth(&self, count: usize) -> bool {
        u8::try_from(count).is_ok_and(|count| self.birth.contains(&count))
    }

    pub fn allows_survival(&self, count: usize) -> bool {
        u8::try_from(count).is_ok_and(|count| self.survive.contains(&count))
    }

    /// Next state of a cell given its Moore neighborhood.
    ///
    /// Living cells keep their life-force while the living-neighbor count is
    /// in the survive set and lose one point otherwise. Dead cells are born
    /// at full strength when the living-neighbor count is in the birth set;
    /// in weighted mode the number of fertile neighbors must be in the birth
    /// set as well.
    pub fn next_state<I>(&self, cell: CellState, neighbors: I) -> CellState
    where
        I: IntoIterator<Item = CellState>,
    {
        let (alive, fertile) = neighbors.into_iter().fold((0, 0), |(alive, fertile), n| {
            (alive + usize::from(n > 0), fertile + usize::from(self.is_fertile(n)))
        });

        if cell > 0 {
            if self.allows_survival(alive) {
                cell
            } else {
                cell - 1
            }
        } else if self.allows_birth(alive) && (self.is_binary() || self.allows_birth(fertile)) {
            self.strength
        } else {
            0
        }
    }
}

impl FromStr for RuleSet {
    type Err = RuleError;

    /// Strict parser for `B<digits>/S<digits>` and `B<digits>/S<digits>/A<digits>`,
    /// case-insensitive. Without an `/A` section the rule is binary.
    fn from_str(rule: &str) -> Result<Self, Self::Err> {
        let rule = rule.trim().to_ascii_lowercase();

        let b_pos = rule.find('b').ok_or(RuleError::MissingBirthMarker)?;
        let rest = &rule[b_pos + 1..];

        let s_pos = rest.find("/s").ok_or(RuleError::MissingSurviveMarker)?;
        let birth = parse_counts("birth", &rest[..s_pos])?;
        let rest = &rest[s_pos + 2..];

        let (survive, strength) = match rest.find("/a") {
            Some(a_pos) => (
                parse_counts("survive", &rest[..a_pos])?,
                parse_strength(&rest[a_pos + 2..])?,
            ),
            None => (parse_counts("survive", rest)?, 1),
        };

        Ok(Self { birth, survive, strength })
    }
}

fn parse_counts(section: &'static str, digits: &str) -> Result<BTreeSet<u8>, RuleError> {
    digits
        .chars()
        .map(|c| {
            c.to_digit(10)
                .map(|d| d as u8)
                .ok_or(RuleError::InvalidDigit { section, found: c })
        })
        .collect()
}

fn parse_strength(digits: &str) -> Result<CellState, RuleError> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(RuleError::InvalidStrength(digits.to_string()));
    }
    match digits.parse::<CellState>() {
        Ok(strength) if strength > 0 => Ok(strength),
        _ => Err(RuleError::InvalidStrength(digits.to_string())),
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B")?;
        for count in &self.birth {
            write!(f, "{}", count)?;
        }
        write!(f, "/S")?;
        for count in &self.survive {
            write!(f, "{}", count)?;
        }
        if !self.is_binary() {
            write!(f, "/A{}", self.strength)?;
        }
        Ok(())
    }
}
