//! The finite-state transducer produced by the synthesis tool.
//!
//! Machines are read from a line-oriented `key: value` file:
//!
//! ```text
//! semantic: mealy
//! states: 2
//! state_transitions: {1,1,}
//! trans_0_0: {1;4;[40]}
//! trans_1_0: {0;5;[41]}
//! state_labels: {}
//! state_label_accumulated_bits: {}
//! state_label_bits: -1
//! ```
//!
//! Loading is all-or-nothing: any malformed or missing entry fails the load.

use crate::machine::error::MachineError;
use crate::machine::transition::MachineTransition;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Output semantic of the machine as recorded by the synthesis tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Semantic {
    Mealy,
    Moore,
}

impl FromStr for Semantic {
    type Err = MachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mealy" => Ok(Self::Mealy),
            "moore" => Ok(Self::Moore),
            other => Err(MachineError::UnknownSemantic(other.to_string())),
        }
    }
}

impl fmt::Display for Semantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mealy => write!(f, "mealy"),
            Self::Moore => write!(f, "moore"),
        }
    }
}

/// Read-only machine: per-state ordered transition lists plus the label
/// metadata carried through from the controller file.
///
/// # Example
///
/// ```rust
/// use symloop::machine::{Machine, MachineTransition, Semantic};
///
/// let machine = Machine::new(
///     Semantic::Mealy,
///     vec![vec![MachineTransition::new(1, 4, vec![40])], vec![]],
/// )
/// .unwrap();
///
/// assert_eq!(machine.states(), 2);
/// assert_eq!(machine.state_transitions(0)[0].outputs, vec![40]);
/// assert!(machine.state_transitions(1).is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    semantic: Semantic,
    transitions: Vec<Vec<MachineTransition>>,
    state_labels: Vec<String>,
    state_label_bits: i64,
    state_label_accumulated_bits: Vec<u64>,
}

impl Machine {
    /// Build a machine from per-state transition lists.
    /// Every `next_state` must name an existing state.
    pub fn new(
        semantic: Semantic,
        transitions: Vec<Vec<MachineTransition>>,
    ) -> Result<Self, MachineError> {
        let states = transitions.len();
        for trans in transitions.iter().flatten() {
            if trans.next_state >= states {
                return Err(MachineError::StateOutOfRange {
                    state: trans.next_state,
                    states,
                });
            }
        }

        Ok(Self {
            semantic,
            transitions,
            state_labels: Vec::new(),
            state_label_bits: -1,
            state_label_accumulated_bits: Vec::new(),
        })
    }

    /// Attach the state-label metadata.
    pub fn with_labels(
        mut self,
        state_labels: Vec<String>,
        state_label_bits: i64,
        state_label_accumulated_bits: Vec<u64>,
    ) -> Self {
        self.state_labels = state_labels;
        self.state_label_bits = state_label_bits;
        self.state_label_accumulated_bits = state_label_accumulated_bits;
        self
    }

    /// Load a machine from a controller file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MachineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let machine: Self = text.parse()?;
        info!(
            "loaded {} machine from {} ({} states, {} transitions)",
            machine.semantic,
            path.display(),
            machine.states(),
            machine.num_transitions()
        );
        Ok(machine)
    }

    pub fn semantic(&self) -> Semantic {
        self.semantic
    }

    /// Number of machine states.
    pub fn states(&self) -> usize {
        self.transitions.len()
    }

    /// Total number of transitions across all states.
    pub fn num_transitions(&self) -> usize {
        self.transitions.iter().map(Vec::len).sum()
    }

    /// Ordered transitions leaving `state`; empty for unknown states.
    pub fn state_transitions(&self, state: usize) -> &[MachineTransition] {
        self.transitions
            .get(state)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn state_labels(&self) -> &[String] {
        &self.state_labels
    }

    pub fn state_label_bits(&self) -> i64 {
        self.state_label_bits
    }

    pub fn state_label_accumulated_bits(&self) -> &[u64] {
        &self.state_label_accumulated_bits
    }
}

fn list_items(value: &str) -> impl Iterator<Item = &str> {
    value
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

fn parse_scalar<T: FromStr>(line: usize, key: &str, value: &str) -> Result<T, MachineError> {
    let cleaned = value.trim().trim_start_matches('{').trim_end_matches('}').trim();
    cleaned.parse::<T>().map_err(|_| MachineError::InvalidValue {
        line,
        key: key.to_string(),
        reason: format!("'{}' is not a valid number", cleaned),
    })
}

fn parse_list<T: FromStr>(line: usize, key: &str, value: &str) -> Result<Vec<T>, MachineError> {
    list_items(value)
        .map(|item| {
            item.parse::<T>().map_err(|_| MachineError::InvalidValue {
                line,
                key: key.to_string(),
                reason: format!("'{}' is not a valid number", item),
            })
        })
        .collect()
}

// `trans_<s>_<t>` -> (s, t)
fn parse_transition_key(key: &str) -> Option<(usize, usize)> {
    let (state, transition) = key.strip_prefix("trans_")?.split_once('_')?;
    Some((state.parse().ok()?, transition.parse().ok()?))
}

impl FromStr for Machine {
    type Err = MachineError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut semantic = None;
        let mut states: Option<usize> = None;
        let mut counts: Option<Vec<usize>> = None;
        let mut state_labels = Vec::new();
        let mut state_label_bits = -1;
        let mut accumulated_bits = Vec::new();
        let mut parsed = Vec::new();

        for (idx, raw_line) in text.lines().enumerate() {
            let line = idx + 1;
            if raw_line.trim().is_empty() {
                continue;
            }
            let (key, value) =
                raw_line
                    .split_once(':')
                    .ok_or_else(|| MachineError::MalformedLine {
                        line,
                        text: raw_line.to_string(),
                    })?;
            let key = key.trim();

            match key {
                "semantic" => {
                    semantic = Some(
                        value
                            .trim()
                            .trim_start_matches('{')
                            .trim_end_matches('}')
                            .parse::<Semantic>()?,
                    )
                }
                "states" => states = Some(parse_scalar(line, key, value)?),
                "state_transitions" => counts = Some(parse_list(line, key, value)?),
                "state_labels" => {
                    state_labels = list_items(value).map(str::to_string).collect();
                }
                "state_label_bits" => state_label_bits = parse_scalar(line, key, value)?,
                "state_label_accumulated_bits" => {
                    accumulated_bits = parse_list(line, key, value)?;
                }
                other => {
                    let (state, transition) =
                        parse_transition_key(other).ok_or_else(|| MachineError::UnknownKey {
                            line,
                            key: other.to_string(),
                        })?;
                    let trans = MachineTransition::parse(value).map_err(|reason| {
                        MachineError::InvalidValue {
                            line,
                            key: other.to_string(),
                            reason,
                        }
                    })?;
                    parsed.push((state, transition, trans));
                }
            }
        }

        let semantic = semantic.ok_or(MachineError::MissingKey("semantic"))?;
        let states = states.ok_or(MachineError::MissingKey("states"))?;
        let counts = counts.ok_or(MachineError::MissingKey("state_transitions"))?;
        if counts.len() != states {
            return Err(MachineError::StateCountMismatch {
                expected: states,
                found: counts.len(),
            });
        }

        // Declared counts are never used as allocation sizes; rows grow
        // only from transitions actually written.
        let mut written: HashMap<(usize, usize), MachineTransition> = HashMap::new();
        for (state, transition, trans) in parsed {
            let declared = *counts
                .get(state)
                .ok_or(MachineError::StateOutOfRange { state, states })?;
            if transition >= declared {
                return Err(MachineError::TransitionOutOfRange {
                    state,
                    transition,
                    declared,
                });
            }
            if written.insert((state, transition), trans).is_some() {
                return Err(MachineError::DuplicateTransition { state, transition });
            }
        }

        let mut transitions = Vec::new();
        for (state, &count) in counts.iter().enumerate() {
            let mut row = Vec::new();
            for transition in 0..count {
                let trans = written
                    .remove(&(state, transition))
                    .ok_or(MachineError::MissingTransition { state, transition })?;
                row.push(trans);
            }
            transitions.push(row);
        }

        Ok(Machine::new(semantic, transitions)?.with_labels(
            state_labels,
            state_label_bits,
            accumulated_bits,
        ))
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    write!(f, "{{")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "}}")
}

/// Writes the controller-file format accepted by [`Machine::from_str`].
impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "semantic: {}", self.semantic)?;
        writeln!(f, "states: {}", self.states())?;
        write!(f, "state_transitions: ")?;
        let counts: Vec<usize> = self.transitions.iter().map(Vec::len).collect();
        write_list(f, &counts)?;
        writeln!(f)?;
        for (state, row) in self.transitions.iter().enumerate() {
            for (transition, trans) in row.iter().enumerate() {
                writeln!(f, "trans_{}_{}: {}", state, transition, trans)?;
            }
        }
        write!(f, "state_labels: ")?;
        write_list(f, &self.state_labels)?;
        writeln!(f)?;
        write!(f, "state_label_accumulated_bits: ")?;
        write_list(f, &self.state_label_accumulated_bits)?;
        writeln!(f)?;
        writeln!(f, "state_label_bits: {}", self.state_label_bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_STATES: &str = "\
semantic: mealy
states: 2
state_transitions: {2,1,}
trans_0_0: {1;4;[40]}
trans_0_1: {0;5;[41,42]}
trans_1_0: {0;6;[43]}
state_labels: {a,b,}
state_label_accumulated_bits: {1,2,}
state_label_bits: 2
";

    #[test]
    fn parses_complete_file() {
        let machine: Machine = TWO_STATES.parse().unwrap();
        assert_eq!(machine.semantic(), Semantic::Mealy);
        assert_eq!(machine.states(), 2);
        assert_eq!(machine.num_transitions(), 3);
        assert_eq!(
            machine.state_transitions(0)[1],
            MachineTransition::new(0, 5, vec![41, 42])
        );
        assert_eq!(machine.state_labels(), &["a".to_string(), "b".to_string()]);
        assert_eq!(machine.state_label_accumulated_bits(), &[1, 2]);
        assert_eq!(machine.state_label_bits(), 2);
    }

    #[test]
    fn key_order_does_not_matter() {
        let text = "\
trans_0_0: {0;1;[2]}
state_transitions: {1}
states: 1
semantic: moore
";
        let machine: Machine = text.parse().unwrap();
        assert_eq!(machine.semantic(), Semantic::Moore);
        assert_eq!(machine.state_transitions(0)[0].input, 1);
        assert!(machine.state_labels().is_empty());
        assert_eq!(machine.state_label_bits(), -1);
    }

    #[test]
    fn display_writes_a_loadable_file() {
        let machine: Machine = TWO_STATES.parse().unwrap();
        let written = machine.to_string();
        assert!(written.contains("trans_0_1: {0;5;[41,42]}"));
        let reloaded: Machine = written.parse().unwrap();
        assert_eq!(reloaded, machine);
    }

    #[test]
    fn missing_transition_fails_the_load() {
        let text = "semantic: mealy\nstates: 1\nstate_transitions: {2}\ntrans_0_0: {0;1;[2]}\n";
        assert!(matches!(
            text.parse::<Machine>(),
            Err(MachineError::MissingTransition {
                state: 0,
                transition: 1
            })
        ));
    }

    #[test]
    fn duplicate_transition_fails_the_load() {
        let text = "semantic: mealy\nstates: 1\nstate_transitions: {1}\n\
                    trans_0_0: {0;1;[2]}\ntrans_0_0: {0;3;[2]}\n";
        assert!(matches!(
            text.parse::<Machine>(),
            Err(MachineError::DuplicateTransition { .. })
        ));
    }

    #[test]
    fn undeclared_transition_index_fails_the_load() {
        let text = "semantic: mealy\nstates: 1\nstate_transitions: {1}\n\
                    trans_0_0: {0;1;[2]}\ntrans_0_1: {0;3;[2]}\n";
        assert!(matches!(
            text.parse::<Machine>(),
            Err(MachineError::TransitionOutOfRange {
                state: 0,
                transition: 1,
                declared: 1
            })
        ));
    }

    #[test]
    fn dangling_next_state_fails_the_load() {
        let text = "semantic: mealy\nstates: 1\nstate_transitions: {1}\ntrans_0_0: {3;1;[2]}\n";
        assert!(matches!(
            text.parse::<Machine>(),
            Err(MachineError::StateOutOfRange { state: 3, states: 1 })
        ));
    }

    #[test]
    fn unknown_semantic_and_keys_are_rejected() {
        assert!(matches!(
            "semantic: turing\n".parse::<Machine>(),
            Err(MachineError::UnknownSemantic(_))
        ));
        assert!(matches!(
            "semantic: mealy\ncolour: blue\n".parse::<Machine>(),
            Err(MachineError::UnknownKey { line: 2, .. })
        ));
        assert!(matches!(
            "semantic mealy\n".parse::<Machine>(),
            Err(MachineError::MalformedLine { line: 1, .. })
        ));
    }

    #[test]
    fn missing_header_keys_are_reported() {
        assert!(matches!(
            "states: 0\nstate_transitions: {}\n".parse::<Machine>(),
            Err(MachineError::MissingKey("semantic"))
        ));
        assert!(matches!(
            "semantic: mealy\nstates: 2\nstate_transitions: {1}\n".parse::<Machine>(),
            Err(MachineError::StateCountMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn bad_numbers_carry_the_line() {
        let text = "semantic: mealy\nstates: two\n";
        match text.parse::<Machine>() {
            Err(MachineError::InvalidValue { line, key, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(key, "states");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn oversized_transition_count_fails_without_allocating() {
        let text = "semantic: mealy\nstates: 1\nstate_transitions: {100000000000000000}\n";
        assert!(matches!(
            text.parse::<Machine>(),
            Err(MachineError::MissingTransition {
                state: 0,
                transition: 0
            })
        ));

        let text = "semantic: mealy\nstates: 1\nstate_transitions: {100000000000000000}\n\
                    trans_0_0: {0;1;[2]}\n";
        assert!(matches!(
            text.parse::<Machine>(),
            Err(MachineError::MissingTransition {
                state: 0,
                transition: 1
            })
        ));
    }
}
