//! Machine transitions and their `{next;input;[outputs]}` text form.

use crate::core::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One outgoing edge of a machine state.
///
/// When the controller is in the owning state and observes `input`, it
/// emits `outputs` and moves to `next_state`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineTransition {
    pub next_state: usize,
    pub input: Symbol,
    pub outputs: Vec<Symbol>,
}

impl MachineTransition {
    pub fn new(next_state: usize, input: Symbol, outputs: Vec<Symbol>) -> Self {
        Self {
            next_state,
            input,
            outputs,
        }
    }

    /// Check whether this edge fires on the observed symbol (pure)
    pub fn matches(&self, observed: Symbol) -> bool {
        self.input == observed
    }

    /// Parse `next; input; [o1,o2,...]`, with or without the surrounding
    /// braces. Blank entries in the output list are skipped.
    pub(crate) fn parse(text: &str) -> Result<Self, String> {
        let inner = text.trim().trim_start_matches('{').trim_end_matches('}');
        let fields: Vec<&str> = inner.split(';').map(str::trim).collect();
        if fields.len() != 3 {
            return Err(format!(
                "a transition needs 3 ';'-separated fields, found {}",
                fields.len()
            ));
        }

        let next_state = fields[0]
            .parse::<usize>()
            .map_err(|_| format!("invalid next state '{}'", fields[0]))?;
        let input = fields[1]
            .parse::<Symbol>()
            .map_err(|_| format!("invalid input symbol '{}'", fields[1]))?;

        let list = fields[2];
        if !list.starts_with('[') || !list.ends_with(']') {
            return Err(format!("output list '{}' is not bracketed", list));
        }
        let outputs = list[1..list.len() - 1]
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<Symbol>()
                    .map_err(|_| format!("invalid output symbol '{}'", s))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(next_state, input, outputs))
    }
}

impl fmt::Display for MachineTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{};{};[", self.next_state, self.input)?;
        for (i, out) in self.outputs.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", out)?;
        }
        write!(f, "]}}")
    }
}
