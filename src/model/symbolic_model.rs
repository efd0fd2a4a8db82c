//! Precomputed post-state regions from the synthesis tool.
//!
//! Each line of a model dump has the form
//!
//! ```text
//! [x_<i>, u_<j>] => [lb,ub]x[lb,ub] U [lb,ub]x[lb,ub]
//! ```
//!
//! and states that applying control symbol `j` in state symbol `i` keeps
//! the plant inside the written region for one control period.

use crate::core::{parse_union, HyperRect, Symbol};
use crate::model::error::ModelError;
use log::info;
use std::path::Path;

/// Lookup table from `(x_symbol, u_symbol)` to the proven post region.
///
/// # Example
///
/// ```rust
/// use symloop::model::SymbolicModel;
///
/// let dump = "[x_0, u_0] => [0,1]\n[x_1, u_0] => [1,2] U [3,4]\n";
/// let model = SymbolicModel::parse(dump, 2, 1).unwrap();
/// assert_eq!(model.get_region(1, 0).unwrap().ub(), &[2.0]);
/// assert_eq!(model.get_regions(1, 0).unwrap().len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolicModel {
    num_x_symbols: u64,
    num_u_symbols: u64,
    dim: usize,
    regions: Vec<Vec<HyperRect>>,
}

impl SymbolicModel {
    /// Parse a dump that must cover every pair in
    /// `[0, num_x_symbols) x [0, num_u_symbols)` exactly once.
    pub fn parse(text: &str, num_x_symbols: u64, num_u_symbols: u64) -> Result<Self, ModelError> {
        let too_large = || ModelError::TooLarge {
            num_x: num_x_symbols,
            num_u: num_u_symbols,
        };
        let total = num_x_symbols
            .checked_mul(num_u_symbols)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(too_large)?;

        let mut slots: Vec<Option<Vec<HyperRect>>> = vec![None; total];
        let mut dim: Option<usize> = None;

        for (idx, raw_line) in text.lines().enumerate() {
            let line = idx + 1;
            if raw_line.trim().is_empty() {
                continue;
            }
            let (x_symbol, u_symbol, region_text) = split_entry(raw_line)
                .map_err(|reason| ModelError::ModelDumpInconsistent { line, reason })?;
            if x_symbol >= num_x_symbols || u_symbol >= num_u_symbols {
                return Err(ModelError::ModelDumpInconsistent {
                    line,
                    reason: format!(
                        "(x_{}, u_{}) is outside {} x {} symbols",
                        x_symbol, u_symbol, num_x_symbols, num_u_symbols
                    ),
                });
            }

            let boxes = parse_union(region_text, dim)
                .map_err(|source| ModelError::InvalidRegion { line, source })?;
            dim = boxes.first().map(HyperRect::dim);

            let slot = &mut slots[(u_symbol + x_symbol * num_u_symbols) as usize];
            if slot.is_some() {
                return Err(ModelError::DuplicateEntry {
                    line,
                    x_symbol,
                    u_symbol,
                });
            }
            *slot = Some(boxes);
        }

        let regions = slots
            .into_iter()
            .enumerate()
            .map(|(flat, slot)| {
                slot.ok_or(ModelError::MissingEntry {
                    x_symbol: flat as u64 / num_u_symbols,
                    u_symbol: flat as u64 % num_u_symbols,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            num_x_symbols,
            num_u_symbols,
            dim: dim.unwrap_or(0),
            regions,
        })
    }

    /// Load and validate a model-dump file.
    pub fn from_file(
        path: impl AsRef<Path>,
        num_x_symbols: u64,
        num_u_symbols: u64,
    ) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let model = Self::parse(&text, num_x_symbols, num_u_symbols)?;
        info!(
            "loaded symbolic model from {} ({} x {} entries)",
            path.display(),
            num_x_symbols,
            num_u_symbols
        );
        Ok(model)
    }

    pub fn num_x_symbols(&self) -> u64 {
        self.num_x_symbols
    }

    pub fn num_u_symbols(&self) -> u64 {
        self.num_u_symbols
    }

    /// Dimension shared by every region (0 for an empty model).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Fail unless the regions live in a `expected`-dimensional space.
    pub fn check_dim(&self, expected: usize) -> Result<(), ModelError> {
        if self.dim != expected {
            return Err(ModelError::DimensionMismatch {
                expected,
                found: self.dim,
            });
        }
        Ok(())
    }

    /// Every box written for the pair, in file order.
    pub fn get_regions(&self, x_symbol: Symbol, u_symbol: Symbol) -> Result<&[HyperRect], ModelError> {
        if x_symbol >= self.num_x_symbols || u_symbol >= self.num_u_symbols {
            return Err(ModelError::SymbolOutOfRange { x_symbol, u_symbol });
        }
        Ok(&self.regions[(u_symbol + x_symbol * self.num_u_symbols) as usize])
    }

    /// The first box written for the pair.
    pub fn get_region(&self, x_symbol: Symbol, u_symbol: Symbol) -> Result<&HyperRect, ModelError> {
        self.get_regions(x_symbol, u_symbol)?
            .first()
            .ok_or(ModelError::MissingEntry { x_symbol, u_symbol })
    }
}

// "[x_3, u_1] => ..." -> (3, 1, "...")
fn split_entry(line: &str) -> Result<(Symbol, Symbol, &str), String> {
    let (pair, region) = line
        .split_once("=>")
        .ok_or_else(|| format!("expected '[x_i, u_j] => region', found '{}'", line.trim()))?;
    let pair = pair.trim();
    let inner = pair
        .strip_prefix('[')
        .and_then(|p| p.strip_suffix(']'))
        .ok_or_else(|| format!("symbol pair '{}' is not bracketed", pair))?;
    let (x, u) = inner
        .split_once(',')
        .ok_or_else(|| format!("symbol pair '{}' needs two entries", pair))?;
    let x_symbol = parse_tagged(x, "x_")?;
    let u_symbol = parse_tagged(u, "u_")?;
    Ok((x_symbol, u_symbol, region))
}

fn parse_tagged(text: &str, prefix: &str) -> Result<Symbol, String> {
    let text = text.trim();
    text.strip_prefix(prefix)
        .and_then(|n| n.parse::<Symbol>().ok())
        .ok_or_else(|| format!("expected '{}<n>', found '{}'", prefix, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "\
[x_0, u_0] => [0,1]x[0,1]
[x_0, u_1] => [1,2]x[0,1]

[x_1, u_0] => [0,1]x[1,2] U [5,6]x[5,6]
[x_1, u_1] => [1,2]x[1,2]
";

    #[test]
    fn parses_complete_dump() {
        let model = SymbolicModel::parse(DUMP, 2, 2).unwrap();
        assert_eq!(model.num_x_symbols(), 2);
        assert_eq!(model.num_u_symbols(), 2);
        assert_eq!(model.get_region(0, 1).unwrap().lb(), &[1.0, 0.0]);
        assert_eq!(model.get_region(1, 0).unwrap().ub(), &[1.0, 2.0]);
        assert_eq!(model.get_regions(1, 0).unwrap()[1].lb(), &[5.0, 5.0]);
    }

    #[test]
    fn missing_pair_fails_the_load() {
        let err = SymbolicModel::parse(DUMP, 3, 2).unwrap_err();
        assert!(matches!(
            err,
            ModelError::MissingEntry {
                x_symbol: 2,
                u_symbol: 0
            }
        ));
    }

    #[test]
    fn duplicate_pair_fails_the_load() {
        let text = format!("{}[x_1, u_1] => [0,1]x[0,1]\n", DUMP);
        assert!(matches!(
            SymbolicModel::parse(&text, 2, 2),
            Err(ModelError::DuplicateEntry { line: 6, .. })
        ));
    }

    #[test]
    fn out_of_range_pair_fails_the_load() {
        assert!(matches!(
            SymbolicModel::parse(DUMP, 2, 1),
            Err(ModelError::ModelDumpInconsistent { line: 2, .. })
        ));
    }

    #[test]
    fn malformed_lines_fail_the_load() {
        for text in [
            "x_0, u_0 => [0,1]",
            "[x_0; u_0] => [0,1]",
            "[y_0, u_0] => [0,1]",
            "[x_0, u_0] [0,1]",
        ] {
            assert!(
                matches!(
                    SymbolicModel::parse(text, 1, 1),
                    Err(ModelError::ModelDumpInconsistent { line: 1, .. })
                ),
                "accepted: {}",
                text
            );
        }
    }

    #[test]
    fn region_dimension_must_agree() {
        let text = "[x_0, u_0] => [0,1]x[0,1]\n[x_1, u_0] => [0,1]\n";
        assert!(matches!(
            SymbolicModel::parse(text, 2, 1),
            Err(ModelError::InvalidRegion { line: 2, .. })
        ));
    }

    #[test]
    fn model_records_region_dimension() {
        let model = SymbolicModel::parse(DUMP, 2, 2).unwrap();
        assert_eq!(model.dim(), 2);
        assert!(model.check_dim(2).is_ok());
        assert!(matches!(
            model.check_dim(3),
            Err(ModelError::DimensionMismatch {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn query_outside_model_is_an_error() {
        let model = SymbolicModel::parse(DUMP, 2, 2).unwrap();
        assert!(matches!(
            model.get_region(2, 0),
            Err(ModelError::SymbolOutOfRange { .. })
        ));
    }
}
