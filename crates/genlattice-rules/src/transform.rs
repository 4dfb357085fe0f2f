//! Applying a generalization state to a record set.

use std::collections::HashMap;

use genlattice_core::{Error, Record, Result, Value};
use tracing::debug;

use crate::rule::RuleSet;
use crate::state::GenState;

/// Return a copy of `records` with every column in `state` generalized to its level.
///
/// Columns not named in `state` and the record order are preserved; `records` is
/// not mutated. Each distinct value is generalized once per column.
pub fn apply_gen(records: &[Record], state: &GenState, rules: &RuleSet) -> Result<Vec<Record>> {
    let mut generalized = records.to_vec();

    for (column, level) in state.iter() {
        if level == 0 {
            continue;
        }
        let rule = rules
            .get(&column)
            .ok_or_else(|| Error::Config(format!("no generalization rule for column {}", column)))?;

        let mut memo: HashMap<Value, Value> = HashMap::new();
        let mut hits = 0usize;
        for (row, record) in generalized.iter_mut().enumerate() {
            let cell = record.get_mut(column).ok_or_else(|| {
                Error::Config(format!("column {} out of range in record {}", column, row))
            })?;
            let value = match memo.get(cell) {
                Some(v) => {
                    hits += 1;
                    v.clone()
                }
                None => {
                    let v = rule.apply(cell, level)?;
                    memo.insert(cell.clone(), v.clone());
                    v
                }
            };
            *cell = value;
        }
        debug!(
            "Generalized column {} ({}) to level {}: {} distinct values, {} cache hits",
            column,
            rule.name(),
            level,
            memo.len(),
            hits
        );
    }

    Ok(generalized)
}
