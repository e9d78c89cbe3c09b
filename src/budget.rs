use crate::types::SourceUnit;

/// Characters per estimated token. A rough but serviceable heuristic.
pub const BYTES_PER_TOKEN: usize = 4;

/// Estimated token cost of a single unit: path plus content length.
pub fn unit_cost(unit: &SourceUnit) -> usize {
    (unit.path.len() + unit.content.len()) / BYTES_PER_TOKEN
}

/// Outcome of budget selection.
#[derive(Debug)]
pub struct Selection {
    /// The selected units, in selection order.
    pub units: Vec<SourceUnit>,
    /// Sum of byte sizes over the selected subset.
    pub total_size: u64,
    /// Sum of estimated unit costs over the selected subset.
    pub total_cost: usize,
    /// True iff the selection is smaller than the input set.
    pub truncated: bool,
}

/// Greedily selects a subset of units that fits within `ceiling` tokens.
///
/// Units are ordered by weight descending, then cost ascending, then
/// original position (fully deterministic). The walk keeps a running total
/// and skips any unit that would overflow the ceiling while continuing to
/// scan — a later, smaller unit may still fit. Callers are responsible for
/// treating a ceiling of zero as "selection disabled".
pub fn select_within_budget(units: Vec<SourceUnit>, ceiling: usize) -> Selection {
    let input_len = units.len();

    let mut ranked: Vec<(usize, SourceUnit)> = units.into_iter().enumerate().collect();
    ranked.sort_by(|(ia, a), (ib, b)| {
        b.weight
            .cmp(&a.weight)
            .then_with(|| unit_cost(a).cmp(&unit_cost(b)))
            .then_with(|| ia.cmp(ib))
    });

    let mut selected: Vec<SourceUnit> = Vec::new();
    let mut running = 0usize;
    for (_, unit) in ranked {
        let cost = unit_cost(&unit);
        if running + cost > ceiling {
            continue;
        }
        running += cost;
        selected.push(unit);
    }

    let total_size = selected.iter().map(|u| u.size).sum();
    let total_cost = selected.iter().map(unit_cost).sum();
    let truncated = selected.len() < input_len;

    Selection {
        units: selected,
        total_size,
        total_cost,
        truncated,
    }
}
