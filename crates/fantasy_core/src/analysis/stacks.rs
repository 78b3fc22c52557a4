use crate::engine::TrialMatrix;
use crate::models::Roster;

/// Per-trial sum of every member outcome of each group (the "stack total").
///
/// Groups with no members in the matrix are skipped.
pub fn group_stack_totals(matrix: &TrialMatrix, roster: &Roster) -> Vec<(String, Vec<f64>)> {
    roster
        .groups()
        .iter()
        .filter_map(|group| {
            let columns: Vec<&[f64]> = group
                .members
                .iter()
                .filter_map(|&i| matrix.entity_outcomes(&roster.entities()[i].id))
                .collect();
            if columns.is_empty() {
                return None;
            }
            let totals = (0..matrix.trials())
                .map(|t| columns.iter().map(|col| col[t]).sum())
                .collect();
            Some((group.id.clone(), totals))
        })
        .collect()
}
