use serde::Serialize;

/// One realization of every entity and group outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trial {
    pub entity_outcomes: Vec<f64>,
    pub group_outcomes: Vec<f64>,
}

/// Outcomes of a run, stored per entity (`[entity][trial]`).
///
/// Only a [`TrialMatrixBuilder`] can add rows, and only whole trials; once
/// built the matrix is read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrialMatrix {
    entity_ids: Vec<String>,
    group_ids: Vec<String>,
    entity_outcomes: Vec<Vec<f64>>,
    group_outcomes: Vec<Vec<f64>>,
    trials: usize,
}

impl TrialMatrix {
    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn is_empty(&self) -> bool {
        self.trials == 0 || (self.entity_ids.is_empty() && self.group_ids.is_empty())
    }

    pub fn entity_ids(&self) -> &[String] {
        &self.entity_ids
    }

    pub fn group_ids(&self) -> &[String] {
        &self.group_ids
    }

    pub fn entity_outcomes(&self, id: &str) -> Option<&[f64]> {
        let index = self.entity_ids.iter().position(|e| e == id)?;
        Some(&self.entity_outcomes[index])
    }

    pub fn group_outcomes(&self, id: &str) -> Option<&[f64]> {
        let index = self.group_ids.iter().position(|g| g == id)?;
        Some(&self.group_outcomes[index])
    }

    pub fn entity_column(&self, index: usize) -> Option<&[f64]> {
        self.entity_outcomes.get(index).map(Vec::as_slice)
    }

    pub fn entity_columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.entity_ids.iter().map(String::as_str).zip(self.entity_outcomes.iter().map(Vec::as_slice))
    }

    pub fn group_columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.group_ids.iter().map(String::as_str).zip(self.group_outcomes.iter().map(Vec::as_slice))
    }

    pub fn trial(&self, t: usize) -> Option<Trial> {
        if t >= self.trials {
            return None;
        }
        Some(Trial {
            entity_outcomes: self.entity_outcomes.iter().map(|col| col[t]).collect(),
            group_outcomes: self.group_outcomes.iter().map(|col| col[t]).collect(),
        })
    }
}

pub struct TrialMatrixBuilder {
    matrix: TrialMatrix,
}

impl TrialMatrixBuilder {
    pub fn new(entity_ids: Vec<String>, group_ids: Vec<String>, capacity: usize) -> Self {
        let entity_outcomes = entity_ids.iter().map(|_| Vec::with_capacity(capacity)).collect();
        let group_outcomes = group_ids.iter().map(|_| Vec::with_capacity(capacity)).collect();
        Self {
            matrix: TrialMatrix {
                entity_ids,
                group_ids,
                entity_outcomes,
                group_outcomes,
                trials: 0,
            },
        }
    }

    pub fn push_trial(&mut self, entity_row: &[f64], group_row: &[f64]) {
        debug_assert_eq!(entity_row.len(), self.matrix.entity_ids.len());
        debug_assert_eq!(group_row.len(), self.matrix.group_ids.len());
        for (col, &value) in self.matrix.entity_outcomes.iter_mut().zip(entity_row) {
            col.push(value);
        }
        for (col, &value) in self.matrix.group_outcomes.iter_mut().zip(group_row) {
            col.push(value);
        }
        self.matrix.trials += 1;
    }

    /// Append another shard's trials after this one's.
    pub fn append(&mut self, other: TrialMatrixBuilder) {
        debug_assert_eq!(self.matrix.entity_ids, other.matrix.entity_ids);
        for (col, mut more) in self.matrix.entity_outcomes.iter_mut().zip(other.matrix.entity_outcomes) {
            col.append(&mut more);
        }
        for (col, mut more) in self.matrix.group_outcomes.iter_mut().zip(other.matrix.group_outcomes) {
            col.append(&mut more);
        }
        self.matrix.trials += other.matrix.trials;
    }

    pub fn trials(&self) -> usize {
        self.matrix.trials
    }

    pub fn build(self) -> TrialMatrix {
        self.matrix
    }
}
