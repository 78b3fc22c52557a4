use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::entity::{Entity, EntityRecord};
use crate::config::SimConfig;
use crate::error::{Result, SimError};

/// Group (team) input row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupRecord {
    pub id: String,
    /// Implied team total; groups without one carry no group-level outcome
    #[serde(default)]
    pub implied_total: Option<f64>,
}

impl GroupRecord {
    pub fn new(id: impl Into<String>, implied_total: Option<f64>) -> Self {
        Self { id: id.into(), implied_total }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub id: String,
    pub implied_total: Option<f64>,
    /// Indices into `Roster::entities`, in input order
    pub members: Vec<usize>,
    pub driver: Option<usize>,
}

impl Group {
    pub fn teammates(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().copied().filter(move |&i| Some(i) != self.driver)
    }
}

/// Entities grouped by team, validated and ready for simulation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Roster {
    entities: Vec<Entity>,
    groups: Vec<Group>,
}

impl Roster {
    /// Build from loader records. Groups keep the order they are first seen in,
    /// explicit `groups` first, then groups introduced by entity rows.
    pub fn build(
        groups: Vec<GroupRecord>,
        records: Vec<EntityRecord>,
        config: &SimConfig,
    ) -> Result<Self> {
        let mut roster = Roster::default();
        let mut group_index: HashMap<String, usize> = HashMap::new();

        for group in groups {
            if let Some(total) = group.implied_total {
                if !(total > 0.0 && total.is_finite()) {
                    return Err(SimError::invalid(format!(
                        "implied_total for group '{}' must be > 0, got {}",
                        group.id, total
                    )));
                }
            }
            if group_index.contains_key(&group.id) {
                return Err(SimError::invalid(format!("duplicate group id '{}'", group.id)));
            }
            group_index.insert(group.id.clone(), roster.groups.len());
            roster.groups.push(Group {
                id: group.id,
                implied_total: group.implied_total,
                members: Vec::new(),
                driver: None,
            });
        }

        let mut seen_ids: HashSet<String> = HashSet::new();
        for record in records {
            if !seen_ids.insert(record.id.clone()) {
                return Err(SimError::invalid(format!("duplicate entity id '{}'", record.id)));
            }

            let entity = Entity::from_record(record, config)?;
            let gi = match group_index.get(&entity.group_id) {
                Some(&gi) => gi,
                None => {
                    let gi = roster.groups.len();
                    group_index.insert(entity.group_id.clone(), gi);
                    roster.groups.push(Group {
                        id: entity.group_id.clone(),
                        implied_total: None,
                        members: Vec::new(),
                        driver: None,
                    });
                    gi
                }
            };

            let index = roster.entities.len();
            let group = &mut roster.groups[gi];
            if entity.is_driver {
                if let Some(existing) = group.driver {
                    return Err(SimError::invalid(format!(
                        "group '{}' has more than one driver ('{}' and '{}')",
                        group.id, roster.entities[existing].id, entity.id
                    )));
                }
                group.driver = Some(index);
            }
            group.members.push(index);
            roster.entities.push(entity);
        }

        Ok(roster)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.groups.iter().all(|g| g.implied_total.is_none())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team_a() -> Vec<EntityRecord> {
        vec![
            EntityRecord::new("QB_A", "A", 20.0).with_position("QB"),
            EntityRecord::new("WR1_A", "A", 18.0).with_position("WR1"),
            EntityRecord::new("DST_A", "A", 8.0).with_position("DST"),
        ]
    }

    #[test]
    fn test_build_groups_and_driver() {
        let roster = Roster::build(
            vec![GroupRecord::new("A", Some(24.5))],
            team_a(),
            &SimConfig::default(),
        )
        .unwrap();

        assert_eq!(roster.len(), 3);
        let group = roster.group("A").unwrap();
        assert_eq!(group.members, vec![0, 1, 2]);
        assert_eq!(group.driver, Some(0));
        assert_eq!(group.teammates().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_group_created_from_entity_rows() {
        let mut records = team_a();
        records.push(EntityRecord::new("RB_B", "B", 12.0).with_position("RB"));
        let roster = Roster::build(vec![], records, &SimConfig::default()).unwrap();
        assert_eq!(roster.groups().len(), 2);
        assert_eq!(roster.group("B").unwrap().driver, None);
        assert_eq!(roster.group("B").unwrap().implied_total, None);
    }

    #[test]
    fn test_two_drivers_rejected() {
        let mut records = team_a();
        records.push(EntityRecord::new("QB2_A", "A", 10.0).with_position("QB"));
        let err = Roster::build(vec![], records, &SimConfig::default()).unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter(_)));
    }

    #[test]
    fn test_duplicate_entity_rejected() {
        let mut records = team_a();
        records.push(EntityRecord::new("WR1_A", "A", 10.0));
        assert!(Roster::build(vec![], records, &SimConfig::default()).is_err());
    }

    #[test]
    fn test_non_positive_implied_total_rejected() {
        let err = Roster::build(vec![GroupRecord::new("A", Some(0.0))], vec![], &SimConfig::default())
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter(_)));
    }

    #[test]
    fn test_empty_roster() {
        let roster = Roster::build(vec![], vec![], &SimConfig::default()).unwrap();
        assert!(roster.is_empty());
    }
}
