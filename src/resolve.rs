use std::collections::HashSet;

use crate::model::{Entity, EntityKind, Record};

/// Optional narrowing of the resolved entity list, used for staged
/// rollouts. Not a correctness requirement.
#[derive(Debug, Clone, Copy, Default)]
pub struct Selection {
    /// Keep only the first N distinct entities in first-seen order.
    pub limit: Option<usize>,
    /// Keep only the contiguous `[start, end)` slice of distinct entities.
    pub range: Option<(usize, usize)>,
}

/// Resolves the distinct entities of the given kind from the record set.
///
/// Entities are keyed by email, kept in first-seen order with the first
/// occurrence's display name; duplicates and entities without a display
/// name are skipped.
pub fn resolve(records: &[Record], kind: EntityKind, selection: Selection) -> Vec<Entity> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut entities: Vec<Entity> = Vec::new();

    for record in records {
        let (email, name) = match kind {
            EntityKind::Representative => (&record.rep_email, &record.rep_name),
            EntityKind::Manager => (&record.manager_email, &record.manager_name),
        };
        if name.is_empty() || !seen.insert(email) {
            continue;
        }
        entities.push(Entity {
            kind,
            email: email.clone(),
            name: name.clone(),
        });
    }

    if let Some((start, end)) = selection.range {
        let end = end.min(entities.len());
        let start = start.min(end);
        entities = entities[start..end].to_vec();
    }
    if let Some(limit) = selection.limit {
        entities.truncate(limit);
    }

    entities
}
