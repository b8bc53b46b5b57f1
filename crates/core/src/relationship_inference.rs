use std::collections::HashMap;

use crate::schema_model::{TableMap, TableSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipDirection {
    Forward,
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipSource {
    Api,
    Inferred,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipInfo {
    pub attribute: String,
    pub target_table: String,
    pub direction: RelationshipDirection,
    pub source: RelationshipSource,
}

#[must_use]
pub fn infer_relationships(
    table_name: &str,
    table: &TableSchema,
    all_tables: &TableMap,
) -> Vec<RelationshipInfo> {
    let mut edges: Vec<RelationshipInfo> = Vec::new();
    let mut seen: HashMap<(RelationshipDirection, String, String), usize> = HashMap::new();

    for attribute in &table.attributes {
        if let Some(relationship) = &attribute.relationship {
            if relationship.table != table_name {
                record_edge(
                    &mut edges,
                    &mut seen,
                    RelationshipInfo {
                        attribute: attribute.name.clone(),
                        target_table: relationship.table.clone(),
                        direction: RelationshipDirection::Forward,
                        source: RelationshipSource::Api,
                    },
                );
            }
            continue;
        }

        let Some(base) = convention_base(&attribute.name) else {
            continue;
        };
        let Some(target) = all_tables
            .keys()
            .find(|candidate| candidate.eq_ignore_ascii_case(base))
        else {
            continue;
        };
        if target.as_str() != table_name {
            record_edge(
                &mut edges,
                &mut seen,
                RelationshipInfo {
                    attribute: attribute.name.clone(),
                    target_table: target.clone(),
                    direction: RelationshipDirection::Forward,
                    source: RelationshipSource::Inferred,
                },
            );
        }
    }

    for (other_name, other_table) in all_tables {
        if other_name.as_str() == table_name {
            continue;
        }
        for attribute in &other_table.attributes {
            if let Some(relationship) = &attribute.relationship {
                if relationship.table == table_name {
                    record_edge(
                        &mut edges,
                        &mut seen,
                        RelationshipInfo {
                            attribute: attribute.name.clone(),
                            target_table: other_name.clone(),
                            direction: RelationshipDirection::Reverse,
                            source: RelationshipSource::Api,
                        },
                    );
                }
                continue;
            }

            let Some(base) = convention_base(&attribute.name) else {
                continue;
            };
            if base.eq_ignore_ascii_case(table_name) {
                record_edge(
                    &mut edges,
                    &mut seen,
                    RelationshipInfo {
                        attribute: attribute.name.clone(),
                        target_table: other_name.clone(),
                        direction: RelationshipDirection::Reverse,
                        source: RelationshipSource::Inferred,
                    },
                );
            }
        }
    }

    edges
}

fn convention_base(name: &str) -> Option<&str> {
    if name.len() > 2 && name.ends_with("Id") {
        Some(&name[..name.len() - 2])
    } else if name.len() > 3 && name.ends_with("_id") {
        Some(&name[..name.len() - 3])
    } else {
        None
    }
}

fn record_edge(
    edges: &mut Vec<RelationshipInfo>,
    seen: &mut HashMap<(RelationshipDirection, String, String), usize>,
    edge: RelationshipInfo,
) {
    let key = (
        edge.direction,
        edge.attribute.clone(),
        edge.target_table.clone(),
    );
    match seen.get(&key) {
        Some(&index) => {
            if edges[index].source == RelationshipSource::Inferred
                && edge.source == RelationshipSource::Api
            {
                edges[index] = edge;
            }
        }
        None => {
            seen.insert(key, edges.len());
            edges.push(edge);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use super::{infer_relationships, RelationshipDirection, RelationshipSource};
    use crate::schema_model::{Attribute, AttributeRelationship, TableMap, TableSchema};

    fn table(name: &str, attributes: Vec<Attribute>) -> TableSchema {
        TableSchema {
            schema: "app".to_string(),
            name: name.to_string(),
            hash_attribute: "id".to_string(),
            audit: false,
            schema_defined: false,
            record_count: 0,
            attributes,
            extra: Map::new(),
        }
    }

    fn linked(name: &str, target: &str) -> Attribute {
        Attribute {
            relationship: Some(AttributeRelationship {
                table: target.to_string(),
            }),
            ..Attribute::new(name)
        }
    }

    fn universe(entries: Vec<TableSchema>) -> TableMap {
        entries
            .into_iter()
            .map(|entry| (entry.name.clone(), entry))
            .collect()
    }

    #[test]
    fn bare_suffixes_leave_no_base_and_never_match() {
        let dog = table("dog", vec![Attribute::new("Id"), Attribute::new("_id")]);
        let all = universe(vec![dog.clone(), table("owner", Vec::new())]);

        assert!(infer_relationships("dog", &dog, &all).is_empty());
    }

    #[test]
    fn camel_suffix_matches_table_case_insensitively() {
        let session = table("session", vec![Attribute::new("userId")]);
        let all = universe(vec![session.clone(), table("User", Vec::new())]);

        let edges = infer_relationships("session", &session, &all);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].attribute, "userId");
        assert_eq!(edges[0].target_table, "User");
        assert_eq!(edges[0].direction, RelationshipDirection::Forward);
        assert_eq!(edges[0].source, RelationshipSource::Inferred);
    }

    #[test]
    fn snake_suffix_matches_table_case_insensitively() {
        let session = table("session", vec![Attribute::new("user_id")]);
        let all = universe(vec![session.clone(), table("user", Vec::new())]);

        let edges = infer_relationships("session", &session, &all);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].target_table, "user");
    }

    #[test]
    fn self_references_are_excluded_from_the_forward_pass() {
        let employee = table(
            "employee",
            vec![
                Attribute::new("employeeId"),
                linked("manager", "employee"),
            ],
        );
        let all = universe(vec![employee.clone()]);

        assert!(infer_relationships("employee", &employee, &all).is_empty());
    }

    #[test]
    fn api_metadata_wins_over_convention_for_the_same_attribute() {
        let dog = table("dog", vec![linked("ownerId", "owner")]);
        let all = universe(vec![dog.clone(), table("owner", Vec::new())]);

        let edges = infer_relationships("dog", &dog, &all);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].source, RelationshipSource::Api);
        assert_eq!(edges[0].target_table, "owner");
    }

    #[test]
    fn api_metadata_may_name_a_table_outside_the_universe() {
        let dog = table("dog", vec![linked("breed", "breed_catalog")]);
        let all = universe(vec![dog.clone()]);

        let edges = infer_relationships("dog", &dog, &all);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].target_table, "breed_catalog");
        assert_eq!(edges[0].source, RelationshipSource::Api);
    }

    #[test]
    fn reverse_edges_mirror_forward_suffix_references() {
        let dog = table("dog", vec![Attribute::new("ownerId")]);
        let owner = table("owner", vec![Attribute::new("id")]);
        let all = universe(vec![dog.clone(), owner.clone()]);

        let forward = infer_relationships("dog", &dog, &all);
        assert_eq!(forward.len(), 1);
        assert_eq!(forward[0].direction, RelationshipDirection::Forward);
        assert_eq!(forward[0].target_table, "owner");

        let reverse = infer_relationships("owner", &owner, &all);
        assert_eq!(reverse.len(), 1);
        assert_eq!(reverse[0].direction, RelationshipDirection::Reverse);
        assert_eq!(reverse[0].attribute, "ownerId");
        assert_eq!(reverse[0].target_table, "dog");
        assert_eq!(reverse[0].source, RelationshipSource::Inferred);
    }

    #[test]
    fn reverse_edges_follow_api_metadata() {
        let dog = table("dog", vec![linked("guardian", "owner")]);
        let owner = table("owner", Vec::new());
        let all = universe(vec![dog, owner.clone()]);

        let edges = infer_relationships("owner", &owner, &all);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].attribute, "guardian");
        assert_eq!(edges[0].target_table, "dog");
        assert_eq!(edges[0].direction, RelationshipDirection::Reverse);
        assert_eq!(edges[0].source, RelationshipSource::Api);
    }

    #[test]
    fn no_attributes_or_lone_table_yield_no_edges() {
        let empty = table("empty", Vec::new());
        let all = universe(vec![empty.clone()]);
        assert!(infer_relationships("empty", &empty, &all).is_empty());

        let loner = table("loner", vec![Attribute::new("friendId")]);
        let all = universe(vec![loner.clone()]);
        assert!(infer_relationships("loner", &loner, &all).is_empty());
    }

    #[test]
    fn reverse_edges_list_referencing_tables_in_order() {
        let cat = table("cat", vec![Attribute::new("ownerId")]);
        let dog = table("dog", vec![Attribute::new("owner_id")]);
        let owner = table("owner", Vec::new());
        let all = universe(vec![cat, dog, owner.clone()]);

        let edges = infer_relationships("owner", &owner, &all);
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].target_table, "cat");
        assert_eq!(edges[0].attribute, "ownerId");
        assert_eq!(edges[1].target_table, "dog");
        assert_eq!(edges[1].attribute, "owner_id");
    }

    #[test]
    fn duplicate_attribute_entries_do_not_double_edges() {
        let dog = table(
            "dog",
            vec![Attribute::new("ownerId"), Attribute::new("ownerId")],
        );
        let all = universe(vec![dog.clone(), table("owner", Vec::new())]);

        let edges = infer_relationships("dog", &dog, &all);
        assert_eq!(edges.len(), 1);
    }
}
