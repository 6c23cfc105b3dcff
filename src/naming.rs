use crate::model::RelationshipType;

/// Last token of a three-token id (`a.b.Name` -> `Name`), otherwise the whole id.
pub fn simple_name(element_id: &str) -> &str {
    let tokens: Vec<&str> = element_id.split('.').collect();
    if tokens.len() == 3 {
        tokens[2]
    } else {
        element_id
    }
}

pub fn lower_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn upper_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Default relationship name: `a.b.Connects` + `server` -> `connectsServer`.
pub fn default_name(relationship_type: &RelationshipType, target_name: &str) -> String {
    let mut name = lower_first(simple_name(&relationship_type.element_id));
    name.push_str(&upper_first(target_name));
    name
}
