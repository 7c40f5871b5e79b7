use std::collections::BTreeMap;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Organ dictionary: name ↔ id, both directions used
// ---------------------------------------------------------------------------

/// Bidirectional organ name ↔ ID mapping.
/// Both maps are built up-front; lookups in either direction are O(log n).
#[derive(Debug, Clone, Default)]
pub struct OrganDictionary {
    name_to_id: BTreeMap<String, u32>,
    id_to_name: BTreeMap<u32, String>,
}

impl OrganDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, id: u32) {
        self.name_to_id.insert(name.to_string(), id);
        self.id_to_name.insert(id, name.to_string());
    }

    pub fn id_for(&self, name: &str) -> Option<u32> {
        self.name_to_id.get(name).copied()
    }

    pub fn name_for(&self, id: u32) -> Option<&str> {
        self.id_to_name.get(&id).map(String::as_str)
    }

    /// Organ names in sorted order (selector population).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.name_to_id.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.name_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_to_id.is_empty()
    }
}

impl FromIterator<(String, u32)> for OrganDictionary {
    fn from_iter<T: IntoIterator<Item = (String, u32)>>(iter: T) -> Self {
        let mut dict = OrganDictionary::new();
        for (name, id) in iter {
            dict.insert(&name, id);
        }
        dict
    }
}

// ---------------------------------------------------------------------------
// Field dictionary: survey field id → metadata, with reverse name index
// ---------------------------------------------------------------------------

/// Metadata attached to one survey field identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldMeta {
    pub field_name_eng: String,
}

/// Survey-field metadata keyed by opaque field identifier.
/// The reverse English-name → ID index is built once at construction
/// instead of scanning per query.
#[derive(Debug, Clone, Default)]
pub struct FieldDictionary {
    fields: BTreeMap<String, FieldMeta>,
    by_english_name: BTreeMap<String, String>,
}

impl FieldDictionary {
    pub fn new(fields: BTreeMap<String, FieldMeta>) -> Self {
        let by_english_name = fields
            .iter()
            .map(|(id, meta)| (meta.field_name_eng.clone(), id.clone()))
            .collect();
        FieldDictionary {
            fields,
            by_english_name,
        }
    }

    /// English display name for a field ID.
    pub fn english_name(&self, field_id: &str) -> Option<&str> {
        self.fields.get(field_id).map(|m| m.field_name_eng.as_str())
    }

    /// Field ID for an English display name.
    pub fn field_id(&self, english_name: &str) -> Option<&str> {
        self.by_english_name.get(english_name).map(String::as_str)
    }

    /// Display label for a column: the English field name when the column is
    /// a known field ID, otherwise the column name itself (shape columns,
    /// unknown fields).
    pub fn display_name<'a>(&'a self, column: &'a str) -> &'a str {
        self.english_name(column).unwrap_or(column)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn organ_dictionary_is_bidirectional() {
        let dict: OrganDictionary =
            [("liver".to_string(), 1), ("spleen".to_string(), 5)].into_iter().collect();
        assert_eq!(dict.id_for("liver"), Some(1));
        assert_eq!(dict.name_for(5), Some("spleen"));
        assert_eq!(dict.id_for("heart"), None);
        assert_eq!(dict.name_for(2), None);
        assert_eq!(dict.names().collect::<Vec<_>>(), vec!["liver", "spleen"]);
    }

    #[test]
    fn field_dictionary_reverse_index() {
        let mut fields = BTreeMap::new();
        fields.insert(
            "f_4711".to_string(),
            FieldMeta {
                field_name_eng: "Age at examination".to_string(),
            },
        );
        let dict = FieldDictionary::new(fields);
        assert_eq!(dict.english_name("f_4711"), Some("Age at examination"));
        assert_eq!(dict.field_id("Age at examination"), Some("f_4711"));
        assert_eq!(dict.field_id("Weight"), None);
        assert_eq!(dict.display_name("Volume: liver"), "Volume: liver");
        assert_eq!(dict.display_name("f_4711"), "Age at examination");
    }
}
