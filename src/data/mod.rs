/// Data layer: table types, loading, assembly, cleaning, and filtering.
///
/// Pipeline:
/// ```text
///  cohort.csv   volume/diameter/surface.csv   organ_dict.csv
///       │                 │                        │
///       ▼                 ▼                        ▼
///   ┌──────────────────────────────────────────────────┐
///   │ loader    parse files → DataTable / dictionaries │
///   └──────────────────────────────────────────────────┘
///       │
///       ▼
///   ┌──────────┐  rename via organ dict, rescale units,
///   │ assemble  │  left-join by SubjectID → one wide table
///   └──────────┘
///       │
///       ▼
///   ┌──────────┐  sentinel codes and negative shape
///   │  clean    │  measurements → Missing
///   └──────────┘
///       │
///       ▼
///   ┌──────────┐
///   │  filter   │  age/sex predicates → row indices
///   └──────────┘
/// ```
pub mod assemble;
pub mod clean;
pub mod dictionary;
pub mod filter;
pub mod loader;
pub mod model;
