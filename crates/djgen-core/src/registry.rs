use indexmap::IndexMap;
use serde::Deserialize;

use crate::types::GenError;

/// One registry entry: the fully qualified Django field type and its default
/// constructor arguments, in declared order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeEntry {
    pub name: String,
    #[serde(default)]
    pub default_args: IndexMap<String, String>,
}

impl TypeEntry {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            default_args: IndexMap::new(),
        }
    }

    pub fn with_arg(mut self, key: &str, value: &str) -> Self {
        self.default_args.insert(key.to_string(), value.to_string());
        self
    }
}

/// Mapping from short field-type keys (`char`, `text`, `fk`) to Django field
/// types. Loaded once at process start; read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    entries: IndexMap<String, TypeEntry>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in field-type table.
    pub fn builtin() -> Self {
        let mut r = Self::new();
        r.insert("char", TypeEntry::new("models.CharField").with_arg("max_length", "255"));
        r.insert("text", TypeEntry::new("models.TextField"));
        r.insert("int", TypeEntry::new("models.IntegerField"));
        r.insert("positive_int", TypeEntry::new("models.PositiveIntegerField"));
        r.insert("bool", TypeEntry::new("models.BooleanField").with_arg("default", "False"));
        r.insert("date", TypeEntry::new("models.DateField"));
        r.insert("datetime", TypeEntry::new("models.DateTimeField"));
        r.insert("time", TypeEntry::new("models.TimeField"));
        r.insert(
            "decimal",
            TypeEntry::new("models.DecimalField")
                .with_arg("max_digits", "10")
                .with_arg("decimal_places", "2"),
        );
        r.insert("float", TypeEntry::new("models.FloatField"));
        r.insert("email", TypeEntry::new("models.EmailField"));
        r.insert("url", TypeEntry::new("models.URLField"));
        r.insert("slug", TypeEntry::new("models.SlugField"));
        r.insert("file", TypeEntry::new("models.FileField").with_arg("upload_to", "\"files\""));
        r.insert("image", TypeEntry::new("models.ImageField").with_arg("upload_to", "\"images\""));
        r.insert("fk", TypeEntry::new("models.ForeignKey"));
        r.insert("m2m", TypeEntry::new("models.ManyToManyField"));
        r.insert("o2o", TypeEntry::new("models.OneToOneField"));
        r
    }

    /// Extend/override the table from a JSON document of the shape
    /// `{"char": {"name": "models.CharField", "defaultArgs": {"max_length": "255"}}}`.
    pub fn merge_json(&mut self, json: &str) -> Result<(), GenError> {
        let overrides: IndexMap<String, TypeEntry> = serde_json::from_str(json)?;
        for (key, entry) in overrides {
            self.entries.insert(key, entry);
        }
        Ok(())
    }

    pub fn insert(&mut self, key: &str, entry: TypeEntry) {
        self.entries.insert(key.to_string(), entry);
    }

    pub fn get(&self, key: &str) -> Option<&TypeEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}
