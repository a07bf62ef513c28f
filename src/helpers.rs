use heck::{ToKebabCase, ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// A function callable from templates. Receives its arguments as JSON values;
/// when used as a filter the piped value comes first.
pub type Helper = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// Named helpers registered into the template engine before any render.
#[derive(Clone, Default)]
pub struct HelperSet {
    helpers: IndexMap<String, Helper>,
}

impl HelperSet {
    /// An empty set, without the built-in helpers.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in helpers: case conversion, reference and id helpers.
    pub fn builtin() -> Self {
        let mut set = Self::new();
        set.insert_fn("camelcase", |args| with_str(args, |s| s.to_lower_camel_case()));
        set.insert_fn("pascalcase", |args| with_str(args, |s| s.to_pascal_case()));
        set.insert_fn("snakecase", |args| with_str(args, |s| s.to_snake_case()));
        set.insert_fn("kebabcase", |args| with_str(args, |s| s.to_kebab_case()));
        set.insert_fn("screamingsnakecase", |args| {
            with_str(args, |s| s.to_shouty_snake_case())
        });
        set.insert_fn("ref_name", |args| with_str(args, ref_name));
        set.insert_fn("uuid", |args| with_str(args, uuid_for));
        set
    }

    pub fn insert(&mut self, name: impl Into<String>, helper: Helper) {
        self.helpers.insert(name.into(), helper);
    }

    pub fn insert_fn<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.insert(name, Arc::new(f));
    }

    pub fn get(&self, name: &str) -> Option<&Helper> {
        self.helpers.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Helper)> {
        self.helpers.iter().map(|(name, helper)| (name.as_str(), helper))
    }

    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }
}

impl std::fmt::Debug for HelperSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.helpers.keys()).finish()
    }
}

fn with_str(args: &[Value], f: impl Fn(&str) -> String) -> Result<Value, String> {
    match args.first() {
        Some(Value::String(s)) => Ok(Value::String(f(s))),
        Some(other) => Err(format!("expected a string argument, got {}", other)),
        None => Err("missing string argument".to_string()),
    }
}

/// `#/definitions/Pet` becomes `Pet`; plain names pass through.
pub fn ref_name(reference: &str) -> String {
    reference.rsplit('/').next().unwrap_or(reference).to_string()
}

/// Name-based (v5) UUID, stable across runs for the same input.
pub fn uuid_for(name: &str) -> String {
    const SWAGGEN_NS_NAME: &str = "swaggen.codegen";
    let namespace = Uuid::new_v5(&Uuid::NAMESPACE_DNS, SWAGGEN_NS_NAME.as_bytes());
    Uuid::new_v5(&namespace, name.as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(set: &HelperSet, name: &str, args: &[Value]) -> Result<Value, String> {
        let helper = set.get(name).expect("helper registered");
        helper(args)
    }

    #[test]
    fn test_case_helpers() {
        let set = HelperSet::builtin();
        assert_eq!(call(&set, "camelcase", &[json!("pet_store")]).unwrap(), "petStore");
        assert_eq!(call(&set, "pascalcase", &[json!("pet_store")]).unwrap(), "PetStore");
        assert_eq!(call(&set, "snakecase", &[json!("PetStore")]).unwrap(), "pet_store");
        assert_eq!(call(&set, "kebabcase", &[json!("PetStore")]).unwrap(), "pet-store");
        assert_eq!(
            call(&set, "screamingsnakecase", &[json!("PetStore")]).unwrap(),
            "PET_STORE"
        );
    }

    #[test]
    fn test_ref_name() {
        assert_eq!(ref_name("#/definitions/Pet"), "Pet");
        assert_eq!(ref_name("Pet"), "Pet");
    }

    #[test]
    fn test_uuid_is_deterministic() {
        assert_eq!(uuid_for("Pet"), uuid_for("Pet"));
        assert_ne!(uuid_for("Pet"), uuid_for("User"));
    }

    #[test]
    fn test_non_string_argument_is_rejected() {
        let set = HelperSet::builtin();
        assert!(call(&set, "camelcase", &[json!(3)]).is_err());
        assert!(call(&set, "camelcase", &[]).is_err());
    }
}
