use log::debug;
use minijinja::value::{Rest, Value};
use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior};

use crate::context::RenderContext;
use crate::helpers::{Helper, HelperSet};

/// A compiled template: renders one context to text.
pub type RenderFn = Box<dyn Fn(&RenderContext<'_>) -> Result<String, String>>;

/// Compiles template source into render functions.
pub trait TemplateEngine {
    /// Makes `helper` callable from templates compiled afterwards.
    fn register_helper(&mut self, name: &str, helper: Helper);

    /// Parses `source` once. Syntax errors are reported here, not on render.
    fn compile(&self, name: &str, source: String) -> Result<RenderFn, String>;
}

/// TemplateEngine backed by a minijinja environment with strict undefined
/// handling.
///
/// Output is never escaped, whatever the template's file name.
#[derive(Clone)]
pub struct JinjaEngine {
    env: Environment<'static>,
}

impl JinjaEngine {
    /// Creates an engine with the built-in helpers registered.
    pub fn new() -> Self {
        Self::with_helpers(&HelperSet::builtin())
    }

    /// Creates an engine with exactly the helpers in `helpers`.
    pub fn with_helpers(helpers: &HelperSet) -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        let mut engine = Self { env };
        for (name, helper) in helpers.iter() {
            engine.register_helper(name, helper.clone());
        }
        engine
    }
}

impl Default for JinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for JinjaEngine {
    fn register_helper(&mut self, name: &str, helper: Helper) {
        debug!("  Registering helper: {}", name);
        let as_filter = helper.clone();
        self.env.add_function(name.to_string(), move |args: Rest<Value>| {
            call_helper(&helper, &args)
        });
        self.env.add_filter(name.to_string(), move |args: Rest<Value>| {
            call_helper(&as_filter, &args)
        });
    }

    fn compile(&self, name: &str, source: String) -> Result<RenderFn, String> {
        let mut env = self.env.clone();
        env.add_template_owned(name.to_string(), source.clone())
            .map_err(|e| e.to_string())?;
        let name = name.to_string();
        Ok(Box::new(move |context: &RenderContext<'_>| {
            let template = env.get_template(&name).map_err(|e| e.to_string())?;
            template.render(context).map_err(|e| {
                if let Some(line) = e.line() {
                    let error_line = source.lines().nth(line - 1).unwrap_or("");
                    format!("{}\n{}", e, error_line)
                } else {
                    format!("{}", e)
                }
            })
        }))
    }
}

fn call_helper(helper: &Helper, args: &[Value]) -> Result<Value, minijinja::Error> {
    let args = args
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| minijinja::Error::new(ErrorKind::InvalidOperation, e.to_string()))?;
    let result = helper(args.as_slice())
        .map_err(|msg| minijinja::Error::new(ErrorKind::InvalidOperation, msg))?;
    Ok(Value::from_serialize(&result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JobDefaults, JobOptions};
    use crate::context::{group_file_name, DefinitionContext, PathContext, SharedValues};
    use crate::definitions::{map_definitions, DefinitionRegistry};
    use crate::model::SwaggerModel;
    use std::cell::Cell;

    fn empty_values() -> SharedValues {
        SharedValues::new(&SwaggerModel::default(), &DefinitionRegistry::new())
    }

    fn render_named(
        engine: &JinjaEngine,
        name: &str,
        source: &str,
        group_key: &str,
    ) -> Result<String, String> {
        let shared = empty_values();
        let options = JobOptions::new("out").resolve(&JobDefaults::default());
        let context = RenderContext::Path(PathContext {
            file_name: group_file_name(group_key),
            group_key,
            members: &[],
            definition_map: &shared.definition_map,
            model: &shared.model,
            options: &options,
        });
        let render = engine.compile(name, source.to_string())?;
        render(&context)
    }

    fn render(engine: &JinjaEngine, source: &str, group_key: &str) -> Result<String, String> {
        render_named(engine, "test", source, group_key)
    }

    #[test]
    fn test_render_context_fields() {
        let engine = JinjaEngine::new();
        let source = "{{ groupKey }} -> {{ fileName }}{{ options.extension }}";
        let result = render(&engine, source, " Pets ").unwrap();
        assert_eq!(result, " Pets  -> pets.js");
    }

    #[test]
    fn test_builtin_helpers_as_filter_and_function() {
        let engine = JinjaEngine::new();
        let source = "{{ fileName | pascalcase }} {{ snakecase('PetStore') }}";
        let result = render(&engine, source, "pet_store").unwrap();
        assert_eq!(result, "PetStore pet_store");
    }

    #[test]
    fn test_custom_helper() {
        let mut engine = JinjaEngine::new();
        engine.register_helper(
            "shout",
            std::sync::Arc::new(|args: &[serde_json::Value]| -> Result<serde_json::Value, String> {
                Ok(serde_json::Value::String(
                    args[0].as_str().unwrap_or_default().to_uppercase(),
                ))
            }),
        );
        let result = render(&engine, "{{ fileName | shout }}", "pets").unwrap();
        assert_eq!(result, "PETS");
    }

    #[test]
    fn test_syntax_error_fails_compile() {
        let engine = JinjaEngine::new();
        assert!(engine.compile("broken", "{% if %}".to_string()).is_err());
    }

    #[test]
    fn test_undefined_variable_fails_render() {
        let engine = JinjaEngine::new();
        let result = render(&engine, "line one\nHello, {{ name }}!", "pets");
        let err = result.unwrap_err();
        assert!(err.contains("Hello, {{ name }}!"));
    }

    #[test]
    fn test_helper_error_fails_render() {
        let engine = JinjaEngine::new();
        assert!(render(&engine, "{{ camelcase(3) }}", "pets").is_err());
    }

    #[test]
    fn test_compiled_template_is_reusable() {
        let engine = JinjaEngine::new();
        let shared = empty_values();
        let options = JobOptions::new("out").resolve(&JobDefaults::default());
        let render = engine.compile("reuse", "{{ groupKey }}".to_string()).unwrap();
        for key in ["a", "b"] {
            let context = RenderContext::Path(PathContext {
                file_name: group_file_name(key),
                group_key: key,
                members: &[],
                definition_map: &shared.definition_map,
                model: &shared.model,
                options: &options,
            });
            assert_eq!(render(&context).unwrap(), key);
        }
    }

    #[test]
    fn test_no_escaping_for_any_template_name() {
        let engine = JinjaEngine::new();
        let source = r#"{{ groupKey }}"#;
        let key = r#"a <b> & "c""#;
        for name in ["model.html.j2", "model.xml", "model.js", "model.ts.j2", "model.json"] {
            assert_eq!(render_named(&engine, name, source, key).unwrap(), key);
        }
    }

    /// Counts how often it is serialized.
    struct CountingModel {
        serialized: Cell<usize>,
    }

    impl serde::Serialize for CountingModel {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            self.serialized.set(self.serialized.get() + 1);
            serializer.serialize_str("model")
        }
    }

    #[test]
    fn test_shared_values_are_serialized_once_per_run() {
        let model = SwaggerModel::from_json_str(
            r#"{"definitions": {"A": {"type": "object"}, "B": {"type": "object"}}}"#,
        )
        .unwrap();
        let registry = map_definitions(&model);
        let counting = CountingModel {
            serialized: Cell::new(0),
        };
        let shared = SharedValues {
            model: Value::from_serialize(&counting),
            definition_map: Value::from_serialize(&registry),
        };
        assert_eq!(counting.serialized.get(), 1);

        let options = JobOptions::new("out").resolve(&JobDefaults::default());
        let engine = JinjaEngine::new();
        let render = engine
            .compile("count", "{{ definition.definitionName }}:{{ model }}".to_string())
            .unwrap();
        for _ in 0..50 {
            for definition in registry.iter() {
                let context = RenderContext::Definition(DefinitionContext {
                    model: &shared.model,
                    definition,
                    definition_map: &shared.definition_map,
                    options: &options,
                });
                let output = render(&context).unwrap();
                assert_eq!(output, format!("{}:model", definition.name));
            }
        }
        assert_eq!(counting.serialized.get(), 1);
    }
}
