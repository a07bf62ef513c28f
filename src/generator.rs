use log::{debug, error};
use std::path::PathBuf;

use crate::config::{CodegenConfig, PathJob, TemplateJob};
use crate::context::{group_file_name, DefinitionContext, PathContext, RenderContext, SharedValues};
use crate::definitions::{DefaultDefinitionMapper, DefinitionMapper, DefinitionRegistry};
use crate::engine::{JinjaEngine, RenderFn, TemplateEngine};
use crate::error::{Error, Result};
use crate::grouping::group_operations;
use crate::helpers::HelperSet;
use crate::loader::{FileTemplateLoader, TemplateLoader, TextEncoding};
use crate::model::SwaggerModel;
use crate::output::{MemorySink, OutputSink};

/// Called once with the error that stopped a run.
pub type FailureHandler = Box<dyn Fn(&Error)>;

/// Logs a failed run. Usable with [`Generator::with_failure_handler`].
pub fn log_failure(err: &Error) {
    error!("{}", err);
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        error!("  caused by: {}", cause);
        source = cause.source();
    }
}

/// Files emitted by a successful run, in emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationReport {
    pub files: Vec<PathBuf>,
}

/// Runs the per-definition and per-path passes for a configuration.
pub struct Generator {
    engine: Box<dyn TemplateEngine>,
    loader: Box<dyn TemplateLoader>,
    definition_mapper: Box<dyn DefinitionMapper>,
    failure_handler: Option<FailureHandler>,
}

/// Shared inputs of every job in one run.
struct RunState<'a> {
    model: &'a SwaggerModel,
    registry: &'a DefinitionRegistry,
    shared: SharedValues,
    encoding: TextEncoding,
}

impl Generator {
    /// Creates a generator using the default definition mapper and no failure handler.
    pub fn new(
        engine: impl TemplateEngine + 'static,
        loader: impl TemplateLoader + 'static,
    ) -> Self {
        Self {
            engine: Box::new(engine),
            loader: Box::new(loader),
            definition_mapper: Box::new(DefaultDefinitionMapper),
            failure_handler: None,
        }
    }

    /// Replaces the mapper that builds `definitionMap`.
    pub fn with_definition_mapper(mut self, mapper: impl DefinitionMapper + 'static) -> Self {
        self.definition_mapper = Box::new(mapper);
        self
    }

    /// Sets the callback invoked once when a run fails.
    pub fn with_failure_handler(mut self, handler: impl Fn(&Error) + 'static) -> Self {
        self.failure_handler = Some(Box::new(handler));
        self
    }

    /// Registers every helper in `helpers` with the engine.
    pub fn with_helpers(mut self, helpers: HelperSet) -> Self {
        for (name, helper) in helpers.iter() {
            self.engine.register_helper(name, helper.clone());
        }
        self
    }

    /// Renders every job of `config` against `model` into `sink`.
    ///
    /// The first error stops the run. Files emitted before it stay emitted.
    /// The failure handler, if any, sees the error before it is returned.
    pub fn generate(
        &self,
        model: &SwaggerModel,
        config: &CodegenConfig,
        sink: &mut dyn OutputSink,
    ) -> Result<GenerationReport> {
        self.run(model, config, sink).inspect_err(|err| {
            if let Some(handler) = &self.failure_handler {
                handler(err);
            }
        })
    }

    /// Like [`Generator::generate`], collecting the output in memory.
    pub fn render_to_memory(
        &self,
        model: &SwaggerModel,
        config: &CodegenConfig,
    ) -> Result<MemorySink> {
        let mut sink = MemorySink::new();
        self.generate(model, config, &mut sink)?;
        Ok(sink)
    }

    fn run(
        &self,
        model: &SwaggerModel,
        config: &CodegenConfig,
        sink: &mut dyn OutputSink,
    ) -> Result<GenerationReport> {
        let resolved = config.resolve()?;
        debug!("  Mapping definitions from model");
        let registry = self.definition_mapper.map(model);
        let state = RunState {
            model,
            registry: &registry,
            shared: SharedValues::new(model, &registry),
            encoding: resolved.text_encoding,
        };
        let mut report = GenerationReport::default();

        if resolved.definition_jobs.is_empty() {
            debug!("    No per-definition templates specified");
        } else {
            debug!("  Executing per-definition templates:");
            for job in &resolved.definition_jobs {
                self.run_definition_job(job, &state, sink, &mut report)?;
            }
        }

        if resolved.path_jobs.is_empty() {
            debug!("    No per-path templates specified");
        } else {
            debug!("  Executing per-path templates:");
            for job in &resolved.path_jobs {
                self.run_path_job(job, &state, sink, &mut report)?;
            }
        }

        Ok(report)
    }

    fn run_definition_job(
        &self,
        job: &TemplateJob,
        state: &RunState<'_>,
        sink: &mut dyn OutputSink,
        report: &mut GenerationReport,
    ) -> Result<()> {
        debug!("    Iterating template: {}", job.template);
        let render = self.load(job, state.encoding)?;

        for definition in state.registry.iter() {
            debug!("      Processing definition {}", definition.reference_path);
            let context = RenderContext::Definition(DefinitionContext {
                model: &state.shared.model,
                definition,
                definition_map: &state.shared.definition_map,
                options: &job.options,
            });
            let output = Self::render(&render, job, &context)?;
            let path = job.options.output_path(&definition.name.to_lowercase());
            Self::emit(sink, path, &output, report)?;
        }
        Ok(())
    }

    fn run_path_job(
        &self,
        path_job: &PathJob,
        state: &RunState<'_>,
        sink: &mut dyn OutputSink,
        report: &mut GenerationReport,
    ) -> Result<()> {
        let job = &path_job.job;
        debug!("    Processing template: {}", job.template);
        let render = self.load(job, state.encoding)?;
        let groups = group_operations(state.model, &path_job.grouping)?;

        debug!("    Rendering template for {} group(s)", groups.len());
        for (group_key, members) in &groups {
            debug!("      Processing group: {}", group_key);
            let file_name = group_file_name(group_key);
            let path = job.options.output_path(&file_name);
            let context = RenderContext::Path(PathContext {
                file_name,
                group_key,
                members,
                definition_map: &state.shared.definition_map,
                model: &state.shared.model,
                options: &job.options,
            });
            let output = Self::render(&render, job, &context)?;
            Self::emit(sink, path, &output, report)?;
        }
        Ok(())
    }

    fn load(&self, job: &TemplateJob, encoding: TextEncoding) -> Result<RenderFn> {
        self.loader.load(&*self.engine, &job.template, encoding)
    }

    fn render(render: &RenderFn, job: &TemplateJob, context: &RenderContext<'_>) -> Result<String> {
        render(context).map_err(|message| Error::Render {
            template: job.template.clone(),
            unit: context.unit(),
            message,
        })
    }

    fn emit(
        sink: &mut dyn OutputSink,
        path: PathBuf,
        content: &str,
        report: &mut GenerationReport,
    ) -> Result<()> {
        sink.write(&path, content)?;
        report.files.push(path);
        Ok(())
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(JinjaEngine::new(), FileTemplateLoader::new())
    }
}
