//! The editor facade
//!
//! [`Editor`] holds everything that stays fixed while a program is edited:
//! the schema provider, the questionnaire items, the context type, the host's
//! external bindings and the configuration. Programs are passed in by the
//! caller and returned as new values, so one editor serves any number of them.

use crate::config::EditorConfig;
use crate::document::EditorDocument;
use octofhir_fpe_ast::{BindingId, ExternalBinding, Program};
use octofhir_fpe_compiler::compile;
use octofhir_fpe_diagnostics::{Diagnostic, FpeError, Result, TokenLocation};
use octofhir_fpe_model::{QuestionnaireItems, SchemaProvider};
use octofhir_fpe_semantic::{
    BindingResult, Candidate, ProgramTypes, Scope, SuggestOptions, Suggester, TokenTypes,
    TypeInferrer, add_binding, can_move, check_program, delete_binding, duplicate_binding,
    is_deletable, move_binding, name_expression, rename_binding,
};
use octofhir_fpe_types::FpType;
use std::sync::Arc;

#[derive(Clone)]
pub struct Editor {
    schema: Arc<dyn SchemaProvider>,
    items: Arc<QuestionnaireItems>,
    context: FpType,
    externals: Vec<ExternalBinding>,
    config: EditorConfig,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("items", &self.items.len())
            .field("context", &self.context)
            .field("externals", &self.externals)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Create an editor with an `Any` context and no external bindings
    pub fn new(schema: Arc<dyn SchemaProvider>, items: Arc<QuestionnaireItems>) -> Self {
        Self {
            schema,
            items,
            context: FpType::Any,
            externals: Vec::new(),
            config: EditorConfig::default(),
        }
    }

    /// Create an editor for a document's context, externals and configuration
    pub fn for_document(
        document: &EditorDocument,
        schema: Arc<dyn SchemaProvider>,
        items: Arc<QuestionnaireItems>,
    ) -> Self {
        Self::new(schema, items)
            .with_context(document.context.clone())
            .with_externals(document.externals.clone())
            .with_config(document.config.clone().unwrap_or_default())
    }

    pub fn with_context(mut self, context: FpType) -> Self {
        self.context = context;
        self
    }

    pub fn with_externals(mut self, externals: Vec<ExternalBinding>) -> Self {
        self.externals = externals;
        self
    }

    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn context(&self) -> &FpType {
        &self.context
    }

    pub fn externals(&self) -> &[ExternalBinding] {
        &self.externals
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn items(&self) -> &QuestionnaireItems {
        &self.items
    }

    fn inferrer(&self) -> TypeInferrer<'_> {
        TypeInferrer::new(self.schema.as_ref(), &self.items)
            .with_document_type(self.config.document_type.clone())
    }

    fn scope(&self) -> Scope<'static> {
        Scope::with_externals(&self.externals)
    }

    // === Types ===

    /// Types of every binding and of the output expression
    pub fn program_types(&self, program: &Program) -> ProgramTypes {
        self.inferrer()
            .program_types(program, &self.context, &self.scope())
    }

    /// Type of the output expression
    pub fn type_of_program(&self, program: &Program) -> FpType {
        self.inferrer()
            .type_of_program(program, &self.context, &self.scope())
    }

    /// Flowing type after each token of the expression at `location`
    ///
    /// `None` when the location does not exist in the program.
    pub fn token_types(&self, program: &Program, location: &TokenLocation) -> Option<TokenTypes> {
        let inferrer = self.inferrer();
        inferrer.with_focus(program, location, &self.context, &self.scope(), |focus| {
            inferrer.token_types(focus.expression, focus.context, focus.scope)
        })
    }

    // === Suggestions ===

    /// Candidates at a location, with the configured suggestion options
    pub fn suggest(&self, program: &Program, location: &TokenLocation) -> Option<Vec<Candidate>> {
        self.suggest_with(program, location, &self.config.suggest)
    }

    pub fn suggest_with(
        &self,
        program: &Program,
        location: &TokenLocation,
        options: &SuggestOptions,
    ) -> Option<Vec<Candidate>> {
        let inferrer = self.inferrer();
        Suggester::new(&inferrer).suggest_at(program, location, &self.context, &self.scope(), options)
    }

    // === Output ===

    /// FHIRPath text for the program
    pub fn stringify(&self, program: &Program) -> String {
        compile(
            &self.inferrer(),
            program,
            &self.context,
            &self.scope(),
            self.config.compile,
        )
    }

    /// Every diagnostic for the program, errors first
    pub fn check(&self, program: &Program) -> Vec<Diagnostic> {
        check_program(&self.inferrer(), program, &self.context, &self.scope())
    }

    /// Fail with the program's diagnostics when any of them is an error
    pub fn validate(&self, program: &Program) -> Result<()> {
        let diagnostics = self.check(program);
        if diagnostics.iter().any(Diagnostic::is_error) {
            return Err(FpeError::Diagnostics(diagnostics));
        }
        Ok(())
    }

    // === Bindings ===

    pub fn can_move(&self, program: &Program, source: usize, target: usize) -> bool {
        can_move(&program.bindings, source, target)
    }

    pub fn is_deletable(&self, program: &Program, index: usize) -> bool {
        is_deletable(program, index)
    }

    pub fn move_binding(&self, program: &Program, id: &BindingId, target: usize) -> BindingResult<Program> {
        move_binding(program, id, target)
    }

    pub fn delete_binding(&self, program: &Program, id: &BindingId) -> BindingResult<Program> {
        delete_binding(program, id)
    }

    pub fn rename_binding(&self, program: &Program, id: &BindingId, name: &str) -> BindingResult<Program> {
        rename_binding(program, id, name, &self.externals)
    }

    /// Append an empty binding with a fresh name
    pub fn add_binding(&self, program: &Program) -> Program {
        add_binding(program, &self.externals)
    }

    pub fn duplicate_binding(&self, program: &Program, id: &BindingId) -> BindingResult<Program> {
        duplicate_binding(program, id, &self.externals)
    }

    /// Move the output expression into a new binding
    pub fn name_expression(&self, program: &Program) -> Program {
        name_expression(program, &self.externals)
    }
}
