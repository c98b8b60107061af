//! Type inference over token sequences
//!
//! Typing is a left-to-right fold seeded with the context type:
//! - field, function, index and answer tokens read from the value on their left
//!   (or from the context type at the start of an operand chain)
//! - literal and variable tokens start an operand chain
//! - an operator combines the accumulated left value with the operand chain
//!   that follows it, strictly left to right
//!
//! A token that cannot be typed latches its `Invalid` type: every later
//! position reports it. An operator whose right operand chain does not fit yet
//! only makes the current position invalid, since a later token of the same
//! chain may still fix it.

use crate::graph::DependencyGraph;
use crate::operators::resolve_operator;
use crate::scope::Scope;
use octofhir_fpe_ast::{LocalBinding, NumberLiteral, Operator, Program, Token};
use octofhir_fpe_diagnostics::{ArgumentStep, TokenLocation};
use octofhir_fpe_model::{
    FunctionSignature, ModelProviderError, Parameter, QUESTIONNAIRE_RESPONSE, QuestionnaireItems,
    SchemaProvider,
};
use octofhir_fpe_types::{
    FpType, PrimitiveKind, TypeBindings, TypeError, match_pattern, normalize_choice,
    substitute_generics, unwrap_single, wrap_single,
};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

type Pattern = LazyLock<Result<Regex, regex::Error>>;

static DATE: Pattern = LazyLock::new(|| Regex::new(r"^\d{4}(-\d{2}(-\d{2})?)?$"));
static DATETIME: Pattern = LazyLock::new(|| {
    Regex::new(
        r"^\d{4}(-\d{2}(-\d{2}(T\d{2}(:\d{2}(:\d{2}(\.\d+)?)?)?(Z|[+-]\d{2}:\d{2})?)?)?)?$",
    )
});
static TIME: Pattern = LazyLock::new(|| Regex::new(r"^\d{2}(:\d{2}(:\d{2}(\.\d+)?)?)?$"));

/// Flowing type after every token of an expression
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenTypes {
    pub types: Vec<FpType>,
    /// Position of the first token whose type is invalid
    pub first_invalid: Option<usize>,
}

/// Inferred type of one local binding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingType {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FpType,
}

/// Types of every binding of a program and of its output expression
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramTypes {
    pub bindings: Vec<BindingType>,
    pub output: FpType,
}

/// Where a function argument program is edited
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentContext {
    pub function: String,
    pub parameter: Parameter,
    /// Context type the argument program is typed against
    pub context: FpType,
    /// Declared parameter type with the generics bound so far substituted
    pub expected: FpType,
}

/// An expression together with the context and scope it is typed in
#[derive(Debug, Clone, Copy)]
pub struct Focus<'f> {
    pub expression: &'f [Token],
    pub context: &'f FpType,
    pub scope: &'f Scope<'f>,
}

#[derive(Debug, Clone)]
pub(crate) struct Pending {
    pub(crate) left: FpType,
    pub(crate) operator: Operator,
}

/// State of the left-to-right fold
#[derive(Debug, Clone)]
pub(crate) struct Fold {
    context: FpType,
    pub(crate) pending: Option<Pending>,
    /// Type of the current operand chain, `None` at its start
    pub(crate) chain: Option<FpType>,
    latched: Option<(usize, FpType)>,
    current: FpType,
}

impl Fold {
    fn new(context: &FpType) -> Self {
        Self {
            context: context.clone(),
            pending: None,
            chain: None,
            latched: None,
            current: context.clone(),
        }
    }

    fn latch(&mut self, index: usize, ty: FpType) {
        log::trace!("position {index} latched {ty}");
        self.latched = Some((index, ty));
    }

    /// Type the next token reads from
    pub(crate) fn value_type(&self) -> FpType {
        match (&self.latched, &self.chain) {
            (Some((_, ty)), _) => ty.clone(),
            (None, Some(chain)) => chain.clone(),
            (None, None) => self.context.clone(),
        }
    }

    /// Whether the next token starts an operand chain
    pub(crate) fn at_chain_start(&self) -> bool {
        self.chain.is_none()
    }

    /// Flowing type so far
    pub(crate) fn result(&self) -> FpType {
        match &self.latched {
            Some((_, ty)) => ty.clone(),
            None => self.current.clone(),
        }
    }

    pub(crate) fn is_latched(&self) -> bool {
        self.latched.is_some()
    }

    fn latched_index(&self) -> Option<usize> {
        self.latched.as_ref().map(|(index, _)| *index)
    }

    /// Type of a complete expression: a trailing operator has no right operand
    fn complete(&self) -> FpType {
        match (&self.latched, &self.pending, &self.chain) {
            (Some((_, ty)), _, _) => ty.clone(),
            (None, Some(pending), None) => FpType::invalid(TypeError::MissingRightOperand {
                operator: pending.operator.symbol().to_string(),
            }),
            _ => self.current.clone(),
        }
    }
}

enum FieldLookup {
    NotARecord,
    Provider(TypeError),
}

fn provider_error(err: ModelProviderError) -> TypeError {
    match err {
        ModelProviderError::NotLoaded => TypeError::SchemaNotLoaded,
        ModelProviderError::TypeNotFound(path) => TypeError::SchemaTypeNotFound {
            path: path.join("."),
        },
        other => TypeError::Other {
            message: other.to_string(),
        },
    }
}

fn number_type(text: &str) -> FpType {
    match text.parse::<NumberLiteral>() {
        Ok(number) if number.is_decimal => FpType::single(FpType::decimal()),
        Ok(_) => FpType::single(FpType::integer()),
        Err(_) => malformed("number", text),
    }
}

fn temporal_type(pattern: &Pattern, text: &str, kind: &str, ty: FpType) -> FpType {
    match &**pattern {
        Ok(re) if re.is_match(text) => FpType::single(ty),
        _ => malformed(kind, text),
    }
}

fn malformed(kind: &str, text: &str) -> FpType {
    FpType::invalid(TypeError::MalformedLiteral {
        kind: kind.to_string(),
        text: text.to_string(),
    })
}

fn misplaced(token: &Token) -> FpType {
    FpType::invalid(TypeError::Misplaced {
        kind: token.kind().label().to_lowercase(),
    })
}

fn starts_chain(token: &Token) -> bool {
    token.kind().is_literal() || matches!(token, Token::Variable { .. })
}

/// Answer value types when the schema does not describe answers
fn answer_value_fallback() -> FpType {
    let mut options: Vec<FpType> = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Decimal,
        PrimitiveKind::Integer,
        PrimitiveKind::Date,
        PrimitiveKind::DateTime,
        PrimitiveKind::Time,
        PrimitiveKind::String,
        PrimitiveKind::Uri,
    ]
    .into_iter()
    .map(FpType::Primitive)
    .collect();
    options.extend([
        FpType::record(["Attachment"]),
        FpType::record(["Coding"]),
        FpType::Quantity,
        FpType::record(["Reference"]),
    ]);
    FpType::single(normalize_choice(options))
}

/// Type inference engine
///
/// Borrows the schema provider and the questionnaire item registry; all
/// operations are pure functions of their arguments.
pub struct TypeInferrer<'a> {
    provider: &'a dyn SchemaProvider,
    items: &'a QuestionnaireItems,
    document_type: String,
}

impl<'a> TypeInferrer<'a> {
    pub fn new(provider: &'a dyn SchemaProvider, items: &'a QuestionnaireItems) -> Self {
        Self {
            provider,
            items,
            document_type: QUESTIONNAIRE_RESPONSE.to_string(),
        }
    }

    /// Use another record type as the document answers are read from
    pub fn with_document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = document_type.into();
        self
    }

    pub fn provider(&self) -> &'a dyn SchemaProvider {
        self.provider
    }

    pub fn items(&self) -> &'a QuestionnaireItems {
        self.items
    }

    pub fn document_type(&self) -> &str {
        &self.document_type
    }

    /// Check if a flowing type is the document answers are read from
    pub fn is_document(&self, ty: &FpType) -> bool {
        matches!(ty.unwrapped(), FpType::Record(path) if path.len() == 1 && path[0] == self.document_type)
    }

    // === Tokens ===

    /// Type of a single token
    ///
    /// `before` is the flowing type on the token's left inside its operand
    /// chain, `None` at the start of a chain.
    pub fn type_of_token(
        &self,
        token: &Token,
        before: Option<&FpType>,
        context: &FpType,
        scope: &Scope<'_>,
    ) -> FpType {
        if let Some(before) = before {
            if before.is_invalid() {
                return before.clone();
            }
            if starts_chain(token) {
                return misplaced(token);
            }
        }
        let input = before.unwrap_or(context);

        match token {
            Token::Number { value } => number_type(value),
            Token::String { .. } => FpType::single(FpType::string()),
            Token::Boolean { .. } => FpType::single(FpType::boolean()),
            Token::Date { value } => temporal_type(&DATE, value, "date", FpType::date()),
            Token::DateTime { value } => {
                temporal_type(&DATETIME, value, "datetime", FpType::datetime())
            }
            Token::Time { value } => temporal_type(&TIME, value, "time", FpType::time()),
            Token::Quantity { value } => match value.value.parse::<NumberLiteral>() {
                Ok(_) => FpType::single(FpType::Quantity),
                Err(_) => malformed("quantity", &value.value),
            },
            Token::TypeLiteral { value } => FpType::type_literal(value.clone()),
            Token::Index { .. } => match before {
                Some(before) => wrap_single(unwrap_single(before.clone())),
                None => misplaced(token),
            },
            Token::Operator { .. } => input.clone(),
            Token::Variable { name } => scope.lookup(name).cloned().unwrap_or_else(|| {
                FpType::invalid(TypeError::UnknownVariable { name: name.clone() })
            }),
            Token::Field { name } => self.field_type(input, name),
            Token::Function { name, args } => {
                self.function_type(name, args, input, context, scope)
            }
            Token::Answer { link_id } => self.answer_type(input, link_id),
        }
    }

    // === Fields ===

    fn field_maps(
        &self,
        value: &FpType,
    ) -> Result<Vec<std::sync::Arc<octofhir_fpe_model::FieldMap>>, FieldLookup> {
        match value {
            FpType::Record(path) => self
                .provider
                .resolve_fields(path)
                .map(|fields| vec![fields])
                .map_err(|e| FieldLookup::Provider(provider_error(e))),
            FpType::Quantity => match self.provider.resolve_fields(&["Quantity".to_string()]) {
                Ok(fields) => Ok(vec![fields]),
                Err(ModelProviderError::NotLoaded) => {
                    Err(FieldLookup::Provider(TypeError::SchemaNotLoaded))
                }
                Err(_) => Err(FieldLookup::NotARecord),
            },
            FpType::Primitive(kind) => self
                .provider
                .resolve_fields(&[kind.fhir_name().to_string()])
                .map(|fields| vec![fields])
                .map_err(|_| FieldLookup::NotARecord),
            FpType::Choice(options) => {
                let maps: Vec<_> = options
                    .iter()
                    .filter_map(|option| self.field_maps(option.unwrapped()).ok())
                    .flatten()
                    .collect();
                if maps.is_empty() {
                    Err(FieldLookup::NotARecord)
                } else {
                    Ok(maps)
                }
            }
            _ => Err(FieldLookup::NotARecord),
        }
    }

    /// Type of reading field `name` from `input`
    pub fn field_type(&self, input: &FpType, name: &str) -> FpType {
        let value = input.unwrapped();
        match value {
            FpType::Invalid(_) => return value.clone(),
            FpType::Any => return FpType::Any,
            FpType::Null => return FpType::Null,
            _ => {}
        }

        let maps = match self.field_maps(value) {
            Ok(maps) => maps,
            Err(FieldLookup::NotARecord) => {
                return FpType::invalid(TypeError::NotARecord {
                    field: name.to_string(),
                    on: input.describe(),
                });
            }
            Err(FieldLookup::Provider(err)) => {
                log::debug!("field '{name}' on {input}: {err}");
                return FpType::invalid(err);
            }
        };

        let found: Vec<FpType> = maps
            .iter()
            .filter_map(|fields| fields.get(name).cloned())
            .collect();
        if found.is_empty() {
            return FpType::invalid(TypeError::UnknownField {
                field: name.to_string(),
                on: value.describe(),
            });
        }

        let ty = normalize_choice(found);
        if input.is_single() {
            ty
        } else {
            unwrap_single(ty)
        }
    }

    /// Fields readable from `input`, in schema order, typed as [`field_type`](Self::field_type) would
    pub fn fields_of(&self, input: &FpType) -> Vec<(String, FpType)> {
        let Ok(maps) = self.field_maps(input.unwrapped()) else {
            return Vec::new();
        };

        let mut fields: indexmap::IndexMap<String, FpType> = indexmap::IndexMap::new();
        for map in &maps {
            for (name, ty) in map.iter() {
                fields.entry(name.clone()).or_insert_with(|| ty.clone());
            }
        }

        fields
            .into_iter()
            .map(|(name, ty)| {
                let ty = if input.is_single() { ty } else { unwrap_single(ty) };
                (name, ty)
            })
            .collect()
    }

    // === Answers ===

    /// Type of an answer shortcut read from `input`
    pub fn answer_type(&self, input: &FpType, link_id: &str) -> FpType {
        if input.is_invalid() {
            return input.clone();
        }
        if !self.is_document(input) {
            return FpType::invalid(TypeError::AnswerOutsideResponse {
                expected: self.document_type.clone(),
            });
        }

        let single = input.is_single();
        match self.items.get(link_id) {
            Some(item) if single && !item.repeats => wrap_single(item.value_type.clone()),
            Some(item) => unwrap_single(item.value_type.clone()),
            None => {
                let generic = self.generic_answer_type();
                if single { generic } else { unwrap_single(generic) }
            }
        }
    }

    /// Value type of an answer whose item is unknown
    fn generic_answer_type(&self) -> FpType {
        let path = [
            self.document_type.clone(),
            "item".to_string(),
            "answer".to_string(),
        ];
        self.provider
            .resolve_fields(&path)
            .ok()
            .and_then(|fields| fields.get("value").cloned())
            .unwrap_or_else(answer_value_fallback)
    }

    // === Functions ===

    /// Check if a function accepts `input` as the value on its left
    pub fn accepts_input(&self, signature: &FunctionSignature, input: &FpType) -> bool {
        match_pattern(&signature.input, input, &TypeBindings::new()).is_some()
    }

    fn function_type(
        &self,
        name: &str,
        args: &[Program],
        input: &FpType,
        context: &FpType,
        scope: &Scope<'_>,
    ) -> FpType {
        let Some(signature) = self.provider.resolve_function(name) else {
            return FpType::invalid(TypeError::UnknownFunction {
                name: name.to_string(),
            });
        };
        if input.is_invalid() {
            return input.clone();
        }

        let Some(bindings) = match_pattern(&signature.input, input, &TypeBindings::new()) else {
            log::debug!("{name}(): input {input} does not match {}", signature.input);
            return FpType::invalid(TypeError::InputMismatch {
                function: name.to_string(),
                expected: signature.input.describe(),
                actual: input.describe(),
            });
        };

        match self.bind_arguments(signature, bindings, args, signature.params.len(), context, scope)
        {
            Ok((bindings, supplied)) => {
                signature
                    .returns
                    .resolve(input, &bindings, &supplied, &signature.params)
            }
            Err(err) => FpType::invalid(err),
        }
    }

    /// Type the first `upto` arguments and bind their generics
    ///
    /// Returns the bindings and which parameters received an argument.
    fn bind_arguments(
        &self,
        signature: &FunctionSignature,
        mut bindings: TypeBindings,
        args: &[Program],
        upto: usize,
        context: &FpType,
        scope: &Scope<'_>,
    ) -> Result<(TypeBindings, Vec<bool>), TypeError> {
        let mut supplied = Vec::with_capacity(signature.params.len());

        for (index, param) in signature.params.iter().enumerate().take(upto) {
            let Some(arg) = args.get(index).filter(|arg| !arg.is_empty()) else {
                if param.optional {
                    supplied.push(false);
                    continue;
                }
                return Err(TypeError::MissingArgument {
                    function: signature.name.clone(),
                    argument: param.name.clone(),
                });
            };

            let expected = substitute_generics(&param.ty, &bindings);
            let actual = match &expected {
                FpType::Lambda {
                    context: lambda_context,
                    ..
                } => FpType::lambda(
                    (**lambda_context).clone(),
                    self.type_of_program(arg, lambda_context, scope),
                ),
                _ => self.type_of_program(arg, context, scope),
            };

            let Some(matched) = match_pattern(&param.ty, &actual, &bindings) else {
                log::debug!(
                    "{}(): argument '{}' expects {expected}, got {actual}",
                    signature.name,
                    param.name
                );
                for (generic, ty) in bindings.iter() {
                    log::trace!("  {generic} = {ty}");
                }
                return Err(TypeError::ArgumentMismatch {
                    function: signature.name.clone(),
                    argument: param.name.clone(),
                    expected: expected.describe(),
                    actual: actual.describe(),
                });
            };
            bindings = bindings
                .merge(&matched)
                .ok_or_else(|| TypeError::BindingConflict {
                    function: signature.name.clone(),
                    argument: param.name.clone(),
                })?;
            supplied.push(true);
        }

        supplied.resize(signature.params.len(), false);
        Ok((bindings, supplied))
    }

    /// Context an argument of the function token at `token_index` is edited in
    ///
    /// Generics are bound from the input and the arguments before `arg_index`.
    pub fn argument_context(
        &self,
        expression: &[Token],
        token_index: usize,
        arg_index: usize,
        context: &FpType,
        scope: &Scope<'_>,
    ) -> Option<ArgumentContext> {
        let Token::Function { name, args } = expression.get(token_index)? else {
            return None;
        };
        let signature = self.provider.resolve_function(name)?;
        let parameter = signature.params.get(arg_index)?;

        let input = self.fold_prefix(expression, token_index, context, scope).value_type();
        let bindings = match_pattern(&signature.input, &input, &TypeBindings::new())
            .unwrap_or_default();
        let bindings = self
            .bind_arguments(signature, bindings.clone(), args, arg_index, context, scope)
            .map(|(bound, _)| bound)
            .unwrap_or(bindings);

        let expected = substitute_generics(&parameter.ty, &bindings);
        let arg_context = match &expected {
            FpType::Lambda {
                context: lambda_context,
                ..
            } => (**lambda_context).clone(),
            _ => context.clone(),
        };

        Some(ArgumentContext {
            function: name.clone(),
            parameter: parameter.clone(),
            context: arg_context,
            expected,
        })
    }

    // === Expressions ===

    pub(crate) fn fold_prefix(
        &self,
        expression: &[Token],
        upto: usize,
        context: &FpType,
        scope: &Scope<'_>,
    ) -> Fold {
        let mut fold = Fold::new(context);
        for (index, token) in expression.iter().take(upto).enumerate() {
            self.step(&mut fold, index, token, scope);
        }
        fold
    }

    fn step(&self, fold: &mut Fold, index: usize, token: &Token, scope: &Scope<'_>) {
        if fold.is_latched() {
            return;
        }

        if let Token::Operator { value: operator } = token {
            let Some(chain) = fold.chain.take() else {
                fold.latch(
                    index,
                    FpType::invalid(TypeError::MissingOperand {
                        operator: operator.symbol().to_string(),
                    }),
                );
                return;
            };
            let left = match fold.pending.take() {
                Some(pending) => resolve_operator(pending.operator, &pending.left, &chain),
                None => chain,
            };
            if left.is_invalid() {
                fold.latch(index, left);
                return;
            }
            fold.current = left.clone();
            fold.pending = Some(Pending {
                left,
                operator: *operator,
            });
            return;
        }

        let ty = self.type_of_token(token, fold.chain.as_ref(), &fold.context, scope);
        if ty.is_invalid() {
            fold.latch(index, ty);
            return;
        }
        fold.current = match &fold.pending {
            Some(pending) => resolve_operator(pending.operator, &pending.left, &ty),
            None => ty.clone(),
        };
        log::trace!("position {index}: {}", fold.current);
        fold.chain = Some(ty);
    }

    /// Flowing type after the first `upto` tokens
    pub fn type_of_expression_prefix(
        &self,
        expression: &[Token],
        upto: usize,
        context: &FpType,
        scope: &Scope<'_>,
    ) -> FpType {
        self.fold_prefix(expression, upto, context, scope).result()
    }

    /// Type of a complete expression
    ///
    /// An empty expression has the context type; an expression ending in an
    /// operator is invalid.
    pub fn type_of_expression(
        &self,
        expression: &[Token],
        context: &FpType,
        scope: &Scope<'_>,
    ) -> FpType {
        self.fold_prefix(expression, expression.len(), context, scope)
            .complete()
    }

    /// Flowing type after every token
    pub fn token_types(
        &self,
        expression: &[Token],
        context: &FpType,
        scope: &Scope<'_>,
    ) -> TokenTypes {
        let mut fold = Fold::new(context);
        let mut types = Vec::with_capacity(expression.len());
        for (index, token) in expression.iter().enumerate() {
            self.step(&mut fold, index, token, scope);
            types.push(fold.result());
        }

        let complete = fold.complete();
        let first_invalid = fold.latched_index().or_else(|| {
            complete
                .is_invalid()
                .then(|| expression.len().saturating_sub(1))
        });
        if let Some(last) = types.last_mut() {
            *last = complete;
        }

        TokenTypes {
            types,
            first_invalid,
        }
    }

    // === Bindings and programs ===

    /// Types of a binding list
    ///
    /// Each binding is typed with the bindings it references visible, so a
    /// binding never sees itself or its dependents. Bindings on a cycle are
    /// invalid.
    pub fn binding_types(
        &self,
        bindings: &[LocalBinding],
        context: &FpType,
        scope: &Scope<'_>,
    ) -> Vec<FpType> {
        let graph = DependencyGraph::new(bindings);
        let mut memo: Vec<Option<FpType>> = vec![None; bindings.len()];
        for index in 0..bindings.len() {
            self.resolve_binding(index, bindings, &graph, context, scope, &mut memo);
        }
        memo.into_iter()
            .map(|ty| ty.unwrap_or(FpType::Invalid(None)))
            .collect()
    }

    fn resolve_binding(
        &self,
        index: usize,
        bindings: &[LocalBinding],
        graph: &DependencyGraph,
        context: &FpType,
        scope: &Scope<'_>,
        memo: &mut Vec<Option<FpType>>,
    ) -> FpType {
        if let Some(ty) = &memo[index] {
            return ty.clone();
        }

        let ty = if graph.is_cyclic(index) {
            FpType::invalid(TypeError::CircularReference {
                name: bindings[index].name.clone(),
            })
        } else {
            let mut local = scope.child();
            for &dependency in graph.dependencies(index) {
                let dependency_type =
                    self.resolve_binding(dependency, bindings, graph, context, scope, memo);
                local.define(bindings[dependency].name.clone(), dependency_type);
            }
            self.type_of_expression(&bindings[index].expression, context, &local)
        };

        log::trace!("%{}: {ty}", bindings[index].name);
        memo[index] = Some(ty.clone());
        ty
    }

    /// Type of the binding at `index`
    pub fn type_of_binding(
        &self,
        bindings: &[LocalBinding],
        index: usize,
        context: &FpType,
        scope: &Scope<'_>,
    ) -> Option<FpType> {
        self.binding_types(bindings, context, scope).get(index).cloned()
    }

    /// Scope holding `bindings` with their types, as a child of `scope`
    ///
    /// A duplicated name keeps the type of its first binding.
    pub fn program_scope<'s>(
        &self,
        bindings: &[LocalBinding],
        types: &[FpType],
        scope: &'s Scope<'s>,
    ) -> Scope<'s> {
        let mut local = scope.child();
        let mut defined: Vec<&str> = Vec::with_capacity(bindings.len());
        for (binding, ty) in bindings.iter().zip(types) {
            if defined.contains(&binding.name.as_str()) {
                continue;
            }
            defined.push(&binding.name);
            local.define(binding.name.clone(), ty.clone());
        }
        local
    }

    /// Types of every binding and of the output expression
    pub fn program_types(
        &self,
        program: &Program,
        context: &FpType,
        scope: &Scope<'_>,
    ) -> ProgramTypes {
        let types = self.binding_types(&program.bindings, context, scope);
        let local = self.program_scope(&program.bindings, &types, scope);
        let output = self.type_of_expression(&program.expression, context, &local);

        ProgramTypes {
            bindings: program
                .bindings
                .iter()
                .zip(types)
                .map(|(binding, ty)| BindingType {
                    id: binding.id.to_string(),
                    name: binding.name.clone(),
                    ty,
                })
                .collect(),
            output,
        }
    }

    /// Type of a program's output expression
    pub fn type_of_program(&self, program: &Program, context: &FpType, scope: &Scope<'_>) -> FpType {
        let types = self.binding_types(&program.bindings, context, scope);
        let local = self.program_scope(&program.bindings, &types, scope);
        self.type_of_expression(&program.expression, context, &local)
    }

    // === Locations ===

    /// Run `f` on the expression a location points into
    ///
    /// Inside a local binding only the bindings before it are in scope. Each
    /// argument step descends into an argument program, typed against its
    /// argument context. Returns `None` when the location does not exist.
    pub fn with_focus<R>(
        &self,
        program: &Program,
        location: &TokenLocation,
        context: &FpType,
        scope: &Scope<'_>,
        f: impl FnOnce(&Focus<'_>) -> R,
    ) -> Option<R> {
        let types = self.binding_types(&program.bindings, context, scope);
        let (expression, local) = match &location.binding {
            Some(name) => {
                let index = program.bindings.iter().position(|b| &b.name == name)?;
                (
                    &program.bindings[index].expression,
                    self.program_scope(&program.bindings[..index], &types[..index], scope),
                )
            }
            None => (
                &program.expression,
                self.program_scope(&program.bindings, &types, scope),
            ),
        };
        self.descend(expression, &location.arguments, context, &local, f)
    }

    fn descend<R>(
        &self,
        expression: &[Token],
        steps: &[ArgumentStep],
        context: &FpType,
        scope: &Scope<'_>,
        f: impl FnOnce(&Focus<'_>) -> R,
    ) -> Option<R> {
        let Some((step, rest)) = steps.split_first() else {
            return Some(f(&Focus {
                expression,
                context,
                scope,
            }));
        };

        let argument = self.argument_context(expression, step.token, step.argument, context, scope)?;
        let Token::Function { args, .. } = expression.get(step.token)? else {
            return None;
        };
        let empty = Program::default();
        let program = args.get(step.argument).unwrap_or(&empty);

        let types = self.binding_types(&program.bindings, &argument.context, scope);
        let local = self.program_scope(&program.bindings, &types, scope);
        self.descend(&program.expression, rest, &argument.context, &local, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_fpe_model::{FieldMap, SchemaRegistry};

    fn registry() -> SchemaRegistry {
        let mut patient = FieldMap::new();
        patient.insert("name".into(), FpType::record(["HumanName"]));
        patient.insert("active".into(), FpType::single(FpType::boolean()));
        let mut name = FieldMap::new();
        name.insert("given".into(), FpType::string());
        name.insert("family".into(), FpType::single(FpType::string()));
        SchemaRegistry::unloaded()
            .with_fields(["Patient"], patient)
            .with_fields(["HumanName"], name)
    }

    fn patient() -> FpType {
        FpType::single(FpType::record(["Patient"]))
    }

    #[test]
    fn test_literals() {
        let registry = registry();
        let items = QuestionnaireItems::new();
        let inferrer = TypeInferrer::new(&registry, &items);
        let scope = Scope::new();
        let ty = |token: Token| inferrer.type_of_token(&token, None, &FpType::Any, &scope);

        assert_eq!(ty(Token::number("2")), FpType::single(FpType::integer()));
        assert_eq!(ty(Token::number("2.5")), FpType::single(FpType::decimal()));
        assert!(ty(Token::number("2x")).is_invalid());
        assert_eq!(ty(Token::date("2024-01")), FpType::single(FpType::date()));
        assert!(ty(Token::date("2024-1-1")).is_invalid());
        assert_eq!(
            ty(Token::datetime("2024-01-02T10:30:00Z")),
            FpType::single(FpType::datetime())
        );
        assert_eq!(ty(Token::time("10:30")), FpType::single(FpType::time()));
        assert_eq!(ty(Token::quantity("5", "kg")), FpType::single(FpType::Quantity));
    }

    #[test]
    fn test_field_cardinality() {
        let registry = registry();
        let items = QuestionnaireItems::new();
        let inferrer = TypeInferrer::new(&registry, &items);

        assert_eq!(inferrer.field_type(&patient(), "active"), FpType::single(FpType::boolean()));
        assert_eq!(
            inferrer.field_type(&FpType::record(["HumanName"]), "family"),
            FpType::string()
        );
        assert!(inferrer.field_type(&patient(), "nme").is_invalid());
        assert!(inferrer.field_type(&FpType::single(FpType::integer()), "x").is_invalid());
    }

    #[test]
    fn test_operator_fold_is_left_to_right() {
        let registry = registry();
        let items = QuestionnaireItems::new();
        let inferrer = TypeInferrer::new(&registry, &items);
        let scope = Scope::new();

        // (1 + 2.0) = 3 folds to Boolean
        let expression = vec![
            Token::number("1"),
            Token::operator(Operator::Add),
            Token::number("2.0"),
            Token::operator(Operator::Equal),
            Token::number("3"),
        ];
        assert_eq!(
            inferrer.type_of_expression(&expression, &FpType::Any, &scope),
            FpType::single(FpType::boolean())
        );
        assert_eq!(
            inferrer.type_of_expression_prefix(&expression, 4, &FpType::Any, &scope),
            FpType::single(FpType::decimal())
        );
    }

    #[test]
    fn test_trailing_operator() {
        let registry = registry();
        let items = QuestionnaireItems::new();
        let inferrer = TypeInferrer::new(&registry, &items);
        let scope = Scope::new();
        let expression = vec![Token::number("1"), Token::operator(Operator::Add)];

        let types = inferrer.token_types(&expression, &FpType::Any, &scope);
        assert_eq!(types.first_invalid, Some(1));
        assert_eq!(types.types[0], FpType::single(FpType::integer()));
        assert_eq!(
            types.types[1].error(),
            Some(&TypeError::MissingRightOperand {
                operator: "+".into()
            })
        );
    }

    #[test]
    fn test_empty_expression_has_context_type() {
        let registry = registry();
        let items = QuestionnaireItems::new();
        let inferrer = TypeInferrer::new(&registry, &items);
        assert_eq!(
            inferrer.type_of_expression(&[], &patient(), &Scope::new()),
            patient()
        );
    }
}
