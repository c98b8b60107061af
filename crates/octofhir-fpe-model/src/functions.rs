//! Standard function catalog
//!
//! Each signature declares an input pattern, named parameters and a return
//! rule. Patterns use generic variables (`T`, `R`, `X`, ...) that are bound
//! while matching the input and the arguments left to right.

use octofhir_fpe_types::{
    FpType, PrimitiveKind, TypeBindings, normalize_choice, substitute_generics, unwrap_single,
    wrap_single,
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Function categories, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionCategory {
    Existence,
    FilteringAndProjection,
    Subsetting,
    Combining,
    Conversion,
    StringManipulation,
    Math,
    TreeNavigation,
    Utility,
    Aggregates,
    FhirExtensions,
    SdcExtensions,
}

impl FunctionCategory {
    /// Display label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Existence => "Existence",
            Self::FilteringAndProjection => "Filtering and projection",
            Self::Subsetting => "Subsetting",
            Self::Combining => "Combining",
            Self::Conversion => "Conversion",
            Self::StringManipulation => "String Manipulation",
            Self::Math => "Math",
            Self::TreeNavigation => "Tree Navigation",
            Self::Utility => "Utility Functions",
            Self::Aggregates => "Aggregates",
            Self::FhirExtensions => "FHIR Extensions",
            Self::SdcExtensions => "SDC Extensions",
        }
    }
}

/// A declared function parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FpType,
    #[serde(default)]
    pub optional: bool,
}

impl Parameter {
    pub fn required(name: impl Into<String>, ty: FpType) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
        }
    }

    pub fn optional(name: impl Into<String>, ty: FpType) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: true,
        }
    }
}

/// How a function's return type is computed from its bindings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReturnRule {
    /// The given type with generics substituted
    Fixed(FpType),
    /// The given type with generics substituted and `Single` dropped
    Collection(FpType),
    /// Exactly one value of the input type
    SingleOfInput,
    /// Either branch of a conditional: `then`, or `then | else` when the
    /// optional branch is supplied
    Branches { then: String, otherwise: String },
}

impl ReturnRule {
    /// Compute the return type
    ///
    /// `supplied` tells which parameters received an argument.
    pub fn resolve(&self, input: &FpType, bindings: &TypeBindings, supplied: &[bool], params: &[Parameter]) -> FpType {
        match self {
            Self::Fixed(ty) => substitute_generics(ty, bindings),
            Self::Collection(ty) => unwrap_single(substitute_generics(ty, bindings)),
            Self::SingleOfInput => wrap_single(unwrap_single(input.clone())),
            Self::Branches { then, otherwise } => {
                let then_ty = substitute_generics(&FpType::generic(then.clone()), bindings);
                let else_supplied = params
                    .iter()
                    .zip(supplied)
                    .any(|(param, supplied)| *supplied && param.optional);
                if else_supplied {
                    let else_ty = substitute_generics(&FpType::generic(otherwise.clone()), bindings);
                    normalize_choice(vec![then_ty, else_ty])
                } else {
                    then_ty
                }
            }
        }
    }
}

/// A function signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    pub category: FunctionCategory,
    /// Pattern the input (the value on the left of the call) must match
    pub input: FpType,
    pub params: Vec<Parameter>,
    pub returns: ReturnRule,
}

impl FunctionSignature {
    pub fn new(
        name: impl Into<String>,
        category: FunctionCategory,
        input: FpType,
        params: Vec<Parameter>,
        returns: ReturnRule,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            input,
            params,
            returns,
        }
    }

    /// Number of parameters without a default
    pub fn required_params(&self) -> usize {
        self.params.iter().filter(|p| !p.optional).count()
    }
}

fn t() -> FpType {
    FpType::generic("T")
}

fn r() -> FpType {
    FpType::generic("R")
}

fn single(ty: FpType) -> FpType {
    FpType::single(ty)
}

fn one_boolean() -> FpType {
    single(FpType::boolean())
}

fn numeric() -> FpType {
    FpType::choice(vec![FpType::integer(), FpType::decimal()])
}

fn numeric_or_quantity() -> FpType {
    FpType::choice(vec![FpType::integer(), FpType::decimal(), FpType::Quantity])
}

fn criteria() -> Parameter {
    Parameter::required("criteria", FpType::lambda(single(t()), FpType::boolean()))
}

fn projection() -> Parameter {
    Parameter::required("projection", FpType::lambda(single(t()), r()))
}

static STANDARD_FUNCTIONS: LazyLock<Vec<FunctionSignature>> = LazyLock::new(|| {
    use FunctionCategory::*;
    use ReturnRule::*;

    let f = FunctionSignature::new;
    let req = Parameter::required;
    let opt = Parameter::optional;
    let string = FpType::string;
    let integer = FpType::integer;
    let decimal = FpType::decimal;

    vec![
        // Existence
        f("empty", Existence, t(), vec![], Fixed(one_boolean())),
        f("exists", Existence, t(), vec![Parameter { optional: true, ..criteria() }], Fixed(one_boolean())),
        f("all", Existence, t(), vec![criteria()], Fixed(one_boolean())),
        f("allTrue", Existence, FpType::boolean(), vec![], Fixed(one_boolean())),
        f("anyTrue", Existence, FpType::boolean(), vec![], Fixed(one_boolean())),
        f("allFalse", Existence, FpType::boolean(), vec![], Fixed(one_boolean())),
        f("anyFalse", Existence, FpType::boolean(), vec![], Fixed(one_boolean())),
        f("subsetOf", Existence, t(), vec![req("other", t())], Fixed(one_boolean())),
        f("supersetOf", Existence, t(), vec![req("other", t())], Fixed(one_boolean())),
        f("count", Existence, t(), vec![], Fixed(single(integer()))),
        f("distinct", Existence, t(), vec![], Collection(t())),
        f("isDistinct", Existence, t(), vec![], Fixed(one_boolean())),
        // Filtering and projection
        f("where", FilteringAndProjection, t(), vec![criteria()], Fixed(t())),
        f("select", FilteringAndProjection, t(), vec![projection()], Collection(r())),
        f("repeat", FilteringAndProjection, t(), vec![projection()], Collection(r())),
        f(
            "ofType",
            FilteringAndProjection,
            t(),
            vec![req("type", FpType::type_literal(FpType::generic("X")))],
            Collection(FpType::generic("X")),
        ),
        // Subsetting
        f("single", Subsetting, t(), vec![], Fixed(single(t()))),
        f("first", Subsetting, t(), vec![], Fixed(single(t()))),
        f("last", Subsetting, t(), vec![], Fixed(single(t()))),
        f("tail", Subsetting, t(), vec![], Collection(t())),
        f("skip", Subsetting, t(), vec![req("num", integer())], Collection(t())),
        f("take", Subsetting, t(), vec![req("num", integer())], Collection(t())),
        f("intersect", Subsetting, t(), vec![req("other", t())], Collection(t())),
        f("exclude", Subsetting, t(), vec![req("other", t())], Collection(t())),
        // Combining
        f("union", Combining, t(), vec![req("other", t())], Collection(t())),
        f("combine", Combining, t(), vec![req("other", t())], Collection(t())),
        // Conversion
        f(
            "iif",
            Conversion,
            FpType::generic("I"),
            vec![
                req("condition", FpType::lambda(single(FpType::generic("I")), FpType::boolean())),
                req("then", FpType::lambda(single(FpType::generic("I")), FpType::generic("T"))),
                opt("else", FpType::lambda(single(FpType::generic("I")), FpType::generic("F"))),
            ],
            Branches {
                then: "T".to_string(),
                otherwise: "F".to_string(),
            },
        ),
        f("toBoolean", Conversion, t(), vec![], Fixed(FpType::boolean())),
        f("convertsToBoolean", Conversion, t(), vec![], Fixed(one_boolean())),
        f("toInteger", Conversion, t(), vec![], Fixed(integer())),
        f("convertsToInteger", Conversion, t(), vec![], Fixed(one_boolean())),
        f("toDate", Conversion, t(), vec![], Fixed(FpType::date())),
        f("convertsToDate", Conversion, t(), vec![], Fixed(one_boolean())),
        f("toDateTime", Conversion, t(), vec![], Fixed(FpType::datetime())),
        f("convertsToDateTime", Conversion, t(), vec![], Fixed(one_boolean())),
        f("toDecimal", Conversion, t(), vec![], Fixed(decimal())),
        f("convertsToDecimal", Conversion, t(), vec![], Fixed(one_boolean())),
        f("toQuantity", Conversion, t(), vec![opt("unit", string())], Fixed(FpType::Quantity)),
        f("convertsToQuantity", Conversion, t(), vec![opt("unit", string())], Fixed(one_boolean())),
        f("toString", Conversion, t(), vec![], Fixed(string())),
        f("convertsToString", Conversion, t(), vec![], Fixed(one_boolean())),
        f("toTime", Conversion, t(), vec![], Fixed(FpType::time())),
        f("convertsToTime", Conversion, t(), vec![], Fixed(one_boolean())),
        // String manipulation
        f("indexOf", StringManipulation, string(), vec![req("substring", string())], Fixed(integer())),
        f(
            "substring",
            StringManipulation,
            string(),
            vec![req("start", integer()), opt("length", integer())],
            Fixed(string()),
        ),
        f("startsWith", StringManipulation, string(), vec![req("prefix", string())], Fixed(FpType::boolean())),
        f("endsWith", StringManipulation, string(), vec![req("suffix", string())], Fixed(FpType::boolean())),
        f("contains", StringManipulation, string(), vec![req("substring", string())], Fixed(FpType::boolean())),
        f("upper", StringManipulation, string(), vec![], Fixed(string())),
        f("lower", StringManipulation, string(), vec![], Fixed(string())),
        f(
            "replace",
            StringManipulation,
            string(),
            vec![req("pattern", string()), req("substitution", string())],
            Fixed(string()),
        ),
        f("matches", StringManipulation, string(), vec![req("regex", string())], Fixed(FpType::boolean())),
        f(
            "replaceMatches",
            StringManipulation,
            string(),
            vec![req("regex", string()), req("substitution", string())],
            Fixed(string()),
        ),
        f("length", StringManipulation, string(), vec![], Fixed(integer())),
        f("toChars", StringManipulation, string(), vec![], Fixed(string())),
        f("encode", StringManipulation, string(), vec![req("format", string())], Fixed(string())),
        f("decode", StringManipulation, string(), vec![req("format", string())], Fixed(string())),
        f("trim", StringManipulation, string(), vec![], Fixed(string())),
        f("split", StringManipulation, string(), vec![req("separator", string())], Fixed(string())),
        f("join", StringManipulation, string(), vec![opt("separator", string())], Fixed(string())),
        // Math
        f("abs", Math, numeric_or_quantity(), vec![], SingleOfInput),
        f("ceiling", Math, numeric(), vec![], Fixed(integer())),
        f("exp", Math, numeric(), vec![], Fixed(decimal())),
        f("floor", Math, numeric(), vec![], Fixed(integer())),
        f("ln", Math, numeric(), vec![], Fixed(decimal())),
        f("log", Math, numeric(), vec![req("base", numeric())], Fixed(decimal())),
        f("power", Math, numeric(), vec![req("exponent", numeric())], Fixed(decimal())),
        f("round", Math, numeric(), vec![opt("precision", integer())], Fixed(decimal())),
        f("sqrt", Math, numeric(), vec![], Fixed(decimal())),
        f("truncate", Math, numeric(), vec![], Fixed(integer())),
        // Tree navigation
        f("children", TreeNavigation, t(), vec![], Fixed(FpType::Any)),
        f("descendants", TreeNavigation, t(), vec![], Fixed(FpType::Any)),
        // Utility
        f(
            "trace",
            Utility,
            t(),
            vec![req("name", string()), opt("projection", FpType::lambda(t(), r()))],
            Fixed(t()),
        ),
        f("now", Utility, FpType::Any, vec![], Fixed(single(FpType::datetime()))),
        f("timeOfDay", Utility, FpType::Any, vec![], Fixed(single(FpType::time()))),
        f("today", Utility, FpType::Any, vec![], Fixed(single(FpType::date()))),
        // Aggregates
        f(
            "aggregate",
            Aggregates,
            t(),
            vec![req("aggregator", FpType::lambda(t(), r())), opt("init", r())],
            Fixed(r()),
        ),
        // FHIR extensions
        f("extension", FhirExtensions, t(), vec![req("url", string())], Collection(FpType::record(["Extension"]))),
        f("hasValue", FhirExtensions, t(), vec![], Fixed(one_boolean())),
        f(
            "getValue",
            FhirExtensions,
            t(),
            vec![],
            Fixed(normalize_choice(
                PrimitiveKind::SYSTEM.into_iter().map(FpType::Primitive).collect(),
            )),
        ),
        // SDC extensions
        f("ordinal", SdcExtensions, t(), vec![], Fixed(decimal())),
        f("sum", SdcExtensions, numeric_or_quantity(), vec![], SingleOfInput),
        f("min", SdcExtensions, numeric_or_quantity(), vec![], SingleOfInput),
        f("max", SdcExtensions, numeric_or_quantity(), vec![], SingleOfInput),
        f("avg", SdcExtensions, numeric_or_quantity(), vec![], SingleOfInput),
    ]
});

/// All standard function signatures in catalog order
pub fn standard_functions() -> &'static [FunctionSignature] {
    &STANDARD_FUNCTIONS
}

/// Look up a standard function by name
pub fn standard_function(name: &str) -> Option<&'static FunctionSignature> {
    STANDARD_FUNCTIONS.iter().find(|f| f.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_are_unique() {
        let mut names: Vec<_> = standard_functions().iter().map(|f| f.name.as_str()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_lookup() {
        let where_fn = standard_function("where").unwrap();
        assert_eq!(where_fn.category, FunctionCategory::FilteringAndProjection);
        assert_eq!(where_fn.required_params(), 1);
        assert!(standard_function("frobnicate").is_none());
    }

    #[test]
    fn test_branches_rule() {
        let iif = standard_function("iif").unwrap();
        let mut bindings = TypeBindings::new();
        bindings.bind("T", FpType::string());
        bindings.bind("F", FpType::integer());

        let without_else = iif.returns.resolve(&FpType::Any, &bindings, &[true, true, false], &iif.params);
        assert_eq!(without_else, FpType::string());

        let with_else = iif.returns.resolve(&FpType::Any, &bindings, &[true, true, true], &iif.params);
        assert_eq!(with_else, FpType::choice(vec![FpType::string(), FpType::integer()]));
    }
}
