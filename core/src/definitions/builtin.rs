//! Operator definitions: arithmetic, comparison, logic, pattern tests, and
//! the assignment pseudo-function.

use super::{FunctionCategory, FunctionDefinition, ParamDef, Signature};

const EXPRESSION_COMMANDS: &[&str] = &["eval", "stats", "where", "sort"];

fn math_definition(name: &'static str, date_math: bool) -> FunctionDefinition {
    let mut signatures = vec![Signature::new(
        vec![ParamDef::new("left", "number"), ParamDef::new("right", "number")],
        "number",
    )];
    if date_math {
        signatures.push(Signature::new(
            vec![ParamDef::new("left", "date"), ParamDef::new("right", "date")],
            "date",
        ));
        signatures.push(Signature::new(
            vec![
                ParamDef::new("left", "date"),
                ParamDef::new("right", "time_literal"),
            ],
            "date",
        ));
        signatures.push(Signature::new(
            vec![
                ParamDef::new("left", "time_literal"),
                ParamDef::new("right", "date"),
            ],
            "date",
        ));
    }
    FunctionDefinition {
        name,
        category: FunctionCategory::Operator,
        description: "",
        aliases: &[],
        signatures,
        supported_commands: EXPRESSION_COMMANDS,
        supported_options: &["by"],
        ignore_as_suggestion: false,
    }
}

fn comparison_definition(name: &'static str) -> FunctionDefinition {
    FunctionDefinition {
        name,
        category: FunctionCategory::Operator,
        description: "",
        aliases: &[],
        signatures: vec![
            Signature::new(
                vec![ParamDef::new("left", "number"), ParamDef::new("right", "number")],
                "boolean",
            ),
            Signature::new(
                vec![ParamDef::new("left", "string"), ParamDef::new("right", "string")],
                "boolean",
            ),
            Signature::new(
                vec![ParamDef::new("left", "date"), ParamDef::new("right", "date")],
                "boolean",
            ),
        ],
        supported_commands: EXPRESSION_COMMANDS,
        supported_options: &["by"],
        ignore_as_suggestion: false,
    }
}

fn regex_definition(name: &'static str) -> FunctionDefinition {
    FunctionDefinition {
        name,
        category: FunctionCategory::Operator,
        description: "",
        aliases: &[],
        signatures: vec![Signature::new(
            vec![ParamDef::new("left", "string"), ParamDef::new("right", "string")],
            "boolean",
        )],
        supported_commands: EXPRESSION_COMMANDS,
        supported_options: &[],
        ignore_as_suggestion: false,
    }
}

fn in_definition(name: &'static str) -> FunctionDefinition {
    let element_types: &[(&str, &str)] = &[
        ("number", "number[]"),
        ("string", "string[]"),
        ("boolean", "boolean[]"),
        ("date", "date[]"),
    ];
    FunctionDefinition {
        name,
        category: FunctionCategory::Operator,
        description: "",
        aliases: &[],
        signatures: element_types
            .iter()
            .map(|(left, right)| {
                Signature::new(
                    vec![ParamDef::new("left", left), ParamDef::new("right", right)],
                    "boolean",
                )
            })
            .collect(),
        supported_commands: EXPRESSION_COMMANDS,
        supported_options: &[],
        ignore_as_suggestion: false,
    }
}

fn logic_definition(name: &'static str) -> FunctionDefinition {
    FunctionDefinition {
        name,
        category: FunctionCategory::Operator,
        description: "",
        aliases: &[],
        signatures: vec![Signature::new(
            vec![
                ParamDef::new("left", "boolean"),
                ParamDef::new("right", "boolean"),
            ],
            "boolean",
        )],
        supported_commands: EXPRESSION_COMMANDS,
        supported_options: &[],
        ignore_as_suggestion: false,
    }
}

fn null_test_definition(name: &'static str) -> FunctionDefinition {
    FunctionDefinition {
        name,
        category: FunctionCategory::Operator,
        description: "",
        aliases: &[],
        signatures: vec![Signature::new(vec![ParamDef::new("expression", "any")], "boolean")],
        supported_commands: EXPRESSION_COMMANDS,
        supported_options: &[],
        ignore_as_suggestion: true,
    }
}

pub fn builtin_functions() -> Vec<FunctionDefinition> {
    let mut defs = vec![
        math_definition("+", true),
        math_definition("-", true),
        math_definition("*", false),
        math_definition("/", false),
        math_definition("%", false),
    ];
    defs.extend(["==", "!=", "<", "<=", ">", ">="].map(comparison_definition));
    defs.extend(["like", "not_like", "rlike", "not_rlike"].map(regex_definition));
    defs.extend(["in", "not_in"].map(in_definition));
    defs.extend(["and", "or"].map(logic_definition));
    defs.push(FunctionDefinition {
        name: "not",
        category: FunctionCategory::Operator,
        description: "",
        aliases: &[],
        signatures: vec![Signature::new(
            vec![ParamDef::new("expression", "boolean")],
            "boolean",
        )],
        supported_commands: EXPRESSION_COMMANDS,
        supported_options: &[],
        ignore_as_suggestion: false,
    });
    defs.extend(["is_null", "not_is_null"].map(null_test_definition));
    defs.push(FunctionDefinition {
        name: "=",
        category: FunctionCategory::Operator,
        description: "Assign (=)",
        aliases: &[],
        signatures: vec![Signature::new(
            vec![ParamDef::new("left", "any"), ParamDef::new("right", "any")],
            "void",
        )],
        supported_commands: &["eval", "stats", "row", "dissect", "where", "enrich"],
        supported_options: &[],
        ignore_as_suggestion: true,
    });
    // `show` pseudo-functions
    for name in ["info", "functions"] {
        defs.push(FunctionDefinition {
            name,
            category: FunctionCategory::Operator,
            description: "",
            aliases: &[],
            signatures: vec![Signature::new(vec![], "void")],
            supported_commands: &["show"],
            supported_options: &[],
            ignore_as_suggestion: true,
        });
    }
    defs
}
