//! Scalar function definitions, sorted by name.

use super::{FunctionCategory, FunctionDefinition, ParamDef, Signature};

const SCALAR_COMMANDS: &[&str] = &["eval", "where", "row", "sort"];

fn scalar(
    name: &'static str,
    description: &'static str,
    signatures: Vec<Signature>,
) -> FunctionDefinition {
    FunctionDefinition {
        name,
        category: FunctionCategory::Scalar,
        description,
        aliases: &[],
        signatures,
        supported_commands: SCALAR_COMMANDS,
        supported_options: &[],
        ignore_as_suggestion: false,
    }
}

fn unary(param_type: &'static str, return_type: &'static str) -> Vec<Signature> {
    vec![Signature::new(
        vec![ParamDef::new("field", param_type)],
        return_type,
    )]
}

pub fn scalar_functions() -> Vec<FunctionDefinition> {
    let mut defs = vec![
        scalar("abs", "Returns the absolute value.", unary("number", "number")),
        scalar(
            "case",
            "Accepts pairs of conditions and values and returns the value that belongs to the first condition that evaluates to true.",
            vec![Signature::variadic(
                vec![
                    ParamDef::new("condition", "boolean"),
                    ParamDef::new("value", "any"),
                ],
                "any",
                2,
            )],
        ),
        scalar(
            "cidr_match",
            "Returns true if the provided IP is contained in one of the provided CIDR blocks.",
            vec![Signature::variadic(
                vec![ParamDef::new("ip", "ip"), ParamDef::new("cidr_block", "string")],
                "boolean",
                2,
            )],
        ),
        scalar(
            "coalesce",
            "Returns the first non-null value.",
            vec![Signature::variadic(
                vec![ParamDef::new("first", "any")],
                "any",
                1,
            )],
        ),
        scalar(
            "concat",
            "Concatenates two or more strings.",
            vec![Signature::variadic(
                vec![ParamDef::new("first", "string")],
                "string",
                1,
            )],
        ),
        scalar(
            "date_extract",
            "Extracts parts of a date, like year, month, day, hour.",
            vec![Signature::new(
                vec![
                    ParamDef::new("date_part", "chrono_literal"),
                    ParamDef::new("field", "date"),
                ],
                "number",
            )],
        ),
        scalar(
            "date_format",
            "Returns a string representation of a date in the provided format.",
            vec![Signature::new(
                vec![
                    ParamDef::new("field", "date"),
                    ParamDef::optional("format_string", "string"),
                ],
                "string",
            )],
        ),
        scalar(
            "date_parse",
            "Parses a string into a date value.",
            vec![Signature::new(
                vec![
                    ParamDef::new("field", "string"),
                    ParamDef::optional("format_string", "string"),
                ],
                "date",
            )],
        ),
        scalar(
            "date_trunc",
            "Rounds down a date to the closest interval.",
            vec![Signature::new(
                vec![
                    ParamDef::new("time", "time_literal"),
                    ParamDef::new("field", "date"),
                ],
                "date",
            )],
        ),
        scalar("e", "Euler's number.", vec![Signature::new(vec![], "number")]),
        scalar(
            "ends_with",
            "Returns a boolean that indicates whether a keyword string ends with another string.",
            vec![Signature::new(
                vec![
                    ParamDef::new("field", "string"),
                    ParamDef::new("suffix", "string"),
                ],
                "boolean",
            )],
        ),
        scalar(
            "length",
            "Returns the character length of a string.",
            unary("string", "number"),
        ),
        scalar("log10", "Returns the log base 10.", unary("number", "number")),
        scalar(
            "mv_avg",
            "Converts a multivalued field into a single valued field containing the average of all of the values.",
            unary("number[]", "number"),
        ),
        scalar(
            "mv_max",
            "Converts a multivalued field into a single valued field containing the maximum value.",
            unary("number[]", "number"),
        ),
        scalar(
            "mv_min",
            "Converts a multivalued field into a single valued field containing the minimum value.",
            unary("number[]", "number"),
        ),
        scalar(
            "mv_sum",
            "Converts a multivalued field into a single valued field containing the sum of all of the values.",
            unary("number[]", "number"),
        ),
        scalar(
            "pi",
            "The ratio of a circle's circumference to its diameter.",
            vec![Signature::new(vec![], "number")],
        ),
        scalar(
            "pow",
            "Returns the value of a base (first argument) raised to a power (second argument).",
            vec![Signature::new(
                vec![
                    ParamDef::new("field", "number"),
                    ParamDef::new("exponent", "number"),
                ],
                "number",
            )],
        ),
        scalar(
            "replace",
            "Substitutes in the string any match of the regular expression with the replacement string.",
            vec![Signature::new(
                vec![
                    ParamDef::new("field", "string"),
                    ParamDef::new("regexp", "string"),
                    ParamDef::new("replacement", "string"),
                ],
                "string",
            )],
        ),
        scalar(
            "round",
            "Returns a number rounded to the decimal, specified by the closest integer value.",
            vec![Signature::new(
                vec![
                    ParamDef::new("field", "number"),
                    ParamDef::optional("decimals", "number"),
                ],
                "number",
            )],
        ),
        scalar(
            "split",
            "Splits a single valued string into multiple strings.",
            vec![Signature::new(
                vec![
                    ParamDef::new("words", "string"),
                    ParamDef::new("separator", "string"),
                ],
                "string[]",
            )],
        ),
        scalar(
            "starts_with",
            "Returns a boolean that indicates whether a keyword string starts with another string.",
            vec![Signature::new(
                vec![
                    ParamDef::new("field", "string"),
                    ParamDef::new("prefix", "string"),
                ],
                "boolean",
            )],
        ),
        scalar(
            "substring",
            "Returns a substring of a string, specified by a start position and an optional length.",
            vec![Signature::new(
                vec![
                    ParamDef::new("field", "string"),
                    ParamDef::new("start_index", "number"),
                    ParamDef::optional("end_index", "number"),
                ],
                "string",
            )],
        ),
        scalar("tau", "The ratio of a circle's circumference to its radius.", vec![Signature::new(vec![], "number")]),
        scalar("to_boolean", "Converts an input value to a boolean value.", unary("any", "boolean")),
        scalar("to_datetime", "Converts an input value to a date value.", unary("any", "date")),
        scalar("to_degrees", "Converts a number in radians to degrees.", unary("number", "number")),
        scalar("to_double", "Converts an input value to a double value.", unary("any", "number")),
        scalar("to_integer", "Converts an input value to an integer value.", unary("any", "number")),
        scalar("to_ip", "Converts an input string to an IP value.", unary("any", "ip")),
        scalar("to_lower", "Returns a new string representing the input string converted to lower case.", unary("string", "string")),
        scalar("to_radians", "Converts a number in degrees to radians.", unary("number", "number")),
        scalar("to_string", "Converts a field into a string.", unary("any", "string")),
        scalar("to_upper", "Returns a new string representing the input string converted to upper case.", unary("string", "string")),
        scalar(
            "trim",
            "Removes leading and trailing whitespaces from strings.",
            unary("string", "string"),
        ),
    ];
    defs.sort_unstable_by_key(|def| def.name);
    defs
}
