//! Aggregation function definitions. Only legal in grouping stages.

use super::{FunctionCategory, FunctionDefinition, ParamDef, Signature};

fn aggregation(
    name: &'static str,
    description: &'static str,
    signatures: Vec<Signature>,
) -> FunctionDefinition {
    FunctionDefinition {
        name,
        category: FunctionCategory::Aggregation,
        description,
        aliases: &[],
        signatures,
        supported_commands: &["stats"],
        supported_options: &[],
        ignore_as_suggestion: false,
    }
}

fn numeric_agg() -> Vec<Signature> {
    vec![Signature::new(vec![ParamDef::new("column", "number")], "number")]
}

pub fn aggregation_functions() -> Vec<FunctionDefinition> {
    vec![
        aggregation("avg", "Returns the average of the values in a field.", numeric_agg()),
        aggregation(
            "count",
            "Returns the count of the values in a field.",
            vec![Signature::new(vec![ParamDef::optional("column", "any")], "number")],
        ),
        aggregation(
            "count_distinct",
            "Returns the count of distinct values in a field.",
            vec![Signature::new(vec![ParamDef::new("column", "any")], "number")],
        ),
        aggregation("max", "Returns the maximum value in a field.", numeric_agg()),
        aggregation(
            "median",
            "Returns the 50% percentile of the values in a field.",
            numeric_agg(),
        ),
        aggregation(
            "median_absolute_deviation",
            "Returns the median of each data point's deviation from the median of the entire sample.",
            numeric_agg(),
        ),
        aggregation("min", "Returns the minimum value in a field.", numeric_agg()),
        aggregation(
            "percentile",
            "Returns the n percentile of the values in a field.",
            vec![Signature::new(
                vec![
                    ParamDef::new("column", "number"),
                    ParamDef::new("percentile", "number"),
                ],
                "number",
            )],
        ),
        aggregation("sum", "Returns the sum of the values in a field.", numeric_agg()),
    ]
}
