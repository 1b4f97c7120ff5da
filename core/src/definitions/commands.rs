//! Pipeline command definitions.

use super::CommandDefinition;

const fn command(
    name: &'static str,
    description: &'static str,
    source_command: bool,
    options: &'static [&'static str],
) -> CommandDefinition {
    CommandDefinition {
        name,
        description,
        alias: None,
        source_command,
        options,
    }
}

pub fn command_definitions() -> Vec<CommandDefinition> {
    vec![
        command(
            "row",
            "Produces a row with one or more columns with values that you specify.",
            true,
            &[],
        ),
        command("from", "Retrieves data from one or more data streams, indices, or aliases.", true, &["metadata"]),
        command("show", "Returns information about the deployment and its capabilities.", true, &[]),
        command("stats", "Calculates aggregate statistics, such as average, count, and sum, over the incoming search results set.", false, &["by"]),
        command("eval", "Calculates an expression and puts the resulting value into a search results field.", false, &[]),
        command("enrich", "Enrich table with another table.", false, &["on", "with"]),
        command("keep", "Rearranges fields in the input table by applying the keep clauses in fields.", false, &[]),
        command("drop", "Drops columns.", false, &[]),
        command(
            "rename",
            "Renames an old column to a new one.",
            false,
            &["as"],
        ),
        command("limit", "Returns the first search results, in search order, based on the limit specified.", false, &[]),
        command(
            "sort",
            "Sorts all results by the specified fields.",
            false,
            &[],
        ),
        command(
            "where",
            "Uses a boolean expression to keep only the rows that evaluate it to true.",
            false,
            &[],
        ),
        command(
            "dissect",
            "Extracts multiple string values from a single string input, based on a pattern.",
            false,
            &["append_separator"],
        ),
        command(
            "grok",
            "Extracts multiple string values from a single string input, based on a pattern.",
            false,
            &[],
        ),
        command("mv_expand", "Expands multivalued fields into one row per value, duplicating other fields.", false, &[]),
    ]
}
