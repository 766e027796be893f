//! Cypher text for every probe the Neo4j backend runs.
//!
//! Schema identifiers are always backtick-quoted. Predicate text is spliced
//! in verbatim: it is the user's own condition.

use super::{Direction, SchemaCategory};

/// Quotes a label, type or key as a Cypher identifier.
pub fn escape_name(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Lists every name in a catalog as rows with a single `name` column.
pub fn list_names(category: SchemaCategory) -> &'static str {
    match category {
        SchemaCategory::Label => "CALL db.labels() YIELD label RETURN label AS name",
        SchemaCategory::RelationshipType => {
            "CALL db.relationshipTypes() YIELD relationshipType RETURN relationshipType AS name"
        }
        SchemaCategory::PropertyKey => {
            "CALL db.propertyKeys() YIELD propertyKey RETURN propertyKey AS name"
        }
    }
}

/// Samples a property's type through APOC, one `type` column.
pub fn apoc_value_type(property: &str) -> String {
    let key = escape_name(property);
    format!(
        "MATCH (n) WHERE n.{key} IS NOT NULL RETURN apoc.meta.type(n.{key}) AS type LIMIT 1"
    )
}

/// Samples a property's type with the built-in `valueType()` function.
pub fn builtin_value_type(property: &str) -> String {
    let key = escape_name(property);
    format!("MATCH (n) WHERE n.{key} IS NOT NULL RETURN valueType(n.{key}) AS type LIMIT 1")
}

/// Counts matches of `predicate` with every node bound to `variable`.
pub fn satisfiability(predicate: &str, variable: &str) -> String {
    format!(
        "MATCH (n) WITH n AS {variable} WHERE {predicate} RETURN count({variable}) > 0 AS possible"
    )
}

/// Writes `(:source)-[:rel_type]-(:target)` with the given arrow.
pub fn pattern_text(source: &str, rel_type: &str, target: &str, direction: Direction) -> String {
    let (left, right) = match direction {
        Direction::Forward => ("-", "->"),
        Direction::Backward => ("<-", "-"),
        Direction::Undirected => ("-", "-"),
    };
    format!(
        "(a:{}){left}[:{}]{right}(b:{})",
        escape_name(source),
        escape_name(rel_type),
        escape_name(target)
    )
}

/// Probes for at least one relationship matching the pattern, one `ok` column.
pub fn relationship_exists(
    source: &str,
    rel_type: &str,
    target: &str,
    direction: Direction,
) -> String {
    format!(
        "MATCH {} WITH a LIMIT 1 RETURN count(*) > 0 AS ok",
        pattern_text(source, rel_type, target, direction)
    )
}

/// Finds any two-hop path through a labeled node.
pub fn bridge(source: &str, target: &str) -> String {
    format!(
        "MATCH (a:{})-[r1]-(m)-[r2]-(b:{}) WHERE size(labels(m)) > 0 \
         RETURN labels(m)[0] AS midLabel, type(r1) AS t1, type(r2) AS t2 LIMIT 1",
        escape_name(source),
        escape_name(target)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_backtick_quoted() {
        assert_eq!(escape_name("Person"), "`Person`");
        assert_eq!(escape_name("odd`name"), "`odd``name`");
    }

    #[test]
    fn catalog_queries_alias_to_name() {
        for category in SchemaCategory::ALL {
            assert!(list_names(category).ends_with("AS name"));
        }
    }

    #[test]
    fn direction_probes_follow_the_arrow() {
        assert_eq!(
            relationship_exists("Person", "ACTED_IN", "Movie", Direction::Forward),
            "MATCH (a:`Person`)-[:`ACTED_IN`]->(b:`Movie`) WITH a LIMIT 1 RETURN count(*) > 0 AS ok"
        );
        assert_eq!(
            relationship_exists("Movie", "ACTED_IN", "Person", Direction::Backward),
            "MATCH (a:`Movie`)<-[:`ACTED_IN`]-(b:`Person`) WITH a LIMIT 1 RETURN count(*) > 0 AS ok"
        );
        assert!(
            relationship_exists("A", "R", "B", Direction::Undirected)
                .starts_with("MATCH (a:`A`)-[:`R`]-(b:`B`)")
        );
    }

    #[test]
    fn bridge_requires_labeled_middle() {
        let query = bridge("Person", "Genre");
        assert!(query.starts_with("MATCH (a:`Person`)-[r1]-(m)-[r2]-(b:`Genre`)"));
        assert!(query.contains("size(labels(m)) > 0"));
        assert!(query.ends_with("LIMIT 1"));
    }

    #[test]
    fn type_and_satisfiability_templates() {
        assert_eq!(
            apoc_value_type("year"),
            "MATCH (n) WHERE n.`year` IS NOT NULL RETURN apoc.meta.type(n.`year`) AS type LIMIT 1"
        );
        assert!(builtin_value_type("year").contains("valueType(n.`year`)"));
        assert_eq!(
            satisfiability("m.year > 3000", "m"),
            "MATCH (n) WITH n AS m WHERE m.year > 3000 RETURN count(m) > 0 AS possible"
        );
    }
}
