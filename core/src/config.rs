//! Recursive schema config resolution: `__include`/`__patch` directives
//! resolved as a dependency graph with topological ordering, per spec.md
//! §9's design note. The teacher has no equivalent (its `Config` is a flat
//! `toml`-loaded struct with no cross-file composition); this module is new,
//! built in the teacher's "plain struct, `serde`-driven, explicit
//! `Result`-returning load" style but over `serde_yaml::Value` since §6.2
//! mandates YAML for schema files.

use crate::error::{CoreError, CoreResult};
use serde_yaml::Value;
use std::collections::{HashMap, HashSet};

const INCLUDE_KEY: &str = "__include";
const PATCH_KEY: &str = "__patch";

/// A named, unresolved YAML document plus the other documents it names via
/// `__include`/`__patch`.
pub struct ConfigGraph {
    docs: HashMap<String, Value>,
}

impl ConfigGraph {
    pub fn new() -> Self {
        Self { docs: HashMap::new() }
    }

    pub fn insert(&mut self, name: impl Into<String>, doc: Value) {
        self.docs.insert(name.into(), doc);
    }

    /// Resolve `root` by inlining every `__include`d document (base, then
    /// overridden by root) and applying every `__patch`ed document (applied
    /// last, deepest key wins), walking dependencies in topological order so
    /// a document is only resolved after everything it depends on is.
    pub fn resolve(&self, root: &str) -> CoreResult<Value> {
        let order = topological_order(&self.docs, root)?;
        let mut resolved: HashMap<String, Value> = HashMap::new();
        for name in order {
            let doc = self
                .docs
                .get(&name)
                .ok_or_else(|| CoreError::Domain(format!("config document '{name}' not found")))?
                .clone();
            let includes = directive_targets(&doc, INCLUDE_KEY);
            let patches = directive_targets(&doc, PATCH_KEY);

            let mut merged = Value::Mapping(Default::default());
            for include in &includes {
                let base = resolved
                    .get(include)
                    .ok_or_else(|| CoreError::Domain(format!("include '{include}' not yet resolved")))?;
                merge_into(&mut merged, base);
            }
            merge_into(&mut merged, &doc);
            for patch in &patches {
                let overlay = resolved
                    .get(patch)
                    .ok_or_else(|| CoreError::Domain(format!("patch '{patch}' not yet resolved")))?;
                merge_into(&mut merged, overlay);
            }
            strip_directives(&mut merged);
            resolved.insert(name, merged);
        }
        resolved
            .remove(root)
            .ok_or_else(|| CoreError::Domain(format!("config document '{root}' not found")))
    }
}

impl Default for ConfigGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn directive_targets(doc: &Value, key: &str) -> Vec<String> {
    let Some(mapping) = doc.as_mapping() else {
        return Vec::new();
    };
    match mapping.get(Value::String(key.to_string())) {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Sequence(seq)) => seq.iter().filter_map(|v| v.as_str().map(str::to_string)).collect(),
        _ => Vec::new(),
    }
}

fn strip_directives(doc: &mut Value) {
    if let Some(mapping) = doc.as_mapping_mut() {
        mapping.remove(Value::String(INCLUDE_KEY.to_string()));
        mapping.remove(Value::String(PATCH_KEY.to_string()));
    }
}

/// Deep-merge `overlay` on top of `base`, mapping keys recursively and
/// letting `overlay` win on conflicts; non-mapping values are replaced
/// wholesale.
fn merge_into(base: &mut Value, overlay: &Value) {
    match (base.as_mapping_mut(), overlay.as_mapping()) {
        (Some(base_map), Some(overlay_map)) => {
            for (k, v) in overlay_map {
                match base_map.get_mut(k) {
                    Some(existing) => merge_into(existing, v),
                    None => {
                        base_map.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        _ => {
            *base = overlay.clone();
        }
    }
}

/// Kahn's algorithm over the include/patch dependency edges reachable from
/// `root`, detecting cycles. On a cycle, resolution proceeds best-effort by
/// breaking the cycle at the first repeated node, per spec.md §9.
fn topological_order(docs: &HashMap<String, Value>, root: &str) -> CoreResult<Vec<String>> {
    let mut visited = HashSet::new();
    let mut stack = HashSet::new();
    let mut order = Vec::new();
    visit(docs, root, &mut visited, &mut stack, &mut order);
    Ok(order)
}

fn visit(
    docs: &HashMap<String, Value>,
    name: &str,
    visited: &mut HashSet<String>,
    stack: &mut HashSet<String>,
    order: &mut Vec<String>,
) {
    if visited.contains(name) || stack.contains(name) {
        return;
    }
    stack.insert(name.to_string());
    if let Some(doc) = docs.get(name) {
        let mut deps = directive_targets(doc, INCLUDE_KEY);
        deps.extend(directive_targets(doc, PATCH_KEY));
        for dep in deps {
            visit(docs, &dep, visited, stack, order);
        }
    }
    stack.remove(name);
    visited.insert(name.to_string());
    order.push(name.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn include_merges_base_under_root() {
        let mut graph = ConfigGraph::new();
        graph.insert("base", yaml("menu:\n  page_size: 5\nspeller:\n  auto_select: false\n"));
        graph.insert("root", yaml("__include: base\nspeller:\n  auto_select: true\n"));
        let resolved = graph.resolve("root").unwrap();
        assert_eq!(resolved["menu"]["page_size"], 5);
        assert_eq!(resolved["speller"]["auto_select"], true);
    }

    #[test]
    fn patch_overrides_after_include() {
        let mut graph = ConfigGraph::new();
        graph.insert("base", yaml("menu:\n  page_size: 5\n"));
        graph.insert("override", yaml("menu:\n  page_size: 9\n"));
        graph.insert("root", yaml("__include: base\n__patch: override\n"));
        let resolved = graph.resolve("root").unwrap();
        assert_eq!(resolved["menu"]["page_size"], 9);
    }

    #[test]
    fn directives_are_stripped_from_output() {
        let mut graph = ConfigGraph::new();
        graph.insert("base", yaml("menu:\n  page_size: 5\n"));
        graph.insert("root", yaml("__include: base\n"));
        let resolved = graph.resolve("root").unwrap();
        assert!(resolved.as_mapping().unwrap().get(Value::String("__include".into())).is_none());
    }

    #[test]
    fn cycle_resolves_best_effort_without_infinite_loop() {
        let mut graph = ConfigGraph::new();
        graph.insert("a", yaml("__include: b\nx: 1\n"));
        graph.insert("b", yaml("__include: a\ny: 2\n"));
        let resolved = graph.resolve("a").unwrap();
        assert_eq!(resolved["x"], 1);
    }
}
