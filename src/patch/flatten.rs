use serde_json::Value;

/// Flattens a payload into `(dotted_path, leaf)` pairs. Mapping values
/// descend; everything else, arrays included, is a leaf handed whole to its
/// target. A non-mapping root flattens to nothing: there are no field names
/// to address.
pub fn flatten(root: &Value) -> Vec<(String, &Value)> {
    let mut out = Vec::new();
    if let Value::Object(map) = root {
        for (key, value) in map {
            walk(key.clone(), value, &mut out);
        }
    }
    out
}

fn walk<'a>(path: String, value: &'a Value, out: &mut Vec<(String, &'a Value)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                walk(format!("{}.{}", path, key), child, out);
            }
        }
        _ => out.push((path, value)),
    }
}
