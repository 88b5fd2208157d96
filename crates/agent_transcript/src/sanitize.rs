use crate::agent::AgentKind;

const TRACE_WARNINGS_HINT: &str =
    "(Use `node --trace-warnings ...` to show where the warning was created)";

/// Drops known noise lines from a CLI agent's output; `None` means "drop this line".
///
/// Only Codex is filtered, and only for exact Node.js warning shapes it prints when run on
/// older dependencies. Everything else passes through untouched.
pub fn sanitize_cli_output_line(agent: &str, line: &str) -> Option<String> {
    if AgentKind::from_name(agent) != Some(AgentKind::Codex) {
        return Some(line.to_string());
    }

    if is_known_node_warning(line.trim()) {
        return None;
    }

    Some(line.to_string())
}

fn is_known_node_warning(trimmed: &str) -> bool {
    trimmed == TRACE_WARNINGS_HINT
        || (trimmed.starts_with("(node:")
            && trimmed.ends_with("inside circular dependency")
            && (trimmed.contains("Warning: Accessing non-existent property 'lineno'")
                || trimmed.contains("Warning: Accessing non-existent property 'filename'")))
}
