use crate::resolve::Report;

pub fn generate_dependency_report(report: &Report) -> String {
    let resolution = &report.resolution;
    let mut output = String::new();

    output.push_str("# Dependency report\n\n");
    output.push_str(&format!(
        "Root: `{}` | Units: {} | Stages: {} | Input: `{}`\n\n",
        report.root.display(),
        resolution.units.len(),
        resolution.order.stages.len(),
        report.input_digest
    ));

    if resolution.units.is_empty() {
        output.push_str("*No compilation units found.*\n");
        return output;
    }

    for id in resolution.order.flatten() {
        let unit = resolution.unit(id);
        output.push_str(&format!("## `{}`\n\n", unit.relative_path));

        if let Some(stage) = resolution.order.stage_of(id) {
            output.push_str(&format!("**Stage:** {}", stage + 1));
            if let Some(cycle) = resolution.cycles.iter().find(|c| c.members.contains(&id)) {
                output.push_str(&format!(" ({})", cycle.name));
            }
            output.push_str("\n\n");
        }

        if !unit.defines.is_empty() {
            let defines: Vec<&str> = unit.defines.iter().map(|s| s.as_str()).collect();
            output.push_str("**Defines:** ");
            output.push_str(&defines.join(", "));
            output.push_str("\n\n");
        }

        if unit.requires.is_empty() {
            output.push_str("**Requires:** (none)\n\n");
        } else {
            output.push_str("**Requires:**\n\n");
            for name in &unit.requires {
                match resolution.provider_of(id, name) {
                    Some(provider) if provider == id => {
                        output.push_str(&format!("- {} (self)\n", name));
                    }
                    Some(provider) => output.push_str(&format!(
                        "- {} from `{}`\n",
                        name,
                        resolution.unit(provider).relative_path
                    )),
                    None => output.push_str(&format!("- {} **unresolved**\n", name)),
                }
            }
            output.push('\n');
        }

        let dependents = resolution.graph.dependents(id);
        if dependents.is_empty() {
            output.push_str("**Required by:** (none)\n\n");
        } else {
            let names: Vec<String> = dependents
                .iter()
                .map(|&d| format!("`{}`", resolution.unit(d).relative_path))
                .collect();
            output.push_str("**Required by:** ");
            output.push_str(&names.join(", "));
            output.push_str("\n\n");
        }

        output.push_str("---\n\n");
    }

    let diagnostics = report.diagnostics();
    if !diagnostics.is_empty() {
        output.push_str("## Diagnostics\n\n");
        for cycle in &diagnostics.cycles {
            let members: Vec<String> = cycle
                .members
                .iter()
                .map(|p| format!("`{}`", p.display()))
                .collect();
            output.push_str(&format!("- {}: {}\n", cycle.name, members.join(", ")));
        }
        for missing in &diagnostics.unresolved {
            output.push_str(&format!(
                "- unresolved: `{}` requires {}\n",
                missing.path.display(),
                missing.symbol
            ));
        }
        for ambiguous in &diagnostics.ambiguous {
            output.push_str(&format!(
                "- ambiguous: {} defined by {} units, using `{}`\n",
                ambiguous.symbol,
                ambiguous.rejected.len() + 1,
                ambiguous.chosen.display()
            ));
        }
        for failure in &diagnostics.decode_errors {
            output.push_str(&format!(
                "- excluded: `{}` ({})\n",
                failure.path.display(),
                failure.reason
            ));
        }
    }

    output
}
