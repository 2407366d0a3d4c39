use crate::resolve::Report;

/// One absolute path per line, in compile order.
pub fn render_flat(report: &Report) -> String {
    let mut output = String::new();
    for path in report.resolution.ordered_paths() {
        output.push_str(&path.display().to_string());
        output.push('\n');
    }
    output
}

/// Stages separated by `# stage N` lines; cycle groups get a `# cycle-N` line.
pub fn render_stages(report: &Report) -> String {
    let resolution = &report.resolution;
    let mut output = String::new();

    for (n, stage) in resolution.order.stages.iter().enumerate() {
        output.push_str(&format!("# stage {}\n", n + 1));
        for group in &stage.groups {
            if let Some(cycle) = group.cycle {
                output.push_str(&format!("# {}\n", resolution.cycles[cycle].name));
            }
            for &id in &group.units {
                output.push_str(&resolution.unit(id).path.display().to_string());
                output.push('\n');
            }
        }
    }

    output
}
