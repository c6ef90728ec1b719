//! Plan preview rendering for dry-run display.

use std::fmt::Write as _;

use super::InstallationPlan;

impl InstallationPlan {
    /// Renders the plan as deterministic multi-line text: header totals,
    /// plan-wide conflicts, then one block per step with its action,
    /// size, target, dependencies, and inline findings.
    #[must_use]
    pub fn preview(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Installation Plan");
        let _ = writeln!(out, "=================");
        let _ = writeln!(out, "Configurations: {}", self.total_configs);
        let _ = writeln!(out, "Total size: {}", format_size(self.total_size));
        let _ = writeln!(out, "Estimated time: {}s", self.estimated_seconds);
        let _ = writeln!(out, "Platform: {}", self.platform);
        if self.dry_run {
            let _ = writeln!(out, "Mode: dry run");
        }

        if !self.conflicts.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Conflicts:");
            for conflict in &self.conflicts {
                let _ = writeln!(out, "  - {conflict}");
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Steps:");
        for (index, step) in self.steps.iter().enumerate() {
            let optional = if step.is_optional { " (optional)" } else { "" };
            let _ = writeln!(
                out,
                "  {}. [{}] {}{} -> {} ({})",
                index + 1,
                step.action,
                step.config_id,
                optional,
                step.target_path.display(),
                format_size(step.file_size)
            );
            if !step.dependencies.is_empty() {
                let _ = writeln!(out, "     depends on: {}", step.dependencies.join(", "));
            }
            for finding in &step.conflicts {
                let _ = writeln!(out, "     ! {finding}");
            }
        }

        out
    }
}

fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}
