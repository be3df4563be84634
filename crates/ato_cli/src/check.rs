//! `ato check`: resolve a build and report the outcome.

use crate::pipeline::{run_build, Outcome};
use crate::{CheckArgs, GlobalArgs};

/// Summary of a successful build.
struct Summary {
    entry: String,
    instances: usize,
    links: usize,
}

/// Runs the `ato check` command.
///
/// Returns exit code 0 if the build resolves, 1 otherwise.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let outcome = run_build(global, args.build.as_deref(), |front, instance| Summary {
        entry: front.render_addr(&instance.address),
        instances: instance.subtree_len(),
        links: count_links(instance),
    })?;

    match outcome {
        Outcome::Built(summary) => {
            if !global.quiet {
                eprintln!(
                    "   Resolved {}: {} instance(s), {} link(s)",
                    summary.entry, summary.instances, summary.links
                );
            }
            Ok(0)
        }
        Outcome::Failed => Ok(1),
    }
}

fn count_links(instance: &ato_front::Instance) -> usize {
    instance.links.len() + instance.children.values().map(count_links).sum::<usize>()
}
