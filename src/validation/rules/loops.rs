//! Rule: no link is reachable from itself through upstream edges.

use crate::graph::{Descend, Topology, Walker};
use crate::store::LinkId;
use crate::validation::error::ValidationError;
use std::convert::Infallible;
use tracing::{debug, info, warn};

/// Checks every declared edge `downstream <- contributor` by walking upstream
/// from the contributor. The edge fails if `downstream` is reached again or if
/// the walk meets an id without a record.
///
/// All edges are checked, including those in components disconnected from any
/// outlet. Once a walk finishes without recurrence, undeclared ids or revisits,
/// every link it touched is known cycle-free and complete, so later walks stop
/// there. This keeps a well-formed network linear without changing which edges
/// fail.
pub(crate) fn check_loops(topology: &Topology) -> Vec<ValidationError> {
    for link in topology.undeclared() {
        warn!(link = %link, "Link {} is referenced as a contributor but not described in the topology", link);
    }

    let mut errors = Vec::new();
    let mut walker = Walker::new(topology);
    let mut clean = vec![false; topology.arena.slot_count()];
    let mut trail: Vec<u32> = Vec::new();
    let mut undeclared: Vec<LinkId> = Vec::new();
    let mut failed_edges = 0usize;

    for (downstream, contributor) in topology.edges() {
        let Some(start) = topology.arena.slot(contributor) else { continue };
        if clean[start as usize] {
            continue;
        }

        trail.clear();
        undeclared.clear();
        let mut recurred = false;

        let stats = walker
            .pre_order::<Infallible, _>(contributor, |step| {
                if clean[step.slot as usize] {
                    return Ok(Descend::Prune);
                }
                trail.push(step.slot);
                if step.link == downstream {
                    recurred = true;
                    return Ok(Descend::Prune);
                }
                if !step.declared {
                    undeclared.push(step.link);
                }
                Ok(Descend::Continue)
            })
            .unwrap_or_default();

        if !recurred && undeclared.is_empty() {
            if stats.revisits == 0 {
                for &slot in &trail {
                    clean[slot as usize] = true;
                }
            }
            continue;
        }

        failed_edges += 1;
        if recurred {
            warn!(link = %downstream, "FAIL: Link {} has a loop (via contributor {})", downstream, contributor);
            errors.push(ValidationError::loop_at(downstream, contributor));
        }
        for &missing in &undeclared {
            warn!(link = %missing, "FAIL: Link {} not described in topology (edge {} <- {})", missing, downstream, contributor);
            errors.push(ValidationError::undeclared(missing, downstream, contributor));
        }
    }

    debug!(clean = clean.iter().filter(|&&c| c).count(), "Loop check memo");
    if errors.is_empty() {
        info!("Looping check: SUCCESS");
    } else {
        info!(failed_edges, "Looping check: FAIL");
    }
    errors
}
