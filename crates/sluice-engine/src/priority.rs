//! Priority resolver: does a higher-priority endpoint claim this one's work?

use sluice_core::{resolve_endpoint, ControllerContext, ResourceHandler, ResourceSet};

use crate::directory::Endpoint;

/// Whether `candidate` should stand aside this sub-tick.
///
/// True if some endpoint in `competitors` has strictly higher priority,
/// resolves to a loaded handler, and currently holds at least one resource
/// type that the candidate's handler also holds, with each side's matcher
/// (when set) naming a type present in that side's own contents.
///
/// Comparison is on live handler contents, not on configured filters, so
/// an empty handler never preempts and is never preempted.
pub fn is_preempted<C>(
    candidate: &Endpoint,
    candidate_handler: &dyn ResourceHandler,
    competitors: &[Endpoint],
    ctx: &C,
) -> bool
where
    C: ControllerContext + ?Sized,
{
    let mut ours: Option<ResourceSet> = None;
    competitors
        .iter()
        .filter(|c| c.priority() > candidate.priority())
        .any(|competitor| {
            let Some((_, handler)) = resolve_endpoint(ctx, &competitor.key, &competitor.settings)
            else {
                return false;
            };
            let ours =
                ours.get_or_insert_with(|| candidate_handler.contents(candidate.settings.facing));
            let theirs = handler.contents(competitor.settings.facing);
            contents_overlap(ours, &theirs, candidate, competitor)
        })
}

fn contents_overlap(
    ours: &ResourceSet,
    theirs: &ResourceSet,
    candidate: &Endpoint,
    competitor: &Endpoint,
) -> bool {
    if !ours.iter().any(|t| theirs.contains(t)) {
        return false;
    }
    candidate
        .settings
        .matched_type()
        .is_none_or(|t| ours.contains(&t))
        && competitor
            .settings
            .matched_type()
            .is_none_or(|t| theirs.contains(&t))
}
