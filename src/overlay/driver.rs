use std::path::PathBuf;

use crate::compare::image_diff::{self, ComparisonResult};
use crate::config::SweepPolicy;
use crate::context::RunContext;
use crate::foundation::core::ResourceId;
use crate::foundation::error::{HarnessError, HarnessResult, OverlayFailure, OverlayFailures};
use crate::overlay::catalog::{OverlayCatalog, OverlayDescriptor, OverlayKind, OverlaySource};
use crate::replay::{ReplayController, ReplayOutput, TextureDisplay, TextureSave};

/// A saved candidate image judged against its reference.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ImageCheck {
    pub candidate: PathBuf,
    pub reference: PathBuf,
    pub result: ComparisonResult,
    /// Diff visualisation, written only for mismatches when enabled.
    pub diff: Option<PathBuf>,
}

impl ImageCheck {
    pub fn passed(&self) -> bool {
        self.result.equal
    }
}

/// Save `save.resource` as `file_name` in the scratch namespace and compare it to the stored
/// reference of the same name.
///
/// A mismatch is not an error here; callers decide how to report it. Save, reference and decode
/// failures are.
pub fn check_image<R: ReplayController + ?Sized>(
    replay: &mut R,
    ctx: &RunContext,
    save: &TextureSave,
    file_name: &str,
    tolerance: u8,
) -> HarnessResult<ImageCheck> {
    let candidate = ctx.candidate_path(file_name);
    replay.save_texture(save, &candidate)?;

    let reference = ctx.references().resolve(file_name)?;
    tracing::debug!(
        candidate = %candidate.display(),
        reference = %reference.display(),
        resource = %save.resource,
        "comparing"
    );
    let result = image_diff::compare(&candidate, &reference, tolerance)?;

    if !result.equal {
        ctx.mark_failed();
    }

    let mut diff = None;
    if !result.equal && ctx.config().write_diff_images {
        let out = ctx.diff_path(file_name);
        match image_diff::write_diff_image(&candidate, &reference, tolerance, &out) {
            Ok(()) => diff = Some(out),
            Err(e) => tracing::warn!("could not write diff image for {file_name}: {e}"),
        }
    }

    Ok(ImageCheck {
        candidate,
        reference,
        result,
        diff,
    })
}

/// Result of comparing one overlay against its reference.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ComparisonOutcome {
    pub overlay: OverlayKind,
    pub display_name: &'static str,
    /// Texture that was saved: the overlay output, or the base target for in-place overlays.
    pub source: ResourceId,
    pub check: ImageCheck,
}

impl ComparisonOutcome {
    pub fn passed(&self) -> bool {
        self.check.passed()
    }

    pub fn to_failure(&self) -> OverlayFailure {
        OverlayFailure {
            overlay: self.display_name.to_string(),
            candidate: self.check.candidate.clone(),
            reference: self.check.reference.clone(),
            diff: self.check.diff.clone(),
        }
    }

    pub fn to_error(&self) -> HarnessError {
        HarnessError::OverlayMismatch {
            overlay: self.display_name.to_string(),
            candidate: self.check.candidate.clone(),
            reference: self.check.reference.clone(),
            diff: self.check.diff.clone(),
        }
    }
}

/// Compute, save and compare one overlay over `base_target`.
pub fn validate_overlay<R: ReplayController>(
    replay: &mut R,
    output: &mut R::Output,
    base_target: ResourceId,
    desc: &OverlayDescriptor,
    ctx: &RunContext,
) -> HarnessResult<ComparisonOutcome> {
    output.set_texture_display(&TextureDisplay {
        resource: base_target,
        overlay: desc.kind,
    })?;
    let overlay_tex = output.compute_overlay()?;

    let source = match desc.source {
        OverlaySource::OverlayOutput => overlay_tex,
        OverlaySource::BaseTarget => base_target,
    };
    let save = TextureSave::png(source).with_range(desc.range);

    let check = check_image(
        replay,
        ctx,
        &save,
        &desc.image_file_name(),
        ctx.config().overlay_tolerance,
    )?;

    Ok(ComparisonOutcome {
        overlay: desc.kind,
        display_name: desc.display_name,
        source,
        check,
    })
}

/// Run every non-excluded catalog entry in order and collect the outcomes.
///
/// Mismatches are recorded, not raised. Under [`SweepPolicy::AbortOnFirst`] the sweep stops
/// right after the first failing outcome; under [`SweepPolicy::CollectAll`] it drains the
/// catalog. Infrastructure failures (save, missing reference, decode) abort immediately.
#[tracing::instrument(skip_all, fields(base = %base_target, policy = ?policy))]
pub fn sweep<R: ReplayController>(
    replay: &mut R,
    output: &mut R::Output,
    base_target: ResourceId,
    catalog: &OverlayCatalog,
    ctx: &RunContext,
    policy: SweepPolicy,
) -> HarnessResult<Vec<ComparisonOutcome>> {
    let mut outcomes = Vec::new();

    for desc in catalog.entries() {
        if let Some(why) = desc.exclusion {
            tracing::debug!(overlay = desc.display_name, ?why, "skipping overlay");
            continue;
        }

        let outcome = validate_overlay(replay, output, base_target, desc, ctx)?;
        if outcome.passed() {
            tracing::info!(
                "reference and output image are identical for {}",
                desc.display_name
            );
        } else {
            tracing::error!(
                overlay = desc.display_name,
                candidate = %outcome.check.candidate.display(),
                reference = %outcome.check.reference.display(),
                first_mismatch = ?outcome.check.result.first_mismatch,
                "reference and output image differ"
            );
        }

        let failed = !outcome.passed();
        outcomes.push(outcome);
        if failed && policy == SweepPolicy::AbortOnFirst {
            break;
        }
    }

    Ok(outcomes)
}

/// Validate the whole catalog.
///
/// A single failing overlay is reported as [`HarnessError::OverlayMismatch`]. When the policy
/// lets the sweep drain the catalog and more than one overlay fails, every failure is carried in
/// [`HarnessError::OverlayMismatches`].
pub fn validate_all<R: ReplayController>(
    replay: &mut R,
    output: &mut R::Output,
    base_target: ResourceId,
    catalog: &OverlayCatalog,
    ctx: &RunContext,
) -> HarnessResult<Vec<ComparisonOutcome>> {
    let outcomes = sweep(
        replay,
        output,
        base_target,
        catalog,
        ctx,
        ctx.config().sweep_policy,
    )?;

    let mut failures: Vec<OverlayFailure> = outcomes
        .iter()
        .filter(|o| !o.passed())
        .map(ComparisonOutcome::to_failure)
        .collect();
    match failures.len() {
        0 => Ok(outcomes),
        1 => {
            let OverlayFailure {
                overlay,
                candidate,
                reference,
                diff,
            } = failures.remove(0);
            Err(HarnessError::OverlayMismatch {
                overlay,
                candidate,
                reference,
                diff,
            })
        }
        _ => Err(HarnessError::OverlayMismatches(OverlayFailures(failures))),
    }
}
