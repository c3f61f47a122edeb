use std::borrow::Cow;

use crate::context::RunContext;
use crate::foundation::core::ResourceId;
use crate::foundation::error::{HarnessError, HarnessResult};
use crate::oracle::pixel::{ExpectedPixel, check_pixel};
use crate::overlay::catalog::{self, OverlayCatalog, OverlaySource};
use crate::overlay::driver::{self, ImageCheck};
use crate::replay::{
    OutputType, ReplayController, ReplayOutput, TextureDisplay, TextureSave, WindowSpec,
};
use crate::scenario::baseline::{self, BASELINE_PIXELS, ChannelCheck};
use crate::scenario::report::{ChannelRecord, PixelRecord, ScenarioReport, Stage};

/// Output surface that is shut down on every exit path.
///
/// [`ScopedOutput::release`] shuts down explicitly and reports the error; otherwise dropping the
/// guard shuts down and only logs.
pub struct ScopedOutput<O: ReplayOutput> {
    output: O,
    released: bool,
}

impl<O: ReplayOutput> ScopedOutput<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            released: false,
        }
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    pub fn release(mut self) -> HarnessResult<()> {
        self.released = true;
        self.output.shutdown()
    }
}

impl<O: ReplayOutput> Drop for ScopedOutput<O> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.output.shutdown() {
            tracing::warn!("output shutdown failed while unwinding: {e}");
        }
    }
}

struct Targets {
    color: ResourceId,
    depth: ResourceId,
}

/// Drives one overlay scenario against a replay engine.
///
/// Stages run `Init -> BaselineChecks -> OverlaySweep -> ChannelChecks -> CombinedCheck -> Done`;
/// the first failure ends the run and is returned as is.
pub struct ScenarioRunner<'a> {
    ctx: &'a RunContext,
    catalog: OverlayCatalog,
    baseline: Cow<'static, [ExpectedPixel]>,
    stage: Stage,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(ctx: &'a RunContext) -> Self {
        Self {
            ctx,
            catalog: OverlayCatalog::standard(),
            baseline: Cow::Borrowed(&BASELINE_PIXELS),
            stage: Stage::Init,
        }
    }

    pub fn with_catalog(mut self, catalog: OverlayCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_baseline(mut self, baseline: Vec<ExpectedPixel>) -> Self {
        self.baseline = Cow::Owned(baseline);
        self
    }

    /// Stage reached so far; after a failure, the stage that failed.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[tracing::instrument(skip_all, fields(marker = %self.ctx.config().marker))]
    pub fn run<R: ReplayController>(&mut self, replay: &mut R) -> HarnessResult<ScenarioReport> {
        self.stage = Stage::Init;
        let mut report = ScenarioReport::new(self.ctx.scratch_dir().to_path_buf());

        match self.run_stages(replay, &mut report) {
            Ok(()) => {
                report.stage = Stage::Done;
                tracing::info!(
                    pixel_checks = report.pixels.len(),
                    image_checks = report.image_checks(),
                    "scenario passed"
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!(stage = ?self.stage, "scenario failed: {e}");
                Err(e)
            }
        }
    }

    fn enter(&mut self, stage: Stage, report: &mut ScenarioReport) {
        debug_assert!(stage > self.stage);
        tracing::debug!(?stage, "entering stage");
        self.stage = stage;
        report.stage = stage;
    }

    fn run_stages<R: ReplayController>(
        &mut self,
        replay: &mut R,
        report: &mut ScenarioReport,
    ) -> HarnessResult<()> {
        let window = WindowSpec::Headless(self.ctx.config().output_size);
        let output = replay.create_output(window, OutputType::Texture)?;
        let mut output = ScopedOutput::new(output);
        let targets = self.init(replay)?;

        self.enter(Stage::BaselineChecks, report);
        for expected in self.baseline.iter() {
            let actual = check_pixel(replay, targets.color, expected)?;
            report.pixels.push(PixelRecord {
                check: *expected,
                actual,
            });
        }

        self.enter(Stage::OverlaySweep, report);
        report.overlays = driver::validate_all(
            replay,
            output.output_mut(),
            targets.color,
            &self.catalog,
            self.ctx,
        )?;

        self.enter(Stage::ChannelChecks, report);
        for check in [baseline::DEPTH, baseline::STENCIL] {
            let image = self.check_channel(replay, targets.depth, check)?;
            report.channels.push(ChannelRecord {
                name: check.name,
                channel: check.channel,
                check: image,
            });
        }

        self.enter(Stage::CombinedCheck, report);
        report.combined = Some(self.check_combined(replay, output.output_mut(), targets.depth)?);

        self.enter(Stage::Done, report);
        output.release()
    }

    fn init<R: ReplayController>(&self, replay: &mut R) -> HarnessResult<Targets> {
        let marker = &self.ctx.config().marker;
        let action = replay
            .find_action(marker)
            .ok_or_else(|| HarnessError::replay(format!("marker action '{marker}' not found")))?;
        let next = action.next.ok_or_else(|| {
            HarnessError::replay(format!("marker action '{marker}' has no following action"))
        })?;
        replay.set_frame_event(next)?;

        let pipe = replay.pipeline_state()?;
        let color = pipe
            .color_targets
            .first()
            .copied()
            .filter(|id| !id.is_null())
            .ok_or_else(|| HarnessError::replay("pipeline has no color target bound"))?;
        let depth = pipe
            .depth_target
            .filter(|id| !id.is_null())
            .ok_or_else(|| HarnessError::replay("pipeline has no depth target bound"))?;

        tracing::debug!(event = next.0, %color, %depth, "frame position set");
        Ok(Targets { color, depth })
    }

    fn check_channel<R: ReplayController>(
        &self,
        replay: &mut R,
        depth: ResourceId,
        check: ChannelCheck,
    ) -> HarnessResult<ImageCheck> {
        let save = TextureSave::png(depth).with_channel(check.channel);
        let image = driver::check_image(
            replay,
            self.ctx,
            &save,
            &check.image_file_name(),
            self.ctx.config().channel_tolerance,
        )?;

        if !image.passed() {
            return Err(HarnessError::ImageMismatch {
                check: check.name.to_string(),
                candidate: image.candidate,
                reference: image.reference,
                diff: image.diff,
            });
        }
        tracing::info!("reference and output image are identical for {}", check.name);
        Ok(image)
    }

    /// Clear-before-draw over the depth target, which the color-target sweep never exercises.
    ///
    /// Range and source come from the runner's catalog, falling back to the standard table when
    /// the catalog has no entry. Exclusions only apply to the sweep.
    fn check_combined<R: ReplayController>(
        &self,
        replay: &mut R,
        output: &mut R::Output,
        depth: ResourceId,
    ) -> HarnessResult<ImageCheck> {
        let desc = self
            .catalog
            .get(baseline::COMBINED_OVERLAY)
            .unwrap_or_else(|| catalog::descriptor(baseline::COMBINED_OVERLAY));
        output.set_texture_display(&TextureDisplay {
            resource: depth,
            overlay: desc.kind,
        })?;
        // computing the overlay applies the clear to the displayed target
        let overlay_tex = output.compute_overlay()?;
        let source = match desc.source {
            OverlaySource::BaseTarget => depth,
            OverlaySource::OverlayOutput => overlay_tex,
        };

        let name = baseline::combined_image_name();
        let save = TextureSave::png(source).with_range(desc.range).with_channel(0);
        let image = driver::check_image(
            replay,
            self.ctx,
            &save,
            &name,
            self.ctx.config().overlay_tolerance,
        )?;

        if !image.passed() {
            return Err(HarnessError::OverlayMismatch {
                overlay: name.trim_end_matches(".png").to_string(),
                candidate: image.candidate,
                reference: image.reference,
                diff: image.diff,
            });
        }
        tracing::info!("reference and output image are identical for {name}");
        Ok(image)
    }
}
