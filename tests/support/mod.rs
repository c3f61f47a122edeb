#![allow(dead_code)]

//! In-memory replay engine for integration tests.
//!
//! Textures are CPU float images; overlays are synthesized deterministically from the displayed
//! texture, and saves go through `encode_texture` so the PNGs look like a real engine's output.

use std::{cell::RefCell, collections::HashMap, path::Path, rc::Rc};

use overlay_harness::{
    ActionInfo, BASELINE_PIXELS, DisplayRange, EventId, Extent, FloatImage, HarnessError,
    HarnessResult, OutputType, OverlayKind, OverlaySource, PipelineTargets, ReplayController,
    ReplayOutput, ResourceId, Rgba32F, TextureDisplay, TextureSave, WindowSpec, descriptor,
    encode_texture,
};

pub const COLOR: ResourceId = ResourceId(10);
pub const DEPTH: ResourceId = ResourceId(20);
pub const OVERLAY_OUT: ResourceId = ResourceId(30);

pub const MARKER_EVENT: EventId = EventId(5);
pub const DRAW_EVENT: EventId = EventId(6);

pub const EXTENT: Extent = Extent {
    width: 400,
    height: 300,
};

const BACKGROUND: Rgba32F = Rgba32F::new(0.2, 0.2, 0.2, 1.0);
const CLEAR: Rgba32F = Rgba32F::new(1.0, 0.0, 0.0, 0.0);

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateOutput,
    SetFrameEvent(EventId),
    Pick(u32, u32),
    SetDisplay(TextureDisplay),
    ComputeOverlay,
    Save {
        resource: ResourceId,
        channel: Option<usize>,
        range: DisplayRange,
        file: String,
    },
    Shutdown,
}

#[derive(Default)]
struct State {
    textures: HashMap<ResourceId, FloatImage>,
    /// Displayed textures modified in place by the current overlay.
    modified: HashMap<ResourceId, FloatImage>,
    overlay_out: Option<FloatImage>,
    display: Option<TextureDisplay>,
    event: Option<EventId>,
    calls: Vec<Call>,
    fail_save_for: Option<ResourceId>,
}

impl State {
    fn live(&self, id: ResourceId) -> Option<&FloatImage> {
        if id == OVERLAY_OUT {
            return self.overlay_out.as_ref();
        }
        self.modified.get(&id).or_else(|| self.textures.get(&id))
    }
}

pub struct FakeReplay {
    state: Rc<RefCell<State>>,
    actions: Vec<ActionInfo>,
    pub has_depth: bool,
}

pub struct FakeOutput {
    state: Rc<RefCell<State>>,
}

/// Color target that satisfies every baseline pixel check.
pub fn color_scene() -> FloatImage {
    let mut img = FloatImage::filled(EXTENT, BACKGROUND);
    for check in BASELINE_PIXELS.iter() {
        let (x, y) = check.coord.resolve(EXTENT).unwrap();
        img.put(x, y, check.color);
    }
    img
}

/// Depth in channel 0 (vertical gradient), stencil in channel 1 (a centered box).
pub fn depth_scene() -> FloatImage {
    FloatImage::from_fn(EXTENT, |x, y| {
        let depth = y as f32 / EXTENT.height as f32;
        let stencil = if (100..300).contains(&x) && (75..225).contains(&y) {
            1.0
        } else {
            0.0
        };
        Rgba32F::new(depth, stencil, 0.0, 0.0)
    })
}

/// What an overlay writes to its own output texture.
pub fn overlay_image(kind: OverlayKind, base: &FloatImage) -> FloatImage {
    let k = kind as usize as f32;
    if descriptor(kind).range.white > 1.0 {
        // counters: values well above 1.0
        return FloatImage::from_fn(base.extent(), |x, y| {
            let v = ((x / 40 + y / 30) % 10) as f32 + 0.5;
            Rgba32F::new(v, v, v, 1.0)
        });
    }
    FloatImage::from_fn(base.extent(), |x, y| {
        let px = base.get(x, y).unwrap_or(BACKGROUND);
        if px == BACKGROUND {
            Rgba32F::new(0.0, 0.0, 0.0, 0.0)
        } else {
            Rgba32F::new(k / 15.0, 1.0 - k / 15.0, 0.5, 1.0)
        }
    })
}

/// What an in-place overlay leaves in the displayed texture.
pub fn cleared_image(base: &FloatImage) -> FloatImage {
    let half = base.extent().width / 2;
    FloatImage::from_fn(base.extent(), |x, y| {
        if x < half {
            CLEAR
        } else {
            base.get(x, y).unwrap_or(CLEAR)
        }
    })
}

impl FakeReplay {
    pub fn new() -> Self {
        let mut state = State::default();
        state.textures.insert(COLOR, color_scene());
        state.textures.insert(DEPTH, depth_scene());
        Self {
            state: Rc::new(RefCell::new(state)),
            actions: vec![ActionInfo {
                name: "Test".to_string(),
                event_id: MARKER_EVENT,
                next: Some(DRAW_EVENT),
            }],
            has_depth: true,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn saves(&self) -> Vec<(ResourceId, Option<usize>, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Save {
                    resource,
                    channel,
                    file,
                    ..
                } => Some((resource, channel, file)),
                _ => None,
            })
            .collect()
    }

    pub fn shutdowns(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Shutdown))
            .count()
    }

    pub fn set_texture(&self, id: ResourceId, image: FloatImage) {
        self.state.borrow_mut().textures.insert(id, image);
    }

    pub fn fail_saves_of(&self, id: ResourceId) {
        self.state.borrow_mut().fail_save_for = Some(id);
    }

    /// Write golden images for every check this engine can produce.
    pub fn write_references(&self, dir: &Path) {
        std::fs::create_dir_all(dir).unwrap();
        let state = self.state.borrow();
        let color = &state.textures[&COLOR];
        let depth = &state.textures[&DEPTH];

        for kind in OverlayKind::ALL {
            let desc = descriptor(kind);
            if desc.is_excluded() {
                continue;
            }
            let img = match desc.source {
                OverlaySource::OverlayOutput => overlay_image(kind, color),
                OverlaySource::BaseTarget => cleared_image(color),
            };
            encode_texture(&img, desc.range, None)
                .unwrap()
                .save(dir.join(desc.image_file_name()))
                .unwrap();
        }

        for (name, channel) in [("depth.png", 0), ("stencil.png", 1)] {
            encode_texture(depth, DisplayRange::UNIT, Some(channel))
                .unwrap()
                .save(dir.join(name))
                .unwrap();
        }

        encode_texture(&cleared_image(depth), DisplayRange::UNIT, Some(0))
            .unwrap()
            .save(dir.join("ClearBeforeDraw.Depth.png"))
            .unwrap();
    }
}

impl ReplayController for FakeReplay {
    type Output = FakeOutput;

    fn find_action(&self, name: &str) -> Option<ActionInfo> {
        self.actions.iter().find(|a| a.name == name).cloned()
    }

    fn set_frame_event(&mut self, event: EventId) -> HarnessResult<()> {
        let mut s = self.state.borrow_mut();
        s.calls.push(Call::SetFrameEvent(event));
        s.event = Some(event);
        Ok(())
    }

    fn pipeline_state(&self) -> HarnessResult<PipelineTargets> {
        let s = self.state.borrow();
        if s.event != Some(DRAW_EVENT) {
            return Ok(PipelineTargets::default());
        }
        Ok(PipelineTargets {
            color_targets: vec![COLOR],
            depth_target: self.has_depth.then_some(DEPTH),
        })
    }

    fn create_output(
        &mut self,
        _window: WindowSpec,
        _kind: OutputType,
    ) -> HarnessResult<FakeOutput> {
        self.state.borrow_mut().calls.push(Call::CreateOutput);
        Ok(FakeOutput {
            state: Rc::clone(&self.state),
        })
    }

    fn texture_extent(&self, resource: ResourceId) -> HarnessResult<Extent> {
        self.state
            .borrow()
            .live(resource)
            .map(FloatImage::extent)
            .ok_or_else(|| HarnessError::replay(format!("unknown texture {resource}")))
    }

    fn pick_pixel(&mut self, resource: ResourceId, x: u32, y: u32) -> HarnessResult<Rgba32F> {
        let mut s = self.state.borrow_mut();
        s.calls.push(Call::Pick(x, y));
        s.live(resource)
            .and_then(|img| img.get(x, y))
            .ok_or_else(|| HarnessError::replay(format!("cannot pick {resource} at ({x}, {y})")))
    }

    fn save_texture(&mut self, save: &TextureSave, path: &Path) -> HarnessResult<()> {
        let mut s = self.state.borrow_mut();
        s.calls.push(Call::Save {
            resource: save.resource,
            channel: save.channel_extract,
            range: save.range,
            file: path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_default(),
        });
        if s.fail_save_for == Some(save.resource) {
            return Err(HarnessError::save(path, "injected failure"));
        }

        let img = s
            .live(save.resource)
            .ok_or_else(|| HarnessError::save(path, format!("unknown texture {}", save.resource)))?;
        encode_texture(img, save.range, save.channel_extract)?
            .save(path)
            .map_err(|e| HarnessError::save(path, e))
    }
}

impl ReplayOutput for FakeOutput {
    fn set_texture_display(&mut self, display: &TextureDisplay) -> HarnessResult<()> {
        let mut s = self.state.borrow_mut();
        s.calls.push(Call::SetDisplay(*display));
        s.display = Some(*display);
        s.modified.clear();
        s.overlay_out = None;
        Ok(())
    }

    fn compute_overlay(&mut self) -> HarnessResult<ResourceId> {
        let mut s = self.state.borrow_mut();
        s.calls.push(Call::ComputeOverlay);
        let display = s
            .display
            .ok_or_else(|| HarnessError::replay("no texture displayed"))?;
        let base = s
            .textures
            .get(&display.resource)
            .cloned()
            .ok_or_else(|| HarnessError::replay(format!("unknown texture {}", display.resource)))?;

        match descriptor(display.overlay).source {
            OverlaySource::BaseTarget => {
                s.modified.insert(display.resource, cleared_image(&base));
                // the overlay texture itself holds nothing useful for in-place overlays
                s.overlay_out = Some(FloatImage::filled(
                    base.extent(),
                    Rgba32F::new(1.0, 0.0, 1.0, 1.0),
                ));
            }
            OverlaySource::OverlayOutput => {
                s.overlay_out = Some(overlay_image(display.overlay, &base));
            }
        }
        Ok(OVERLAY_OUT)
    }

    fn shutdown(&mut self) -> HarnessResult<()> {
        self.state.borrow_mut().calls.push(Call::Shutdown);
        Ok(())
    }
}

/// Reference + scratch directories for one test, plus a context over them.
pub struct Fixture {
    pub ctx: overlay_harness::RunContext,
    pub dir: tempfile::TempDir,
}

impl Fixture {
    pub fn new(engine: &FakeReplay) -> Self {
        Self::with_config(engine, |_| {})
    }

    pub fn with_config(
        engine: &FakeReplay,
        tweak: impl FnOnce(&mut overlay_harness::HarnessConfig),
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let refs = dir.path().join("refs");
        engine.write_references(&refs);

        let mut cfg = overlay_harness::HarnessConfig::with_reference_dir(&refs);
        cfg.scratch_root = Some(dir.path().join("scratch"));
        tweak(&mut cfg);
        let ctx = overlay_harness::RunContext::new(cfg).unwrap();
        Self { ctx, dir }
    }

    pub fn reference(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join("refs").join(name)
    }

    /// Nudge one pixel of a stored reference by `delta` on the red channel.
    pub fn perturb_reference(&self, name: &str, delta: u8) {
        let path = self.reference(name);
        let mut img = overlay_harness::load_rgba8(&path).unwrap();
        let px = img.get_pixel_mut(250, 10);
        px.0[0] = px.0[0].wrapping_add(delta);
        img.save(&path).unwrap();
    }
}
