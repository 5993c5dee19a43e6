//! Simulation context.
//!
//! All mutable viewer state lives in one [`SimulationContext`] owned by
//! the frame loop: the current parameter snapshot, the field generated
//! from it, and the camera controller. Generation and the per-frame tick
//! run on the same thread, one after the other.

use log::debug;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::time::Instant;

use crate::camera::{CameraPose, OrbitController};
use crate::galaxy::{self, PointField};
use crate::params::GalaxyParameters;
use crate::visuals::{BlendMode, PointMaterial};

/// Receives generated fields for display.
///
/// Installing a field must release whatever the previous one held, so
/// at most one field is alive on the receiving side.
pub trait FieldSink {
    fn install_field(&mut self, field: &PointField, material: &PointMaterial);
}

/// Parameters, field and camera for one viewer.
#[derive(Debug)]
pub struct SimulationContext {
    params: GalaxyParameters,
    field: PointField,
    controller: OrbitController,
    blend_mode: BlendMode,
    seed: Option<u64>,
    generation: u64,
}

impl SimulationContext {
    /// Create a context and generate the initial field.
    ///
    /// With `seed` set, every regeneration of the same snapshot yields the
    /// same field; `None` draws fresh randomness each time.
    pub fn new(params: GalaxyParameters, controller: OrbitController, seed: Option<u64>) -> Self {
        let mut ctx = Self {
            params,
            field: PointField::empty(),
            controller,
            blend_mode: BlendMode::default(),
            seed,
            generation: 0,
        };
        ctx.regenerate();
        ctx
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    pub fn params(&self) -> &GalaxyParameters {
        &self.params
    }

    pub fn field(&self) -> &PointField {
        &self.field
    }

    pub fn controller(&self) -> &OrbitController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut OrbitController {
        &mut self.controller
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// How many fields have been generated so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Material for the current parameters.
    pub fn material(&self) -> PointMaterial {
        PointMaterial::for_parameters(&self.params, self.blend_mode)
    }

    /// Replace the parameter snapshot and regenerate.
    pub fn apply_parameters(&mut self, params: GalaxyParameters) {
        self.params = params;
        self.regenerate();
    }

    /// Rebuild the field from the current parameters.
    ///
    /// With a fixed seed the result is identical every time.
    pub fn regenerate(&mut self) {
        let started = Instant::now();
        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        self.field = galaxy::generate(&self.params, &mut rng);
        self.generation += 1;
        debug!(
            "Generated {} points in {:.1} ms (generation {})",
            self.field.len(),
            started.elapsed().as_secs_f64() * 1000.0,
            self.generation
        );
    }

    /// Hand the current field to a renderer.
    pub fn install_into<S: FieldSink + ?Sized>(&self, sink: &mut S) {
        sink.install_field(&self.field, &self.material());
    }

    /// Advance the camera by `delta` seconds.
    pub fn tick(&mut self, delta: f32) -> CameraPose {
        self.controller.update(delta, self.params.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::gpu::{BufferSlot, Release};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Stands in for a GPU buffer; counts how many are alive.
    struct CountedBuffer {
        live: Rc<Cell<usize>>,
    }

    impl CountedBuffer {
        fn allocate(live: &Rc<Cell<usize>>) -> Self {
            live.set(live.get() + 1);
            Self { live: live.clone() }
        }
    }

    impl Release for CountedBuffer {
        fn release(&self) {
            self.live.set(self.live.get() - 1);
        }
    }

    /// Keeps installed fields in a [`BufferSlot`], the way `GpuState` does.
    #[derive(Default)]
    struct CountingSink {
        slot: BufferSlot<CountedBuffer>,
        live: Rc<Cell<usize>>,
        peak: usize,
        installs: usize,
    }

    impl FieldSink for CountingSink {
        fn install_field(&mut self, field: &PointField, _material: &PointMaterial) {
            let live = self.live.clone();
            self.slot.refill(field.len() as u32, || CountedBuffer::allocate(&live));
            self.peak = self.peak.max(self.live.get());
            self.installs += 1;
        }
    }

    fn small() -> GalaxyParameters {
        GalaxyParameters {
            count: 500,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_generates_once() {
        let ctx = SimulationContext::new(small(), OrbitController::new(), None);
        assert_eq!(ctx.field().len(), 500);
        assert_eq!(ctx.generation(), 1);
    }

    #[test]
    fn test_apply_parameters_replaces_field() {
        let mut ctx = SimulationContext::new(small(), OrbitController::new(), None);
        ctx.apply_parameters(GalaxyParameters {
            count: 120,
            ..small()
        });
        assert_eq!(ctx.field().len(), 120);
        assert_eq!(ctx.params().count, 120);
    }

    #[test]
    fn test_seeded_regeneration_is_identical() {
        let mut ctx = SimulationContext::new(small(), OrbitController::new(), Some(77));
        let first = ctx.field().clone();
        ctx.regenerate();
        assert_eq!(ctx.field(), &first);
    }

    #[test]
    fn test_sink_keeps_one_live_field() {
        let mut ctx = SimulationContext::new(small(), OrbitController::new(), None);
        let mut sink = CountingSink::default();
        for count in [100, 200, 300] {
            ctx.apply_parameters(GalaxyParameters { count, ..small() });
            ctx.install_into(&mut sink);
        }
        assert_eq!(sink.installs, 3);
        assert_eq!(sink.live.get(), 1);
        assert_eq!(sink.peak, 1);
        assert_eq!(sink.slot.count(), 300);
    }

    #[test]
    fn test_seeded_new_generates_exactly_once() {
        let ctx = SimulationContext::new(small(), OrbitController::new(), Some(5));
        assert_eq!(ctx.generation(), 1);
        assert_eq!(ctx.seed(), Some(5));
        assert_eq!(ctx.field(), &galaxy::generate_seeded(&small(), 5));
    }

    #[test]
    fn test_tick_uses_parameter_radius() {
        let mut ctx = SimulationContext::new(
            GalaxyParameters {
                count: 0,
                radius: 8.0,
                ..Default::default()
            },
            OrbitController::new(),
            None,
        );
        let pose = ctx.tick(0.0);
        assert!((pose.position.x - 8.0).abs() < 1e-5);
    }
}
