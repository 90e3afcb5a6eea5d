use crate::world::World;

/// A stage of the tick loop.
///
/// Registered systems are stepped in registration order, once per
/// [`World::step`], before entities advance their own lifecycles. A system
/// sees the world with the tick counter already incremented.
pub trait System {
    /// Short name used in logs and inspector output.
    fn name(&self) -> &str;

    /// Run one tick of this system.
    fn step(&mut self, world: &mut World, dt: f64);
}
