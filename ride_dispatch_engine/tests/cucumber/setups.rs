use cucumber::given;
use ride_dispatch_engine::helpers::DispatchPolicy;

use crate::cucumber::{dispatch_world::DispatchSystem, DispatchWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut DispatchWorld) {
    world.system = Some(DispatchSystem::new(DispatchPolicy::default()).await);
}

#[given(expr = "a fresh install with a dispatch radius of {int}")]
async fn fresh_database_with_radius(world: &mut DispatchWorld, radius: i64) {
    let policy = DispatchPolicy { max_dispatch_radius: radius, ..DispatchPolicy::default() };
    world.system = Some(DispatchSystem::new(policy).await);
}
