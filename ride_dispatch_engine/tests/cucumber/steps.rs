use cucumber::{given, then, when};
use ride_dispatch_engine::{
    db_types::{ChairModel, Coordinate, NewChair, NewUser, RideStatusType},
    RideFlowError,
};

use crate::cucumber::DispatchWorld;

fn coordinate(lat: i64, lon: i64) -> Coordinate {
    Coordinate::new(lat, lon)
}

fn status(name: &str) -> RideStatusType {
    name.parse().unwrap_or_else(|e| panic!("{name} is not a ride status: {e}"))
}

fn remember_error(world: &mut DispatchWorld, result: Result<(), RideFlowError>) {
    world.last_error = result.err().map(|e| e.to_string());
}

#[given(expr = "a rider {word}")]
async fn add_rider(world: &mut DispatchWorld, name: String) {
    let user = NewUser::new(name.clone(), name.clone(), "Rider".to_string(), format!("app-{name}"));
    let user = world.system().accounts.register_user(user).await.expect("Error registering rider");
    world.riders.insert(name, user);
}

#[given(expr = "an active chair {word} of model {word} with speed {int} at \\({int}, {int})")]
async fn add_chair(world: &mut DispatchWorld, name: String, model: String, speed: i64, lat: i64, lon: i64) {
    let sys = world.system();
    sys.accounts.upsert_chair_model(ChairModel::new(model.clone(), speed)).await.expect("Error saving model");
    let chair = NewChair::new(1, name.clone(), model, format!("chair-{name}"));
    let chair = sys.accounts.register_chair(chair).await.expect("Error registering chair");
    sys.accounts.set_chair_activity(chair.id, true).await.expect("Error activating chair");
    sys.rides.report_location(chair.id, coordinate(lat, lon)).await.expect("Error placing chair");
    world.chairs.insert(name, chair);
}

#[given(expr = "chair {word} is inactive")]
async fn deactivate_chair(world: &mut DispatchWorld, name: String) {
    let chair_id = world.chair(&name).id;
    world.system().accounts.set_chair_activity(chair_id, false).await.expect("Error deactivating chair");
}

#[when(expr = "{word} requests ride {word} from \\({int}, {int}) to \\({int}, {int})")]
async fn request_ride(
    world: &mut DispatchWorld,
    rider: String,
    ride: String,
    plat: i64,
    plon: i64,
    dlat: i64,
    dlon: i64,
) {
    let user_id = world.rider(&rider).id;
    let change = world
        .system()
        .rides
        .request_ride(user_id, coordinate(plat, plon), coordinate(dlat, dlon))
        .await
        .expect("Error requesting ride");
    world.rides.insert(ride, change.ride);
}

#[when("the matching engine runs")]
async fn run_matching(world: &mut DispatchWorld) {
    world.system().matching.run_matching_pass().await.expect("Matching pass failed");
}

#[when(expr = "chair {word} reports {word} for ride {word}")]
async fn chair_reports_status(world: &mut DispatchWorld, chair: String, new_status: String, ride: String) {
    let chair_id = world.chair(&chair).id;
    let ride_id = world.ride(&ride).id;
    let result = world.system().rides.update_ride_status(chair_id, ride_id, status(&new_status)).await.map(|_| ());
    remember_error(world, result);
}

#[when(expr = "chair {word} moves to \\({int}, {int})")]
async fn chair_moves(world: &mut DispatchWorld, chair: String, lat: i64, lon: i64) {
    let chair_id = world.chair(&chair).id;
    world.system().rides.report_location(chair_id, coordinate(lat, lon)).await.expect("Error recording location");
}

#[when(expr = "{word} rates ride {word} with {int} stars")]
async fn rider_rates(world: &mut DispatchWorld, rider: String, ride: String, stars: i64) {
    let user_id = world.rider(&rider).id;
    let ride_id = world.ride(&ride).id;
    let result = world.system().rides.evaluate_ride(user_id, ride_id, stars).await.map(|_| ());
    remember_error(world, result);
}

#[when(expr = "{word} cancels ride {word}")]
async fn rider_cancels(world: &mut DispatchWorld, rider: String, ride: String) {
    let user_id = world.rider(&rider).id;
    let ride_id = world.ride(&ride).id;
    let result = world.system().rides.cancel_ride(user_id, ride_id).await.map(|_| ());
    remember_error(world, result);
}

#[when(expr = "chair {word} reads its notification stream")]
async fn chair_reads_stream(world: &mut DispatchWorld, chair: String) {
    let chair_id = world.chair(&chair).id;
    world.system().notifications.next_chair_notification(chair_id).await.expect("Error reading stream");
}

#[then(expr = "ride {word} is assigned to chair {word}")]
async fn check_assignment(world: &mut DispatchWorld, ride: String, chair: String) {
    let ride_id = world.ride(&ride).id;
    let chair_id = world.chair(&chair).id;
    let ride = world.system().rides.ride(ride_id).await.expect("Error fetching ride").expect("Ride not found");
    assert_eq!(ride.chair_id, Some(chair_id));
}

#[then(expr = "ride {word} is not assigned")]
async fn check_unassigned(world: &mut DispatchWorld, ride: String) {
    let ride_id = world.ride(&ride).id;
    let ride = world.system().rides.ride(ride_id).await.expect("Error fetching ride").expect("Ride not found");
    assert_eq!(ride.chair_id, None);
}

#[then(expr = "ride {word} has status history {string}")]
async fn check_history(world: &mut DispatchWorld, ride: String, expected: String) {
    let ride_id = world.ride(&ride).id;
    let statuses = world.system().rides.ride_statuses(ride_id).await.expect("Error fetching statuses");
    let history = statuses.iter().map(|s| s.status.as_str()).collect::<Vec<_>>().join(", ");
    assert_eq!(history, expected);
}

#[then(expr = "the request fails with {string}")]
async fn check_error(world: &mut DispatchWorld, message: String) {
    assert_eq!(world.last_error.as_deref(), Some(message.as_str()));
}

#[then("the request succeeds")]
async fn check_success(world: &mut DispatchWorld) {
    assert_eq!(world.last_error, None);
}

#[then(expr = "chair {word} has driven {int} units")]
async fn check_odometer(world: &mut DispatchWorld, chair: String, expected: i64) {
    let chair_id = world.chair(&chair).id;
    let chair = world.system().accounts.chair(chair_id).await.expect("Error fetching chair").expect("Chair not found");
    assert_eq!(chair.total_distance, expected);
}
