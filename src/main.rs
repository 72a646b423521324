use std::sync::Arc;

use cgmath::{Point3, Vector3};
use log::info;
use rigid_physics::{
    BodyLock, BodyPool, InertiaTensorCache, PhysicsConfig, PoolConfig, Shape, World,
};

/// Drops a handful of pooled balls and crates onto the ground and reports
/// where they come to rest.
fn main() {
    env_logger::init();

    let cache = Arc::new(InertiaTensorCache::new());
    let pool = BodyPool::new(PoolConfig::default()).with_inertia_cache(Arc::clone(&cache));
    pool.preallocate();

    let mut world = match World::try_new(PhysicsConfig::default().with_pair_resolution()) {
        Ok(world) => world,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return;
        }
    };

    let mut scene = Vec::new();
    for i in 0..6 {
        let body = if i % 2 == 0 {
            pool.acquire(Shape::sphere(0.5, 32), 5.0)
        } else {
            pool.acquire(Shape::cuboid(1.0, 1.0, 1.0), 10.0)
        };
        {
            let mut rigid = body.lock_body();
            rigid.set_position(Point3::new(i as f64 * 1.5, 2.0 + i as f64, 0.0));
            rigid.set_linear_velocity(Vector3::new(0.5, 0.0, 0.0));
        }
        world.add_body(&body);
        scene.push(body);
    }

    let mut elapsed = 0.0;
    while elapsed < 5.0 {
        world.update(world.config().time_step);
        elapsed += world.config().time_step;

        if scene.iter().all(|body| body.lock_body().linear_velocity().y.abs() < 1e-3) {
            info!("everything settled after {elapsed:.2}s");
            break;
        }
    }

    for (i, body) in scene.iter().enumerate() {
        let body = body.lock_body();
        println!(
            "{} #{i}: position {:?} velocity {:?}",
            body.shape().kind(),
            body.position(),
            body.linear_velocity()
        );
    }

    for body in scene.drain(..) {
        world.remove_body(&body);
        pool.release(body);
    }

    let stats = pool.stats();
    info!(
        "pool: {} keys, {} available, {} created, {} reused",
        stats.pools, stats.available, stats.created, stats.reused
    );
    let cache_stats = cache.stats();
    info!(
        "inertia cache: {} entries, {} hits, {} misses",
        cache_stats.entries, cache_stats.hits, cache_stats.misses
    );
}
