/// Asserts the number of living prey.
#[macro_export]
macro_rules! assert_living_preys {
    ($engine:expr, $count:expr) => {
        assert_eq!(
            $engine.living_preys(),
            $count,
            "Living prey count mismatch at tick {}",
            $engine.tick_count()
        );
    };
}

/// Asserts every living agent of a population moves at the population speed.
#[macro_export]
macro_rules! assert_speeds_preserved {
    ($population:expr) => {
        let pop = $population;
        for (i, (v, alive)) in pop.velocities().iter().zip(pop.alive()).enumerate() {
            if *alive {
                assert!(
                    (v.norm() - pop.speed()).abs() <= 1e-6 * pop.speed(),
                    "{} {} has speed {} instead of {}",
                    pop.species(),
                    i,
                    v.norm(),
                    pop.speed()
                );
            }
        }
    };
}

/// Asserts every position lies in `[0, size)` on both axes.
#[macro_export]
macro_rules! assert_on_torus {
    ($population:expr, $size:expr) => {
        for p in $population.positions() {
            assert!(
                (0.0..$size).contains(&p.x) && (0.0..$size).contains(&p.y),
                "Position {:?} left the torus of size {}",
                p,
                $size
            );
        }
    };
}
