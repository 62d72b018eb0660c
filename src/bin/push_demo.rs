// Box pushing demo: plan a relocation, then validate a hand-built push.
// Usage: push_demo [seed]

use rand::rngs::StdRng;
use rand::SeedableRng;

use push_planner::{
    BoxRoadmap, MovableBox, PlannerConfig, Point2D, Problem, PushResult, Rect, RobotConfig,
    SamplingBasedPlanner, SolutionValidator, StaticObstacle, Trajectory, TrajectoryStep,
    ValidatorConfig,
};

const ROBOT_WIDTH: f64 = 0.1;

fn planning_problem() -> PushResult<Problem> {
    Problem::new(
        ROBOT_WIDTH,
        RobotConfig::new(Point2D::new(0.9, 0.05), 0.0),
        vec![
            MovableBox::new(Point2D::new(0.1, 0.1), ROBOT_WIDTH),
            MovableBox::new(Point2D::new(0.7, 0.2), ROBOT_WIDTH),
        ],
        vec![MovableBox::new(Point2D::new(0.4, 0.7), ROBOT_WIDTH)],
        vec![StaticObstacle::new(Rect::new(0.45, 0.3, 0.1, 0.3))],
        vec![Point2D::new(0.8, 0.8), Point2D::new(0.2, 0.8)],
    )
}

fn push_problem() -> PushResult<Problem> {
    Problem::new(
        ROBOT_WIDTH,
        RobotConfig::new(Point2D::new(0.55, 0.5), 0.0),
        vec![MovableBox::new(Point2D::new(0.5, 0.5), ROBOT_WIDTH)],
        Vec::new(),
        Vec::new(),
        vec![Point2D::new(0.5, 0.6)],
    )
}

/// Robot flat under the box, pushing it straight up in primitive steps.
fn upward_push(steps: usize, step: f64) -> Trajectory {
    let mut trajectory = Trajectory::new();
    for i in 0..=steps {
        let y = 0.5 + i as f64 * step;
        trajectory.push(TrajectoryStep::new(
            RobotConfig::new(Point2D::new(0.55, y), 0.0),
            vec![MovableBox::new(Point2D::new(0.5, y), ROBOT_WIDTH)],
            Vec::new(),
        ));
    }
    trajectory
}

fn main() -> PushResult<()> {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(0);
    let mut rng = StdRng::seed_from_u64(seed);

    println!("Box roadmap planning start!! (seed {})", seed);
    let problem = planning_problem()?;
    let mut planner = BoxRoadmap::new(&problem, PlannerConfig::default())?;
    match planner.plan(&mut rng) {
        Ok(plan) => {
            println!("Found plan with {} moves, tree has {} nodes", plan.moves.len(), planner.get_tree().len());
            for (i, change) in plan.moves.iter().enumerate() {
                println!("  {:>3}: {:?} {:?} -> {:.3}", i, change.slot, change.axis, change.value);
            }
        }
        Err(e) => println!("Planning failed: {}", e),
    }

    println!("Trajectory validation start!!");
    let problem = push_problem()?;
    let validator = SolutionValidator::new(&problem, ValidatorConfig::default())?;
    let report = validator.validate(&upward_push(100, 0.001));
    println!("{}", report);

    Ok(())
}
