mod test_utils;

use fleetwise_optimizer::{
    Solver, SolverParams,
    problem::fleet_routing_problem::FleetRoutingProblem,
    solver::{
        solution::routing_solution::SearchStatus,
        solver_params::{SearchStrategy, Termination, Threads},
    },
};
use test_utils::TestFleetVehicle;

fn create_mixed_fleet_problem() -> FleetRoutingProblem {
    let points = test_utils::spiral_points(40);
    let demands = test_utils::cycling_demands(40, 6);

    test_utils::create_problem(
        &points,
        &demands,
        &[
            TestFleetVehicle::new(40),
            TestFleetVehicle::new(30).hourly_wage(25.0),
            TestFleetVehicle::new(30).hourly_wage(35.0),
            TestFleetVehicle::new(20).time_limit_secs(2 * 3600),
            TestFleetVehicle::new(60).hourly_wage(40.0),
        ],
    )
}

fn params(strategy: SearchStrategy, terminations: Vec<Termination>) -> SolverParams {
    SolverParams {
        terminations,
        search_strategy: strategy,
        neighbourhood_size: Some(10),
        ..SolverParams::default()
    }
}

#[test]
fn test_solution_invariants() {
    for strategy in [SearchStrategy::BestImprovement, SearchStrategy::FirstImprovement] {
        let solver = Solver::new(create_mixed_fleet_problem(), params(strategy, vec![]));
        let solution = solver.solve();

        assert_eq!(solution.status, SearchStatus::Converged);
        assert!(solution.is_complete());
        assert_eq!(solution.routes.len(), 5);
        test_utils::assert_partition(solver.problem(), &solution);
        test_utils::assert_dimensions_respected(solver.problem(), &solution);
        test_utils::assert_no_cost_drift(solver.problem(), &solution);
    }
}

#[test]
fn test_cost_is_non_increasing_over_iterations() {
    let mut previous = None;

    for iterations in 0..8 {
        let solver = Solver::new(
            create_mixed_fleet_problem(),
            params(
                SearchStrategy::BestImprovement,
                vec![Termination::Iterations(iterations)],
            ),
        );
        let solution = solver.solve();
        test_utils::assert_dimensions_respected(solver.problem(), &solution);

        if let Some(previous) = previous {
            assert!(solution.total_cost <= previous);
        }
        previous = Some(solution.total_cost);
    }
}

#[test]
fn test_local_search_improves_construction() {
    let constructed = Solver::new(
        create_mixed_fleet_problem(),
        SolverParams {
            run_local_search: false,
            ..SolverParams::default()
        },
    )
    .solve();
    let improved = Solver::new(
        create_mixed_fleet_problem(),
        params(SearchStrategy::BestImprovement, vec![]),
    )
    .solve();

    assert_eq!(constructed.status, SearchStatus::Skipped);
    assert!(improved.total_cost <= constructed.total_cost);
}

#[test]
fn test_deterministic_solutions() {
    for strategy in [SearchStrategy::BestImprovement, SearchStrategy::FirstImprovement] {
        let solve = |search_threads| {
            Solver::new(
                create_mixed_fleet_problem(),
                SolverParams {
                    search_threads,
                    ..params(strategy, vec![])
                },
            )
            .solve()
        };

        let first = solve(Threads::Single);
        assert_eq!(first, solve(Threads::Single));
        assert_eq!(first, solve(Threads::Multi(4)));
    }
}

#[test]
fn test_neighbourhood_restriction_keeps_feasibility() {
    let solver = Solver::new(
        create_mixed_fleet_problem(),
        SolverParams {
            neighbourhood_size: Some(2),
            ..SolverParams::default()
        },
    );
    let solution = solver.solve();

    test_utils::assert_partition(solver.problem(), &solution);
    test_utils::assert_dimensions_respected(solver.problem(), &solution);
    test_utils::assert_no_cost_drift(solver.problem(), &solution);
}
