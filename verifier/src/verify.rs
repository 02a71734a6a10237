pub mod solution;

use cflp_reader::Instance;
use itertools::Itertools;
use log::debug;
use serde::Serialize;
use serde_with::{serde_as, DisplayFromStr};
use solution::Solution;

pub const PRECISION: u32 = 128;

pub fn fl(val: f64) -> rug::Float {
    rug::Float::with_val(PRECISION, val)
}

/// Outcome of a successful check.
#[serde_as]
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub instance_name: String,
    pub open_depots: Vec<usize>,
    #[serde_as(as = "DisplayFromStr")]
    pub total_cost: rug::Float,
}

fn check_assignment(inst: &Instance, sol: &Solution) -> Result<(), String> {
    if sol.assignment.len() != inst.num_customers {
        Err(format!(
            "assignment covers {} customers, the instance has {}",
            sol.assignment.len(),
            inst.num_customers
        ))?;
    }

    for (customer, &depot) in sol.assignment.iter().enumerate() {
        if depot >= inst.num_depots {
            Err(format!(
                "customer {} is assigned to depot {} which is not described in the instance",
                customer, depot
            ))?;
        }

        let row = inst
            .cost_matrix
            .get(customer)
            .ok_or_else(|| format!("no cost row for customer {}", customer))?;

        if depot >= row.len() {
            Err(format!(
                "cost row of customer {} has {} values, no cost for depot {}",
                customer,
                row.len(),
                depot
            ))?;
        }
    }

    Ok(())
}

/// Sum of demands served by every depot.
pub fn depot_loads(inst: &Instance, sol: &Solution) -> Vec<rug::Float> {
    let mut loads = vec![fl(0.0); inst.num_depots];

    for (&demand, &depot) in inst.customer_demands.iter().zip(&sol.assignment) {
        if let Some(load) = loads.get_mut(depot) {
            *load += demand;
        }
    }

    loads
}

fn check_capacities(inst: &Instance, sol: &Solution) -> Result<(), String> {
    for (depot, load) in depot_loads(inst, sol).iter().enumerate() {
        let (capacity, _) = inst
            .depot(depot)
            .ok_or_else(|| format!("depot {} has no capacity", depot))?;

        if *load > capacity {
            Err(format!(
                "load is greater than capacity ({} > {}) at depot {}",
                load.to_f64(),
                capacity,
                depot
            ))?;
        }
    }

    Ok(())
}

/// Setup costs of the open depots plus the service cost of every customer.
/// Expects an assignment accepted by `check_assignment`.
fn calc_total_cost(inst: &Instance, sol: &Solution) -> rug::Float {
    let setup = sol
        .open_depots()
        .into_iter()
        .map(|d| fl(inst.setup_costs[d]))
        .fold(fl(0.0), std::ops::Add::add);

    let service = sol
        .assignment
        .iter()
        .enumerate()
        .map(|(c, &d)| fl(inst.cost_matrix[c][d]))
        .fold(fl(0.0), std::ops::Add::add);

    setup + service
}

pub fn verify(inst: &Instance, sol: &Solution) -> Result<rug::Float, String> {
    check_assignment(inst, sol)?;
    check_capacities(inst, sol)?;

    let total_cost = calc_total_cost(inst, sol);

    debug!(
        "{}: depots {} open, total cost {}",
        sol.instance_name,
        sol.open_depots().iter().join(","),
        total_cost
    );

    Ok(total_cost)
}

pub fn report(inst: &Instance, sol: &Solution) -> Result<Report, String> {
    Ok(Report {
        instance_name: sol.instance_name.clone(),
        total_cost: verify(inst, sol)?,
        open_depots: sol.open_depots(),
    })
}
