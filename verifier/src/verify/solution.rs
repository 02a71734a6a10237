use itertools::Itertools;
use pest::Parser;
use pest_derive::Parser;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Parser)]
#[grammar = "verify/cflp_solution.pest"]
pub struct SolutionParser;

/// Depot chosen for every customer, in customer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub instance_name: String,
    pub assignment: Vec<usize>,
}

impl Solution {
    /// Depots serving at least one customer, ascending.
    pub fn open_depots(&self) -> Vec<usize> {
        self.assignment.iter().copied().sorted().dedup().collect()
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Instance name: {}\n", self.instance_name)?;
        write!(f, "Authors: \n")?;
        write!(f, "Date: {}\n", chrono::Local::now().format("%Y-%m-%d"))?;
        write!(f, "Reference: \n")?;
        write!(
            f,
            "Assignment: {}\n",
            itertools::join(self.assignment.iter(), " ")
        )
    }
}

impl FromStr for Solution {
    type Err = String;
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let parsed = SolutionParser::parse(Rule::file, input)
            .map_err(|x| format!("Solution parsing problem: {x}"))?
            .next()
            .ok_or_else(|| "Solution parsing problem: empty parse tree".to_string())?;

        let mut instance_name = String::new();
        let mut assignment: Option<Vec<usize>> = None;

        for field in parsed.into_inner() {
            match field.as_rule() {
                Rule::field => {
                    let (key, value) = field
                        .into_inner()
                        .map(|p| p.as_str().trim())
                        .collect_tuple()
                        .ok_or_else(|| "malformed `key: value' line".to_string())?;

                    match key {
                        "Instance name" => instance_name = value.to_string(),
                        "Assignment" => {
                            if assignment.is_some() {
                                Err("more than one `Assignment' line".to_string())?;
                            }
                            assignment = Some(parse_assignment(value)?);
                        }
                        _ => {}
                    }
                }
                Rule::EOI => {}
                _ => unreachable!(),
            }
        }

        Ok(Solution {
            instance_name,
            assignment: assignment.ok_or_else(|| "no `Assignment' line".to_string())?,
        })
    }
}

fn parse_assignment(s: &str) -> Result<Vec<usize>, String> {
    s.split_whitespace()
        .enumerate()
        .map(|(i, c)| {
            c.parse().map_err(|_| {
                format!("can't parse assignment: depot of customer {i}: `{c}' can not be parsed")
            })
        })
        .collect()
}
