use crate::error::{Error, Record};
use pest::iterators::Pairs;
use pest::Parser;
use pest_derive::Parser;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Parser)]
#[grammar = "cflp_instance.pest"]
pub struct InstanceParser;

/// Knobs of the instance loader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReadOptions {
    /// Reject cost rows that do not hold exactly one value per depot.
    pub check_row_width: bool,
}

/// Counts and arrays of an instance, in file order.
pub type InstanceParts = (usize, usize, Vec<f64>, Vec<f64>, Vec<f64>, Vec<Vec<f64>>);

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Instance {
    pub num_depots: usize,
    pub num_customers: usize,
    pub depot_capacities: Vec<f64>,
    pub setup_costs: Vec<f64>,
    pub customer_demands: Vec<f64>,
    /// One row per customer, one value per depot.
    pub cost_matrix: Vec<Vec<f64>>,
}

impl Instance {
    /// Parses an instance from text, failing on the first malformed record.
    pub fn parse_with(s: &str, options: &ReadOptions) -> Result<Self, Error> {
        // The line grammar matches any text, so neither step can fail.
        let file = InstanceParser::parse(Rule::file, s)
            .expect("line grammar rejected the input")
            .next()
            .expect("parse tree without a file rule");

        let mut lines = Lines {
            pairs: file.into_inner(),
            number: 0,
        };

        let header = match lines.next_record(Record::Header) {
            Err(Error::Truncated { .. }) => {
                return Err(Error::Format {
                    line: 1,
                    record: Record::Header,
                    expected: Record::Header.min_values(),
                    found: 0,
                })
            }
            header => header?,
        };
        let num_depots = header.count(0)?;
        let num_customers = header.count(1)?;

        let mut depot_capacities = vec![];
        let mut setup_costs = vec![];
        for i in 0..num_depots {
            let depot = lines.next_record(Record::Depot(i))?;
            depot_capacities.push(depot.value(0)?);
            setup_costs.push(depot.value(1)?);
        }

        let mut customer_demands = vec![];
        let mut cost_matrix = vec![];
        for i in 0..num_customers {
            let demand = lines.next_record(Record::Demand(i))?;
            customer_demands.push(demand.value(0)?);

            let costs = lines.next_record(Record::Costs(i))?;
            let row = costs.values()?;
            if options.check_row_width && row.len() != num_depots {
                return Err(Error::Format {
                    line: costs.number,
                    record: costs.record,
                    expected: num_depots,
                    found: row.len(),
                });
            }
            cost_matrix.push(row);
        }

        Ok(Instance {
            num_depots,
            num_customers,
            depot_capacities,
            setup_costs,
            customer_demands,
            cost_matrix,
        })
    }

    pub fn into_parts(self) -> InstanceParts {
        (
            self.num_depots,
            self.num_customers,
            self.depot_capacities,
            self.setup_costs,
            self.customer_demands,
            self.cost_matrix,
        )
    }

    /// Capacity and setup cost of depot `i`.
    pub fn depot(&self, i: usize) -> Option<(f64, f64)> {
        Some((*self.depot_capacities.get(i)?, *self.setup_costs.get(i)?))
    }

    pub fn total_demand(&self) -> f64 {
        self.customer_demands.iter().sum()
    }

    pub fn total_capacity(&self) -> f64 {
        self.depot_capacities.iter().sum()
    }
}

struct Lines<'a> {
    pairs: Pairs<'a, Rule>,
    number: usize,
}

impl<'a> Lines<'a> {
    fn next_record(&mut self, record: Record) -> Result<Line<'a>, Error> {
        match self.pairs.next() {
            Some(pair) if pair.as_rule() == Rule::line => {
                self.number += 1;
                Ok(Line {
                    number: self.number,
                    record,
                    tokens: pair.into_inner().map(|t| t.as_str()).collect(),
                })
            }
            _ => Err(Error::Truncated {
                line: self.number + 1,
                record,
            }),
        }
    }
}

struct Line<'a> {
    number: usize,
    record: Record,
    tokens: Vec<&'a str>,
}

impl<'a> Line<'a> {
    fn token(&self, idx: usize) -> Result<&'a str, Error> {
        self.tokens.get(idx).copied().ok_or(Error::Format {
            line: self.number,
            record: self.record,
            expected: self.record.min_values().max(idx + 1),
            found: self.tokens.len(),
        })
    }

    fn parse<T>(&self, token: &str) -> Result<T, Error>
    where
        T: FromStr,
        T::Err: Display,
    {
        token.parse().map_err(|e: T::Err| Error::Conversion {
            line: self.number,
            record: self.record,
            token: token.to_string(),
            reason: e.to_string(),
        })
    }

    fn count(&self, idx: usize) -> Result<usize, Error> {
        self.parse(self.token(idx)?)
    }

    fn value(&self, idx: usize) -> Result<f64, Error> {
        self.parse(self.token(idx)?)
    }

    fn values(&self) -> Result<Vec<f64>, Error> {
        self.tokens.iter().map(|t| self.parse(t)).collect()
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} {}", self.num_depots, self.num_customers)?;
        for (capacity, setup) in self.depot_capacities.iter().zip(&self.setup_costs) {
            writeln!(f, "{capacity} {setup}")?;
        }
        for (demand, row) in self.customer_demands.iter().zip(&self.cost_matrix) {
            writeln!(f, "{demand}")?;
            let row: Vec<String> = row.iter().map(f64::to_string).collect();
            writeln!(f, "{}", row.join(" "))?;
        }
        Ok(())
    }
}

impl FromStr for Instance {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Instance::parse_with(s, &ReadOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "2 2\n100 50\n150 80\n30\n10 20\n40\n15 25\n";

    fn generated(depots: usize, customers: usize) -> Instance {
        Instance {
            num_depots: depots,
            num_customers: customers,
            depot_capacities: (0..depots).map(|i| 100.0 + i as f64 * 12.5).collect(),
            setup_costs: (0..depots).map(|i| 0.1 * (i + 1) as f64).collect(),
            customer_demands: (0..customers).map(|c| 1.0 / (c + 3) as f64).collect(),
            cost_matrix: (0..customers)
                .map(|c| (0..depots).map(|d| (c * depots + d) as f64 * 1.75).collect())
                .collect(),
        }
    }

    #[test]
    fn read_small_instance() {
        let instance = Instance::from_str(SMALL).unwrap();

        assert_eq!(
            instance,
            Instance {
                num_depots: 2,
                num_customers: 2,
                depot_capacities: vec![100.0, 150.0],
                setup_costs: vec![50.0, 80.0],
                customer_demands: vec![30.0, 40.0],
                cost_matrix: vec![vec![10.0, 20.0], vec![15.0, 25.0]],
            }
        );
    }

    #[test]
    fn parts_keep_file_order() {
        let (d, c, capacities, setup, demands, matrix) =
            Instance::from_str(SMALL).unwrap().into_parts();

        assert_eq!((d, c), (2, 2));
        assert_eq!(capacities, vec![100.0, 150.0]);
        assert_eq!(setup, vec![50.0, 80.0]);
        assert_eq!(demands, vec![30.0, 40.0]);
        assert_eq!(matrix, vec![vec![10.0, 20.0], vec![15.0, 25.0]]);
    }

    #[test]
    fn read_decimal_values() {
        let s = "1 1\n 12.5\t0.75 \n3e2\n-1.25\n";
        let instance = Instance::from_str(s).unwrap();

        assert_eq!(instance.depot(0), Some((12.5, 0.75)));
        assert_eq!(instance.depot(1), None);
        assert_eq!(instance.customer_demands, vec![300.0]);
        assert_eq!(instance.cost_matrix, vec![vec![-1.25]]);
    }

    #[test]
    fn read_crlf_line_endings() {
        let s = SMALL.replace('\n', "\r\n");
        assert_eq!(Instance::from_str(&s), Instance::from_str(SMALL));
    }

    #[test]
    fn written_instance_reads_back() {
        for (depots, customers) in [(0, 0), (1, 0), (0, 3), (1, 1), (3, 7), (10, 4)] {
            let instance = generated(depots, customers);
            let read = Instance::from_str(&instance.to_string()).unwrap();

            assert_eq!(read.num_depots, depots);
            assert_eq!(read.num_customers, customers);
            assert_eq!(read.depot_capacities.len(), depots);
            assert_eq!(read.setup_costs.len(), depots);
            assert_eq!(read.customer_demands.len(), customers);
            assert_eq!(read.cost_matrix.len(), customers);
            assert_eq!(read, instance);
        }
    }

    #[test]
    fn trailing_content_is_ignored() {
        let s = format!("{SMALL}this is not\npart of the instance\n");
        assert_eq!(Instance::from_str(&s), Instance::from_str(SMALL));
    }

    #[test]
    fn extra_tokens_on_fixed_width_lines_are_ignored() {
        let s = "1 1 7\n10 20 30\n5 6\n1\n";
        let instance = Instance::from_str(s).unwrap();

        assert_eq!(instance.depot(0), Some((10.0, 20.0)));
        assert_eq!(instance.customer_demands, vec![5.0]);
    }

    #[test]
    fn empty_input_has_no_header() {
        assert_eq!(
            Instance::from_str(""),
            Err(Error::Format {
                line: 1,
                record: Record::Header,
                expected: 2,
                found: 0
            })
        );
    }

    #[test]
    fn header_with_one_count() {
        assert_eq!(
            Instance::from_str("2\n"),
            Err(Error::Format {
                line: 1,
                record: Record::Header,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            Instance::from_str("\n"),
            Err(Error::Format {
                line: 1,
                record: Record::Header,
                expected: 2,
                found: 0
            })
        );
    }

    #[test]
    fn unicode_whitespace_separates_values() {
        let s = "1\u{a0}1\n100\u{a0}50\u{2003}\n\u{3000}30\u{85}\n10\u{1f}\n";
        let instance = Instance::from_str(s).unwrap();

        assert_eq!(instance.depot_capacities, vec![100.0]);
        assert_eq!(instance.setup_costs, vec![50.0]);
        assert_eq!(instance.customer_demands, vec![30.0]);
        assert_eq!(instance.cost_matrix, vec![vec![10.0]]);
    }

    #[test]
    fn unicode_line_separator_does_not_end_a_line() {
        let s = "1 0\n100\u{2028}50\n";

        assert_eq!(Instance::from_str(s).unwrap().depot(0), Some((100.0, 50.0)));
    }

    #[test]
    fn odd_text_fails_as_a_record_error() {
        assert!(matches!(
            Instance::from_str("\u{0}\u{1}"),
            Err(Error::Conversion { line: 1, .. })
        ));
        assert!(matches!(
            Instance::from_str("a:b\tc"),
            Err(Error::Conversion { ref token, .. }) if token == "a:b"
        ));
        for s in ["\r\r\n\n", "   "] {
            assert_eq!(
                Instance::from_str(s),
                Err(Error::Format {
                    line: 1,
                    record: Record::Header,
                    expected: 2,
                    found: 0
                })
            );
        }
    }

    #[test]
    fn counts_must_be_integers() {
        let err = Instance::from_str("2.0 1\n").unwrap_err();
        assert_eq!(
            err,
            Error::Conversion {
                line: 1,
                record: Record::Header,
                token: "2.0".to_string(),
                reason: String::new(),
            }
        );

        assert!(matches!(
            Instance::from_str("1 -1\n"),
            Err(Error::Conversion { token, .. }) if token == "-1"
        ));
    }

    #[test]
    fn missing_depot_line() {
        assert_eq!(
            Instance::from_str("2 0\n100 50\n"),
            Err(Error::Truncated {
                line: 3,
                record: Record::Depot(1)
            })
        );
    }

    #[test]
    fn missing_cost_row() {
        assert_eq!(
            Instance::from_str("1 1\n100 50\n30\n"),
            Err(Error::Truncated {
                line: 4,
                record: Record::Costs(0)
            })
        );
    }

    #[test]
    fn depot_without_setup_cost() {
        assert_eq!(
            Instance::from_str("1 0\n100\n"),
            Err(Error::Format {
                line: 2,
                record: Record::Depot(0),
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn any_malformed_number_fails() {
        let tokens: Vec<&str> = SMALL.split_whitespace().collect();

        for i in 0..tokens.len() {
            let mut lines = vec![];
            let mut k = 0;
            for line in SMALL.lines() {
                let mut fields = vec![];
                for token in line.split_whitespace() {
                    fields.push(if k == i { "abc" } else { token });
                    k += 1;
                }
                lines.push(fields.join(" "));
            }

            let broken = lines.join("\n");
            assert!(
                matches!(
                    Instance::from_str(&broken),
                    Err(Error::Conversion { ref token, .. }) if token == "abc"
                ),
                "token {i} replaced in {broken:?}"
            );
        }
    }

    #[test]
    fn cost_rows_are_not_checked_by_default() {
        let s = "2 2\n100 50\n150 80\n30\n10\n40\n\n";
        let instance = Instance::from_str(s).unwrap();

        assert_eq!(instance.cost_matrix, vec![vec![10.0], vec![]]);
    }

    #[test]
    fn cost_rows_are_checked_on_request() {
        let options = ReadOptions {
            check_row_width: true,
        };

        assert!(Instance::parse_with(SMALL, &options).is_ok());
        assert_eq!(
            Instance::parse_with("2 1\n100 50\n150 80\n30\n10 20 30\n", &options),
            Err(Error::Format {
                line: 5,
                record: Record::Costs(0),
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn totals() {
        let instance = Instance::from_str(SMALL).unwrap();

        assert_eq!(instance.total_demand(), 70.0);
        assert_eq!(instance.total_capacity(), 250.0);
    }
}
