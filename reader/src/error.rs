use std::fmt::Display;
use std::io;
use thiserror::Error;

/// Position of a record in the instance file.
///
/// Depot and customer indices are 0-based, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    Header,
    Depot(usize),
    Demand(usize),
    Costs(usize),
}

impl Record {
    /// Fewest values a line of this record must hold.
    pub fn min_values(&self) -> usize {
        match self {
            Record::Header | Record::Depot(_) => 2,
            Record::Demand(_) => 1,
            Record::Costs(_) => 0,
        }
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Record::Header => write!(f, "header"),
            Record::Depot(i) => write!(f, "depot {i}"),
            Record::Demand(i) => write!(f, "demand of customer {i}"),
            Record::Costs(i) => write!(f, "costs of customer {i}"),
        }
    }
}

/// Errors occurring while loading an instance
#[derive(Error, Debug)]
pub enum Error {
    /// The file could not be opened or read
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// A line holds fewer values than its record needs
    #[error("line {line} ({record}): expected {expected} values, found {found}")]
    Format {
        line: usize,
        record: Record,
        expected: usize,
        found: usize,
    },
    /// A token where a number is expected can not be parsed
    #[error("line {line} ({record}): `{token}' can not be parsed: {reason}")]
    Conversion {
        line: usize,
        record: Record,
        token: String,
        reason: String,
    },
    /// The input ends before all declared records were read
    #[error("line {line}: input ends before {record}")]
    Truncated { line: usize, record: Record },
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Io(l), Self::Io(r)) => l.kind() == r.kind(),
            (
                Self::Format {
                    line: l0,
                    record: l1,
                    expected: l2,
                    found: l3,
                },
                Self::Format {
                    line: r0,
                    record: r1,
                    expected: r2,
                    found: r3,
                },
            ) => l0 == r0 && l1 == r1 && l2 == r2 && l3 == r3,
            (
                Self::Conversion {
                    line: l0,
                    record: l1,
                    token: l2,
                    ..
                },
                Self::Conversion {
                    line: r0,
                    record: r1,
                    token: r2,
                    ..
                },
            ) => l0 == r0 && l1 == r1 && l2 == r2,
            (
                Self::Truncated {
                    line: l0,
                    record: l1,
                },
                Self::Truncated {
                    line: r0,
                    record: r1,
                },
            ) => l0 == r0 && l1 == r1,
            _ => false,
        }
    }
}
